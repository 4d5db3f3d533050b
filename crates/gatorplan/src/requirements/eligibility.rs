//! Expands a category's obligations into the codes a student still owes.

use std::collections::HashSet;

use super::config::RequirementCatalog;
use super::types::{Category, Choice, CompletedSet, CourseCode, Obligation};

impl RequirementCatalog {
    /// Courses not yet completed that count toward `category`, in catalog
    /// order without duplicates.
    ///
    /// An OR-group with any satisfied choice contributes nothing. An open
    /// OR-group contributes every choice, compounds only by their lead code,
    /// skipping leads the student already has.
    /// The pool ignores whether the codes' own prerequisites are met.
    pub fn eligible_remaining(
        &self,
        completed: &CompletedSet,
        college: &str,
        category: Category,
    ) -> Vec<CourseCode> {
        let mut seen = HashSet::new();
        let mut remaining = Vec::new();
        let mut push = |code: &CourseCode| {
            if seen.insert(code.clone()) {
                remaining.push(code.clone());
            }
        };

        for obligation in self.obligations(college, category) {
            match obligation {
                Obligation::Single(code) => {
                    if !completed.contains(code) {
                        push(code);
                    }
                }
                Obligation::OrGroup(choices) => {
                    if choices.iter().any(|c| c.is_satisfied(completed)) {
                        continue;
                    }
                    for lead in choices.iter().filter_map(Choice::lead_code) {
                        if !completed.contains(lead) {
                            push(lead);
                        }
                    }
                }
            }
        }

        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::normalize::normalize;

    fn catalog(json: &str) -> RequirementCatalog {
        let mut catalog = RequirementCatalog::default();
        catalog.add_college_json("inline", json).unwrap();
        catalog
    }

    fn codes(pool: &[CourseCode]) -> Vec<&str> {
        pool.iter().map(CourseCode::as_str).collect()
    }

    const CAPSTONE: &str = r#"{
        "college_code": "ENG",
        "college_name": "Engineering",
        "categories": {
            "Core": ["COP3502C", ["CIS4914", "EGN4952"], "COP4600"]
        }
    }"#;

    #[test]
    fn test_satisfied_or_group_suppresses_all_choices() {
        let catalog = catalog(CAPSTONE);
        let completed = CompletedSet::from_raw(["EGN4952"]);
        let pool = catalog.eligible_remaining(&completed, "ENG", Category::Core);
        assert_eq!(codes(&pool), vec!["COP3502C", "COP4600"]);
    }

    #[test]
    fn test_open_or_group_exposes_every_choice() {
        let catalog = catalog(CAPSTONE);
        let completed = CompletedSet::from_raw(["COP3502C"]);
        let pool = catalog.eligible_remaining(&completed, "ENG", Category::Core);
        assert_eq!(codes(&pool), vec!["CIS4914", "EGN4952", "COP4600"]);
    }

    #[test]
    fn test_compound_suggests_lead_code_only() {
        let catalog = catalog(
            r#"{
                "college_code": "CLAS",
                "college_name": "CLAS",
                "categories": {
                    "GenEd": [[["PHY2048", "PHY2048L"], ["PHY2053", "PHY2053L"]]]
                }
            }"#,
        );

        let nothing = CompletedSet::default();
        let pool = catalog.eligible_remaining(&nothing, "CLAS", Category::GenEd);
        assert_eq!(codes(&pool), vec!["PHY2048", "PHY2053"]);

        // Lecture alone does not satisfy the pair, but it is not offered again
        let lecture_only = CompletedSet::from_raw(["PHY2048"]);
        let pool = catalog.eligible_remaining(&lecture_only, "CLAS", Category::GenEd);
        assert_eq!(codes(&pool), vec!["PHY2053"]);

        let pair = CompletedSet::from_raw(["PHY2053", "PHY2053L"]);
        assert!(catalog
            .eligible_remaining(&pair, "CLAS", Category::GenEd)
            .is_empty());
    }

    #[test]
    fn test_pool_is_deduplicated_across_obligations() {
        let catalog = catalog(
            r#"{
                "college_code": "X",
                "college_name": "X",
                "categories": {
                    "Elective/eligible": ["CAP4053", ["CAP4053", "CAP4770"], "CAP4770", "cap 4053"]
                }
            }"#,
        );
        let pool = catalog.eligible_remaining(&CompletedSet::default(), "X", Category::Elective);
        assert_eq!(codes(&pool), vec!["CAP4053", "CAP4770"]);
    }

    #[test]
    fn test_unknown_college_or_category_is_empty() {
        let catalog = catalog(CAPSTONE);
        let completed = CompletedSet::default();
        assert!(catalog
            .eligible_remaining(&completed, "MED", Category::Core)
            .is_empty());
        assert!(catalog
            .eligible_remaining(&completed, "ENG", Category::GenEd)
            .is_empty());
    }

    #[test]
    fn test_builtin_eng_core_excludes_completed() {
        let catalog = RequirementCatalog::builtin().unwrap();
        let completed = CompletedSet::from_raw(["COP3502C", "cop 3503c"]);
        let pool = catalog.eligible_remaining(&completed, "ENG", Category::Core);
        assert_eq!(pool.first(), normalize("COT3100").as_ref());
        assert!(!pool.contains(&normalize("COP3502C").unwrap()));
        assert!(!pool.contains(&normalize("COP3503C").unwrap()));
    }
}
