/// Types for degree requirement resolution
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::normalize::normalize;

/// A canonical course code (uppercase, no whitespace), e.g. `COP3502C`.
///
/// The only way to build one is through [`normalize`], so two codes compare
/// equal exactly when they name the same course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Wraps an already canonical string. Callers go through `normalize`.
    pub(crate) fn from_canonical(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Alphabetic department prefix (`COP` for `COP3502C`).
    pub fn department(&self) -> &str {
        let end = self
            .0
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CourseCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        normalize(&raw).ok_or_else(|| format!("invalid course code: {raw:?}"))
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One of the three requirement buckets of a college.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Core,
    GenEd,
    #[serde(rename = "Elective/eligible")]
    Elective,
}

impl Category {
    /// Fixed evaluation order for all-categories requests.
    pub const ALL: [Category; 3] = [Category::Core, Category::GenEd, Category::Elective];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Core => "Core",
            Category::GenEd => "GenEd",
            Category::Elective => "Elective/eligible",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive; accepts `Elective` as shorthand for `Elective/eligible`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Category::Core),
            "gened" => Ok(Category::GenEd),
            "elective/eligible" | "elective" => Ok(Category::Elective),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Which categories a recommendation call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRequest {
    AllCategories,
    OneCategory(Category),
}

/// A single alternative inside an OR-group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Single(CourseCode),
    /// Co-requisites that only count when all of them are completed
    /// (lecture + lab). Never empty.
    CompoundAnd(Vec<CourseCode>),
}

impl Choice {
    pub fn is_satisfied(&self, completed: &CompletedSet) -> bool {
        match self {
            Choice::Single(code) => completed.contains(code),
            Choice::CompoundAnd(codes) => codes.iter().all(|c| completed.contains(c)),
        }
    }

    /// The code suggested when this choice is still open. For a compound
    /// this is the first (primary) course of the pair, `None` if it is empty.
    pub fn lead_code(&self) -> Option<&CourseCode> {
        match self {
            Choice::Single(code) => Some(code),
            Choice::CompoundAnd(codes) => codes.first(),
        }
    }
}

/// One requirement entry in a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obligation {
    Single(CourseCode),
    /// Satisfied by any one of its choices. Never empty.
    OrGroup(Vec<Choice>),
}

impl Obligation {
    pub fn is_met(&self, completed: &CompletedSet) -> bool {
        match self {
            Obligation::Single(code) => completed.contains(code),
            Obligation::OrGroup(choices) => choices.iter().any(|c| c.is_satisfied(completed)),
        }
    }
}

/// Canonical set of courses a student reports as completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedSet(HashSet<CourseCode>);

impl CompletedSet {
    /// Builds the set from raw user input, dropping blank entries.
    pub fn from_raw<I, S>(raws: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(raws.into_iter().filter_map(|r| normalize(r.as_ref())).collect())
    }

    pub fn contains(&self, code: &CourseCode) -> bool {
        self.0.contains(code)
    }
}

/// Output of a recommendation call.
///
/// Serializes as a bare list for single-category requests and as an object
/// keyed by category name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    Single(Vec<CourseCode>),
    ByCategory(BTreeMap<Category, Vec<CourseCode>>),
}

impl Recommendation {
    /// The empty result for the given request shape.
    pub fn empty(request: CategoryRequest) -> Self {
        match request {
            CategoryRequest::OneCategory(_) => Recommendation::Single(Vec::new()),
            CategoryRequest::AllCategories => Recommendation::ByCategory(BTreeMap::new()),
        }
    }

    /// Every recommended code, category order preserved.
    pub fn codes(&self) -> Vec<&CourseCode> {
        match self {
            Recommendation::Single(codes) => codes.iter().collect(),
            Recommendation::ByCategory(map) => map.values().flatten().collect(),
        }
    }
}

/// Per-category progress for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub obligations_total: usize,
    pub obligations_met: usize,
    pub remaining: Vec<CourseCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> CourseCode {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("core".parse::<Category>(), Ok(Category::Core));
        assert_eq!(" GenEd ".parse::<Category>(), Ok(Category::GenEd));
        assert_eq!("Elective/eligible".parse::<Category>(), Ok(Category::Elective));
        assert_eq!("elective".parse::<Category>(), Ok(Category::Elective));
        assert!("Minor".parse::<Category>().is_err());
    }

    #[test]
    fn test_compound_needs_every_code() {
        let lab_pair = Choice::CompoundAnd(vec![code("PHY2048"), code("PHY2048L")]);
        let only_lecture = CompletedSet::from_raw(["PHY2048"]);
        let both = CompletedSet::from_raw(["phy2048", "PHY 2048L"]);

        assert!(!lab_pair.is_satisfied(&only_lecture));
        assert!(lab_pair.is_satisfied(&both));
        assert_eq!(lab_pair.lead_code().map(CourseCode::as_str), Some("PHY2048"));
        assert_eq!(Choice::CompoundAnd(Vec::new()).lead_code(), None);
    }

    #[test]
    fn test_department_prefix() {
        assert_eq!(code("COP3502C").department(), "COP");
        assert_eq!(code("eel 3701c").department(), "EEL");
    }

    #[test]
    fn test_recommendation_serializes_by_shape() {
        let single = Recommendation::Single(vec![code("COT3100")]);
        assert_eq!(serde_json::to_string(&single).unwrap(), r#"["COT3100"]"#);

        let mut map = BTreeMap::new();
        map.insert(Category::Core, vec![code("COT3100")]);
        map.insert(Category::GenEd, vec![]);
        map.insert(Category::Elective, vec![]);
        let by_category = Recommendation::ByCategory(map);
        assert_eq!(
            serde_json::to_string(&by_category).unwrap(),
            r#"{"Core":["COT3100"],"GenEd":[],"Elective/eligible":[]}"#
        );
    }

    #[test]
    fn test_course_code_deserialize_normalizes() {
        let parsed: CourseCode = serde_json::from_str(r#"" cop 3502c""#).unwrap();
        assert_eq!(parsed.as_str(), "COP3502C");
        assert!(serde_json::from_str::<CourseCode>(r#""   ""#).is_err());
    }
}
