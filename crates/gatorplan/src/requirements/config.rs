/// Requirement catalog and prerequisite map loading
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::error::CatalogError;
use super::normalize::normalize;
use super::types::{Category, Choice, CourseCode, Obligation};

/// Files compiled into the binary; the same data ships in `requirements_config/`.
const BUILTIN_COLLEGES: &[(&str, &str)] = &[
    (
        "colleges/ENG.json",
        include_str!("../../requirements_config/colleges/ENG.json"),
    ),
    (
        "colleges/CLAS.json",
        include_str!("../../requirements_config/colleges/CLAS.json"),
    ),
];
const BUILTIN_PREREQUISITES: &str = include_str!("../../requirements_config/prerequisites.json");

const PREREQUISITES_FILE: &str = "prerequisites.json";

/// Separator for compound choices written as a single string (`"PHY2048|PHY2048L"`).
const COMPOUND_SEPARATOR: char = '|';

/// College file as written on disk
#[derive(Debug, Deserialize)]
struct RawCollege {
    college_code: String,
    college_name: String,
    #[serde(default)]
    aliases: Vec<String>,
    categories: HashMap<String, Vec<RawObligation>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawObligation {
    Single(String),
    Group(Vec<RawChoice>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChoice {
    Code(String),
    Compound(Vec<String>),
}

/// Requirements for one college, parsed and canonical.
#[derive(Debug, Clone)]
pub struct CollegeRequirements {
    pub college_code: String,
    pub college_name: String,
    pub categories: HashMap<Category, Vec<Obligation>>,
}

impl CollegeRequirements {
    /// Obligations of a category; empty when the college does not list it.
    pub fn obligations(&self, category: Category) -> &[Obligation] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// College → category → obligations. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct RequirementCatalog {
    colleges: HashMap<String, CollegeRequirements>,
    /// Uppercased alias → college code
    aliases: HashMap<String, String>,
}

impl RequirementCatalog {
    /// Parses the requirement files compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (location, content) in BUILTIN_COLLEGES {
            catalog.add_college_json(location, content)?;
        }
        Ok(catalog)
    }

    /// Loads every `*.json` file under `<config_dir>/colleges`.
    ///
    /// A missing directory yields an empty catalog, same as a college that
    /// is not configured.
    pub fn load_from_directory(config_dir: &Path) -> Result<Self, CatalogError> {
        let colleges_dir = config_dir.join("colleges");
        let mut catalog = Self::default();

        if colleges_dir.is_dir() {
            let entries = fs::read_dir(&colleges_dir).map_err(|source| CatalogError::Io {
                path: colleges_dir.display().to_string(),
                source,
            })?;

            let mut paths = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| CatalogError::Io {
                    path: colleges_dir.display().to_string(),
                    source,
                })?;
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) == Some("json") {
                    paths.push(path);
                }
            }
            // Stable load order so duplicate errors are reproducible
            paths.sort();

            for path in paths {
                let location = path.display().to_string();
                let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                    path: location.clone(),
                    source,
                })?;
                catalog.add_college_json(&location, &content)?;
            }
        }

        info!(
            colleges = catalog.colleges.len(),
            dir = %config_dir.display(),
            "Loaded requirement catalog"
        );
        Ok(catalog)
    }

    /// Parses one college file and adds it to the catalog.
    pub fn add_college_json(&mut self, location: &str, content: &str) -> Result<(), CatalogError> {
        let raw: RawCollege = serde_json::from_str(content).map_err(|source| CatalogError::Json {
            path: location.to_string(),
            source,
        })?;
        let college = parse_college(location, raw.college_code, raw.college_name, raw.categories)?;

        let code_key = college.college_code.to_uppercase();
        if self.colleges.contains_key(&code_key) || self.aliases.contains_key(&code_key) {
            return Err(CatalogError::DuplicateCollege { key: code_key });
        }

        for alias in raw.aliases {
            let alias_key = alias.trim().to_uppercase();
            if alias_key.is_empty() {
                return Err(CatalogError::malformed(location, "empty college alias"));
            }
            if self.colleges.contains_key(&alias_key) || self.aliases.contains_key(&alias_key) {
                return Err(CatalogError::DuplicateCollege { key: alias_key });
            }
            self.aliases.insert(alias_key, code_key.clone());
        }

        debug!(college = %code_key, location, "Parsed college requirements");
        self.colleges.insert(code_key, college);
        Ok(())
    }

    /// Looks a college up by code or alias, ignoring case and surrounding
    /// whitespace.
    pub fn college(&self, college: &str) -> Option<&CollegeRequirements> {
        let key = college.trim().to_uppercase();
        if key.is_empty() {
            return None;
        }
        self.colleges.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|code| self.colleges.get(code))
        })
    }

    /// Obligations for a college and category; empty when either is unknown.
    pub fn obligations(&self, college: &str, category: Category) -> &[Obligation] {
        self.college(college)
            .map(|c| c.obligations(category))
            .unwrap_or(&[])
    }

    /// Configured college codes, sorted.
    pub fn college_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.colleges.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.colleges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colleges.is_empty()
    }
}

fn parse_college(
    location: &str,
    college_code: String,
    college_name: String,
    raw_categories: HashMap<String, Vec<RawObligation>>,
) -> Result<CollegeRequirements, CatalogError> {
    let college_code = college_code.trim().to_string();
    if college_code.is_empty() {
        return Err(CatalogError::malformed(location, "empty college_code"));
    }

    let mut categories = HashMap::new();
    for (name, raw_obligations) in raw_categories {
        let category = Category::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| CatalogError::malformed(location, format!("unknown category {name:?}")))?;

        let where_ = format!("{location} [{college_code}/{name}]");
        let obligations = raw_obligations
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| parse_obligation(&format!("{where_} #{idx}"), raw))
            .collect::<Result<Vec<_>, _>>()?;
        categories.insert(category, obligations);
    }

    Ok(CollegeRequirements {
        college_code,
        college_name,
        categories,
    })
}

fn parse_obligation(location: &str, raw: RawObligation) -> Result<Obligation, CatalogError> {
    match raw {
        RawObligation::Single(code) => {
            if code.contains(COMPOUND_SEPARATOR) {
                return Err(CatalogError::malformed(
                    location,
                    format!("compound {code:?} must appear inside an OR-group"),
                ));
            }
            Ok(Obligation::Single(parse_code(location, &code)?))
        }
        RawObligation::Group(choices) => {
            if choices.is_empty() {
                return Err(CatalogError::malformed(location, "empty OR-group"));
            }
            let choices = choices
                .into_iter()
                .map(|choice| parse_choice(location, choice))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Obligation::OrGroup(choices))
        }
    }
}

fn parse_choice(location: &str, raw: RawChoice) -> Result<Choice, CatalogError> {
    match raw {
        RawChoice::Code(code) if code.contains(COMPOUND_SEPARATOR) => {
            let parts: Vec<&str> = code.split(COMPOUND_SEPARATOR).collect();
            parse_compound(location, &parts)
        }
        RawChoice::Code(code) => Ok(Choice::Single(parse_code(location, &code)?)),
        RawChoice::Compound(codes) => parse_compound(location, &codes),
    }
}

fn parse_compound<S: AsRef<str>>(location: &str, parts: &[S]) -> Result<Choice, CatalogError> {
    if parts.is_empty() {
        return Err(CatalogError::malformed(location, "empty compound choice"));
    }
    let codes = parts
        .iter()
        .map(|part| parse_code(location, part.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Choice::CompoundAnd(codes))
}

fn parse_code(location: &str, raw: &str) -> Result<CourseCode, CatalogError> {
    normalize(raw).ok_or_else(|| CatalogError::malformed(location, "empty course code"))
}

/// Course → direct prerequisites. A course without an entry has none.
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteMap {
    entries: HashMap<CourseCode, Vec<CourseCode>>,
}

impl PrerequisiteMap {
    /// Parses the prerequisite map compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(PREREQUISITES_FILE, BUILTIN_PREREQUISITES)
    }

    /// Loads `<config_dir>/prerequisites.json`; a missing file means no
    /// course has prerequisites.
    pub fn load_from_directory(config_dir: &Path) -> Result<Self, CatalogError> {
        let path = config_dir.join(PREREQUISITES_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let location = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: location.clone(),
            source,
        })?;
        Self::from_json(&location, &content)
    }

    pub fn from_json(location: &str, content: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(content).map_err(|source| CatalogError::Json {
                path: location.to_string(),
                source,
            })?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (course, prereqs) in raw {
            let where_ = format!("{location} [{course}]");
            let course = parse_code(&where_, &course)?;
            let prereqs = prereqs
                .iter()
                .map(|p| parse_code(&where_, p))
                .collect::<Result<Vec<_>, _>>()?;
            if entries.insert(course.clone(), prereqs).is_some() {
                return Err(CatalogError::malformed(
                    where_,
                    format!("{course} is listed more than once"),
                ));
            }
        }

        Ok(Self { entries })
    }

    /// Direct prerequisites of a course, in listed order.
    pub fn prerequisites_of(&self, course: &CourseCode) -> &[CourseCode] {
        self.entries
            .get(course)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(CourseCode, Vec<CourseCode>)> for PrerequisiteMap {
    fn from_iter<T: IntoIterator<Item = (CourseCode, Vec<CourseCode>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn code(raw: &str) -> CourseCode {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = RequirementCatalog::builtin().unwrap();
        assert_eq!(catalog.college_codes(), vec!["CLAS", "ENG"]);

        let core = catalog.obligations("ENG", Category::Core);
        assert_eq!(core[0], Obligation::Single(code("COP3502C")));
        assert!(core.contains(&Obligation::OrGroup(vec![
            Choice::Single(code("CIS4914")),
            Choice::Single(code("EGN4952")),
        ])));
    }

    #[test]
    fn test_builtin_clas_has_compound_physics() {
        let catalog = RequirementCatalog::builtin().unwrap();
        let gened = catalog.obligations("CLAS", Category::GenEd);
        assert!(gened.contains(&Obligation::OrGroup(vec![
            Choice::CompoundAnd(vec![code("PHY2048"), code("PHY2048L")]),
            Choice::CompoundAnd(vec![code("PHY2053"), code("PHY2053L")]),
        ])));
    }

    #[test]
    fn test_college_lookup_ignores_case_and_aliases() {
        let catalog = RequirementCatalog::builtin().unwrap();
        assert!(catalog.college(" eng ").is_some());
        assert_eq!(
            catalog.college("Engineering").map(|c| c.college_code.as_str()),
            Some("ENG")
        );
        assert!(catalog.college("").is_none());
        assert!(catalog.obligations("MED", Category::Core).is_empty());
    }

    #[test]
    fn test_pipe_compound_and_array_compound_agree() {
        let mut catalog = RequirementCatalog::default();
        catalog
            .add_college_json(
                "inline",
                r#"{
                    "college_code": "TST",
                    "college_name": "Test",
                    "categories": {
                        "Core": [["A1|A1L", ["B1", "B1L"]]]
                    }
                }"#,
            )
            .unwrap();
        assert_eq!(
            catalog.obligations("TST", Category::Core),
            &[Obligation::OrGroup(vec![
                Choice::CompoundAnd(vec![code("A1"), code("A1L")]),
                Choice::CompoundAnd(vec![code("B1"), code("B1L")]),
            ])]
        );
    }

    #[test]
    fn test_malformed_entries_fail_fast() {
        let cases = [
            r#"{"college_code": "X", "college_name": "X", "categories": {"Core": [" "]}}"#,
            r#"{"college_code": "X", "college_name": "X", "categories": {"Core": [[]]}}"#,
            r#"{"college_code": "X", "college_name": "X", "categories": {"Core": [[[]]]}}"#,
            r#"{"college_code": "X", "college_name": "X", "categories": {"Core": ["A|B"]}}"#,
            r#"{"college_code": "X", "college_name": "X", "categories": {"Minor": ["A"]}}"#,
            r#"{"college_code": " ", "college_name": "X", "categories": {}}"#,
            r#"{"college_code": "X", "college_name": "X", "categories": {"Core": [[["A", ["B"]]]]}}"#,
        ];

        for case in cases {
            let mut catalog = RequirementCatalog::default();
            assert!(
                catalog.add_college_json("inline", case).is_err(),
                "expected failure for {case}"
            );
        }
    }

    #[test]
    fn test_duplicate_college_rejected() {
        let mut catalog = RequirementCatalog::default();
        let json = r#"{"college_code": "X", "college_name": "X", "categories": {}}"#;
        catalog.add_college_json("a", json).unwrap();
        assert!(matches!(
            catalog.add_college_json("b", json),
            Err(CatalogError::DuplicateCollege { .. })
        ));
    }

    #[test]
    fn test_builtin_prerequisites_are_canonical() {
        let prereqs = PrerequisiteMap::builtin().unwrap();
        assert_eq!(
            prereqs.prerequisites_of(&code("COT3100")),
            &[code("MAC2311"), code("COP3503C")]
        );
        assert!(prereqs.prerequisites_of(&code("MAC2311")).is_empty());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("colleges")).unwrap();

        let mut college = fs::File::create(dir.path().join("colleges/BUS.json")).unwrap();
        write!(
            college,
            r#"{{"college_code": "BUS", "college_name": "Business", "aliases": ["Warrington"],
                "categories": {{"Core": ["ACG 2021", ["ECO2013", "ECO2023"]]}}}}"#
        )
        .unwrap();
        fs::write(dir.path().join("colleges/notes.txt"), "ignored").unwrap();
        fs::write(
            dir.path().join(PREREQUISITES_FILE),
            r#"{"acg2071": ["ACG2021"]}"#,
        )
        .unwrap();

        let catalog = RequirementCatalog::load_from_directory(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.obligations("warrington", Category::Core)[0],
            Obligation::Single(code("ACG2021"))
        );

        let prereqs = PrerequisiteMap::load_from_directory(dir.path()).unwrap();
        assert_eq!(prereqs.prerequisites_of(&code("ACG2071")), &[code("ACG2021")]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(RequirementCatalog::load_from_directory(&missing)
            .unwrap()
            .is_empty());
        assert!(PrerequisiteMap::load_from_directory(&missing)
            .unwrap()
            .is_empty());
    }
}
