/// Types for course catalog data
use serde::{Deserialize, Serialize};

pub const DEFAULT_CREDITS: u32 = 3;
pub const DEFAULT_GRADING_SCHEME: &str = "Letter Grade";
pub const UNKNOWN_INSTRUCTOR: &str = "TBD";

/// Where a [`CourseInfo`] record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoSource {
    Catalog,
    Syllabus,
    Placeholder,
}

/// Display information for one course. Best effort; never drives eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub description: String,
    /// Free-text prerequisites as printed in the catalog
    pub prerequisites: String,
    pub grading_scheme: String,
    pub instructor: String,
    pub syllabus_url: Option<String>,
    pub source: InfoSource,
    /// RFC 3339 timestamp
    pub fetched_at: String,
}

impl CourseInfo {
    /// Degraded record returned when nothing could be fetched.
    pub fn placeholder(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: format!("Course {code}"),
            credits: DEFAULT_CREDITS,
            description: "Course information not available in the catalog.".to_string(),
            prerequisites: "Check with academic advisor".to_string(),
            grading_scheme: DEFAULT_GRADING_SCHEME.to_string(),
            instructor: UNKNOWN_INSTRUCTOR.to_string(),
            syllabus_url: None,
            source: InfoSource::Placeholder,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Record built only from the syllabus listing.
    pub fn from_syllabus(code: &str, syllabus: SyllabusEntry) -> Self {
        let name = if syllabus.course_title.is_empty() {
            format!("Course {code}")
        } else {
            syllabus.course_title
        };

        Self {
            code: code.to_string(),
            name,
            credits: DEFAULT_CREDITS,
            description: "Course description available through UF catalog.".to_string(),
            prerequisites: String::new(),
            grading_scheme: DEFAULT_GRADING_SCHEME.to_string(),
            instructor: syllabus.instructor,
            syllabus_url: syllabus.syllabus_url,
            source: InfoSource::Syllabus,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Overlays syllabus instructor and link onto a catalog record. The
    /// catalog name wins.
    pub fn merge_syllabus(&mut self, syllabus: SyllabusEntry) {
        if syllabus.instructor != UNKNOWN_INSTRUCTOR {
            self.instructor = syllabus.instructor;
        }
        if syllabus.syllabus_url.is_some() {
            self.syllabus_url = syllabus.syllabus_url;
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == InfoSource::Placeholder
    }
}

/// A row of the CISE syllabus listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllabusEntry {
    pub course_title: String,
    /// "First Last", or "TBD"
    pub instructor: String,
    pub syllabus_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_defaults() {
        let info = CourseInfo::placeholder("COP3502C");
        assert_eq!(info.name, "Course COP3502C");
        assert_eq!(info.credits, 3);
        assert_eq!(info.instructor, "TBD");
        assert!(info.syllabus_url.is_none());
        assert!(info.is_placeholder());
    }

    #[test]
    fn test_merge_keeps_catalog_name() {
        let mut info = CourseInfo::placeholder("COP3530");
        info.name = "Data Structures and Algorithms".to_string();
        info.source = InfoSource::Catalog;

        info.merge_syllabus(SyllabusEntry {
            course_title: "DSA".to_string(),
            instructor: "Jane Doe".to_string(),
            syllabus_url: Some("https://cise.ufl.edu/syllabi/cop3530.pdf".to_string()),
        });

        assert_eq!(info.name, "Data Structures and Algorithms");
        assert_eq!(info.instructor, "Jane Doe");
        assert!(info.syllabus_url.is_some());
    }

    #[test]
    fn test_merge_ignores_unknown_instructor() {
        let mut info = CourseInfo::placeholder("COP3530");
        info.instructor = "Someone".to_string();
        info.merge_syllabus(SyllabusEntry {
            course_title: String::new(),
            instructor: UNKNOWN_INSTRUCTOR.to_string(),
            syllabus_url: None,
        });
        assert_eq!(info.instructor, "Someone");
    }
}
