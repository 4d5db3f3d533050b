//! HTML parsing for the course catalog and the CISE syllabus listing.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use super::types::{
    CourseInfo, InfoSource, SyllabusEntry, DEFAULT_CREDITS, DEFAULT_GRADING_SCHEME,
    UNKNOWN_INSTRUCTOR,
};
use crate::requirements::CourseCode;

// Static selectors for parsing - compiled once
static COURSEBLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.courseblock").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.courseblocktitle").unwrap());
static DESC_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.courseblockdesc, p.courseblockdesc").unwrap()
});
static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Title layouts seen in the catalog, most specific first:
/// `COP 3502C Programming Fundamentals 1 (3 Credits)`,
/// `COP3502C Programming Fundamentals 13 Credits`, and anything looser.
static TITLE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)([A-Z]{2,4})\s*(\d{4}[A-Z]*)\s+(.+?)\s*\((\d+)\s*Credits?\)").unwrap(),
        Regex::new(r"(?i)([A-Z]{2,4})(\d{4}[A-Z]*)\s+(.+?)(\d+)\s*Credits?").unwrap(),
        Regex::new(r"(?i)([A-Z]{2,4})\s*(\d{4}[A-Z]*)\s*(.+?)\s*(\d+)\s*Credits?").unwrap(),
    ]
});
static GRADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Grading\s+Scheme:\s*([^\n\r]+)").unwrap());
static PREREQ_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)Prerequisites?:\s*([^\n\r.]+)").unwrap(),
        Regex::new(r"(?i)Prereqs?:\s*([^\n\r.]+)").unwrap(),
        Regex::new(r"(?i)Prerequisites?[:\s]+([^\n\r.]+)").unwrap(),
    ]
});
static GRADING_STRIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Grading\s+Scheme:\s*[^\n\r]+").unwrap());
static PREREQ_STRIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Prerequisites?[:\s]*[^\n\r.]+\.?").unwrap());

/// Finds `code` in a catalog department page.
///
/// A block matches when its whitespace-free, uppercased title contains the
/// code. Blocks whose title cannot be parsed are skipped.
pub fn parse_catalog_page(html: &str, code: &CourseCode) -> Option<CourseInfo> {
    let document = Html::parse_document(html);

    for block in document.select(&COURSEBLOCK_SELECTOR) {
        let Some(title) = block.select(&TITLE_SELECTOR).next() else {
            continue;
        };
        let title_text = collapse_whitespace(&element_text(&title));
        if !strip_whitespace(&title_text)
            .to_uppercase()
            .contains(code.as_str())
        {
            continue;
        }

        if let Some(info) = parse_course_block(&block, &title_text) {
            return Some(info);
        }
        debug!(code = %code, title = %title_text, "Matched course block but title did not parse");
    }

    None
}

fn parse_course_block(block: &ElementRef, title_text: &str) -> Option<CourseInfo> {
    let caps = TITLE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(title_text))?;

    let code = format!("{}{}", &caps[1], &caps[2]).to_uppercase();
    let name = caps[3].trim().to_string();
    let credits = caps[4]
        .parse::<u32>()
        .ok()
        .filter(|&c| c > 0)
        .unwrap_or(DEFAULT_CREDITS);

    let description = block
        .select(&DESC_SELECTOR)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let grading_scheme = GRADING_REGEX
        .captures(&description)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| DEFAULT_GRADING_SCHEME.to_string());

    let prerequisites = PREREQ_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(&description))
        .map(|c| c[1].trim().trim_end_matches('.').trim().to_string())
        .unwrap_or_default();

    let mut cleaned = description.clone();
    if grading_scheme != DEFAULT_GRADING_SCHEME {
        cleaned = GRADING_STRIP_REGEX.replace_all(&cleaned, "").into_owned();
    }
    if !prerequisites.is_empty() {
        cleaned = PREREQ_STRIP_REGEX.replace_all(&cleaned, "").into_owned();
    }

    Some(CourseInfo {
        name: if name.is_empty() {
            format!("Course {code}")
        } else {
            name
        },
        code,
        credits,
        description: collapse_whitespace(&cleaned),
        prerequisites,
        grading_scheme,
        instructor: UNKNOWN_INSTRUCTOR.to_string(),
        syllabus_url: None,
        source: InfoSource::Catalog,
        fetched_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Finds `code` in the syllabus listing tables.
///
/// Rows need at least four cells: title (with the syllabus link), course
/// number, section, instructor. Relative links are resolved against `base`.
pub fn parse_syllabus_page(html: &str, code: &CourseCode, base: &Url) -> Option<SyllabusEntry> {
    let document = Html::parse_document(html);

    for row in document.select(&ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 4 {
            continue;
        }

        let row_text: String = cells.iter().map(element_text).collect();
        if !strip_whitespace(&row_text)
            .to_uppercase()
            .contains(code.as_str())
        {
            continue;
        }

        let title_cell = &cells[0];
        let course_title = collapse_whitespace(&element_text(title_cell));
        let syllabus_url = title_cell
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| base.join(href.trim()).ok())
            .map(String::from);
        let instructor = format_instructor(&collapse_whitespace(&element_text(&cells[3])));

        return Some(SyllabusEntry {
            course_title,
            instructor,
            syllabus_url,
        });
    }

    None
}

/// Turns `"Last, First"` into `"First Last"`; blank or `tbd` becomes `"TBD"`.
pub fn format_instructor(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN_INSTRUCTOR) {
        return UNKNOWN_INSTRUCTOR.to_string();
    }

    match raw.split_once(',') {
        Some((last, first)) if !first.trim().is_empty() => {
            format!("{} {}", first.trim(), last.trim())
        }
        _ => raw.to_string(),
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::normalize;

    const CATALOG_PAGE: &str = r#"
        <html><body>
        <div class="courseblock">
            <p class="courseblocktitle"><strong>COP&#160;3502C  Programming Fundamentals 1 <span>(4 Credits)</span></strong></p>
            <div class="courseblockdesc">
                Introduces the art of programming.
                Grading Scheme: Letter Grade
                Prerequisite: MAC 1147 or MAC 2311.
            </div>
        </div>
        <div class="courseblock">
            <p class="courseblocktitle">COP 3530 Data Structures and Algorithms (3 Credits)</p>
            <div class="courseblockdesc">
                Abstract data types and their implementations.
                Grading Scheme: S/U
                Prerequisites: COP 3503C and COT 3100.
            </div>
        </div>
        <div class="courseblock">
            <p class="courseblocktitle">CIS 4930 Special Topics</p>
        </div>
        </body></html>
    "#;

    const SYLLABUS_PAGE: &str = r#"
        <table>
            <tr><th>Title</th><th>Course Number</th><th>Section(s)</th><th>Instructor</th><th>Semester</th></tr>
            <tr>
                <td><a href="/wp-content/uploads/cop3530.pdf">Data Structures and Algorithms</a></td>
                <td>COP 3530</td><td>1234</td><td>Doe, Jane</td><td>Fall</td>
            </tr>
            <tr>
                <td><a href="https://example.edu/cen3031.pdf">Intro to Software Engineering</a></td>
                <td>CEN3031</td><td>5678</td><td>tbd</td><td>Fall</td>
            </tr>
            <tr><td>COP 4600</td><td>too short</td></tr>
        </table>
    "#;

    fn code(raw: &str) -> CourseCode {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_parse_catalog_course() {
        let info = parse_catalog_page(CATALOG_PAGE, &code("COP3502C")).unwrap();
        assert_eq!(info.code, "COP3502C");
        assert_eq!(info.name, "Programming Fundamentals 1");
        assert_eq!(info.credits, 4);
        assert_eq!(info.grading_scheme, "Letter Grade");
        assert_eq!(info.prerequisites, "MAC 1147 or MAC 2311");
        assert!(info.description.starts_with("Introduces the art of programming."));
        assert!(!info.description.contains("Prerequisite"));
        assert_eq!(info.source, InfoSource::Catalog);
    }

    #[test]
    fn test_parse_catalog_strips_custom_grading() {
        let info = parse_catalog_page(CATALOG_PAGE, &code("cop 3530")).unwrap();
        assert_eq!(info.grading_scheme, "S/U");
        assert_eq!(info.prerequisites, "COP 3503C and COT 3100");
        assert_eq!(
            info.description,
            "Abstract data types and their implementations."
        );
    }

    #[test]
    fn test_parse_catalog_missing_course() {
        assert!(parse_catalog_page(CATALOG_PAGE, &code("CAP4053")).is_none());
        // Title without credits does not parse
        assert!(parse_catalog_page(CATALOG_PAGE, &code("CIS4930")).is_none());
    }

    #[test]
    fn test_parse_syllabus_row() {
        let base = Url::parse("https://cise.ufl.edu/academics/course-syllabi/").unwrap();

        let entry = parse_syllabus_page(SYLLABUS_PAGE, &code("COP3530"), &base).unwrap();
        assert_eq!(entry.course_title, "Data Structures and Algorithms");
        assert_eq!(entry.instructor, "Jane Doe");
        assert_eq!(
            entry.syllabus_url.as_deref(),
            Some("https://cise.ufl.edu/wp-content/uploads/cop3530.pdf")
        );

        let entry = parse_syllabus_page(SYLLABUS_PAGE, &code("CEN3031"), &base).unwrap();
        assert_eq!(entry.instructor, "TBD");
        assert_eq!(
            entry.syllabus_url.as_deref(),
            Some("https://example.edu/cen3031.pdf")
        );

        assert!(parse_syllabus_page(SYLLABUS_PAGE, &code("COP4600"), &base).is_none());
    }

    #[test]
    fn test_format_instructor() {
        assert_eq!(format_instructor("Doe, Jane"), "Jane Doe");
        assert_eq!(format_instructor("Jane Doe"), "Jane Doe");
        assert_eq!(format_instructor("  "), "TBD");
        assert_eq!(format_instructor("TBD"), "TBD");
        assert_eq!(format_instructor("Doe,"), "Doe,");
    }
}
