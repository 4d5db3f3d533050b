//! One-level prerequisite checks.
//!
//! Completion is self-reported, so only a course's direct prerequisites are
//! checked; whether those were themselves validly earned is assumed.

use super::config::PrerequisiteMap;
use super::normalize::normalize;
use super::types::{CompletedSet, CourseCode};

impl PrerequisiteMap {
    /// Returns true if every direct prerequisite of `target` is completed.
    ///
    /// A course without an entry (or with an empty list) is always
    /// satisfiable; a blank target never is.
    pub fn is_satisfied(&self, completed: &CompletedSet, target: &str) -> bool {
        match normalize(target) {
            Some(target) => self.is_code_satisfied(completed, &target),
            None => false,
        }
    }

    /// Same as [`is_satisfied`](Self::is_satisfied) for an already canonical code.
    pub fn is_code_satisfied(&self, completed: &CompletedSet, target: &CourseCode) -> bool {
        self.prerequisites_of(target)
            .iter()
            .all(|prereq| completed.contains(prereq))
    }

    /// Unmet direct prerequisites of `target`, in listed order.
    pub fn missing_prerequisites(&self, completed: &CompletedSet, target: &str) -> Vec<CourseCode> {
        let Some(target) = normalize(target) else {
            return Vec::new();
        };
        self.prerequisites_of(&target)
            .iter()
            .filter(|prereq| !completed.contains(prereq))
            .cloned()
            .collect()
    }
}
