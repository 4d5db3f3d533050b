/// Course recommendation and progress processing
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::config::{PrerequisiteMap, RequirementCatalog};
use super::types::*;

/// Sample sizes for a recommendation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendLimits {
    /// Codes per category when every category is requested
    pub per_category: usize,
    /// Codes when a single category is requested
    pub single_category: usize,
}

impl Default for RecommendLimits {
    fn default() -> Self {
        Self {
            per_category: 2,
            single_category: 4,
        }
    }
}

/// Turns a student's completed courses into category-bucketed suggestions.
///
/// Holds the two read-only catalogs behind `Arc`s so one selector can be
/// shared by every request.
#[derive(Debug, Clone)]
pub struct RecommendationSelector {
    catalog: Arc<RequirementCatalog>,
    prerequisites: Arc<PrerequisiteMap>,
}

impl RecommendationSelector {
    pub fn new(catalog: Arc<RequirementCatalog>, prerequisites: Arc<PrerequisiteMap>) -> Self {
        Self {
            catalog,
            prerequisites,
        }
    }

    pub fn catalog(&self) -> &RequirementCatalog {
        &self.catalog
    }

    pub fn prerequisites(&self) -> &PrerequisiteMap {
        &self.prerequisites
    }

    /// Recommends courses for `college` given raw completed course codes.
    ///
    /// A blank college or an empty `completed` list yields the empty result
    /// for the request shape. Otherwise each requested category's eligible
    /// pool is filtered to prerequisite-satisfied codes and sampled uniformly
    /// without replacement using `rng`. A category with nothing left owed is
    /// returned empty without touching `rng`.
    pub fn recommend<S, R>(
        &self,
        college: &str,
        completed: &[S],
        request: CategoryRequest,
        limits: RecommendLimits,
        rng: &mut R,
    ) -> Recommendation
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if college.trim().is_empty() || completed.is_empty() {
            return Recommendation::empty(request);
        }

        let completed = CompletedSet::from_raw(completed);

        match request {
            CategoryRequest::OneCategory(category) => Recommendation::Single(self.sample_category(
                college,
                &completed,
                category,
                limits.single_category,
                rng,
            )),
            CategoryRequest::AllCategories => {
                let by_category = Category::ALL
                    .into_iter()
                    .map(|category| {
                        let picks = self.sample_category(
                            college,
                            &completed,
                            category,
                            limits.per_category,
                            rng,
                        );
                        (category, picks)
                    })
                    .collect::<BTreeMap<_, _>>();
                Recommendation::ByCategory(by_category)
            }
        }
    }

    /// Eligible, prerequisite-satisfied codes of a category before sampling.
    pub fn candidates(
        &self,
        completed: &CompletedSet,
        college: &str,
        category: Category,
    ) -> Vec<CourseCode> {
        self.catalog
            .eligible_remaining(completed, college, category)
            .into_iter()
            .filter(|code| self.prerequisites.is_code_satisfied(completed, code))
            .collect()
    }

    fn sample_category<R: Rng + ?Sized>(
        &self,
        college: &str,
        completed: &CompletedSet,
        category: Category,
        limit: usize,
        rng: &mut R,
    ) -> Vec<CourseCode> {
        let pool = self.catalog.eligible_remaining(completed, college, category);
        if pool.is_empty() {
            debug!(college, %category, "Category fulfilled, nothing to recommend");
            return Vec::new();
        }

        let filtered: Vec<CourseCode> = pool
            .into_iter()
            .filter(|code| self.prerequisites.is_code_satisfied(completed, code))
            .collect();
        if filtered.is_empty() || limit == 0 {
            debug!(college, %category, "No eligible course has its prerequisites met");
            return Vec::new();
        }

        let amount = limit.min(filtered.len());
        debug!(
            college,
            %category,
            candidates = filtered.len(),
            amount,
            "Sampling recommendations"
        );
        filtered.choose_multiple(rng, amount).cloned().collect()
    }

    /// Progress per category in fixed category order.
    pub fn summarize<S: AsRef<str>>(&self, college: &str, completed: &[S]) -> Vec<CategorySummary> {
        let completed = CompletedSet::from_raw(completed);

        Category::ALL
            .into_iter()
            .map(|category| {
                let obligations = self.catalog.obligations(college, category);
                CategorySummary {
                    category,
                    obligations_total: obligations.len(),
                    obligations_met: obligations.iter().filter(|o| o.is_met(&completed)).count(),
                    remaining: self
                        .catalog
                        .eligible_remaining(&completed, college, category),
                }
            })
            .collect()
    }
}
