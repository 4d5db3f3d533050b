//! Fetches course display information from the UF catalog.
//!
//! A lookup walks the catalog department pages in order:
//! 1. The page mapped from the code's department prefix
//! 2. The CISE page
//! 3. Every other configured page, once each
//!
//! CISE courses are also looked up in the syllabus listing. Whatever is found
//! is merged; when nothing is, the caller gets a placeholder record.

use super::cache::{CacheStats, CircuitBreaker, CourseInfoCache};
use super::error::CatalogInfoError;
use super::parser::{parse_catalog_page, parse_syllabus_page};
use super::types::{CourseInfo, SyllabusEntry};
use crate::requirements::{normalize, CourseCode};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const CATALOG_BASE_URL: &str = "https://catalog.ufl.edu/UGRD/courses/";
const CISE_PATH: &str = "computer_and_information_science_and_engineering";
const SYLLABUS_URL: &str = "https://cise.ufl.edu/academics/course-syllabi/";

/// Department prefixes and the catalog page that lists them.
const DEPARTMENT_PATHS: &[(&str, &str)] = &[
    ("CAI", CISE_PATH),
    ("CAP", CISE_PATH),
    ("CDA", CISE_PATH),
    ("CEN", CISE_PATH),
    ("CGS", CISE_PATH),
    ("CIS", CISE_PATH),
    ("CNT", CISE_PATH),
    ("COP", CISE_PATH),
    ("COT", CISE_PATH),
    ("EEL", "electrical_and_computer_engineering"),
    ("EGN", "engineering"),
    ("ENC", "english"),
    ("MAC", "mathematics"),
    ("MAP", "mathematics"),
    ("MAS", "mathematics"),
    ("PHI", "philosophy"),
    ("PHY", "physics"),
    ("STA", "statistics"),
];

/// Fetches a page body as text.
///
/// Implementations must map non-success statuses to
/// [`CatalogInfoError::Status`].
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, CatalogInfoError>>;
}

/// [`PageFetcher`] backed by reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CatalogInfoError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogInfoError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, CatalogInfoError>> {
        async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CatalogInfoError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        }
        .boxed()
    }
}

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Department prefix to catalog page URL
    pub department_pages: BTreeMap<String, String>,
    /// Fallback page searched right after the department page
    pub cise_page: String,
    pub syllabus_page: String,
    /// Prefixes whose courses appear in the syllabus listing
    pub syllabus_departments: Vec<String>,
    /// TTL for records that came from the catalog or syllabus
    pub cache_ttl: Duration,
    /// TTL for placeholders, so a flaky catalog is retried sooner
    pub placeholder_ttl: Duration,
    pub failure_threshold: u32,
    pub recovery_time: Duration,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        let page = |path: &str| format!("{CATALOG_BASE_URL}{path}/");

        Self {
            department_pages: DEPARTMENT_PATHS
                .iter()
                .map(|(dept, path)| (dept.to_string(), page(path)))
                .collect(),
            cise_page: page(CISE_PATH),
            syllabus_page: SYLLABUS_URL.to_string(),
            syllabus_departments: DEPARTMENT_PATHS
                .iter()
                .filter(|(_, path)| *path == CISE_PATH)
                .map(|(dept, _)| dept.to_string())
                .collect(),
            cache_ttl: Duration::from_secs(60 * 60),
            placeholder_ttl: Duration::from_secs(5 * 60),
            failure_threshold: 5,
            recovery_time: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl CatalogClientConfig {
    /// Catalog pages to search for `code`, in order, without repeats.
    pub fn catalog_pages_for(&self, code: &CourseCode) -> Vec<&str> {
        let preferred = self
            .department_pages
            .get(code.department())
            .map(String::as_str);
        let candidates = preferred
            .into_iter()
            .chain(std::iter::once(self.cise_page.as_str()))
            .chain(self.department_pages.values().map(String::as_str));

        let mut pages: Vec<&str> = Vec::new();
        for url in candidates {
            if !pages.contains(&url) {
                pages.push(url);
            }
        }
        pages
    }

    fn has_syllabus(&self, code: &CourseCode) -> bool {
        self.syllabus_departments
            .iter()
            .any(|dept| dept == code.department())
    }
}

/// Best-effort course information lookup with caching.
pub struct CatalogClient {
    fetcher: Arc<dyn PageFetcher>,
    config: CatalogClientConfig,
    cache: CourseInfoCache,
    breaker: CircuitBreaker,
}

impl CatalogClient {
    /// Creates a client that fetches over HTTP.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogInfoError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: CatalogClientConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            cache: CourseInfoCache::new(config.cache_ttl),
            breaker: CircuitBreaker::new(config.failure_threshold, config.recovery_time),
            fetcher,
            config,
        }
    }

    /// Looks up one course. Never fails: anything that goes wrong yields a
    /// placeholder record.
    pub async fn lookup(&self, raw: &str) -> CourseInfo {
        let Some(code) = normalize(raw) else {
            debug!(raw = %raw, "Course code normalizes to nothing, returning placeholder");
            return CourseInfo::placeholder(raw.trim());
        };

        if let Some(cached) = self.cache.get(&code) {
            debug!(code = %code, "Returning cached course info");
            return cached;
        }

        if self.breaker.is_open() {
            warn!(code = %code, "Circuit breaker is open, returning placeholder");
            return CourseInfo::placeholder(code.as_str());
        }

        let start = Instant::now();
        let catalog = self.search_catalog(&code).await;
        let syllabus = if self.config.has_syllabus(&code) {
            self.search_syllabus(&code).await
        } else {
            None
        };

        let info = match (catalog, syllabus) {
            (Some(mut info), Some(syllabus)) => {
                info.merge_syllabus(syllabus);
                info
            }
            (Some(info), None) => info,
            (None, Some(syllabus)) => CourseInfo::from_syllabus(code.as_str(), syllabus),
            (None, None) => CourseInfo::placeholder(code.as_str()),
        };

        let ttl = if info.is_placeholder() {
            self.config.placeholder_ttl
        } else {
            self.config.cache_ttl
        };
        self.cache.insert_with_ttl(code.clone(), info.clone(), ttl);

        info!(
            code = %code,
            source = ?info.source,
            duration_ms = start.elapsed().as_millis() as u64,
            "Course info lookup finished"
        );
        info
    }

    /// Looks up several courses concurrently, preserving input order.
    pub async fn lookup_many<S: AsRef<str>>(&self, raws: &[S]) -> Vec<CourseInfo> {
        future::join_all(raws.iter().map(|raw| self.lookup(raw.as_ref()))).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops the cached record for one course. Returns false when `raw` is
    /// not a course code.
    pub fn invalidate(&self, raw: &str) -> bool {
        match normalize(raw) {
            Some(code) => {
                self.cache.invalidate(&code);
                true
            }
            None => false,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Removes expired cache entries.
    pub fn cleanup(&self) {
        self.cache.cleanup_expired();
    }

    async fn search_catalog(&self, code: &CourseCode) -> Option<CourseInfo> {
        for url in self.config.catalog_pages_for(code) {
            let Some(html) = self.fetch_page(url).await else {
                if self.breaker.is_open() {
                    break;
                }
                continue;
            };

            if let Some(info) = parse_catalog_page(&html, code) {
                debug!(code = %code, url = %url, "Found course in catalog");
                return Some(info);
            }
        }
        None
    }

    async fn search_syllabus(&self, code: &CourseCode) -> Option<SyllabusEntry> {
        let base = match Url::parse(&self.config.syllabus_page) {
            Ok(base) => base,
            Err(e) => {
                warn!(error = %e, "Syllabus page URL is invalid");
                return None;
            }
        };

        let html = self.fetch_page(base.as_str()).await?;
        parse_syllabus_page(&html, code, &base)
    }

    async fn fetch_page(&self, url: &str) -> Option<String> {
        if self.breaker.is_open() {
            return None;
        }

        match self.fetcher.fetch(url).await {
            Ok(html) => {
                self.breaker.record_success();
                Some(html)
            }
            Err(e) => {
                if e.is_retryable() {
                    self.breaker.record_failure();
                }
                warn!(url = %url, error = %e, "Failed to fetch catalog page");
                None
            }
        }
    }
}
