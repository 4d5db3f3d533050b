use crate::requirements::{Category, CategoryRequest};

/// Splits a comma separated `classes` query value, dropping blank entries.
pub fn split_classes(classes: &str) -> Vec<&str> {
    classes
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Result of reading the `category` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryParam {
    Known(CategoryRequest),
    /// A category no college defines; answered with an empty list
    Unknown(String),
}

/// Absent or blank means every category.
pub fn parse_category(raw: Option<&str>) -> CategoryParam {
    match raw.map(str::trim).filter(|c| !c.is_empty()) {
        None => CategoryParam::Known(CategoryRequest::AllCategories),
        Some(name) => match name.parse::<Category>() {
            Ok(category) => CategoryParam::Known(CategoryRequest::OneCategory(category)),
            Err(_) => CategoryParam::Unknown(name.to_string()),
        },
    }
}

/// Reads a response body as JSON.
#[cfg(test)]
pub(crate) async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
