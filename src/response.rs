use axum::{
    Json,
    http::header::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Outcome marker carried by every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Uniform response body: `{"status": ..., "data": ..., "message": ...}`.
///
/// Absent parts are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            data: None,
            message: None,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            status: Status::Ok,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Links block of a paginated listing. `last` is the page count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub current: u64,
    pub first: u64,
    pub last: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u64,
    pub links: PageLinks,
    pub exists: bool,
    pub limit: u64,
}

/// `data` of a paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSection<T> {
    pub count: u64,
    pub pagination: PaginationInfo,
    pub items: Vec<T>,
}

impl<T> PageSection<T> {
    /// Build the section for one page of `limit` rows out of `count`.
    ///
    /// `limit` must be non-zero; `page` is 1-based.
    pub fn new(items: Vec<T>, count: u64, page: u64, limit: u64) -> Self {
        let pages = page_count(count, limit);
        Self {
            count,
            pagination: PaginationInfo {
                page,
                links: PageLinks {
                    current: page,
                    first: 1,
                    last: pages,
                    previous: (page > 1).then(|| page - 1),
                    next: (page < pages).then(|| page + 1),
                },
                exists: true,
                limit,
            },
            items,
        }
    }
}

#[must_use]
pub fn page_count(count: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    count.div_ceil(limit)
}

fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// `Content-Range` header for a page of `returned` rows starting at `offset`.
///
/// An empty page is reported as `resource */total`.
#[must_use]
pub fn content_range(resource: &str, offset: u64, returned: u64, total: u64) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource);
    let range = if returned == 0 {
        format!("{safe_name} */{total}")
    } else {
        format!("{safe_name} {offset}-{}/{total}", offset + returned - 1)
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(Envelope::<()>::ok()).unwrap();
        assert_eq!(ok, json!({"status": "ok"}));

        let data = serde_json::to_value(Envelope::data(json!({"id": 1}))).unwrap();
        assert_eq!(data, json!({"status": "ok", "data": {"id": 1}}));

        let message = serde_json::to_value(Envelope::<()>::message("Successfully deleted")).unwrap();
        assert_eq!(message, json!({"status": "ok", "message": "Successfully deleted"}));

        let error = serde_json::to_value(Envelope::<()>::error("nope")).unwrap();
        assert_eq!(error, json!({"status": "error", "message": "nope"}));
    }

    #[test]
    fn test_envelope_deserializes_without_optional_parts() {
        let envelope: Envelope = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert_eq!(envelope.status, Status::Ok);
        assert!(envelope.data.is_none());
        assert!(envelope.message.is_none());
    }

    #[test]
    fn test_page_section_middle_page() {
        let section = PageSection::new(vec![1, 2, 3], 10, 2, 3);
        assert_eq!(section.count, 10);
        assert_eq!(section.pagination.page, 2);
        assert_eq!(section.pagination.limit, 3);
        assert!(section.pagination.exists);
        assert_eq!(
            section.pagination.links,
            PageLinks {
                current: 2,
                first: 1,
                last: 4,
                previous: Some(1),
                next: Some(3),
            }
        );
    }

    #[test]
    fn test_page_section_edges_are_null() {
        let section = PageSection::<i32>::new(vec![], 0, 1, 5);
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["pagination"]["links"]["last"], 0);
        assert_eq!(value["pagination"]["links"]["previous"], json!(null));
        assert_eq!(value["pagination"]["links"]["next"], json!(null));

        let last = PageSection::new(vec![9], 9, 3, 4);
        assert_eq!(last.pagination.links.previous, Some(2));
        assert_eq!(last.pagination.links.next, None);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_content_range() {
        let headers = content_range("example", 0, 10, 100);
        assert_eq!(headers.get("Content-Range").unwrap(), "example 0-9/100");

        let headers = content_range("example", 20, 3, 23);
        assert_eq!(headers.get("Content-Range").unwrap(), "example 20-22/23");

        let headers = content_range("example", 40, 0, 23);
        assert_eq!(headers.get("Content-Range").unwrap(), "example */23");
    }

    #[test]
    fn test_content_range_strips_control_characters() {
        let headers = content_range("example\r\nInjected: evil", 0, 1, 1);
        let value = headers.get("Content-Range").unwrap().to_str().unwrap();
        assert!(!value.contains('\r'));
        assert!(!value.contains('\n'));
        assert!(value.starts_with("exampleInjected: evil"));
    }
}
