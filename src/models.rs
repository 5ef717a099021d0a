use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::IntoParams;

use crate::core::controller::ListQuery;

/// Query parameters accepted by every list endpoint.
///
/// Empty values (`?limit=&q=`) count as absent.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page size. Zero or absent returns every row without pagination.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    #[param(value_type = Option<u64>, example = 20)]
    pub limit: Option<u64>,
    /// Page number, 1-based.
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    #[param(value_type = Option<u64>, example = 1)]
    pub page: Option<u64>,
    /// Free-text search over the resource's searchable columns.
    #[serde(default)]
    #[param(example = "invoice")]
    pub q: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn into_query(self, owner_id: Option<i32>) -> ListQuery {
        ListQuery {
            limit: self.limit.unwrap_or(0),
            page: self.page.unwrap_or(1),
            query_string: self.q.filter(|q| !q.trim().is_empty()),
            owner_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let params: ListParams = serde_json::from_value(json!({})).unwrap();
        let query = params.into_query(None);
        assert_eq!(query.limit, 0);
        assert_eq!(query.page, 1);
        assert!(query.query_string.is_none());
        assert!(query.owner_id.is_none());
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let params: ListParams =
            serde_json::from_value(json!({"limit": "", "page": "", "q": "   "})).unwrap();
        assert!(params.limit.is_none());
        assert!(params.page.is_none());
        let query = params.into_query(Some(4));
        assert!(query.query_string.is_none());
        assert_eq!(query.owner_id, Some(4));
    }

    #[test]
    fn test_numbers_from_strings() {
        let params: ListParams =
            serde_json::from_value(json!({"limit": "10", "page": "3", "q": "abc"})).unwrap();
        let query = params.into_query(None);
        assert_eq!(query.limit, 10);
        assert_eq!(query.page, 3);
        assert_eq!(query.query_string.as_deref(), Some("abc"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result: Result<ListParams, _> = serde_json::from_value(json!({"limit": "ten"}));
        assert!(result.is_err());
    }
}
