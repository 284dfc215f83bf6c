use serde::{Deserialize, Serialize};

use super::Record;

/// Server-reported pagination metadata, recomputed on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default)]
    pub has_next: bool,
}

/// The two wire shapes the list endpoint has served across backend
/// revisions: a bare array, or an envelope with `data` and `pagination`.
///
/// Decoded exactly once at the API-client boundary; nothing downstream
/// re-sniffs the shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    Paginated {
        data: Vec<Record>,
        #[serde(default)]
        pagination: Option<PageInfo>,
    },
    Plain(Vec<Record>),
}

/// Resolved list result: records plus pagination when the server sent any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsList {
    pub records: Vec<Record>,
    pub page_info: Option<PageInfo>,
}

impl From<ListResponse> for RecordsList {
    fn from(response: ListResponse) -> Self {
        match response {
            ListResponse::Paginated { data, pagination } => Self {
                records: data,
                page_info: pagination,
            },
            ListResponse::Plain(records) => Self {
                records,
                page_info: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_array_resolves_without_page_info() {
        let response: ListResponse = serde_json::from_value(json!([])).unwrap();
        let list = RecordsList::from(response);
        assert!(list.records.is_empty());
        assert!(list.page_info.is_none());
    }

    #[test]
    fn envelope_resolves_with_page_info() {
        let response: ListResponse = serde_json::from_value(json!({
            "data": [],
            "pagination": { "page": 2, "totalPages": 3, "total": 11, "hasPrev": true, "hasNext": true }
        }))
        .unwrap();
        let list = RecordsList::from(response);
        assert_eq!(
            list.page_info,
            Some(PageInfo {
                page: 2,
                total_pages: 3,
                total: 11,
                has_prev: true,
                has_next: true,
            })
        );
    }

    #[test]
    fn envelope_without_pagination_still_decodes() {
        let response: ListResponse = serde_json::from_value(json!({ "data": [] })).unwrap();
        let list = RecordsList::from(response);
        assert!(list.page_info.is_none());
    }
}
