use serde::{Deserialize, Serialize};

/// Envelope wrapping every API response. The payload lives in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Paging metadata returned alongside list payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> PaginatedResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data
    }
}

/// Collection payloads come either paged (`{"data": [...], "pagination": {...}}`)
/// or as a bare array, depending on the endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListPayload<T> {
    Paged(PaginatedResponse<T>),
    Bare(Vec<T>),
}

impl<T> From<ListPayload<T>> for PaginatedResponse<T> {
    fn from(payload: ListPayload<T>) -> Self {
        match payload {
            ListPayload::Paged(page) => page,
            ListPayload::Bare(data) => PaginatedResponse {
                data,
                pagination: None,
            },
        }
    }
}
