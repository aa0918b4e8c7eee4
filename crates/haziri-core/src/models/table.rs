//! Paging arguments and paged results shared by the list endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Page size used when no explicit length is given.
pub const DEFAULT_PAGE_LENGTH: u32 = 10;

/// Page length used to pull every row for exports.
pub const EXPORT_PAGE_LENGTH: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableArg {
    pub page_no: u32,
    pub page_length: u32,
    pub search: Option<BTreeMap<String, String>>,
}

impl Default for DataTableArg {
    fn default() -> Self {
        Self::page(1, DEFAULT_PAGE_LENGTH)
    }
}

impl DataTableArg {
    pub fn page(page_no: u32, page_length: u32) -> Self {
        Self {
            page_no,
            page_length,
            search: None,
        }
    }

    /// Every row in one page, for the export endpoints.
    pub fn all() -> Self {
        Self::page(1, EXPORT_PAGE_LENGTH)
    }

    /// Add a search filter. Blank values are skipped so `search` stays `null`
    /// when nothing is filtered.
    pub fn with_filter(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.search
                .get_or_insert_with(BTreeMap::new)
                .insert(key.to_string(), value);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.page_no == 0 {
            return Err(ApiError::Validation("Page numbers start at 1".to_string()));
        }
        if self.page_length == 0 {
            return Err(ApiError::Validation(
                "Page length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One page of rows plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedData<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total_records: u64,
}

impl<T> PagedData<T> {
    /// Number of pages at the given page length.
    pub fn page_count(&self, page_length: u32) -> u64 {
        if page_length == 0 {
            return 0;
        }
        self.total_records.div_ceil(u64::from(page_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_serializes_null_search() {
        let json = serde_json::to_value(DataTableArg::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pageNo": 1, "pageLength": 10, "search": null})
        );
    }

    #[test]
    fn test_filters_skip_blank_values() {
        let arg = DataTableArg::page(2, 25)
            .with_filter("searchText", "")
            .with_filter("approvalStatus", "Pending");
        let search = arg.search.as_ref().unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search.get("approvalStatus").map(String::as_str), Some("Pending"));

        let unfiltered = DataTableArg::default().with_filter("searchText", "   ");
        assert!(unfiltered.search.is_none());
    }

    #[test]
    fn test_validation() {
        assert!(DataTableArg::default().validate().is_ok());
        assert!(DataTableArg::page(0, 10).validate().is_err());
        assert!(DataTableArg::page(1, 0).validate().is_err());
    }

    #[test]
    fn test_page_count() {
        let page: PagedData<u8> = PagedData {
            data: vec![],
            total_records: 15,
        };
        assert_eq!(page.page_count(10), 2);
        assert_eq!(page.page_count(15), 1);
        assert_eq!(page.page_count(0), 0);
    }
}
