//! Result domain types

use crate::domain::job::SpecConfig;

/// Result item type for archives served over HTTP
pub const RESULT_TYPE_URL_DOWNLOAD: &str = "urlDownload";

/// Parameter key holding an item's download URL
pub const RESULT_PARAM_URL: &str = "URL";

/// One entry of a completed job's result set
///
/// Result items reuse the generic spec config shape: a type tag plus a
/// parameter map. For `urlDownload` items the `URL` parameter points at a
/// gzip-compressed tar archive.
pub type ResultItem = SpecConfig;

impl SpecConfig {
    /// Download URL of a result item, if present and a string
    pub fn download_url(&self) -> Option<&str> {
        self.param_str(RESULT_PARAM_URL)
    }
}
