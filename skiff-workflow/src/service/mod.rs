//! Service layer
//!
//! Services do the local work behind a completed job: fetching its result
//! archives and unpacking them safely onto disk.

mod extractor;
mod retriever;

pub use extractor::{extract_archive, extract_tar_gz};
pub use retriever::ResultRetriever;
