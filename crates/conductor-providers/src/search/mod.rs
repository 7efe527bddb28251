//! Web search backends.

mod offline;
mod searxng;

pub use offline::OfflineSearch;
pub use searxng::SearxngSearch;
