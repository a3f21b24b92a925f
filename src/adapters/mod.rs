// Adapters layer: concrete implementations for external systems (source download, workbook decoding, storage).

pub mod source;
pub mod storage;
pub mod workbook;

pub use source::{DataSource, SourceFetcher};
pub use storage::LocalStorage;
