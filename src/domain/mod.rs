pub mod dir_scanner;
pub mod error;
pub mod scan_result;
pub mod search;

pub use dir_scanner::{scan_directory, ScanOptions};
pub use error::ScanError;
pub use scan_result::ScanResult;
pub use search::{SearchPattern, SearchRequest};
