// 分层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

// 重新导出主要类型
pub use domain::{scan_directory, ScanError, ScanOptions, ScanResult, SearchPattern, SearchRequest};
pub use application::{validate, Config};
pub use infrastructure::{ErrorLogger, ErrorType, Logger, LoggerTrait};
pub use presentation::{format_scan_result, print_scan_result, report};
