use thiserror::Error;

/// 扫描过程中的错误类型
#[derive(Debug, Error)]
pub enum ScanError {
    /// 命令行参数无效（在遍历开始之前报告）
    #[error("argument {argument}: {message}")]
    InvalidArgument {
        argument: &'static str,
        message: String,
    },

    /// 遍历目录时发生的任何错误，直接中止整个扫描
    #[error("{0}")]
    Traversal(ignore::Error),

    /// 图表组件不可用，不属于致命错误
    #[error("Plot is not available, {0}")]
    ChartingUnavailable(String),
}

impl ScanError {
    /// 构造参数错误
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        ScanError::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScanError::ChartingUnavailable(_))
    }
}
