use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;

use crate::domain::ScanError;

/// 错误类型分类
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// 命令行参数错误
    InvalidArgument,
    /// 目录遍历错误
    Traversal,
    /// 配置或其他运行错误
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidArgument => "参数错误",
            ErrorType::Traversal => "目录遍历",
            ErrorType::Config => "配置",
        }
    }

    /// 根据错误链判断分类
    pub fn classify(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ScanError>() {
            Some(ScanError::InvalidArgument { .. }) => ErrorType::InvalidArgument,
            Some(ScanError::Traversal(_)) => ErrorType::Traversal,
            _ => ErrorType::Config,
        }
    }
}

/// 错误日志记录器
pub struct ErrorLogger {
    error_file: Arc<Mutex<Option<File>>>,
    error_path: PathBuf,
    enabled: bool,
    error_counts: Arc<Mutex<HashMap<ErrorType, usize>>>,
}

impl ErrorLogger {
    /// 创建新的错误日志记录器，日志文件写入 `log_dir`
    pub fn new(enabled: bool, log_dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");

        let error_path = log_dir.join(format!("error_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&error_path)
            .with_context(|| format!("无法创建错误日志文件: {}", error_path.display()))?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        let mut file_clone = file.try_clone()?;
        file_clone.write_all(&[0xEF, 0xBB, 0xBF])?;

        writeln!(file_clone, "# dirmatch 错误日志")?;
        writeln!(file_clone, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file_clone, "# ============================================")?;
        writeln!(file_clone)?;

        Ok(Self {
            error_file: Arc::new(Mutex::new(Some(file))),
            error_path,
            enabled: true,
            error_counts: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// 不写任何内容的错误日志记录器
    pub fn disabled() -> Self {
        Self {
            error_file: Arc::new(Mutex::new(None)),
            error_path: PathBuf::new(),
            enabled: false,
            error_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 记录错误
    pub fn log_error(
        &self,
        error_type: ErrorType,
        path: Option<&str>,
        message: &str,
        details: Option<&str>,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut counts) = self.error_counts.lock() {
            *counts.entry(error_type.clone()).or_insert(0) += 1;
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {} - {}", timestamp, error_type.as_str(), message)?;

                if let Some(path) = path {
                    writeln!(file, "  路径: {}", path)?;
                }

                if let Some(detail) = details {
                    writeln!(file, "  详细信息: {}", detail)?;
                }

                writeln!(file)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    /// 记录一个致命错误，自动分类并写入完整的错误链
    pub fn log_fatal(&self, err: &anyhow::Error, root: Option<&str>) -> Result<()> {
        let details = err
            .chain()
            .skip(1)
            .map(|cause| cause.to_string())
            .collect::<Vec<_>>()
            .join(" <- ");
        let details = (!details.is_empty()).then_some(details);

        self.log_error(
            ErrorType::classify(err),
            root,
            &err.to_string(),
            details.as_deref(),
        )
    }

    /// 获取错误统计信息
    pub fn get_error_summary(&self) -> HashMap<ErrorType, usize> {
        if let Ok(counts) = self.error_counts.lock() {
            counts.clone()
        } else {
            HashMap::new()
        }
    }

    /// 获取总错误数
    pub fn get_total_errors(&self) -> usize {
        if let Ok(counts) = self.error_counts.lock() {
            counts.values().sum()
        } else {
            0
        }
    }

    /// 检查是否有错误
    pub fn has_errors(&self) -> bool {
        self.get_total_errors() > 0
    }

    /// 完成错误日志记录
    pub fn finalize(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if let Ok(mut file_guard) = self.error_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# ============================================")?;
                writeln!(file, "# 结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

                let summary = self.get_error_summary();
                if !summary.is_empty() {
                    writeln!(file, "# 错误统计:")?;
                    for (error_type, count) in &summary {
                        writeln!(file, "#   {}: {} 次", error_type.as_str(), count)?;
                    }
                    writeln!(file, "#   总计: {} 个错误", self.get_total_errors())?;
                } else {
                    writeln!(file, "# 无错误记录")?;
                }

                file.flush()?;
            }
        }

        Ok(())
    }

    /// 打印错误摘要到 stderr（stdout 只输出结果）
    pub fn print_error_summary(&self) {
        if !self.has_errors() {
            return;
        }

        eprintln!("\n⚠️  扫描过程中发现错误:");
        eprintln!("----------------------------");

        for (error_type, count) in &self.get_error_summary() {
            eprintln!("  {}: {} 次", error_type.as_str(), count);
        }

        eprintln!("  总计: {} 个错误", self.get_total_errors());
        eprintln!("  详细错误信息请查看: {}", self.error_path.display());
    }

    /// 获取错误日志文件路径
    pub fn error_path(&self) -> &Path {
        &self.error_path
    }
}
