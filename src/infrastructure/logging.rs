use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Local;

/// 日志记录器trait
pub trait LoggerTrait: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn log_message(&self, message: &str) -> Result<()>;
    fn log_dir(&self, path: &str, matches: u64, status: &str) -> Result<()>;
    fn finalize(&self, total_dirs: usize, total_matches: u64, duration: std::time::Duration) -> Result<()>;
}

/// 调试日志记录器（记录扫描参数、每个目录的计数和结束统计）
pub struct Logger {
    log_file: Arc<Mutex<Option<File>>>,
    log_path: PathBuf,
    enabled: bool,
}

impl Logger {
    /// 创建新的日志记录器，日志文件写入 `log_dir`
    pub fn new(enabled: bool, log_dir: &Path) -> Result<Self> {
        if !enabled {
            return Ok(Self::disabled());
        }

        // 获取当前时间作为文件名的一部分
        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");

        let log_path = log_dir.join(format!("debug_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("无法创建日志文件: {}", log_path.display()))?;

        // 写入UTF-8 BOM以确保文件被正确识别为UTF-8
        let mut file_clone = file.try_clone()?;
        file_clone.write_all(&[0xEF, 0xBB, 0xBF])?;

        writeln!(file_clone, "# dirmatch 调试日志")?;
        writeln!(file_clone, "# 开始时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file_clone, "# --------------------------------------------")?;
        writeln!(file_clone, "# 目录, 匹配文件数, 状态")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(Some(file))),
            log_path,
            enabled: true,
        })
    }

    /// 不写任何内容的日志记录器
    pub fn disabled() -> Self {
        Self {
            log_file: Arc::new(Mutex::new(None)),
            log_path: PathBuf::new(),
            enabled: false,
        }
    }

    /// 获取日志文件路径
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl LoggerTrait for Logger {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn log_message(&self, message: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "[{}] {}", timestamp, message)?;
                file.flush()?;
            }
        }

        Ok(())
    }

    fn log_dir(&self, path: &str, matches: u64, status: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(
                    file,
                    "[{}] 目录: {} | 匹配: {} | 状态: {}",
                    timestamp, path, matches, status
                )?;
                file.flush()?;
            }
        }

        Ok(())
    }

    fn finalize(&self, total_dirs: usize, total_matches: u64, duration: std::time::Duration) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let now = Local::now();

        if let Ok(mut file_guard) = self.log_file.lock() {
            if let Some(ref mut file) = *file_guard {
                writeln!(file, "# --------------------------------------------")?;
                writeln!(file, "# 扫描完成时间: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
                writeln!(file, "# 总用时: {:.3}秒", duration.as_secs_f64())?;
                writeln!(file, "# 扫描目录数: {}", total_dirs)?;
                writeln!(file, "# 匹配文件总数: {}", total_matches)?;
                writeln!(file, "# ============================================")?;
                file.flush()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_logger_creation() {
        let temp_dir = tempdir().unwrap();

        let logger = Logger::new(false, temp_dir.path()).unwrap();
        assert!(!logger.is_enabled());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        let logger = Logger::new(true, temp_dir.path()).unwrap();
        assert!(logger.is_enabled());
        assert!(logger.log_path().exists());
    }

    #[test]
    fn test_logger_writes_entries() {
        let temp_dir = tempdir().unwrap();
        let logger = Logger::new(true, temp_dir.path()).unwrap();
        let logger_trait: &dyn LoggerTrait = &logger;

        logger_trait.log_message("test message").unwrap();
        logger_trait.log_dir("/tmp/x", 3, "已扫描").unwrap();
        logger_trait.finalize(1, 3, Duration::from_millis(5)).unwrap();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("test message"));
        assert!(content.contains("目录: /tmp/x | 匹配: 3"));
        assert!(content.contains("# 扫描目录数: 1"));
    }

    #[test]
    fn test_missing_log_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(Logger::new(true, &missing).is_err());
    }
}
