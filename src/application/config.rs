use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用程序配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 遍历相关配置
    pub scan: ScanConfig,
    /// 显示相关配置
    pub display: DisplayConfig,
    /// 日志相关配置
    pub logging: LoggingConfig,
}

/// 遍历配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 是否遵循 .gitignore 规则
    pub respect_gitignore: bool,
}

/// 显示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 是否绘制柱状图
    pub plot: bool,
    /// 柱状图是否使用颜色
    pub color: bool,
    /// 最长柱的字符数
    pub bar_width: usize,
    /// 扫描时是否显示进度
    pub show_progress: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志文件所在目录
    pub log_dir: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            plot: true,
            color: true,
            bar_width: 40,
            show_progress: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// 从配置文件加载配置，如果文件不存在则创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            eprintln!("已创建默认配置文件: {}", config_path.display());
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if !(10..=200).contains(&self.display.bar_width) {
            anyhow::bail!("bar_width 必须在 10-200 之间");
        }

        if self.logging.log_dir.as_os_str().is_empty() {
            anyhow::bail!("log_dir 不能为空");
        }

        Ok(())
    }
}
