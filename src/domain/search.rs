use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use bstr::ByteVec;
use grep_matcher::Matcher;
use grep_regex::RegexMatcher;

use super::error::ScanError;

pub const ROOTDIR_ARG: &str = "-r/--rootdir";
pub const SEARCH_STRING_ARG: &str = "-s/--searchString";

/// 文件名搜索模式，匹配从文件名第一个字节开始（前缀匹配）
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    matcher: RegexMatcher,
}

impl SearchPattern {
    /// 从输入字符串创建搜索模式
    pub fn new(input: &str) -> Result<Self, ScanError> {
        // 先单独验证原始正则表达式，避免包装后掩盖不平衡的括号
        if let Err(err) = regex::Regex::new(input) {
            return Err(ScanError::invalid_argument(
                SEARCH_STRING_ARG,
                format!(
                    "Filename search string is not a proper regular expression ({})",
                    regex_reason(&err)
                ),
            ));
        }

        let anchored = format!(r"\A(?:{})", input);
        let matcher = RegexMatcher::new(&anchored).map_err(|err| {
            ScanError::invalid_argument(
                SEARCH_STRING_ARG,
                format!("Filename search string is not a proper regular expression ({})", err),
            )
        })?;

        Ok(Self {
            source: input.to_string(),
            matcher,
        })
    }

    /// 原始模式文本
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 检查文件名是否匹配
    pub fn is_match(&self, file_name: &OsStr) -> bool {
        let name = Vec::from_os_str_lossy(file_name);
        matches!(self.matcher.find(&name[..]), Ok(Some(m)) if m.start() == 0)
    }
}

/// 取出正则错误中最有用的一行
fn regex_reason(err: &regex::Error) -> String {
    match err {
        regex::Error::Syntax(text) => text
            .lines()
            .rev()
            .find_map(|line| line.trim().strip_prefix("error:"))
            .map(|reason| reason.trim().to_string())
            .unwrap_or_else(|| text.lines().last().unwrap_or_default().trim().to_string()),
        other => other.to_string(),
    }
}

/// 已验证的搜索请求
#[derive(Debug, Clone)]
pub struct SearchRequest {
    root: PathBuf,
    pattern: SearchPattern,
}

impl SearchRequest {
    pub fn new(root: PathBuf, pattern: SearchPattern) -> Self {
        Self { root, pattern }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }
}
