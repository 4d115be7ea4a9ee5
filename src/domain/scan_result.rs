use std::collections::BTreeMap;

/// 目录路径 -> 匹配文件数
///
/// 键按普通字符串顺序排列，遍历时的插入顺序无关紧要。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    counts: BTreeMap<String, u64>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置目录的匹配数
    pub fn set_count(&mut self, path: impl Into<String>, count: u64) {
        self.counts.insert(path.into(), count);
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.counts.get(path).copied()
    }

    /// 目录数量
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 所有目录的匹配总数
    pub fn total_matches(&self) -> u64 {
        self.counts.values().sum()
    }

    /// 按路径升序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(path, count)| (path.as_str(), *count))
    }
}
