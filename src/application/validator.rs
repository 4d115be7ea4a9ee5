use std::path::Path;

use crate::domain::search::{ROOTDIR_ARG, SEARCH_STRING_ARG};
use crate::domain::{ScanError, SearchPattern, SearchRequest};

/// 验证命令行输入并生成搜索请求
///
/// 按顺序检查：根目录缺失、根目录不是已存在的目录、搜索串缺失、搜索串不是合法正则。
/// 不会访问根目录以外的任何内容。
pub fn validate(rootdir: Option<&Path>, search_string: Option<&str>) -> Result<SearchRequest, ScanError> {
    let root = match rootdir {
        Some(rootdir) if !rootdir.as_os_str().is_empty() => rootdir.to_path_buf(),
        _ => return Err(ScanError::invalid_argument(ROOTDIR_ARG, "Missing root directory path")),
    };

    if !root.is_dir() {
        return Err(ScanError::invalid_argument(ROOTDIR_ARG, "Incorrect directory path"));
    }

    let search_string = match search_string {
        Some(search_string) => search_string,
        None => {
            return Err(ScanError::invalid_argument(
                SEARCH_STRING_ARG,
                "Missing filename search string",
            ))
        }
    };

    let pattern = SearchPattern::new(search_string)?;

    Ok(SearchRequest::new(root, pattern))
}
