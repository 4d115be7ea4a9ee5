use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::{DirEntry, WalkBuilder};
use indicatif::{ProgressBar, ProgressStyle};

use super::error::ScanError;
use super::scan_result::ScanResult;
use super::search::{SearchPattern, SearchRequest};
use crate::infrastructure::LoggerTrait;

/// 遍历选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// 是否遵循 .gitignore / .ignore 规则，默认会扫描所有目录
    pub respect_gitignore: bool,
    /// 是否在 stderr 显示进度
    pub show_progress: bool,
}

/// 扫描目录树，统计每个目录下直接包含的匹配文件数
///
/// 根目录和所有子目录（任意深度）都会出现在结果中，没有匹配的目录计数为 0。
/// 任何遍历错误都会中止扫描，不返回部分结果。
pub fn scan_directory(
    request: &SearchRequest,
    options: ScanOptions,
    logger: Arc<dyn LoggerTrait>,
) -> Result<ScanResult, ScanError> {
    let pattern = request.pattern();

    let progress = if options.show_progress {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message("已扫描 0 目录");

    if logger.is_enabled() {
        let _ = logger.log_message(&format!(
            "开始扫描目录: {} (模式: {})",
            request.root().display(),
            pattern.as_str()
        ));
    }

    // 顺序遍历器内部使用显式栈，深度优先，不会占用调用栈
    let respect_gitignore = options.respect_gitignore;
    let mut walker = WalkBuilder::new(request.root());
    walker
        .hidden(false)
        .parents(respect_gitignore)
        .ignore(respect_gitignore)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .follow_links(false);

    // 目录 -> 结果中的键和计数
    let mut dirs: HashMap<PathBuf, (String, u64)> = HashMap::new();

    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                if logger.is_enabled() {
                    let _ = logger.log_message(&format!("遍历错误: {}", err));
                }
                progress.finish_and_clear();
                return Err(ScanError::Traversal(err));
            }
        };

        if is_dir(&entry) {
            let key = entry.path().to_string_lossy().into_owned();
            dirs.entry(entry.path().to_path_buf()).or_insert((key, 0));

            progress.set_message(format!("已扫描 {} 目录", dirs.len()));
            progress.tick();
            continue;
        }

        if !is_file(&entry) {
            continue;
        }

        if let Some(parent) = entry.path().parent() {
            if let Err(err) = count_match(&mut dirs, parent, &entry, pattern) {
                progress.finish_and_clear();
                return Err(err);
            }
        }
    }

    let mut scan_result = ScanResult::new();
    for (key, count) in dirs.into_values() {
        if logger.is_enabled() {
            let _ = logger.log_dir(&key, count, "已扫描");
        }
        scan_result.set_count(key, count);
    }

    progress.finish_with_message(format!("完成! 已扫描 {} 目录", scan_result.len()));

    Ok(scan_result)
}

/// 根目录已在验证时确认是目录（可能是指向目录的符号链接）；
/// 其余的符号链接目录不会被跟随，也不算作目录
fn is_dir(entry: &DirEntry) -> bool {
    entry.depth() == 0 || entry.file_type().map_or(false, |ft| ft.is_dir())
}

/// 普通文件，或指向普通文件的符号链接
fn is_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => fs::metadata(entry.path()).map_or(false, |m| m.is_file()),
        _ => false,
    }
}

fn count_match(
    dirs: &mut HashMap<PathBuf, (String, u64)>,
    parent: &Path,
    entry: &DirEntry,
    pattern: &SearchPattern,
) -> Result<(), ScanError> {
    // 遍历是深度优先的，父目录总是先于其中的文件出现
    let Some((_, count)) = dirs.get_mut(parent) else {
        return Err(ScanError::Traversal(ignore::Error::WithPath {
            path: entry.path().to_path_buf(),
            err: Box::new(ignore::Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("父目录未被遍历: {}", parent.display()),
            ))),
        }));
    };

    if pattern.is_match(entry.file_name()) {
        *count += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Logger;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn request(root: &Path, pattern: &str) -> SearchRequest {
        SearchRequest::new(root.to_path_buf(), SearchPattern::new(pattern).unwrap())
    }

    fn scan(root: &Path, pattern: &str) -> ScanResult {
        let logger: Arc<dyn LoggerTrait> = Arc::new(Logger::disabled());
        scan_directory(&request(root, pattern), ScanOptions::default(), logger).unwrap()
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_counts_per_directory() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        File::create(root.join("a.txt")).unwrap();
        File::create(root.join("b.log")).unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        File::create(root.join("sub").join("c.txt")).unwrap();

        let result = scan(root, r"^.*\.txt$");

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&key(root)), Some(1));
        assert_eq!(result.get(&key(&root.join("sub"))), Some(1));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let result = scan(temp_dir.path(), "^a");

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(&key(temp_dir.path())), Some(0));
    }

    #[test]
    fn test_every_directory_present() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let deep = root.join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir(root.join("d")).unwrap();
        File::create(deep.join("match.rs")).unwrap();
        File::create(root.join("a").join("other.rs")).unwrap();

        let result = scan(root, "match");

        assert_eq!(result.len(), 5);
        assert_eq!(result.get(&key(root)), Some(0));
        assert_eq!(result.get(&key(&root.join("a"))), Some(0));
        assert_eq!(result.get(&key(&root.join("a").join("b"))), Some(0));
        assert_eq!(result.get(&key(&deep)), Some(1));
        assert_eq!(result.get(&key(&root.join("d"))), Some(0));
        // 文件不会出现在结果中
        assert_eq!(result.get(&key(&deep.join("match.rs"))), None);
    }

    #[test]
    fn test_directory_names_are_not_counted() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("abc_dir")).unwrap();
        File::create(root.join("abc.txt")).unwrap();

        let result = scan(root, "abc");

        assert_eq!(result.get(&key(root)), Some(1));
        assert_eq!(result.get(&key(&root.join("abc_dir"))), Some(0));
    }

    #[test]
    fn test_hidden_and_ignored_files_included() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "skipped\n").unwrap();
        fs::create_dir(root.join("skipped")).unwrap();
        File::create(root.join("skipped").join("f1")).unwrap();
        File::create(root.join(".hidden_f")).unwrap();

        let result = scan(root, r"\.?[hf]");

        assert_eq!(result.get(&key(root)), Some(1));
        assert_eq!(result.get(&key(&root.join("skipped"))), Some(1));
    }

    #[test]
    fn test_prefix_semantics() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        File::create(root.join("report.csv")).unwrap();
        File::create(root.join("old_report.csv")).unwrap();

        let result = scan(root, "report");
        assert_eq!(result.get(&key(root)), Some(1));
    }

    #[test]
    fn test_idempotent() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("x")).unwrap();
        File::create(root.join("x").join("a1")).unwrap();
        File::create(root.join("a2")).unwrap();

        assert_eq!(scan(root, "a"), scan(root, "a"));
    }

    #[test]
    fn test_trailing_separator_root() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        File::create(root.join("a.txt")).unwrap();
        fs::create_dir(root.join("sub")).unwrap();

        let root_with_slash = format!("{}/", root.display());
        let result = scan(Path::new(&root_with_slash), "a");

        assert_eq!(result.get(&root_with_slash), Some(1));
        assert_eq!(result.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("real")).unwrap();
        File::create(root.join("real").join("a1")).unwrap();
        symlink(root.join("real").join("a1"), root.join("a_link")).unwrap();
        symlink(root.join("real"), root.join("a_dir_link")).unwrap();
        symlink(root.join("nowhere"), root.join("a_broken")).unwrap();

        let result = scan(root, "a");

        // 指向文件的链接计数，目录链接和失效链接不计数，也不跟随
        assert_eq!(result.get(&key(root)), Some(1));
        assert_eq!(result.get(&key(&root.join("real"))), Some(1));
        assert_eq!(result.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root 用户可以读取任何目录，此时没有错误可测
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let logger: Arc<dyn LoggerTrait> = Arc::new(Logger::disabled());
        let result = scan_directory(&request(root, "a"), ScanOptions::default(), logger);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(ScanError::Traversal(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempdir().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir_all(real.join("sub")).unwrap();
        File::create(real.join("a.txt")).unwrap();
        File::create(real.join("sub").join("a2")).unwrap();
        let link = temp_dir.path().join("link");
        symlink(&real, &link).unwrap();

        let result = scan(&link, "a");

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&key(&link)), Some(1));
        assert_eq!(result.get(&key(&link.join("sub"))), Some(1));
    }

    #[test]
    fn test_missing_root_aborts() {
        let temp_dir = tempdir().unwrap();
        let gone = temp_dir.path().to_path_buf();
        temp_dir.close().unwrap();

        let logger: Arc<dyn LoggerTrait> = Arc::new(Logger::disabled());
        let result = scan_directory(&request(&gone, "a"), ScanOptions::default(), logger);

        match result {
            Err(ScanError::Traversal(err)) => {
                assert!(err.to_string().contains(&*gone.to_string_lossy()));
            }
            other => panic!("Expected Traversal error, got {:?}", other),
        }
    }

    #[test]
    fn test_respect_gitignore() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".ignore"), "skipped\n").unwrap();
        fs::create_dir(root.join("skipped")).unwrap();

        let logger: Arc<dyn LoggerTrait> = Arc::new(Logger::disabled());
        let options = ScanOptions {
            respect_gitignore: true,
            show_progress: false,
        };
        let result = scan_directory(&request(root, "a"), options, logger).unwrap();

        assert_eq!(result.get(&key(&root.join("skipped"))), None);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_logs_each_directory() {
        let temp_dir = tempdir().unwrap();
        let log_dir = tempdir().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let logger = Arc::new(Logger::new(true, log_dir.path()).unwrap());
        let log_path = logger.log_path().to_path_buf();
        scan_directory(&request(temp_dir.path(), "a"), ScanOptions::default(), logger).unwrap();

        let content = fs::read_to_string(log_path).unwrap();
        assert!(content.contains(&format!("目录: {} | 匹配: 1", temp_dir.path().display())));
    }
}
