//! 扫描选项与统计信息（模块）
use std::path::PathBuf;

/// 单个归档默认允许的嵌套深度
pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 16;
/// 单个扫描根允许展开的总字节数（4 GiB）
pub const DEFAULT_MAX_EXTRACTED_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// 扫描选项
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 忽略整行只由 `<someone@redhat.com>` 这类邮箱构成的命中
    pub ignore_email_matches: bool,
    /// 扫描前回显每个文件路径（仅影响日志，不影响结果）
    pub verbose: bool,
    /// 归档嵌套上限；超过则不再展开，按二进制文件上报
    pub max_archive_depth: usize,
    /// 单个扫描根内展开的字节上限；超过则不再展开，按二进制文件上报
    pub max_extracted_bytes: u64,
    /// 规则文件路径（TOML）；为空则使用内置的品牌/邮箱正则
    pub rules_path: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_email_matches: false,
            verbose: false,
            max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
            max_extracted_bytes: DEFAULT_MAX_EXTRACTED_BYTES,
            rules_path: None,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_visited: usize,
    pub archives_expanded: usize,
    pub issues_found: usize,
}

impl ScanStats {
    /// 合并另一个扫描根的统计
    pub fn absorb(&mut self, other: &ScanStats) {
        self.files_visited += other.files_visited;
        self.archives_expanded += other.archives_expanded;
        self.issues_found += other.issues_found;
    }
}
