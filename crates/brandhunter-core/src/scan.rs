//! 扫描主流程
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::classify::RootState;
use crate::content::{ContentDetector, MagicDetector};
use crate::detectors::BrandMatcher;
use crate::error::ScanError;
use crate::options::{ScanOptions, ScanStats};
use crate::rules::load_pattern_rules;
use crate::types::Issue;

/// 单个扫描根的结果
#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    /// 按发现顺序排列
    pub issues: Vec<Issue>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// 没有任何问题
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// 内容扫描器：持有选项、检测器与内容类型判定服务
pub struct Scanner {
    options: ScanOptions,
    matcher: BrandMatcher,
    detector: Box<dyn ContentDetector>,
}

impl Scanner {
    pub fn new(options: ScanOptions, matcher: BrandMatcher, detector: Box<dyn ContentDetector>) -> Self {
        Self { options, matcher, detector }
    }

    /// 按选项构建：有规则文件则加载，内容判定使用 [`MagicDetector`]
    pub fn from_options(options: ScanOptions) -> Result<Self, ScanError> {
        let matcher = match &options.rules_path {
            Some(path) => BrandMatcher::from_rules(&load_pattern_rules(path)?)?,
            None => BrandMatcher::builtin()?,
        };
        Ok(Self::new(options, matcher, Box::new(MagicDetector)))
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub(crate) fn matcher(&self) -> &BrandMatcher {
        &self.matcher
    }

    pub(crate) fn detector(&self) -> &dyn ContentDetector {
        self.detector.as_ref()
    }

    /// 扫描一个根目录
    /// - 先收集全部文件（子目录内容先于父目录），再逐个分类；
    ///   归档展开出的新文件由分类器递归处理，不会再被遍历到第二次
    /// - 同目录内按文件名排序，保证输出顺序可复现
    pub fn scan_root(&self, root: &Path) -> Result<ScanReport, ScanError> {
        let md = std::fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
        if !md.is_dir() {
            return Err(ScanError::NotADirectory { path: root.to_path_buf() });
        }

        let files = collect_files(root)?;
        let mut issues = Vec::new();
        let mut state = RootState::new(root, &mut issues);
        for path in &files {
            self.classify_at(path, &mut state, 0)?;
        }
        let stats = state.stats;

        info!(
            root = %root.display(),
            files_visited = stats.files_visited,
            archives_expanded = stats.archives_expanded,
            issues_found = stats.issues_found,
            "scan root finished"
        );
        Ok(ScanReport { issues, stats })
    }
}

fn collect_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_error(root: &Path, err: walkdir::Error) -> ScanError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err.into_io_error().unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
    ScanError::io(path, source)
}
