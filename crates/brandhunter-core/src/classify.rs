//! 递归内容分类器
//!
//! 对单个文件依次判定：空文件 → 压缩 tar 归档 → 二进制/无法判定 → 文本。
//! 归档会在所在目录就地展开，原归档删除，展开出的每个非目录成员再递归分类。
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveFormat};
use crate::content::ContentKind;
use crate::engine_bytes::scan_file_bytes;
use crate::error::ScanError;
use crate::options::ScanStats;
use crate::scan::Scanner;
use crate::types::Issue;

/// 单个扫描根的遍历状态，只由处理该根的调用链持有
pub(crate) struct RootState<'a> {
    pub(crate) root: &'a Path,
    pub(crate) issues: &'a mut Vec<Issue>,
    pub(crate) stats: ScanStats,
    /// 本扫描根已展开的字节数
    pub(crate) extracted_bytes: u64,
    /// 已分类的路径；归档成员覆盖了待遍历文件时不会重复扫描
    visited: HashSet<PathBuf>,
}

impl<'a> RootState<'a> {
    pub(crate) fn new(root: &'a Path, issues: &'a mut Vec<Issue>) -> Self {
        Self { root, issues, stats: ScanStats::default(), extracted_bytes: 0, visited: HashSet::new() }
    }

    fn relative(&self, file: &Path) -> String {
        match file.strip_prefix(self.root) {
            Ok(rel) => rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/"),
            Err(_) => file.to_string_lossy().into_owned(),
        }
    }

    fn push(&mut self, issue: Issue) {
        self.stats.issues_found += 1;
        self.issues.push(issue);
    }
}

impl Scanner {
    /// 分类单个文件，问题追加到 `issues`，路径相对 `root` 上报
    ///
    /// 文件已不存在时直接返回（归档展开后被删除的情况）。
    pub fn classify(&self, file: &Path, root: &Path, issues: &mut Vec<Issue>) -> Result<ScanStats, ScanError> {
        let mut state = RootState::new(root, issues);
        self.classify_at(file, &mut state, 0)?;
        Ok(state.stats)
    }

    pub(crate) fn classify_at(&self, file: &Path, state: &mut RootState<'_>, depth: usize) -> Result<(), ScanError> {
        let md = match fs::symlink_metadata(file) {
            Ok(md) => md,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %file.display(), "file vanished, skipping");
                return Ok(());
            }
            Err(e) => return Err(ScanError::io(file, e)),
        };
        if md.is_dir() {
            return Ok(());
        }
        if !state.visited.insert(file.to_path_buf()) {
            debug!(path = %file.display(), "already classified, skipping");
            return Ok(());
        }

        let rel = state.relative(file);
        if self.options().verbose {
            info!(path = %rel, "scanning");
        } else {
            debug!(path = %rel, "scanning");
        }
        state.stats.files_visited += 1;

        // 符号链接不跟随（避免读出扫描根之外的内容），交由人工复核
        if md.file_type().is_symlink() {
            state.push(Issue::binary_file(rel));
            return Ok(());
        }

        let kind = match self.detector().detect(file) {
            Ok(kind) => kind,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ScanError::io(file, e)),
        };

        match kind {
            ContentKind::Empty => {}
            ContentKind::Archive(format) => self.expand_archive(file, format, rel, state, depth)?,
            ContentKind::Text => {
                let hits = scan_file_bytes(file, self.matcher(), self.options().ignore_email_matches)?;
                for hit in hits {
                    state.push(Issue::text_match(rel.clone(), hit.line_number, hit.line_text));
                }
            }
            ContentKind::Binary | ContentKind::Unknown => state.push(Issue::binary_file(rel)),
        }
        Ok(())
    }

    fn expand_archive(
        &self,
        file: &Path,
        format: ArchiveFormat,
        rel: String,
        state: &mut RootState<'_>,
        depth: usize,
    ) -> Result<(), ScanError> {
        if depth >= self.options().max_archive_depth {
            warn!(path = %rel, depth, "archive nesting limit reached, reporting as binary");
            state.push(Issue::binary_file(rel));
            return Ok(());
        }

        // 打开失败属于 I/O 错误；只有读归档内容时的错误才降级为二进制
        let handle = match File::open(file) {
            Ok(handle) => handle,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ScanError::io(file, e)),
        };
        let listing = match archive::list_members(handle, format) {
            Ok(listing) => listing,
            Err(e) => {
                debug!(path = %rel, error = %e, "cannot open archive, reporting as binary");
                state.push(Issue::binary_file(rel));
                return Ok(());
            }
        };

        let budget = self.options().max_extracted_bytes.saturating_sub(state.extracted_bytes);
        if listing.total_size > budget {
            warn!(path = %rel, size = listing.total_size, budget, "extraction budget exceeded, reporting as binary");
            state.push(Issue::binary_file(rel));
            return Ok(());
        }

        let dest = file.parent().unwrap_or_else(|| Path::new("."));
        archive::extract(file, format, dest).map_err(|e| ScanError::io(file, e))?;
        fs::remove_file(file).map_err(|e| ScanError::io(file, e))?;
        state.extracted_bytes += listing.total_size;
        state.stats.archives_expanded += 1;
        debug!(path = %rel, members = listing.members.len(), "archive expanded");

        for member in &listing.members {
            self.classify_at(&dest.join(member), state, depth + 1)?;
        }
        Ok(())
    }
}
