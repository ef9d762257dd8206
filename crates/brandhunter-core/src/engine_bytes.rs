//! 字节级文本扫描引擎
use std::path::Path;

use crate::detectors::BrandMatcher;
use crate::error::ScanError;

/// 单次命中（内部使用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineHit {
    /// 1 起始
    pub(crate) line_number: usize,
    pub(crate) line_text: String,
}

/// 读取整个文件并扫描
pub(crate) fn scan_file_bytes(path: &Path, matcher: &BrandMatcher, ignore_email: bool) -> Result<Vec<LineHit>, ScanError> {
    let buf = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;
    Ok(scan_buffer(&buf, matcher, ignore_email))
}

/// 在整段内容上匹配品牌正则，命中按出现位置升序返回
/// - 每次命中都产出一条记录，同一行多次命中即多条
/// - 行以 `\n` 切分，行文本不含 `\n`，非 UTF-8 字节做有损转换
/// - `ignore_email` 时，整行命中都来自邮箱的行被丢弃
pub(crate) fn scan_buffer(buf: &[u8], matcher: &BrandMatcher, ignore_email: bool) -> Vec<LineHit> {
    let mut hits = Vec::new();
    // 增量统计行号：上一次命中位置与其所在行号
    let mut cursor = 0usize;
    let mut line_number = 1usize;

    for m in matcher.brand.find_iter(buf) {
        let start = m.start();
        line_number += count_newlines(&buf[cursor..start]);
        cursor = start;

        let line = line_at(buf, start);
        if ignore_email && matcher.is_email_only(line) {
            continue;
        }
        hits.push(LineHit { line_number, line_text: String::from_utf8_lossy(line).into_owned() });
    }

    hits
}

fn count_newlines(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == b'\n').count()
}

/// `pos` 所在行（不含换行符）
fn line_at(buf: &[u8], pos: usize) -> &[u8] {
    let begin = buf[..pos].iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let end = buf[pos..].iter().position(|&b| b == b'\n').map_or(buf.len(), |i| pos + i);
    &buf[begin..end]
}
