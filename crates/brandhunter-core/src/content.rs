//! 内容类型判定（不依赖扩展名）
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::archive::ArchiveFormat;

/// 判定时读取的文件头长度
pub(crate) const SNIFF_LEN: usize = 8192;

/// 文件内容类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Empty,
    Text,
    Archive(ArchiveFormat),
    Binary,
    /// 无法判定（如 FIFO、设备文件），按二进制处理
    Unknown,
}

/// 内容类型检测器
///
/// 由调用方构造并交给 [`crate::Scanner`]，测试中可替换为固定结果的实现。
pub trait ContentDetector: Send + Sync {
    fn detect(&self, path: &Path) -> io::Result<ContentKind>;
}

/// 基于文件头魔数与字节分布的检测器
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicDetector;

impl ContentDetector for MagicDetector {
    fn detect(&self, path: &Path) -> io::Result<ContentKind> {
        let md = std::fs::metadata(path)?;
        if !md.is_file() {
            return Ok(ContentKind::Unknown);
        }
        if md.len() == 0 {
            return Ok(ContentKind::Empty);
        }

        let mut head = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
        Ok(sniff(&head))
    }
}

/// 对文件头做判定
pub(crate) fn sniff(head: &[u8]) -> ContentKind {
    if head.is_empty() {
        return ContentKind::Empty;
    }
    if head.starts_with(&[0x1f, 0x8b]) {
        return ContentKind::Archive(ArchiveFormat::TarGzip);
    }
    if head.len() >= 4 && head.starts_with(b"BZh") && (b'1'..=b'9').contains(&head[3]) {
        return ContentKind::Archive(ArchiveFormat::TarBzip2);
    }
    if is_text(head) { ContentKind::Text } else { ContentKind::Binary }
}

/// 文本判定（保守）：
/// - 含 NUL 即为二进制；
/// - 允许 \a \b \t \n \v \f \r ESC 以外的 C0 控制字符及 DEL 出现即为二进制；
/// - 高位字节（UTF-8 / Latin-1）视为文本。
fn is_text(buf: &[u8]) -> bool {
    buf.iter().all(|&b| match b {
        0x07..=0x0D | 0x1B => true,
        0x00..=0x1F | 0x7F => false,
        _ => true,
    })
}
