//! 品牌名合规扫描核心库
//!
//! 设计要点：
//! - 内容类别按文件内容判定（空文件、gzip/bzip2 压缩的 tar、二进制、文本），不看扩展名。
//! - 文本按字节级正则匹配品牌名，逐次命中上报行号与整行原文。
//! - 压缩 tar 在所在目录就地展开并删除原归档，再递归扫描展开出的文件；
//!   打不开的归档按二进制文件上报。该过程是破坏性的，同一棵树不能重复扫描出相同结果。
//! - 归档嵌套深度与展开总字节数都有上限，超过上限的归档原样保留并按二进制上报。

mod archive;
mod classify;
mod content;
mod detectors;
mod engine_bytes;
mod error;
mod options;
pub mod report;
mod rules;
mod scan;
mod types;

pub use archive::ArchiveFormat;
pub use content::{ContentDetector, ContentKind, MagicDetector};
pub use detectors::BrandMatcher;
pub use error::ScanError;
pub use options::{ScanOptions, ScanStats, DEFAULT_MAX_ARCHIVE_DEPTH, DEFAULT_MAX_EXTRACTED_BYTES};
pub use rules::{load_pattern_rules, PatternRules, DEFAULT_BRAND_PATTERN, DEFAULT_EMAIL_PATTERN};
pub use scan::{ScanReport, Scanner};
pub use types::{Issue, IssueKind};
