//! 公共类型（对外暴露）
use serde::Serialize;
use std::fmt;

/// 问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// 文本中出现品牌名
    TextMatch,
    /// 无法作为文本解读的文件（含打不开的归档），需人工复核
    BinaryFile,
}

/// 单条问题记录（对应 issues.txt 的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// 相对扫描根的路径，`/` 分隔
    pub relative_path: String,
    /// 1 起始的行号；二进制文件为空
    pub line_number: Option<usize>,
    /// 命中行的原文；二进制文件为空
    pub line_text: Option<String>,
    pub kind: IssueKind,
}

impl Issue {
    pub fn text_match(relative_path: impl Into<String>, line_number: usize, line_text: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            line_number: Some(line_number),
            line_text: Some(line_text.into()),
            kind: IssueKind::TextMatch,
        }
    }

    pub fn binary_file(relative_path: impl Into<String>) -> Self {
        Self { relative_path: relative_path.into(), line_number: None, line_text: None, kind: IssueKind::BinaryFile }
    }
}

/// issues.txt 行格式：
/// - 文本命中：`<path>:<line>:<text>`
/// - 二进制：`<path>:binary file`
impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::TextMatch => write!(
                f,
                "{}:{}:{}",
                self.relative_path,
                self.line_number.unwrap_or_default(),
                self.line_text.as_deref().unwrap_or_default()
            ),
            IssueKind::BinaryFile => write!(f, "{}:binary file", self.relative_path),
        }
    }
}
