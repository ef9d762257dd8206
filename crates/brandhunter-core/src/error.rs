//! 错误类型
use std::path::PathBuf;
use thiserror::Error;

/// 扫描过程中的致命错误（对单个扫描根目录而言）
///
/// 分类结果（文本命中、二进制、归档、空文件）都不是错误；
/// 只有读写失败、规则无效这类情况才会走到这里。
#[derive(Debug, Error)]
pub enum ScanError {
    /// 读写文件或目录失败
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 品牌/邮箱正则编译失败
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// 规则文件解析失败
    #[error("invalid rules file {path}: {source}")]
    Rules {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// 扫描根不是目录
    #[error("scan root is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// 带路径上下文的 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_path() {
        let err = ScanError::io(
            "/srv/pkg/SOURCES/a.c",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/srv/pkg/SOURCES/a.c"));
    }
}
