//! 结果文件读写
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::ScanError;
use crate::types::Issue;

/// 每个扫描根下的问题清单文件名
pub const ISSUES_FILE_NAME: &str = "issues.txt";
/// 汇总“无问题”单元的文件名
pub const NO_ISSUES_FILE_NAME: &str = "noissues.txt";

/// 写出问题清单，每条一行，保持发现顺序
pub fn write_issues(path: &Path, issues: &[Issue]) -> Result<(), ScanError> {
    let io_err = |e| ScanError::io(path, e);
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for issue in issues {
        writeln!(out, "{issue}").map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}

/// 向“无问题”清单追加一个单元标识
pub fn append_no_issues(path: &Path, id: &str) -> Result<(), ScanError> {
    let mut f = OpenOptions::new().create(true).append(true).open(path).map_err(|e| ScanError::io(path, e))?;
    writeln!(f, "{id}").map_err(|e| ScanError::io(path, e))
}

/// 删除上一次运行留下的结果文件；不存在则忽略
pub fn remove_stale(path: &Path) -> Result<(), ScanError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ScanError::io(path, e)),
    }
}

/// 以 JSON 数组流式写出
pub fn write_json(out: &mut dyn Write, issues: &[Issue]) -> io::Result<()> {
    write!(out, "[")?;
    for (i, issue) in issues.iter().enumerate() {
        if i > 0 {
            write!(out, ",")?;
        }
        serde_json::to_writer(&mut *out, issue)?;
    }
    writeln!(out, "]")
}
