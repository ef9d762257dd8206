//! SRPM 工作目录的逐包扫描与汇总
//!
//! 目录布局：`<working-dir>/SRPMS/<srpm>/SOURCES` 为扫描根，
//! 问题写入 `<working-dir>/SRPMS/<srpm>/issues.txt`，
//! 无问题的包名依次追加到 `<working-dir>/noissues.txt`。
use anyhow::{bail, Context, Result};
use brandhunter_core::report::{self, ISSUES_FILE_NAME, NO_ISSUES_FILE_NAME};
use brandhunter_core::{ScanError, ScanReport, ScanStats, Scanner};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};

/// 一个待扫描的包
#[derive(Debug, Clone)]
pub(crate) struct PackageUnit {
    pub(crate) name: String,
    pub(crate) topdir: PathBuf,
}

impl PackageUnit {
    fn sources(&self) -> PathBuf {
        self.topdir.join("SOURCES")
    }

    fn issues_file(&self) -> PathBuf {
        self.topdir.join(ISSUES_FILE_NAME)
    }
}

/// 汇总
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub(crate) stats: ScanStats,
    pub(crate) failed: usize,
}

/// 列出工作目录下的包，按名称排序；`patterns` 为空则全部返回
pub(crate) fn discover(working_dir: &Path, patterns: &[String]) -> Result<Vec<PackageUnit>> {
    let srpms = working_dir.join("SRPMS");
    let filter = build_filter(patterns)?;
    let mut units = Vec::new();

    for entry in std::fs::read_dir(&srpms).with_context(|| format!("read {}", srpms.display()))? {
        let entry = entry.with_context(|| format!("read {}", srpms.display()))?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(set) = &filter {
            if !set.is_match(&name) {
                continue;
            }
        }
        let topdir = entry.path();
        if !topdir.join("SOURCES").is_dir() {
            warn!(package = %name, "no SOURCES directory, skipping");
            continue;
        }
        units.push(PackageUnit { name, topdir });
    }

    units.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(units)
}

fn build_filter(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p).with_context(|| format!("invalid package pattern {p:?}"))?);
    }
    Ok(Some(builder.build()?))
}

/// 扫描全部包
/// - `threads` 为 None 表示 CPU 核数；1 走串行
/// - 并行时结果按包顺序落盘，noissues.txt 的顺序与串行一致
pub(crate) fn run(units: &[PackageUnit], scanner: Scanner, working_dir: &Path, threads: Option<usize>) -> Result<RunSummary> {
    let noissues_file = working_dir.join(NO_ISSUES_FILE_NAME);
    report::remove_stale(&noissues_file)?;

    let threads = threads.unwrap_or_else(num_cpus::get);
    let mut summary = RunSummary::default();

    if threads <= 1 {
        for unit in units {
            let outcome = scan_package(unit, &scanner);
            record(unit, outcome, &noissues_file, &mut summary)?;
        }
        return Ok(summary);
    }

    run_parallel(units, Arc::new(scanner), &noissues_file, threads, &mut summary)?;
    Ok(summary)
}

/// 并行调度：
/// - Rayon 线程池并行扫描各包（每个包只写自己的目录）
/// - 当前线程按 idx 重排结果，顺序写 noissues.txt
fn run_parallel(
    units: &[PackageUnit],
    scanner: Arc<Scanner>,
    noissues_file: &Path,
    threads: usize,
    summary: &mut RunSummary,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    type Msg = (usize, Result<ScanReport, ScanError>);
    let (tx, rx) = channel::bounded::<Msg>(64);

    let jobs: Vec<(usize, PackageUnit)> = units.iter().cloned().enumerate().collect();
    let worker = std::thread::spawn(move || -> Result<(), rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        pool.install(|| {
            jobs.par_iter().for_each(|(idx, unit)| {
                let _ = tx.send((*idx, scan_package(unit, &scanner)));
            });
        });
        // 返回后 Sender 被丢弃，Receiver 收到关闭信号
        Ok(())
    });

    let mut next_idx = 0usize;
    let mut pending: BTreeMap<usize, Result<ScanReport, ScanError>> = BTreeMap::new();
    while let Ok((idx, outcome)) = rx.recv() {
        pending.insert(idx, outcome);
        while let Some(outcome) = pending.remove(&next_idx) {
            record(&units[next_idx], outcome, noissues_file, summary)?;
            next_idx += 1;
        }
    }

    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e).context("build thread pool"),
        Err(_) => bail!("scan worker panicked"),
    }
    if next_idx != units.len() {
        bail!("only {next_idx} of {} packages reported back", units.len());
    }
    Ok(())
}

/// 扫描单个包并写出其 issues.txt
fn scan_package(unit: &PackageUnit, scanner: &Scanner) -> Result<ScanReport, ScanError> {
    let issues_file = unit.issues_file();
    report::remove_stale(&issues_file)?;
    let result = scanner.scan_root(&unit.sources())?;
    if !result.is_clean() {
        report::write_issues(&issues_file, &result.issues)?;
    }
    Ok(result)
}

/// 汇总单个包的结果；失败的包既不写 noissues 也不计为通过
fn record(
    unit: &PackageUnit,
    outcome: Result<ScanReport, ScanError>,
    noissues_file: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    println!("{}", unit.name);
    match outcome {
        Ok(result) => {
            summary.stats.absorb(&result.stats);
            if result.is_clean() {
                report::append_no_issues(noissues_file, &unit.name)?;
                println!("* no issues\n");
            } else {
                println!("* see {}\n", unit.issues_file().display());
            }
        }
        Err(err) => {
            error!(package = %unit.name, error = %err, "package scan failed");
            println!("* scan failed: {err}\n");
            summary.failed += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandhunter_core::ScanOptions;
    use std::fs;
    use tempfile::TempDir;

    fn working_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let srpms = temp.path().join("SRPMS");
        for (pkg, content) in [
            ("bash-4.2-1.src", "echo hello\n"),
            ("kernel-3.10-1.src", "Maintainer: Red Hat\n"),
            ("zsh-5.0-2.src", "setopt extendedglob\n"),
        ] {
            fs::create_dir_all(srpms.join(pkg).join("SOURCES")).unwrap();
            fs::write(srpms.join(pkg).join("SOURCES/file.txt"), content).unwrap();
        }
        // 没有 SOURCES 的目录被跳过
        fs::create_dir_all(srpms.join("broken-1.0-1.src")).unwrap();
        temp
    }

    fn scanner() -> Scanner {
        Scanner::from_options(ScanOptions::default()).unwrap()
    }

    #[test]
    fn discover_sorts_and_filters() {
        let temp = working_dir();
        let all = discover(temp.path(), &[]).unwrap();
        let names: Vec<_> = all.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["bash-4.2-1.src", "kernel-3.10-1.src", "zsh-5.0-2.src"]);

        let some = discover(temp.path(), &["k*".to_string(), "zsh-*".to_string()]).unwrap();
        let names: Vec<_> = some.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["kernel-3.10-1.src", "zsh-5.0-2.src"]);
    }

    #[test]
    fn discover_rejects_bad_patterns() {
        let temp = working_dir();
        assert!(discover(temp.path(), &["[".to_string()]).is_err());
    }

    #[test]
    fn serial_run_writes_per_package_results() {
        let temp = working_dir();
        let units = discover(temp.path(), &[]).unwrap();
        let summary = run(&units, scanner(), temp.path(), Some(1)).unwrap();

        assert_eq!(summary.failed, 0);
        assert_eq!(summary.stats.issues_found, 1);
        let noissues = fs::read_to_string(temp.path().join(NO_ISSUES_FILE_NAME)).unwrap();
        assert_eq!(noissues, "bash-4.2-1.src\nzsh-5.0-2.src\n");
        let issues = fs::read_to_string(temp.path().join("SRPMS/kernel-3.10-1.src/issues.txt")).unwrap();
        assert_eq!(issues, "file.txt:1:Maintainer: Red Hat\n");
    }

    #[test]
    fn parallel_run_keeps_package_order() {
        let temp = working_dir();
        let units = discover(temp.path(), &[]).unwrap();
        fs::write(temp.path().join(NO_ISSUES_FILE_NAME), "stale-from-last-run\n").unwrap();

        let summary = run(&units, scanner(), temp.path(), Some(3)).unwrap();
        assert_eq!(summary.failed, 0);
        let noissues = fs::read_to_string(temp.path().join(NO_ISSUES_FILE_NAME)).unwrap();
        assert_eq!(noissues, "bash-4.2-1.src\nzsh-5.0-2.src\n");
    }

    #[test]
    fn failed_package_is_not_reported_clean() {
        let temp = working_dir();
        let units = vec![PackageUnit { name: "ghost-1.0-1.src".into(), topdir: temp.path().join("SRPMS/ghost") }];
        let summary = run(&units, scanner(), temp.path(), Some(1)).unwrap();
        assert_eq!(summary.failed, 1);
        assert!(!temp.path().join(NO_ISSUES_FILE_NAME).exists());
    }
}
