use anyhow::{bail, Context, Result};
use brandhunter_core::report::{self, ISSUES_FILE_NAME};
use brandhunter_core::{ScanOptions, ScanStats, Scanner, DEFAULT_MAX_ARCHIVE_DEPTH, DEFAULT_MAX_EXTRACTED_BYTES};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

mod packages;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "brandhunter", version, about = "Search source trees for Red Hat branding and binary files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 各子命令共用的扫描参数
#[derive(Args, Debug)]
struct ScanArgs {
    /// 忽略只出现在 `<someone@redhat.com>` 邮箱里的命中
    #[arg(long)]
    ignore_email: bool,

    /// 扫描前打印每个文件路径
    #[arg(short, long)]
    verbose: bool,

    /// 规则文件路径（TOML），可覆盖内置的品牌/邮箱正则
    #[arg(long)]
    rules: Option<PathBuf>,

    /// 归档嵌套上限
    #[arg(long, default_value_t = DEFAULT_MAX_ARCHIVE_DEPTH)]
    max_archive_depth: usize,

    /// 每个扫描根允许展开的总字节数
    #[arg(long, default_value_t = DEFAULT_MAX_EXTRACTED_BYTES)]
    max_extracted_bytes: u64,
}

impl ScanArgs {
    fn options(&self) -> ScanOptions {
        ScanOptions {
            ignore_email_matches: self.ignore_email,
            verbose: self.verbose,
            max_archive_depth: self.max_archive_depth,
            max_extracted_bytes: self.max_extracted_bytes,
            rules_path: self.rules.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描目录（默认当前目录），结果写入各目录下的 issues.txt
    Dir {
        /// 待扫描目录，每个目录单独成为一个扫描根
        dirs: Vec<PathBuf>,

        /// 同时把问题以 JSON 数组打印到标准输出
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        scan: ScanArgs,
    },
    /// 扫描已解包的 SRPM 工作目录（<working-dir>/SRPMS/<srpm>/SOURCES）
    Packages {
        /// 包名模式（支持 glob），为空则扫描全部
        patterns: Vec<String>,

        /// 工作目录，默认 ~/brand-hunter
        #[arg(short, long)]
        working_dir: Option<PathBuf>,

        /// 线程数（"auto"=CPU 核心数；1 为串行）
        #[arg(long, default_value = "1")]
        threads: String,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dir { dirs, json, scan } => {
            let scanner = Scanner::from_options(scan.options()).context("build scanner")?;
            let dirs = if dirs.is_empty() { vec![std::env::current_dir().context("current dir")?] } else { dirs };
            run_dirs(&scanner, &dirs, json)
        }
        Commands::Packages { patterns, working_dir, threads, scan } => {
            let scanner = Scanner::from_options(scan.options()).context("build scanner")?;
            let working_dir = match working_dir {
                Some(dir) => dir,
                None => default_working_dir()?,
            };
            let units = packages::discover(&working_dir, &patterns)?;
            info!(working_dir = %working_dir.display(), packages = units.len(), "starting package scan");
            let summary = packages::run(&units, scanner, &working_dir, parse_threads(&threads))?;
            info!(
                packages = units.len(),
                failed = summary.failed,
                files_visited = summary.stats.files_visited,
                issues_found = summary.stats.issues_found,
                "package scan finished"
            );
            if summary.failed > 0 {
                bail!("{} of {} packages failed to scan", summary.failed, units.len());
            }
            Ok(())
        }
    }
}

/// 逐个目录扫描；单个目录失败不影响其他目录，最终以非零状态退出
fn run_dirs(scanner: &Scanner, dirs: &[PathBuf], json: bool) -> Result<()> {
    let mut failed = 0usize;
    let mut total = ScanStats::default();

    for dir in dirs {
        let issues_file = dir.join(ISSUES_FILE_NAME);
        // 先删除旧结果，避免被当作待扫描文件
        report::remove_stale(&issues_file)?;

        let result = match scanner.scan_root(dir) {
            Ok(result) => result,
            Err(err) => {
                error!(dir = %dir.display(), error = %err, "scan failed");
                failed += 1;
                continue;
            }
        };
        total.absorb(&result.stats);

        if result.is_clean() {
            println!("{}: No issues found", dir.display());
        } else {
            report::write_issues(&issues_file, &result.issues)?;
            println!("{}: Issues found: see {}", dir.display(), issues_file.display());
        }
        if json {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            report::write_json(&mut out, &result.issues).context("write json")?;
            out.flush().ok();
        }
    }

    info!(files_visited = total.files_visited, issues_found = total.issues_found, "scan finished");
    if failed > 0 {
        bail!("{failed} of {} directories failed to scan", dirs.len());
    }
    Ok(())
}

fn default_working_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set; pass --working-dir")?;
    Ok(PathBuf::from(home).join("brand-hunter"))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => Some(1),
    }
}
