use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use log::{Level, LevelFilter};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 默认的构建输出目录名
pub const OUTPUT_DIR_NAME: &str = "bazel-out";
/// 日志过滤环境变量，语法同 RUST_LOG
pub const ENV_LOG: &str = "ARTLOC_LOG";

/// 设置日志记录：默认只输出 warn，ARTLOC_LOG 可覆盖，-v 提升到 debug
pub fn setup_logging(verbose: bool) -> Result<()> {
    let filters = env::var(ENV_LOG).ok();
    // 同一进程内多次调用（测试）时 logger 已存在，忽略即可
    let _ = logger_builder(verbose, filters.as_deref()).try_init();
    Ok(())
}

fn logger_builder(verbose: bool, filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format(|buf, record| {
        let tag = match record.level() {
            Level::Error => "[❌]".red().bold(),
            Level::Warn => "[⚠️]".yellow().bold(),
            Level::Info => "[ℹ️]".blue().bold(),
            Level::Debug | Level::Trace => "[🔍]".bright_black(),
        };
        writeln!(buf, "{} {}", tag, record.args())
    });
    builder
}

/// 获取工作区目录：当前可执行文件所在目录的上一级
pub fn get_workspace_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("无法获取当前可执行文件路径")?;
    workspace_dir_of(&exe)
}

fn workspace_dir_of(exe: &Path) -> Result<PathBuf> {
    exe.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("无法确定 {} 的上级目录", exe.display()))
}

/// 默认构建输出目录：<工作区>/bazel-out
pub fn default_output_root() -> Result<PathBuf> {
    Ok(get_workspace_dir()?.join(OUTPUT_DIR_NAME))
}
