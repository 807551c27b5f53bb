use anyhow::{Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::config::{ArtlocConfig, CONFIG_FILE_NAME};
use crate::utils::get_workspace_dir;

pub fn build_command() -> Command {
    Command::new("config")
        .about("查看或初始化 artloc 配置")
        .arg(
            Arg::new("show")
                .short('s')
                .long("show")
                .action(ArgAction::SetTrue)
                .conflicts_with("init")
                .help("显示当前生效的配置（默认）"),
        )
        .arg(
            Arg::new("init")
                .long("init")
                .action(ArgAction::SetTrue)
                .help("将默认配置写入配置文件"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .requires("init")
                .help("--init 写入的文件路径（默认 <工作区>/artloc.toml）"),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .action(ArgAction::SetTrue)
                .requires("init")
                .help("覆盖已存在的配置文件"),
        )
}

pub fn handle_config(config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    if matches.get_flag("init") {
        let path = match matches.get_one::<PathBuf>("output") {
            Some(path) => path.clone(),
            None => get_workspace_dir()?.join(CONFIG_FILE_NAME),
        };
        return init_config(&path, matches.get_flag("force"));
    }

    show_config(config, matches)
}

fn init_config(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
    }
    ArtlocConfig::default().save(path)?;
    eprintln!("✅ 默认配置已写入: {}", path.display());
    Ok(String::new())
}

fn show_config(config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    let mut out = String::new();
    match &config.source {
        Some(path) => writeln!(out, "# 来源: {}", path.display())?,
        None => writeln!(out, "# 来源: 内置默认配置")?,
    }
    match crate::commands::output_root_from(config, matches) {
        Ok(root) => writeln!(out, "# 构建输出目录: {}", root.display())?,
        Err(e) => writeln!(out, "# 构建输出目录: 无法确定 ({})", e)?,
    }
    out.push_str(&config.to_toml()?);
    Ok(out)
}
