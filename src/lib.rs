//! artloc: 在 Bazel 构建输出目录中定位最新构建的产物
//!
//! 扫描 `bazel-out` 的直接子目录，选出名称匹配且修改时间最新的一个，
//! 再拼接产物的相对路径（例如 `bin/Telegram/Telegram.ipa`）。

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

pub mod commands;
pub mod config;
pub mod core;
pub mod utils;

use crate::config::ArtlocConfig;
use crate::core::LocateError;
use crate::utils::setup_logging;

const DESCRIPTION: &str = "artloc: 定位最新 Bazel 构建中的 dSYM / IPA 产物";

/// 构建 CLI 应用
pub fn build_cli() -> Command {
    Command::new("artloc")
        .version(env!("CARGO_PKG_VERSION"))
        .about(DESCRIPTION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("在 stderr 输出调试信息"),
        )
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("构建输出目录（默认 <工作区>/bazel-out）"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("配置文件路径"),
        )
        .subcommand(commands::locate::build_dsym_command())
        .subcommand(commands::locate::build_ipa_command())
        .subcommand(commands::locate::build_get_command())
        .subcommand(commands::locate::build_command())
        .subcommand(commands::list::build_command())
        .subcommand(commands::config::build_command())
        .subcommand(commands::completion::build_command())
}

/// 运行 CLI 并把结果写到 stdout
pub fn run_cli(args: Vec<String>) -> Result<()> {
    if let Some(output) = run_cli_with_output(args)? {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

/// 运行 CLI 的核心逻辑，返回需要写到 stdout 的内容
pub fn run_cli_with_output(args: Vec<String>) -> Result<Option<String>> {
    let matches = match build_cli().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            // 帮助和版本信息正常输出
            if err.kind() == clap::error::ErrorKind::DisplayHelp
                || err.kind() == clap::error::ErrorKind::DisplayVersion
            {
                return Ok(Some(err.render().to_string()));
            }
            return Err(err.into());
        }
    };

    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => return Ok(Some(build_cli().render_help().to_string())),
    };

    setup_logging(sub_matches.get_flag("verbose"))?;
    let config = ArtlocConfig::load(sub_matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    let output = match name {
        "dsym" | "ipa" => commands::locate::handle_preset(&config, name, sub_matches)?,
        "get" => commands::locate::handle_get(&config, sub_matches)?,
        "locate" => commands::locate::handle_locate(&config, sub_matches)?,
        "list" => commands::list::handle_list(&config, sub_matches)?,
        "config" => commands::config::handle_config(&config, sub_matches)?,
        "completion" => commands::completion::handle_completion(&config, sub_matches)?,
        _ => build_cli().render_help().to_string(),
    };

    Ok((!output.is_empty()).then_some(output))
}

/// 按错误类型决定进程退出码
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if let Some(locate_err) = err.downcast_ref::<LocateError>() {
        return locate_err.exit_code();
    }
    if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
        return u8::try_from(clap_err.exit_code()).unwrap_or(2);
    }
    1
}

/// 在进程边界报告错误：stderr 输出错误链，stdout 保持为空
pub fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "错误:".red().bold(), err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// 以预设名运行（供无参数的 dsym-path / ipa-path 使用）
pub fn run_preset(preset: &str) -> Result<()> {
    run_cli(vec!["artloc".to_string(), preset.to_string()])
}

#[cfg(test)]
mod cli_tests;
