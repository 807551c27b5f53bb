use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use crate::config::ArtlocConfig;

/// 支持的 Shell 类型
#[derive(Debug, Clone, ValueEnum)]
pub enum SupportedShell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    Powershell,
    /// Elvish shell
    Elvish,
}

impl From<SupportedShell> for Shell {
    fn from(shell: SupportedShell) -> Self {
        match shell {
            SupportedShell::Bash => Shell::Bash,
            SupportedShell::Zsh => Shell::Zsh,
            SupportedShell::Fish => Shell::Fish,
            SupportedShell::Powershell => Shell::PowerShell,
            SupportedShell::Elvish => Shell::Elvish,
        }
    }
}

/// 构建 completion 命令
pub fn build_command() -> Command {
    Command::new("completion")
        .about("生成命令补全脚本")
        .arg(
            Arg::new("shell")
                .help("要生成补全脚本的 shell 类型")
                .required(true)
                .value_parser(clap::value_parser!(SupportedShell)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("输出文件路径（默认输出到标准输出）")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .after_help(
            r#"EXAMPLES:
    # 临时启用补全（bash）
    eval "$(artloc completion bash)"

    # 生成 zsh 补全脚本并保存到文件
    artloc completion zsh -o ~/.zsh/completions/_artloc"#,
        )
}

/// 处理 completion 命令
pub fn handle_completion(_config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    let shell: Shell = matches
        .get_one::<SupportedShell>("shell")
        .cloned()
        .context("缺少 shell 参数")?
        .into();

    let mut cmd = crate::build_cli();
    let name = cmd.get_name().to_string();
    let mut script = Vec::new();
    generate(shell, &mut cmd, name, &mut script);

    if let Some(output_path) = matches.get_one::<PathBuf>("output") {
        std::fs::write(output_path, &script)
            .with_context(|| format!("无法写入 {}", output_path.display()))?;
        eprintln!("✅ 补全脚本已生成到: {}", output_path.display());
        return Ok(String::new());
    }

    Ok(String::from_utf8_lossy(&script).into_owned())
}
