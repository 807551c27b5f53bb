use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::{name_filter_arg_group, name_filter_from, output_root_from};
use crate::config::ArtlocConfig;
use crate::core::LocateRequest;

fn verify_arg() -> Arg {
    Arg::new("verify")
        .long("verify")
        .action(ArgAction::SetTrue)
        .help("要求产物文件存在，否则报错")
}

/// 构建 dsym 命令
pub fn build_dsym_command() -> Command {
    Command::new("dsym")
        .about("输出最新构建中调试符号包的绝对路径")
        .arg(verify_arg())
}

/// 构建 ipa 命令
pub fn build_ipa_command() -> Command {
    Command::new("ipa")
        .about("输出最新构建中 IPA 安装包的绝对路径")
        .arg(verify_arg())
}

/// 构建 get 命令
pub fn build_get_command() -> Command {
    Command::new("get")
        .about("按配置中的预设输出产物路径")
        .arg(
            Arg::new("preset")
                .help("预设名称（内置 dsym、ipa）")
                .value_name("PRESET")
                .required(true),
        )
        .arg(verify_arg())
}

/// 构建 locate 命令
pub fn build_command() -> Command {
    Command::new("locate")
        .about("按任意前缀和相对路径定位产物")
        .long_about("在构建输出目录中找到名称匹配的最新子目录，并输出其下给定相对路径的绝对路径")
        .args(name_filter_arg_group())
        .arg(
            Arg::new("segments")
                .help("产物在构建目录内的相对路径段，例如: bin Telegram Telegram.ipa")
                .value_name("SEGMENT")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(verify_arg())
}

/// 处理 dsym / ipa / get 命令
pub fn handle_preset(config: &ArtlocConfig, preset: &str, matches: &ArgMatches) -> Result<String> {
    let root = output_root_from(config, matches)?;
    let mut request = config.request_for(preset, root)?;
    if matches.get_flag("verify") {
        request.verify = true;
    }
    run_request(&request)
}

pub fn handle_get(config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    let preset = matches
        .get_one::<String>("preset")
        .map(String::as_str)
        .unwrap_or_default();
    handle_preset(config, preset, matches)
}

/// 处理 locate 命令
pub fn handle_locate(config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    let root = output_root_from(config, matches)?;
    let filter = name_filter_from(config, matches)?;
    let segments: Vec<String> = matches
        .get_many::<String>("segments")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let request = LocateRequest::new(root, filter, segments).verify(matches.get_flag("verify"));
    run_request(&request)
}

fn run_request(request: &LocateRequest) -> Result<String> {
    log::info!(
        "在 {} 中查找 {} 的最新构建目录",
        request.root.display(),
        request.filter
    );
    let path = request.run()?;
    log::info!("已定位: {}", path.display());
    Ok(path.to_string_lossy().into_owned())
}
