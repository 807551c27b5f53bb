pub mod completion;
pub mod config;
pub mod list;
pub mod locate;

use anyhow::Result;
use clap::{Arg, ArgMatches};
use std::path::PathBuf;

use crate::config::ArtlocConfig;
use crate::core::NameFilter;

/// --prefix / --pattern 两个互斥的目录名过滤参数
pub(crate) fn name_filter_arg_group() -> [Arg; 2] {
    [
        Arg::new("prefix")
            .short('p')
            .long("prefix")
            .value_name("PREFIX")
            .help("目录名前缀（默认使用配置中的 default_prefix）"),
        Arg::new("pattern")
            .long("pattern")
            .value_name("REGEX")
            .conflicts_with("prefix")
            .help("用正则表达式匹配目录名"),
    ]
}

pub(crate) fn name_filter_from(config: &ArtlocConfig, matches: &ArgMatches) -> Result<NameFilter> {
    if let Some(pattern) = matches.get_one::<String>("pattern") {
        return Ok(NameFilter::pattern(pattern)?);
    }
    let prefix = matches
        .get_one::<String>("prefix")
        .cloned()
        .unwrap_or_else(|| config.default_prefix.clone());
    Ok(NameFilter::prefix(prefix))
}

/// 全局 --root 参数优先，其余按配置解析
pub(crate) fn output_root_from(config: &ArtlocConfig, matches: &ArgMatches) -> Result<PathBuf> {
    let flag = matches.get_one::<PathBuf>("root");
    config.output_root(flag.map(PathBuf::as_path))
}
