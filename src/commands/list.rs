use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use std::time::{Duration, SystemTime};

use crate::commands::{name_filter_arg_group, name_filter_from, output_root_from};
use crate::config::ArtlocConfig;
use crate::core::{Candidate, normalize_root, scan_candidates};

/// list --json 的输出项
#[derive(Debug, Serialize)]
struct CandidateEntry {
    name: String,
    path: String,
    modified: DateTime<Utc>,
    latest: bool,
}

/// 构建 list 命令
pub fn build_command() -> Command {
    Command::new("list")
        .about("列出匹配的构建目录（最新的在前）")
        .args(name_filter_arg_group())
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("以 JSON 格式输出"),
        )
}

/// 处理 list 命令
pub fn handle_list(config: &ArtlocConfig, matches: &ArgMatches) -> Result<String> {
    let root = normalize_root(&output_root_from(config, matches)?)?;
    let filter = name_filter_from(config, matches)?;
    let candidates = scan_candidates(&root, &filter)?;

    if matches.get_flag("json") {
        return render_json(&candidates);
    }

    if candidates.is_empty() {
        log::warn!("{} 下没有匹配 {} 的构建目录", root.display(), filter);
        return Ok(String::new());
    }
    render_table(&candidates, SystemTime::now())
}

fn render_json(candidates: &[Candidate]) -> Result<String> {
    // scan_candidates 已按新旧降序排列，第一个即最新
    let entries: Vec<CandidateEntry> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| CandidateEntry {
            name: candidate.name.clone(),
            path: candidate.path.to_string_lossy().into_owned(),
            modified: DateTime::<Utc>::from(candidate.modified),
            latest: index == 0,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)? + "\n")
}

fn render_table(candidates: &[Candidate], now: SystemTime) -> Result<String> {
    let width = candidates.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = String::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let marker = if index == 0 { "*".green().bold() } else { " ".normal() };
        let modified = DateTime::<Local>::from(candidate.modified).format("%Y-%m-%d %H:%M:%S");
        let age = format_age(now, candidate.modified);
        let name = format!("{:<width$}", candidate.name, width = width);
        let name = if index == 0 { name.green().bold() } else { name.normal() };
        writeln!(out, "{} {}  {}  {}", marker, name, modified, age.bright_black())?;
    }
    Ok(out)
}

fn format_age(now: SystemTime, modified: SystemTime) -> String {
    match now.duration_since(modified) {
        Ok(elapsed) => {
            let secs = Duration::from_secs(elapsed.as_secs());
            if secs.is_zero() {
                "刚刚".to_string()
            } else {
                format!("{} ago", humantime::format_duration(secs))
            }
        }
        // 修改时间在未来（时钟偏差）
        Err(_) => "未来".to_string(),
    }
}
