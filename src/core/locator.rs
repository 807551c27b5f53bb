use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use super::error::LocateError;

/// 构建输出目录下的一个候选子目录
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

impl Candidate {
    /// 新旧排序：修改时间优先，时间相同时名称字典序较大者视为更新
    fn freshness(&self, other: &Self) -> Ordering {
        self.modified
            .cmp(&other.modified)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// 候选目录名称过滤器
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// 目录名以给定字符串开头
    Prefix(String),
    /// 目录名匹配正则表达式
    Pattern(Regex),
}

impl NameFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, LocateError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "前缀 '{}'", prefix),
            Self::Pattern(regex) => write!(f, "正则 /{}/", regex.as_str()),
        }
    }
}

/// 一次完整的定位请求
#[derive(Debug, Clone)]
pub struct LocateRequest {
    pub root: PathBuf,
    pub filter: NameFilter,
    pub artifact: Vec<String>,
    /// 是否要求最终产物必须存在
    pub verify: bool,
}

impl LocateRequest {
    pub fn new(root: impl Into<PathBuf>, filter: NameFilter, artifact: Vec<String>) -> Self {
        Self {
            root: root.into(),
            filter,
            artifact,
            verify: false,
        }
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn run(&self) -> Result<PathBuf, LocateError> {
        if self.verify {
            locate_verified(&self.root, &self.filter, self.artifact.as_slice())
        } else {
            locate(&self.root, &self.filter, self.artifact.as_slice())
        }
    }
}

/// 扫描构建输出目录的直接子目录（不递归），返回满足过滤条件的候选，按新旧降序排列
pub fn scan_candidates(root: &Path, filter: &NameFilter) -> Result<Vec<Candidate>, LocateError> {
    let entries = fs::read_dir(root).map_err(|e| LocateError::access(root, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LocateError::access(root, e))?;
        // file_type 不跟随符号链接
        let file_type = entry
            .file_type()
            .map_err(|e| LocateError::access(entry.path(), e))?;
        if !file_type.is_dir() && !file_type.is_symlink() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !filter.matches(&name) {
            continue;
        }

        if let Some(candidate) = stat_candidate(entry.path(), name, file_type.is_symlink())? {
            candidates.push(candidate);
        }
    }

    candidates.sort_by(|a, b| b.freshness(a));
    Ok(candidates)
}

/// 读取候选目录的修改时间
///
/// 失效的符号链接和指向非目录的链接返回 `None`；真实目录读取失败
/// （例如枚举之后被并发构建删除）一律报告为访问错误。
pub(crate) fn stat_candidate(
    path: PathBuf,
    name: String,
    is_symlink: bool,
) -> Result<Option<Candidate>, LocateError> {
    let meta = match fs::metadata(&path) {
        Ok(meta) => meta,
        Err(e) if is_symlink && e.kind() == io::ErrorKind::NotFound => {
            log::debug!("跳过失效的符号链接: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(LocateError::access(path, e)),
    };
    if !meta.is_dir() {
        return Ok(None);
    }

    let modified = meta.modified().map_err(|e| LocateError::access(&path, e))?;
    Ok(Some(Candidate {
        path,
        name,
        modified,
    }))
}

/// 选出最新的候选目录
pub fn select_latest(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().max_by(|a, b| a.freshness(b))
}

/// 校验单个产物路径段：只允许普通的相对路径组件
pub fn validate_segment(segment: &str) -> Result<(), LocateError> {
    let path = Path::new(segment);
    let normal = !segment.is_empty()
        && !path.has_root()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if normal {
        Ok(())
    } else {
        Err(LocateError::InvalidSegment {
            segment: segment.to_string(),
        })
    }
}

/// 在候选目录下拼接产物相对路径，结果保证位于候选目录之内
pub fn artifact_path<S: AsRef<str>>(
    candidate: &Path,
    segments: &[S],
) -> Result<PathBuf, LocateError> {
    let mut path = candidate.to_path_buf();
    for segment in segments {
        let segment = segment.as_ref();
        validate_segment(segment)?;
        path.push(segment);
    }
    Ok(path)
}

/// 转为绝对路径并按字面消去 `.` 与 `..`，不解析符号链接
pub fn normalize_root(root: &Path) -> Result<PathBuf, LocateError> {
    let absolute = std::path::absolute(root).map_err(|e| LocateError::access(root, e))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// 定位最新构建目录中的产物路径，不检查产物本身是否存在
pub fn locate<S: AsRef<str>>(
    root: &Path,
    filter: &NameFilter,
    segments: &[S],
) -> Result<PathBuf, LocateError> {
    // 先校验路径段，避免无效输入还要扫描目录
    for segment in segments {
        validate_segment(segment.as_ref())?;
    }

    let root = normalize_root(root)?;
    let candidates = scan_candidates(&root, filter)?;

    let latest = select_latest(&candidates).ok_or_else(|| LocateError::NoCandidate {
        root: root.clone(),
        filter: filter.to_string(),
    })?;

    artifact_path(&latest.path, segments)
}

/// 与 [`locate`] 相同，但要求产物存在
pub fn locate_verified<S: AsRef<str>>(
    root: &Path,
    filter: &NameFilter,
    segments: &[S],
) -> Result<PathBuf, LocateError> {
    let path = locate(root, filter, segments)?;
    if !path.exists() {
        return Err(LocateError::MissingArtifact { path });
    }
    Ok(path)
}
