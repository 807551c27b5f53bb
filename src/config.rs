use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{LocateRequest, NameFilter, validate_segment};
use crate::utils::{default_output_root, get_workspace_dir};

/// 配置文件默认名称
pub const CONFIG_FILE_NAME: &str = "artloc.toml";
/// 默认平台前缀
pub const DEFAULT_PREFIX: &str = "applebin_ios-ios_armv7";

pub const ENV_CONFIG: &str = "ARTLOC_CONFIG";
pub const ENV_OUTPUT_ROOT: &str = "ARTLOC_OUTPUT_ROOT";

/// 预设：一个具名的产物定位规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// 目录名前缀，缺省时使用 default_prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// 候选目录下的产物相对路径
    pub artifact: Vec<String>,
    #[serde(default)]
    pub verify: bool,
}

impl Preset {
    fn new(artifact: &[&str]) -> Self {
        Self {
            prefix: None,
            artifact: artifact.iter().map(|s| s.to_string()).collect(),
            verify: false,
        }
    }
}

/// artloc 主配置结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtlocConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
    #[serde(default = "default_prefix")]
    pub default_prefix: String,
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
    /// 配置实际来源（运行时填充，不写入文件）
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn builtin_presets() -> BTreeMap<String, Preset> {
    let mut presets = BTreeMap::new();
    presets.insert("dsym".to_string(), Preset::new(&["bin", "Telegram"]));
    presets.insert(
        "ipa".to_string(),
        Preset::new(&["bin", "Telegram", "Telegram.ipa"]),
    );
    presets
}

impl Default for ArtlocConfig {
    fn default() -> Self {
        Self {
            output_root: None,
            default_prefix: default_prefix(),
            presets: builtin_presets(),
            source: None,
        }
    }
}

impl ArtlocConfig {
    /// 加载配置：--config > ARTLOC_CONFIG > <工作区>/artloc.toml > 内置默认值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = env::var_os(ENV_CONFIG).map(PathBuf::from);
        let implicit = get_workspace_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME));
        Self::load_from_sources(explicit, env_path, implicit)
    }

    pub fn load_from_sources(
        explicit: Option<&Path>,
        env_path: Option<PathBuf>,
        implicit: Option<PathBuf>,
    ) -> Result<Self> {
        // 显式指定的配置文件必须存在
        if let Some(path) = explicit.map(Path::to_path_buf).or(env_path) {
            return Self::load_file(&path);
        }

        match implicit {
            Some(path) if path.is_file() => Self::load_file(&path),
            _ => {
                log::debug!("未找到配置文件，使用内置默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 从文件读取配置，文件中的预设覆盖同名内置预设
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("配置文件格式错误 {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        log::debug!("已加载配置文件 {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: ArtlocConfig = toml::from_str(content)?;
        for (name, preset) in builtin_presets() {
            config.presets.entry(name).or_insert(preset);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_prefix.is_empty() {
            bail!("default_prefix 不能为空");
        }
        for (name, preset) in &self.presets {
            for segment in &preset.artifact {
                validate_segment(segment)
                    .with_context(|| format!("预设 '{}' 的 artifact 无效", name))?;
            }
        }
        Ok(())
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("无法写入配置文件 {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 构建输出目录：--root > ARTLOC_OUTPUT_ROOT > 配置文件 > <工作区>/bazel-out
    pub fn output_root(&self, flag: Option<&Path>) -> Result<PathBuf> {
        let env_root = env::var_os(ENV_OUTPUT_ROOT).map(PathBuf::from);
        self.pick_output_root(flag, env_root, default_output_root)
    }

    fn pick_output_root(
        &self,
        flag: Option<&Path>,
        env_root: Option<PathBuf>,
        fallback: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<PathBuf> {
        if let Some(root) = flag {
            return Ok(root.to_path_buf());
        }
        if let Some(root) = env_root.filter(|r| !r.as_os_str().is_empty()) {
            return Ok(root);
        }
        if let Some(root) = &self.output_root {
            return Ok(self.relative_to_source(root));
        }
        fallback()
    }

    /// 配置文件中的相对路径相对于配置文件所在目录
    fn relative_to_source(&self, path: &Path) -> PathBuf {
        match self.source.as_deref().and_then(Path::parent) {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn preset(&self, name: &str) -> Result<&Preset> {
        self.presets.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.presets.keys().map(String::as_str).collect();
            anyhow!("未知预设 '{}'，可用预设: {}", name, known.join(", "))
        })
    }

    pub fn prefix_for<'a>(&'a self, preset: &'a Preset) -> &'a str {
        preset.prefix.as_deref().unwrap_or(&self.default_prefix)
    }

    /// 根据预设生成定位请求
    pub fn request_for(&self, name: &str, root: PathBuf) -> Result<LocateRequest> {
        let preset = self.preset(name)?;
        let filter = NameFilter::prefix(self.prefix_for(preset));
        Ok(LocateRequest::new(root, filter, preset.artifact.clone()).verify(preset.verify))
    }
}
