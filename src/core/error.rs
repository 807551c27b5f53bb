use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 产物定位过程中的错误
#[derive(Error, Debug)]
pub enum LocateError {
    /// 构建输出目录不存在/不可读，或者候选目录在扫描途中消失
    #[error("无法访问 {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 没有任何子目录满足名称过滤条件
    #[error("在 {} 下没有找到匹配 {filter} 的构建目录", root.display())]
    NoCandidate { root: PathBuf, filter: String },
    /// 启用了存在性校验，但产物文件不存在
    #[error("产物不存在: {}", path.display())]
    MissingArtifact { path: PathBuf },
    /// 名称正则表达式无效
    #[error("无效的目录名称正则表达式: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// 产物路径段为空、为绝对路径或包含 `..`，会越出候选目录
    #[error("无效的产物路径段: '{segment}'")]
    InvalidSegment { segment: String },
}

impl LocateError {
    pub(crate) fn access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Access {
            path: path.into(),
            source,
        }
    }

    /// 进程退出码，按错误类别区分
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Access { .. } => 1,
            Self::NoCandidate { .. } => 2,
            Self::MissingArtifact { .. } => 3,
            Self::InvalidPattern(_) | Self::InvalidSegment { .. } => 64,
        }
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, Self::NoCandidate { .. })
    }

    pub fn is_access(&self) -> bool {
        matches!(self, Self::Access { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let access = LocateError::access("/nope", io::Error::from(io::ErrorKind::NotFound));
        let selection = LocateError::NoCandidate {
            root: PathBuf::from("/out"),
            filter: "前缀 'ios'".to_string(),
        };
        let missing = LocateError::MissingArtifact {
            path: PathBuf::from("/out/a/bin"),
        };

        assert_eq!(access.exit_code(), 1);
        assert_eq!(selection.exit_code(), 2);
        assert_eq!(missing.exit_code(), 3);
        assert!(access.is_access());
        assert!(selection.is_selection());
        assert!(!missing.is_selection());

        let segment = LocateError::InvalidSegment {
            segment: "..".to_string(),
        };
        assert_eq!(segment.exit_code(), 64);
        assert!(segment.to_string().contains("'..'"));
    }

    #[test]
    fn test_messages_name_the_path() {
        let err = LocateError::NoCandidate {
            root: PathBuf::from("/out"),
            filter: "前缀 'ios'".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/out"));
        assert!(message.contains("ios"));
    }
}
