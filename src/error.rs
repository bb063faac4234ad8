use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
///
/// 只有请求校验失败会以错误的形式交给调用方；分析阶段的故障在适配层
/// 就被转换成兜底值，不会出现在这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求校验错误（客户端错误）
    #[error("请求校验失败: {0}")]
    Validation(#[from] ValidationError),
    /// 临时存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 编排流程错误
    #[error("流程错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(e) => e.status_code(),
            AppError::Storage(StorageError::SizeLimitExceeded { .. }) => 413,
            AppError::Storage(_) | AppError::Pipeline(_) | AppError::Config(_) => 500,
        }
    }

    /// 是否属于客户端错误
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// 请求校验错误
///
/// 在任何分析阶段开始之前拒绝请求。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No video file provided")]
    MissingFile,
    #[error("Question is required")]
    EmptyQuestion,
    #[error("Invalid question index: {index}")]
    NegativeQuestionIndex { index: i64 },
    #[error("No video files provided")]
    EmptyBatch,
    #[error("Too many videos ({count}, max {max})")]
    TooManyVideos { count: usize, max: usize },
    #[error("File size too large (max {})", format_limit(.limit_bytes))]
    FileTooLarge { limit_bytes: u64 },
    #[error("Invalid or corrupted video file")]
    InvalidVideoFile,
    #[error("No valid video files found")]
    NoValidVideos,
    #[error("Resume or job description is required")]
    MissingResumeAndJd,
}

impl ValidationError {
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::FileTooLarge { .. } => 413,
            _ => 400,
        }
    }
}

/// 临时存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 文件读写失败
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 上传内容超过大小上限
    #[error("上传文件超过大小上限 ({limit} 字节)")]
    SizeLimitExceeded { limit: u64 },
}

/// 编排流程错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 视频文件在分析前校验失败
    #[error("Invalid video file: {path}")]
    InvalidVideo { path: PathBuf },
    /// 批量请求中没有任何视频产出分析结果
    #[error("No valid analysis results found ({total} videos submitted)")]
    AllVideosFailed { total: usize },
    /// 工作池异常
    #[error("工作池异常: {0}")]
    WorkerPool(String),
    /// 面试问题生成失败
    #[error("Question generation failed: {0}")]
    QuestionGeneration(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// 外部分析器错误
///
/// 只在分析器与阶段适配层之间传递，不会越过适配层。
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("timeout after {0} seconds")]
    Timeout(u64),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ========== 便捷构造函数 ==========

impl StorageError {
    /// 创建文件操作错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ValidationError {
    /// 由字节上限构造超限错误
    pub fn file_too_large(limit_bytes: u64) -> Self {
        ValidationError::FileTooLarge { limit_bytes }
    }
}

/// 按最大的整除单位显示上限：100MB、512KB，否则按字节
fn format_limit(limit_bytes: &u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    match *limit_bytes {
        0 => "0 bytes".to_string(),
        bytes if bytes % MB == 0 => format!("{}MB", bytes / MB),
        bytes if bytes % KB == 0 => format!("{}KB", bytes / KB),
        bytes => format!("{} bytes", bytes),
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(AppError::from(ValidationError::EmptyQuestion).status_code(), 400);
        assert_eq!(AppError::from(ValidationError::file_too_large(100 * 1024 * 1024)).status_code(), 413);
        assert_eq!(
            AppError::from(PipelineError::AllVideosFailed { total: 2 }).status_code(),
            500
        );
        assert!(AppError::from(ValidationError::NoValidVideos).is_client_error());
    }

    #[test]
    fn oversize_message_reports_megabytes() {
        let err = ValidationError::file_too_large(100 * 1024 * 1024);
        assert_eq!(err.to_string(), "File size too large (max 100MB)");
    }

    #[test]
    fn oversize_message_keeps_small_limits_readable() {
        assert_eq!(
            ValidationError::file_too_large(1024).to_string(),
            "File size too large (max 1KB)"
        );
        assert_eq!(
            ValidationError::file_too_large(1000).to_string(),
            "File size too large (max 1000 bytes)"
        );
    }
}
