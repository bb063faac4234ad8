use crate::error::ConfigError;
use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 批量模式下同时分析的视频数量
    pub max_workers: usize,
    /// 单次批量请求允许的最大视频数
    pub max_batch_videos: usize,
    /// 单个上传文件的大小上限（字节）
    pub max_upload_bytes: u64,
    /// 写入上传文件时的分块大小（字节）
    pub upload_chunk_size: usize,
    /// 临时工作目录的根目录
    pub work_root: PathBuf,
    /// 临时工作目录名前缀
    pub work_dir_prefix: String,
    /// 创建临时目录失败时使用的兜底目录（相对于当前工作目录）
    pub fallback_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 任务清单文件
    pub manifest_path: String,
    /// 评估结果输出文件
    pub output_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_fallback_model: Option<String>,
    pub llm_timeout_secs: u64,
    // --- 推理服务配置 ---
    pub inference_base_url: String,
    pub inference_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: 3,
            max_batch_videos: 10,
            max_upload_bytes: 100 * 1024 * 1024,
            upload_chunk_size: 8192,
            work_root: std::env::temp_dir(),
            work_dir_prefix: "interview_video_".to_string(),
            fallback_dir: PathBuf::from("temp_single_upload"),
            verbose_logging: false,
            manifest_path: "interview.toml".to_string(),
            output_file: "assessment.json".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.together.xyz/v1".to_string(),
            llm_model_name: "NousResearch/Nous-Hermes-2-Mixtral-8x7B-DPO".to_string(),
            llm_fallback_model: Some("mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()),
            llm_timeout_secs: 45,
            inference_base_url: "http://localhost:8001".to_string(),
            inference_timeout_secs: 300,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_workers),
            max_batch_videos: std::env::var("MAX_BATCH_VIDEOS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_batch_videos),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_upload_bytes),
            upload_chunk_size: std::env::var("UPLOAD_CHUNK_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.upload_chunk_size),
            work_root: std::env::var("WORK_ROOT").map(PathBuf::from).unwrap_or(default.work_root),
            work_dir_prefix: std::env::var("WORK_DIR_PREFIX").unwrap_or(default.work_dir_prefix),
            fallback_dir: std::env::var("FALLBACK_DIR").map(PathBuf::from).unwrap_or(default.fallback_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            manifest_path: std::env::var("MANIFEST_PATH").unwrap_or(default.manifest_path),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_fallback_model: std::env::var("LLM_FALLBACK_MODEL").ok().or(default.llm_fallback_model),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            inference_base_url: std::env::var("INFERENCE_BASE_URL").unwrap_or(default.inference_base_url),
            inference_timeout_secs: std::env::var("INFERENCE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.inference_timeout_secs),
        }
    }

    /// 检查会导致运行期死锁或死循环的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_workers",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.upload_chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upload_chunk_size",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.max_batch_videos == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_batch_videos",
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_service_limits() {
        let config = Config::default();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.max_batch_videos, 10);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.upload_chunk_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = Config {
            max_workers: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "max_workers", .. })
        ));
    }
}
