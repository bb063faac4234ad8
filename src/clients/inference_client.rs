/// 推理服务客户端
///
/// 情绪分类、行为信号检测和语音转写都由本地推理服务完成，
/// 服务与本进程共享文件系统，请求中只传视频路径。
use crate::clients::analyzer::{BehaviorDetector, EmotionClassifier, Transcriber};
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::BehavioralScores;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct VideoRequest<'a> {
    video_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmotionResponse {
    #[serde(default)]
    emotions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// 推理服务客户端
pub struct InferenceClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
}

impl InferenceClient {
    /// 创建新的推理服务客户端
    pub fn new(config: &Config) -> Result<Self, AnalyzerError> {
        Self::with_base_url(&config.inference_base_url, config.inference_timeout_secs)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    /// 检查推理服务是否可用
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response
                .json::<HealthResponse>()
                .await
                .map(|health| health.status == "healthy" || health.status == "ok")
                .unwrap_or(false),
            Ok(response) => {
                warn!("推理服务健康检查失败: {}", response.status());
                false
            }
            Err(e) => {
                warn!("推理服务健康检查异常: {}", e);
                false
            }
        }
    }

    async fn post_video<T: DeserializeOwned>(&self, endpoint: &str, video: &Path) -> Result<T, AnalyzerError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let video_path = video.to_string_lossy();
        debug!("调用推理服务 {}: {}", url, video_path);

        let response = self
            .http
            .post(&url)
            .json(&VideoRequest {
                video_path: &video_path,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    AnalyzerError::Unavailable(e.to_string())
                } else {
                    AnalyzerError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::RequestFailed(format!(
                "{} returned {}: {}",
                endpoint, status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| AnalyzerError::InvalidResponse(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl EmotionClassifier for InferenceClient {
    async fn classify(&self, video: &Path) -> Result<Vec<String>, AnalyzerError> {
        let response: EmotionResponse = self.post_video("emotion", video).await?;
        Ok(response.emotions)
    }
}

#[async_trait]
impl BehaviorDetector for InferenceClient {
    async fn detect(&self, video: &Path) -> Result<BehavioralScores, AnalyzerError> {
        self.post_video("behavior", video).await
    }
}

#[async_trait]
impl Transcriber for InferenceClient {
    async fn transcribe(&self, video: &Path) -> Result<String, AnalyzerError> {
        let response: TranscriptResponse = self.post_video("transcribe", video).await?;
        Ok(response.transcript)
    }
}
