//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、连接推理服务、创建 LLM 服务
//! 2. **请求入口**：单视频、批量、反馈汇总和面试问题生成
//! 3. **清单运行**：读取任务清单，执行对应模式，把 JSON 结果写入输出文件
//!
//! 所有请求共享同一个 `StorageManager` 和 `VideoFlow`，但每个请求独占自己的工作目录。

use crate::clients::{Analyzers, InferenceClient, QuestionGenerator};
use crate::config::Config;
use crate::error::{AppError, AppResult, PipelineError, StorageError, ValidationError};
use crate::infrastructure::StorageManager;
use crate::models::{
    load_manifest, BatchResponse, BehavioralScores, ErrorResponse, FeedbackSummary,
    GeneratedQuestions, InterviewManifest, RunMode, SingleVideoResponse, UploadJob,
};
use crate::orchestrator::batch_processor::{self, BatchLimits};
use crate::orchestrator::single_processor;
use crate::services::{average_scores, LlmService};
use crate::utils::logging::log_startup;
use crate::workflow::VideoFlow;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 一次清单运行的结果
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunOutput {
    Single(SingleVideoResponse),
    Batch(BatchResponse),
    Feedback(FeedbackSummary),
    Questions(GeneratedQuestions),
}

/// 应用主结构
pub struct App {
    config: Config,
    storage: StorageManager,
    flow: VideoFlow,
    questions: Arc<dyn QuestionGenerator>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        log_startup(config.max_workers, config.max_batch_videos);

        let inference = Arc::new(InferenceClient::new(&config)?);
        if inference.health_check().await {
            info!("✓ 推理服务已连接: {}", config.inference_base_url);
        } else {
            warn!(
                "⚠️ 推理服务不可用 ({})，相关阶段将返回兜底结果",
                config.inference_base_url
            );
        }

        let llm = Arc::new(LlmService::new(&config));

        let analyzers = Analyzers {
            emotion: inference.clone(),
            behavior: inference.clone(),
            transcriber: inference,
            evaluator: llm.clone(),
            questions: llm,
        };

        Ok(Self::with_analyzers(config, analyzers))
    }

    /// 使用给定的分析器创建应用
    pub fn with_analyzers(config: Config, analyzers: Analyzers) -> Self {
        Self {
            storage: StorageManager::new(&config),
            questions: analyzers.questions.clone(),
            flow: VideoFlow::new(analyzers),
            config,
        }
    }

    /// 分析单个视频
    pub async fn analyze_single(
        &self,
        question: &str,
        question_index: i64,
        upload: Option<UploadJob>,
    ) -> AppResult<SingleVideoResponse> {
        single_processor::process_single(&self.storage, &self.flow, question, question_index, upload).await
    }

    /// 批量分析多个视频
    pub async fn analyze_batch(&self, question: &str, uploads: Vec<UploadJob>) -> AppResult<BatchResponse> {
        let limits = BatchLimits {
            max_workers: self.config.max_workers,
            max_videos: self.config.max_batch_videos,
        };
        batch_processor::process_batch(&self.storage, &self.flow, limits, question, uploads).await
    }

    /// 汇总多组行为得分并生成反馈
    pub fn summarize_feedback(&self, results: &[BehavioralScores]) -> FeedbackSummary {
        let clamped: Vec<BehavioralScores> = results.iter().map(|scores| scores.clamped()).collect();
        let result = average_scores(&clamped);
        let feedback = self.flow.synthesize_feedback(&result);
        FeedbackSummary { result, feedback }
    }

    /// 根据简历和职位描述生成面试问题
    ///
    /// 两者都为空时拒绝请求；生成失败属于服务端错误。
    pub async fn generate_questions(&self, resume: &str, jd: &str) -> AppResult<GeneratedQuestions> {
        if resume.trim().is_empty() && jd.trim().is_empty() {
            return Err(ValidationError::MissingResumeAndJd.into());
        }

        let questions = self.questions.generate(resume, jd).await.map_err(|e| {
            error!("❌ 面试问题生成失败: {}", e);
            PipelineError::QuestionGeneration(e.to_string())
        })?;

        info!("✓ 面试问题已生成: {} 个", questions.len());
        Ok(GeneratedQuestions { questions })
    }

    /// 执行一份任务清单
    pub async fn execute(&self, manifest: &InterviewManifest) -> AppResult<RunOutput> {
        let mode = manifest.resolved_mode();
        info!("📋 运行模式: {:?}, 视频数: {}", mode, manifest.videos.len());

        match mode {
            RunMode::Single => {
                let upload = match manifest.videos.first() {
                    Some(path) => Some(open_upload(path).await?),
                    None => None,
                };
                self.analyze_single(&manifest.question, manifest.question_index, upload)
                    .await
                    .map(RunOutput::Single)
            }
            RunMode::Batch => {
                let mut uploads = Vec::with_capacity(manifest.videos.len());
                for path in &manifest.videos {
                    uploads.push(open_upload(path).await?);
                }
                self.analyze_batch(&manifest.question, uploads)
                    .await
                    .map(RunOutput::Batch)
            }
            RunMode::Feedback => Ok(RunOutput::Feedback(self.summarize_feedback(&manifest.results))),
            RunMode::Questions => self
                .generate_questions(&manifest.resume, &manifest.jd)
                .await
                .map(RunOutput::Questions),
        }
    }

    /// 运行应用主逻辑
    ///
    /// 结果或错误都写入输出文件；请求被拒绝时返回错误，进程以非零状态退出。
    pub async fn run(&self) -> Result<()> {
        let manifest_path = Path::new(&self.config.manifest_path);
        info!("\n📁 正在加载任务清单: {}", manifest_path.display());
        let manifest = load_manifest(manifest_path).await?;

        let outcome = self.execute(&manifest).await;

        let json = match &outcome {
            Ok(output) => serde_json::to_string_pretty(output)?,
            Err(e) => serde_json::to_string_pretty(&ErrorResponse::from(e))?,
        };

        tokio::fs::write(&self.config.output_file, json)
            .await
            .with_context(|| format!("无法写入结果文件: {}", self.config.output_file))?;

        info!("\n结果已保存至: {}", self.config.output_file);

        match outcome {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.is_client_error() {
                    warn!("⚠️ 请求被拒绝 ({}): {}", e.status_code(), e);
                } else {
                    error!("❌ 请求失败 ({}): {}", e.status_code(), e);
                }
                Err(e.into())
            }
        }
    }
}

/// 打开清单中的视频；文件不存在视为缺少文件
async fn open_upload(path: &Path) -> AppResult<UploadJob> {
    UploadJob::from_path(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            warn!("⚠️ 视频文件不存在: {}", path.display());
            AppError::from(ValidationError::MissingFile)
        } else {
            AppError::from(StorageError::io(path, e))
        }
    })
}
