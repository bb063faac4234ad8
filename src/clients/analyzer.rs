//! 外部分析器接口
//!
//! 每个分析器都可能失败、可能很慢；调用方（阶段适配层）负责兜底。

use crate::error::AnalyzerError;
use crate::models::{BehavioralScores, EvaluationResult};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// 情绪分类：视频 → 逐帧情绪标签
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, video: &Path) -> Result<Vec<String>, AnalyzerError>;
}

/// 行为信号检测：视频 → 六项得分
#[async_trait]
pub trait BehaviorDetector: Send + Sync {
    async fn detect(&self, video: &Path) -> Result<BehavioralScores, AnalyzerError>;
}

/// 语音转写：视频 → 文本（空字符串表示没有语音）
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, video: &Path) -> Result<String, AnalyzerError>;
}

/// 答案评估：问题 + 转写 → 评估结果
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(&self, question: &str, transcript: &str) -> Result<EvaluationResult, AnalyzerError>;
}

/// 问题生成：简历 + 职位描述 → 面试问题列表
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, resume: &str, jd: &str) -> Result<Vec<String>, AnalyzerError>;
}

/// 应用用到的全部外部分析器
#[derive(Clone)]
pub struct Analyzers {
    pub emotion: Arc<dyn EmotionClassifier>,
    pub behavior: Arc<dyn BehaviorDetector>,
    pub transcriber: Arc<dyn Transcriber>,
    pub evaluator: Arc<dyn AnswerEvaluator>,
    pub questions: Arc<dyn QuestionGenerator>,
}
