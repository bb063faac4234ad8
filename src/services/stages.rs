//! 分析阶段适配 - 业务能力层
//!
//! 每个函数包装一个外部分析器，任何输入下都只返回结果，不会失败。

use crate::clients::{AnswerEvaluator, BehaviorDetector, EmotionClassifier, Transcriber};
use crate::models::{BehavioralScores, EvaluationResult, FeedbackReport};
use crate::services::feedback_service::synthesize_feedback;
use crate::services::stage::{guard, guard_sync, Stage, StageOutcome};
use crate::utils::logging::truncate_text;
use std::path::Path;
use tracing::info;

/// 情绪阶段：失败时返回空序列
pub async fn run_emotion_stage(classifier: &dyn EmotionClassifier, video: &Path) -> StageOutcome<Vec<String>> {
    info!("🎭 开始情绪识别: {}", video.display());
    let outcome = guard(Stage::Emotion, classifier.classify(video), |_| Vec::new()).await;
    if !outcome.is_degraded() {
        info!("✓ 情绪识别完成: {} 帧", outcome.value().len());
    }
    outcome
}

/// 行为信号阶段：失败时六项得分全为 0
pub async fn run_behavior_stage(detector: &dyn BehaviorDetector, video: &Path) -> StageOutcome<BehavioralScores> {
    info!("📊 开始行为信号分析: {}", video.display());
    guard(
        Stage::Behavior,
        async { detector.detect(video).await.map(BehavioralScores::clamped) },
        |_| BehavioralScores::default(),
    )
    .await
}

/// 转写阶段：失败时返回空字符串
///
/// 空字符串同时表示"没有语音"和"转写失败"，下游按同一种情况处理。
pub async fn run_transcription_stage(transcriber: &dyn Transcriber, video: &Path) -> StageOutcome<String> {
    info!("🎤 开始语音转写: {}", video.display());
    let outcome = guard(
        Stage::Transcription,
        async { transcriber.transcribe(video).await.map(|text| text.trim().to_string()) },
        |_| String::new(),
    )
    .await;
    info!("✓ 语音转写结束: {} 个字符", outcome.value().chars().count());
    outcome
}

/// 答案评估阶段
///
/// 转写为空时直接返回 `No Audio`，不调用评估服务。
pub async fn run_evaluation_stage(
    evaluator: &dyn AnswerEvaluator,
    question: &str,
    transcript: &str,
) -> StageOutcome<EvaluationResult> {
    if transcript.trim().is_empty() {
        info!("🔇 转写为空，跳过答案评估");
        return StageOutcome::Ok(EvaluationResult::no_audio());
    }

    info!("📝 开始答案评估: {}", truncate_text(question, 50));
    let outcome = guard(
        Stage::Evaluation,
        async {
            evaluator.evaluate(question, transcript).await.map(|mut result| {
                result.score = result.score.min(100);
                result
            })
        },
        EvaluationResult::error,
    )
    .await;

    info!(
        "✓ 答案评估结束: {} ({} 分)",
        outcome.value().status,
        outcome.value().score
    );
    outcome
}

/// 反馈生成阶段：失败时只有一条描述故障的不足项
pub fn run_feedback_stage(scores: &BehavioralScores) -> StageOutcome<FeedbackReport> {
    info!("💬 开始生成反馈");
    guard_sync(Stage::Feedback, || synthesize_feedback(scores), FeedbackReport::failed)
}
