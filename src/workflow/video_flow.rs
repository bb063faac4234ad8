//! 视频处理流程 - 流程层
//!
//! 核心职责：定义"一个视频"的分析流程
//!
//! 流程顺序：
//! 1. 情绪识别 ∥ 行为信号 ∥ 语音转写（三者互不依赖，并发执行）
//! 2. 答案评估（依赖转写结果）
//! 3. 反馈生成（依赖行为得分）
//!
//! 批量模式只执行第 1 步，评估和反馈在汇总之后各做一次。

use std::path::Path;
use tracing::{debug, info, warn};

use crate::clients::Analyzers;
use crate::error::PipelineError;
use crate::infrastructure::validate_video_file;
use crate::models::{AnalysisRecord, BehavioralScores, EvaluationResult, FeedbackReport};
use crate::services::{
    run_behavior_stage, run_emotion_stage, run_evaluation_stage, run_feedback_stage,
    run_transcription_stage,
};
use crate::utils::logging::truncate_text;
use crate::workflow::video_ctx::VideoCtx;

/// 视频处理流程
///
/// - 编排单个视频的分析阶段
/// - 不持有任何资源（工作目录）
/// - 只依赖业务能力（services）与外部分析器
#[derive(Clone)]
pub struct VideoFlow {
    analyzers: Analyzers,
}

impl VideoFlow {
    /// 创建新的视频处理流程
    pub fn new(analyzers: Analyzers) -> Self {
        Self { analyzers }
    }

    /// 分析单个视频
    ///
    /// 只有视频文件本身不可用时返回错误；任何分析器故障都会变成兜底值，
    /// 原因记录在结果的 `error` 字段中。
    pub async fn analyze(&self, video: &Path, ctx: &VideoCtx) -> Result<AnalysisRecord, PipelineError> {
        if !validate_video_file(video).await {
            warn!("{} ⚠️ 视频文件无效，跳过分析", ctx);
            return Err(PipelineError::InvalidVideo {
                path: video.to_path_buf(),
            });
        }

        info!("{} 🎬 开始分析", ctx);

        let (emotion, behavior, transcript) = tokio::join!(
            run_emotion_stage(self.analyzers.emotion.as_ref(), video),
            run_behavior_stage(self.analyzers.behavior.as_ref(), video),
            run_transcription_stage(self.analyzers.transcriber.as_ref(), video),
        );

        let (emotion, emotion_err) = emotion.into_parts();
        let (scores, behavior_err) = behavior.into_parts();
        // 转写失败与"没有语音"不做区分，原因只记日志
        let (transcript, transcript_err) = transcript.into_parts();
        if let Some(reason) = transcript_err {
            debug!("{} 转写兜底为空字符串: {}", ctx, reason);
        }

        let errors: Vec<String> = [emotion_err, behavior_err].into_iter().flatten().collect();
        let error = if errors.is_empty() {
            None
        } else {
            Some(errors.join("; "))
        };

        info!(
            "{} ✓ 分析完成: 情绪 {} 帧, 转写 \"{}\"{}",
            ctx,
            emotion.len(),
            truncate_text(&transcript, 40),
            if error.is_some() { " (部分阶段降级)" } else { "" }
        );

        Ok(AnalysisRecord {
            emotion,
            transcript,
            scores,
            error,
        })
    }

    /// 评估回答
    pub async fn evaluate(&self, question: &str, transcript: &str) -> EvaluationResult {
        run_evaluation_stage(self.analyzers.evaluator.as_ref(), question, transcript)
            .await
            .into_value()
    }

    /// 根据行为得分生成反馈
    pub fn synthesize_feedback(&self, scores: &BehavioralScores) -> FeedbackReport {
        run_feedback_stage(scores).into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{
        AnswerEvaluator, BehaviorDetector, EmotionClassifier, QuestionGenerator, Transcriber,
    };
    use crate::error::AnalyzerError;
    use crate::models::EvaluationStatus;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Scripted {
        emotion_fails: bool,
        transcript: &'static str,
    }

    #[async_trait]
    impl EmotionClassifier for Scripted {
        async fn classify(&self, _video: &Path) -> Result<Vec<String>, AnalyzerError> {
            if self.emotion_fails {
                Err(AnalyzerError::Unavailable("no face found".to_string()))
            } else {
                Ok(vec!["Happy".to_string(), "Neutral".to_string()])
            }
        }
    }

    #[async_trait]
    impl BehaviorDetector for Scripted {
        async fn detect(&self, _video: &Path) -> Result<BehavioralScores, AnalyzerError> {
            Ok(BehavioralScores::from_values([0.8, 0.4, 0.7, 0.9, 0.6, 0.2]))
        }
    }

    #[async_trait]
    impl Transcriber for Scripted {
        async fn transcribe(&self, _video: &Path) -> Result<String, AnalyzerError> {
            Ok(self.transcript.to_string())
        }
    }

    #[async_trait]
    impl AnswerEvaluator for Scripted {
        async fn evaluate(&self, _question: &str, _transcript: &str) -> Result<EvaluationResult, AnalyzerError> {
            Ok(EvaluationResult {
                status: EvaluationStatus::Correct,
                score: 85,
                feedback: "Good".to_string(),
                reasoning: "Relevant".to_string(),
                suggestions: String::new(),
            })
        }
    }

    #[async_trait]
    impl QuestionGenerator for Scripted {
        async fn generate(&self, _resume: &str, _jd: &str) -> Result<Vec<String>, AnalyzerError> {
            Ok(Vec::new())
        }
    }

    fn flow(scripted: Scripted) -> VideoFlow {
        let shared = Arc::new(scripted);
        VideoFlow::new(Analyzers {
            emotion: shared.clone(),
            behavior: shared.clone(),
            transcriber: shared.clone(),
            evaluator: shared.clone(),
            questions: shared,
        })
    }

    async fn write_video(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(format!("{}.mp4", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&path, bytes).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_merges_stage_outputs() {
        let dir = std::env::temp_dir();
        let video = write_video(&dir, b"fake video bytes").await;
        let flow = flow(Scripted {
            emotion_fails: false,
            transcript: "  I led the migration  ",
        });

        let record = flow.analyze(&video, &VideoCtx::new("t", 1, "a.mp4")).await.unwrap();

        assert_eq!(record.emotion, vec!["Happy", "Neutral"]);
        assert_eq!(record.transcript, "I led the migration");
        assert_eq!(record.scores.confidence, 0.9);
        assert!(record.error.is_none());

        tokio::fs::remove_file(&video).await.unwrap();
    }

    #[tokio::test]
    async fn test_stage_failure_is_annotated_not_raised() {
        let dir = std::env::temp_dir();
        let video = write_video(&dir, b"fake video bytes").await;
        let flow = flow(Scripted {
            emotion_fails: true,
            transcript: "",
        });

        let record = flow.analyze(&video, &VideoCtx::new("t", 1, "a.mp4")).await.unwrap();

        assert!(record.emotion.is_empty());
        let error = record.error.unwrap();
        assert!(error.starts_with("Emotion prediction failed"));
        assert_eq!(record.scores.eye_contact, 0.8);

        tokio::fs::remove_file(&video).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_byte_video_is_rejected() {
        let dir = std::env::temp_dir();
        let video = write_video(&dir, b"").await;
        let flow = flow(Scripted {
            emotion_fails: false,
            transcript: "hello",
        });

        let result = flow.analyze(&video, &VideoCtx::new("t", 1, "empty.mp4")).await;
        assert!(matches!(result, Err(PipelineError::InvalidVideo { .. })));

        tokio::fs::remove_file(&video).await.unwrap();
    }

    #[tokio::test]
    async fn test_evaluate_and_feedback() {
        let flow = flow(Scripted {
            emotion_fails: false,
            transcript: "",
        });

        let evaluation = flow.evaluate("Why Rust?", "Memory safety").await;
        assert_eq!(evaluation.status, EvaluationStatus::Correct);

        let no_audio = flow.evaluate("Why Rust?", "").await;
        assert_eq!(no_audio.status, EvaluationStatus::NoAudio);

        let feedback = flow.synthesize_feedback(&BehavioralScores::from_values([0.8, 0.4, 0.7, 0.9, 0.6, 0.2]));
        assert!(feedback.strengths.contains(&"Maintains good eye contact".to_string()));
    }
}
