//! 阶段结果与兜底包装
//!
//! 分析器的任何故障（返回错误或 panic）都在这里被截住并换成兜底值，
//! 原因作为数据随结果一起返回。

use crate::error::AnalyzerError;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// 分析阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Emotion,
    Behavior,
    Transcription,
    Evaluation,
    Feedback,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Emotion => "Emotion prediction",
            Stage::Behavior => "Video analysis",
            Stage::Transcription => "Audio conversion",
            Stage::Evaluation => "Answer evaluation",
            Stage::Feedback => "Feedback generation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 阶段结果：正常值，或带原因的兜底值
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Ok(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Ok(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StageOutcome::Ok(_) => None,
            StageOutcome::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    pub fn into_value(self) -> T {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            StageOutcome::Ok(value) => (value, None),
            StageOutcome::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}

/// 执行异步阶段，失败或 panic 时返回兜底值
///
/// `fallback` 收到的是故障描述（不含阶段名）。
pub async fn guard<T, F>(stage: Stage, fut: F, fallback: impl FnOnce(&str) -> T) -> StageOutcome<T>
where
    F: Future<Output = Result<T, AnalyzerError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => StageOutcome::Ok(value),
        Ok(Err(e)) => degrade(stage, e.to_string(), fallback),
        Err(payload) => degrade(stage, format!("panicked: {}", panic_message(payload.as_ref())), fallback),
    }
}

/// 同步版本的 [`guard`]
pub fn guard_sync<T>(stage: Stage, f: impl FnOnce() -> T, fallback: impl FnOnce(&str) -> T) -> StageOutcome<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => StageOutcome::Ok(value),
        Err(payload) => degrade(stage, format!("panicked: {}", panic_message(payload.as_ref())), fallback),
    }
}

fn degrade<T>(stage: Stage, detail: String, fallback: impl FnOnce(&str) -> T) -> StageOutcome<T> {
    let reason = format!("{} failed: {}", stage, detail);
    error!("❌ {}", reason);
    StageOutcome::Degraded {
        value: fallback(&detail),
        reason,
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guard_passes_through_success() {
        let outcome = guard(Stage::Emotion, async { Ok::<_, AnalyzerError>(vec![1, 2]) }, |_| Vec::new()).await;
        assert_eq!(outcome, StageOutcome::Ok(vec![1, 2]));
    }

    #[tokio::test]
    async fn guard_converts_error_into_fallback() {
        let outcome: StageOutcome<Vec<u8>> = guard(
            Stage::Emotion,
            async { Err::<Vec<u8>, _>(AnalyzerError::Unavailable("model missing".to_string())) },
            |_| Vec::new(),
        )
        .await;

        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
        let reason = outcome.reason().unwrap();
        assert!(reason.starts_with("Emotion prediction failed"));
        assert!(reason.contains("model missing"));
    }

    #[tokio::test]
    async fn guard_catches_panics() {
        async fn crashing_decoder() -> Result<String, AnalyzerError> {
            panic!("decoder crashed")
        }

        let outcome = guard(Stage::Transcription, crashing_decoder(), |_| String::new()).await;

        assert_eq!(outcome.value(), "");
        assert!(outcome.reason().unwrap().contains("decoder crashed"));
    }

    #[test]
    fn guard_sync_catches_panics() {
        let outcome: StageOutcome<u32> = guard_sync(Stage::Feedback, || panic!("bad"), |_| 0);
        assert_eq!(outcome.into_parts(), (0, Some("Feedback generation failed: panicked: bad".to_string())));
    }
}
