use serde::{Deserialize, Serialize};
use std::fmt;

/// 答案评估状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationStatus {
    Correct,
    #[serde(rename = "Partially Correct")]
    PartiallyCorrect,
    Incorrect,
    #[serde(rename = "No Audio")]
    NoAudio,
    Error,
}

impl EvaluationStatus {
    /// 宽松解析 LLM 返回的状态文本
    pub fn parse_loose(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "correct" => Some(Self::Correct),
            "partially correct" | "partial" | "partially" => Some(Self::PartiallyCorrect),
            "incorrect" | "wrong" => Some(Self::Incorrect),
            "no audio" => Some(Self::NoAudio),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Correct => "Correct",
            Self::PartiallyCorrect => "Partially Correct",
            Self::Incorrect => "Incorrect",
            Self::NoAudio => "No Audio",
            Self::Error => "Error",
        };
        f.write_str(text)
    }
}

/// 答案评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: EvaluationStatus,
    /// 0-100
    pub score: u8,
    pub feedback: String,
    pub reasoning: String,
    pub suggestions: String,
}

impl EvaluationResult {
    /// 转写为空时的结果，不会调用评估服务
    pub fn no_audio() -> Self {
        Self {
            status: EvaluationStatus::NoAudio,
            score: 0,
            feedback: "No speech detected in the video".to_string(),
            reasoning: "No transcript available for evaluation".to_string(),
            suggestions: "Ensure microphone is working and speak clearly".to_string(),
        }
    }

    /// 评估服务失败时的兜底结果
    pub fn error(reason: &str) -> Self {
        Self {
            status: EvaluationStatus::Error,
            score: 0,
            feedback: format!("Evaluation error: {}", reason),
            reasoning: format!("System error during evaluation: {}", reason),
            suggestions: "Please try again later".to_string(),
        }
    }

    /// 视频处理整体失败时使用
    pub fn processing_failed(reason: &str) -> Self {
        Self {
            status: EvaluationStatus::Error,
            score: 0,
            feedback: "Video processing failed".to_string(),
            reasoning: reason.to_string(),
            suggestions: "Please try recording again".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_spaces() {
        let json = serde_json::to_string(&EvaluationStatus::PartiallyCorrect).unwrap();
        assert_eq!(json, "\"Partially Correct\"");
        let json = serde_json::to_string(&EvaluationStatus::NoAudio).unwrap();
        assert_eq!(json, "\"No Audio\"");
    }

    #[test]
    fn parse_loose_accepts_variants() {
        assert_eq!(
            EvaluationStatus::parse_loose(" partially_correct "),
            Some(EvaluationStatus::PartiallyCorrect)
        );
        assert_eq!(EvaluationStatus::parse_loose("CORRECT"), Some(EvaluationStatus::Correct));
        assert_eq!(EvaluationStatus::parse_loose("maybe"), None);
    }
}
