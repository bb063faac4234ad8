use serde::{Deserialize, Serialize};

/// 反馈报告
///
/// 只由六项行为得分推导，不依赖其他状态。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// 0-100
    pub overall_score: u32,
    pub confidence_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

impl FeedbackReport {
    /// 反馈生成失败时的兜底报告
    pub fn failed(reason: &str) -> Self {
        Self {
            weaknesses: vec![format!("Feedback generation failed: {}", reason)],
            ..Default::default()
        }
    }

    /// 视频处理整体失败时使用
    pub fn processing_failed(weakness: &str) -> Self {
        Self {
            weaknesses: vec![weakness.to_string()],
            suggestions: vec!["Please try recording again".to_string()],
            ..Default::default()
        }
    }
}
