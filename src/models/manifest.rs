use crate::models::analysis::BehavioralScores;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Single,
    Batch,
    Feedback,
    /// 根据简历和职位描述生成面试问题
    Questions,
}

/// 任务清单
///
/// ```toml
/// question = "Describe a difficult bug you fixed"
/// question_index = 0
/// videos = ["answers/take1.mp4"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewManifest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_index: i64,
    /// 未指定时按视频数量决定：一个视频为单视频模式，否则为批量模式
    #[serde(default)]
    pub mode: Option<RunMode>,
    #[serde(default)]
    pub videos: Vec<PathBuf>,
    /// 仅用于反馈模式的行为得分列表
    #[serde(default)]
    pub results: Vec<BehavioralScores>,
    /// 仅用于问题生成模式
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub jd: String,
}

impl InterviewManifest {
    pub fn resolved_mode(&self) -> RunMode {
        self.mode.unwrap_or(if self.videos.len() == 1 {
            RunMode::Single
        } else {
            RunMode::Batch
        })
    }
}
