//! 响应结构
//!
//! 成功与失败共用同一结构，失败时填充零值占位，调用方只需一种解析方式。

use crate::error::AppError;
use crate::models::analysis::{AggregatedRecord, AnalysisRecord, BehavioralScores};
use crate::models::evaluation::EvaluationResult;
use crate::models::feedback::FeedbackReport;
use serde::{Deserialize, Serialize};

/// 处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Completed,
    Failed,
    ServerError,
}

/// 单视频请求的基本信息
#[derive(Debug, Clone)]
pub struct SingleRequestInfo {
    pub question: String,
    pub question_index: i64,
    pub video_name: String,
    pub file_size: u64,
}

/// 单视频分析响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleVideoResponse {
    pub success: bool,
    pub question: String,
    pub question_index: i64,
    pub video_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    pub analysis: AnalysisRecord,
    pub answer_evaluation: EvaluationResult,
    pub feedback: FeedbackReport,
    pub timestamp: f64,
    pub processing_status: ProcessingStatus,
    pub file_size: u64,
    pub processing_time: String,
}

impl SingleVideoResponse {
    pub fn completed(
        info: SingleRequestInfo,
        analysis: AnalysisRecord,
        answer_evaluation: EvaluationResult,
        feedback: FeedbackReport,
    ) -> Self {
        Self {
            success: true,
            question: info.question,
            question_index: info.question_index,
            video_name: info.video_name,
            error: None,
            analysis,
            answer_evaluation,
            feedback,
            timestamp: now_timestamp(),
            processing_status: ProcessingStatus::Completed,
            file_size: info.file_size,
            processing_time: now_iso(),
        }
    }

    /// 降级响应：结构与成功时一致，分析字段全部为零值
    pub fn degraded(info: SingleRequestInfo, status: ProcessingStatus, reason: &str) -> Self {
        let (error, weakness) = match status {
            ProcessingStatus::ServerError => (
                format!("Internal server error: {}", reason),
                "Server error occurred",
            ),
            _ => (
                format!("Processing failed: {}", reason),
                "Video processing failed",
            ),
        };

        Self {
            success: false,
            question: info.question,
            question_index: info.question_index,
            video_name: info.video_name,
            error: Some(error),
            analysis: AnalysisRecord::failed(reason),
            answer_evaluation: EvaluationResult::processing_failed(reason),
            feedback: FeedbackReport::processing_failed(weakness),
            timestamp: now_timestamp(),
            processing_status: status,
            file_size: info.file_size,
            processing_time: now_iso(),
        }
    }
}

/// 批量结果中每个成功视频的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualResult {
    /// 在提交列表中的位置（从 1 开始）
    pub video_index: usize,
    pub video_name: String,
    pub has_transcript: bool,
}

/// 批量分析响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub question: String,
    pub videos_processed: usize,
    pub total_videos: usize,
    pub analysis: AggregatedRecord,
    pub feedback: FeedbackReport,
    pub answer_evaluation: EvaluationResult,
    pub individual_results: Vec<IndividualResult>,
    pub timestamp: f64,
    pub processing_status: ProcessingStatus,
}

impl BatchResponse {
    pub fn completed(
        question: String,
        total_videos: usize,
        analysis: AggregatedRecord,
        feedback: FeedbackReport,
        answer_evaluation: EvaluationResult,
        individual_results: Vec<IndividualResult>,
    ) -> Self {
        Self {
            question,
            videos_processed: individual_results.len(),
            total_videos,
            analysis,
            feedback,
            answer_evaluation,
            individual_results,
            timestamp: now_timestamp(),
            processing_status: ProcessingStatus::Completed,
        }
    }
}

/// 行为得分汇总与反馈
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub result: BehavioralScores,
    pub feedback: FeedbackReport,
}

/// 生成的面试问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<String>,
}

/// 被拒绝的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status_code: u16,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let error = match err {
            AppError::Validation(e) => e.to_string(),
            AppError::Pipeline(e) => e.to_string(),
            other => other.to_string(),
        };
        Self {
            error,
            status_code: err.status_code(),
        }
    }
}

fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn now_iso() -> String {
    chrono::Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SingleRequestInfo {
        SingleRequestInfo {
            question: "Tell me about yourself".to_string(),
            question_index: 2,
            video_name: "answer.mp4".to_string(),
            file_size: 42,
        }
    }

    #[test]
    fn degraded_response_keeps_success_shape() {
        let ok = SingleVideoResponse::completed(
            info(),
            AnalysisRecord::default(),
            EvaluationResult::no_audio(),
            FeedbackReport::default(),
        );
        let failed = SingleVideoResponse::degraded(info(), ProcessingStatus::ServerError, "disk full");

        let ok_json = serde_json::to_value(&ok).unwrap();
        let failed_json = serde_json::to_value(&failed).unwrap();

        for key in ok_json.as_object().unwrap().keys() {
            assert!(failed_json.get(key).is_some(), "missing key {}", key);
        }
        for key in ok_json["analysis"].as_object().unwrap().keys() {
            assert!(failed_json["analysis"].get(key).is_some(), "missing analysis key {}", key);
        }
        assert_eq!(failed_json["success"], false);
        assert_eq!(failed_json["processing_status"], "server_error");
        assert_eq!(failed_json["analysis"]["eye_contact"], 0.0);
        assert_eq!(failed_json["answer_evaluation"]["status"], "Error");
    }

    #[test]
    fn batch_counts_processed_from_individual_results() {
        let response = BatchResponse::completed(
            "q".to_string(),
            4,
            AggregatedRecord::default(),
            FeedbackReport::default(),
            EvaluationResult::no_audio(),
            vec![
                IndividualResult {
                    video_index: 1,
                    video_name: "a.mp4".to_string(),
                    has_transcript: true,
                },
                IndividualResult {
                    video_index: 3,
                    video_name: "c.mp4".to_string(),
                    has_transcript: false,
                },
            ],
        );
        assert_eq!(response.videos_processed, 2);
        assert_eq!(response.total_videos, 4);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["processing_status"], "completed");
        assert!(json["analysis"].get("combined_transcript").is_some());
    }
}
