//! 单视频处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一次单视频请求，从校验到清理。
//!
//! ## 核心功能
//!
//! 1. **请求校验**：缺少文件、问题为空、题号为负时直接拒绝，不创建工作目录
//! 2. **写入视频**：分块写入工作目录，超过上限立即拒绝
//! 3. **流程调度**：委托 `VideoFlow` 执行分析、评估和反馈
//! 4. **资源清理**：无论结果如何都释放工作目录
//!
//! 分析器故障不会出现在这里（阶段适配层已兜底）；编排自身的意外故障
//! 会变成 `server_error` 降级响应，而不是错误。

use crate::error::{AppResult, StorageError, ValidationError};
use crate::infrastructure::{validate_video_file, StorageManager, WorkingArea};
use crate::models::{ProcessingStatus, SingleRequestInfo, SingleVideoResponse, UploadJob};
use crate::services::stage::panic_message;
use crate::workflow::{new_request_id, VideoCtx, VideoFlow};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// 处理单视频请求
///
/// # 参数
/// - `storage`: 临时存储管理器
/// - `flow`: 视频处理流程
/// - `question`: 面试问题
/// - `question_index`: 问题序号（不能为负）
/// - `upload`: 上传的视频
///
/// # 返回
/// 校验失败返回错误；其余情况总是返回完整结构的响应
pub async fn process_single(
    storage: &StorageManager,
    flow: &VideoFlow,
    question: &str,
    question_index: i64,
    upload: Option<UploadJob>,
) -> AppResult<SingleVideoResponse> {
    let mut upload = upload.ok_or(ValidationError::MissingFile)?;
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion.into());
    }
    if question_index < 0 {
        return Err(ValidationError::NegativeQuestionIndex {
            index: question_index,
        }
        .into());
    }

    let request_id = new_request_id();
    let info = SingleRequestInfo {
        question: question.to_string(),
        question_index,
        video_name: upload.display_name(|| format!("question_{}_video.mp4", question_index)),
        file_size: 0,
    };

    info!(
        "[请求 {}] 🎬 单视频分析: {} (问题 #{})",
        request_id, info.video_name, question_index
    );

    let area = storage.acquire();

    let outcome = AssertUnwindSafe(run_in_area(
        storage,
        flow,
        &area,
        &mut upload,
        info.clone(),
        &request_id,
    ))
    .catch_unwind()
    .await;

    area.release();

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let reason = format!("panicked: {}", panic_message(payload.as_ref()));
            error!("[请求 {}] ❌ 单视频处理异常: {}", request_id, reason);
            Ok(SingleVideoResponse::degraded(info, ProcessingStatus::ServerError, &reason))
        }
    }
}

async fn run_in_area(
    storage: &StorageManager,
    flow: &VideoFlow,
    area: &WorkingArea,
    upload: &mut UploadJob,
    mut info: SingleRequestInfo,
    request_id: &str,
) -> AppResult<SingleVideoResponse> {
    let file_name = format!("video_{}_{}.mp4", info.question_index, timestamp_tag());

    let file = match storage.materialize(area, upload, &file_name).await {
        Ok(file) => file,
        Err(StorageError::SizeLimitExceeded { limit }) => {
            return Err(ValidationError::file_too_large(limit).into());
        }
        Err(e) => {
            error!("[请求 {}] ❌ 保存视频失败: {}", request_id, e);
            return Ok(SingleVideoResponse::degraded(
                info,
                ProcessingStatus::ServerError,
                &e.to_string(),
            ));
        }
    };
    info.file_size = file.size;

    if !validate_video_file(&file.path).await {
        warn!("[请求 {}] ⚠️ 视频文件无效: {}", request_id, info.video_name);
        return Err(ValidationError::InvalidVideoFile.into());
    }

    let ctx = VideoCtx::new(request_id, 1, info.video_name.clone());
    let analysis = match flow.analyze(&file.path, &ctx).await {
        Ok(record) => record,
        Err(e) => {
            error!("{} ❌ 视频处理失败: {}", ctx, e);
            return Ok(SingleVideoResponse::degraded(
                info,
                ProcessingStatus::Failed,
                &e.to_string(),
            ));
        }
    };

    let evaluation = flow.evaluate(&info.question, &analysis.transcript).await;
    let feedback = flow.synthesize_feedback(&analysis.scores);

    info!(
        "{} ✅ 单视频分析完成: {} ({} 分), 综合得分 {}",
        ctx, evaluation.status, evaluation.score, feedback.overall_score
    );

    Ok(SingleVideoResponse::completed(info, analysis, evaluation, feedback))
}

/// 文件名中的时间戳
pub(crate) fn timestamp_tag() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
