//! 批量视频处理器 - 编排层
//!
//! ## 职责
//!
//! 一次请求分析多个视频，汇总成一份结果。
//!
//! ## 核心功能
//!
//! 1. **请求校验**：视频数量必须在 1 到上限之间
//! 2. **写入与校验**：先写入全部视频，无效文件记录警告后跳过
//! 3. **并发控制**：使用 Semaphore 限制同时分析的视频数
//! 4. **结果收集**：按完成顺序收集，写回各自的提交位置
//! 5. **汇总**：平均得分、拼接转写，然后评估和反馈各做一次
//! 6. **资源清理**：无论结果如何（包括编排自身 panic）都释放工作目录

use crate::error::{AppError, AppResult, PipelineError, StorageError, ValidationError};
use crate::infrastructure::{validate_video_file, StorageManager, WorkingArea};
use crate::models::{AnalysisRecord, BatchResponse, IndividualResult, UploadJob};
use crate::orchestrator::single_processor::timestamp_tag;
use crate::services::aggregate;
use crate::services::stage::panic_message;
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{new_request_id, VideoCtx, VideoFlow};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// 批量处理参数
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// 同时分析的视频数
    pub max_workers: usize,
    /// 单次请求的视频上限
    pub max_videos: usize,
}

/// 通过校验、等待分析的视频
#[derive(Debug, Clone)]
struct PendingVideo {
    video_index: usize,
    video_name: String,
    path: PathBuf,
}

/// 处理批量请求
///
/// 部分视频失败时仍返回正常结果；只有全部视频都没有产出分析结果时返回错误。
pub async fn process_batch(
    storage: &StorageManager,
    flow: &VideoFlow,
    limits: BatchLimits,
    question: &str,
    uploads: Vec<UploadJob>,
) -> AppResult<BatchResponse> {
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion.into());
    }
    if uploads.is_empty() {
        return Err(ValidationError::EmptyBatch.into());
    }
    if uploads.len() > limits.max_videos {
        return Err(ValidationError::TooManyVideos {
            count: uploads.len(),
            max: limits.max_videos,
        }
        .into());
    }

    let request_id = new_request_id();
    let area = storage.acquire();

    let result = AssertUnwindSafe(run_in_area(
        storage,
        flow,
        limits,
        &area,
        question,
        uploads,
        &request_id,
    ))
    .catch_unwind()
    .await
    .unwrap_or_else(|payload| {
        let reason = format!("panicked: {}", panic_message(payload.as_ref()));
        Err(PipelineError::WorkerPool(reason).into())
    });

    area.release();

    if let Err(e) = &result {
        error!("[请求 {}] ❌ 批量处理失败: {}", request_id, e);
    }
    result
}

async fn run_in_area(
    storage: &StorageManager,
    flow: &VideoFlow,
    limits: BatchLimits,
    area: &WorkingArea,
    question: &str,
    uploads: Vec<UploadJob>,
    request_id: &str,
) -> AppResult<BatchResponse> {
    let total_videos = uploads.len();
    let pending = materialize_all(storage, area, uploads, request_id).await?;

    if pending.is_empty() {
        return Err(ValidationError::NoValidVideos.into());
    }

    log_batch_start(request_id, pending.len(), total_videos, limits.max_workers);

    let slots = run_worker_pool(flow, request_id, &pending, limits.max_workers).await?;

    let mut records = Vec::new();
    let mut individual_results = Vec::new();
    for (video, slot) in pending.iter().zip(slots) {
        if let Some(record) = slot {
            individual_results.push(IndividualResult {
                video_index: video.video_index,
                video_name: video.video_name.clone(),
                has_transcript: record.has_transcript(),
            });
            records.push(record);
        }
    }

    log_batch_complete(request_id, records.len(), pending.len());

    if records.is_empty() {
        return Err(PipelineError::AllVideosFailed {
            total: total_videos,
        }
        .into());
    }

    let aggregated = aggregate(&records);
    let evaluation = flow.evaluate(question, &aggregated.combined_transcript).await;
    let feedback = flow.synthesize_feedback(&aggregated.scores);

    info!(
        "[请求 {}] ✅ 批量分析完成: {}/{} 个视频, 评估 {} ({} 分)",
        request_id,
        records.len(),
        total_videos,
        evaluation.status,
        evaluation.score
    );

    Ok(BatchResponse::completed(
        question.to_string(),
        total_videos,
        aggregated,
        feedback,
        evaluation,
        individual_results,
    ))
}

/// 写入全部视频并过滤无效文件
async fn materialize_all(
    storage: &StorageManager,
    area: &WorkingArea,
    uploads: Vec<UploadJob>,
    request_id: &str,
) -> AppResult<Vec<PendingVideo>> {
    let stamp = timestamp_tag();
    let mut pending = Vec::new();

    for (index, mut upload) in uploads.into_iter().enumerate() {
        let video_index = index + 1;
        let video_name = upload.display_name(|| format!("interview_video_{}.mp4", video_index));
        let file_name = format!("batch_video_{}_{}.mp4", video_index, stamp);

        let file = storage
            .materialize(area, &mut upload, &file_name)
            .await
            .map_err(|e| match e {
                StorageError::SizeLimitExceeded { limit } => {
                    AppError::from(ValidationError::file_too_large(limit))
                }
                other => AppError::from(other),
            })?;

        if validate_video_file(&file.path).await {
            pending.push(PendingVideo {
                video_index,
                video_name,
                path: file.path,
            });
        } else {
            warn!(
                "[请求 {}] ⚠️ 跳过无效视频 #{}: {}",
                request_id, video_index, video_name
            );
        }
    }

    Ok(pending)
}

/// 有界并发分析
///
/// 每个任务只写自己的结果位置；返回值与 `videos` 一一对应，失败的位置为 `None`。
async fn run_worker_pool(
    flow: &VideoFlow,
    request_id: &str,
    videos: &[PendingVideo],
    max_workers: usize,
) -> AppResult<Vec<Option<AnalysisRecord>>> {
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();

    for (slot, video) in videos.iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let flow = flow.clone();
        let path = video.path.clone();
        let ctx = VideoCtx::new(request_id, video.video_index, video.video_name.clone());

        tasks.spawn(async move {
            let _permit = permit;
            let result = flow.analyze(&path, &ctx).await;
            (slot, ctx, result)
        });
    }

    let mut slots: Vec<Option<AnalysisRecord>> = vec![None; videos.len()];

    // 按完成顺序收集
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, _ctx, Ok(record))) => slots[slot] = Some(record),
            Ok((_, ctx, Err(e))) => warn!("{} ⚠️ 视频分析失败: {}", ctx, e),
            Err(e) => error!("[请求 {}] 分析任务执行失败: {}", request_id, e),
        }
    }

    Ok(slots)
}
