//! # Interview Assessment
//!
//! 面试回答视频的分析与评估
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（临时存储），只暴露能力
//! - `StorageManager` - 每个请求一个工作目录，分块写入，请求结束时删除
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个视频或单组得分
//! - `stages` - 五个阶段适配器，任何故障都变成兜底值
//! - `aggregator` - 多视频结果汇总
//! - `feedback_service` - 按阈值生成反馈
//! - `LlmService` - LLM 答案评估能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个视频"的完整处理流程
//! - `VideoCtx` - 上下文封装（request_id + video_index）
//! - `VideoFlow` - 流程编排（情绪 ∥ 行为 ∥ 转写 → 评估 → 反馈）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/single_processor` - 单视频请求
//! - `orchestrator/batch_processor` - 批量请求，管理并发
//! - `orchestrator/app` - 应用入口
//!
//! 外部分析器（情绪、行为信号、转写、答案评估）通过 `clients/` 中的 trait 接入。
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::Analyzers;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{StorageManager, WorkingArea};
pub use models::{AnalysisRecord, BatchResponse, SingleVideoResponse, UploadJob};
pub use orchestrator::{App, RunOutput};
pub use workflow::{VideoCtx, VideoFlow};
