//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责请求级的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 持有存储管理器和视频处理流程
//! - 按任务清单选择运行模式，写出结果
//!
//! ### `single_processor` - 单视频处理器
//! - 校验请求、写入视频
//! - 委托 VideoFlow 完成分析、评估和反馈
//! - 释放工作目录
//!
//! ### `batch_processor` - 批量视频处理器
//! - 写入并校验全部视频
//! - 控制并发数量（Semaphore + JoinSet）
//! - 汇总结果，评估和反馈各做一次
//!
//! ## 层次关系
//!
//! ```text
//! app (处理一份任务清单)
//!     ↓
//! single_processor / batch_processor (处理一次请求)
//!     ↓
//! workflow::VideoFlow (处理单个视频)
//!     ↓
//! services (能力层：阶段适配 / 汇总 / 反馈 / LLM)
//!     ↓
//! infrastructure (基础设施：StorageManager)
//! ```

pub mod app;
pub mod batch_processor;
pub mod single_processor;

// 重新导出主要类型
pub use app::{App, RunOutput};
pub use batch_processor::{process_batch, BatchLimits};
pub use single_processor::process_single;
