//! 基础设施层
//!
//! 持有稀缺资源（临时存储），只暴露能力

pub mod storage;

pub use storage::{validate_video_file, MaterializedFile, StorageManager, WorkingArea};
