//! 视频处理上下文
//!
//! 封装"我正在处理哪个请求的第几个视频"这一信息

use std::fmt::Display;

/// 视频处理上下文
#[derive(Debug, Clone)]
pub struct VideoCtx {
    /// 请求 ID（仅用于日志）
    pub request_id: String,

    /// 视频在提交列表中的位置（从1开始）；单视频模式下为 1
    pub video_index: usize,

    /// 客户端声明的文件名
    pub video_name: String,
}

impl VideoCtx {
    /// 创建新的视频上下文
    pub fn new(request_id: impl Into<String>, video_index: usize, video_name: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            video_index,
            video_name: video_name.into(),
        }
    }
}

impl Display for VideoCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[请求 {} 视频#{} {}]",
            self.request_id, self.video_index, self.video_name
        )
    }
}

/// 生成短请求 ID
pub fn new_request_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
