/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`；`verbose` 为真时本 crate 输出 `debug`。
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,interview_assessment=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(max_workers: usize, max_batch_videos: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 面试视频评估服务启动");
    info!("📊 并发分析数: {}，单批上限: {}", max_workers, max_batch_videos);
    info!("{}", "=".repeat(60));
}

/// 记录批量任务开始信息
///
/// # 参数
/// - `request_id`: 请求 ID
/// - `valid`: 通过校验的视频数
/// - `total`: 提交的视频总数
/// - `workers`: 并发数
pub fn log_batch_start(request_id: &str, valid: usize, total: usize, workers: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 [{}] 开始批量分析: 有效 {}/{} 个视频", request_id, valid, total);
    info!("👷 [{}] 并发数: {}", request_id, workers);
    info!("{}", "=".repeat(60));
}

/// 记录批量任务完成信息
pub fn log_batch_complete(request_id: &str, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ [{}] 批量分析完成: 成功 {}/{}", request_id, success, total);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
