pub mod video_ctx;
pub mod video_flow;

pub use video_ctx::{new_request_id, VideoCtx};
pub use video_flow::VideoFlow;
