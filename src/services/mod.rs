pub mod aggregator;
pub mod feedback_service;
pub mod llm_service;
pub mod stage;
pub mod stages;

pub use aggregator::{aggregate, average_scores};
pub use feedback_service::synthesize_feedback;
pub use llm_service::LlmService;
pub use stage::{Stage, StageOutcome};
pub use stages::{
    run_behavior_stage, run_emotion_stage, run_evaluation_stage, run_feedback_stage,
    run_transcription_stage,
};
