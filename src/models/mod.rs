pub mod analysis;
pub mod evaluation;
pub mod feedback;
pub mod loaders;
pub mod manifest;
pub mod response;
pub mod upload;

pub use analysis::{AggregatedRecord, AnalysisRecord, BehavioralScores};
pub use evaluation::{EvaluationResult, EvaluationStatus};
pub use feedback::FeedbackReport;
pub use loaders::load_manifest;
pub use manifest::{InterviewManifest, RunMode};
pub use response::{
    BatchResponse, ErrorResponse, FeedbackSummary, GeneratedQuestions, IndividualResult, ProcessingStatus,
    SingleRequestInfo, SingleVideoResponse,
};
pub use upload::UploadJob;
