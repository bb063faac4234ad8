pub mod analyzer;
pub mod inference_client;

pub use analyzer::{
    AnswerEvaluator, Analyzers, BehaviorDetector, EmotionClassifier, QuestionGenerator, Transcriber,
};
pub use inference_client::InferenceClient;
