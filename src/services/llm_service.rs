//! LLM 服务 - 业务能力层
//!
//! 负责"答案评估"和"面试问题生成"两项能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Together, Azure, Gemini 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{AnswerEvaluator, QuestionGenerator};
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::{EvaluationResult, EvaluationStatus};
use crate::utils::logging::truncate_text;

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an interview evaluator. Analyze the provided answer against the given question and provide evaluation in JSON format.

Return your response in this exact JSON structure:
{
    "status": "Correct" | "Partially Correct" | "Incorrect",
    "score": 0-100,
    "feedback": "Detailed feedback in English only",
    "reasoning": "Why you gave this evaluation",
    "suggestions": "Suggestions for improvement (if any)"
}

Consider:
- Content accuracy and relevance
- Completeness of the answer
- Communication clarity
- Both English and Urdu responses from candidates are acceptable

Be concise but thorough in your evaluation."#;

/// 文本回复中保留的反馈长度
const TEXT_FEEDBACK_LIMIT: usize = 500;

/// 每次生成的问题数
const QUESTION_COUNT: usize = 5;

/// 采样参数
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 评估要求稳定输出
const EVALUATION_SAMPLING: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 500,
};

const QUESTION_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 300,
};

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 评估候选人的回答
/// - 根据简历和职位描述生成面试问题
/// - 主模型失败时改用备用模型重试一次
/// - 解析 JSON 回复，解析失败时按文本推断
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    fallback_model: Option<String>,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            fallback_model: config.llm_fallback_model.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `sampling`: 温度和最大 token 数
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        sampling: Sampling,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(sampling.temperature)
            .max_tokens(sampling.max_tokens)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    /// 评估回答
    ///
    /// 主模型调用失败（含超时）时，如果配置了备用模型则重试一次。
    pub async fn evaluate_answer(&self, question: &str, answer: &str) -> Result<EvaluationResult, AnalyzerError> {
        info!("📝 使用模型 {} 评估回答", self.model_name);
        info!("📋 问题: {}", truncate_text(question, 50));

        let user_message = format!("Question: {}\nAnswer: {}", question, answer);

        let response = self
            .call_with_fallback(&user_message, Some(EVALUATION_SYSTEM_PROMPT), EVALUATION_SAMPLING)
            .await?;

        let result = parse_evaluation_response(&response);
        info!("✓ 答案评估完成: {}", result.status);
        Ok(result)
    }

    /// 根据简历和职位描述生成面试问题
    ///
    /// 前三个为技术问题，后两个为行为问题；回复中不含问号的行会被丢弃。
    pub async fn generate_questions(&self, resume: &str, jd: &str) -> Result<Vec<String>, AnalyzerError> {
        info!("🧠 使用模型 {} 生成面试问题", self.model_name);

        let prompt = question_prompt(resume, jd);
        let response = self.call_with_fallback(&prompt, None, QUESTION_SAMPLING).await?;

        let questions = parse_question_lines(&response);
        if questions.is_empty() {
            warn!("⚠️ LLM 回复中没有问题: {}", truncate_text(&response, 100));
            return Err(AnalyzerError::InvalidResponse("no questions in response".to_string()));
        }

        info!("✓ 生成 {} 个面试问题", questions.len());
        Ok(questions)
    }

    async fn call_with_fallback(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        sampling: Sampling,
    ) -> Result<String, AnalyzerError> {
        match self
            .call_with_timeout(&self.model_name, user_message, system_message, sampling)
            .await
        {
            Ok(response) => Ok(response),
            Err(primary_err) => match &self.fallback_model {
                Some(fallback) if fallback != &self.model_name => {
                    warn!("🔄 主模型失败 ({})，改用备用模型 {}", primary_err, fallback);
                    self.call_with_timeout(fallback, user_message, system_message, sampling)
                        .await
                }
                _ => Err(primary_err),
            },
        }
    }

    async fn call_with_timeout(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        sampling: Sampling,
    ) -> Result<String, AnalyzerError> {
        match tokio::time::timeout(
            self.timeout,
            self.send_to_llm(model, user_message, system_message, sampling),
        )
        .await
        {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(AnalyzerError::RequestFailed(e.to_string())),
            Err(_) => {
                warn!("⏰ LLM API 超时 ({} 秒)", self.timeout.as_secs());
                Err(AnalyzerError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

#[async_trait]
impl AnswerEvaluator for LlmService {
    async fn evaluate(&self, question: &str, transcript: &str) -> Result<EvaluationResult, AnalyzerError> {
        self.evaluate_answer(question, transcript).await
    }
}

#[async_trait]
impl QuestionGenerator for LlmService {
    async fn generate(&self, resume: &str, jd: &str) -> Result<Vec<String>, AnalyzerError> {
        self.generate_questions(resume, jd).await
    }
}

fn question_prompt(resume: &str, jd: &str) -> String {
    format!(
        "You are an AI recruiter. Given the following resume and job description, generate exactly {count} interview questions:\n\
         - First 3 should be technical questions.\n\
         - Last 2 should be behavioral questions.\n\
         Return **only** the list of questions, numbered from 1 to {count}, with no section headers or extra text.\n\n\
         Resume:\n{resume}\n\n\
         Job Description:\n{jd}",
        count = QUESTION_COUNT,
        resume = resume,
        jd = jd,
    )
}

/// 从回复中提取问题
///
/// 保留含问号的非空行，去掉首尾空白，顺序不变。
pub fn parse_question_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains('?'))
        .map(str::to_string)
        .collect()
}

/// 解析评估回复
///
/// 优先读取回复中的 JSON 对象（允许包在 ```json 代码块里）；
/// 没有可用的 JSON 时按文本关键字推断状态。
pub fn parse_evaluation_response(response: &str) -> EvaluationResult {
    if let Some(result) = extract_json_object(response).and_then(|json| result_from_json(&json)) {
        return result;
    }

    warn!("⚠️ LLM 回复不是有效的 JSON，按文本解析");
    result_from_text(response)
}

fn extract_json_object(response: &str) -> Option<JsonValue> {
    static JSON_BLOCK: OnceLock<Option<Regex>> = OnceLock::new();

    if let Ok(json) = serde_json::from_str::<JsonValue>(response.trim()) {
        return Some(json);
    }

    let pattern = JSON_BLOCK
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()?;
    let block = pattern.find(response)?;
    serde_json::from_str(block.as_str()).ok()
}

fn result_from_json(json: &JsonValue) -> Option<EvaluationResult> {
    let object = json.as_object()?;
    let status = object
        .get("status")
        .and_then(JsonValue::as_str)
        .and_then(EvaluationStatus::parse_loose)?;

    let score = match object.get("score") {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    };

    let text_field = |key: &str| -> String {
        match object.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(JsonValue::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    };

    Some(EvaluationResult {
        status,
        score: score.clamp(0.0, 100.0).round() as u8,
        feedback: text_field("feedback"),
        reasoning: text_field("reasoning"),
        suggestions: text_field("suggestions"),
    })
}

fn result_from_text(response: &str) -> EvaluationResult {
    let lower = response.to_lowercase();
    let (status, score) = if lower.contains("incorrect") {
        (EvaluationStatus::Incorrect, 30)
    } else if lower.contains("correct") {
        (EvaluationStatus::Correct, 80)
    } else {
        (EvaluationStatus::PartiallyCorrect, 60)
    };

    EvaluationResult {
        status,
        score,
        feedback: response.chars().take(TEXT_FEEDBACK_LIMIT).collect(),
        reasoning: "Extracted from text response due to format issue".to_string(),
        suggestions: "Please provide more specific answers for better evaluation".to_string(),
    }
}
