//! services/api/src/adapters/question_llm.rs
//!
//! This module contains the adapter for generating extra interview questions.
//! It implements the `QuestionGenerationService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str =
    "You are an experienced HR specialist conducting an interview. Generate only valid JSON.";

const USER_PROMPT_TEMPLATE: &str = r#"Generate one professional interview question for a candidate.

Question kind: {kind}
Questions already asked: {asked_count}

The question must be:
- Professional and relevant
- Open-ended (requiring a detailed answer)
- Not a repetition of standard questions

Return the answer as JSON:
{"text": "question text", "kind": "{kind}", "keywords": ["key", "words", "for", "analysis"]}"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use chrono::Utc;
use interview_core::{
    domain::{Question, QuestionKind},
    ports::{PortError, PortResult, QuestionGenerationService},
};
use serde::Deserialize;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuestionGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQuestionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQuestionAdapter {
    /// Creates a new `OpenAiQuestionAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// The JSON shape the model is asked to produce.
#[derive(Deserialize)]
struct GeneratedQuestion {
    text: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

//=========================================================================================
// `QuestionGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuestionGenerationService for OpenAiQuestionAdapter {
    async fn generate_question(
        &self,
        kind: QuestionKind,
        asked_count: usize,
    ) -> PortResult<Question> {
        let prompt = USER_PROMPT_TEMPLATE
            .replace("{kind}", kind.as_str())
            .replace("{asked_count}", &asked_count.to_string());

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(300u32)
            .temperature(0.7)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Network(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Question generation returned no content.".to_string())
            })?;

        let generated: GeneratedQuestion = serde_json::from_str(content.trim()).map_err(|e| {
            PortError::Unexpected(format!("Question generation returned invalid JSON: {e}"))
        })?;

        let kind = match generated.kind.as_deref() {
            Some("technical") => QuestionKind::Technical,
            Some("soft") => QuestionKind::Soft,
            _ => kind,
        };

        Ok(Question {
            id: format!("ai_q_{}_{}", asked_count + 1, Utc::now().timestamp()),
            text: generated.text,
            kind,
            keywords: generated.keywords,
        })
    }
}
