//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter behind the chat proxy endpoint.
//! It implements the `ChatService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use interview_core::{
    domain::{ChatMessage, ChatRole},
    ports::{ChatService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that relays chat messages to an OpenAI-compatible LLM and
/// returns the assistant's reply. Stateless: no conversation is stored.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, default_model: String) -> Self {
        Self {
            client,
            default_model,
        }
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let msg = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()?
            .into(),
    };
    Ok(msg)
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for OpenAiChatAdapter {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> PortResult<ChatMessage> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model.unwrap_or(&self.default_model))
            .messages(request_messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Network(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(ChatMessage {
                    role: ChatRole::Assistant,
                    content,
                })
            } else {
                Err(PortError::Unexpected(
                    "Chat completion response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Chat completion returned no choices in its response.".to_string(),
            ))
        }
    }
}
