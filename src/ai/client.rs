//! 言語モデルクライアント
//!
//! `LanguageModel` は外部モデルとの境界。プロンプトを渡すと自然文と Tool Call の
//! どちらか（または両方）が返ってくる、というところまでしか仮定しない。
//! 本番実装は OpenAI 互換の Chat Completions API（既定は Gemini の互換エンドポイント）。

use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info};

use super::stream::process_stream;
use super::types::{ModelReply, ModelRequest};
use crate::config::AiConfig;

/// 外部言語モデルとの境界
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 1 回の往復。失敗はすべて `Err` で返す。
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply>;
}

/// OpenAI 互換 API を使う本番クライアント
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiModel {
    /// 設定で指定された環境変数から API キーを読み取り、クライアントを初期化する。
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!("{} is not set. AI features are disabled.", config.api_key_env)
        })?;

        if api_key.trim().is_empty() || api_key == "your_api_key" {
            anyhow::bail!(
                "{} is not configured. Please set a valid API key in .env",
                config.api_key_env
            );
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.api_base);

        info!(model = %config.model, api_base = %config.api_base, "Language model client configured");

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        })
    }

    fn build_request(&self, request: ModelRequest) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(request.system),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.user),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            tools: Some(request.tools),
            stream: Some(true),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply> {
        let tools_count = request.tools.len();
        let request = self.build_request(request);

        debug!(
            model = %self.model,
            message_count = request.messages.len(),
            tools_count,
            stream = true,
            "Sending API request"
        );

        let result = process_stream(&self.client, request).await?;

        let text = if result.full_text.trim().is_empty() {
            None
        } else {
            Some(result.full_text)
        };

        Ok(ModelReply {
            text,
            tool_calls: result.tool_calls,
        })
    }
}
