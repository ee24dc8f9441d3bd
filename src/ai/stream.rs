//! AI ストリーミングレスポンス処理
//!
//! OpenAI 互換 API からのストリーミングレスポンスを読み切り、
//! テキスト応答と Tool Call を分離して返す。

use anyhow::Result;
use async_openai::{config::OpenAIConfig, types::CreateChatCompletionRequest, Client};
use futures_util::StreamExt;
use tracing::{debug, warn};

use super::tools::call::accumulate_tool_call;
use super::types::RawToolCall;

/// ストリーム処理の結果
pub struct StreamResult {
    /// ストリーミングで受信したテキスト全文
    pub full_text: String,
    /// 蓄積された Tool Call（index 順）
    pub tool_calls: Vec<RawToolCall>,
}

/// ストリーミングレスポンスを処理し、テキストと Tool Call を分離して返す。
/// 途中でストリームエラーが起きた場合は、受信済みの内容を捨ててエラーを返す。
pub async fn process_stream(
    client: &Client<OpenAIConfig>,
    request: CreateChatCompletionRequest,
) -> Result<StreamResult> {
    let mut stream = client
        .chat()
        .create_stream(request)
        .await
        .map_err(|e| anyhow::anyhow!(e).context("Failed to create chat stream"))?;

    debug!("Stream created successfully, starting to process chunks");

    let mut full_text = String::new();
    let mut tool_calls: Vec<RawToolCall> = Vec::new();
    let mut chunk_count: u32 = 0;

    while let Some(result) = stream.next().await {
        chunk_count += 1;
        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    error = %e,
                    chunks_received = chunk_count,
                    text_so_far_len = full_text.len(),
                    "Stream error occurred"
                );
                anyhow::bail!("Stream error: {e}");
            }
        };

        for choice in &response.choices {
            let delta = &choice.delta;

            if let Some(ref content) = delta.content {
                debug!(
                    chunk = chunk_count,
                    content_length = content.len(),
                    "Received text chunk"
                );
                full_text.push_str(content);
            }

            if let Some(ref tc_chunks) = delta.tool_calls {
                debug!(
                    chunk = chunk_count,
                    tool_call_chunks = tc_chunks.len(),
                    "Received tool call chunk"
                );
                for chunk in tc_chunks {
                    if let Err(e) = accumulate_tool_call(&mut tool_calls, chunk) {
                        warn!(error = %e, chunk = chunk_count, "Discarding response with invalid tool call");
                        return Err(e);
                    }
                }
            }
        }
    }

    debug!(
        total_chunks = chunk_count,
        full_text_length = full_text.len(),
        tool_calls_count = tool_calls.len(),
        "Stream processing completed"
    );

    Ok(StreamResult {
        full_text,
        tool_calls,
    })
}
