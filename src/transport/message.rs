//! Wire message shapes for the transcription transport.
//!
//! Inbound messages are loosely-shaped JSON from the speech service;
//! parsing probes the fields it understands and ignores the rest, so a
//! service upgrade never breaks the session loop. Outbound messages are
//! strictly shaped.

use crate::audio::scheduler::EncodedChunk;
use crate::error::{Result, WordwatchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events extracted from one inbound server message, in the order they
/// must be handled.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Base64 PCM16 audio reply for playback.
    AudioReply { data: String },
    /// Cumulative transcription text with an optional speaker label.
    Transcription {
        text: String,
        speaker_label: Option<String>,
    },
    /// A tool invocation the session must acknowledge.
    ToolCall {
        id: String,
        name: String,
        word: Option<String>,
    },
    /// The service finished its current turn.
    TurnComplete,
}

/// Parses one inbound line into a server message.
///
/// # Errors
/// `MalformedPayload` when the line is not valid JSON.
pub fn parse_inbound_line(line: &str) -> Result<Value> {
    serde_json::from_str(line).map_err(|e| WordwatchError::MalformedPayload {
        message: format!("invalid inbound JSON line: {}", e),
    })
}

/// Extracts every understood event from a server message.
///
/// Unknown or malformed fields yield no events rather than errors.
pub fn parse_server_message(message: &Value) -> Vec<InboundEvent> {
    let mut events = Vec::new();

    let server_content = message.get("serverContent");

    if let Some(data) = server_content
        .and_then(|c| c.get("modelTurn"))
        .and_then(|t| t.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("inlineData"))
        .and_then(|d| d.get("data"))
        .and_then(|d| d.as_str())
        && !data.is_empty()
    {
        events.push(InboundEvent::AudioReply {
            data: data.to_string(),
        });
    }

    if let Some(transcription) = server_content.and_then(|c| c.get("inputTranscription"))
        && let Some(text) = transcription.get("text").and_then(|t| t.as_str())
        && !text.is_empty()
    {
        // The last segment's speaker label applies to the whole update
        let speaker_label = transcription
            .get("segments")
            .and_then(|s| s.as_array())
            .and_then(|s| s.last())
            .and_then(|s| s.get("speakerLabel"))
            .and_then(|l| l.as_str())
            .map(|l| l.to_string());

        events.push(InboundEvent::Transcription {
            text: text.to_string(),
            speaker_label,
        });
    }

    if let Some(calls) = message
        .get("toolCall")
        .and_then(|t| t.get("functionCalls"))
        .and_then(|c| c.as_array())
    {
        for call in calls {
            let id = call.get("id").and_then(|v| v.as_str()).unwrap_or_default();
            let name = call.get("name").and_then(|v| v.as_str()).unwrap_or_default();
            let word = call
                .get("args")
                .and_then(|a| a.get("word"))
                .and_then(|w| w.as_str())
                .map(|w| w.to_string());
            events.push(InboundEvent::ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                word,
            });
        }
    }

    if server_content
        .and_then(|c| c.get("turnComplete"))
        .and_then(|t| t.as_bool())
        .unwrap_or(false)
    {
        events.push(InboundEvent::TurnComplete);
    }

    events
}

/// Messages sent to the transcription transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutboundMessage {
    /// One encoded audio chunk of session input.
    #[serde(rename = "realtimeInput")]
    RealtimeAudio { media: EncodedChunk },
    /// Acknowledgement of a tool invocation.
    #[serde(rename = "toolResponse")]
    ToolResponse {
        #[serde(rename = "functionResponses")]
        function_responses: FunctionResponse,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub response: ToolResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub result: String,
}

impl OutboundMessage {
    /// Builds the acknowledgement for a processed tool call.
    pub fn tool_ack(id: &str, name: &str, word: &str) -> Self {
        OutboundMessage::ToolResponse {
            function_responses: FunctionResponse {
                id: id.to_string(),
                name: name.to_string(),
                response: ToolResult {
                    result: format!("Processed word variant: {}", word),
                },
            },
        }
    }
}
