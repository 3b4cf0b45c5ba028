use flume::{Receiver, Sender};
use serde_json::{Value, json};
use std::thread;
use tokio::runtime::Runtime;
use tracing::warn;

/// Title returned without a network call when the content is too short.
pub const FALLBACK_TITLE: &str = "New Note";
/// Title substituted when the call or the response parsing fails.
pub const ERROR_TITLE: &str = "AI Error";

/// Content shorter than this (trimmed) is not worth a network round trip.
const MIN_CONTENT_CHARS: usize = 20;

const ENDPOINT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Result of one suggestion request, tagged with the request id that was
/// handed out when it started.
#[derive(Debug, Clone)]
pub enum TitleMessage {
    Suggested { id: u64, title: String },
    Failed { id: u64, error: String },
}

/// Client for the remote title-suggestion endpoint.
///
/// Each request runs on its own worker thread with a private tokio runtime
/// and reports back over the owned channel; the UI loop drains it once per
/// iteration. The channel lives on the instance rather than in a global so
/// tests get isolated clients.
#[derive(Debug)]
pub struct TitleSuggester {
    tx: Sender<TitleMessage>,
    rx: Receiver<TitleMessage>,
    endpoint_base: String,
}

impl TitleSuggester {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            endpoint_base: ENDPOINT_BASE.to_string(),
        }
    }

    /// True when `content` is below the minimum worth sending; callers use
    /// [`FALLBACK_TITLE`] directly in that case.
    pub fn content_too_short(content: &str) -> bool {
        content.trim().chars().count() < MIN_CONTENT_CHARS
    }

    /// Kicks off a suggestion request. Never blocks; the outcome arrives on
    /// the channel as a [`TitleMessage`] carrying `request_id`.
    pub fn request(&self, request_id: u64, content: String, api_key: String, model: String) {
        let sender = self.tx.clone();
        let url = format!("{}/{}:generateContent?key={}", self.endpoint_base, model, api_key);

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = sender.send(TitleMessage::Failed {
                        id: request_id,
                        error: format!("Runtime error: {}", e),
                    });
                    return;
                }
            };

            let result = rt.block_on(async {
                let client = reqwest::Client::new();
                let body = json!({
                    "contents": [
                        { "parts": [ { "text": build_prompt(&content) } ] }
                    ]
                });

                let response = client
                    .post(&url)
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?;

                response.json::<Value>().await
            });

            let message = match result {
                Ok(value) => match extract_title(&value) {
                    Some(title) => TitleMessage::Suggested {
                        id: request_id,
                        title,
                    },
                    None => TitleMessage::Failed {
                        id: request_id,
                        error: String::from("malformed response from title endpoint"),
                    },
                },
                Err(e) => TitleMessage::Failed {
                    id: request_id,
                    error: format!("Error: {}", e),
                },
            };

            if sender.send(message).is_err() {
                warn!("title suggestion finished after the client was dropped");
            }
        });
    }

    /// Drains one pending message without blocking.
    pub fn try_recv(&self) -> Option<TitleMessage> {
        self.rx.try_recv().ok()
    }

    /// Feeds a message into the channel as if a worker had produced it.
    #[cfg(test)]
    pub(crate) fn inject(&self, message: TitleMessage) {
        let _ = self.tx.send(message);
    }
}

impl Default for TitleSuggester {
    fn default() -> Self {
        Self::new()
    }
}

fn build_prompt(content: &str) -> String {
    format!(
        "Generate a concise, 5-word-or-less title for the following note content. \
         Do not include quotes.\n\nCONTENT: \"\"\"{}\"\"\"\n\nTITLE:",
        content
    )
}

/// Pulls the suggested title out of the response: first candidate, first
/// content part, trimmed, with every double-quote character stripped.
fn extract_title(value: &Value) -> Option<String> {
    value["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|text| text.trim().replace('"', ""))
}
