//! Text rewriting through an OpenAI-compatible chat completions endpoint.
//!
//! The [`Rewriter`] never fails from the caller's point of view. Network
//! errors, timeouts, non-success statuses and malformed replies are logged
//! and the input comes back unchanged. When no API key is configured the
//! rewriter makes no requests at all and echoes its input.
//!
//! ```rust,no_run
//! use simpletask::api::openai::Rewriter;
//! use simpletask::libs::config::OpenAiConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let rewriter = Rewriter::new(&OpenAiConfig::default())?;
//! let text = rewriter.rewrite_message("pls fix asap").await;
//! # Ok(())
//! # }
//! ```

use crate::libs::config::OpenAiConfig;
use crate::libs::messages::Message;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const COMPLETIONS_PATH: &str = "chat/completions";

const TASK_PROMPT: &str = "You are a helpful assistant. Rewrite the title and the description of the following task \
in a more professional, clear, and concise way. Preserve the meaning. Return the result as a JSON object with the \
keys \"title\" and \"description\".";

const MESSAGE_PROMPT: &str = "You are a helpful assistant who rewrites messages so they become more professional \
and clear. Preserve the meaning but improve the tone and grammar. Return ONLY the rewritten text.";

/// Text to rewrite, and the shape of the rewritten result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    Task { title: String, description: String },
    Message(String),
}

impl Rewrite {
    fn kind(&self) -> &'static str {
        match self {
            Rewrite::Task { .. } => "task",
            Rewrite::Message(_) => "message",
        }
    }
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize, Debug)]
struct ChatReply {
    content: Option<String>,
}

/// Keys are optional so a partial reply still rewrites what it can.
#[derive(Deserialize, Debug)]
struct RewrittenTask {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Rewriter {
    client: Client,
    config: OpenAiConfig,
}

impl Rewriter {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// True when an API key is configured.
    pub fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Rewrites `input`, returning it unchanged on any failure.
    pub async fn rewrite(&self, input: Rewrite) -> Rewrite {
        if !self.is_available() {
            return input;
        }

        let kind = input.kind();
        match self.try_rewrite(&input).await {
            Ok(rewritten) => {
                tracing::debug!("{}", Message::RewriteApplied(kind.to_string()));
                rewritten
            }
            Err(e) => {
                tracing::warn!("{}", Message::RewriteFailed(kind.to_string(), format!("{:#}", e)));
                input
            }
        }
    }

    pub async fn rewrite_task(&self, title: &str, description: &str) -> (String, String) {
        let input = Rewrite::Task {
            title: title.to_string(),
            description: description.to_string(),
        };
        match self.rewrite(input).await {
            Rewrite::Task { title, description } => (title, description),
            Rewrite::Message(_) => (title.to_string(), description.to_string()),
        }
    }

    pub async fn rewrite_message(&self, content: &str) -> String {
        match self.rewrite(Rewrite::Message(content.to_string())).await {
            Rewrite::Message(content) => content,
            Rewrite::Task { .. } => content.to_string(),
        }
    }

    async fn try_rewrite(&self, input: &Rewrite) -> Result<Rewrite> {
        match input {
            Rewrite::Task { title, description } => {
                let prompt = format!("Title: {}\nDescription: {}", title, description);
                let reply = self.complete(TASK_PROMPT, &prompt, true).await?;
                let parsed: RewrittenTask = serde_json::from_str(&reply).context("reply is not a JSON object")?;

                Ok(Rewrite::Task {
                    title: parsed.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| title.clone()),
                    description: parsed.description.unwrap_or_else(|| description.clone()),
                })
            }
            Rewrite::Message(content) => {
                let reply = self.complete(MESSAGE_PROMPT, content, false).await?;
                let reply = reply.trim();
                if reply.is_empty() {
                    anyhow::bail!("empty reply");
                }

                Ok(Rewrite::Message(reply.to_string()))
            }
        }
    }

    async fn complete(&self, system: &str, user: &str, json_object: bool) -> Result<String> {
        let api_key = self.config.api_key.as_deref().context("no API key configured")?;
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), COMPLETIONS_PATH);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            response_format: json_object.then_some(ResponseFormat { kind: "json_object" }),
        };

        let res = self.client.post(url).bearer_auth(api_key).json(&request).send().await?;
        if !res.status().is_success() {
            anyhow::bail!("completion request failed with status {}", res.status());
        }

        let body = res.json::<ChatResponse>().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("reply has no content")
    }
}
