//! Generic OpenAI-compatible provider.
//! Most hosted LLM APIs accept the `/chat/completions` request shape, so one
//! implementation covers OpenAI, OpenRouter, Groq, local gateways and friends.

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_client::build_provider_client;
use super::scrub::api_error;
use super::traits::{Provider, ProviderFuture};

pub struct OpenAiCompatibleProvider {
    pub(crate) name: String,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    /// Pre-computed `Authorization` header value.
    cached_auth: Option<String>,
    /// Pre-computed chat completions URL.
    cached_chat_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self::with_client(name, base_url, api_key, build_provider_client())
    }

    pub fn with_client(
        name: &str,
        base_url: &str,
        api_key: Option<&str>,
        client: Client,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cached_chat_url = if base_url.contains("chat/completions") {
            base_url.clone()
        } else {
            format!("{base_url}/chat/completions")
        };

        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
        let cached_auth = api_key.map(|k| format!("Bearer {k}"));

        Self {
            name: name.to_string(),
            base_url,
            api_key: api_key.map(ToString::to_string),
            cached_auth,
            cached_chat_url,
            client,
        }
    }

    fn apply_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(value) = &self.cached_auth {
            req.header(reqwest::header::AUTHORIZATION, value)
        } else {
            req
        }
    }

    async fn call_chat_completions(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let response = self
            .apply_auth_header(self.client.post(&self.cached_chat_url).json(request))
            .send()
            .await
            .with_context(|| format!("{} chat completions request failed", self.name))?;

        if !response.status().is_success() {
            return Err(api_error(&self.name, response).await);
        }

        response
            .json()
            .await
            .with_context(|| format!("{} chat completions JSON decode failed", self.name))
    }

    async fn chat_with_system_internal(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        if self.api_key.is_none() {
            anyhow::bail!(
                "{} API key not set. Set generation.api_key in config.toml or REENTRY_API_KEY.",
                self.name
            );
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(Message {
                role: "system",
                content: sys.to_string(),
            });
        }
        messages.push(Message {
            role: "user",
            content: message.to_string(),
        });

        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
        };

        let chat_response = self.call_chat_completions(&request).await?;
        if let Some(usage) = &chat_response.usage {
            tracing::debug!(
                provider = %self.name,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        extract_chat_text(&chat_response, &self.name)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_chat_text(response: &ChatResponse, provider_name: &str) -> anyhow::Result<String> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("No response from {provider_name}"))
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ProviderFuture<'a, String> {
        Box::pin(self.chat_with_system_internal(system_prompt, message, model, temperature))
    }

    fn warmup(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move {
            // Any response means the pool has a live connection.
            let _ = self.client.get(&self.base_url).send().await;
            Ok(())
        })
    }
}
