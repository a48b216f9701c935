use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientErrorKind};
use crate::form::FormData;
use crate::generation::{
    GenerateRequest, GenerationResult, NarrativeItem, NarrativeType, RegenerateLetterRequest,
    RegenerateLetterResponse, RegenerateNarrativeRequest, RegenerateNarrativeResponse,
    ResponseLetter, ToolSelection,
};
use crate::providers::build_http_client;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// The three generation calls the wizard makes.
pub trait GenerationApi: Send + Sync {
    fn generate_documents<'a>(
        &'a self,
        selection: ToolSelection,
        form: &'a FormData,
    ) -> ApiFuture<'a, GenerationResult>;

    fn regenerate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        form: &'a FormData,
    ) -> ApiFuture<'a, NarrativeItem>;

    fn regenerate_letter<'a>(&'a self, form: &'a FormData) -> ApiFuture<'a, ResponseLetter>;
}

/// HTTP client for the gateway's generation endpoints.
///
/// Every failure is classified where it is observed: the transport reports
/// timeouts and connection failures, the status line reports server faults,
/// and whatever is left is `Unknown`.
pub struct GenerationClient {
    base_url: String,
    client: Client,
}

impl GenerationClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        Self::with_client(base_url, build_http_client(timeout))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            &config.api_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(path, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(path, status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(path, &e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::new(
                ClientErrorKind::Unknown,
                format!("{path}: undecodable response: {e}"),
            )
        })
    }
}

fn transport_error(path: &str, error: &reqwest::Error) -> ClientError {
    let kind = if error.is_timeout() {
        ClientErrorKind::Timeout
    } else if error.is_builder() || error.is_decode() {
        ClientErrorKind::Unknown
    } else {
        ClientErrorKind::Network
    };
    tracing::warn!(path, %kind, "generation request failed");
    ClientError::new(kind, format!("{path}: {error}"))
}

fn status_error(path: &str, status: StatusCode, body: &str) -> ClientError {
    let kind = if matches!(status, StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT) {
        ClientErrorKind::Timeout
    } else if status.is_server_error() {
        ClientErrorKind::Server
    } else {
        ClientErrorKind::Unknown
    };
    let detail = failure_detail(body);
    tracing::warn!(path, status = status.as_u16(), %kind, "generation request rejected");
    ClientError::new(kind, format!("{path}: HTTP {status}")).with_detail(detail)
}

/// `errors[0].detail` from a generation result, or `error` from a
/// regeneration failure.
fn failure_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/errors/0/detail")
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

impl GenerationApi for GenerationClient {
    fn generate_documents<'a>(
        &'a self,
        selection: ToolSelection,
        form: &'a FormData,
    ) -> ApiFuture<'a, GenerationResult> {
        Box::pin(async move {
            let request = GenerateRequest {
                selection,
                form_data: form.clone(),
            };
            self.post("/api/generate-documents", &request).await
        })
    }

    fn regenerate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        form: &'a FormData,
    ) -> ApiFuture<'a, NarrativeItem> {
        Box::pin(async move {
            let request = RegenerateNarrativeRequest {
                narrative_type,
                form_data: form.clone(),
            };
            let response: RegenerateNarrativeResponse =
                self.post("/api/regenerate-narrative", &request).await?;
            Ok(response.narrative)
        })
    }

    fn regenerate_letter<'a>(&'a self, form: &'a FormData) -> ApiFuture<'a, ResponseLetter> {
        Box::pin(async move {
            let request = RegenerateLetterRequest {
                form_data: form.clone(),
            };
            let response: RegenerateLetterResponse =
                self.post("/api/regenerate-letter", &request).await?;
            Ok(response.letter)
        })
    }
}
