use std::future::Future;
use std::pin::Pin;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Text-completion backend used by the LLM document generator.
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai", "openrouter").
    fn name(&self) -> &str;

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> ProviderFuture<'a, String>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> ProviderFuture<'_, ()> {
        Box::pin(async move { Ok(()) })
    }
}
