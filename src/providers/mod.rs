pub mod compatible;
pub mod http_client;
pub mod scrub;
pub mod traits;

pub use compatible::OpenAiCompatibleProvider;
pub use http_client::{build_http_client, build_provider_client};
pub use traits::{Provider, ProviderFuture};
