use crate::config::resolve_api_key;
use crate::direct::DirectMultimodalProvider;
use crate::error::BananaGenError;
use crate::polling::RestPollingProvider;
use crate::provider::GenerationProvider;
use crate::types::{GeneratedAsset, GenerationRequest};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.kie.ai/api/v1/jobs";
pub const DEFAULT_DIRECT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "nano-banana-pro";
pub const DEFAULT_DIRECT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which wire contract the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// Create a task, then poll its record until terminal.
    #[default]
    RestPolling,
    /// One synchronous multimodal exchange; the asset comes back inline.
    DirectMultimodal,
}

#[derive(Debug, Clone, Default)]
pub struct BananaGenOptions {
    /// Bearer credential. When `None`, the environment sources in
    /// [`crate::config::API_KEY_ENV_VARS`] are consulted in order.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub provider: ProviderKind,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    pub poll_interval: Option<Duration>,
    pub max_poll_attempts: Option<u32>,
    pub create_path: Option<String>,
    pub record_path: Option<String>,
}

/// Facade over the provider adapters.
///
/// Construction resolves and validates configuration; no network traffic
/// happens before [`BananaGen::generate`] is called.
pub struct BananaGen {
    provider: Box<dyn GenerationProvider>,
}

impl BananaGen {
    pub fn new(options: BananaGenOptions) -> Result<Self, BananaGenError> {
        let api_key = options
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(resolve_api_key)
            .ok_or(BananaGenError::MissingApiKey)?;

        let timeout = Duration::from_secs(options.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let provider: Box<dyn GenerationProvider> = match options.provider {
            ProviderKind::RestPolling => {
                let base_url = options
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                let model = options.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
                let mut provider = RestPollingProvider::new(http, base_url, api_key, model);
                if let Some(interval) = options.poll_interval {
                    provider.poll_interval = interval;
                }
                if let Some(max_attempts) = options.max_poll_attempts {
                    provider.max_attempts = max_attempts;
                }
                if let Some(create_path) = options.create_path {
                    provider.create_path = create_path;
                }
                if let Some(record_path) = options.record_path {
                    provider.record_path = record_path;
                }
                Box::new(provider)
            }
            ProviderKind::DirectMultimodal => {
                let base_url = options
                    .base_url
                    .unwrap_or_else(|| DEFAULT_DIRECT_BASE_URL.to_string());
                let model = options
                    .model
                    .unwrap_or_else(|| DEFAULT_DIRECT_MODEL.to_string());
                Box::new(DirectMultimodalProvider::new(http, base_url, api_key, model))
            }
        };

        Ok(Self { provider })
    }

    /// Submit one request and drive it to a completed asset or a definitive
    /// failure.
    ///
    /// Dropping the returned future abandons the submission at its next
    /// suspension point: no further requests are issued and nothing is
    /// recorded.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedAsset, BananaGenError> {
        self.provider.generate(request).await
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }
}
