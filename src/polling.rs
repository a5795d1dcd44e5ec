//! The create-then-poll wire contract.
//!
//! One authenticated POST creates a provider-side task; the task record is
//! then polled at a fixed interval until it reaches a terminal state or the
//! attempt budget runs out. Task creation is never retried. During polling,
//! transport failures and server-side errors are transient: they consume an
//! attempt and wait the same interval. Credential rejections abort at once,
//! wherever they surface.

use crate::error::BananaGenError;
use crate::extract::extract_result_url;
use crate::provider::GenerationProvider;
use crate::types::{
    AspectRatio, CreateTaskResponse, GeneratedAsset, GenerationRequest, GenerationSettings,
    OutputFormat, Resolution, TaskRecord, TaskRecordResponse, TaskState,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2500;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 40;
pub const DEFAULT_CREATE_PATH: &str = "/createTask";
pub const DEFAULT_RECORD_PATH: &str = "/recordInfo";

/// Settings the polling contract accepts as-is; everything else is remapped
/// before transmission.
pub const SUPPORTED_ASPECT_RATIOS: &[AspectRatio] = &[
    AspectRatio::Square,
    AspectRatio::Portrait3x4,
    AspectRatio::Landscape4x3,
    AspectRatio::Portrait9x16,
    AspectRatio::Landscape16x9,
];
pub const SUPPORTED_RESOLUTIONS: &[Resolution] = &[
    Resolution::Standard1K,
    Resolution::High2K,
    Resolution::Ultra4K,
];
pub const SUPPORTED_FORMATS: &[OutputFormat] = &[OutputFormat::Png, OutputFormat::Jpg];

pub struct RestPollingProvider {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) poll_interval: Duration,
    pub(crate) max_attempts: u32,
    pub(crate) create_path: String,
    pub(crate) record_path: String,
}

enum PollOutcome {
    Record(TaskRecord),
    Fatal(BananaGenError),
    Transient(String),
}

impl RestPollingProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            create_path: DEFAULT_CREATE_PATH.to_string(),
            record_path: DEFAULT_RECORD_PATH.to_string(),
        }
    }

    /// Create the provider-side task and return its opaque id.
    ///
    /// Never retried: a non-2xx response or an error code in the envelope
    /// fails the whole submission with the provider's message preserved
    /// verbatim.
    pub async fn create_task(
        &self,
        prompt: &str,
        image_input: &[String],
        settings: &GenerationSettings,
    ) -> Result<String, BananaGenError> {
        let body = json!({
            "model": self.model,
            "input": {
                "prompt": prompt,
                "image_input": image_input,
                "aspect_ratio": settings.aspect_ratio,
                "resolution": settings.resolution,
                "output_format": settings.output_format,
            },
        });

        let url = format!("{}{}", self.base_url, self.create_path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BananaGenError::Authentication { status });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response body".to_string());
            return Err(BananaGenError::TaskCreation(message));
        }

        let envelope: CreateTaskResponse = response.json().await?;
        if envelope.code != 200 {
            return Err(BananaGenError::TaskCreation(envelope.msg));
        }
        let data = envelope.data.ok_or_else(|| {
            BananaGenError::TaskCreation("task created but no task id was returned".to_string())
        })?;

        tracing::debug!(task_id = %data.task_id, model = %self.model, "task created");
        Ok(data.task_id)
    }

    /// Poll the task record until it reaches a terminal state.
    ///
    /// The first check happens only after one full interval. Every attempt,
    /// whether a transient failure or a non-terminal state, consumes budget
    /// and waits the same interval, so total suspension is bounded by
    /// `max_attempts * poll_interval`.
    pub async fn wait_for_completion(&self, task_id: &str) -> Result<TaskRecord, BananaGenError> {
        let url = format!("{}{}", self.base_url, self.record_path);

        for attempt in 1..=self.max_attempts {
            sleep(self.poll_interval).await;

            let record = match self.poll_once(&url, task_id).await {
                PollOutcome::Record(record) => record,
                PollOutcome::Fatal(err) => return Err(err),
                PollOutcome::Transient(reason) => {
                    tracing::warn!(
                        task_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        reason = %reason,
                        "transient poll failure"
                    );
                    continue;
                }
            };

            match record.state {
                TaskState::Success => {
                    tracing::debug!(task_id, attempt, "task succeeded");
                    return Ok(record);
                }
                TaskState::Fail => {
                    let message = record
                        .fail_msg
                        .unwrap_or_else(|| "generation failed without a reason".to_string());
                    tracing::debug!(task_id, attempt, message = %message, "task failed");
                    return Err(BananaGenError::GenerationFailed(message));
                }
                state => {
                    tracing::debug!(task_id, attempt, state = ?state, "task still running");
                }
            }
        }

        Err(BananaGenError::Timeout)
    }

    async fn poll_once(&self, url: &str, task_id: &str) -> PollOutcome {
        let response = match self
            .http
            .get(url)
            .query(&[("taskId", task_id)])
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return PollOutcome::Transient(err.to_string()),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return PollOutcome::Fatal(BananaGenError::Authentication { status });
        }
        if !status.is_success() {
            return PollOutcome::Transient(format!("HTTP {status}"));
        }

        let envelope: TaskRecordResponse = match response.json().await {
            Ok(envelope) => envelope,
            Err(err) => return PollOutcome::Transient(err.to_string()),
        };
        if envelope.code != 200 {
            return PollOutcome::Transient(format!("provider error: {}", envelope.msg));
        }
        match envelope.data {
            Some(record) => PollOutcome::Record(record),
            None => PollOutcome::Transient("record response without data".to_string()),
        }
    }
}

#[async_trait]
impl GenerationProvider for RestPollingProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedAsset, BananaGenError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(BananaGenError::EmptyPrompt);
        }

        let settings = GenerationSettings {
            aspect_ratio: request.aspect_ratio.normalize(SUPPORTED_ASPECT_RATIOS),
            resolution: request.resolution.normalize(SUPPORTED_RESOLUTIONS),
            output_format: request.output_format.normalize(SUPPORTED_FORMATS),
        };

        let task_id = self
            .create_task(prompt, &request.reference_image_urls, &settings)
            .await?;
        let record = self.wait_for_completion(&task_id).await?;

        let url = extract_result_url(record.result_json.as_deref().unwrap_or(""))?;
        Ok(GeneratedAsset {
            id: Uuid::new_v4().to_string(),
            url,
            prompt: prompt.to_string(),
            created_at: Utc::now(),
            settings,
        })
    }

    fn name(&self) -> &'static str {
        "rest-polling"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
