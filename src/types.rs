use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratios accepted by the request surface.
///
/// Providers support a subset of these; anything outside the subset is
/// remapped to the closest supported ratio before transmission, never passed
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Ultrawide21x9,
}

impl AspectRatio {
    // Closest-supported substitutions, consulted only when the requested
    // ratio is outside a provider's supported set.
    const REMAP: &'static [(AspectRatio, AspectRatio)] = &[
        (AspectRatio::Ultrawide21x9, AspectRatio::Landscape16x9),
        (AspectRatio::Landscape3x2, AspectRatio::Landscape4x3),
        (AspectRatio::Landscape5x4, AspectRatio::Landscape4x3),
        (AspectRatio::Portrait2x3, AspectRatio::Portrait3x4),
        (AspectRatio::Portrait4x5, AspectRatio::Portrait3x4),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }

    /// Map this ratio into `supported`, falling back to `1:1` when neither
    /// the ratio itself nor its remap entry is available.
    pub fn normalize(self, supported: &[AspectRatio]) -> AspectRatio {
        if supported.contains(&self) {
            return self;
        }
        if let Some((_, mapped)) = Self::REMAP.iter().find(|(from, _)| *from == self) {
            if supported.contains(mapped) {
                return *mapped;
            }
        }
        AspectRatio::Square
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolutions accepted by the request surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1K")]
    Standard1K,
    #[serde(rename = "2K")]
    High2K,
    #[serde(rename = "4K")]
    Ultra4K,
}

impl Resolution {
    // Step-down substitutions for providers capped below the request.
    const REMAP: &'static [(Resolution, Resolution)] = &[
        (Resolution::Ultra4K, Resolution::High2K),
        (Resolution::High2K, Resolution::Standard1K),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Standard1K => "1K",
            Resolution::High2K => "2K",
            Resolution::Ultra4K => "4K",
        }
    }

    pub fn normalize(self, supported: &[Resolution]) -> Resolution {
        if supported.contains(&self) {
            return self;
        }
        if let Some((_, mapped)) = Self::REMAP.iter().find(|(from, _)| *from == self) {
            if supported.contains(mapped) {
                return *mapped;
            }
        }
        Resolution::Standard1K
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output formats accepted by the request surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
        }
    }

    pub fn normalize(self, supported: &[OutputFormat]) -> OutputFormat {
        if supported.contains(&self) {
            self
        } else {
            OutputFormat::Png
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-supplied intent for one generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Reference images for image-to-image flows. The polling contract
    /// transmits the URLs as-is; the direct contract fetches the first one
    /// and inlines its bytes.
    pub reference_image_urls: Vec<String>,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// The enumerated settings actually transmitted for a request, after
/// normalization against the provider's supported sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerationSettings {
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
}

/// Provider-side task state.
///
/// Providers use a subset or superset of these tokens; anything unrecognized
/// deserializes to [`TaskState::Other`] and counts as still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Waiting,
    Queuing,
    Generating,
    Success,
    Fail,
    #[serde(other)]
    Other,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Success | TaskState::Fail)
    }
}

/// Envelope returned by the task-creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<CreateTaskData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskData {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// Envelope returned by the task-record endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecordResponse {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<TaskRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: String,
    pub state: TaskState,
    /// Present only in terminal `success` state. Either a JSON envelope of
    /// result URLs or a bare URL string.
    #[serde(default)]
    pub result_json: Option<String>,
    /// Present only in terminal `fail` state.
    #[serde(default)]
    pub fail_msg: Option<String>,
}

/// A completed generation, as retained by callers.
///
/// Created only after a task reached terminal success and extraction
/// succeeded; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAsset {
    pub id: String,
    /// Remote URL or a `data:` URI.
    pub url: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub settings: GenerationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    const NARROW: &[AspectRatio] = &[
        AspectRatio::Square,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
    ];

    #[test]
    fn supported_ratio_passes_through() {
        assert_eq!(
            AspectRatio::Landscape16x9.normalize(NARROW),
            AspectRatio::Landscape16x9
        );
    }

    #[test]
    fn unsupported_ratio_uses_remap_table() {
        assert_eq!(
            AspectRatio::Ultrawide21x9.normalize(NARROW),
            AspectRatio::Landscape16x9
        );
        assert_eq!(
            AspectRatio::Portrait2x3.normalize(NARROW),
            AspectRatio::Portrait3x4
        );
    }

    #[test]
    fn unmappable_ratio_falls_back_to_square() {
        let tiny = &[AspectRatio::Square, AspectRatio::Landscape16x9];
        assert_eq!(AspectRatio::Portrait2x3.normalize(tiny), AspectRatio::Square);
    }

    #[test]
    fn resolution_steps_down() {
        let capped = &[Resolution::Standard1K, Resolution::High2K];
        assert_eq!(Resolution::Ultra4K.normalize(capped), Resolution::High2K);
        assert_eq!(
            Resolution::Ultra4K.normalize(&[Resolution::Standard1K]),
            Resolution::Standard1K
        );
    }

    #[test]
    fn unknown_state_token_is_non_terminal() {
        let state: TaskState = serde_json::from_str(r#""running""#).unwrap();
        assert_eq!(state, TaskState::Other);
        assert!(!state.is_terminal());
        assert!(TaskState::Success.is_terminal());
        assert!(TaskState::Fail.is_terminal());
        assert!(!TaskState::Queuing.is_terminal());
    }

    #[test]
    fn task_record_deserializes_provider_fields() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"taskId":"t-1","state":"success","resultJson":"{}","failMsg":null}"#,
        )
        .unwrap();
        assert_eq!(record.task_id, "t-1");
        assert_eq!(record.state, TaskState::Success);
        assert_eq!(record.result_json.as_deref(), Some("{}"));
        assert!(record.fail_msg.is_none());
    }
}
