pub mod client;
pub mod config;
pub mod direct;
pub mod error;
pub mod extract;
pub mod history;
pub mod polling;
pub mod provider;
pub mod reference;
pub mod types;

pub use client::{BananaGen, BananaGenOptions, ProviderKind};
pub use error::BananaGenError;
pub use history::AssetHistory;
pub use provider::GenerationProvider;
pub use types::{
    AspectRatio, GeneratedAsset, GenerationRequest, GenerationSettings, OutputFormat, Resolution,
    TaskState,
};
