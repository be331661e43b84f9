pub mod caps;
pub mod config;
pub mod error;
pub mod profile;
pub mod types;

pub use caps::*;
pub use config::AppConfig;
pub use error::{CrawlError, CrawlResult, SoftFailure, SoftStage};
pub use profile::{load_profiles, ChannelProfile, ChannelProfiles};
pub use types::*;
