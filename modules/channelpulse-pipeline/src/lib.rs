pub mod backfill;
pub mod crawler;
pub mod diff;
pub mod notify;
pub mod persist;
pub mod sources;
pub mod summary;
pub mod traits;

pub use crawler::Crawler;
pub use notify::WebhookAnnouncer;
pub use persist::MemoryStore;
pub use summary::{BackfillLimit, BackfillSummary, CrawlSummary, FeedSummary, VideoFailure};
pub use traits::{
    Announcer, ChannelStore, CommentContext, Enricher, FeedSource, MetricsSource,
    NotificationKind, VideoSource,
};
