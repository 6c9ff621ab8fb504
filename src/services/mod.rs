// Service exports
pub mod cache;
pub mod events;
pub mod memory;
pub mod postgres;
pub mod profiles;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use events::{EventError, LogEventSink, MatchEventSink, RecordingEventSink, RedisEventPublisher};
pub use memory::InMemoryStore;
pub use postgres::PostgresClient;
pub use profiles::{HttpProfileProvider, ProfileError, ProfileProvider};
pub use store::{MatchStore, StoreError, SwipeStore};
