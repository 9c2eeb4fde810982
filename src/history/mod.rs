//! Durable state: the time-boxed snapshot cache and the never-expiring
//! metals backup, both over a pluggable key/value store.

pub mod clock;
pub mod metals;
pub mod snapshot_cache;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use metals::{MetalsBackup, MetalsBackupStore};
pub use snapshot_cache::{CacheEnvelope, SnapshotCache, CACHE_FORMAT_VERSION, DEFAULT_CACHE_TTL};
pub use store::{FileStore, KeyValueStore, MemoryStore};
