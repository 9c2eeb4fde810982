pub mod config;
pub mod errors;
pub mod fetch;
pub mod history;
pub mod memo;
pub mod population;
pub mod process;
pub mod service;
pub mod snapshot;

pub use config::Config;
pub use errors::{Error, FetchError, Result};
pub use population::NOT_FOUND_MESSAGE;
pub use service::DataService;
pub use snapshot::{Field, SnapshotRecord};

/// Route `tracing` output through the test harness; a second install is ignored.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datefacts=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
