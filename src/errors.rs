use thiserror::Error;

/// Longest body excerpt carried inside a [`FetchError`].
pub const SNIPPET_LIMIT: usize = 1000;

/// Failures from a single fetch sequence (all attempts included).
#[derive(Error, Debug)]
pub enum FetchError {
    /// Every attempt ran into the per-attempt timeout.
    #[error("timed out fetching {url} after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    /// Connection, DNS or TLS failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body could not be read after headers arrived.
    #[error("reading body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status. Never retried.
    #[error("HTTP {status} from {url}: {snippet}")]
    Status {
        url: String,
        status: u16,
        snippet: String,
    },

    /// The endpoint served an HTML page instead of delimited text. Never retried.
    #[error("expected CSV from {url} but got an HTML document: {snippet}")]
    HtmlDocument { url: String, snippet: String },
}

impl FetchError {
    /// Only transient transport problems are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Network { .. } | FetchError::Body { .. }
        )
    }
}

/// Crate-level error. Unmatched places are `None`, never an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed table from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("storage error on key {key}: {message}")]
    Storage { key: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn storage(key: impl Into<String>, message: impl ToString) -> Self {
        Error::Storage {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Cut `body` down to at most [`SNIPPET_LIMIT`] characters on a char boundary.
pub fn snippet(body: &str) -> String {
    match body.char_indices().nth(SNIPPET_LIMIT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
