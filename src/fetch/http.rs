use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::TextFetcher;
use crate::errors::{snippet, FetchError};

/// reqwest-backed [`TextFetcher`] with a [`RetryPolicy`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self::with_sleeper(client, policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(client: Client, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        debug!(%url, attempt, "Fetching text");
        let resp = self
            .client
            .get(url)
            .timeout(self.policy.attempt_timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, attempt, e))?;

        // read the body whatever the status so failures carry a snippet
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    attempts: attempt,
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                snippet: snippet(&body),
            });
        }
        if looks_like_html(&body) {
            return Err(FetchError::HtmlDocument {
                url: url.to_string(),
                snippet: snippet(&body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.policy
            .run(self.sleeper.as_ref(), url, |attempt| self.attempt(url, attempt))
            .await
    }
}

fn transport_error(url: &str, attempt: u32, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            attempts: attempt,
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Publishing endpoints answer with an HTML error page rather than a status code
/// when a sheet is unpublished or the link is wrong. The whole body is
/// searched, since comment or script preambles can push the root element far in.
pub fn looks_like_html(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("<!doctype html") || lower.contains("<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::retry::testing::RecordingSleeper;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `status`/`body` to every connection; returns the base URL and a hit counter.
    async fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_c = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut sock, _) = match listener.accept().await {
                    Ok(s) => s,
                    Err(_) => return,
                };
                hits_c.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        (format!("http://{}/pub?output=csv", addr), hits)
    }

    fn fetcher(sleeper: Arc<RecordingSleeper>) -> HttpFetcher {
        let policy = RetryPolicy {
            attempt_timeout: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        HttpFetcher::with_sleeper(Client::new(), policy, sleeper)
    }

    #[test]
    fn html_sniffing_is_case_insensitive() {
        assert!(looks_like_html("  <!DOCTYPE HTML><html>"));
        assert!(looks_like_html("<HTML lang=en>"));
        assert!(!looks_like_html("Field Name,Value\nGOLD OZ,$2000"));
    }

    #[test]
    fn html_after_a_long_preamble_is_still_detected() {
        let body = format!("<!-- {} -->\n{}<HTML><body>gone</body></HTML>", "x".repeat(4000), " ".repeat(2000));
        assert!(looks_like_html(&body));
        let csv = format!("Field Name,Value\n{}", "GOLD OZ,$2000\n".repeat(500));
        assert!(!looks_like_html(&csv));
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let (url, hits) = serve("200 OK", "a,b\n1,2\n").await;
        let text = fetcher(Arc::default()).fetch_text(&url).await.unwrap();
        assert_eq!(text, "a,b\n1,2\n");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_status_fails_immediately_with_snippet() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let (url, hits) = serve("500 Internal Server Error", "sheet exploded").await;
        let err = fetcher(sleeper.clone()).fetch_text(&url).await.unwrap_err();
        match err {
            FetchError::Status {
                status, snippet, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(snippet, "sheet exploded");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn html_error_page_is_not_retried() {
        let (url, hits) = serve("200 OK", "<!doctype html><html><body>Sign in</body></html>").await;
        let err = fetcher(Arc::default()).fetch_text(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::HtmlDocument { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_refused_is_retried_then_reported() {
        // bind then drop to get a port with nothing listening
        let addr = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap()
        };
        let sleeper = Arc::new(RecordingSleeper::default());
        let err = fetcher(sleeper.clone())
            .fetch_text(&format!("http://{}/", addr))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }
}
