//! Raw HTTP access to the upstream service.
//!
//! A fetcher only knows how to GET a URL and hand back JSON. It never
//! interprets status codes; a non-2xx reply comes back as
//! [`FetchFailure::Status`] for the classifier to decide on.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Why a GET did not produce usable JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status.
    Status { status: u16, body: String },
    /// No response at all: DNS, connect, TLS or timeout failure.
    Transport(String),
    /// A 2xx response whose body could not be read or decoded.
    Decode(String),
}

#[async_trait]
pub trait HttpFetcher: Send + Sync + Debug {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchFailure> {
        debug!(url = %redact(url), "GET");

        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            // The status alone decides the error; an unreadable body only loses the message.
            let body = res.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %truncate_body(&body), "upstream rejected request");
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = res
            .text()
            .await
            .map_err(|e| FetchFailure::Decode(format!("failed to read response body: {e}")))?;
        serde_json::from_str(&body).map_err(|e| FetchFailure::Decode(e.to_string()))
    }
}

/// Copy of `url` with the `appid` query value masked, for logging.
pub(crate) fn redact(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{sync::Mutex, time::Duration};

    use super::*;

    type Reply = Result<Value, FetchFailure>;

    /// Canned replies keyed by path and, optionally, the `q` parameter.
    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        routes: Vec<(String, Option<String>, Reply)>,
        delays: Vec<(String, Duration)>,
        calls: Mutex<Vec<Url>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, path: &str, reply: Reply) -> Self {
            self.routes.push((path.to_string(), None, reply));
            self
        }

        pub fn route_query(mut self, path: &str, q: &str, reply: Reply) -> Self {
            self.routes.push((path.to_string(), Some(q.to_string()), reply));
            self
        }

        pub fn delay_query(mut self, q: &str, delay: Duration) -> Self {
            self.delays.push((q.to_string(), delay));
            self
        }

        pub fn calls(&self) -> Vec<Url> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpFetcher for FakeFetcher {
        async fn get_json(&self, url: &Url) -> Result<Value, FetchFailure> {
            self.calls.lock().unwrap().push(url.clone());

            let q = url
                .query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned());

            let delay = q
                .as_deref()
                .and_then(|q| self.delays.iter().find(|(k, _)| k == q))
                .map(|(_, d)| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.routes
                .iter()
                .find(|(path, want, _)| {
                    path == url.path() && want.as_ref().is_none_or(|w| Some(w) == q.as_ref())
                })
                .map(|(_, _, reply)| reply.clone())
                .unwrap_or_else(|| {
                    Err(FetchFailure::Status {
                        status: 404,
                        body: String::new(),
                    })
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_masks_only_the_key() {
        let url = Url::parse_with_params(
            "https://api.openweathermap.org/data/2.5/weather",
            &[("q", "London"), ("appid", "SECRET"), ("units", "metric")],
        )
        .unwrap();

        let shown = redact(&url);
        assert!(!shown.contains("SECRET"));
        assert!(shown.contains("q=London"));
        assert!(shown.contains("appid=***") || shown.contains("appid=%2A%2A%2A"));
        assert!(shown.contains("units=metric"));
    }

    #[tokio::test]
    async fn status_survives_a_truncated_error_body() {
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // Promise more body than is sent, then hang up.
            socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 100\r\n\r\n{\"cod\"")
                .await
                .unwrap();
        });

        let url = Url::parse(&format!("http://{addr}/data/2.5/weather?q=Atlantis")).unwrap();
        let err = ReqwestFetcher::new().unwrap().get_json(&url).await.unwrap_err();

        assert!(matches!(err, FetchFailure::Status { status: 404, .. }), "{err:?}");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
