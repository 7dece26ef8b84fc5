use async_trait::async_trait;

use crate::capabilities::{HttpRequest, HttpResult};

/// Executes the core's HTTP requests. Native shells bridge this to their own
/// networking stack; desktop tooling can use [`ReqwestClient`].
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> HttpResult;
}

#[cfg(feature = "http-client")]
pub use self::reqwest_client::ReqwestClient;

#[cfg(feature = "http-client")]
mod reqwest_client {
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use tracing::{debug, instrument};

    use super::ApiClient;
    use crate::capabilities::{
        HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpResult,
    };
    use crate::shell::ShellError;

    #[derive(Clone)]
    pub struct ReqwestClient {
        inner: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self, ShellError> {
            let inner = reqwest::Client::builder()
                .user_agent(concat!("erp-shared/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| ShellError::Client(e.to_string()))?;
            Ok(Self { inner })
        }

        #[must_use]
        pub fn with_client(inner: reqwest::Client) -> Self {
            Self { inner }
        }
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_error(e: &reqwest::Error, request: &HttpRequest) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout {
                timeout_ms: request.timeout_ms(),
                request_id: request.request_id().to_string(),
            }
        } else if e.is_body() || e.is_decode() {
            HttpError::InvalidResponse {
                reason: e.to_string(),
                request_id: request.request_id().to_string(),
            }
        } else {
            HttpError::ConnectionError {
                host: request.url().host().to_string(),
                message: e.to_string(),
            }
        }
    }

    #[async_trait]
    impl ApiClient for ReqwestClient {
        #[instrument(
            skip(self, request),
            fields(method = request.method().as_str(), request_id = request.request_id())
        )]
        async fn execute(&self, request: HttpRequest) -> HttpResult {
            let started = Instant::now();

            let mut builder = self
                .inner
                .request(method(request.method()), request.url().as_str())
                .timeout(Duration::from_millis(request.timeout_ms()));
            for (name, value) in request.headers().iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body() {
                builder = builder.body(body.to_vec());
            }

            let response = builder.send().await.map_err(|e| map_error(&e, &request))?;
            let status = response.status().as_u16();
            let headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| map_error(&e, &request))?
                .to_vec();

            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            debug!(status, duration_ms, "response received");

            Ok(HttpResponse::new(
                status,
                HttpHeaders::from(headers),
                body,
                request.request_id().to_string(),
                duration_ms,
            ))
        }
    }
}
