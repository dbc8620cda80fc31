use std::time::Duration;

use fetch_core::{FetchRequest, Resource, SearchMode};
use fetch_logging::{fetch_debug, fetch_info};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use crate::{FailureKind, RemoteFetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

/// The remote service boundary: one blocking call per request.
///
/// Implementations run on a worker thread, never on the UI thread. They should
/// return early with [`RemoteFetchError::cancelled`] once `cancel` fires.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Resource, RemoteFetchError>;
}

/// HTTP collaborator for the image service.
///
/// `ById` maps to `GET {base}/images/{id}` and `ByPatient` to
/// `GET {base}/patients/{id}/images/latest`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn resource_url(&self, request: &FetchRequest) -> Result<reqwest::Url, RemoteFetchError> {
        let mut url = reqwest::Url::parse(&self.settings.base_url)
            .map_err(|err| RemoteFetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RemoteFetchError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?;
            segments.pop_if_empty();
            match request.mode() {
                SearchMode::ById => {
                    segments.extend(["images", request.id()]);
                }
                SearchMode::ByPatient => {
                    segments.extend(["patients", request.id(), "images", "latest"]);
                }
            }
        }
        Ok(url)
    }

    fn build_client(&self) -> Result<reqwest::Client, RemoteFetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| RemoteFetchError::new(FailureKind::Network, err.to_string()))
    }

    async fn fetch_async(&self, request: &FetchRequest) -> Result<Resource, RemoteFetchError> {
        let url = self.resource_url(request)?;
        let client = self.build_client()?;
        fetch_debug!("GET {} for {}", url, request);

        let response = client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let mut resource = Resource::new(request.id(), bytes);
        if let Some(content_type) = content_type {
            resource = resource.with_content_type(content_type);
        }
        Ok(resource)
    }
}

impl RemoteFetcher for ReqwestFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Resource, RemoteFetchError> {
        if cancel.is_cancelled() {
            return Err(RemoteFetchError::cancelled());
        }

        // The worker thread owns this runtime for exactly one call.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| RemoteFetchError::new(FailureKind::Network, err.to_string()))?;

        runtime.block_on(async {
            tokio::select! {
                () = cancel.cancelled() => {
                    fetch_info!("Dropping in-flight request for {}", request);
                    Err(RemoteFetchError::cancelled())
                }
                result = self.fetch_async(request) => result,
            }
        })
    }
}

fn too_large(max_bytes: u64, actual: u64) -> RemoteFetchError {
    RemoteFetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteFetchError {
    if err.is_timeout() {
        return RemoteFetchError::new(FailureKind::Timeout, err.to_string());
    }
    RemoteFetchError::new(FailureKind::Network, err.to_string())
}
