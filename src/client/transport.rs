//! HTTP exchange types and the transport seam used by [`super::SignedClient`].

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::ClientError;

/// Client-wide bound on every API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Fully prepared request, signed when required.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Absolute target URL (endpoint followed by the API path).
    pub url: String,
    /// Header pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// Encoded body, when one was supplied.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Returns the first value recorded for `name`, compared
    /// case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw outcome of an HTTP exchange, including non-2xx answers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiResponse {
    /// Numeric status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub status_text: String,
    /// Undecoded response bytes.
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct RemoteErrorBody {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "httpCode", default)]
    http_code: Option<String>,
    message: String,
}

impl ApiResponse {
    /// Accepts the response when its status is listed in `accepted`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] when the body decodes as a vendor error
    /// object, and [`ClientError::Status`] otherwise.
    pub fn check(&self, accepted: &[u16]) -> Result<(), ClientError> {
        if accepted.contains(&self.status) {
            return Ok(());
        }

        match serde_json::from_slice::<RemoteErrorBody>(&self.body) {
            Ok(remote) => Err(ClientError::Api {
                status: self.status,
                error_code: remote.error_code,
                http_code: remote.http_code,
                message: remote.message,
            }),
            Err(_) => Err(ClientError::Status {
                status: self.status,
                reason: self.status_text.clone(),
            }),
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] naming the target type when the body
    /// does not match it.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|err| ClientError::Decode {
            target: std::any::type_name::<T>(),
            message: err.to_string(),
        })
    }
}

/// Future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse, ClientError>> + Send + 'a>>;

/// Executes prepared requests. Implementations must only fail for
/// transport-level problems; every HTTP answer is returned as a response.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReqwestTransport;

impl Transport for ReqwestTransport {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let ApiRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut builder = HTTP_CLIENT.request(method, &url).timeout(REQUEST_TIMEOUT);
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(bytes) = body {
                builder = builder.body(bytes);
            }

            let response = builder.send().await.map_err(|err| ClientError::Transport {
                url: url.clone(),
                message: err.to_string(),
            })?;

            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|err| ClientError::Transport {
                    url: url.clone(),
                    message: err.to_string(),
                })?;

            Ok(ApiResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body: bytes.to_vec(),
            })
        })
    }
}
