//! Signed HTTP client for the OVH API.
//!
//! Every call carries the application key. Authenticated calls additionally
//! carry the consumer key, a server-aligned timestamp and a signature over
//! the request (see [`signature`]). The offset between the local clock and
//! the API clock is measured once, on the first authenticated call, through
//! the unauthenticated `/auth/time` endpoint and cached for the lifetime of
//! the client.

mod error;
pub mod signature;
mod transport;

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::Method;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use signature::{SignatureInput, sign};

pub use error::{ClientError, NOT_FOUND};
pub use transport::{
    ApiRequest, ApiResponse, REQUEST_TIMEOUT, ReqwestTransport, Transport, TransportFuture,
};

/// Path of the unauthenticated server-time endpoint.
pub const TIME_PATH: &str = "/auth/time";
/// Statuses treated as success by the typed accessors.
pub const SUCCESS: &[u16] = &[200];

/// Header carrying the application key.
pub const APPLICATION_HEADER: &str = "X-Ovh-Application";
/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Ovh-Timestamp";
/// Header carrying the consumer key.
pub const CONSUMER_HEADER: &str = "X-Ovh-Consumer";
/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Ovh-Signature";

const CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Authenticated client bound to one set of credentials.
#[derive(Debug)]
pub struct SignedClient<T> {
    credentials: Credentials,
    transport: T,
    clock_skew: OnceCell<i64>,
}

impl SignedClient<ReqwestTransport> {
    /// Creates a client that talks to the network through `reqwest`.
    #[must_use]
    pub fn with_reqwest(credentials: Credentials) -> Self {
        Self::new(credentials, ReqwestTransport)
    }
}

impl<T: Transport> SignedClient<T> {
    /// Creates a client. No network I/O happens until the first call.
    #[must_use]
    pub fn new(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            transport,
            clock_skew: OnceCell::new(),
        }
    }

    /// Credentials the client signs with.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls the API, signing the request when `needs_auth` is set.
    ///
    /// Every completed HTTP exchange is returned as an [`ApiResponse`],
    /// whatever its status; use [`ApiResponse::check`] to classify it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] when `body` cannot be serialised and
    /// [`ClientError::Transport`] when the exchange does not complete.
    pub async fn call<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        needs_auth: bool,
    ) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let encoded = body
            .map(|value| {
                serde_json::to_vec(value).map_err(|err| ClientError::Encode {
                    path: path.to_owned(),
                    message: err.to_string(),
                })
            })
            .transpose()?;

        let mut request = self.prepare(method, path, encoded);
        if needs_auth {
            let timestamp = unix_now().saturating_sub(self.clock_skew().await);
            self.sign_request(&mut request, timestamp);
        }

        debug!(method = %request.method, url = %request.url, needs_auth, "calling OVH API");
        self.transport.send(request).await
    }

    /// Issues an authenticated `GET`.
    ///
    /// # Errors
    ///
    /// See [`SignedClient::call`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.call::<()>(Method::GET, path, None, true).await
    }

    /// Issues an unauthenticated `GET`.
    ///
    /// # Errors
    ///
    /// See [`SignedClient::call`].
    pub async fn get_unauth(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.call::<()>(Method::GET, path, None, false).await
    }

    /// Issues an authenticated `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`SignedClient::call`].
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.call(Method::POST, path, Some(body), true).await
    }

    /// Issues an authenticated `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`SignedClient::call`].
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<ApiResponse, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.call(Method::PUT, path, Some(body), true).await
    }

    /// Issues an authenticated `DELETE`.
    ///
    /// # Errors
    ///
    /// See [`SignedClient::call`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.call::<()>(Method::DELETE, path, None, true).await
    }

    fn prepare(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ApiRequest {
        let mut headers = Vec::with_capacity(6);
        if body.is_some() {
            headers.push((String::from("Content-Type"), String::from(CONTENT_TYPE)));
        }
        headers.push((
            String::from(APPLICATION_HEADER),
            self.credentials.application_key().to_owned(),
        ));

        ApiRequest {
            method,
            url: format!("{}{path}", self.credentials.endpoint().url()),
            headers,
            body,
        }
    }

    fn sign_request(&self, request: &mut ApiRequest, timestamp: i64) {
        let signature = sign(&SignatureInput {
            application_secret: self.credentials.application_secret(),
            consumer_key: self.credentials.consumer_key(),
            method: request.method.as_str(),
            url: &request.url,
            body: request.body.as_deref().unwrap_or_default(),
            timestamp,
        });

        request
            .headers
            .push((String::from(TIMESTAMP_HEADER), timestamp.to_string()));
        request.headers.push((
            String::from(CONSUMER_HEADER),
            self.credentials.consumer_key().to_owned(),
        ));
        request
            .headers
            .push((String::from("Accept"), String::from("application/json")));
        request
            .headers
            .push((String::from(SIGNATURE_HEADER), signature));
    }

    /// Local clock minus API clock, in seconds. The first measurement is
    /// cached whatever its outcome; a failed one pins the skew to zero.
    async fn clock_skew(&self) -> i64 {
        *self
            .clock_skew
            .get_or_init(|| async {
                self.measure_clock_skew().await.unwrap_or_else(|err| {
                    warn!(error = %err, "clock calibration failed, signing with local time");
                    0
                })
            })
            .await
    }

    async fn measure_clock_skew(&self) -> Result<i64, ClientError> {
        let request = self.prepare(Method::GET, TIME_PATH, None);
        let response = self.transport.send(request).await?;
        response.check(SUCCESS)?;
        let server_time: i64 = response.json()?;
        let skew = unix_now()
            .checked_sub(server_time)
            .ok_or_else(|| ClientError::Decode {
                target: "server time",
                message: format!("{server_time} is out of range"),
            })?;
        debug!(skew, "calibrated OVH API clock");
        Ok(skew)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}
