//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde_json::{Value, json};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::client::{
    ApiRequest, ApiResponse, ClientError, SignedClient, TIME_PATH, Transport, TransportFuture,
};
use crate::credentials::{Credentials, Endpoint};

/// Base URL used by [`test_credentials`].
pub const TEST_ENDPOINT: &str = "https://api.test.invalid/1.0";
/// Project scripted by [`push_catalog`].
pub const TEST_PROJECT: &str = "p1";
/// Region scripted by [`push_catalog`].
pub const TEST_REGION: &str = "GRA1";
/// Linux flavor id scripted by [`push_catalog`].
pub const TEST_FLAVOR_ID: &str = "f-linux";
/// Linux image id scripted by [`push_catalog`].
pub const TEST_IMAGE_ID: &str = "img-linux";

type Scripted = Result<ApiResponse, String>;

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    responses: VecDeque<Scripted>,
}

#[derive(Debug, Default)]
struct Script {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
}

/// Scripted transport that answers requests from pre-seeded responses.
///
/// Responses are keyed by method and path (matched against the end of the
/// request URL, longest path wins). Each route replays its responses in FIFO
/// order and keeps repeating the last one once the queue is drained.
/// Requests with no scripted route fail with [`ClientError::Transport`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Creates a transport with no scripted routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, method: Method, path: &str, outcome: Scripted) {
        let mut script = self.script();
        if let Some(route) = script
            .routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            route.responses.push_back(outcome);
            return;
        }
        script.routes.push(Route {
            method,
            path: path.to_owned(),
            responses: VecDeque::from([outcome]),
        });
    }

    /// Queues a raw response for `method path`.
    pub fn push(&self, method: Method, path: &str, response: ApiResponse) {
        self.enqueue(method, path, Ok(response));
    }

    /// Queues a JSON response for `method path`.
    pub fn push_json(&self, method: Method, path: &str, status: u16, body: &Value) {
        self.push(method, path, json_response(status, body));
    }

    /// Queues an empty-bodied response for `method path`.
    pub fn push_status(&self, method: Method, path: &str, status: u16) {
        self.push(method, path, empty_response(status));
    }

    /// Queues a vendor error object for `method path`.
    pub fn push_api_error(&self, method: Method, path: &str, status: u16, message: &str) {
        self.push_json(method, path, status, &serde_json::json!({ "message": message }));
    }

    /// Queues a transport-level failure for `method path`.
    pub fn push_transport_error(&self, method: Method, path: &str, message: &str) {
        self.enqueue(method, path, Err(message.to_owned()));
    }

    /// Scripts the server clock returned by `GET /auth/time`.
    pub fn push_server_time(&self, seconds: i64) {
        self.push_json(Method::GET, TIME_PATH, 200, &Value::from(seconds));
    }

    /// Returns a snapshot of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script().requests.clone()
    }

    /// Returns the requests whose method and URL match `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<ApiRequest> {
        self.script()
            .requests
            .iter()
            .filter(|request| request.method == *method && request.url.ends_with(path))
            .cloned()
            .collect()
    }

    /// Counts the requests whose method and URL match `method path`.
    #[must_use]
    pub fn calls_to(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    fn answer(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut script = self.script();
        let url = request.url.clone();
        let method = request.method.clone();
        script.requests.push(request);

        let route = script
            .routes
            .iter_mut()
            .filter(|route| route.method == method && url.ends_with(&route.path))
            .max_by_key(|route| route.path.len());

        let outcome = route.and_then(|route| {
            if route.responses.len() > 1 {
                route.responses.pop_front()
            } else {
                route.responses.front().cloned()
            }
        });

        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ClientError::Transport { url, message }),
            None => Err(ClientError::Transport {
                url,
                message: format!("no scripted response for {method}"),
            }),
        }
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        let outcome = self.answer(request);
        Box::pin(async move { outcome })
    }
}

/// Builds a response carrying `body` as JSON.
#[must_use]
pub fn json_response(status: u16, body: &Value) -> ApiResponse {
    ApiResponse {
        status,
        status_text: reason(status).to_owned(),
        body: serde_json::to_vec(body).unwrap_or_default(),
    }
}

/// Builds a response with no body.
#[must_use]
pub fn empty_response(status: u16) -> ApiResponse {
    ApiResponse {
        status,
        status_text: reason(status).to_owned(),
        body: Vec::new(),
    }
}

const fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// Guard that holds the env mutex and restores previous values on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: AsyncMutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets one environment variable while holding the global mutex.
    pub async fn set_var(key: &str, value: &str) -> Self {
        Self::set_vars(&[(key, value)]).await
    }

    /// Sets multiple environment variables while holding the global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// Credentials pointing at [`TEST_ENDPOINT`].
///
/// # Panics
///
/// Panics if [`TEST_ENDPOINT`] stops being a literal URL.
#[must_use]
pub fn test_credentials() -> Credentials {
    let endpoint = match Endpoint::resolve(TEST_ENDPOINT) {
        Ok(endpoint) => endpoint,
        Err(err) => panic!("test endpoint should resolve: {err}"),
    };
    Credentials::new(endpoint, "test-ak", "test-as", "test-ck")
}

/// Signed client over `transport` using [`test_credentials`].
#[must_use]
pub fn scripted_client(transport: &ScriptedTransport) -> SignedClient<ScriptedTransport> {
    SignedClient::new(test_credentials(), transport.clone())
}

/// Scripts a one-project catalog: the project list, its regions, and
/// flavors and images where a Windows entry shares the Linux entry's name and
/// is listed first.
pub fn push_catalog(transport: &ScriptedTransport) {
    let project = format!("/cloud/project/{TEST_PROJECT}");
    transport.push_json(Method::GET, "/cloud/project", 200, &json!([TEST_PROJECT]));
    transport.push_json(
        Method::GET,
        &format!("{project}/region"),
        200,
        &json!(["BHS1", TEST_REGION, "SBG1"]),
    );
    transport.push_json(
        Method::GET,
        &format!("{project}/flavor?region={TEST_REGION}"),
        200,
        &json!([
            {"id": "f-win", "name": "vps-ssd-1", "osType": "windows", "region": TEST_REGION},
            {"id": TEST_FLAVOR_ID, "name": "vps-ssd-1", "osType": "linux", "region": TEST_REGION},
            {"id": "f-big", "name": "vps-ssd-3", "osType": "linux", "region": TEST_REGION}
        ]),
    );
    transport.push_json(
        Method::GET,
        &format!("{project}/image?osType=linux&region={TEST_REGION}"),
        200,
        &json!([
            {"id": "img-win", "name": "Ubuntu 14.04", "type": "windows", "region": TEST_REGION},
            {"id": TEST_IMAGE_ID, "name": "Ubuntu 14.04", "type": "linux", "region": TEST_REGION}
        ]),
    );
}

/// JSON body of an instance in `status` with the given `(ip, type)` pairs.
#[must_use]
pub fn instance_json(id: &str, status: &str, addresses: &[(&str, &str)]) -> Value {
    let ip_addresses: Vec<Value> = addresses
        .iter()
        .map(|(ip, kind)| json!({"ip": ip, "type": kind, "version": 4}))
        .collect();
    json!({
        "id": id,
        "name": "m1",
        "status": status,
        "region": TEST_REGION,
        "ipAddresses": ip_addresses
    })
}
