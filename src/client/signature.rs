//! Request signing for the OVH API.
//!
//! The API verifies a SHA-1 digest over the application secret, consumer
//! key, verb, absolute URL, raw body and timestamp joined with `+`. The hex
//! digest is prefixed with the scheme version tag `$1$`.

use sha1::{Digest, Sha1};

/// Version tag prepended to every signature.
pub const SIGNATURE_VERSION: &str = "$1$";

const SEPARATOR: &[u8] = b"+";

/// Inputs covered by a request signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignatureInput<'a> {
    /// Application secret paired with the application key.
    pub application_secret: &'a str,
    /// Consumer key authorising the call.
    pub consumer_key: &'a str,
    /// Upper-case HTTP verb.
    pub method: &'a str,
    /// Absolute request URL, query string included.
    pub url: &'a str,
    /// Exact bytes sent as the body (empty when none).
    pub body: &'a [u8],
    /// Server-aligned Unix timestamp sent in the timestamp header.
    pub timestamp: i64,
}

/// Computes the `X-Ovh-Signature` header value for `input`.
#[must_use]
pub fn sign(input: &SignatureInput<'_>) -> String {
    let timestamp = input.timestamp.to_string();
    let mut hasher = Sha1::new();
    hasher.update(input.application_secret.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(input.consumer_key.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(input.method.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(input.url.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(input.body);
    hasher.update(SEPARATOR);
    hasher.update(timestamp.as_bytes());
    format!("{SIGNATURE_VERSION}{}", hex::encode(hasher.finalize()))
}
