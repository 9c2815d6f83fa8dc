//! Credential and endpoint resolution for the OVH API.
//!
//! Each credential field may be passed explicitly. Empty fields fall back to
//! `OVH_<FIELD>` environment variables, then to INI files read in increasing
//! priority (`/etc/ovh.conf`, `~/.ovh.conf`, `./ovh.conf`). The endpoint is
//! read from `[default] endpoint`; the keys come from the section named after
//! the endpoint identifier. Resolution happens once, without network I/O.

mod endpoint;
mod files;

use std::collections::BTreeMap;
use std::env;
use std::fmt;

use camino::Utf8PathBuf;
use thiserror::Error;

use files::ConfigLayers;

pub use endpoint::{ENDPOINTS, Endpoint};

/// Prefix shared by all credential environment variables.
pub const ENV_PREFIX: &str = "OVH_";
/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ovh.conf";
/// Configuration file name looked up in the user's home directory.
pub const USER_CONFIG_FILE_NAME: &str = ".ovh.conf";
/// Configuration file in the current directory.
pub const LOCAL_CONFIG_PATH: &str = "./ovh.conf";

const DEFAULT_SECTION: &str = "default";
const ENDPOINT_KEY: &str = "endpoint";
const APPLICATION_KEY_KEY: &str = "application_key";
const APPLICATION_SECRET_KEY: &str = "application_secret";
const CONSUMER_KEY_KEY: &str = "consumer_key";

/// Errors raised while resolving credentials.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CredentialError {
    /// Raised when the endpoint is neither a URL nor a known identifier.
    #[error(
        "unknown OVH endpoint '{identifier}': use one of ovh-eu, ovh-ca, kimsufi-eu, kimsufi-ca, \
         soyoustart-eu, soyoustart-ca, runabove-ca or a full URL (set OVH_ENDPOINT or \
         [default] endpoint in ovh.conf)"
    )]
    UnknownEndpoint {
        /// Identifier that failed to resolve.
        identifier: String,
    },
    /// Raised when an existing configuration file cannot be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
}

/// Caller-supplied credential values; empty strings mean "resolve".
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CredentialArgs {
    /// Endpoint identifier or URL.
    pub endpoint: String,
    /// Application key.
    pub application_key: String,
    /// Application secret.
    pub application_secret: String,
    /// Consumer key.
    pub consumer_key: String,
}

/// Fully resolved, immutable credentials.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    endpoint: Endpoint,
    application_key: String,
    application_secret: String,
    consumer_key: String,
}

impl Credentials {
    /// Builds credentials from already resolved values.
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        consumer_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            application_key: application_key.into(),
            application_secret: application_secret.into(),
            consumer_key: consumer_key.into(),
        }
    }

    /// Endpoint the client talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Application key sent with every request.
    #[must_use]
    pub fn application_key(&self) -> &str {
        &self.application_key
    }

    /// Application secret used for signing.
    #[must_use]
    pub fn application_secret(&self) -> &str {
        &self.application_secret
    }

    /// Consumer key sent with authenticated requests.
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<redacted>")
            .field("consumer_key", &"<redacted>")
            .finish()
    }
}

/// Source of environment variables consulted during resolution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnvSource {
    /// Reads the process environment.
    Process,
    /// Reads a fixed map, typically in tests.
    Fixed(BTreeMap<String, String>),
}

impl EnvSource {
    fn lookup(&self, name: &str) -> Option<String> {
        let value = match self {
            Self::Process => env::var(name).ok(),
            Self::Fixed(values) => values.get(name).cloned(),
        };
        value.filter(|found| !found.is_empty())
    }
}

/// Returns the environment variable consulted for a configuration key.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())
}

/// Resolves [`CredentialArgs`] into [`Credentials`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialResolver {
    files: Vec<Utf8PathBuf>,
    env: EnvSource,
}

impl CredentialResolver {
    /// Resolver using the process environment and the standard file layers.
    /// The home file is skipped when no home directory can be determined.
    #[must_use]
    pub fn standard() -> Self {
        let mut files = vec![Utf8PathBuf::from(SYSTEM_CONFIG_PATH)];
        if let Some(home) = dirs::home_dir().and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        {
            files.push(home.join(USER_CONFIG_FILE_NAME));
        }
        files.push(Utf8PathBuf::from(LOCAL_CONFIG_PATH));
        Self::new(files, EnvSource::Process)
    }

    /// Resolver over explicit files (lowest priority first) and environment.
    #[must_use]
    pub const fn new(files: Vec<Utf8PathBuf>, env: EnvSource) -> Self {
        Self { files, env }
    }

    /// Configuration files consulted, lowest priority first.
    #[must_use]
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// Fills every empty field of `args` and resolves the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Parse`] when a present configuration file is
    /// malformed and [`CredentialError::UnknownEndpoint`] when the resulting
    /// endpoint identifier cannot be resolved.
    pub fn resolve(&self, args: CredentialArgs) -> Result<Credentials, CredentialError> {
        let layers = ConfigLayers::load(&self.files)?;

        let endpoint_name = self.pick(args.endpoint, DEFAULT_SECTION, ENDPOINT_KEY, &layers);
        let application_key =
            self.pick(args.application_key, &endpoint_name, APPLICATION_KEY_KEY, &layers);
        let application_secret = self.pick(
            args.application_secret,
            &endpoint_name,
            APPLICATION_SECRET_KEY,
            &layers,
        );
        let consumer_key = self.pick(args.consumer_key, &endpoint_name, CONSUMER_KEY_KEY, &layers);

        let endpoint = Endpoint::resolve(&endpoint_name)?;
        Ok(Credentials {
            endpoint,
            application_key,
            application_secret,
            consumer_key,
        })
    }

    fn pick(&self, explicit: String, section: &str, key: &str, layers: &ConfigLayers) -> String {
        if !explicit.is_empty() {
            return explicit;
        }
        if let Some(value) = self.env.lookup(&env_var_name(key)) {
            return value;
        }
        layers.get(section, key).unwrap_or_default()
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests;
