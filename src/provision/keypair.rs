//! SSH key reconciliation.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::NewSshKey;
use crate::client::Transport;
use crate::machine::ProvisionedMachine;
use crate::request::ProvisionRequest;

use super::{ProvisionError, ProvisioningWorkflow};

/// Supplies the public half of a key pair generated for a machine.
pub trait KeySource: Send + Sync {
    /// Returns an OpenSSH-formatted public key for `key_name`.
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError`] when no key can be produced.
    fn public_key(&self, key_name: &str) -> Result<String, KeySourceError>;
}

/// Failure reported by a [`KeySource`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct KeySourceError {
    message: String,
}

impl KeySourceError {
    /// Wraps a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Key source returning one fixed public key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StaticKey(String);

impl StaticKey {
    /// Wraps an OpenSSH-formatted public key.
    #[must_use]
    pub fn new(public_key: impl Into<String>) -> Self {
        Self(public_key.into())
    }
}

impl KeySource for StaticKey {
    fn public_key(&self, _key_name: &str) -> Result<String, KeySourceError> {
        Ok(self.0.clone())
    }
}

/// Key source reading a `.pub` file from disk, for keys generated by
/// `ssh-keygen` ahead of provisioning.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKeyFile {
    path: Utf8PathBuf,
}

impl PublicKeyFile {
    /// Reads the key at `path` when asked.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeySource for PublicKeyFile {
    fn public_key(&self, _key_name: &str) -> Result<String, KeySourceError> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir,
            _ => Utf8Path::new("."),
        };
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| KeySourceError::new(format!("{} is not a file path", self.path)))?;
        let contents = Dir::open_ambient_dir(parent, ambient_authority())
            .and_then(|dir| dir.read_to_string(file_name))
            .map_err(|err| KeySourceError::new(format!("failed to read {}: {err}", self.path)))?;

        let key = contents.trim();
        if key.is_empty() {
            return Err(KeySourceError::new(format!("{} is empty", self.path)));
        }
        Ok(key.to_owned())
    }
}

/// Name for a key uploaded on behalf of `machine_name`.
#[must_use]
pub fn generated_key_name(machine_name: &str) -> String {
    format!("{machine_name}-{}", Uuid::new_v4().simple())
}

impl<T: Transport, K: KeySource> ProvisioningWorkflow<T, K> {
    pub(super) async fn ensure_key_pair(
        &self,
        request: &ProvisionRequest,
        machine: &mut ProvisionedMachine,
    ) -> Result<(), ProvisionError> {
        if let Some(selector) = request.ssh_key.as_deref() {
            let existing = self
                .api
                .ssh_keys(&machine.project_id, &machine.region_name)
                .await?
                .into_iter()
                .find(|key| key.id == selector || key.name == selector);
            if let Some(key) = existing {
                debug!(key_id = %key.id, key_name = %key.name, "reusing existing SSH key");
                machine.key_pair_name = key.name;
                machine.key_pair_id = key.id;
                machine.key_pair_generated = false;
                return Ok(());
            }
            debug!(selector, "SSH key not found, uploading a new one");
        }

        let key_name = generated_key_name(&machine.machine_name);
        let public_key =
            self.keys
                .public_key(&key_name)
                .map_err(|err| ProvisionError::KeySource {
                    key_name: key_name.clone(),
                    message: err.to_string(),
                })?;
        let created = self
            .api
            .create_ssh_key(
                &machine.project_id,
                &NewSshKey {
                    name: key_name.clone(),
                    public_key,
                    region: None,
                },
            )
            .await?;

        info!(key_id = %created.id, key_name = %key_name, "uploaded SSH key");
        machine.key_pair_name = key_name;
        machine.key_pair_id = created.id;
        machine.key_pair_generated = true;
        Ok(())
    }
}
