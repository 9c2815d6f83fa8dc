//! Typed accessors for the public cloud endpoints used by provisioning.

mod types;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ClientError, ReqwestTransport, SUCCESS, SignedClient, Transport};
use crate::credentials::Credentials;

pub use types::{
    Flavor, Image, Instance, InstanceStatus, IpAddress, NewInstance, NewSshKey, PUBLIC_ADDRESS,
    Project, RebootKind, RebootRequest, SshKey,
};

/// Statuses accepted for calls that may answer without a body.
const NO_CONTENT: &[u16] = &[200, 204];

/// Appends `pairs` to `path` as a percent-encoded query string.
fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

/// Typed view over a [`SignedClient`].
#[derive(Debug)]
pub struct OvhApi<T> {
    client: SignedClient<T>,
}

impl OvhApi<ReqwestTransport> {
    /// Builds an accessor that talks to the network through `reqwest`.
    #[must_use]
    pub fn with_reqwest(credentials: Credentials) -> Self {
        Self::new(SignedClient::with_reqwest(credentials))
    }
}

impl<T: Transport> OvhApi<T> {
    /// Wraps an existing client.
    #[must_use]
    pub const fn new(client: SignedClient<T>) -> Self {
        Self { client }
    }

    /// Underlying signed client.
    #[must_use]
    pub const fn client(&self) -> &SignedClient<T> {
        &self.client
    }

    async fn fetch<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let response = self.client.get(path).await?;
        response.check(SUCCESS)?;
        response.json()
    }

    async fn delete_idempotent(&self, path: &str) -> Result<(), ClientError> {
        let response = self.client.delete(path).await?;
        match response.check(NO_CONTENT) {
            Err(err) if err.is_not_found() => {
                debug!(path, "resource already absent");
                Ok(())
            }
            other => other,
        }
    }

    /// Lists the identifiers of every project visible to the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn projects(&self) -> Result<Vec<String>, ClientError> {
        self.fetch("/cloud/project").await
    }

    /// Fetches one project.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.fetch(&format!("/cloud/project/{project_id}")).await
    }

    /// Lists the region names enabled for a project.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn regions(&self, project_id: &str) -> Result<Vec<String>, ClientError> {
        self.fetch(&format!("/cloud/project/{project_id}/region"))
            .await
    }

    /// Lists the flavors offered in a region.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn flavors(&self, project_id: &str, region: &str) -> Result<Vec<Flavor>, ClientError> {
        self.fetch(&with_query(
            &format!("/cloud/project/{project_id}/flavor"),
            &[("region", region)],
        ))
        .await
    }

    /// Lists the images of one OS family offered in a region.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn images(
        &self,
        project_id: &str,
        region: &str,
        os_family: &str,
    ) -> Result<Vec<Image>, ClientError> {
        self.fetch(&with_query(
            &format!("/cloud/project/{project_id}/image"),
            &[("osType", os_family), ("region", region)],
        ))
        .await
    }

    /// Lists the SSH keys usable in a region.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn ssh_keys(&self, project_id: &str, region: &str) -> Result<Vec<SshKey>, ClientError> {
        self.fetch(&with_query(
            &format!("/cloud/project/{project_id}/sshkey"),
            &[("region", region)],
        ))
        .await
    }

    /// Uploads a public key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn create_ssh_key(
        &self,
        project_id: &str,
        key: &NewSshKey,
    ) -> Result<SshKey, ClientError> {
        let response = self
            .client
            .post(&format!("/cloud/project/{project_id}/sshkey"), key)
            .await?;
        response.check(SUCCESS)?;
        response.json()
    }

    /// Deletes a key; an already absent key counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for any failure other than 404.
    pub async fn delete_ssh_key(&self, project_id: &str, key_id: &str) -> Result<(), ClientError> {
        self.delete_idempotent(&format!("/cloud/project/{project_id}/sshkey/{key_id}"))
            .await
    }

    /// Creates an instance and returns its initial representation.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn create_instance(
        &self,
        project_id: &str,
        instance: &NewInstance,
    ) -> Result<Instance, ClientError> {
        let response = self
            .client
            .post(&format!("/cloud/project/{project_id}/instance"), instance)
            .await?;
        response.check(SUCCESS)?;
        response.json()
    }

    /// Fetches one instance.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails or the body is malformed.
    pub async fn instance(&self, project_id: &str, instance_id: &str) -> Result<Instance, ClientError> {
        self.fetch(&format!("/cloud/project/{project_id}/instance/{instance_id}"))
            .await
    }

    /// Deletes an instance; an already absent instance counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for any failure other than 404.
    pub async fn delete_instance(&self, project_id: &str, instance_id: &str) -> Result<(), ClientError> {
        self.delete_idempotent(&format!("/cloud/project/{project_id}/instance/{instance_id}"))
            .await
    }

    /// Requests a reboot without waiting for it to complete.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the call fails.
    pub async fn reboot_instance(
        &self,
        project_id: &str,
        instance_id: &str,
        kind: RebootKind,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .post(
                &format!("/cloud/project/{project_id}/instance/{instance_id}/reboot"),
                &RebootRequest { kind },
            )
            .await?;
        response.check(NO_CONTENT)
    }
}
