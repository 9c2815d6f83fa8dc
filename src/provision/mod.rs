//! Instance provisioning workflow.
//!
//! A [`ProvisionRequest`] is turned into a running instance in strict order:
//! resolve the project and region, pick the flavor and image, reconcile the
//! SSH key, create the instance, poll it until it is `ACTIVE`, then record
//! its public address. Every step writes into the caller's
//! [`ProvisionedMachine`] as soon as it succeeds so a failed run can still be
//! torn down with [`ProvisioningWorkflow::remove`].

mod error;
mod keypair;
mod resolve;
mod state;
mod wait;

use std::time::Duration;

use tracing::{debug, info};

use crate::api::{NewInstance, OvhApi, RebootKind};
use crate::client::Transport;
use crate::machine::{DEFAULT_SSH_USER, ProvisionedMachine};
use crate::request::ProvisionRequest;

pub use error::{CUSTOMER_CONSOLE, PROVIDER, ProvisionError};
pub use keypair::{KeySource, KeySourceError, PublicKeyFile, StaticKey, generated_key_name};
pub use resolve::{select_flavor, select_image};
pub use state::{MachineState, machine_state};
pub use wait::public_address;

/// Delay between two instance polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4);
/// Polls issued before giving up on an instance.
pub const POLL_ATTEMPTS: u32 = 50;

/// Pacing of the convergence loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollPolicy {
    /// Delay between two polls.
    pub interval: Duration,
    /// Maximum number of polls; zero is treated as one.
    pub attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            attempts: POLL_ATTEMPTS,
        }
    }
}

/// Drives machines through create, converge, query, reboot and teardown.
#[derive(Debug)]
pub struct ProvisioningWorkflow<T, K> {
    api: OvhApi<T>,
    keys: K,
    poll: PollPolicy,
}

impl<T: Transport, K: KeySource> ProvisioningWorkflow<T, K> {
    /// Creates a workflow with the default poll policy.
    #[must_use]
    pub fn new(api: OvhApi<T>, keys: K) -> Self {
        Self {
            api,
            keys,
            poll: PollPolicy::default(),
        }
    }

    /// Replaces the poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Typed API the workflow talks through.
    #[must_use]
    pub const fn api(&self) -> &OvhApi<T> {
        &self.api
    }

    /// Provisions `request`, recording progress in `machine`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] for the first step that fails. Fields set
    /// by earlier steps stay in `machine`.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        machine: &mut ProvisionedMachine,
    ) -> Result<(), ProvisionError> {
        request.validate()?;
        machine.machine_name.clone_from(&request.machine_name);
        machine.ssh_user = request
            .ssh_user
            .clone()
            .unwrap_or_else(|| DEFAULT_SSH_USER.to_owned());

        machine.project_id = self.resolve_project(request.project.as_deref()).await?;
        self.check_region(&machine.project_id, &request.region)
            .await?;
        machine.region_name.clone_from(&request.region);
        machine.flavor_id = self.resolve_flavor(&machine.project_id, request).await?;
        machine.image_id = self.resolve_image(&machine.project_id, request).await?;
        debug!(
            project_id = %machine.project_id,
            flavor_id = %machine.flavor_id,
            image_id = %machine.image_id,
            "resolved provisioning resources"
        );

        self.ensure_key_pair(request, machine).await?;

        let created = self
            .api
            .create_instance(
                &machine.project_id,
                &NewInstance {
                    name: machine.machine_name.clone(),
                    flavor_id: machine.flavor_id.clone(),
                    image_id: machine.image_id.clone(),
                    region: machine.region_name.clone(),
                    ssh_key_id: machine.key_pair_id.clone(),
                    monthly_billing: request.billing.is_monthly(),
                },
            )
            .await?;
        machine.instance_id = created.id;
        let instance_id = require_instance_id(machine)?.to_owned();
        info!(instance_id = %instance_id, machine = %machine.machine_name, "instance created");

        let instance = self
            .wait_until_active(&machine.project_id, &instance_id)
            .await?;
        let address = public_address(&instance)?;
        machine.public_ip = Some(address);
        info!(instance_id = %instance_id, %address, "instance active");
        Ok(())
    }

    /// Fetches the instance and maps its provider state.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingInstanceId`] for machines that were
    /// never created and [`ProvisionError::Client`] when the lookup fails.
    pub async fn state(&self, machine: &ProvisionedMachine) -> Result<MachineState, ProvisionError> {
        let instance_id = require_instance_id(machine)?;
        let instance = self.api.instance(&machine.project_id, instance_id).await?;
        Ok(machine_state(&instance.status))
    }

    /// Deletes the instance, then the key pair when this machine owns it.
    /// Resources that are already gone count as deleted, so teardown can be
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Client`] when a delete fails with anything
    /// other than 404.
    pub async fn remove(&self, machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        if let Some(instance_id) = machine.instance_id() {
            self.api
                .delete_instance(&machine.project_id, instance_id)
                .await?;
            info!(instance_id, "instance deleted");
        } else {
            debug!(machine = %machine.machine_name, "no instance to delete");
        }

        if !machine.owns_key_pair() {
            debug!(key_name = %machine.key_pair_name, "keeping SSH key");
            return Ok(());
        }
        if machine.key_pair_id.is_empty() {
            debug!(key_name = %machine.key_pair_name, "SSH key was never uploaded");
            return Ok(());
        }
        self.api
            .delete_ssh_key(&machine.project_id, &machine.key_pair_id)
            .await?;
        info!(key_id = %machine.key_pair_id, "SSH key deleted");
        Ok(())
    }

    /// Requests a soft reboot.
    ///
    /// # Errors
    ///
    /// See [`ProvisioningWorkflow::reboot`].
    pub async fn restart(&self, machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        self.reboot(machine, RebootKind::Soft).await
    }

    /// Requests a reboot of the given kind without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingInstanceId`] for machines that were
    /// never created and [`ProvisionError::Client`] when the call fails.
    pub async fn reboot(
        &self,
        machine: &ProvisionedMachine,
        kind: RebootKind,
    ) -> Result<(), ProvisionError> {
        let instance_id = require_instance_id(machine)?;
        self.api
            .reboot_instance(&machine.project_id, instance_id, kind)
            .await?;
        info!(instance_id, ?kind, "reboot requested");
        Ok(())
    }

    /// Not offered by the provider.
    ///
    /// # Errors
    ///
    /// Always returns [`ProvisionError::Unsupported`].
    pub const fn start(&self, _machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        Err(ProvisionError::unsupported("start"))
    }

    /// Not offered by the provider.
    ///
    /// # Errors
    ///
    /// Always returns [`ProvisionError::Unsupported`].
    pub const fn stop(&self, _machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        Err(ProvisionError::unsupported("stop"))
    }

    /// Not offered by the provider.
    ///
    /// # Errors
    ///
    /// Always returns [`ProvisionError::Unsupported`].
    pub const fn kill(&self, _machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        Err(ProvisionError::unsupported("kill"))
    }

    /// Not offered by the provider.
    ///
    /// # Errors
    ///
    /// Always returns [`ProvisionError::Unsupported`].
    pub const fn pause(&self, _machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        Err(ProvisionError::unsupported("pause"))
    }

    /// Not offered by the provider.
    ///
    /// # Errors
    ///
    /// Always returns [`ProvisionError::Unsupported`].
    pub const fn resume(&self, _machine: &ProvisionedMachine) -> Result<(), ProvisionError> {
        Err(ProvisionError::unsupported("resume"))
    }
}

fn require_instance_id(machine: &ProvisionedMachine) -> Result<&str, ProvisionError> {
    machine
        .instance_id()
        .ok_or_else(|| ProvisionError::MissingInstanceId {
            machine_name: machine.machine_name.clone(),
        })
}

#[cfg(test)]
mod tests;
