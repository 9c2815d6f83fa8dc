//! Convergence polling and address selection.

use std::net::IpAddr;

use tokio::time::sleep;
use tracing::debug;

use crate::api::{Instance, InstanceStatus, PUBLIC_ADDRESS};
use crate::client::Transport;

use super::{KeySource, ProvisionError, ProvisioningWorkflow};

/// First address typed `public` that parses as an IP, wherever it sits in
/// the list.
///
/// # Errors
///
/// Returns [`ProvisionError::MissingPublicIp`] when the instance has none.
pub fn public_address(instance: &Instance) -> Result<IpAddr, ProvisionError> {
    instance
        .ip_addresses
        .iter()
        .filter(|address| address.kind == PUBLIC_ADDRESS)
        .find_map(|address| address.ip.parse().ok())
        .ok_or_else(|| ProvisionError::MissingPublicIp {
            instance_id: instance.id.clone(),
        })
}

impl<T: Transport, K: KeySource> ProvisioningWorkflow<T, K> {
    /// Polls the instance until it is `ACTIVE`, sleeping only between
    /// attempts.
    pub(super) async fn wait_until_active(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<Instance, ProvisionError> {
        let attempts = self.poll.attempts.max(1);
        let mut observed = InstanceStatus::default();

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(self.poll.interval).await;
            }

            let instance = self.api.instance(project_id, instance_id).await?;
            match instance.status {
                InstanceStatus::Active => return Ok(instance),
                InstanceStatus::Error => {
                    return Err(ProvisionError::LifecycleFailure {
                        instance_id: instance_id.to_owned(),
                        expected: InstanceStatus::Active,
                        observed: InstanceStatus::Error,
                    });
                }
                status => {
                    debug!(instance_id, attempt, status = %status, "instance not active yet");
                    observed = status;
                }
            }
        }

        Err(ProvisionError::ConvergenceTimeout {
            instance_id: instance_id.to_owned(),
            expected: InstanceStatus::Active,
            observed,
            attempts,
        })
    }
}
