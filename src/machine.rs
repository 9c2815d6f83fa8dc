//! Durable record of a provisioned machine.
//!
//! The record starts empty and is filled in step by step while a machine is
//! provisioned. Collaborators persist it between invocations and hand it back
//! for state queries, reboots and teardown.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Port the Docker daemon listens on for TLS connections.
pub const DOCKER_PORT: u16 = 2376;
/// Login user of the stock images.
pub const DEFAULT_SSH_USER: &str = "admin";

/// Everything needed to find and clean up a provisioned machine.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ProvisionedMachine {
    /// Local machine name.
    pub machine_name: String,
    /// Project hosting the instance.
    pub project_id: String,
    /// Region hosting the instance.
    pub region_name: String,
    /// Resolved flavor identifier.
    pub flavor_id: String,
    /// Resolved image identifier.
    pub image_id: String,
    /// Provider instance id, set once creation succeeded.
    pub instance_id: String,
    /// Name of the key installed on the instance.
    pub key_pair_name: String,
    /// Provider id of that key.
    pub key_pair_id: String,
    /// Set when the key was uploaded for this machine.
    pub key_pair_generated: bool,
    /// Public address, once known.
    pub public_ip: Option<IpAddr>,
    /// SSH login user; empty means [`DEFAULT_SSH_USER`].
    pub ssh_user: String,
}

impl ProvisionedMachine {
    /// Creates an empty record for `machine_name`.
    #[must_use]
    pub fn new(machine_name: impl Into<String>) -> Self {
        Self {
            machine_name: machine_name.into(),
            ..Self::default()
        }
    }

    /// Prefix carried by key names generated for this machine.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        format!("{}-", self.machine_name)
    }

    /// Reports whether teardown may delete the key pair.
    ///
    /// Only keys uploaded for this machine qualify; keys supplied by the
    /// caller are never deleted.
    #[must_use]
    pub fn owns_key_pair(&self) -> bool {
        self.key_pair_generated
            && !self.machine_name.is_empty()
            && self.key_pair_name.starts_with(&self.key_prefix())
    }

    /// Instance id, or `None` before creation succeeded.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        Some(self.instance_id.as_str()).filter(|id| !id.is_empty())
    }

    /// Docker daemon URL (`tcp://<ip>:2376`), empty until an address is known.
    #[must_use]
    pub fn docker_url(&self) -> String {
        self.public_ip.map_or_else(String::new, |ip| match ip {
            IpAddr::V4(v4) => format!("tcp://{v4}:{DOCKER_PORT}"),
            IpAddr::V6(v6) => format!("tcp://[{v6}]:{DOCKER_PORT}"),
        })
    }

    /// User SSH clients should log in as.
    #[must_use]
    pub fn ssh_username(&self) -> &str {
        if self.ssh_user.is_empty() {
            DEFAULT_SSH_USER
        } else {
            &self.ssh_user
        }
    }

    /// Address SSH clients should connect to.
    #[must_use]
    pub const fn ssh_hostname(&self) -> Option<IpAddr> {
        self.public_ip
    }
}
