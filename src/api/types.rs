//! Wire types exchanged with the public cloud API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public cloud project, as returned by `GET /cloud/project/{id}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Project {
    /// Project identifier.
    #[serde(rename = "project_id")]
    pub id: String,
    /// Human-readable description shown in the console.
    #[serde(rename = "description", default)]
    pub name: String,
    /// Provider status such as `ok` or `suspended`.
    #[serde(default)]
    pub status: String,
}

/// Instance flavor available in a region.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Flavor {
    /// Flavor identifier.
    pub id: String,
    /// Flavor name, for example `vps-ssd-1`.
    pub name: String,
    /// Region the flavor belongs to.
    #[serde(default)]
    pub region: String,
    /// OS family the flavor supports.
    #[serde(rename = "osType", default)]
    pub os_type: String,
    /// Virtual CPU count.
    #[serde(default)]
    pub vcpus: u32,
    /// Memory in GB.
    #[serde(default)]
    pub ram: u32,
    /// Disk size in GB.
    #[serde(default)]
    pub disk: u32,
}

/// Bootable image available in a region.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Image {
    /// Image identifier.
    pub id: String,
    /// Image name, for example `Ubuntu 14.04`.
    pub name: String,
    /// Region the image belongs to.
    #[serde(default)]
    pub region: String,
    /// OS family of the image.
    #[serde(rename = "type", default)]
    pub os_type: String,
    /// Provider status of the image.
    #[serde(default)]
    pub status: String,
}

/// SSH public key registered in a project.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SshKey {
    /// Key identifier.
    pub id: String,
    /// Key name.
    pub name: String,
    /// OpenSSH-formatted public key.
    #[serde(rename = "publicKey", default)]
    pub public_key: String,
    /// Regions the key is available in.
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Body of `POST /cloud/project/{p}/sshkey`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewSshKey {
    /// Name to register the key under.
    pub name: String,
    /// OpenSSH-formatted public key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Region restriction, omitted to register the key everywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Body of `POST /cloud/project/{p}/instance`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstance {
    /// Instance name.
    pub name: String,
    /// Flavor identifier.
    pub flavor_id: String,
    /// Image identifier.
    pub image_id: String,
    /// Region to create the instance in.
    pub region: String,
    /// Key installed for the default user.
    pub ssh_key_id: String,
    /// Selects monthly instead of hourly billing.
    pub monthly_billing: bool,
}

/// Address attached to an instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct IpAddress {
    /// Textual address.
    pub ip: String,
    /// Address kind, `public` or `private`.
    #[serde(rename = "type")]
    pub kind: String,
    /// IP version (4 or 6) when reported.
    #[serde(default)]
    pub version: Option<u8>,
}

/// Address kind that exposes an instance to the internet.
pub const PUBLIC_ADDRESS: &str = "public";

/// Instance as returned by `GET /cloud/project/{p}/instance/{id}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Instance {
    /// Instance identifier.
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Provider lifecycle state.
    #[serde(default)]
    pub status: InstanceStatus,
    /// Region hosting the instance.
    #[serde(default)]
    pub region: String,
    /// Addresses attached so far, in provider order.
    #[serde(rename = "ipAddresses", default)]
    pub ip_addresses: Vec<IpAddress>,
}

/// Provider lifecycle state of an instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "String")]
pub enum InstanceStatus {
    /// Instance is being built.
    Building,
    /// Instance is running.
    Active,
    /// Instance failed.
    Error,
    /// Instance is shut off.
    Shutoff,
    /// Instance is suspended to disk.
    Suspended,
    /// Instance is paused in memory.
    Paused,
    /// State outside the documented set.
    Unknown(String),
}

impl InstanceStatus {
    /// Wire spelling of the state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Building => "BUILDING",
            Self::Active => "ACTIVE",
            Self::Error => "ERROR",
            Self::Shutoff => "SHUTOFF",
            Self::Suspended => "SUSPENDED",
            Self::Paused => "PAUSED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Default for InstanceStatus {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for InstanceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BUILDING" => Self::Building,
            "ACTIVE" => Self::Active,
            "ERROR" => Self::Error,
            "SHUTOFF" => Self::Shutoff,
            "SUSPENDED" => Self::Suspended,
            "PAUSED" => Self::Paused,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reboot flavour accepted by the reboot endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootKind {
    /// Asks the guest OS to restart.
    Soft,
    /// Power-cycles the instance.
    Hard,
}

/// Body of `POST /cloud/project/{p}/instance/{id}/reboot`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RebootRequest {
    /// Reboot flavour.
    #[serde(rename = "type")]
    pub kind: RebootKind,
}
