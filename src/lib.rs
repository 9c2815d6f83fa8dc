//! Signed OVH API client and public cloud instance provisioning.
//!
//! The crate resolves API credentials from arguments, environment and
//! `ovh.conf` files, signs every call the way the OVH API expects, and drives
//! a provisioning workflow (resolve → upload key → create → poll → address)
//! plus teardown and reboot for a persisted [`ProvisionedMachine`] record.

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod machine;
pub mod provision;
pub mod request;
pub mod test_support;

pub use api::{InstanceStatus, OvhApi, RebootKind};
pub use client::{ApiRequest, ApiResponse, ClientError, ReqwestTransport, SignedClient, Transport};
pub use config::{ConfigError, ProvisionConfig};
pub use credentials::{CredentialArgs, CredentialError, CredentialResolver, Credentials, Endpoint};
pub use machine::ProvisionedMachine;
pub use provision::{
    KeySource, MachineState, PollPolicy, ProvisionError, ProvisioningWorkflow, PublicKeyFile,
    StaticKey,
};
pub use request::{BillingMode, ProvisionRequest, ProvisionRequestBuilder, RequestError};
