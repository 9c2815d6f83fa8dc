//! Error taxonomy for the provisioning workflow.

use thiserror::Error;

use crate::api::InstanceStatus;
use crate::client::ClientError;
use crate::request::RequestError;

/// Customer console where projects, regions and keys are managed.
pub const CUSTOMER_CONSOLE: &str = "https://www.ovh.com/manager/cloud/index.html";
/// Provider name used in operator-facing messages.
pub const PROVIDER: &str = "OVH";

/// Errors raised while provisioning or managing a machine.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProvisionError {
    /// Transport or remote API failure.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Raised when the account has no project and none was selected.
    #[error("no project found on OVH cloud: create one at {console}", console = CUSTOMER_CONSOLE)]
    NoProject,
    /// Raised when several projects exist and none was selected.
    #[error(
        "{count} projects found on OVH cloud: select one with --ovh-project or OVH_PROJECT"
    )]
    MultipleProjects {
        /// Number of projects visible to the credentials.
        count: usize,
    },
    /// Raised when the project selector matches no id or description.
    #[error(
        "project '{selector}' does not exist on OVH cloud: to create or rename a project, visit {console}",
        console = CUSTOMER_CONSOLE
    )]
    ProjectNotFound {
        /// Selector supplied by the caller.
        selector: String,
    },
    /// Raised when the region is not enabled for the project.
    #[error(
        "region '{region}' is not available in project {project_id}: to list or enable regions, visit {console}",
        console = CUSTOMER_CONSOLE
    )]
    InvalidRegion {
        /// Region requested by the caller.
        region: String,
        /// Project that was searched.
        project_id: String,
    },
    /// Raised when no flavor matches the selector.
    #[error(
        "flavor '{selector}' does not exist for {os_family} in region {region}: to list flavors, visit {console}",
        console = CUSTOMER_CONSOLE
    )]
    FlavorNotFound {
        /// Selector supplied by the caller.
        selector: String,
        /// Region that was searched.
        region: String,
        /// OS family candidates were restricted to.
        os_family: String,
    },
    /// Raised when no image matches the selector.
    #[error(
        "image '{selector}' does not exist for {os_family} in region {region}: to list images, visit {console}",
        console = CUSTOMER_CONSOLE
    )]
    ImageNotFound {
        /// Selector supplied by the caller.
        selector: String,
        /// Region that was searched.
        region: String,
        /// OS family candidates were restricted to.
        os_family: String,
    },
    /// Raised when an operation needs an instance that was never created.
    #[error("machine '{machine_name}' has no instance id")]
    MissingInstanceId {
        /// Local machine name.
        machine_name: String,
    },
    /// Raised when the request is missing a required field.
    #[error("invalid provisioning request: missing or empty field {0}")]
    InvalidRequest(String),
    /// Raised when the attempt budget runs out before the instance settles.
    #[error(
        "instance {instance_id} did not reach {expected} after {attempts} polls (last observed {observed})"
    )]
    ConvergenceTimeout {
        /// Provider instance identifier.
        instance_id: String,
        /// State the workflow waited for.
        expected: InstanceStatus,
        /// Last state reported by the provider.
        observed: InstanceStatus,
        /// Polls issued before giving up.
        attempts: u32,
    },
    /// Raised when the provider reports a failed instance.
    #[error("instance {instance_id} entered {observed} while waiting for {expected}")]
    LifecycleFailure {
        /// Provider instance identifier.
        instance_id: String,
        /// State the workflow waited for.
        expected: InstanceStatus,
        /// Failure state reported by the provider.
        observed: InstanceStatus,
    },
    /// Raised when a running instance has no public address.
    #[error("instance {instance_id} is running but has no public IP address")]
    MissingPublicIp {
        /// Provider instance identifier.
        instance_id: String,
    },
    /// Raised when the key source cannot supply a public key.
    #[error("failed to obtain public key for '{key_name}': {message}")]
    KeySource {
        /// Key name the public key was requested for.
        key_name: String,
        /// Message returned by the key source.
        message: String,
    },
    /// Raised for lifecycle operations the provider does not offer.
    #[error("{operation} is not supported by the {provider} driver")]
    Unsupported {
        /// Operation that was requested.
        operation: &'static str,
        /// Provider name.
        provider: &'static str,
    },
}

impl ProvisionError {
    /// Builds the error returned by unsupported lifecycle operations.
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported {
            operation,
            provider: PROVIDER,
        }
    }
}

impl From<RequestError> for ProvisionError {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::Validation(field) => Self::InvalidRequest(field),
        }
    }
}
