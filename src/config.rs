//! Provisioning defaults loaded via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::request::{BillingMode, ProvisionRequest};

/// Request defaults derived from environment variables, configuration files
/// and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "OVH",
    discovery(
        app_name = "ovh-machine",
        env_var = "OVH_MACHINE_CONFIG_PATH",
        config_file_name = "ovh-machine.toml",
        dotfile_name = ".ovh-machine.toml",
        project_file_name = "ovh-machine.toml"
    )
)]
pub struct ProvisionConfig {
    /// Project id or description. Required when the account holds more than
    /// one project.
    pub project: Option<String>,
    /// Region to create instances in. Defaults to `GRA1`.
    #[ortho_config(default = "GRA1".to_owned())]
    pub region: String,
    /// Flavor id or name. Defaults to `vps-ssd-1`.
    #[ortho_config(default = "vps-ssd-1".to_owned())]
    pub flavor: String,
    /// Image id or name. Defaults to `Ubuntu 14.04`.
    #[ortho_config(default = "Ubuntu 14.04".to_owned())]
    pub image: String,
    /// OS family flavors and images are restricted to.
    #[ortho_config(default = "linux".to_owned())]
    pub os_family: String,
    /// Existing key id or name to reuse instead of uploading a new key.
    pub ssh_key: Option<String>,
    /// Login user baked into the image.
    #[ortho_config(default = "admin".to_owned())]
    pub ssh_user: String,
    /// Selects monthly instead of hourly billing.
    #[ortho_config(default = false)]
    pub monthly_billing: bool,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, key: &'static str) -> Self {
        Self {
            description,
            env_var,
            key,
        }
    }
}

impl ProvisionConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to ovh-machine.toml",
                metadata.description, metadata.env_var, metadata.key
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ovh-machine")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Billing mode selected by [`Self::monthly_billing`].
    #[must_use]
    pub fn billing(&self) -> BillingMode {
        BillingMode::from(self.monthly_billing)
    }

    /// Builds a [`ProvisionRequest`] for `machine_name` from these defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails or `machine_name` is
    /// blank.
    pub fn as_request(&self, machine_name: &str) -> Result<ProvisionRequest, ConfigError> {
        self.validate()?;
        ProvisionRequest::builder()
            .machine_name(machine_name)
            .project(self.project.clone())
            .region(&self.region)
            .flavor(&self.flavor)
            .image(&self.image)
            .os_family(&self.os_family)
            .ssh_key(self.ssh_key.clone())
            .ssh_user(Some(self.ssh_user.clone()))
            .billing(self.billing())
            .build()
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.region,
            &FieldMetadata::new("region", "OVH_REGION", "region"),
        )?;
        Self::require_field(
            &self.flavor,
            &FieldMetadata::new("instance flavor", "OVH_FLAVOR", "flavor"),
        )?;
        Self::require_field(
            &self.image,
            &FieldMetadata::new("VM image", "OVH_IMAGE", "image"),
        )?;
        Self::require_field(
            &self.os_family,
            &FieldMetadata::new("OS family", "OVH_OS_FAMILY", "os_family"),
        )?;
        Self::require_field(
            &self.ssh_user,
            &FieldMetadata::new("SSH user", "OVH_SSH_USER", "ssh_user"),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
