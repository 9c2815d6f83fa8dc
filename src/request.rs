//! Declarative description of the machine to provision.

use thiserror::Error;

/// How the provider bills the instance.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BillingMode {
    /// Pay per hour of uptime.
    #[default]
    Hourly,
    /// Flat monthly price.
    Monthly,
}

impl BillingMode {
    /// Reports whether monthly billing is selected.
    #[must_use]
    pub const fn is_monthly(self) -> bool {
        matches!(self, Self::Monthly)
    }
}

impl From<bool> for BillingMode {
    fn from(monthly: bool) -> Self {
        if monthly { Self::Monthly } else { Self::Hourly }
    }
}

/// Parameters required to provision one machine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionRequest {
    /// Local machine name; also used as the instance name and key prefix.
    pub machine_name: String,
    /// Project id or description. When absent exactly one project must exist.
    pub project: Option<String>,
    /// Region name (for example `GRA1`).
    pub region: String,
    /// Flavor id or name.
    pub flavor: String,
    /// Image id or name.
    pub image: String,
    /// OS family flavors and images must belong to.
    pub os_family: String,
    /// Existing key id or name to reuse instead of uploading a new one.
    pub ssh_key: Option<String>,
    /// Login user baked into the image, when it differs from `admin`.
    pub ssh_user: Option<String>,
    /// Billing mode for the instance.
    pub billing: BillingMode,
}

impl ProvisionRequest {
    /// Starts a builder for a [`ProvisionRequest`].
    #[must_use]
    pub fn builder() -> ProvisionRequestBuilder {
        ProvisionRequestBuilder::new()
    }

    /// Validates the request, naming the first empty required field.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] when a required field is empty.
    pub fn validate(&self) -> Result<(), RequestError> {
        let required = [
            ("machine_name", &self.machine_name),
            ("region", &self.region),
            ("flavor", &self.flavor),
            ("image", &self.image),
            ("os_family", &self.os_family),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(RequestError::Validation(field.to_owned()));
            }
        }
        Ok(())
    }
}

/// Builder for [`ProvisionRequest`] that trims inputs and validates on build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProvisionRequestBuilder {
    machine_name: String,
    project: Option<String>,
    region: String,
    flavor: String,
    image: String,
    os_family: String,
    ssh_key: Option<String>,
    ssh_user: Option<String>,
    billing: BillingMode,
}

impl ProvisionRequestBuilder {
    /// Creates an empty builder; required fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the machine name.
    #[must_use]
    pub fn machine_name(mut self, value: impl Into<String>) -> Self {
        self.machine_name = value.into();
        self
    }

    /// Sets the optional project selector.
    #[must_use]
    pub fn project(mut self, value: Option<String>) -> Self {
        self.project = value;
        self
    }

    /// Sets the region.
    #[must_use]
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = value.into();
        self
    }

    /// Sets the flavor selector.
    #[must_use]
    pub fn flavor(mut self, value: impl Into<String>) -> Self {
        self.flavor = value.into();
        self
    }

    /// Sets the image selector.
    #[must_use]
    pub fn image(mut self, value: impl Into<String>) -> Self {
        self.image = value.into();
        self
    }

    /// Sets the OS family.
    #[must_use]
    pub fn os_family(mut self, value: impl Into<String>) -> Self {
        self.os_family = value.into();
        self
    }

    /// Sets the optional key selector.
    #[must_use]
    pub fn ssh_key(mut self, value: Option<String>) -> Self {
        self.ssh_key = value;
        self
    }

    /// Sets the optional SSH login user.
    #[must_use]
    pub fn ssh_user(mut self, value: Option<String>) -> Self {
        self.ssh_user = value;
        self
    }

    /// Sets the billing mode.
    #[must_use]
    pub const fn billing(mut self, value: BillingMode) -> Self {
        self.billing = value;
        self
    }

    /// Builds and validates the request. Optional selectors that are blank
    /// after trimming are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] when a required field is empty.
    pub fn build(self) -> Result<ProvisionRequest, RequestError> {
        let request = ProvisionRequest {
            machine_name: self.machine_name.trim().to_owned(),
            project: trim_optional(self.project),
            region: self.region.trim().to_owned(),
            flavor: self.flavor.trim().to_owned(),
            image: self.image.trim().to_owned(),
            os_family: self.os_family.trim().to_owned(),
            ssh_key: trim_optional(self.ssh_key),
            ssh_user: trim_optional(self.ssh_user),
            billing: self.billing,
        };
        request.validate()?;
        Ok(request)
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Errors raised while building a [`ProvisionRequest`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when a required field is missing.
    #[error("missing or empty field: {0}")]
    Validation(String),
}
