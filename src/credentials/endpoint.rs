//! Named API endpoints.

use super::CredentialError;

/// Known endpoint identifiers and the base URL each one selects.
pub const ENDPOINTS: [(&str, &str); 7] = [
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
    ("runabove-ca", "https://api.runabove.com/1.0"),
];

/// Base URL of a regional API deployment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    name: String,
    url: String,
}

impl Endpoint {
    /// Resolves an identifier into a base URL.
    ///
    /// Identifiers containing `/` are taken as literal URLs; anything else
    /// must name an entry of [`ENDPOINTS`].
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::UnknownEndpoint`] when the identifier is
    /// neither a URL nor a known name.
    pub fn resolve(identifier: &str) -> Result<Self, CredentialError> {
        let name = identifier.trim();
        if name.contains('/') {
            return Ok(Self {
                name: name.to_owned(),
                url: name.to_owned(),
            });
        }

        ENDPOINTS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(known, url)| Self {
                name: (*known).to_owned(),
                url: (*url).to_owned(),
            })
            .ok_or_else(|| CredentialError::UnknownEndpoint {
                identifier: name.to_owned(),
            })
    }

    /// Identifier the endpoint was resolved from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}
