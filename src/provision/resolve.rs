//! Project, region, flavor and image resolution.

use tracing::debug;

use crate::api::{Flavor, Image};
use crate::client::Transport;
use crate::request::ProvisionRequest;

use super::{KeySource, ProvisionError, ProvisioningWorkflow};

/// First flavor of `os_family` whose id or name equals `selector`.
#[must_use]
pub fn select_flavor<'a>(flavors: &'a [Flavor], selector: &str, os_family: &str) -> Option<&'a Flavor> {
    flavors
        .iter()
        .filter(|flavor| flavor.os_type == os_family)
        .find(|flavor| flavor.id == selector || flavor.name == selector)
}

/// First image of `os_family` whose id or name equals `selector`.
#[must_use]
pub fn select_image<'a>(images: &'a [Image], selector: &str, os_family: &str) -> Option<&'a Image> {
    images
        .iter()
        .filter(|image| image.os_type == os_family)
        .find(|image| image.id == selector || image.name == selector)
}

impl<T: Transport, K: KeySource> ProvisioningWorkflow<T, K> {
    /// Returns the id of the project selected by `selector`, or of the only
    /// project when no selector is given.
    pub(super) async fn resolve_project(
        &self,
        selector: Option<&str>,
    ) -> Result<String, ProvisionError> {
        let projects = self.api.projects().await?;

        let Some(wanted) = selector else {
            return match projects.as_slice() {
                [] => Err(ProvisionError::NoProject),
                [only] => Ok(only.clone()),
                many => Err(ProvisionError::MultipleProjects { count: many.len() }),
            };
        };

        if projects.iter().any(|id| id == wanted) {
            return Ok(wanted.to_owned());
        }

        for id in &projects {
            let project = self.api.project(id).await?;
            if project.name == wanted {
                debug!(project_id = %project.id, description = wanted, "matched project by description");
                return Ok(project.id);
            }
        }

        Err(ProvisionError::ProjectNotFound {
            selector: wanted.to_owned(),
        })
    }

    pub(super) async fn check_region(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<(), ProvisionError> {
        let regions = self.api.regions(project_id).await?;
        if regions.iter().any(|known| known == region) {
            return Ok(());
        }
        Err(ProvisionError::InvalidRegion {
            region: region.to_owned(),
            project_id: project_id.to_owned(),
        })
    }

    pub(super) async fn resolve_flavor(
        &self,
        project_id: &str,
        request: &ProvisionRequest,
    ) -> Result<String, ProvisionError> {
        let flavors = self.api.flavors(project_id, &request.region).await?;
        select_flavor(&flavors, &request.flavor, &request.os_family)
            .map(|flavor| flavor.id.clone())
            .ok_or_else(|| ProvisionError::FlavorNotFound {
                selector: request.flavor.clone(),
                region: request.region.clone(),
                os_family: request.os_family.clone(),
            })
    }

    pub(super) async fn resolve_image(
        &self,
        project_id: &str,
        request: &ProvisionRequest,
    ) -> Result<String, ProvisionError> {
        let images = self
            .api
            .images(project_id, &request.region, &request.os_family)
            .await?;
        select_image(&images, &request.image, &request.os_family)
            .map(|image| image.id.clone())
            .ok_or_else(|| ProvisionError::ImageNotFound {
                selector: request.image.clone(),
                region: request.region.clone(),
                os_family: request.os_family.clone(),
            })
    }
}
