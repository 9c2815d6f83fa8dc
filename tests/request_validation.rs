//! Unit tests for provisioning request construction and validation.

#[path = "common/test_constants.rs"]
mod test_constants;

use ovh_machine::{BillingMode, ProvisionRequest, RequestError};
use test_constants::{DEFAULT_FLAVOR, DEFAULT_IMAGE, DEFAULT_REGION};

fn baseline() -> ProvisionRequest {
    ProvisionRequest::builder()
        .machine_name("m1")
        .region(DEFAULT_REGION)
        .flavor(DEFAULT_FLAVOR)
        .image(DEFAULT_IMAGE)
        .os_family("linux")
        .build()
        .unwrap_or_else(|err| panic!("baseline request should be valid: {err}"))
}

#[test]
fn validate_rejects_empty_fields() {
    let error = ProvisionRequest::builder()
        .build()
        .expect_err("validation should fail");
    assert_eq!(error, RequestError::Validation(String::from("machine_name")));
}

#[test]
fn validate_rejects_other_missing_fields() {
    let base = baseline();

    let cases = [
        (
            "region",
            ProvisionRequest {
                region: String::new(),
                ..base.clone()
            },
        ),
        (
            "flavor",
            ProvisionRequest {
                flavor: String::new(),
                ..base.clone()
            },
        ),
        (
            "image",
            ProvisionRequest {
                image: String::new(),
                ..base.clone()
            },
        ),
        (
            "os_family",
            ProvisionRequest {
                os_family: String::new(),
                ..base.clone()
            },
        ),
    ];

    for (field, request) in cases {
        let error = request.validate().expect_err("field should be required");
        assert_eq!(error, RequestError::Validation(field.to_owned()));
    }
}

#[test]
fn builder_trims_whitespace() {
    let error = ProvisionRequest::builder()
        .machine_name("  ")
        .region("  ")
        .flavor("  ")
        .image("  ")
        .os_family("  ")
        .build()
        .expect_err("whitespace-only values should fail");
    assert_eq!(error, RequestError::Validation(String::from("machine_name")));
}

#[test]
fn blank_optional_selectors_become_absent() {
    let request = ProvisionRequest::builder()
        .machine_name(" m1 ")
        .project(Some(String::from("   ")))
        .region(DEFAULT_REGION)
        .flavor(DEFAULT_FLAVOR)
        .image(format!(" {DEFAULT_IMAGE} "))
        .os_family("linux")
        .ssh_key(Some(String::from(" team-key ")))
        .build()
        .unwrap_or_else(|err| panic!("request should build: {err}"));

    assert_eq!(request.machine_name, "m1");
    assert_eq!(request.project, None);
    assert_eq!(request.image, DEFAULT_IMAGE);
    assert_eq!(request.ssh_key.as_deref(), Some("team-key"));
}

#[test]
fn billing_defaults_to_hourly() {
    assert_eq!(baseline().billing, BillingMode::Hourly);
    assert!(BillingMode::from(true).is_monthly());
    assert!(!BillingMode::from(false).is_monthly());
}
