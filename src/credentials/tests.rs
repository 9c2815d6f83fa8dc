//! Tests for credential resolution precedence.

use std::collections::BTreeMap;
use std::fs;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::test_support::EnvGuard;

struct Layers {
    _tmp: TempDir,
    system: Utf8PathBuf,
    user: Utf8PathBuf,
    local: Utf8PathBuf,
}

impl Layers {
    fn files(&self) -> Vec<Utf8PathBuf> {
        vec![self.system.clone(), self.user.clone(), self.local.clone()]
    }

    fn write(path: &Utf8PathBuf, contents: &str) {
        fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
    }
}

#[fixture]
fn layers() -> Layers {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp dir should be utf8: {}", path.display()));
    Layers {
        system: root.join("etc-ovh.conf"),
        user: root.join("home-ovh.conf"),
        local: root.join("ovh.conf"),
        _tmp: tmp,
    }
}

fn env(pairs: &[(&str, &str)]) -> EnvSource {
    EnvSource::Fixed(
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn no_env() -> EnvSource {
    env(&[])
}

fn args(application_key: &str) -> CredentialArgs {
    CredentialArgs {
        endpoint: String::from("ovh-eu"),
        application_key: application_key.to_owned(),
        ..CredentialArgs::default()
    }
}

#[rstest]
fn explicit_argument_beats_environment_and_files(layers: Layers) {
    Layers::write(&layers.local, "[ovh-eu]\napplication_key = from-file\n");
    let resolver = CredentialResolver::new(
        layers.files(),
        env(&[("OVH_APPLICATION_KEY", "from-env")]),
    );

    let creds = resolver
        .resolve(args("explicit"))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.application_key(), "explicit");
}

#[rstest]
fn environment_beats_files(layers: Layers) {
    Layers::write(&layers.local, "[ovh-eu]\napplication_key = from-file\n");
    let resolver = CredentialResolver::new(
        layers.files(),
        env(&[("OVH_APPLICATION_KEY", "from-env")]),
    );

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.application_key(), "from-env");
}

#[rstest]
fn empty_environment_value_counts_as_unset(layers: Layers) {
    Layers::write(&layers.user, "[ovh-eu]\napplication_key = from-file\n");
    let resolver =
        CredentialResolver::new(layers.files(), env(&[("OVH_APPLICATION_KEY", "")]));

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.application_key(), "from-file");
}

#[rstest]
fn later_file_overrides_earlier_file(layers: Layers) {
    Layers::write(
        &layers.system,
        "[ovh-eu]\napplication_key = system\napplication_secret = system-secret\n",
    );
    Layers::write(&layers.user, "[ovh-eu]\napplication_key = user\n");
    let resolver = CredentialResolver::new(layers.files(), no_env());

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.application_key(), "user");
    assert_eq!(creds.application_secret(), "system-secret");
}

#[rstest]
fn earlier_file_used_when_nothing_overrides_it(layers: Layers) {
    Layers::write(&layers.system, "[ovh-eu]\nconsumer_key = system-ck\n");
    let resolver = CredentialResolver::new(layers.files(), no_env());

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.consumer_key(), "system-ck");
}

#[rstest]
fn unresolved_fields_stay_empty(layers: Layers) {
    let resolver = CredentialResolver::new(layers.files(), no_env());

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.application_key(), "");
    assert_eq!(creds.application_secret(), "");
    assert_eq!(creds.consumer_key(), "");
}

#[rstest]
fn endpoint_comes_from_default_section_and_selects_key_section(layers: Layers) {
    Layers::write(
        &layers.local,
        "[default]\nendpoint = ovh-ca\n\n[ovh-eu]\napplication_key = eu-key\n\n[ovh-ca]\napplication_key = ca-key\n",
    );
    let resolver = CredentialResolver::new(layers.files(), no_env());

    let creds = resolver
        .resolve(CredentialArgs::default())
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.endpoint().name(), "ovh-ca");
    assert_eq!(creds.endpoint().url(), "https://ca.api.ovh.com/1.0");
    assert_eq!(creds.application_key(), "ca-key");
}

#[rstest]
fn endpoint_environment_beats_default_section(layers: Layers) {
    Layers::write(&layers.local, "[default]\nendpoint = ovh-ca\n");
    let resolver = CredentialResolver::new(layers.files(), env(&[("OVH_ENDPOINT", "kimsufi-eu")]));

    let creds = resolver
        .resolve(CredentialArgs::default())
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.endpoint().url(), "https://eu.api.kimsufi.com/1.0");
}

#[rstest]
#[case("ovh-eu", "https://eu.api.ovh.com/1.0")]
#[case("soyoustart-ca", "https://ca.api.soyoustart.com/1.0")]
#[case("runabove-ca", "https://api.runabove.com/1.0")]
#[case("http://127.0.0.1:8080/1.0", "http://127.0.0.1:8080/1.0")]
fn endpoint_identifiers_resolve(#[case] identifier: &str, #[case] expected: &str) {
    let endpoint = Endpoint::resolve(identifier).unwrap_or_else(|err| panic!("resolve: {err}"));
    assert_eq!(endpoint.url(), expected);
}

#[rstest]
#[case("")]
#[case("ovh-us")]
fn unknown_endpoint_is_rejected(#[case] identifier: &str) {
    let err = Endpoint::resolve(identifier).expect_err("identifier should be rejected");
    assert_eq!(
        err,
        CredentialError::UnknownEndpoint {
            identifier: identifier.to_owned()
        }
    );
}

#[rstest]
fn malformed_file_is_reported_with_its_path(layers: Layers) {
    Layers::write(&layers.user, "[ovh-eu\napplication_key = broken\n");
    let resolver = CredentialResolver::new(layers.files(), no_env());

    let err = resolver.resolve(args("")).expect_err("parse should fail");

    let CredentialError::Parse { path, .. } = err else {
        panic!("expected parse error, got {err:?}");
    };
    assert_eq!(path, layers.user);
}

#[rstest]
fn debug_output_redacts_secrets() {
    let endpoint = Endpoint::resolve("ovh-eu").unwrap_or_else(|err| panic!("resolve: {err}"));
    let creds = Credentials::new(endpoint, "ak", "very-secret", "very-consumer");
    let rendered = format!("{creds:?}");
    assert!(!rendered.contains("very-secret"));
    assert!(!rendered.contains("very-consumer"));
}

#[rstest]
fn env_var_names_are_prefixed_and_uppercased() {
    assert_eq!(env_var_name("application_secret"), "OVH_APPLICATION_SECRET");
}

#[tokio::test]
async fn process_environment_is_consulted() {
    let _guard = EnvGuard::set_var("OVH_CONSUMER_KEY", "process-ck").await;
    let resolver = CredentialResolver::new(Vec::new(), EnvSource::Process);

    let creds = resolver
        .resolve(args(""))
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(creds.consumer_key(), "process-ck");
}
