//! Tests for teardown ownership and idempotence.

use reqwest::Method;
use rstest::rstest;

use super::{INSTANCE_PATH, created_machine, transport, workflow};
use crate::machine::ProvisionedMachine;

const KEY_PATH: &str = "/cloud/project/p1/sshkey/k1";

fn with_key(name: &str, generated: bool) -> ProvisionedMachine {
    ProvisionedMachine {
        key_pair_name: name.to_owned(),
        key_pair_id: String::from("k1"),
        key_pair_generated: generated,
        ..created_machine()
    }
}

#[rstest]
#[case(with_key("m1-5e1f0c", true), 1)]
#[case(with_key("m1-5e1f0c", false), 0)]
#[case(with_key("team-key", true), 0)]
#[case(with_key("team-key", false), 0)]
#[tokio::test]
async fn only_generated_keys_are_deleted(
    #[case] machine: ProvisionedMachine,
    #[case] key_deletes: usize,
) {
    let transport = transport();
    transport.push_status(Method::DELETE, INSTANCE_PATH, 200);
    transport.push_status(Method::DELETE, KEY_PATH, 200);

    workflow(&transport)
        .remove(&machine)
        .await
        .unwrap_or_else(|err| panic!("remove: {err}"));

    assert_eq!(transport.calls_to(&Method::DELETE, INSTANCE_PATH), 1);
    assert_eq!(transport.calls_to(&Method::DELETE, KEY_PATH), key_deletes);
}

#[tokio::test]
async fn already_deleted_resources_count_as_removed() {
    let transport = transport();
    transport.push_api_error(Method::DELETE, INSTANCE_PATH, 404, "instance not found");
    transport.push_api_error(Method::DELETE, KEY_PATH, 404, "key not found");
    let machine = with_key("m1-5e1f0c", true);
    let flow = workflow(&transport);

    let first = flow.remove(&machine).await;
    let second = flow.remove(&machine).await;

    assert_eq!(first, Ok(()));
    assert_eq!(second, Ok(()));
    assert_eq!(transport.calls_to(&Method::DELETE, KEY_PATH), 2);
}

#[tokio::test]
async fn empty_record_issues_no_calls() {
    let transport = transport();

    workflow(&transport)
        .remove(&ProvisionedMachine::new("m1"))
        .await
        .unwrap_or_else(|err| panic!("remove: {err}"));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn instance_delete_failure_keeps_the_key() {
    let transport = transport();
    transport.push_api_error(Method::DELETE, INSTANCE_PATH, 403, "forbidden");
    transport.push_status(Method::DELETE, KEY_PATH, 200);

    let err = workflow(&transport)
        .remove(&with_key("m1-5e1f0c", true))
        .await
        .expect_err("403 must surface");

    assert_eq!(err.to_string(), "OVH API returned 403: forbidden");
    assert_eq!(transport.calls_to(&Method::DELETE, KEY_PATH), 0);
}
