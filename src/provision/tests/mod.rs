//! Unit tests for the provisioning workflow.

use std::time::Duration;

use reqwest::Method;
use serde_json::json;

use super::{PollPolicy, ProvisioningWorkflow, StaticKey};
use crate::api::OvhApi;
use crate::machine::ProvisionedMachine;
use crate::request::ProvisionRequest;
use crate::test_support::{
    ScriptedTransport, TEST_PROJECT, TEST_REGION, instance_json, scripted_client,
};

const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIHk2 m1@test";
const INSTANCE_PATH: &str = "/cloud/project/p1/instance/i-1";

fn transport() -> ScriptedTransport {
    let transport = ScriptedTransport::new();
    transport.push_server_time(0);
    transport
}

fn workflow(transport: &ScriptedTransport) -> ProvisioningWorkflow<ScriptedTransport, StaticKey> {
    ProvisioningWorkflow::new(OvhApi::new(scripted_client(transport)), StaticKey::new(PUBLIC_KEY))
        .with_poll_policy(PollPolicy {
            interval: Duration::from_secs(4),
            attempts: 5,
        })
}

fn request() -> ProvisionRequest {
    ProvisionRequest::builder()
        .machine_name("m1")
        .region(TEST_REGION)
        .flavor("vps-ssd-1")
        .image("Ubuntu 14.04")
        .os_family("linux")
        .build()
        .unwrap_or_else(|err| panic!("request: {err}"))
}

fn created_machine() -> ProvisionedMachine {
    ProvisionedMachine {
        project_id: String::from(TEST_PROJECT),
        region_name: String::from(TEST_REGION),
        instance_id: String::from("i-1"),
        ..ProvisionedMachine::new("m1")
    }
}

fn push_instance_states(transport: &ScriptedTransport, states: &[&str]) {
    for state in states {
        transport.push_json(
            Method::GET,
            INSTANCE_PATH,
            200,
            &instance_json("i-1", state, &[("10.0.0.4", "private"), ("203.0.113.7", "public")]),
        );
    }
}

fn push_create(transport: &ScriptedTransport) {
    transport.push_json(
        Method::POST,
        "/cloud/project/p1/sshkey",
        200,
        &json!({"id": "k-new", "name": "ignored", "publicKey": PUBLIC_KEY}),
    );
    transport.push_json(
        Method::POST,
        "/cloud/project/p1/instance",
        200,
        &instance_json("i-1", "BUILDING", &[]),
    );
}

mod teardown;
