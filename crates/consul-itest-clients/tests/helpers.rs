// crates/consul-itest-clients/tests/helpers.rs
// ============================================================================
// Module: Adapter Helper Tests
// Description: S3 prefixes and pod spec image lookups.
// ============================================================================

//! S3 prefixes and pod spec image lookups.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use consul_itest_clients::platform::container_image_in;
use consul_itest_clients::s3::object_prefix;
use consul_itest_core::interfaces::BackupId;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::core::v1::PodSpec;

fn container(name: &str, image: &str) -> Container {
    Container {
        name: name.to_string(),
        image: Some(image.to_string()),
        ..Container::default()
    }
}

#[test]
fn object_prefix_drops_leading_slash() {
    let id = BackupId::new("20240101T120000");
    assert_eq!(
        object_prefix("/opt/consul/backup-storage", &id),
        "opt/consul/backup-storage/20240101T120000"
    );
    assert_eq!(
        object_prefix("/opt/consul/backup-storage/granular/", &id),
        "opt/consul/backup-storage/granular/20240101T120000"
    );
    assert_eq!(object_prefix("/", &id), "20240101T120000");
}

#[test]
fn container_image_searches_regular_then_init_containers() {
    let spec = PodSpec {
        containers: vec![
            container("consul", "registry/consul:1.20.1"),
            container("sidecar", "registry/envoy:1.31"),
        ],
        init_containers: Some(vec![container("init-acl", "registry/acl-init:0.4.2")]),
        ..PodSpec::default()
    };

    assert_eq!(container_image_in(&spec, "consul").as_deref(), Some("registry/consul:1.20.1"));
    assert_eq!(container_image_in(&spec, "init-acl").as_deref(), Some("registry/acl-init:0.4.2"));
    assert_eq!(container_image_in(&spec, "missing"), None);
}

#[test]
fn container_without_image_reads_as_none() {
    let spec = PodSpec {
        containers: vec![Container {
            name: "consul".to_string(),
            ..Container::default()
        }],
        ..PodSpec::default()
    };
    assert_eq!(container_image_in(&spec, "consul"), None);
}
