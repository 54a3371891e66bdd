// crates/consul-itest-clients/src/platform.rs
// ============================================================================
// Module: Kubernetes Platform Client
// Description: StatefulSet, pod, and workload image operations via kube.
// Purpose: Implement the platform contract against the Kubernetes API.
// Dependencies: kube, k8s-openapi, serde_json
// ============================================================================

//! ## Overview
//! Uses the in-cluster service account or the local kubeconfig
//! (`kube::Client::try_default`). Scaling patches `spec.replicas` directly.
//! Pods are located by IP through the `status.podIP` field selector.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Debug;

use async_trait::async_trait;
use consul_itest_core::ClientError;
use consul_itest_core::interfaces::Platform;
use consul_itest_core::interfaces::ResourceKind;
use consul_itest_core::interfaces::Service;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::core::v1::PodSpec;
use kube::Api;
use kube::Client;
use kube::Resource;
use kube::api::DeleteParams;
use kube::api::ListParams;
use kube::api::Patch;
use kube::api::PatchParams;
use serde::de::DeserializeOwned;
use serde_json::json;

const SERVICE: Service = Service::Kubernetes;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Kubernetes-backed platform client.
#[derive(Clone)]
pub struct KubePlatform {
    /// Kubernetes API client.
    client: Client,
}

impl KubePlatform {
    /// Connects using the in-cluster environment or the local kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Setup`] when no configuration can be inferred.
    pub async fn connect() -> Result<Self, ClientError> {
        let client = Client::try_default().await.map_err(|err| ClientError::Setup {
            service: SERVICE,
            message: err.to_string(),
        })?;
        Ok(Self::from_client(client))
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self {
            client,
        }
    }

    /// Returns a namespaced API handle.
    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Fetches one namespaced object.
    async fn fetch<K>(&self, namespace: &str, name: &str, kind: &str) -> Result<K, ClientError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        self.api::<K>(namespace).get(name).await.map_err(|err| kube_error(&err, kind, name))
    }

    /// Returns the pod spec of a workload.
    async fn pod_spec(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<PodSpec>, ClientError> {
        let label = kind.as_str();
        let spec = match kind {
            ResourceKind::Deployment => self
                .fetch::<Deployment>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.template.spec),
            ResourceKind::StatefulSet => self
                .fetch::<StatefulSet>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.template.spec),
            ResourceKind::DaemonSet => self
                .fetch::<DaemonSet>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.template.spec),
            ResourceKind::ReplicaSet => self
                .fetch::<ReplicaSet>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.template)
                .and_then(|template| template.spec),
            ResourceKind::Job => self
                .fetch::<Job>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.template.spec),
            ResourceKind::CronJob => self
                .fetch::<CronJob>(namespace, name, label)
                .await?
                .spec
                .and_then(|spec| spec.job_template.spec)
                .and_then(|job| job.template.spec),
            ResourceKind::Pod => self.fetch::<Pod>(namespace, name, label).await?.spec,
        };
        Ok(spec)
    }
}

impl Debug for KubePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubePlatform").finish_non_exhaustive()
    }
}

/// Maps a kube failure, turning 404 answers into [`ClientError::NotFound`].
fn kube_error(err: &kube::Error, kind: &str, name: &str) -> ClientError {
    match err {
        kube::Error::Api(response) if response.code == 404 => ClientError::NotFound {
            service: SERVICE,
            what: format!("{kind} {name}"),
        },
        other => ClientError::Transport {
            service: SERVICE,
            message: format!("{kind} {name}: {other}"),
        },
    }
}

/// Returns the image of `container` in a pod spec, init containers included.
#[must_use]
pub fn container_image_in(spec: &PodSpec, container: &str) -> Option<String> {
    spec.containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
        .find(|candidate| candidate.name == container)
        .and_then(|candidate| candidate.image.clone())
}

#[async_trait]
impl Platform for KubePlatform {
    async fn stateful_set_replicas(&self, name: &str, namespace: &str) -> Result<i32, ClientError> {
        let set = self.fetch::<StatefulSet>(namespace, name, "statefulset").await?;
        Ok(set.spec.and_then(|spec| spec.replicas).unwrap_or(1))
    }

    async fn stateful_set_ready_replicas(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<i32, ClientError> {
        let set = self.fetch::<StatefulSet>(namespace, name, "statefulset").await?;
        Ok(set.status.and_then(|status| status.ready_replicas).unwrap_or(0))
    }

    async fn scale_stateful_set(
        &self,
        name: &str,
        namespace: &str,
        replicas: i32,
    ) -> Result<(), ClientError> {
        let patch = json!({ "spec": { "replicas": replicas } });
        self.api::<StatefulSet>(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|err| kube_error(&err, "statefulset", name))?;
        Ok(())
    }

    async fn delete_pod_by_ip(&self, ip: &str, namespace: &str) -> Result<(), ClientError> {
        let pods = self.api::<Pod>(namespace);
        let selector = format!("status.podIP={ip}");
        let matching = pods
            .list(&ListParams::default().fields(&selector))
            .await
            .map_err(|err| kube_error(&err, "pods with IP", ip))?;
        if matching.items.is_empty() {
            return Err(ClientError::NotFound {
                service: SERVICE,
                what: format!("pod with IP {ip} in {namespace}"),
            });
        }
        for pod in matching.items {
            let Some(name) = pod.metadata.name else {
                continue;
            };
            pods.delete(&name, &DeleteParams::default())
                .await
                .map_err(|err| kube_error(&err, "pod", &name))?;
        }
        Ok(())
    }

    async fn container_image(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
        container: &str,
    ) -> Result<String, ClientError> {
        let spec = self.pod_spec(kind, name, namespace).await?;
        spec.as_ref().and_then(|spec| container_image_in(spec, container)).ok_or_else(|| {
            ClientError::NotFound {
                service: SERVICE,
                what: format!("container {container} in {kind}/{name}"),
            }
        })
    }
}
