//! # Kubernetes Pod Discovery
//!
//! Lists Vault pods through the Kubernetes API using the in-cluster service
//! account (or the local kubeconfig when running outside the cluster).

use super::{Instance, InstanceDirectory};
use crate::config::UnsealerConfig;
use crate::constants::POD_PHASE_RUNNING;
use crate::error::DiscoveryError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, ListParams},
    Client,
};
use std::time::Duration;
use tracing::debug;

/// [`InstanceDirectory`] backed by the Kubernetes pod list API
pub struct KubeDirectory {
    client: Client,
    port: u16,
    service_name: String,
    timeout: Duration,
}

impl std::fmt::Debug for KubeDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeDirectory")
            .field("port", &self.port)
            .field("service_name", &self.service_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl KubeDirectory {
    pub fn new(client: Client, config: &UnsealerConfig) -> Self {
        Self {
            client,
            port: config.vault_port,
            service_name: config.service_name.clone(),
            timeout: config.discovery_timeout,
        }
    }
}

#[async_trait]
impl InstanceDirectory for KubeDirectory {
    async fn list_instances(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Instance>, DiscoveryError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(label_selector);

        let list = tokio::time::timeout(self.timeout, pods.list(&params))
            .await
            .map_err(|_elapsed| DiscoveryError::Timeout(self.timeout))??;

        debug!(
            namespace = namespace,
            selector = label_selector,
            "API returned {} pod(s)",
            list.items.len()
        );

        Ok(instances_from_pods(
            &list.items,
            namespace,
            &self.service_name,
            self.port,
        ))
    }
}

/// Map listed pods to instances, keeping only running pods with an address
///
/// The API's ordering is preserved.
pub fn instances_from_pods(
    pods: &[Pod],
    namespace: &str,
    service_name: &str,
    port: u16,
) -> Vec<Instance> {
    pods.iter()
        .filter_map(|pod| {
            let name = pod.metadata.name.as_deref()?;
            let status = pod.status.as_ref()?;
            let ip = status.pod_ip.as_deref().filter(|ip| !ip.is_empty())?;

            if status.phase.as_deref() != Some(POD_PHASE_RUNNING) {
                debug!(pod = name, phase = ?status.phase, "Skipping pod that is not running");
                return None;
            }

            Some(Instance::new(name, namespace, ip, service_name, port))
        })
        .collect()
}
