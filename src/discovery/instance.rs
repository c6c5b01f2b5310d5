//! # Vault Instances
//!
//! Addressing of a discovered Vault pod, either by pod IP or by its DNS name
//! under the headless service.

use serde::Serialize;

/// One running Vault replica, valid for a single cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    /// Pod name, used to correlate results across cycles
    pub name: String,
    pub namespace: String,
    /// Pod IP reported by the API server
    pub ip: String,
    /// Stable per-pod DNS label under the headless service (`{pod}.{service}`)
    pub service_name: String,
    pub port: u16,
}

impl Instance {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        ip: impl Into<String>,
        headless_service: &str,
        port: u16,
    ) -> Self {
        let name = name.into();
        Self {
            service_name: format!("{name}.{headless_service}"),
            name,
            namespace: namespace.into(),
            ip: ip.into(),
            port,
        }
    }

    /// Base URL of the Vault API on this instance
    ///
    /// With `use_service` the stable cluster DNS name is used instead of the pod IP.
    pub fn endpoint(&self, scheme: &str, use_service: bool) -> String {
        if use_service {
            format!(
                "{scheme}://{}.{}.svc.cluster.local:{}",
                self.service_name, self.namespace, self.port
            )
        } else if self.ip.contains(':') {
            // IPv6 pod address
            format!("{scheme}://[{}]:{}", self.ip, self.port)
        } else {
            format!("{scheme}://{}:{}", self.ip, self.port)
        }
    }
}
