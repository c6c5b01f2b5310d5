//! # Instance Discovery
//!
//! Finds the Vault replicas to operate on. Instances are re-listed at the start
//! of every cycle and never cached, so pods replaced between cycles are picked
//! up with their new addresses.

mod instance;
mod kubernetes;

pub use instance::Instance;
pub use kubernetes::{instances_from_pods, KubeDirectory};

use crate::error::DiscoveryError;
use async_trait::async_trait;

/// Source of Vault instances
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// List running, addressable instances matching `label_selector` in `namespace`
    async fn list_instances(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Instance>, DiscoveryError>;
}
