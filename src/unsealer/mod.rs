//! # Unseal Orchestration
//!
//! Drives each discovered Vault instance from sealed to unsealed.
//!
//! For one instance the attempt moves through
//! `Unknown -> Sealed(progress, threshold) -> Unsealed | Exhausted`:
//!
//! 1. Query seal status. Unreachable instances fail without any key being sent.
//! 2. Already unsealed instances succeed without consuming keys.
//! 3. Keys are submitted one at a time, in the order supplied, until Vault
//!    reports the instance unsealed. A failed submission aborts the attempt.
//! 4. When keys run out, one last status check guards against an instance that
//!    unsealed asynchronously before reporting insufficient keys.
//!
//! Instances are isolated from each other: a failure (or panic) while
//! unsealing one never affects the outcome of another.

mod outcome;

pub use outcome::{CycleReport, FailureReason, HealthReport, Report, SealProbe, UnsealOutcome};

use crate::config::UnsealKey;
use crate::discovery::{Instance, InstanceDirectory};
use crate::observability::metrics;
use crate::vault::{HealthStatus, UnsealApi};
use futures::future::join_all;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// How instances are addressed and paced
#[derive(Debug, Clone)]
pub struct UnsealSettings {
    /// `http` or `https`
    pub scheme: String,
    /// Address instances through the headless service instead of the pod IP
    pub use_service: bool,
    /// Pause after each key that left the instance sealed
    pub key_delay: Duration,
    /// Process instances concurrently instead of one at a time
    pub parallel: bool,
}

impl Default for UnsealSettings {
    fn default() -> Self {
        Self {
            scheme: crate::constants::DEFAULT_VAULT_SCHEME.to_string(),
            use_service: false,
            key_delay: Duration::from_millis(crate::constants::DEFAULT_KEY_DELAY_MS),
            parallel: false,
        }
    }
}

/// Unseal orchestrator over a directory of instances and a Vault client
pub struct Unsealer {
    directory: Arc<dyn InstanceDirectory>,
    client: Arc<dyn UnsealApi>,
    settings: UnsealSettings,
}

impl std::fmt::Debug for Unsealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsealer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Unsealer {
    pub fn new(
        directory: Arc<dyn InstanceDirectory>,
        client: Arc<dyn UnsealApi>,
        settings: UnsealSettings,
    ) -> Self {
        Self {
            directory,
            client,
            settings,
        }
    }

    /// Unseal a single instance with `keys`, applied in order
    pub async fn unseal_instance(&self, instance: &Instance, keys: &[UnsealKey]) -> UnsealOutcome {
        let span = info_span!(
            "unseal.instance",
            instance.name = %instance.name,
            instance.namespace = %instance.namespace
        );
        self.drive_instance(instance, keys).instrument(span).await
    }

    async fn drive_instance(&self, instance: &Instance, keys: &[UnsealKey]) -> UnsealOutcome {
        let endpoint = instance.endpoint(&self.settings.scheme, self.settings.use_service);
        info!("[{}] Checking seal status...", instance.name);

        let status = match self.probe(&endpoint).await {
            SealProbe::Unreachable => {
                error!("[{}] Cannot connect to Vault at {}", instance.name, endpoint);
                return UnsealOutcome::failure(FailureReason::Unreachable, 0);
            }
            SealProbe::Unsealed => {
                info!("[{}] ✅ Already unsealed", instance.name);
                return UnsealOutcome::success(0);
            }
            SealProbe::Sealed(status) => status,
        };

        info!(
            "[{}] Sealed - need {} keys, current progress: {}",
            instance.name, status.threshold, status.progress
        );

        for (index, key) in keys.iter().enumerate() {
            let key_index = index + 1;
            debug!("[{}] Applying key {}/{}", instance.name, key_index, keys.len());

            match self.client.submit_key(&endpoint, key).await {
                Err(e) => {
                    error!(error = %e, "[{}] Unseal failed at key {}", instance.name, key_index);
                    return UnsealOutcome::failure(FailureReason::SubmitFailed { key_index }, key_index);
                }
                Ok(reply) if !reply.sealed => {
                    info!("[{}] ✅ Unsealed after {} key(s)", instance.name, key_index);
                    return UnsealOutcome::success(key_index);
                }
                Ok(reply) => {
                    debug!(
                        "[{}] Progress: {}/{}",
                        instance.name, reply.progress, status.threshold
                    );
                }
            }

            if !self.settings.key_delay.is_zero() {
                tokio::time::sleep(self.settings.key_delay).await;
            }
        }

        // Another actor may have finished unsealing while we were submitting
        if self.probe(&endpoint).await == SealProbe::Unsealed {
            info!("[{}] ✅ Unsealed", instance.name);
            return UnsealOutcome::success(keys.len());
        }

        error!(
            "[{}] ❌ Not enough keys to unseal ({} applied, threshold {})",
            instance.name,
            keys.len(),
            status.threshold
        );
        UnsealOutcome::failure(FailureReason::InsufficientKeys, keys.len())
    }

    async fn probe(&self, endpoint: &str) -> SealProbe {
        SealProbe::from(self.client.seal_status(endpoint).await)
    }

    /// Discover every instance and unseal each one
    ///
    /// An empty discovery (including a failed one) yields an empty report.
    pub async fn unseal_all(
        &self,
        namespace: &str,
        label_selector: &str,
        keys: &[UnsealKey],
    ) -> CycleReport {
        let instances = self.discover(namespace, label_selector).await;
        if instances.is_empty() {
            warn!("No Vault pods found in namespace '{}'", namespace);
            return CycleReport::default();
        }

        info!(
            "Found {} Vault pods: {}",
            instances.len(),
            instances
                .iter()
                .map(|i| i.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let outcomes = self
            .run_each(instances.iter().map(|instance| self.isolated_unseal(instance, keys)))
            .await;

        instances
            .into_iter()
            .zip(outcomes)
            .map(|(instance, outcome)| {
                metrics::record_unseal_outcome(&outcome);
                (instance.name, outcome)
            })
            .collect()
    }

    /// Discover every instance and classify its health, without changing remote state
    pub async fn health_check_all(&self, namespace: &str, label_selector: &str) -> HealthReport {
        info!("Health check of Vault pods in namespace '{}'...", namespace);

        let instances = self.discover(namespace, label_selector).await;
        if instances.is_empty() {
            warn!("No Vault pods found in namespace '{}'", namespace);
            return HealthReport::default();
        }

        let healths = self
            .run_each(instances.iter().map(|instance| self.instance_health(instance)))
            .await;

        instances
            .into_iter()
            .zip(healths)
            .map(|(instance, health)| (instance.name, health))
            .collect()
    }

    async fn instance_health(&self, instance: &Instance) -> HealthStatus {
        let endpoint = instance.endpoint(&self.settings.scheme, self.settings.use_service);
        let health = self.client.health(&endpoint).await;

        let mark = if health.healthy { "✅" } else { "❌" };
        let sealed = if health.sealed { "sealed" } else { "unsealed" };
        info!(
            "[{}] {} {} (code: {})",
            instance.name, mark, sealed, health.status_code
        );
        health
    }

    /// Run per-instance futures either one after another or concurrently
    ///
    /// Results come back in the order the futures were produced.
    async fn run_each<I, F, T>(&self, futures: I) -> Vec<T>
    where
        I: Iterator<Item = F>,
        F: Future<Output = T>,
    {
        if self.settings.parallel {
            return join_all(futures).await;
        }

        let mut results = Vec::new();
        for future in futures {
            results.push(future.await);
        }
        results
    }

    /// Unseal one instance, turning a panic into a failed outcome
    async fn isolated_unseal(&self, instance: &Instance, keys: &[UnsealKey]) -> UnsealOutcome {
        match AssertUnwindSafe(self.unseal_instance(instance, keys))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("[{}] Unseal attempt aborted: {}", instance.name, message);
                UnsealOutcome::failure(FailureReason::Internal(message), 0)
            }
        }
    }

    async fn discover(&self, namespace: &str, label_selector: &str) -> Vec<Instance> {
        info!(
            "Looking for Vault pods in namespace '{}' (selector: {})...",
            namespace, label_selector
        );

        match self.directory.list_instances(namespace, label_selector).await {
            Ok(instances) => {
                metrics::set_instances_discovered(instances.len());
                instances
            }
            Err(e) => {
                metrics::increment_discovery_errors();
                error!(error = %e, "Can't list pods in namespace '{}'", namespace);
                if e.is_unauthorized() {
                    error!("🔍 Verify the service account can list pods:");
                    error!(
                        "   kubectl auth can-i list pods -n {} --as=system:serviceaccount:<namespace>:<service-account>",
                        namespace
                    );
                }
                Vec::new()
            }
        }
    }
}
