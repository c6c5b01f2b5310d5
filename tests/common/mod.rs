//! Shared test doubles for the orchestrator and watch loop tests.
//!
//! - `SimulatedVault` - in-memory `UnsealApi` that tracks unseal progress per endpoint
//! - `StaticDirectory` - `InstanceDirectory` returning a fixed instance list
//! - `RecordingReporter` - `Reporter` that keeps every report it receives

#![allow(dead_code, reason = "Not every test binary uses every helper")]

pub mod mock_apiserver;
pub mod mock_vault;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use vault_unsealer::config::UnsealKey;
use vault_unsealer::discovery::{Instance, InstanceDirectory};
use vault_unsealer::error::{DiscoveryError, ProtocolError};
use vault_unsealer::report::Reporter;
use vault_unsealer::unsealer::{CycleReport, HealthReport, UnsealSettings};
use vault_unsealer::vault::{HealthStatus, SealStatus, UnsealApi};

pub fn instance(name: &str, ip: &str) -> Instance {
    Instance::new(name, "vault", ip, "vault-internal", 8200)
}

pub fn endpoint(instance: &Instance) -> String {
    instance.endpoint("http", false)
}

pub fn keys(values: &[&str]) -> Vec<UnsealKey> {
    values.iter().map(|k| UnsealKey::from(*k)).collect()
}

pub fn fast_settings() -> UnsealSettings {
    UnsealSettings {
        key_delay: Duration::ZERO,
        ..UnsealSettings::default()
    }
}

/// A call made against the simulated Vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SealStatus(String),
    Submit(String, String),
    Health(String),
}

/// Behaviour of one simulated Vault instance
#[derive(Debug, Clone)]
pub struct SimInstance {
    pub sealed: bool,
    pub threshold: u32,
    pub progress: u32,
    /// Keys Vault accepts; anything else is rejected with HTTP 400
    pub valid_keys: HashSet<String>,
    /// Seal status queries fail
    pub unreachable: bool,
    /// Instance reports unsealed on the next status query after keys ran out
    pub unseal_on_recheck: bool,
    /// Seal status query panics
    pub panic_on_status: bool,
    /// Status code of the health endpoint, `None` for a transport failure
    pub health_code: Option<u16>,
}

impl SimInstance {
    pub fn sealed(threshold: u32, valid_keys: &[&str]) -> Self {
        Self {
            sealed: true,
            threshold,
            progress: 0,
            valid_keys: valid_keys.iter().map(|k| (*k).to_string()).collect(),
            unreachable: false,
            unseal_on_recheck: false,
            panic_on_status: false,
            health_code: Some(503),
        }
    }

    pub fn unsealed() -> Self {
        Self {
            sealed: false,
            health_code: Some(200),
            ..Self::sealed(3, &[])
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            health_code: None,
            ..Self::sealed(3, &[])
        }
    }

    fn status(&self) -> SealStatus {
        SealStatus {
            sealed: self.sealed,
            threshold: self.threshold,
            progress: self.progress,
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    instances: HashMap<String, SimInstance>,
    calls: Vec<Call>,
}

/// In-memory Vault fleet keyed by endpoint
#[derive(Debug, Default)]
pub struct SimulatedVault {
    state: Mutex<SimState>,
}

impl SimulatedVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, instance: &Instance, sim: SimInstance) -> Self {
        self.lock().instances.insert(endpoint(instance), sim);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Keys submitted to one endpoint, in order
    pub fn submitted(&self, instance: &Instance) -> Vec<String> {
        let target = endpoint(instance);
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Submit(ep, key) if *ep == target => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn status_queries(&self, instance: &Instance) -> usize {
        let target = endpoint(instance);
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::SealStatus(ep) if *ep == target))
            .count()
    }

    pub fn is_sealed(&self, instance: &Instance) -> bool {
        self.lock()
            .instances
            .get(&endpoint(instance))
            .is_none_or(|sim| sim.sealed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unreachable_error(endpoint: &str) -> ProtocolError {
    ProtocolError::Status {
        url: format!("{endpoint}/v1/sys/seal-status"),
        status: 502,
    }
}

#[async_trait]
impl UnsealApi for SimulatedVault {
    async fn seal_status(&self, endpoint: &str) -> Result<SealStatus, ProtocolError> {
        let reply = {
            let mut state = self.lock();
            state.calls.push(Call::SealStatus(endpoint.to_string()));
            let submitted_any = state
                .calls
                .iter()
                .any(|c| matches!(c, Call::Submit(ep, _) if ep == endpoint));
            match state.instances.get_mut(endpoint) {
                None => Err(unreachable_error(endpoint)),
                Some(sim) if sim.panic_on_status => Ok(None),
                Some(sim) if sim.unreachable => Err(unreachable_error(endpoint)),
                Some(sim) => {
                    if sim.unseal_on_recheck && submitted_any {
                        sim.sealed = false;
                    }
                    Ok(Some(sim.status()))
                }
            }
        };

        match reply {
            Ok(Some(status)) => Ok(status),
            Ok(None) => panic!("simulated crash while querying {endpoint}"),
            Err(e) => Err(e),
        }
    }

    async fn submit_key(
        &self,
        endpoint: &str,
        key: &UnsealKey,
    ) -> Result<SealStatus, ProtocolError> {
        let mut state = self.lock();
        state.calls.push(Call::Submit(
            endpoint.to_string(),
            key.expose().to_string(),
        ));
        let Some(sim) = state.instances.get_mut(endpoint) else {
            return Err(unreachable_error(endpoint));
        };

        if !sim.valid_keys.contains(key.expose()) {
            return Err(ProtocolError::Status {
                url: format!("{endpoint}/v1/sys/unseal"),
                status: 400,
            });
        }

        if sim.sealed {
            sim.progress += 1;
            if sim.progress >= sim.threshold {
                sim.sealed = false;
                sim.progress = 0;
            }
        }
        Ok(sim.status())
    }

    async fn health(&self, endpoint: &str) -> HealthStatus {
        let mut state = self.lock();
        state.calls.push(Call::Health(endpoint.to_string()));
        match state.instances.get(endpoint).and_then(|sim| sim.health_code) {
            Some(code) => HealthStatus::from_status_code(code),
            None => HealthStatus::unreachable("connection refused"),
        }
    }
}

/// Directory with a fixed instance list (or a fixed failure)
#[derive(Debug)]
pub struct StaticDirectory {
    instances: Option<Vec<Instance>>,
    calls: AtomicUsize,
}

impl StaticDirectory {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            instances: Some(instances),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            instances: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstanceDirectory for StaticDirectory {
    async fn list_instances(
        &self,
        _namespace: &str,
        _label_selector: &str,
    ) -> Result<Vec<Instance>, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.instances
            .clone()
            .ok_or(DiscoveryError::Timeout(Duration::from_secs(10)))
    }
}

/// Reporter that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub cycles: Mutex<Vec<(u64, CycleReport)>>,
    pub unseal: Mutex<Vec<CycleReport>>,
    pub health: Mutex<Vec<HealthReport>>,
}

impl RecordingReporter {
    pub fn cycle_numbers(&self) -> Vec<u64> {
        self.cycles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(cycle, _)| *cycle)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn unseal_report(&self, _namespace: &str, report: &CycleReport) -> std::io::Result<()> {
        self.unseal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn health_report(&self, _namespace: &str, report: &HealthReport) -> std::io::Result<()> {
        self.health
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn watch_cycle(
        &self,
        _namespace: &str,
        cycle: u64,
        report: &CycleReport,
    ) -> std::io::Result<()> {
        self.cycles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((cycle, report.clone()));
        Ok(())
    }
}
