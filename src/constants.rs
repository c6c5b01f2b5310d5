//! # Constants
//!
//! Default values shared across the unsealer. Every tunable here can be
//! overridden through the environment (see [`crate::config`]).

/// Default namespace searched for Vault pods
pub const DEFAULT_NAMESPACE: &str = "vault";

/// Default label selector for Vault pods
pub const DEFAULT_LABEL_SELECTOR: &str = "app=vault";

/// Default Vault API port
pub const DEFAULT_VAULT_PORT: u16 = 8200;

/// Default headless service fronting the Vault StatefulSet
pub const DEFAULT_VAULT_SERVICE_NAME: &str = "vault-internal";

/// Default scheme used to reach Vault listeners
pub const DEFAULT_VAULT_SCHEME: &str = "http";

/// Default per-request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default timeout for the pod list call (seconds)
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 10;

/// Default number of retries per HTTP request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base for exponential retry backoff (milliseconds)
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

/// Pause between two key submissions to the same instance (milliseconds)
pub const DEFAULT_KEY_DELAY_MS: u64 = 200;

/// Default watch interval (seconds)
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

/// HTTP status codes retried by the Vault client
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Pod phase accepted by discovery
pub const POD_PHASE_RUNNING: &str = "Running";

/// Environment variable holding comma-separated unseal keys
pub const ENV_UNSEAL_KEYS: &str = "VAULT_UNSEAL_KEYS";

/// Prefix for individually numbered unseal keys (`VAULT_UNSEAL_KEY_1`, ...)
pub const ENV_UNSEAL_KEY_PREFIX: &str = "VAULT_UNSEAL_KEY_";

/// Legacy prefix for numbered unseal keys (`UNSEAL_KEY_1`, ...)
pub const ENV_LEGACY_UNSEAL_KEY_PREFIX: &str = "UNSEAL_KEY_";
