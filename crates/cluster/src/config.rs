//! Configuration for cluster sessions.
//!
//! [`ClusterConfig`] is supplied once per process and never mutated. Its
//! [`ClusterAuthOptions`] carry the credentials and TLS material every
//! session is built with; when they are absent,
//! [`get_cluster`](crate::get_cluster) refuses to build a session at all.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use edgeauth_cluster::{ClusterAuthOptions, ClusterConfig, TlsOptions};
//!
//! let config = ClusterConfig::builder()
//!     .auth_options(
//!         ClusterAuthOptions::builder()
//!             .user("riakuser")
//!             .password("password")
//!             .tls(TlsOptions::default())
//!             .build(),
//!     )
//!     .timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert!(config.auth_options().is_some());
//! assert_eq!(config.port(), 8098);
//! ```

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Default HTTP(S) port of a cluster node.
pub const DEFAULT_PORT: u16 = 8098;

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of idle pooled connections kept per node.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// Session configuration.
///
/// Deserializes from the process configuration; every field except
/// `auth_options` has a default.
#[derive(Debug, Clone, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    /// Credentials and TLS material. `None` means sessions cannot be built.
    #[serde(default)]
    pub(crate) auth_options: Option<ClusterAuthOptions>,

    /// Port every discovered node listens on.
    #[serde(default = "default_port")]
    #[builder(default = DEFAULT_PORT)]
    pub(crate) port: u16,

    /// Per-request timeout.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    #[builder(default = DEFAULT_TIMEOUT)]
    pub(crate) timeout: Duration,

    /// TCP + TLS connect timeout.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    #[builder(default = DEFAULT_CONNECT_TIMEOUT)]
    pub(crate) connect_timeout: Duration,

    /// Idle connections kept per node.
    #[serde(default = "default_pool_max_idle_per_host")]
    #[builder(default = DEFAULT_POOL_MAX_IDLE_PER_HOST)]
    pub(crate) pool_max_idle_per_host: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_pool_max_idle_per_host() -> usize {
    DEFAULT_POOL_MAX_IDLE_PER_HOST
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClusterConfig {
    /// Returns the authentication options, if configured.
    #[must_use]
    pub fn auth_options(&self) -> Option<&ClusterAuthOptions> {
        self.auth_options.as_ref()
    }

    /// Returns the node port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-node idle pool size.
    #[must_use]
    pub fn pool_max_idle_per_host(&self) -> usize {
        self.pool_max_idle_per_host
    }
}

/// Credentials and TLS material for authenticating to the cluster.
#[derive(Clone, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ClusterAuthOptions {
    /// Cluster user name.
    #[builder(into)]
    pub user: String,

    /// Cluster password, zeroed on drop.
    #[builder(with = |password: impl Into<String>| Zeroizing::new(password.into()))]
    pub password: Zeroizing<String>,

    /// TLS trust and identity material.
    #[serde(default)]
    #[builder(default)]
    pub tls: TlsOptions,
}

impl fmt::Debug for ClusterAuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterAuthOptions")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("tls", &self.tls)
            .finish()
    }
}

/// TLS trust and identity material.
///
/// The default trusts the built-in web PKI roots and presents no client
/// certificate.
#[derive(Clone, Default, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct TlsOptions {
    /// PEM bundle of additional CA certificates to trust.
    #[serde(default)]
    #[builder(into)]
    pub ca_certificate_pem: Option<String>,

    /// PEM client identity: certificate chain followed by the private key.
    #[serde(default)]
    #[builder(with = |pem: impl Into<String>| Zeroizing::new(pem.into()))]
    pub client_identity_pem: Option<Zeroizing<String>>,

    /// Skip server certificate verification. Only for lab clusters with
    /// throwaway certificates.
    #[serde(default)]
    #[builder(default)]
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for TlsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsOptions")
            .field("ca_certificate_pem", &self.ca_certificate_pem.as_ref().map(|_| "[PEM]"))
            .field(
                "client_identity_pem",
                &self.client_identity_pem.as_ref().map(|_| "[REDACTED]"),
            )
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
