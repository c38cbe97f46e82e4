//! Cluster member addresses as recorded in the relational store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cluster member, as listed by the server inventory.
///
/// Values are re-read from the relational store on every session build;
/// nothing caches them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClusterNode {
    /// Short host name, e.g. `riak-01`.
    pub host_name: String,
    /// DNS domain the host lives in, e.g. `cdn.example.net`.
    pub domain_name: String,
}

impl ClusterNode {
    /// Creates a node from its host and domain names.
    #[must_use]
    pub fn new(host_name: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self { host_name: host_name.into(), domain_name: domain_name.into() }
    }

    /// Fully qualified host name used to reach the node.
    ///
    /// An empty domain yields the bare host name.
    #[must_use]
    pub fn fqdn(&self) -> String {
        if self.domain_name.is_empty() {
            self.host_name.clone()
        } else {
            format!("{}.{}", self.host_name, self.domain_name)
        }
    }
}

impl fmt::Display for ClusterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn() {
        assert_eq!(ClusterNode::new("www", "devnull.com").fqdn(), "www.devnull.com");
        assert_eq!(ClusterNode::new("riak-01", "").fqdn(), "riak-01");
    }

    #[test]
    fn test_display_matches_fqdn() {
        let node = ClusterNode::new("riak-02", "cdn.example.net");
        assert_eq!(node.to_string(), "riak-02.cdn.example.net");
    }
}
