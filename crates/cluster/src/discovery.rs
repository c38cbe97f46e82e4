//! Node discovery: resolving live cluster members from the relational store.
//!
//! The server inventory is the system of record for which cluster members
//! exist. Discovery runs one query per call and hands back whatever rows the
//! store returns, in the store's order. An empty list is a valid answer;
//! deciding what it means is up to [`get_cluster`](crate::get_cluster).

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::{error::InfraError, node::ClusterNode};

/// Server type name identifying key-value cluster members.
pub const CLUSTER_SERVER_TYPE: &str = "RIAK";

/// Status name of servers that may receive traffic.
pub const ONLINE_STATUS: &str = "ONLINE";

/// Lists online cluster members, projecting host and domain names.
pub const CLUSTER_NODE_QUERY: &str = "\
SELECT s.host_name, s.domain_name
FROM server s
JOIN type t ON s.type = t.id
JOIN status st ON s.status = st.id
WHERE t.name = 'RIAK' AND st.name = 'ONLINE'";

/// Source of the current cluster member list.
///
/// Implemented for [`AnyPool`] so the relational store handle can be passed
/// straight to [`get_cluster`](crate::get_cluster).
#[async_trait]
pub trait NodeDiscovery: Send + Sync {
    /// Returns the currently known cluster members.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError`] if the store cannot be queried.
    async fn list_cluster_nodes(&self) -> Result<Vec<ClusterNode>, InfraError>;
}

#[async_trait]
impl NodeDiscovery for AnyPool {
    async fn list_cluster_nodes(&self) -> Result<Vec<ClusterNode>, InfraError> {
        list_cluster_nodes(self).await
    }
}

/// Queries the relational store for online cluster members.
///
/// # Errors
///
/// Returns [`InfraError::Query`] on any query or transport failure; the
/// error is not retried or reinterpreted.
#[tracing::instrument(skip(db))]
pub async fn list_cluster_nodes(db: &AnyPool) -> Result<Vec<ClusterNode>, InfraError> {
    let nodes = sqlx::query_as::<_, ClusterNode>(CLUSTER_NODE_QUERY)
        .fetch_all(db)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "cluster node query failed"))?;

    tracing::debug!(count = nodes.len(), "discovered cluster nodes");
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_filters_on_type_and_status_constants() {
        assert!(CLUSTER_NODE_QUERY.contains(&format!("t.name = '{CLUSTER_SERVER_TYPE}'")));
        assert!(CLUSTER_NODE_QUERY.contains(&format!("st.name = '{ONLINE_STATUS}'")));
        assert!(CLUSTER_NODE_QUERY.starts_with("SELECT s.host_name, s.domain_name"));
    }
}
