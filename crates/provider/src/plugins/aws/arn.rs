//! Amazon Resource Name parsing for cluster identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

const ARN_PREFIX: &str = "arn:";

/// A parsed `[arn:]partition:service:region:account:resource` identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterArn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl ClusterArn {
    /// Parse `cluster_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidClusterIdentifier`] when the identifier
    /// does not have five colon-separated sections or the partition, service
    /// or resource section is empty.
    pub fn parse(cluster_id: &str) -> Result<Self, ProviderError> {
        let body = cluster_id.strip_prefix(ARN_PREFIX).unwrap_or(cluster_id);
        let sections: Vec<&str> = body.splitn(5, ':').collect();

        let [partition, service, region, account_id, resource] = sections.as_slice() else {
            return Err(invalid(
                cluster_id,
                "expected partition:service:region:account:resource",
            ));
        };

        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return Err(invalid(
                cluster_id,
                "partition, service and resource must not be empty",
            ));
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Cluster name from a `<type>/<name>` resource.
    ///
    /// `None` unless the resource splits on `/` into exactly two parts. The
    /// name may be empty; the backend lookup rejects it.
    pub fn cluster_name(&self) -> Option<&str> {
        let parts: Vec<&str> = self.resource.split('/').collect();
        match parts.as_slice() {
            [_, name] => Some(*name),
            _ => None,
        }
    }

    /// Like [`Self::cluster_name`], reporting failure against `cluster_id`.
    pub fn require_cluster_name(&self, cluster_id: &str) -> Result<&str, ProviderError> {
        self.cluster_name().ok_or_else(|| {
            invalid(
                cluster_id,
                &format!("resource '{}' must have the form <type>/<name>", self.resource),
            )
        })
    }
}

impl FromStr for ClusterArn {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClusterArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Translate a cluster identifier into the cluster name the backend expects.
pub fn cluster_name_from_id(cluster_id: &str) -> Result<String, ProviderError> {
    let arn = ClusterArn::parse(cluster_id)?;
    arn.require_cluster_name(cluster_id).map(str::to_string)
}

fn invalid(cluster_id: &str, reason: &str) -> ProviderError {
    ProviderError::InvalidClusterIdentifier {
        cluster_id: cluster_id.to_string(),
        reason: reason.to_string(),
    }
}
