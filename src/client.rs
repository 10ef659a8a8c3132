//! Collaborator seams: a provider that builds a client from configuration
//! and secrets, and the client that queries and transitions instances.

use async_trait::async_trait;

use crate::config::{Configuration, Secrets};
use crate::instance::{Filters, Instance};

#[async_trait]
pub trait ComputeClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Instances matching `filters`, in the order the backend returns them.
    async fn query_instances(&self, filters: &Filters) -> Result<Vec<Instance>, Self::Error>;

    async fn stop(&self, instance: &Instance) -> Result<(), Self::Error>;

    async fn start(&self, instance: &Instance) -> Result<(), Self::Error>;
}

#[async_trait]
pub trait ClientProvider: Send + Sync {
    type Client: ComputeClient;

    /// Builds a fresh client. Configuration and secrets are passed as given.
    async fn client(
        &self,
        configuration: Option<&Configuration>,
        secrets: Option<&Secrets>,
    ) -> Result<Self::Client, <Self::Client as ComputeClient>::Error>;
}

/// Error type shared by a provider and the clients it builds.
pub type ClientError<P> = <<P as ClientProvider>::Client as ComputeClient>::Error;
