use std::fmt;

use tracing::{debug, info};

use crate::client::{ClientError, ClientProvider, ComputeClient};
use crate::config::{Configuration, Secrets};
use crate::instance::{Filters, Instance, InstanceStatus, Snapshot};

/// A lifecycle request together with the status an instance must be in for
/// the request to be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stop,
    Start,
}

impl Transition {
    pub fn expected_status(self) -> InstanceStatus {
        match self {
            Self::Stop => InstanceStatus::Active,
            Self::Start => InstanceStatus::Shutoff,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Stop => "Stop",
            Self::Start => "Start",
        }
    }

    async fn apply<C: ComputeClient>(self, client: &C, instance: &Instance) -> Result<(), C::Error> {
        match self {
            Self::Stop => client.stop(instance).await,
            Self::Start => client.start(instance).await,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Stops every instance matching `filters` whose status is `ACTIVE`.
///
/// Returns snapshots of the stopped instances in query order. Errors from the
/// provider or the client are returned as-is.
pub async fn stop_instances<P: ClientProvider>(
    provider: &P,
    filters: &Filters,
    configuration: Option<&Configuration>,
    secrets: Option<&Secrets>,
) -> Result<Vec<Snapshot>, ClientError<P>> {
    transition_instances(provider, Transition::Stop, filters, configuration, secrets).await
}

/// Starts every instance matching `filters` whose status is `SHUTOFF`.
pub async fn start_instances<P: ClientProvider>(
    provider: &P,
    filters: &Filters,
    configuration: Option<&Configuration>,
    secrets: Option<&Secrets>,
) -> Result<Vec<Snapshot>, ClientError<P>> {
    transition_instances(provider, Transition::Start, filters, configuration, secrets).await
}

/// Queries instances and applies `transition` to those in its expected
/// status, one at a time.
///
/// A failing transition aborts the call: instances already handled are not
/// rolled back and the remaining ones are never attempted.
pub async fn transition_instances<P: ClientProvider>(
    provider: &P,
    transition: Transition,
    filters: &Filters,
    configuration: Option<&Configuration>,
    secrets: Option<&Secrets>,
) -> Result<Vec<Snapshot>, ClientError<P>> {
    let expected = transition.expected_status();

    let client = provider.client(configuration, secrets).await?;
    let instances = client.query_instances(filters).await?;

    debug!(
        action = transition.verb(),
        matched_instances = instances.len(),
        expected_status = %expected,
        "Queried instances"
    );

    let mut response = Vec::new();

    for instance in &instances {
        if instance.status != expected {
            info!(
                instance_id = %instance.id,
                instance_name = %instance.name,
                status = %instance.status,
                "Skip instance {} [{}] ({})",
                instance.name,
                instance.id,
                instance.status
            );
            continue;
        }

        info!(
            instance_id = %instance.id,
            instance_name = %instance.name,
            action = transition.verb(),
            "{} instance {} [{}]",
            transition,
            instance.name,
            instance.id
        );
        transition.apply(&client, instance).await?;
        response.push(instance.to_snapshot());
    }

    Ok(response)
}
