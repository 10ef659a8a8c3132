use async_trait::async_trait;
use aws_sdk_ec2::primitives::DateTimeFormat;
use aws_sdk_ec2::types::{Filter, Instance as Ec2Instance, InstanceStateName};
use aws_sdk_ec2::Client as Ec2SdkClient;
use tracing::{debug, info};

use crate::client::{ClientProvider, ComputeClient};
use crate::config::{Configuration, Secrets, DEFAULT_CLOUD};
use crate::instance::{Filters, Instance, InstanceStatus, Location};
use crate::sdk_config::configure_aws;

const NAME_FILTER_KEY: &str = "name";
const NAME_TAG: &str = "Name";
const NAME_TAG_FILTER: &str = "tag:Name";

/// EC2 implementation of [`ComputeClient`].
pub struct Ec2Client {
    client: Ec2SdkClient,
    location: Location,
}

impl Ec2Client {
    pub fn new(client: Ec2SdkClient, location: Location) -> Self {
        Self { client, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[async_trait]
impl ComputeClient for Ec2Client {
    type Error = aws_sdk_ec2::Error;

    async fn query_instances(&self, filters: &Filters) -> Result<Vec<Instance>, Self::Error> {
        debug!(
            applied_filters = filters.len(),
            region = %self.location.region_name,
            "Sending DescribeInstances API request"
        );

        let resp = self
            .client
            .describe_instances()
            .set_filters((!filters.is_empty()).then(|| build_filters(filters)))
            .send()
            .await?;

        let instances: Vec<Instance> = resp
            .reservations()
            .iter()
            .flat_map(|res| res.instances())
            .filter_map(|inst| convert_instance(inst, &self.location))
            .collect();

        Ok(instances)
    }

    async fn stop(&self, instance: &Instance) -> Result<(), Self::Error> {
        debug!(
            instance_id = %instance.id,
            region = %self.location.region_name,
            api_action = "StopInstances",
            "Sending stop request to AWS EC2 API"
        );

        self.client
            .stop_instances()
            .instance_ids(&instance.id)
            .send()
            .await?;
        Ok(())
    }

    async fn start(&self, instance: &Instance) -> Result<(), Self::Error> {
        debug!(
            instance_id = %instance.id,
            region = %self.location.region_name,
            api_action = "StartInstances",
            "Sending start request to AWS EC2 API"
        );

        self.client
            .start_instances()
            .instance_ids(&instance.id)
            .send()
            .await?;
        Ok(())
    }
}

/// Builds [`Ec2Client`]s from the AWS SDK configuration chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ec2ClientProvider;

#[async_trait]
impl ClientProvider for Ec2ClientProvider {
    type Client = Ec2Client;

    async fn client(
        &self,
        configuration: Option<&Configuration>,
        secrets: Option<&Secrets>,
    ) -> Result<Ec2Client, aws_sdk_ec2::Error> {
        let sdk_config = configure_aws(configuration, secrets).await;

        let region = sdk_config
            .region()
            .map(|r| r.as_ref())
            .unwrap_or("unknown")
            .to_string();
        let cloud = configuration
            .map(Configuration::cloud_name)
            .unwrap_or(DEFAULT_CLOUD);

        info!(
            cloud = %cloud,
            region = %region,
            static_credentials = secrets.is_some(),
            "AWS EC2 client initialized"
        );

        Ok(Ec2Client::new(
            Ec2SdkClient::new(&sdk_config),
            Location::new(cloud, region),
        ))
    }
}

/// One EC2 filter per entry. `name` targets the `Name` tag, other keys are
/// passed through untouched.
pub fn build_filters(filters: &Filters) -> Vec<Filter> {
    filters
        .iter()
        .map(|(key, pattern)| {
            let name = if key == NAME_FILTER_KEY {
                NAME_TAG_FILTER
            } else {
                key
            };
            Filter::builder().name(name).values(pattern).build()
        })
        .collect()
}

pub fn status_from_state(state: Option<&InstanceStateName>) -> InstanceStatus {
    match state {
        Some(InstanceStateName::Running) => InstanceStatus::Active,
        Some(InstanceStateName::Stopped) => InstanceStatus::Shutoff,
        Some(other) => InstanceStatus::from(other.as_str().to_uppercase()),
        None => InstanceStatus::Other("UNKNOWN".to_string()),
    }
}

/// Instances without an id are dropped.
pub fn convert_instance(instance: &Ec2Instance, location: &Location) -> Option<Instance> {
    let id = instance.instance_id()?;
    let state = instance.state().and_then(|s| s.name());

    let name = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some(NAME_TAG))
        .and_then(|tag| tag.value())
        .unwrap_or_default();

    let mut converted = Instance::new(id, name, status_from_state(state))
        .with_vm_state(state.map(|s| s.as_str()).unwrap_or("unknown"))
        .with_location(location.clone());

    if let Some(instance_type) = instance.instance_type() {
        converted = converted.with_attribute("instance_type", instance_type.as_str());
    }
    if let Some(zone) = instance.placement().and_then(|p| p.availability_zone()) {
        converted = converted.with_attribute("availability_zone", zone);
    }
    if let Some(ip) = instance.private_ip_address() {
        converted = converted.with_attribute("private_ip_address", ip);
    }
    if let Some(ip) = instance.public_ip_address() {
        converted = converted.with_attribute("public_ip_address", ip);
    }
    if let Some(launch_time) = instance
        .launch_time()
        .and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
    {
        converted = converted.with_attribute("launch_time", launch_time);
    }

    Some(converted)
}
