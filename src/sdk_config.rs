use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::config::Credentials;
use aws_types::region::Region;

use crate::config::{Configuration, Secrets};

const CREDENTIALS_PROVIDER_NAME: &str = "chaos-compute-secrets";

/// Loads the AWS SDK configuration.
///
/// Anything not set in `configuration` or `secrets` falls back to the SDK
/// default chain (environment, shared config files, IMDS).
pub async fn configure_aws(
    configuration: Option<&Configuration>,
    secrets: Option<&Secrets>,
) -> aws_types::SdkConfig {
    let region = configuration.and_then(|c| c.region.clone());
    let region_provider =
        RegionProviderChain::first_try(region.map(Region::new)).or_default_provider();

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    if let Some(profile) = configuration.and_then(|c| c.profile.as_deref()) {
        loader = loader.profile_name(profile);
    }

    if let Some(endpoint_url) = configuration.and_then(|c| c.endpoint_url.as_deref()) {
        loader = loader.endpoint_url(endpoint_url);
    }

    if let Some(secrets) = secrets {
        loader = loader.credentials_provider(Credentials::new(
            secrets.access_key_id.clone(),
            secrets.secret_access_key.clone(),
            secrets.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    }

    loader.load().await
}
