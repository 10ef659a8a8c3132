//! Chaos actions that stop and start cloud compute instances selected by
//! filters.
//!
//! The cloud backend is injected through [`ClientProvider`]; [`ec2`] provides
//! one for AWS EC2.

pub mod actions;
pub mod client;
pub mod config;
pub mod ec2;
pub mod error;
pub mod instance;
pub mod logging;
pub mod sdk_config;

pub use actions::{start_instances, stop_instances, transition_instances, Transition};
pub use client::{ClientError, ClientProvider, ComputeClient};
pub use config::{Configuration, Secrets, Settings};
pub use instance::{Filters, Instance, InstanceStatus, Location, Snapshot};
