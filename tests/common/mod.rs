#![allow(dead_code)]

use std::error::Error;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chaos_compute::{
    ClientProvider, ComputeClient, Configuration, Filters, Instance, Location, Secrets,
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for MockError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Provide {
        configuration: Option<Configuration>,
        secrets: Option<Secrets>,
    },
    Query(Filters),
    Stop(String),
    Start(String),
}

/// Provider whose clients return canned instances and record every call.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    instances: Vec<Instance>,
    provider_error: Option<MockError>,
    query_error: Option<MockError>,
    failing_instance: Option<(String, MockError)>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingProvider {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            instances,
            ..Self::default()
        }
    }

    pub fn failing_provider(mut self, message: &str) -> Self {
        self.provider_error = Some(MockError(message.to_string()));
        self
    }

    pub fn failing_query(mut self, message: &str) -> Self {
        self.query_error = Some(MockError(message.to_string()));
        self
    }

    pub fn failing_transition_on(mut self, instance_id: &str, message: &str) -> Self {
        self.failing_instance = Some((instance_id.to_string(), MockError(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the stop/start calls, in order.
    pub fn transitions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Stop(_) | Call::Start(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingClient {
    provider: RecordingProvider,
}

impl RecordingClient {
    fn transition(&self, instance: &Instance, call: Call) -> Result<(), MockError> {
        self.provider.record(call);
        match &self.provider.failing_instance {
            Some((id, err)) if *id == instance.id => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ComputeClient for RecordingClient {
    type Error = MockError;

    async fn query_instances(&self, filters: &Filters) -> Result<Vec<Instance>, MockError> {
        self.provider.record(Call::Query(filters.clone()));
        match &self.provider.query_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.provider.instances.clone()),
        }
    }

    async fn stop(&self, instance: &Instance) -> Result<(), MockError> {
        self.transition(instance, Call::Stop(instance.id.clone()))
    }

    async fn start(&self, instance: &Instance) -> Result<(), MockError> {
        self.transition(instance, Call::Start(instance.id.clone()))
    }
}

#[async_trait]
impl ClientProvider for RecordingProvider {
    type Client = RecordingClient;

    async fn client(
        &self,
        configuration: Option<&Configuration>,
        secrets: Option<&Secrets>,
    ) -> Result<RecordingClient, MockError> {
        self.record(Call::Provide {
            configuration: configuration.cloned(),
            secrets: secrets.cloned(),
        });
        match &self.provider_error {
            Some(err) => Err(err.clone()),
            None => Ok(RecordingClient {
                provider: self.clone(),
            }),
        }
    }
}

pub const INSTANCE_A: &str = "0b7a8371-24cf-4855-b3d2-e30f2cb13ddc";
pub const INSTANCE_B: &str = "93746749-331d-4ec4-b536-4ce73889e78f";

/// A stopped bastion (A) and a running one (B).
pub fn bastions() -> Vec<Instance> {
    vec![
        Instance::new(INSTANCE_A, "staging-bastion-region1-01", "SHUTOFF")
            .with_vm_state("stopped")
            .with_location(Location::new("staging", "REGION1")),
        Instance::new(INSTANCE_B, "staging-bastion-region2-02", "ACTIVE")
            .with_vm_state("active")
            .with_location(Location::new("staging", "REGION2")),
    ]
}

pub fn instance(id: &str, status: &str) -> Instance {
    Instance::new(id, format!("node-{}", id), status)
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self, max_level: Level) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(max_level)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish()
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines whose message contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
