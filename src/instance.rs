use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::FilterError;

/// Plain-data representation of an instance at the time it was acted upon.
pub type Snapshot = Map<String, Value>;

const STATUS_ACTIVE: &str = "ACTIVE";
const STATUS_SHUTOFF: &str = "SHUTOFF";

/// Normalized instance status.
///
/// Only `ACTIVE` and `SHUTOFF` drive the actions; every other value reported
/// by a backend is carried through verbatim. Equality is on the string form,
/// so `Other("ACTIVE")` equals `Active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Active,
    Shutoff,
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Shutoff => STATUS_SHUTOFF,
            Self::Other(status) => status,
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(status: &str) -> Self {
        match status {
            STATUS_ACTIVE => Self::Active,
            STATUS_SHUTOFF => Self::Shutoff,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(status: String) -> Self {
        Self::from(status.as_str())
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl PartialEq for InstanceStatus {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for InstanceStatus {}

impl Hash for InstanceStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub cloud: String,
    pub region_name: String,
}

impl Location {
    pub fn new(cloud: impl Into<String>, region_name: impl Into<String>) -> Self {
        Self {
            cloud: cloud.into(),
            region_name: region_name.into(),
        }
    }
}

/// A compute instance as reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub vm_state: String,
    #[serde(default)]
    pub location: Location,
    /// Backend-specific attributes, appended to the snapshot.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Instance {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<InstanceStatus>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            vm_state: String::new(),
            location: Location::default(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_vm_state(mut self, vm_state: impl Into<String>) -> Self {
        self.vm_state = vm_state.into();
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builds the snapshot returned by the actions.
    ///
    /// Extra attributes never shadow the core fields.
    pub fn to_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("id".to_string(), Value::from(self.id.as_str()));
        snapshot.insert("name".to_string(), Value::from(self.name.as_str()));
        snapshot.insert("status".to_string(), Value::from(self.status.as_str()));
        snapshot.insert("vm_state".to_string(), Value::from(self.vm_state.as_str()));
        snapshot.insert(
            "location".to_string(),
            json!({
                "cloud": self.location.cloud,
                "region_name": self.location.region_name,
            }),
        );

        for (key, value) in &self.attributes {
            snapshot
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        snapshot
    }
}

/// Attribute name to match pattern. Interpretation is left to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(key, pattern);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, pattern: impl Into<String>) {
        self.0.insert(key.into(), pattern.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a single `key=value` entry, as given on the command line.
    pub fn parse_entry(entry: &str) -> Result<(String, String), FilterError> {
        match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(FilterError::InvalidEntry(entry.to_string())),
        }
    }

    /// Builds a filter set from parsed entries, refusing repeated keys.
    ///
    /// Unlike `collect()`, which keeps the last pattern for a key, a repeated
    /// key here is an error so that no pattern is silently dropped.
    pub fn try_from_entries<I>(entries: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filters = Self::new();
        for (key, pattern) in entries {
            if let Some(first) = filters.0.get(&key) {
                return Err(FilterError::DuplicateKey {
                    first: first.clone(),
                    second: pattern,
                    key,
                });
            }
            filters.0.insert(key, pattern);
        }
        Ok(filters)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
