use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Installation status of a catalog entry on this device.
///
/// On the wire this is the boolean `installed` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum InstallState {
    Installed,
    #[default]
    NotInstalled,
}

impl From<bool> for InstallState {
    fn from(installed: bool) -> Self {
        if installed {
            InstallState::Installed
        } else {
            InstallState::NotInstalled
        }
    }
}

impl From<InstallState> for bool {
    fn from(state: InstallState) -> Self {
        state == InstallState::Installed
    }
}

/// One catalog entry as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_install_state")]
    installed: InstallState,
    /// Provider-supplied fields this layer does not interpret.
    #[serde(flatten)]
    metadata: Map<String, Value>,
    #[serde(skip)]
    detail_uri: Option<String>,
}

/// Reads a string field, turning null or any non-string value into `""`.
///
/// A bad identity on one record must not fail the whole result list.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

/// Reads `installed`; null or a non-boolean counts as not installed.
fn lenient_install_state<'de, D>(deserializer: D) -> Result<InstallState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(installed) => InstallState::from(installed),
        _ => InstallState::NotInstalled,
    })
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            installed: InstallState::NotInstalled,
            metadata: Map::new(),
            detail_uri: None,
        }
    }

    /// Builder used when constructing records outside a fetch (fixtures, restores).
    pub fn with_install_state(mut self, state: InstallState) -> Self {
        self.installed = state;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn install_state(&self) -> InstallState {
        self.installed
    }

    pub fn is_installed(&self) -> bool {
        self.installed == InstallState::Installed
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Canonical detail-page reference, present once the record has been annotated.
    pub fn detail_uri(&self) -> Option<&str> {
        self.detail_uri.as_deref()
    }

    pub(crate) fn set_install_state(&mut self, state: InstallState) {
        self.installed = state;
    }

    pub(crate) fn set_detail_uri(&mut self, uri: Option<String>) {
        self.detail_uri = uri;
    }
}

/// Ordered records from one query; order is ranking order and is never changed.
///
/// Every record has a non-empty id that is unique within the set. The set can
/// only shrink after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from fetched records, dropping records with an empty id and
    /// any later record repeating an id already seen. Order is preserved.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let records = records
            .into_iter()
            .filter(|record| !record.id.is_empty() && seen.insert(record.id.clone()))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(Record::id).collect()
    }

    pub(crate) fn records_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    /// Removes the record with `id`, returning it. Absent ids are a no-op.
    pub(crate) fn remove(&mut self, id: &str) -> Option<Record> {
        let position = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(position))
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Read-only view of the ids currently installed on the device.
///
/// Owned by a collaborator and already resident in memory; lookups never block
/// on I/O.
pub trait InstalledLookup {
    fn is_installed(&self, id: &str) -> bool;
}

impl InstalledLookup for HashSet<String> {
    fn is_installed(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl InstalledLookup for BTreeSet<String> {
    fn is_installed(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl<V> InstalledLookup for HashMap<String, V> {
    fn is_installed(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}

impl<T: InstalledLookup> InstalledLookup for RwLock<T> {
    fn is_installed(&self, id: &str) -> bool {
        // A poisoned lock still holds the last written lookup.
        match self.read() {
            Ok(guard) => guard.is_installed(id),
            Err(poisoned) => poisoned.into_inner().is_installed(id),
        }
    }
}
