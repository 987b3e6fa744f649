//! Embedded in-memory reference engine.
//!
//! Good enough to exercise every call in the [`ResolutionEngine`] contract
//! without a vendor install: records are stored per key, each record gets a
//! synthetic entity id, searches are naive attribute matches, and deleting
//! a known record queues a redo item for follow-up processing. Fault
//! injection hooks let tests force specific error categories on specific
//! records.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use matchflow_types::{EngineError, RecordKey, RedoRecord};

use crate::engine::{ConfigManager, ResolutionEngine};
use crate::flags::CallFlags;

#[derive(Debug, Clone)]
struct StoredRecord {
    entity_id: i64,
    attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default)]
struct Repository {
    data_sources: BTreeSet<String>,
    records: HashMap<RecordKey, StoredRecord>,
    redo: VecDeque<RedoRecord>,
    next_entity_id: i64,
    config_id: i64,
    adds: u64,
    deletes: u64,
    searches: u64,
    redo_processed: u64,
}

/// In-memory [`ResolutionEngine`] and [`ConfigManager`] implementation.
///
/// Safe for concurrent blocking calls from any number of worker threads.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    repo: Mutex<Repository>,
    faults: Mutex<HashMap<String, EngineError>>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the given data sources pre-registered.
    pub fn with_data_sources<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::new();
        {
            let mut repo = engine.repo.lock().expect("fresh mutex");
            repo.data_sources.extend(names.into_iter().map(Into::into));
            repo.config_id = 1;
        }
        engine
    }

    /// Force every operation touching `record_id` to fail with `err`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the fault table is unusable.
    pub fn fail_record(
        &self,
        record_id: impl Into<String>,
        err: EngineError,
    ) -> Result<(), EngineError> {
        self.faults()?.insert(record_id.into(), err);
        Ok(())
    }

    /// Push a redo record directly onto the queue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the repository is unusable.
    pub fn queue_redo(&self, record: RedoRecord) -> Result<(), EngineError> {
        self.repo()?.redo.push_back(record);
        Ok(())
    }

    fn repo(&self) -> Result<MutexGuard<'_, Repository>, EngineError> {
        self.repo
            .lock()
            .map_err(|_| EngineError::unrecoverable("MUTEX_POISONED", "repository mutex poisoned"))
    }

    fn faults(&self) -> Result<MutexGuard<'_, HashMap<String, EngineError>>, EngineError> {
        self.faults
            .lock()
            .map_err(|_| EngineError::unrecoverable("MUTEX_POISONED", "fault table mutex poisoned"))
    }

    fn check_fault(&self, record_id: &str) -> Result<(), EngineError> {
        match self.faults()?.get(record_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn parse_attributes(
        definition: &str,
    ) -> Result<serde_json::Map<String, serde_json::Value>, EngineError> {
        let value: serde_json::Value = serde_json::from_str(definition)
            .map_err(|e| EngineError::bad_input("NOT_JSON", format!("payload is not valid JSON: {e}")))?;
        match value {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(EngineError::bad_input("NOT_OBJECT", "payload is not a JSON object")),
        }
    }

    fn with_info_response(key: &RecordKey, entity_id: i64) -> String {
        serde_json::json!({
            "DATA_SOURCE": key.data_source,
            "RECORD_ID": key.record_id,
            "AFFECTED_ENTITIES": [{"ENTITY_ID": entity_id}],
        })
        .to_string()
    }
}

impl ResolutionEngine for MemoryEngine {
    fn add_record(
        &self,
        key: &RecordKey,
        definition: &str,
        flags: CallFlags,
    ) -> Result<Option<String>, EngineError> {
        self.check_fault(&key.record_id)?;
        let attributes = Self::parse_attributes(definition)?;

        let mut repo = self.repo()?;
        if !repo.data_sources.contains(&key.data_source) {
            return Err(EngineError::bad_input(
                "UNKNOWN_DATA_SOURCE",
                format!("data source {} is not registered", key.data_source),
            ));
        }

        let entity_id = match repo.records.get(key) {
            Some(existing) => existing.entity_id,
            None => {
                repo.next_entity_id += 1;
                repo.next_entity_id
            }
        };
        repo.records
            .insert(key.clone(), StoredRecord { entity_id, attributes });
        repo.adds += 1;

        Ok(flags
            .with_info
            .then(|| Self::with_info_response(key, entity_id)))
    }

    fn delete_record(
        &self,
        key: &RecordKey,
        flags: CallFlags,
    ) -> Result<Option<String>, EngineError> {
        self.check_fault(&key.record_id)?;

        let mut repo = self.repo()?;
        repo.deletes += 1;
        let Some(removed) = repo.records.remove(key) else {
            // Deleting an absent record is a no-op success.
            return Ok(flags.with_info.then(|| {
                serde_json::json!({
                    "DATA_SOURCE": key.data_source,
                    "RECORD_ID": key.record_id,
                    "AFFECTED_ENTITIES": [],
                })
                .to_string()
            }));
        };

        // Removing a record invalidates previous resolution decisions for
        // its entity; queue follow-up work the way a real engine would.
        let redo = serde_json::json!({
            "DSRC_ACTION": "DELETE",
            "DATA_SOURCE": key.data_source,
            "RECORD_ID": key.record_id,
            "ENTITY_ID": removed.entity_id,
        });
        repo.redo.push_back(RedoRecord(redo.to_string()));

        Ok(flags
            .with_info
            .then(|| Self::with_info_response(key, removed.entity_id)))
    }

    fn search_by_attributes(&self, attributes: &str) -> Result<String, EngineError> {
        let query = Self::parse_attributes(attributes)?;

        let mut repo = self.repo()?;
        repo.searches += 1;

        let mut entities = Vec::new();
        for (key, stored) in &repo.records {
            let matched: Vec<&String> = query
                .iter()
                .filter(|(name, value)| {
                    name.as_str() != "DATA_SOURCE"
                        && name.as_str() != "RECORD_ID"
                        && stored.attributes.get(*name) == Some(value)
                })
                .map(|(name, _)| name)
                .collect();
            if !matched.is_empty() {
                let match_key: String = matched.iter().map(|name| format!("+{name}")).collect();
                entities.push(serde_json::json!({
                    "ENTITY_ID": stored.entity_id,
                    "MATCH_KEY": match_key,
                    "RECORDS": [{
                        "DATA_SOURCE": key.data_source,
                        "RECORD_ID": key.record_id,
                    }],
                }));
            }
        }
        entities.sort_by_key(|e| e["ENTITY_ID"].as_i64());

        Ok(serde_json::json!({ "RESOLVED_ENTITIES": entities }).to_string())
    }

    fn get_redo_record(&self) -> Result<Option<RedoRecord>, EngineError> {
        Ok(self.repo()?.redo.pop_front())
    }

    fn count_redo_records(&self) -> Result<u64, EngineError> {
        Ok(self.repo()?.redo.len() as u64)
    }

    fn process_redo_record(
        &self,
        record: &RedoRecord,
        flags: CallFlags,
    ) -> Result<Option<String>, EngineError> {
        let fields = Self::parse_attributes(record.as_str())?;
        if let Some(record_id) = fields.get("RECORD_ID").and_then(serde_json::Value::as_str) {
            self.check_fault(record_id)?;
        }

        let mut repo = self.repo()?;
        repo.redo_processed += 1;

        Ok(flags.with_info.then(|| {
            serde_json::json!({
                "AFFECTED_ENTITIES": [{
                    "ENTITY_ID": fields.get("ENTITY_ID").cloned().unwrap_or(serde_json::Value::Null),
                }],
            })
            .to_string()
        }))
    }

    fn prime(&self) -> Result<(), EngineError> {
        // Nothing to warm in memory; present for contract parity.
        Ok(())
    }

    fn stats(&self) -> Result<String, EngineError> {
        let repo = self.repo()?;
        Ok(serde_json::json!({
            "loadedRecords": repo.records.len(),
            "addedRecords": repo.adds,
            "deletedRecords": repo.deletes,
            "searches": repo.searches,
            "redoProcessed": repo.redo_processed,
            "redoPending": repo.redo.len(),
        })
        .to_string())
    }

    fn purge_repository(&self) -> Result<(), EngineError> {
        let mut repo = self.repo()?;
        repo.records.clear();
        repo.redo.clear();
        repo.next_entity_id = 0;
        Ok(())
    }
}

impl ConfigManager for MemoryEngine {
    fn register_data_sources(&self, names: &[String]) -> Result<i64, EngineError> {
        let mut repo = self.repo()?;
        for name in names {
            if name.is_empty() {
                return Err(EngineError::bad_input(
                    "EMPTY_DATA_SOURCE",
                    "data source name must not be empty",
                ));
            }
            repo.data_sources.insert(name.clone());
        }
        repo.config_id += 1;
        Ok(repo.config_id)
    }

    fn data_sources(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.repo()?.data_sources.iter().cloned().collect())
    }

    fn default_config_id(&self) -> Result<i64, EngineError> {
        let repo = self.repo()?;
        if repo.config_id == 0 {
            return Err(EngineError::configuration(
                "NO_DEFAULT_CONFIG",
                "no configuration has been registered",
            ));
        }
        Ok(repo.config_id)
    }
}
