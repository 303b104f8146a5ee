//! File-backed agent store.
//!
//! Each agent is one JSON file, `{id}.json`, inside the agents directory.
//! Identifiers are small positive integers assigned as max existing id plus
//! one. Known fields are explicitly typed; unknown fields round-trip through
//! the `extra` map for forward compatibility. Writes go through
//! [`crate::fs::atomic_write_file`] so a crash never corrupts a record.

use crate::error::{AgentryError, Result};
use crate::fs::atomic_write_file;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A stored agent: a named, parameterized prompt template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Numeric identifier, unique within the store.
    pub id: u64,

    /// Display name, also the source of the share slug.
    pub name: String,

    /// Short human description shown in listings.
    #[serde(default)]
    pub description: String,

    /// The full prompt text, schema block included.
    #[serde(default)]
    pub prompt: String,

    /// Tool names granted to the agent at run time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Unknown fields, preserved on rewrite.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Fields supplied when creating an agent; the store assigns the rest.
#[derive(Debug, Clone, Default)]
pub struct AgentDraft {
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
}

/// Handle on the agents directory.
#[derive(Debug)]
pub struct AgentStore {
    dir: PathBuf,
}

impl AgentStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to create agents directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    fn record_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Create a new agent from `draft`, assigning the next free id.
    pub fn insert(&self, draft: AgentDraft) -> Result<AgentRecord> {
        let record = AgentRecord {
            id: self.next_id()?,
            name: draft.name,
            description: draft.description,
            prompt: draft.prompt,
            tools: draft.tools,
            created: Some(Utc::now()),
            extra: BTreeMap::new(),
        };
        self.save(&record)?;
        Ok(record)
    }

    /// Load one agent. `Ok(None)` when no record has that id.
    pub fn get(&self, id: u64) -> Result<Option<AgentRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| {
            AgentryError::UserError(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let record: AgentRecord = serde_json::from_str(&raw).map_err(|e| {
            AgentryError::UserError(format!(
                "agent file '{}' is not valid JSON: {}\nFix: repair or remove the file",
                path.display(),
                e
            ))
        })?;
        Ok(Some(record))
    }

    /// Load one agent, failing with a not-found error when absent.
    pub fn get_required(&self, id: u64) -> Result<AgentRecord> {
        self.get(id)?
            .ok_or_else(|| AgentryError::NotFound(format!("Agent {} not found", id)))
    }

    /// All agents, sorted by id.
    pub fn list(&self) -> Result<Vec<AgentRecord>> {
        let mut ids = self.stored_ids()?;
        ids.sort_unstable();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get(id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Duplicate an agent under a new id, prefixing the name with "Copy of".
    ///
    /// All content fields carry over unchanged; only id, name and the
    /// creation timestamp differ.
    pub fn fork(&self, id: u64) -> Result<AgentRecord> {
        let source = self.get_required(id)?;
        let record = AgentRecord {
            id: self.next_id()?,
            name: format!("Copy of {}", source.name),
            created: Some(Utc::now()),
            ..source
        };
        self.save(&record)?;
        Ok(record)
    }

    /// Persist `record` at its id, replacing any existing file.
    pub fn save(&self, record: &AgentRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record).map_err(|e| {
            AgentryError::UserError(format!("failed to serialize agent {}: {}", record.id, e))
        })?;
        atomic_write_file(self.record_path(record.id), &format!("{json}\n"))
    }

    fn next_id(&self) -> Result<u64> {
        Ok(self.stored_ids()?.into_iter().max().unwrap_or(0) + 1)
    }

    fn stored_ids(&self) -> Result<Vec<u64>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            AgentryError::UserError(format!(
                "failed to read agents directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AgentryError::UserError(format!("failed to read directory entry: {}", e))
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(".json")
                && let Ok(id) = stem.parse::<u64>()
            {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(name: &str) -> AgentDraft {
        AgentDraft {
            name: name.to_string(),
            description: "test agent".to_string(),
            prompt: "Do the thing about {topic}".to_string(),
            tools: vec!["search".to_string()],
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();

        let first = store.insert(draft("First")).unwrap();
        let second = store.insert(draft("Second")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_next_id_skips_over_gaps() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        let a = store.insert(draft("A")).unwrap();
        let b = store.insert(draft("B")).unwrap();

        fs::remove_file(dir.path().join(format!("{}.json", a.id))).unwrap();

        // Max surviving id is 2, so the next insert gets 3, not 1.
        let c = store.insert(draft("C")).unwrap();
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_get_round_trips_record() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        let inserted = store.insert(draft("Round Trip")).unwrap();

        let loaded = store.get(inserted.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Round Trip");
        assert_eq!(loaded.prompt, "Do the thing about {topic}");
        assert_eq!(loaded.tools, vec!["search"]);
        assert!(loaded.created.is_some());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        assert!(store.get(99).unwrap().is_none());
    }

    #[test]
    fn test_get_required_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        let err = store.get_required(99).unwrap_err();
        assert!(matches!(err, AgentryError::NotFound(_)));
    }

    #[test]
    fn test_list_sorted_by_id() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        for name in ["one", "two", "three"] {
            store.insert(draft(name)).unwrap();
        }

        let names: Vec<_> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_fork_copies_fields_with_new_name() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        let original = store.insert(draft("Researcher")).unwrap();

        let forked = store.fork(original.id).unwrap();

        assert_ne!(forked.id, original.id);
        assert_eq!(forked.name, "Copy of Researcher");
        assert_eq!(forked.prompt, original.prompt);
        assert_eq!(forked.description, original.description);
        assert_eq!(forked.tools, original.tools);
    }

    #[test]
    fn test_fork_missing_agent_fails() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.fork(404).unwrap_err(),
            AgentryError::NotFound(_)
        ));
    }

    #[test]
    fn test_unknown_fields_preserved_on_rewrite() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("5.json"),
            r#"{"id": 5, "name": "Legacy", "owner": "alice"}"#,
        )
        .unwrap();

        let mut record = store.get(5).unwrap().unwrap();
        record.description = "updated".to_string();
        store.save(&record).unwrap();

        let reloaded = store.get(5).unwrap().unwrap();
        assert_eq!(reloaded.extra.get("owner").and_then(|v| v.as_str()), Some("alice"));
        assert_eq!(reloaded.description, "updated");
    }

    #[test]
    fn test_non_record_files_ignored() {
        let dir = TempDir::new().unwrap();
        let store = AgentStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a record").unwrap();
        fs::write(dir.path().join("draft.json.bak"), "{}").unwrap();

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.insert(draft("Fresh")).unwrap().id, 1);
    }
}
