//! Embedded document store backed by redb.
//!
//! # Table design
//!
//! One table per document kind (`users`, `skills`, `tasks`, `projects`),
//! each keyed by the document id string with a JSON-encoded value:
//! ```text
//! users:    id -> User JSON
//! skills:   id -> Skill JSON
//! tasks:    id -> Task JSON
//! projects: id -> Project JSON
//! ```
//!
//! All multi-document mutations go through [`Store::write`], which runs the
//! closure inside a single redb write transaction. redb admits one writer at
//! a time, so concurrent workflows touching the same user are serialised and
//! every read used for a decision sees the latest committed state.

use std::path::Path;

use redb::{Database, DatabaseError, ReadTransaction, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{QuestError, Result};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

pub type DocTable = TableDefinition<'static, &'static str, &'static [u8]>;

pub(crate) const USERS: DocTable = TableDefinition::new("users");
pub(crate) const SKILLS: DocTable = TableDefinition::new("skills");
pub(crate) const TASKS: DocTable = TableDefinition::new("tasks");
pub(crate) const PROJECTS: DocTable = TableDefinition::new("projects");

const ALL_TABLES: [DocTable; 4] = [USERS, SKILLS, TASKS, PROJECTS];

fn store_err(e: impl std::fmt::Display) -> QuestError {
    QuestError::Store(e.to_string())
}

/// Fresh random document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A JSON document stored in one of the store's tables.
pub trait Document: Serialize + DeserializeOwned {
    const TABLE: DocTable;

    fn id(&self) -> &str;

    /// The not-found error for this document kind.
    fn missing(id: &str) -> QuestError;
}

/// Read access shared by read and write transactions.
pub trait DocumentReader {
    fn raw_get(&self, table: DocTable, id: &str) -> Result<Option<Vec<u8>>>;

    fn raw_scan(&self, table: DocTable) -> Result<Vec<Vec<u8>>>;

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>> {
        match self.raw_get(D::TABLE, id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but a missing document is an error.
    fn load<D: Document>(&self, id: &str) -> Result<D> {
        self.get(id)?.ok_or_else(|| D::missing(id))
    }

    fn list<D: Document>(&self) -> Result<Vec<D>> {
        self.raw_scan(D::TABLE)?
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(QuestError::from))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    db: Database,
}

impl Store {
    /// Open or create the database at `path`, creating every table up front.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_directory(parent)?;
        }
        let db = Database::create(path).map_err(|e| match e {
            DatabaseError::DatabaseAlreadyOpen => {
                QuestError::WorkspaceBusy(path.display().to_string())
            }
            other => store_err(other),
        })?;
        let wt = db.begin_write().map_err(store_err)?;
        for table in ALL_TABLES {
            wt.open_table(table).map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    /// Run `f` against a consistent snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&ReadTx) -> Result<T>) -> Result<T> {
        let tx = ReadTx {
            txn: self.db.begin_read().map_err(store_err)?,
        };
        f(&tx)
    }

    /// Run `f` in a write transaction: committed if `f` returns `Ok`,
    /// rolled back otherwise.
    pub fn write<T>(&self, f: impl FnOnce(&WriteTx) -> Result<T>) -> Result<T> {
        let tx = WriteTx {
            txn: self.db.begin_write().map_err(store_err)?,
        };
        match f(&tx) {
            Ok(value) => {
                tx.txn.commit().map_err(store_err)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = tx.txn.abort() {
                    tracing::warn!("failed to abort write transaction: {abort}");
                }
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub struct ReadTx {
    txn: ReadTransaction,
}

impl DocumentReader for ReadTx {
    fn raw_get(&self, table: DocTable, id: &str) -> Result<Option<Vec<u8>>> {
        let table = self.txn.open_table(table).map_err(store_err)?;
        let value = table.get(id).map_err(store_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn raw_scan(&self, table: DocTable) -> Result<Vec<Vec<u8>>> {
        let table = self.txn.open_table(table).map_err(store_err)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            out.push(v.value().to_vec());
        }
        Ok(out)
    }
}

pub struct WriteTx {
    txn: WriteTransaction,
}

impl WriteTx {
    /// Insert or replace `doc` under its id.
    pub fn put<D: Document>(&self, doc: &D) -> Result<()> {
        let value = serde_json::to_vec(doc)?;
        let mut table = self.txn.open_table(D::TABLE).map_err(store_err)?;
        table
            .insert(doc.id(), value.as_slice())
            .map_err(store_err)?;
        Ok(())
    }

    /// Remove the document with `id`. Returns whether it existed.
    pub fn delete<D: Document>(&self, id: &str) -> Result<bool> {
        let mut table = self.txn.open_table(D::TABLE).map_err(store_err)?;
        let removed = table.remove(id).map_err(store_err)?;
        Ok(removed.is_some())
    }
}

impl DocumentReader for WriteTx {
    fn raw_get(&self, table: DocTable, id: &str) -> Result<Option<Vec<u8>>> {
        let table = self.txn.open_table(table).map_err(store_err)?;
        let value = table.get(id).map_err(store_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn raw_scan(&self, table: DocTable) -> Result<Vec<Vec<u8>>> {
        let table = self.txn.open_table(table).map_err(store_err)?;
        let mut out = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, v) = entry.map_err(store_err)?;
            out.push(v.value().to_vec());
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
