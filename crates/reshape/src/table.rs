use core_types::WideRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A wide table: one row per (athlete, timestamp), ordered by athlete then time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    columns: Vec<String>,
    rows: Vec<WideRecord>,
}

impl WideTable {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<WideRecord>) -> Self {
        Self { columns, rows }
    }

    /// The requested metrics, in request order. A column can be entirely empty.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[WideRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_entity<'a>(&'a self, entity_id: &'a str) -> impl Iterator<Item = &'a WideRecord> {
        self.rows.iter().filter(move |row| row.entity_id == entity_id)
    }

    pub fn entities(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.entity_id.as_str()).collect()
    }

    pub fn into_rows(self) -> Vec<WideRecord> {
        self.rows
    }
}
