//! Event ledger for simulation history.
//!
//! A `tracing` subscriber that files every recorded event into a table named
//! after the event's target (`day`, `family_day`, `death`, `birth`, ...).
//! Columns are created from the event fields the first time they appear, so
//! the schema follows whatever the simulation emits.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "death", day, person_id, family_id, age);
//!
//! // In a test:
//! let (report, ledger) = instrument::capture(|| engine.run(30));
//! assert_eq!(ledger.rows("death"), 2);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

/// One typed column. Rows that did not carry the field hold the type's zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::U64(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::F64(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fill_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            Column::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Column::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Column::F64(v) => v.extend(std::iter::repeat_n(0.0, missing)),
            Column::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            Column::Str(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

/// All rows recorded under one target.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: BTreeMap<String, Column>,
    pub rows: usize,
}

impl Table {
    pub fn u64s(&self, name: &str) -> Option<&[u64]> {
        match self.columns.get(name)? {
            Column::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn i64s(&self, name: &str) -> Option<&[i64]> {
        match self.columns.get(name)? {
            Column::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn f64s(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            Column::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn strs(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name)? {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }

    fn close_row(&mut self) {
        self.rows += 1;
        let rows = self.rows;
        for column in self.columns.values_mut() {
            column.fill_to(rows);
        }
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub tables: BTreeMap<String, Table>,
}

impl Ledger {
    pub fn table(&self, target: &str) -> Option<&Table> {
        self.tables.get(target)
    }

    /// Number of rows recorded under `target`; zero when nothing was emitted.
    pub fn rows(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, |t| t.rows)
    }
}

struct RowVisitor<'a> {
    table: &'a mut Table,
}

impl RowVisitor<'_> {
    fn column(&mut self, field: &Field, empty: impl FnOnce(usize) -> Column) -> &mut Column {
        let rows = self.table.rows;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| empty(rows))
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let Column::U64(v) = self.column(field, |n| Column::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let Column::I64(v) = self.column(field, |n| Column::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Column::F64(v) = self.column(field, |n| Column::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let Column::Bool(v) = self.column(field, |n| Column::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let Column::Str(v) = self.column(field, |n| Column::Str(vec![String::new(); n])) {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Subscriber that appends each event as a row of its target's table.
///
/// Cloning shares the underlying ledger, so a test can keep one handle while
/// the other is installed as the dispatcher.
#[derive(Clone, Default)]
pub struct LedgerSubscriber {
    ledger: Arc<Mutex<Ledger>>,
}

impl LedgerSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take everything recorded so far, leaving the ledger empty.
    pub fn take(&self) -> Ledger {
        std::mem::take(&mut *self.lock())
    }
}

impl Subscriber for LedgerSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // Events only; debug and trace chatter stays out of the history.
        metadata.is_event() && *metadata.level() <= Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut ledger = self.lock();
        let table = ledger
            .tables
            .entry(event.metadata().target().to_string())
            .or_default();
        event.record(&mut RowVisitor { table: &mut *table });
        table.close_row();
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with a fresh ledger installed as the thread's default subscriber.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Ledger) {
    let subscriber = LedgerSubscriber::new();
    let out = tracing::subscriber::with_default(subscriber.clone(), f);
    (out, subscriber.take())
}

// === Polars Integration ===

use polars::prelude::*;

impl Table {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<polars::prelude::Column> = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                Column::U64(v) => polars::prelude::Column::new(name.into(), v),
                Column::I64(v) => polars::prelude::Column::new(name.into(), v),
                Column::F64(v) => polars::prelude::Column::new(name.into(), v),
                Column::Bool(v) => polars::prelude::Column::new(name.into(), v),
                Column::Str(v) => polars::prelude::Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Ledger {
    pub fn to_dataframes(&self) -> PolarsResult<BTreeMap<String, DataFrame>> {
        self.tables
            .iter()
            .map(|(name, table)| Ok((name.clone(), table.to_dataframe()?)))
            .collect()
    }

    /// Write each table to `{dir}/{target}.parquet`.
    pub fn write_parquet(&self, dir: &Path) -> PolarsResult<()> {
        std::fs::create_dir_all(dir).map_err(|e| PolarsError::IO {
            error: e.into(),
            msg: None,
        })?;
        for (name, mut df) in self.to_dataframes()? {
            let file = std::fs::File::create(dir.join(format!("{name}.parquet"))).map_err(|e| {
                PolarsError::IO {
                    error: e.into(),
                    msg: None,
                }
            })?;
            ParquetWriter::new(file).finish(&mut df)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_target_tables() {
        let ((), ledger) = capture(|| {
            tracing::info!(target: "death", day = 3u32, person_id = 7u32, age = 20000u32);
            tracing::info!(target: "death", day = 4u32, person_id = 9u32, age = 31u32);
            tracing::info!(target: "birth", day = 4u32, child_id = 12u32, gender = "F");
        });

        assert_eq!(ledger.rows("death"), 2);
        assert_eq!(ledger.rows("birth"), 1);
        assert_eq!(ledger.rows("emergency"), 0);

        let deaths = ledger.table("death").unwrap();
        assert_eq!(deaths.u64s("day").unwrap(), &[3, 4]);
        assert_eq!(deaths.u64s("person_id").unwrap(), &[7, 9]);
        assert_eq!(ledger.table("birth").unwrap().strs("gender").unwrap(), &["F"]);
    }

    #[test]
    fn sparse_fields_are_padded() {
        let ((), ledger) = capture(|| {
            tracing::info!(target: "family_day", day = 1u32, outcome = "skipped");
            tracing::info!(target: "family_day", day = 2u32, supply = 2250i64, outcome = "surplus");
            tracing::info!(target: "family_day", day = 3u32);
        });

        let table = ledger.table("family_day").unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(table.i64s("supply").unwrap(), &[0, 2250, 0]);
        assert_eq!(table.strs("outcome").unwrap(), &["skipped", "surplus", ""]);
        for column in table.columns.values() {
            assert_eq!(column.len(), 3);
        }
    }

    #[test]
    fn debug_level_events_are_ignored() {
        let ((), ledger) = capture(|| {
            tracing::debug!(target: "day", day = 1u32);
            tracing::warn!(target: "policy_gap", age = 40000u32);
        });
        assert_eq!(ledger.rows("day"), 0);
        assert_eq!(ledger.rows("policy_gap"), 1);
    }

    #[test]
    fn tables_convert_to_dataframes() {
        let ((), ledger) = capture(|| {
            tracing::info!(target: "day", day = 1u32, living = 10u64, ratio = 0.5f64);
            tracing::info!(target: "day", day = 2u32, living = 9u64, ratio = 0.25f64);
        });
        let frames = ledger.to_dataframes().unwrap();
        let df = &frames["day"];
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }
}
