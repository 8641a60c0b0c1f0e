//! Execution plans built from a reconciliation.

use crate::error::{CoreError, CoreResult};
use crate::ledger_sql::insert_statement;
use crate::record::MigrationRecord;
use std::path::{Path, PathBuf};

/// What running a plan item means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanBody {
    /// SQL text executed as one batch against the ledger's connection
    Sql(String),
    /// Path of an executable run as a child process
    Command(PathBuf),
}

/// Lifecycle of a plan item during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanState {
    /// Not yet processed
    #[default]
    Pending,
    /// Body ran and the ledger row was written
    Applied,
    /// Body skipped, ledger row written anyway (fresh database seeded elsewhere)
    Ghost,
}

/// One pending migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    pub filename: String,
    pub content_hash: String,
    pub body: PlanBody,
    /// Statement recording this migration in the ledger
    pub insert_statement: String,
    pub state: PlanState,
}

impl PlanItem {
    /// Render the dry-run description of this item
    pub fn render(&self) -> String {
        let body = match &self.body {
            PlanBody::Sql(sql) => format!("sql: {}", sql.trim_end_matches(['\n', '\r'])),
            PlanBody::Command(path) => format!("command: {}", path.display()),
        };
        format!("{}\nmigration info: {}", body, self.insert_statement)
    }
}

/// Ordered list of pending migrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub items: Vec<PlanItem>,
}

impl ExecutionPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the whole plan for a dry run, one item after the other.
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(PlanItem::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Filenames of items in the given state, in plan order
    pub fn filenames_in(&self, state: PlanState) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.state == state)
            .map(|item| item.filename.as_str())
            .collect()
    }
}

/// True when the file is run as SQL rather than as an executable.
pub fn is_sql_migration(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|ext| ext == "sql")
}

/// Build the ordered plan for `to_run`, reading SQL bodies from `dir`.
///
/// Items are sorted by filename regardless of input order.
pub fn build_plan(
    dir: &Path,
    to_run: &[MigrationRecord],
    date_function: &str,
) -> CoreResult<ExecutionPlan> {
    let mut records: Vec<&MigrationRecord> = to_run.iter().collect();
    records.sort();

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let path = dir.join(&record.filename);
        let body = if is_sql_migration(&record.filename) {
            let sql = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
            PlanBody::Sql(sql)
        } else {
            PlanBody::Command(path)
        };
        items.push(PlanItem {
            filename: record.filename.clone(),
            content_hash: record.content_hash.clone(),
            body,
            insert_statement: insert_statement(
                &record.filename,
                &record.content_hash,
                date_function,
            ),
            state: PlanState::Pending,
        });
    }
    Ok(ExecutionPlan { items })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
