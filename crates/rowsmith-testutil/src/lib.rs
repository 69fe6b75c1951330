//! In-memory catalog and fixture schemas for rowsmith tests.
//!
//! [`MemoryCatalog`] behaves like a strict database: inserts are
//! all-or-nothing and reject NOT NULL, primary key, unique, foreign key,
//! enum and length violations with `ConstraintViolation`.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use rand::seq::SliceRandom;

use rowsmith_core::error::{Result, RowsmithError};
use rowsmith_core::generate::rows::SyntheticRow;
use rowsmith_core::generate::value::Value;
use rowsmith_core::schema::provider::MetadataProvider;
use rowsmith_core::schema::types::*;
use rowsmith_core::store::{ColumnProfile, InsertOutcome, RowStore};

struct MemTable {
    columns: Vec<ColumnDescriptor>,
    outgoing: Vec<ForeignKeyEdge>,
    rows: Vec<SyntheticRow>,
    next_id: i64,
}

#[derive(Default)]
struct State {
    tables: IndexMap<String, MemTable>,
    /// (table, rows) for every accepted insert, in order.
    insert_log: Vec<(String, usize)>,
}

/// A database held in memory.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a table. `fks` lists `(column, target_table, target_column)`.
    pub fn add_table(&self, name: &str, columns: Vec<ColumnDescriptor>, fks: &[(&str, &str, &str)]) {
        let outgoing = fks
            .iter()
            .map(|(column, target_table, target_column)| ForeignKeyEdge {
                source_table: name.to_string(),
                source_column: column.to_string(),
                target_table: target_table.to_string(),
                target_column: target_column.to_string(),
                constraint_name: format!("{}_{}_fk", name, column),
            })
            .collect();
        self.state().tables.insert(
            name.to_string(),
            MemTable {
                columns,
                outgoing,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// Builder form of [`add_table`](Self::add_table).
    pub fn with_table(self, name: &str, columns: Vec<ColumnDescriptor>, fks: &[(&str, &str, &str)]) -> Self {
        self.add_table(name, columns, fks);
        self
    }

    /// All committed rows of `table`, with generated ids filled in.
    pub fn rows(&self, table: &str) -> Vec<SyntheticRow> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.state().tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    /// Committed values of `table.column`, NULLs included.
    pub fn column_values(&self, table: &str, column: &str) -> Vec<Value> {
        self.rows(table)
            .into_iter()
            .map(|r| r.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Tables that received accepted inserts, in order.
    pub fn insert_log(&self) -> Vec<(String, usize)> {
        self.state().insert_log.clone()
    }

    /// Tables that received accepted inserts, in order, names only.
    pub fn insert_order(&self) -> Vec<String> {
        self.insert_log().into_iter().map(|(t, _)| t).collect()
    }
}

impl MetadataProvider for MemoryCatalog {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.state().tables.keys().cloned().collect())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.state()
            .tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| RowsmithError::NotFound {
                table: table.to_string(),
            })
    }

    async fn get_relations(&self, table: &str) -> Result<TableRelations> {
        let state = self.state();
        let outgoing = state
            .tables
            .get(table)
            .map(|t| t.outgoing.clone())
            .unwrap_or_default();
        let incoming = state
            .tables
            .values()
            .flat_map(|t| t.outgoing.iter())
            .filter(|e| e.target_table == table)
            .cloned()
            .collect();
        Ok(TableRelations { outgoing, incoming })
    }
}

impl RowStore for MemoryCatalog {
    async fn count_rows(&self, table: &str) -> Result<u64> {
        let state = self.state();
        let t = state.tables.get(table).ok_or_else(|| RowsmithError::NotFound {
            table: table.to_string(),
        })?;
        Ok(t.rows.len() as u64)
    }

    async fn sample_column(&self, table: &str, column: &str, limit: usize) -> Result<Vec<Value>> {
        let mut values: Vec<Value> = self
            .column_values(table, column)
            .into_iter()
            .filter(|v| !v.is_null())
            .collect();
        values.shuffle(&mut rand::rng());
        values.truncate(limit);
        Ok(values)
    }

    async fn insert(&self, table: &str, rows: &[SyntheticRow]) -> Result<InsertOutcome> {
        let mut state = self.state();
        let accepted = check_batch(&state, table, rows)?;

        let Some(t) = state.tables.get_mut(table) else {
            return Err(RowsmithError::NotFound {
                table: table.to_string(),
            });
        };
        let mut outcome = InsertOutcome {
            affected_rows: accepted.len() as u64,
            insert_id: 0,
        };
        for (row, id) in accepted {
            if let Some(id) = id {
                if outcome.insert_id == 0 {
                    outcome.insert_id = id as u64;
                }
                t.next_id = t.next_id.max(id + 1);
            }
            t.rows.push(row);
        }
        state.insert_log.push((table.to_string(), rows.len()));
        Ok(outcome)
    }

    async fn profile_column(&self, table: &str, column: &str, top_n: usize) -> Result<ColumnProfile> {
        let values = self.column_values(table, column);
        let null_count = values.iter().filter(|v| v.is_null()).count() as u64;

        let mut freq: IndexMap<String, (Value, usize)> = IndexMap::new();
        for v in values.into_iter().filter(|v| !v.is_null()) {
            freq.entry(v.to_unique_key()).or_insert((v, 0)).1 += 1;
        }
        let unique_count = freq.len() as u64;

        let mut ranked: Vec<(Value, usize)> = freq.into_values().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(ColumnProfile {
            sample_values: ranked.into_iter().take(top_n).map(|(v, _)| v).collect(),
            null_count,
            unique_count,
        })
    }
}

fn violation(table: &str, message: &str, detail: String) -> RowsmithError {
    RowsmithError::ConstraintViolation {
        table: table.to_string(),
        message: message.to_string(),
        source: detail.into(),
    }
}

/// Validate a whole batch and return the rows to store, each with its
/// generated id. Nothing is written if any row fails.
fn check_batch(state: &State, table: &str, rows: &[SyntheticRow]) -> Result<Vec<(SyntheticRow, Option<i64>)>> {
    let t = state.tables.get(table).ok_or_else(|| RowsmithError::NotFound {
        table: table.to_string(),
    })?;

    let mut seen: HashMap<&str, HashSet<String>> = HashMap::new();
    for column in &t.columns {
        if matches!(column.key, KeyRole::Primary | KeyRole::Unique) {
            let existing = t
                .rows
                .iter()
                .filter_map(|r| r.get(&column.name))
                .filter(|v| !v.is_null())
                .map(|v| v.to_unique_key())
                .collect();
            seen.insert(column.name.as_str(), existing);
        }
    }

    let mut next_id = t.next_id;
    let mut accepted = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(unknown) = row.keys().find(|k| t.columns.iter().all(|c| &c.name != *k)) {
            return Err(violation(table, "unknown column", format!("Unknown column '{}'", unknown)));
        }

        let mut stored = SyntheticRow::new();
        let mut generated_id = None;

        for column in &t.columns {
            let provided = row.get(&column.name).cloned();
            if column.auto_generated && provided.is_some() {
                return Err(violation(
                    table,
                    "generated column assigned",
                    format!("Column '{}' is generated and cannot be assigned", column.name),
                ));
            }

            let value = if column.auto_generated && column.data_type.is_integer() {
                let id = next_id;
                next_id += 1;
                generated_id = Some(id);
                Value::Int(id)
            } else {
                match provided {
                    Some(v) => v,
                    None => column
                        .default
                        .clone()
                        .map(Value::owned)
                        .unwrap_or(Value::Null),
                }
            };

            if value.is_null() && !column.nullable && !column.auto_generated {
                return Err(violation(
                    table,
                    "not-null violation",
                    format!("Column '{}' cannot be null", column.name),
                ));
            }

            if let (Some(max), Some(s)) = (column.max_length, value.as_str()) {
                if s.chars().count() > max as usize {
                    return Err(violation(
                        table,
                        "value too long",
                        format!("Data too long for column '{}'", column.name),
                    ));
                }
            }

            if let (Some(allowed), Some(s)) = (&column.enum_values, value.as_str()) {
                if !allowed.iter().any(|a| a == s) {
                    return Err(violation(
                        table,
                        "check constraint violation",
                        format!("Value '{}' not allowed for column '{}'", s, column.name),
                    ));
                }
            }

            if let Some(keys) = seen.get_mut(column.name.as_str()) {
                if !value.is_null() && !keys.insert(value.to_unique_key()) {
                    return Err(violation(
                        table,
                        "uniqueness violation",
                        format!("Duplicate entry '{}' for key '{}'", value, column.name),
                    ));
                }
            }

            stored.insert(column.name.clone(), value);
        }

        for edge in &t.outgoing {
            let Some(value) = stored.get(&edge.source_column).filter(|v| !v.is_null()) else {
                continue;
            };
            let key = value.to_unique_key();
            let committed = state
                .tables
                .get(&edge.target_table)
                .map(|target| {
                    target
                        .rows
                        .iter()
                        .any(|r| r.get(&edge.target_column).map(|v| v.to_unique_key()) == Some(key.clone()))
                })
                .unwrap_or(false);
            if !committed {
                return Err(violation(
                    table,
                    "foreign key violation",
                    format!(
                        "Cannot add row: {}.{} = {} has no match in {}.{}",
                        table, edge.source_column, value, edge.target_table, edge.target_column
                    ),
                ));
            }
        }

        accepted.push((stored, generated_id));
    }

    Ok(accepted)
}

/// Auto-increment integer primary key.
pub fn pk(name: &str) -> ColumnDescriptor {
    let mut c = ColumnDescriptor::new(name, DataType::Integer);
    c.key = KeyRole::Primary;
    c.nullable = false;
    c.auto_generated = true;
    c
}

/// NOT NULL column.
pub fn col(name: &str, data_type: DataType) -> ColumnDescriptor {
    let mut c = ColumnDescriptor::new(name, data_type);
    c.nullable = false;
    c
}

/// Nullable column.
pub fn nullable(name: &str, data_type: DataType) -> ColumnDescriptor {
    ColumnDescriptor::new(name, data_type)
}

/// NOT NULL string column with a length limit.
pub fn varchar(name: &str, max_length: u32) -> ColumnDescriptor {
    let mut c = col(name, DataType::VarChar);
    c.max_length = Some(max_length);
    c.raw_type = format!("varchar({})", max_length);
    c
}

/// Integer FK column.
pub fn fk(name: &str, nullable: bool) -> ColumnDescriptor {
    let mut c = ColumnDescriptor::new(name, DataType::Integer);
    c.key = KeyRole::Foreign;
    c.nullable = nullable;
    c
}

/// Mark a column unique.
pub fn unique(mut c: ColumnDescriptor) -> ColumnDescriptor {
    c.key = KeyRole::Unique;
    c
}

/// `users` and `posts`, posts.user_id NOT NULL → users.id.
pub fn blog_catalog() -> MemoryCatalog {
    let mut published = col("published", DataType::TinyInt);
    published.display_width = Some(1);

    MemoryCatalog::new()
        .with_table(
            "users",
            vec![
                pk("id"),
                varchar("name", 100),
                unique(varchar("email", 255)),
                nullable("created_at", DataType::DateTime),
            ],
            &[],
        )
        .with_table(
            "posts",
            vec![
                pk("id"),
                fk("user_id", false),
                varchar("title", 200),
                nullable("body", DataType::Text),
                published,
            ],
            &[("user_id", "users", "id")],
        )
}

/// `categories.parent_id` → `categories.id`, nullable.
pub fn nullable_self_reference_catalog() -> MemoryCatalog {
    MemoryCatalog::new().with_table(
        "categories",
        vec![pk("id"), varchar("label", 50), fk("parent_id", true)],
        &[("parent_id", "categories", "id")],
    )
}

/// `employees.manager_id` → `employees.id`, NOT NULL.
pub fn required_self_reference_catalog() -> MemoryCatalog {
    MemoryCatalog::new().with_table(
        "employees",
        vec![pk("id"), varchar("label", 50), fk("manager_id", false)],
        &[("manager_id", "employees", "id")],
    )
}

/// `alpha.beta_id` → `beta.id` and `beta.alpha_id` → `alpha.id`, both NOT NULL.
pub fn cycle_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_table("alpha", vec![pk("id"), fk("beta_id", false)], &[("beta_id", "beta", "id")])
        .with_table("beta", vec![pk("id"), fk("alpha_id", false)], &[("alpha_id", "alpha", "id")])
}

/// `tasks` → `teams` → `orgs` and `tasks` → `projects` → `orgs`.
pub fn diamond_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_table("orgs", vec![pk("id"), varchar("company", 100)], &[])
        .with_table("teams", vec![pk("id"), fk("org_id", false)], &[("org_id", "orgs", "id")])
        .with_table("projects", vec![pk("id"), fk("org_id", false)], &[("org_id", "orgs", "id")])
        .with_table(
            "tasks",
            vec![pk("id"), fk("team_id", false), fk("project_id", false)],
            &[("team_id", "teams", "id"), ("project_id", "projects", "id")],
        )
}

/// `orders.customer_id` → `customers.id`, but `customers` does not exist.
pub fn dangling_catalog() -> MemoryCatalog {
    MemoryCatalog::new().with_table(
        "orders",
        vec![pk("id"), fk("customer_id", false)],
        &[("customer_id", "customers", "id")],
    )
}
