//! # Dependency Resolver
//!
//! Makes sure every table a target table references (directly or through
//! other tables) holds enough committed rows before the target's own rows are
//! assembled. Under-populated ancestors are seeded parents-first.
//!
//! The walk is an iterative post-order DFS over outgoing FK edges with an
//! explicit stack. A table is marked visited when it is entered, which stops
//! diamonds from seeding a shared ancestor twice and cycles from looping.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{Result, RowsmithError};
use crate::generate::rows::RowAssembler;
use crate::schema::provider::MetadataProvider;
use crate::schema::types::{ForeignKeyEdge, TableMetadata};
use crate::store::RowStore;

enum Frame {
    /// Inspect a referenced table, reached through `via`.
    Enter { table: String, via: ForeignKeyEdge },
    /// All ancestors of this table are handled; seed it.
    Exit(TableMetadata),
}

/// Per-request ancestor walk.
pub struct DependencyResolver {
    seed_rows: u64,
    min_parent_rows: u64,
    visited: HashSet<String>,
    seeded: Vec<String>,
}

impl DependencyResolver {
    pub fn new(seed_rows: u64, min_parent_rows: u64) -> Self {
        Self {
            seed_rows,
            min_parent_rows: min_parent_rows.max(1),
            visited: HashSet::new(),
            seeded: Vec::new(),
        }
    }

    /// Tables entered so far, including the root.
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Tables seeded so far, in insertion order.
    pub fn seeded(&self) -> &[String] {
        &self.seeded
    }

    /// Seed every under-populated ancestor of `root`, parents before children.
    ///
    /// `root` itself is never seeded here. Self-references are not walked:
    /// a self-referencing table is satisfiable once it holds a row, which is
    /// decided when its rows are assembled.
    pub async fn ensure_populated<C>(
        &mut self,
        catalog: &C,
        assembler: &mut RowAssembler,
        root: &TableMetadata,
    ) -> Result<()>
    where
        C: MetadataProvider + RowStore,
    {
        let known: HashSet<String> = catalog.list_tables().await?.into_iter().collect();

        self.visited.insert(root.name.clone());
        let mut stack: Vec<Frame> = Vec::new();
        push_parents(&mut stack, root);

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { table, via } => {
                    if self.visited.contains(&table) {
                        continue;
                    }
                    if !known.contains(&table) {
                        return Err(RowsmithError::SchemaNotFound {
                            source_table: via.source_table,
                            source_column: via.source_column,
                            target_table: via.target_table,
                            constraint: via.constraint_name,
                        });
                    }
                    self.visited.insert(table.clone());

                    let rows = catalog.count_rows(&table).await?;
                    if rows >= self.min_parent_rows {
                        debug!("{} already has {} rows", table, rows);
                        continue;
                    }

                    let metadata = catalog.table_metadata(&table).await?;
                    debug!(
                        "{} has {} rows (need {}), walking its parents first",
                        table, rows, self.min_parent_rows
                    );
                    let mut parents = Vec::new();
                    push_parents(&mut parents, &metadata);
                    stack.push(Frame::Exit(metadata));
                    stack.extend(parents);
                }
                Frame::Exit(metadata) => {
                    let (outcome, _) = assembler
                        .populate(catalog, &metadata, self.seed_rows)
                        .await?;
                    info!(
                        "Seeded {} rows into ancestor table {}",
                        outcome.affected_rows, metadata.name
                    );
                    self.seeded.push(metadata.name);
                }
            }
        }

        Ok(())
    }
}

/// Push an Enter frame for every non-self outgoing edge, so that the first
/// declared edge is popped first.
fn push_parents(stack: &mut Vec<Frame>, table: &TableMetadata) {
    for edge in table.outgoing.iter().rev() {
        if edge.is_self_reference() {
            continue;
        }
        stack.push(Frame::Enter {
            table: edge.target_table.clone(),
            via: edge.clone(),
        });
    }
}
