//! Batch decode and flatten over many rows.
//!
//! Rows are independent, so they are mapped on the rayon pool when
//! `batch.parallel` is set (a dedicated pool when `batch.threads` is non-zero).
//! A bad row is skipped and recorded in the outcome's diagnostics unless
//! `batch.fail_fast` is set. Configuration errors always abort the batch.
//! Rows decoded with an unknown operator are kept and recorded as warnings.

use gridmap_core::{BatchDiagnostics, Entity, EntityKind, MappingError, MappingResult};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::context::{ReferenceIndex, Substitution};
use crate::processor;
use crate::record::{FieldRecord, FlatRecord};
use crate::strategy::StrategyRegistry;

/// Mapped items in input order, plus what happened to the skipped rows.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub diagnostics: BatchDiagnostics,
}

impl<T> BatchOutcome<T> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.stats.skipped == 0
    }
}

/// Decode rows of one kind, resolving references through `index`.
///
/// The kind's strategy tree is prepared first, so a broken catalog fails
/// before any row is touched.
pub fn decode_batch(
    registry: &StrategyRegistry,
    kind: EntityKind,
    records: &[FieldRecord],
    index: &ReferenceIndex,
    config: &BatchConfig,
) -> MappingResult<BatchOutcome<Entity>> {
    registry.prepare(&[kind])?;
    let catalog = registry.catalog_for(kind)?;

    let results = run(records, config, |record| {
        let resolution = index.resolve(&catalog, record)?;
        let entity = registry.decode_entity(kind, record, &resolution.context)?;
        Ok((entity, resolution.substitutions))
    })?;

    let outcome = fold(results, config, |row| {
        records[row]
            .get("id")
            .map_or_else(|| kind.name().to_string(), |id| format!("{kind} '{id}'"))
    })?;
    info!(entity = %kind, "decoded batch: {}", outcome.diagnostics.summary());
    Ok(outcome)
}

/// Flatten entities into records.
pub fn flatten_batch(
    entities: &[Entity],
    config: &BatchConfig,
) -> MappingResult<BatchOutcome<FlatRecord>> {
    let results = run(entities, config, |entity| {
        processor::flatten(entity).map(|flat| (flat, Vec::new()))
    })?;
    let outcome = fold(results, config, |row| {
        let entity = &entities[row];
        format!("{} '{}'", entity.kind(), entity.label())
    })?;
    info!("flattened batch: {}", outcome.diagnostics.summary());
    Ok(outcome)
}

fn run<I, T, F>(inputs: &[I], config: &BatchConfig, map: F) -> MappingResult<Vec<MappingResult<T>>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> MappingResult<T> + Sync + Send,
{
    if !config.parallel {
        return Ok(inputs.iter().map(&map).collect());
    }
    if config.threads == 0 {
        return Ok(inputs.par_iter().map(&map).collect());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| MappingError::Config(format!("cannot build batch thread pool: {e}")))?;
    Ok(pool.install(|| inputs.par_iter().map(&map).collect()))
}

fn fold<T>(
    results: Vec<MappingResult<(T, Vec<Substitution>)>>,
    config: &BatchConfig,
    label: impl Fn(usize) -> String,
) -> MappingResult<BatchOutcome<T>> {
    let mut items = Vec::with_capacity(results.len());
    let mut diagnostics = BatchDiagnostics::new();

    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok((item, substitutions)) => {
                for substitution in &substitutions {
                    let message = substitution.to_string();
                    diagnostics.record_warning(i + 1, &label(i), "reference", message);
                }
                items.push(item);
                diagnostics.record_success();
            }
            Err(err) if err.is_configuration() || config.fail_fast => return Err(err),
            Err(err) => {
                // rows are numbered from 1, as in the source file
                let row = i + 1;
                let entity = label(i);
                warn!(row, entity = %entity, code = err.code(), error = %err, "skipping row");
                diagnostics.record_failure(row, &entity, &err);
            }
        }
    }
    Ok(BatchOutcome { items, diagnostics })
}
