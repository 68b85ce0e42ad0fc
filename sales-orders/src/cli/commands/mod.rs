//! Command handlers shared by the `sales` and `orders` subcommands

pub mod form;
pub mod orders;
pub mod sales;

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use crate::error::{ImportError, WriteError};
use crate::import::BulkImporter;
use crate::projection;
use crate::records::{Entity, RawRecord, RecordWriter};

use super::AppContext;
use super::output::{self, OutputFormat};

/// Handle `init`
pub async fn handle_init(ctx: &AppContext) -> Result<()> {
    let reps = ctx.store.count(Entity::Representatives).await?;
    let orders = ctx.store.count(Entity::Orders).await?;
    let tables = ctx.store.table_names().await?;

    println!(
        "{} Database ready at {}",
        "✓".green(),
        ctx.store.location().cyan()
    );
    println!("  Tables: {}", tables.join(", "));
    println!("  {} sales representative(s), {} order(s)", reps, orders);
    Ok(())
}

/// Submit one form record through the strict writer
///
/// When prompting, a validation failure is shown as a notice and the form
/// is asked again with the entered values kept.
pub async fn add_record(
    ctx: &AppContext,
    entity: Entity,
    form: RawRecord,
    interactive: bool,
) -> Result<()> {
    let writer = RecordWriter::new(&ctx.store, ctx.normalizer)
        .with_reference_policy(ctx.config.reference_policy);
    let prompt = form::should_prompt(interactive, &form);

    let mut form = form;
    let id = loop {
        if prompt {
            form = form::prompt_form(entity, ctx.normalizer.today(), &form)?;
        }

        match writer.submit(entity, &form).await {
            Ok(id) => break id,
            Err(WriteError::Validation(err)) if prompt => {
                eprintln!("{} {}", "Warning:".yellow().bold(), err);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Could not add {}", entity));
            }
        }
    };

    println!("{} Added {} {}", "✓".green(), entity, id.to_string().bold());
    show(ctx, entity, OutputFormat::Table).await
}

/// Bulk import a CSV or workbook file
pub async fn import_records(ctx: &AppContext, entity: Entity, path: &Path) -> Result<()> {
    let importer = BulkImporter::new(&ctx.store, ctx.normalizer)
        .with_reference_policy(ctx.config.reference_policy);

    match importer.import_file(entity, path).await {
        Ok(report) => {
            println!("{}", output::render_report(&report));
            show(ctx, entity, OutputFormat::Table).await
        }
        Err(err) => {
            // Rows written before a storage failure are kept; show them
            if let ImportError::Storage { persisted, .. } = &err
                && *persisted > 0
                && let Err(show_err) = show(ctx, entity, OutputFormat::Table).await
            {
                log::error!("Could not list {} rows after failed import: {:#}", entity, show_err);
            }
            Err(err).with_context(|| format!("Import from {} failed", path.display()))
        }
    }
}

/// Print the current rows of an entity
pub async fn show(ctx: &AppContext, entity: Entity, format: OutputFormat) -> Result<()> {
    let grid = projection::project(&ctx.store, entity).await?;
    let rendered = output::render(&grid, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
