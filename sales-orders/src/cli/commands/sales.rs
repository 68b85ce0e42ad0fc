//! `sales` subcommands

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::AppContext;
use crate::cli::output::OutputFormat;
use crate::records::{Entity, RawRecord};

#[derive(Subcommand, Debug)]
pub enum SalesCommands {
    /// Add one sales representative
    Add(SalesForm),
    /// Import representatives from a CSV or Excel file
    Import {
        /// Source file (.csv, .xlsx, .xls, .ods)
        file: PathBuf,
    },
    /// List all representatives
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Field flags for `sales add`; omitted flags are left to defaults
#[derive(Args, Debug, Default)]
pub struct SalesForm {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Join date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub join_date: Option<String>,
    #[arg(long)]
    pub territory: Option<String>,
    /// Prompt for every field
    #[arg(short, long)]
    pub interactive: bool,
}

impl SalesForm {
    pub fn to_raw(&self) -> RawRecord {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("join_date", &self.join_date),
            ("territory", &self.territory),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

pub async fn handle_sales_command(ctx: &AppContext, command: SalesCommands) -> Result<()> {
    let entity = Entity::Representatives;
    match command {
        SalesCommands::Add(form) => {
            super::add_record(ctx, entity, form.to_raw(), form.interactive).await
        }
        SalesCommands::Import { file } => super::import_records(ctx, entity, &file).await,
        SalesCommands::List { format } => super::show(ctx, entity, format).await,
    }
}
