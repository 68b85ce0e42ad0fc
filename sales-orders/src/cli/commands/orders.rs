//! `orders` subcommands

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::AppContext;
use crate::cli::output::OutputFormat;
use crate::records::{Entity, RawRecord};

#[derive(Subcommand, Debug)]
pub enum OrdersCommands {
    /// Add one repeat order
    Add(OrderForm),
    /// Import orders from a CSV or Excel file
    Import {
        /// Source file (.csv, .xlsx, .xls, .ods)
        file: PathBuf,
    },
    /// List all orders
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Field flags for `orders add`
///
/// Values are taken as text so malformed numbers reach the validator and
/// are reported by field name.
#[derive(Args, Debug, Default)]
pub struct OrderForm {
    /// Id of the sales representative who took the order
    #[arg(long, value_name = "ID")]
    pub sales_id: Option<String>,
    #[arg(long)]
    pub customer_name: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub quantity: Option<String>,
    /// Order date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub order_date: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    /// Prompt for every field
    #[arg(short, long)]
    pub interactive: bool,
}

impl OrderForm {
    pub fn to_raw(&self) -> RawRecord {
        [
            ("sales_id", &self.sales_id),
            ("customer_name", &self.customer_name),
            ("product", &self.product),
            ("quantity", &self.quantity),
            ("order_date", &self.order_date),
            ("amount", &self.amount),
            ("status", &self.status),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

pub async fn handle_orders_command(ctx: &AppContext, command: OrdersCommands) -> Result<()> {
    let entity = Entity::Orders;
    match command {
        OrdersCommands::Add(form) => {
            super::add_record(ctx, entity, form.to_raw(), form.interactive).await
        }
        OrdersCommands::Import { file } => super::import_records(ctx, entity, &file).await,
        OrdersCommands::List { format } => super::show(ctx, entity, format).await,
    }
}
