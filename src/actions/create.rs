use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use crate::{
    actions::Action,
    adapter::{self, CreateViewOptions},
    db_manager,
};

#[derive(Debug, Args)]
pub struct Create {
    /// The view name, optionally schema-qualified and/or quoted, e.g.
    /// searches, reporting.searches or '"search in a haystack"'
    name: String,

    /// Create a materialized view instead of a plain view
    #[arg(short, long)]
    materialized: bool,

    /// Leave the materialized view unpopulated (WITH NO DATA)
    #[arg(long, requires = "materialized")]
    no_data: bool,

    /// The SELECT body defining the view
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    sql: Option<String>,

    /// Read the SELECT body from a file
    #[arg(short, long, conflicts_with = "sql", required_unless_present = "sql")]
    file: Option<String>,
}

#[async_trait]
impl Action for Create {
    async fn execute(&self) -> Result<()> {
        let sql_definition = match (&self.sql, &self.file) {
            (Some(sql), _) => sql.clone(),
            (None, Some(file)) => std::fs::read_to_string(file)?,
            (None, None) => anyhow::bail!("One of --sql or --file must be provided"),
        };

        let pool = db_manager::get_db_connection().await?;

        adapter::create_view(
            &pool,
            &self.name,
            &sql_definition,
            &CreateViewOptions {
                materialized: self.materialized,
                no_data: self.no_data,
            },
        )
        .await?;

        println!("\tCreated view {}", self.name.magenta());

        return Ok(());
    }
}
