use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use crate::{
    actions::Action,
    adapter::{self, DropViewOptions},
    db_manager,
};

#[derive(Debug, Args)]
pub struct Drop {
    /// The view name, optionally schema-qualified and/or quoted
    name: String,

    /// The view is a materialized view
    #[arg(short, long)]
    materialized: bool,

    /// Do not fail when the view does not exist
    #[arg(long)]
    if_exists: bool,

    /// Also drop objects that depend on the view
    #[arg(long)]
    cascade: bool,
}

#[async_trait]
impl Action for Drop {
    async fn execute(&self) -> Result<()> {
        let pool = db_manager::get_db_connection().await?;

        adapter::drop_view(
            &pool,
            &self.name,
            &DropViewOptions {
                materialized: self.materialized,
                if_exists: self.if_exists,
                cascade: self.cascade,
            },
        )
        .await?;

        println!("\tDropped view {}", self.name.magenta());

        return Ok(());
    }
}
