use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use crate::{
    actions::Action,
    catalog::{self, ExclusionList},
    config::UserConfig,
    db_manager, serializer,
};

#[derive(Debug, Args)]
pub struct Dump {
    /// Write the dump to this file instead of stdout
    #[arg(short, long)]
    out: Option<String>,
}

#[async_trait]
impl Action for Dump {
    async fn execute(&self) -> Result<()> {
        let pool = db_manager::get_db_connection().await?;
        let config = UserConfig::get_global();

        let mut exclusions = ExclusionList::default();
        exclusions.extend(config.dump_options.exclude.iter().cloned());

        let records = catalog::list_views(&pool, &exclusions).await?;
        let records = serializer::ordered(records, &exclusions);

        let (blocks, skipped) =
            serializer::serialize_with_policy(&records, config.dump_options.on_serialize_error)?;

        // Diagnostics go to stderr: stdout may be the dump sink and must
        // carry nothing but replayable blocks.
        for e in &skipped {
            eprintln!("\t{}: skipping view: {}", "Warning".yellow(), e);
        }

        // Blocks already end with a newline; joining adds the blank line
        // separating them.
        let output = blocks.join("\n");

        match &self.out {
            Some(out) => {
                let parent = std::path::Path::new(out).parent();
                if let Some(parent) = parent {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(out, &output)?;
                println!("Dumped {} views to {}", blocks.len(), out.magenta());
            }
            None => std::io::stdout().write_all(output.as_bytes())?,
        }

        return Ok(());
    }
}
