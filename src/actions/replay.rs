use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use crate::{
    actions::Action,
    adapter::ViewCreationError,
    db_manager::{self, error_handling},
    replay,
};

#[derive(Debug, Args)]
pub struct Replay {
    /// A dump file, or a directory whose .sql dump files are replayed in
    /// path order
    path: String,
}

impl Replay {
    fn dump_files(&self) -> Result<Vec<String>> {
        let path = std::path::Path::new(&self.path);
        if !path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(path) {
            let entry = entry?;
            let is_dump = entry.path().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "sql")
                    .unwrap_or(false);
            if is_dump {
                files.push(entry.path().to_string_lossy().into_owned());
            }
        }
        files.sort();

        return Ok(files);
    }
}

#[async_trait]
impl Action for Replay {
    async fn execute(&self) -> Result<()> {
        let pool = db_manager::get_db_connection().await?;

        for file in self.dump_files()? {
            let text = std::fs::read_to_string(&file)?;
            let directives = replay::parse_dump(&text)?;

            println!(
                "Replaying {} ({} views):",
                file.magenta(),
                directives.len()
            );

            if let Err(e) = replay::apply(&pool, &directives).await {
                if let ViewCreationError::Execution { name, source } = &e {
                    println!(
                        "\t{}: {}",
                        name.magenta(),
                        error_handling::get_db_error(source)
                    );
                }
                return Err(e.into());
            }
        }

        return Ok(());
    }
}
