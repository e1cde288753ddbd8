use async_trait::async_trait;
use clap::Args;
use colored::Colorize;

use crate::actions::Action;
use crate::config::USER_CONFIG_LOCATION;
use crate::db_manager::ENV_LOCATION;

const ENV_TEMPLATE: &str = "DB_USER=****\nDB_PASSWORD=****\nDB_HOST=****\nDB_PORT=****\nDB_NAME=****\n";

const CONFIG_TEMPLATE: &str = "dump_options:\n    # abort | skip\n    on_serialize_error: abort\n    exclude: []\n";

#[derive(Debug, Args)]
pub struct Init {}

impl Init {
    pub fn init_directories(&self) -> anyhow::Result<()> {
        colored::control::set_override(true);

        std::fs::create_dir_all("./.vista")?;
        println!("\tCreated directory: {}", "./.vista".bold());

        // Create the .env file for db config info
        if !std::path::Path::new(ENV_LOCATION).exists() {
            std::fs::write(ENV_LOCATION, ENV_TEMPLATE)?;
            println!("\tCreated file: {}", ENV_LOCATION.bold());
        }

        if !std::path::Path::new(USER_CONFIG_LOCATION).exists() {
            std::fs::write(USER_CONFIG_LOCATION, CONFIG_TEMPLATE)?;
            println!("\tCreated file: {}", USER_CONFIG_LOCATION.bold());
        }

        // Default home for dump output
        std::fs::create_dir_all("./schemas")?;
        println!("\tCreated directory: {}", "./schemas".bold());

        return Ok(());
    }
}

#[async_trait]
impl Action for Init {
    async fn execute(&self) -> anyhow::Result<()> {
        println!(
            "\nInitialising the required directory structure and creating template .env file..."
        );
        self.init_directories()?;
        println!("Finished initialisation\n");

        return Ok(());
    }
}
