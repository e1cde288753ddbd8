use clap::Parser;

use vista::{cli, config::UserConfig, config::USER_CONFIG_LOCATION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::CliArgs::parse();

    if std::path::Path::new(USER_CONFIG_LOCATION).exists() {
        // If the user config file exists try read it and initialise the global variable
        UserConfig::init(USER_CONFIG_LOCATION)?;
    }

    args.action.execute().await?;
    Ok(())
}
