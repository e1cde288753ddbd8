use clap::{Parser, Subcommand};

use crate::actions::create::Create;
use crate::actions::drop::Drop;
use crate::actions::dump::Dump;
use crate::actions::init::Init;
use crate::actions::replay::Replay;
use crate::actions::Action as CliAction;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Initialise the current directory. Creates the .vista config directory
    /// with a template .env and config file.
    Init(Init),

    /// Dump every view and materialized view on the search path as
    /// replayable create_view declarations
    Dump(Dump),

    /// Create a view or materialized view in the database
    Create(Create),

    /// Drop a view or materialized view from the database
    Drop(Drop),

    /// Replay a dump file (or a directory of dump files) against the
    /// database, recreating every view it declares
    Replay(Replay),
}

impl Action {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Self::Init(init) => init.execute(),
            Self::Dump(dump) => dump.execute(),
            Self::Create(create) => create.execute(),
            Self::Drop(drop) => drop.execute(),
            Self::Replay(replay) => replay.execute(),
        }
        .await?;

        return Ok(());
    }
}
