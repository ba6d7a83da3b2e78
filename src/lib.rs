pub mod cli;
pub mod data;
pub mod dataset;
pub mod edit;
pub mod error;
pub mod frequency;
pub mod io_utils;
pub mod missing;
pub mod overview;
pub mod plot;
pub mod profile;
pub mod stats;
pub mod summary;
pub mod table;
pub mod temporal;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_scout", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => profile::execute(&args),
        Commands::Overview(args) => overview::execute(&args),
        Commands::Plot(args) => plot::execute(&args),
        Commands::Edit(args) => edit::execute(&args),
    }
}
