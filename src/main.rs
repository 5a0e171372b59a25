//! DRF Scaffold - Command-line tool for generating Django REST Framework boilerplate.
//!
//! This binary provides a command-line interface for generating serializer,
//! viewset and URL configuration files from a model registry manifest. It
//! locates the manifest in your project tree, then writes one serializer and
//! one viewset per model plus a router registration block per application.
//!
//! # Usage
//!
//! ```bash
//! drf-scaffold generate -a <APPS> [PROJECT_PATH]
//! ```
//!
//! # Examples
//!
//! Generate boilerplate for two applications:
//! ```bash
//! drf-scaffold generate -a blog,shop ./my-project
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! drf-scaffold generate -a blog -v
//! ```

mod cli;
mod registry;
mod layout;
mod serializer_generator;
mod viewset_generator;
mod url_generator;
mod error;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse args first so the verbose flag can drive logger initialization
    let args_for_verbose = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("DRF Scaffold starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    // Run the main workflow
    cli::run(args)?;

    info!("Boilerplate generation completed successfully");

    Ok(())
}
