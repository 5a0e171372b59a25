use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

/// DRF Scaffold - Generate Django REST Framework boilerplate from a model registry
#[derive(Parser, Debug)]
#[command(name = "drf-scaffold")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate serializers, viewsets and URL configuration for the listed apps
    #[command(after_help = "Example: drf-scaffold generate -a blog,shop ./my-project")]
    Generate {
        /// Comma separated application names
        #[arg(short = 'a', long = "apps", value_name = "APPS")]
        apps: String,

        /// Path to the project directory
        #[arg(value_name = "PROJECT_PATH", default_value = ".")]
        project_path: PathBuf,
    },
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    let Command::Generate {
        ref apps,
        ref project_path,
    } = args.command;

    // Validate project path exists
    if !project_path.exists() {
        anyhow::bail!("Project path does not exist: {}", project_path.display());
    }

    // Validate project path is a directory
    if !project_path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", project_path.display());
    }

    info!("Project path: {}", project_path.display());
    info!("Applications: {}", apps);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::registry;
    use crate::serializer_generator::SerializerGenerator;
    use crate::url_generator::UrlGenerator;
    use crate::viewset_generator::ViewsetGenerator;

    let Command::Generate {
        apps,
        project_path,
    } = args.command;

    let app_names: Vec<String> = apps
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if app_names.is_empty() {
        anyhow::bail!("No application names given (expected -a app1,app2,...)");
    }

    info!("Starting boilerplate generation...");
    info!("Project path: {}", project_path.display());

    // Step 1: Locate the model registry manifest
    info!("Locating model registry manifest...");
    let manifest_path = registry::locate_manifest(&project_path)?;

    // Step 2: Load the manifest and select the requested applications
    info!("Loading model registry...");
    let full_index = registry::load_manifest(&manifest_path)?;
    let index = full_index.select(&app_names)?;

    let model_count: usize = index.apps.iter().map(|a| a.models.len()).sum();
    info!(
        "Selected {} applications, {} models",
        index.apps.len(),
        model_count
    );

    // Step 3: Generate serializers
    info!("Generating serializers...");
    let serializer_registry = SerializerGenerator::new(&project_path, &index).generate_all()?;

    let serializer_count: usize = serializer_registry
        .apps
        .iter()
        .flat_map(|a| &a.models)
        .map(|m| m.serializers.len())
        .sum();
    info!("Generated {} serializers", serializer_count);

    // Step 4: Generate viewsets
    info!("Generating viewsets...");
    let viewset_registry =
        ViewsetGenerator::new(&project_path, &index, &serializer_registry).generate_all()?;

    let viewset_count: usize = viewset_registry.apps.iter().map(|a| a.viewsets.len()).sum();
    info!("Generated {} viewsets", viewset_count);

    // Step 5: Generate URL configuration
    info!("Generating URL configuration...");
    let segments = UrlGenerator::new(&project_path, &viewset_registry).generate_all()?;

    for segment in &segments {
        debug!("Registered route: {}", segment);
    }

    // Step 6: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Applications: {}", index.apps.len());
    info!("  - Serializers: {}", serializer_count);
    info!("  - Viewsets: {}", viewset_count);
    info!("  - Routes registered: {}", segments.len());

    Ok(())
}
