//! restmeta CLI
//!
//! Command-line interface for generating OpenAPI documents, Postman
//! collections and spec bundles from handler introspection facts.

mod directory_client;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use directory_client::DirectoryClient;
use restmeta_common::{ApiDefinition, ServiceConfig};
use restmeta_generator::store::{read_json, write_json};
use restmeta_generator::{
    BundleAssembler, Collection, DocumentStore, ModelMap, OpenApiRenderer, Pipeline,
    PostmanPublisher, PostmanRenderer,
};
use restmeta_parser::{extract, Extraction, FactsDocument};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "restmeta")]
#[command(version, about = "Generate OpenAPI, Postman and spec bundle documents from handler metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (RUST_LOG overrides the log filter)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the facts and the service configuration come from
#[derive(Args)]
struct SourceArgs {
    /// Path to the introspection facts JSON file
    #[arg(short, long)]
    facts: PathBuf,

    /// Path to the service configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Service id when no configuration file is given (defaults to the facts file name)
    #[arg(long)]
    service: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write every document
    #[command(after_help = "EXAMPLES:\n  \
        # Generate everything for one service\n  \
        restmeta generate --facts facts.json --config restmeta.yaml --output ./docs\n\n  \
        # Keep edits made to the last published collection\n  \
        restmeta generate \\\n    \
        --facts facts.json \\\n    \
        --config restmeta.yaml \\\n    \
        --previous ./docs/postman/collection.json\n\n  \
        # Also publish the collection and environments to a shared directory\n  \
        restmeta generate --facts facts.json --config restmeta.yaml --publish-dir ./published")]
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Previously published collection whose edited values are kept
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Publish the collection and environments to this directory
        #[arg(long)]
        publish_dir: Option<PathBuf>,
    },

    /// Render only the OpenAPI document
    #[command(after_help = "EXAMPLES:\n  \
        # Print the document\n  \
        restmeta openapi --facts facts.json --config restmeta.yaml\n\n  \
        # Write it to a file\n  \
        restmeta openapi --facts facts.json --service user-api --output openapi.json")]
    Openapi {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the Postman collection and environments
    #[command(after_help = "EXAMPLES:\n  \
        # Render into ./output/postman\n  \
        restmeta postman --facts facts.json --config restmeta.yaml\n\n  \
        # Merge with and republish to a shared directory\n  \
        restmeta postman --facts facts.json --config restmeta.yaml --publish-dir ./published")]
    Postman {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Previously published collection whose edited values are kept
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Publish the collection and environments to this directory
        #[arg(long)]
        publish_dir: Option<PathBuf>,
    },

    /// Rebuild the spec bundle from documents already in the output directory
    #[command(after_help = "EXAMPLES:\n  \
        restmeta bundle --config restmeta.yaml --output ./docs")]
    Bundle {
        /// Path to the service configuration YAML file
        #[arg(short, long, required_unless_present = "service")]
        config: Option<PathBuf>,

        /// Service id when no configuration file is given
        #[arg(long)]
        service: Option<String>,

        /// Output directory holding the generated documents
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Show what would be extracted from a facts file
    #[command(after_help = "EXAMPLES:\n  \
        restmeta inspect --facts facts.json\n  \
        restmeta inspect --facts facts.json --config restmeta.yaml --verbose")]
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            source,
            output,
            previous,
            publish_dir,
        } => generate_command(
            &source,
            &output,
            previous.as_deref(),
            publish_dir.as_deref(),
            cli.verbose,
        ),
        Commands::Openapi { source, output } => openapi_command(&source, output.as_deref()),
        Commands::Postman {
            source,
            output,
            previous,
            publish_dir,
        } => postman_command(&source, &output, previous.as_deref(), publish_dir.as_deref()),
        Commands::Bundle {
            config,
            service,
            output,
        } => bundle_command(config.as_deref(), service.as_deref(), &output),
        Commands::Inspect { source } => inspect_command(&source, cli.verbose),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn generate_command(
    source: &SourceArgs,
    output: &Path,
    previous: Option<&Path>,
    publish_dir: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let config = load_config(source)?;
    let facts = load_facts(&source.facts)?;
    let previous = previous.map(load_previous).transpose()?;

    if verbose {
        println!("  Service: {}", config.service.service_id);
        println!("  Version: {}", config.service.version);
        println!("  Output: {}", output.display());
    }

    println!("{} Generating documents...", "→".cyan());
    let store = DocumentStore::new(output);
    let mut pipeline = Pipeline::new(&config, &store);
    if let Some(previous) = &previous {
        pipeline = pipeline.with_previous_collection(previous);
    }
    let report = pipeline
        .run(&facts)
        .context("Failed to extract endpoint metadata")?;

    println!(
        "{} Extracted {} endpoints, {} models, {} error groups",
        "✓".green(),
        report.endpoints,
        report.models,
        report.error_groups
    );
    if report.skipped_endpoints > 0 {
        println!(
            "{} Skipped {} endpoint(s) that could not be resolved",
            "⚠".yellow(),
            report.skipped_endpoints
        );
    }
    if report.unresolved_models > 0 {
        println!(
            "{} Skipped {} model(s) that could not be resolved",
            "⚠".yellow(),
            report.unresolved_models
        );
    }
    for (stage, error) in &report.failures {
        eprintln!("{} {} failed: {}", "✗".red(), stage.to_string().yellow(), error);
    }

    if verbose {
        println!("\n{}", "Written documents:".bold());
        for path in &report.written {
            println!("  {}", path.display());
        }
    }

    if let Some(dir) = publish_dir {
        let definitions = store.read_endpoints();
        let models = store.read_models();
        publish(&config, &models, &definitions, dir)?;
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} document(s) or stage(s) failed",
            report.failures.len()
        );
    }

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("\n{}", "Generated files:".bold());
    println!("  {}", store.openapi_path().display());
    println!("  {}", store.collection_path().display());
    println!("  {}", store.bundle_path().display());

    Ok(())
}

fn openapi_command(source: &SourceArgs, output: Option<&Path>) -> Result<()> {
    let config = load_config(source)?;
    let (definitions, models) = extract_definitions(source, &config)?;

    let renderer = OpenApiRenderer::new(&config.service, &config.conventions, &models);
    let document = renderer
        .render(&definitions)
        .context("Failed to render OpenAPI document")?;

    match output {
        Some(path) => {
            write_json(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} paths to {}",
                "✓".green(),
                document.paths.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&document)?),
    }

    Ok(())
}

fn postman_command(
    source: &SourceArgs,
    output: &Path,
    previous: Option<&Path>,
    publish_dir: Option<&Path>,
) -> Result<()> {
    let config = load_config(source)?;
    let previous = previous.map(load_previous).transpose()?;
    let (definitions, models) = extract_definitions(source, &config)?;

    let renderer = PostmanRenderer::new(&config.service, &config.conventions, &models)
        .context("Failed to prepare Postman renderer")?;
    let collection = renderer
        .render(&definitions, previous.as_ref())
        .context("Failed to render Postman collection")?;

    let store = DocumentStore::new(output);
    let path = store.collection_path();
    write_json(&path, &collection).with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "{} Wrote {} requests to {}",
        "✓".green(),
        collection.requests().len(),
        path.display()
    );

    let mut skipped = 0usize;
    for environment in renderer.environments() {
        let path = store.environment_path(&environment.name);
        match write_json(&path, &environment) {
            Ok(()) => println!("{} Wrote environment {}", "✓".green(), environment.name.yellow()),
            Err(e) => {
                eprintln!("{} Skipped environment {}: {}", "⚠".yellow(), environment.name, e);
                skipped += 1;
            }
        }
    }

    if let Some(dir) = publish_dir {
        publish(&config, &models, &definitions, dir)?;
    }

    if skipped > 0 {
        anyhow::bail!("{} environment document(s) could not be written", skipped);
    }

    Ok(())
}

fn bundle_command(config: Option<&Path>, service: Option<&str>, output: &Path) -> Result<()> {
    let config = match (config, service) {
        (Some(path), _) => ServiceConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(service)) => ServiceConfig::for_service(service),
        (None, None) => anyhow::bail!("Either --config or --service must be provided"),
    };

    println!("{} Assembling bundle from {}", "→".cyan(), output.display());
    let store = DocumentStore::new(output);
    let path = BundleAssembler::new(&store)
        .write(&config.service)
        .context("Failed to write spec bundle")?;

    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}

fn inspect_command(source: &SourceArgs, verbose: bool) -> Result<()> {
    let config = load_config(source)?;
    let facts = load_facts(&source.facts)?;
    let Extraction {
        endpoints,
        models,
        errors,
        error_response,
    } = extract(&facts, &config).context("Failed to extract endpoint metadata")?;

    println!("\n{}", "Service:".bold());
    println!("  Id: {}", config.service.service_id.yellow());
    println!("  Name: {}", config.service.display_name().yellow());
    println!("  Version: {}", config.service.version.yellow());

    println!("\n{}", "Endpoints:".bold());
    for (handler, definitions) in &endpoints.groups {
        println!("  {}", handler.cyan());
        for def in definitions {
            println!(
                "    {:<7} /{}{}  {}",
                def.method,
                config.service.version,
                def.url_mapping,
                def.name
            );
            if verbose {
                println!("            group: {}, id: {}", def.group, def.id);
            }
        }
    }

    for skipped in &endpoints.skipped {
        println!(
            "  {} {}#{}: {}",
            "⚠".yellow(),
            skipped.handler,
            skipped.method_name,
            skipped.reason
        );
    }

    println!("\n{}", "Models:".bold());
    println!("  Resolved: {}", models.len());
    if verbose {
        for (class_path, model) in models.iter() {
            println!("  • {} ({:?}, {} fields)", class_path.cyan(), model.kind, model.fields.len());
        }
    }
    for (class_path, reason) in models.failures() {
        println!("  {} {}: {}", "⚠".yellow(), class_path, reason);
    }

    println!("\n{}", "Errors:".bold());
    for group in errors.groups() {
        println!(
            "  {} {} ({} codes)",
            group.status.to_string().yellow(),
            group.group,
            group.codes.len()
        );
    }
    if let Some(model) = error_response {
        println!("  Error response: {}", model.name.cyan());
    }

    Ok(())
}

fn publish(
    config: &ServiceConfig,
    models: &ModelMap,
    definitions: &[ApiDefinition],
    dir: &Path,
) -> Result<()> {
    println!("{} Publishing to {}", "→".cyan(), dir.display());

    let renderer = PostmanRenderer::new(&config.service, &config.conventions, models)
        .context("Failed to prepare Postman renderer")?;
    let client = DirectoryClient::new(dir);
    let report =
        PostmanPublisher::new(&client, &renderer).publish(config.service.display_name(), definitions);

    if let Some(outcome) = &report.collection {
        println!(
            "{} Collection {} {} ({})",
            "✓".green(),
            outcome.name.yellow(),
            outcome.action,
            outcome.uid
        );
    }
    for outcome in &report.environments {
        println!(
            "{} Environment {} {} ({})",
            "✓".green(),
            outcome.name.yellow(),
            outcome.action,
            outcome.uid
        );
    }
    for failure in &report.failures {
        eprintln!("{} {}", "✗".red(), failure);
    }

    if !report.is_success() {
        anyhow::bail!("Publishing failed for {} document(s)", report.failures.len());
    }
    Ok(())
}

fn load_config(source: &SourceArgs) -> Result<ServiceConfig> {
    if let Some(path) = &source.config {
        return ServiceConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    let service = source
        .service
        .clone()
        .or_else(|| infer_service_id(&source.facts))
        .context("Could not infer a service id, pass --service or --config")?;
    Ok(ServiceConfig::for_service(&service))
}

/// Progress goes to stderr so `openapi` can print the document to stdout
fn load_facts(path: &Path) -> Result<FactsDocument> {
    eprintln!("{} Loading facts from {}", "→".cyan(), path.display());
    let facts = FactsDocument::from_file(path).context("Failed to load facts file")?;
    let (endpoints, types) = facts.counts();
    eprintln!(
        "{} Loaded {} endpoints and {} types",
        "✓".green(),
        endpoints,
        types
    );
    Ok(facts)
}

fn load_previous(path: &Path) -> Result<Collection> {
    read_json(path).with_context(|| format!("Failed to read previous collection {}", path.display()))
}

/// Endpoints and resolved models for the renderers that run outside the pipeline
fn extract_definitions(
    source: &SourceArgs,
    config: &ServiceConfig,
) -> Result<(Vec<ApiDefinition>, ModelMap)> {
    let facts = load_facts(&source.facts)?;
    let extraction = extract(&facts, config).context("Failed to extract endpoint metadata")?;

    let definitions = extraction.endpoints.definitions().cloned().collect();
    Ok((definitions, extraction.models.into_models()))
}

/// Service id from a facts file name, e.g. `user-api.facts.json` → `user-api`
fn infer_service_id(path: &Path) -> Option<String> {
    let stem = path.file_name()?.to_str()?;
    let id = stem.split('.').next().unwrap_or(stem).trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_infer_service_id() {
        assert_eq!(
            infer_service_id(Path::new("facts/user-api.facts.json")).as_deref(),
            Some("user-api")
        );
        assert_eq!(infer_service_id(Path::new("orders.json")).as_deref(), Some("orders"));
        assert_eq!(infer_service_id(Path::new(".json")), None);
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "restmeta",
            "generate",
            "--facts",
            "facts.json",
            "--service",
            "user-api",
            "--publish-dir",
            "published",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                source,
                output,
                previous,
                publish_dir,
            } => {
                assert_eq!(source.facts, PathBuf::from("facts.json"));
                assert_eq!(source.service.as_deref(), Some("user-api"));
                assert_eq!(output, PathBuf::from("./output"));
                assert!(previous.is_none());
                assert_eq!(publish_dir, Some(PathBuf::from("published")));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_bundle_requires_config_or_service() {
        assert!(Cli::try_parse_from(["restmeta", "bundle"]).is_err());
        assert!(Cli::try_parse_from(["restmeta", "bundle", "--service", "user-api"]).is_ok());
    }
}
