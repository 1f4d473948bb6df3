use clap::{Parser, Subcommand};
use dm8gen::constants::DEFAULT_CONFIG_FILE_NAME;
use dm8gen::logging::config::LogConfig;
use dm8gen::{GeneratorConfig, LoggingSystem, Model, ZoneKind};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the solution file (*.dm8s)
    #[arg(short, long)]
    solution: PathBuf,

    /// Generator configuration; defaults to dm8gen.toml next to the solution
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logging configuration file
    #[arg(long)]
    log_config: Option<PathBuf>,

    /// Override the default log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or refresh the entity index
    ValidateIndex {
        /// Rebuild the index from scratch instead of refreshing it
        #[arg(long)]
        full_index_scan: bool,
        /// Fail when any model file cannot be parsed
        #[arg(long)]
        strict: bool,
    },
    /// Resolve a locator and print the entity it points to
    Lookup {
        /// Locator in the form /<zone>/<product>/<module>/<entity>
        locator: String,
    },
    /// Map a source column type to its canonical data type
    ResolveType {
        #[arg(long)]
        data_source: String,
        #[arg(long)]
        source_type: String,
    },
    /// Run the pre-generation model checks
    Check {
        /// Zones to check; all zones when omitted
        #[arg(long)]
        zone: Vec<String>,
    },
    /// List raw entities derived from stage entities with a system source
    RawEntities {},
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.log_config {
        Some(path) => LogConfig::from_file(path)?,
        None => LogConfig::from_env(),
    };
    if let Some(level) = &cli.log_level {
        config.general.default_level = level.to_uppercase();
    }
    LoggingSystem::init_with_config(config)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => {
            let dir = cli.solution.parent().unwrap_or_else(|| Path::new("."));
            GeneratorConfig::from_file_or_default(dir.join(DEFAULT_CONFIG_FILE_NAME))?
        }
    };
    Ok(config)
}

fn handle_validate_index(model: &Model, full_index_scan: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = model.validate_index(full_index_scan)?;
    for e in &report.errors {
        warn!("{}", e);
    }
    info!(
        "Index written to {}: {} added, {} pruned, {} unchanged, {} legacy skipped, {} error(s)",
        model.index_store().path().display(),
        report.added,
        report.pruned,
        report.unchanged,
        report.skipped_legacy.len(),
        report.errors.len()
    );
    Ok(())
}

fn handle_lookup(model: &Model, locator: &str) -> Result<(), Box<dyn std::error::Error>> {
    let resolved = model.lookup_entity(locator)?;
    println!("{}", resolved.entry.locator);
    println!("  zone: {}", resolved.zone);
    println!("  name: {}", resolved.name());
    println!("  path: {}", resolved.entry.absolute_path.display());
    println!("  attributes: {}", resolved.document.attributes().len());
    Ok(())
}

fn handle_resolve_type(
    model: &Model,
    data_source: &str,
    source_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = model.type_mapping_engine()?;
    println!("{}", engine.resolve_type(data_source, source_type)?);
    Ok(())
}

fn handle_check(model: &Model, zones: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let kinds = if zones.is_empty() {
        ZoneKind::ALL.to_vec()
    } else {
        zones
            .iter()
            .map(|name| {
                ZoneKind::from_name(name).ok_or_else(|| format!("Unknown zone '{}'", name))
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let problems = model.perform_initial_checks(&kinds)?;
    if !problems.is_empty() {
        for problem in &problems {
            error!("{}", problem);
        }
        return Err(format!("{} unresolved source locator(s)", problems.len()).into());
    }
    info!("Model checks passed");
    Ok(())
}

fn handle_raw_entities(model: &Model) -> Result<(), Box<dyn std::error::Error>> {
    for raw in model.derived_raw_entities()? {
        println!(
            "{} <- {} {} ({} attributes)",
            raw.name,
            raw.data_source,
            raw.source_location,
            raw.attributes.len()
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = load_config(&cli)?;
    if let Commands::ValidateIndex { strict: true, .. } = cli.command {
        config.index.strict = true;
    }

    info!("Loading solution from: {}", cli.solution.display());
    let model = Model::open(&cli.solution, config)?;

    match &cli.command {
        Commands::ValidateIndex {
            full_index_scan, ..
        } => handle_validate_index(&model, *full_index_scan)?,
        Commands::Lookup { locator } => handle_lookup(&model, locator)?,
        Commands::ResolveType {
            data_source,
            source_type,
        } => handle_resolve_type(&model, data_source, source_type)?,
        Commands::Check { zone } => handle_check(&model, zone)?,
        Commands::RawEntities {} => handle_raw_entities(&model)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn write(path: &Path, value: &Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn entity(name: &str, sources: &[&str]) -> Value {
        let sources: Vec<Value> = sources
            .iter()
            .map(|locator| json!({ "type": "model", "model": { "dm8l": locator } }))
            .collect();
        json!({
            "type": "entity",
            "entity": { "name": name, "attribute": [] },
            "functions": { "sources": sources }
        })
    }

    fn open_model(core_sources: &[&str]) -> (TempDir, Model) {
        let dir = tempfile::tempdir().unwrap();
        let solution = dir.path().join("Sales.dm8s");
        write(
            &solution,
            &json!({
                "name": "Sales",
                "basePath": "Base",
                "modelPath": "Model",
                "generatePath": "Generate",
                "outputPath": "Output"
            }),
        );
        let zones: Vec<Value> = ["Raw", "Stage", "Core", "Curated"]
            .iter()
            .map(|name| {
                json!({ "name": name, "targeName": name, "displayName": name, "localFolderName": name })
            })
            .collect();
        write(&dir.path().join("Base/Zones.json"), &json!({ "zones": zones }));
        write(
            &dir.path().join("Model/Stage/Sales/Customer/Customer.json"),
            &entity("Customer", &[]),
        );
        write(
            &dir.path().join("Model/Core/Sales/Customer/Customer.json"),
            &entity("Customer", core_sources),
        );

        let model = Model::open(&solution, GeneratorConfig::default()).unwrap();
        (dir, model)
    }

    #[test]
    fn check_passes_when_sources_resolve() {
        let (_dir, model) = open_model(&["/stage/Sales/Customer/Customer"]);
        assert!(handle_check(&model, &[]).is_ok());
    }

    #[test]
    fn check_fails_on_unresolved_sources() {
        let (_dir, model) = open_model(&["/stage/Sales/Customer/Address"]);
        let err = handle_check(&model, &["core".to_string()]).unwrap_err();
        assert!(err.to_string().contains("1 unresolved"));
    }
}
