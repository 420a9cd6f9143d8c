//! beanmap CLI - Map JSON documents between declared types.

use anyhow::{Context, Result, bail};
use beanmap::matching::{LogicSecuredCheck, PropertyContext};
use beanmap::object::value_from_json;
use beanmap::{BeanMapper, BeanMapperBuilder, EngineSettings, ObjectModel, SchemaRegistry, TypeRef, Value};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "beanmap")]
#[command(version)]
#[command(about = "Map JSON documents between declared types")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "beanmap.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a JSON document from one declared type to another
    Map {
        /// Path to the input JSON file ("-" for stdin)
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Type of the input document (element type with --collection)
        #[arg(short, long)]
        source: String,

        /// Type to map to (element type with --collection)
        #[arg(short, long)]
        target: String,

        /// Treat the input as a collection of this type
        #[arg(long)]
        collection: Option<String>,

        /// Only copy these source properties (comma separated, dotted paths allowed)
        #[arg(long, value_delimiter = ',', conflicts_with = "downsize_target")]
        downsize_source: Vec<String>,

        /// Only fill these target properties (comma separated, dotted paths allowed)
        #[arg(long, value_delimiter = ',')]
        downsize_target: Vec<String>,

        /// Security checks that deny access (every other declared check allows)
        #[arg(long, value_delimiter = ',')]
        deny: Vec<String>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn print_example_config() {
    let example = r#"# beanmap configuration file

[mapping]
strict_source_suffix = "Form"
strict_target_suffix = "Result"
apply_strict_mapping_convention = true
null_policy = "propagate"       # or "skip"
flush_enabled = false
converter_choosable = false  # top-level calls may use a converter
default_converters = true
# package_prefixes = ["shop."]
# strict_source_pairs = [{ source = "shop.PersonForm", target = "shop.Person" }]

[[types]]
name = "shop.PersonForm"
properties = [
    { name = "nameForm", type = "text" },
    { name = "age", type = "text" },
    { name = "tags", type = "List", element = "text" },
    { name = "address", type = "shop.Address" },
]

[[types]]
name = "shop.Person"
properties = [
    { name = "name", type = "text" },
    { name = "age", type = "int" },
    { name = "tags", type = "Set", element = "text" },
    { name = "address", type = "shop.Address" },
    { name = "salary", type = "float", secured_by = "hr" },
]

[[types]]
name = "shop.Address"
properties = [
    { name = "street", type = "text" },
    { name = "city", type = "text" },
]
"#;
    println!("{example}");
}

fn load_settings(path: &Path) -> Result<EngineSettings> {
    EngineSettings::from_file(path).with_context(|| format!("Failed to load config from {path:?}"))
}

fn read_input(input: &str) -> Result<serde_json::Value> {
    let content = if input == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };
    serde_json::from_str(&content).with_context(|| format!("Input {input} is not valid JSON"))
}

/// Check with a fixed answer, configured from the command line.
struct FixedCheck {
    allowed: bool,
}

impl LogicSecuredCheck for FixedCheck {
    fn is_allowed(&self, _property: &PropertyContext<'_>, _parent: Option<&Value>) -> bool {
        self.allowed
    }
}

/// Every check name the declared types refer to.
fn declared_checks(settings: &EngineSettings) -> BTreeSet<String> {
    settings
        .types
        .iter()
        .flat_map(|t| t.properties.iter())
        .filter_map(|p| p.secured_by.clone())
        .collect()
}

fn build_mapper(settings: &EngineSettings, registry: Arc<SchemaRegistry>, deny: &[String]) -> Result<BeanMapper> {
    let model: Arc<dyn ObjectModel> = registry;
    let mut builder = BeanMapperBuilder::from_settings(model, settings)?;

    for name in declared_checks(settings) {
        let allowed = !deny.contains(&name);
        debug!(check = %name, allowed, "Registering security check");
        builder = builder.add_security_check(name, FixedCheck { allowed })?;
    }
    Ok(builder.build())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let settings = load_settings(&cli.config)?;
            let registry = SchemaRegistry::from_schemas(settings.types.clone())
                .context("Invalid type declarations")?;

            info!("Configuration is valid");
            info!("  Types: {} declared", settings.types.len());
            info!("  Registry: {} types including built-ins", registry.len());
            info!(
                "  Strict convention: {} (source suffix '{}', target suffix '{}')",
                settings.mapping.apply_strict_mapping_convention,
                settings.mapping.strict_source_suffix,
                settings.mapping.strict_target_suffix
            );
            info!("  Security checks: {:?}", declared_checks(&settings));
        }

        Commands::Map {
            input,
            source,
            target,
            collection,
            downsize_source,
            downsize_target,
            deny,
            pretty,
        } => {
            let settings = load_settings(&cli.config)?;
            let registry = Arc::new(
                SchemaRegistry::from_schemas(settings.types.clone())
                    .context("Invalid type declarations")?,
            );
            for name in [&source, &target] {
                if !registry.contains(name) {
                    bail!("Type '{name}' is not declared in {:?}", cli.config);
                }
            }

            let json = read_input(&input)?;
            let source_type = TypeRef::named(&source);
            let target_type = TypeRef::named(&target);
            let value = match &collection {
                Some(collection) => value_from_json(
                    &*registry,
                    &TypeRef::named(collection),
                    Some(&source_type),
                    &json,
                ),
                None => value_from_json(&*registry, &source_type, None, &json),
            }
            .context("Input does not match the source type")?;

            let mapper = build_mapper(&settings, Arc::clone(&registry), &deny)?;
            let mut call = mapper.wrap().target_class(target_type)?;
            if let Some(collection) = &collection {
                call = call.collection_class(TypeRef::named(collection))?;
            }
            if !downsize_source.is_empty() {
                call = call.downsize_source(downsize_source)?;
            }
            if !downsize_target.is_empty() {
                call = call.downsize_target(downsize_target)?;
            }

            let mapped = call
                .build()
                .map(&value)
                .with_context(|| format!("Failed to map {source} to {target}"))?;

            let output = if pretty {
                serde_json::to_string_pretty(&mapped.to_json())?
            } else {
                serde_json::to_string(&mapped.to_json())?
            };
            println!("{output}");
        }
    }

    Ok(())
}
