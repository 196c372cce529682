use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use apigen_core::config::{self, ApigenConfig, CONFIG_FILE_NAME, FeatureFlags, FlagSettings};
use apigen_core::ir::{IntermediateModel, ModelShape, ResponseType};
use apigen_core::parse::{self, spec::OpenApiSpec};
use apigen_core::profile::TargetProfile;

#[derive(Parser)]
#[command(name = "apigen", about = "OpenAPI 3.x to intermediate model generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an OpenAPI spec and check that it resolves for the target
    Validate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the resolved intermediate model
    Inspect {
        #[command(flatten)]
        run: RunArgs,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Print only names, groups and return types
        #[arg(long)]
        summary: bool,
    },

    /// Initialize a new apigen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Input selection plus per-call flag overrides layered over `.apigen.yaml`.
#[derive(Args)]
struct RunArgs {
    /// Path to the OpenAPI spec file (YAML or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Built-in profile id or path to a profile YAML
    #[arg(short, long)]
    target: Option<String>,

    #[arg(long)]
    use_tags: Option<bool>,

    #[arg(long)]
    support_async: Option<bool>,

    #[arg(long)]
    interface_only: Option<bool>,

    #[arg(long)]
    return_response: Option<bool>,

    #[arg(long)]
    enum_unknown_default_case: Option<bool>,

    #[arg(long)]
    use_reactive: Option<bool>,

    /// Relative path of the embedded contract copy; empty disables it
    #[arg(long)]
    spec_file_location: Option<String>,
}

impl RunArgs {
    fn overrides(&self) -> FlagSettings {
        FlagSettings {
            use_tags: self.use_tags,
            support_async: self.support_async,
            interface_only: self.interface_only,
            return_response: self.return_response,
            enum_unknown_default_case: self.enum_unknown_default_case,
            use_reactive: self.use_reactive,
            spec_file_location: self.spec_file_location.clone(),
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { run } => cmd_validate(&run),

        Commands::Inspect {
            run,
            format,
            summary,
        } => cmd_inspect(&run, format, summary),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apigen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApigenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).with_context(|| format!("loading {CONFIG_FILE_NAME}"))
}

fn read_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    };
    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

/// Resolve config, profile and flags, then run the transformation.
fn run(args: &RunArgs) -> Result<(OpenApiSpec, IntermediateModel)> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.input));
    let target = args.target.as_deref().unwrap_or(&cfg.target);

    let profile = TargetProfile::load(target)
        .with_context(|| format!("failed to load target profile `{target}`"))?;
    let flags = FeatureFlags::resolve(&cfg.flags, &args.overrides(), &profile.spec_file_location)
        .context("invalid flag configuration")?;
    log::debug!("resolved flags: {flags:?}");

    let spec = read_spec(&input)?;
    let model = apigen_core::generate(&spec, &profile, &flags)
        .with_context(|| format!("failed to resolve {} for {target}", input.display()))?;
    Ok((spec, model))
}

fn cmd_validate(args: &RunArgs) -> Result<()> {
    let (spec, model) = run(args)?;

    eprintln!("Valid OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Schemas: {}", spec.components.schemas.len());
    eprintln!("  Target: {}", model.target);
    eprintln!("  Models: {}", model.models.len());
    eprintln!("  API groups: {}", model.groups.len());
    if let Some(location) = &model.flags.spec_file_location {
        eprintln!("  Contract copy: {location}");
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(args: &RunArgs, format: InspectFormat, summary: bool) -> Result<()> {
    let (_, model) = run(args)?;

    let value = if summary {
        build_inspect_summary(&model)
    } else {
        serde_json::to_value(&model)?
    };

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&value)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&value)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(model: &IntermediateModel) -> serde_json::Value {
    let models: Vec<serde_json::Value> = model
        .models
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.name.pascal_case,
                "kind": match &m.shape {
                    ModelShape::Object => "object",
                    ModelShape::Enum(_) => "enum",
                    ModelShape::Alias(_) => "alias",
                    ModelShape::Union(_) => "union",
                },
                "parent": m.parent,
                "fields": m.fields.iter().map(|f| format!("{} {}", f.field_type.name, f.identifier)).collect::<Vec<_>>(),
            })
        })
        .collect();

    let groups: Vec<serde_json::Value> = model
        .groups
        .iter()
        .map(|g| {
            let operations: Vec<serde_json::Value> = g
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "name": op.name.camel_case,
                        "method": op.method.as_str(),
                        "path": op.path,
                        "returns": op.variant.return_type.name,
                        "no_content": matches!(op.response, ResponseType::NoContent),
                    })
                })
                .collect();
            serde_json::json!({
                "api": g.api_name,
                "operations": operations,
                "imports": g.imports,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": model.info.title,
            "version": model.info.version,
        },
        "target": model.target,
        "models": models,
        "groups": groups,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
