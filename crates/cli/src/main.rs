//! gateway-config-gen CLI
//!
//! Drives the pipeline: load spec -> validate -> extract routes ->
//! per-provider generate -> validate output.
//!
//! Exit codes: 0 all requested providers generated and validated; 1 the
//! spec failed to load or validate (nothing written); 2 one or more
//! providers failed generation or output validation.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use gateway_config_gen_adapters::{
    AdapterOptions, AdapterRegistry, ArtifactMap, GenerationInput,
};
use gateway_config_gen_common::{BackendMap, GatewayError, Severity, ValidationReport};
use gateway_config_gen_spec::{extract_routes, load_spec, validate};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gateway-config-gen")]
#[command(version, about = "Compile API gateway configuration from an OpenAPI spec", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the spec and report findings without writing anything
    #[command(after_help = "EXAMPLES:\n  \
        # Validate a spec, resolving backends from its extension blocks\n  \
        gateway-config-gen validate --spec api.yaml\n\n  \
        # Validate with a backend map override and a default backend\n  \
        gateway-config-gen validate --spec api.yaml --backend-map backends.yaml --default-backend core")]
    Validate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Backend map override file (YAML)
        #[arg(long)]
        backend_map: Option<PathBuf>,

        /// Default backend for routes with no prefix match
        #[arg(long)]
        default_backend: Option<String>,
    },

    /// Generate configuration for one provider or all of them
    #[command(after_help = "EXAMPLES:\n  \
        # Generate AWS artifacts\n  \
        gateway-config-gen generate --spec api.yaml --provider aws --output ./out\n\n  \
        # Generate everything, including the nginx cross-check\n  \
        gateway-config-gen generate \\\n    \
        --spec api.yaml \\\n    \
        --provider all \\\n    \
        --output ./out \\\n    \
        --route-table proxy-routes.yaml")]
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Target provider
        #[arg(short, long)]
        provider: ProviderArg,

        /// Output directory; per-provider subdirectories are created below it
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Backend map override file (YAML)
        #[arg(long)]
        backend_map: Option<PathBuf>,

        /// Default backend for routes with no prefix match
        #[arg(long)]
        default_backend: Option<String>,

        /// Externally maintained proxy route table (nginx only)
        #[arg(long)]
        route_table: Option<PathBuf>,
    },

    /// Print deployment instructions for a provider
    Instructions {
        /// Target provider
        #[arg(short, long)]
        provider: ProviderArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Nginx,
    Aws,
    Azure,
    Gcp,
    All,
}

impl ProviderArg {
    fn names(self) -> Vec<&'static str> {
        match self {
            ProviderArg::Nginx => vec!["nginx"],
            ProviderArg::Aws => vec!["aws"],
            ProviderArg::Azure => vec!["azure"],
            ProviderArg::Gcp => vec!["gcp"],
            ProviderArg::All => vec!["nginx", "aws", "azure", "gcp"],
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Validate {
            spec,
            backend_map,
            default_backend,
        } => validate_command(
            &spec,
            backend_map.as_deref(),
            default_backend.as_deref(),
            verbose,
        ),
        Commands::Generate {
            spec,
            provider,
            output,
            backend_map,
            default_backend,
            route_table,
        } => generate_command(
            &spec,
            provider,
            &output,
            backend_map.as_deref(),
            default_backend.as_deref(),
            route_table,
            verbose,
        ),
        Commands::Instructions { provider } => instructions_command(provider),
    }
}

/// Front half of the pipeline, fatal before any provider runs
fn build_input(
    spec_path: &Path,
    backend_map: Option<&Path>,
    default_backend: Option<&str>,
    route_table: Option<PathBuf>,
    verbose: bool,
) -> Result<GenerationInput, GatewayError> {
    println!("{} Loading spec: {}", "→".cyan(), spec_path.display());
    let spec = load_spec(spec_path)?;

    let report = validate(&spec);
    print_report(&report);
    if report.has_errors() {
        return Err(GatewayError::SpecValidation {
            field: "openapi document".to_string(),
            message: format!("{} validation error(s)", report.error_messages().len()),
        });
    }
    println!("{} Spec validated", "✓".green());

    let mut backends = BackendMap::from_spec_extensions(&spec.extensions)?;
    if let Some(path) = backend_map {
        backends.load_overrides(path)?;
    }
    backends.apply_env_overrides();
    if let Some(name) = default_backend {
        backends.set_default_backend(name);
    }

    let routes = extract_routes(&spec, &backends)?;
    println!("{} Extracted {} routes", "✓".green(), routes.len());
    if verbose {
        for route in &routes {
            println!("  • {} {} -> {}", route.method, route.path, route.backend.yellow());
        }
    }

    Ok(GenerationInput {
        spec,
        routes,
        backends,
        options: AdapterOptions { route_table },
    })
}

fn validate_command(
    spec_path: &Path,
    backend_map: Option<&Path>,
    default_backend: Option<&str>,
    verbose: bool,
) -> ExitCode {
    match build_input(spec_path, backend_map, default_backend, None, verbose) {
        Ok(_) => {
            println!("\n{}", "✓ Spec is valid".green().bold());
            ExitCode::SUCCESS
        }
        Err(e) => report_fatal(&e),
    }
}

fn generate_command(
    spec_path: &Path,
    provider: ProviderArg,
    output: &Path,
    backend_map: Option<&Path>,
    default_backend: Option<&str>,
    route_table: Option<PathBuf>,
    verbose: bool,
) -> ExitCode {
    let input = match build_input(spec_path, backend_map, default_backend, route_table, verbose)
    {
        Ok(input) => input,
        Err(e) => return report_fatal(&e),
    };

    let registry = AdapterRegistry::with_builtin();
    let names = provider.names();
    let mut generated = 0usize;
    let mut failures: Vec<(&str, String)> = Vec::new();

    // Providers are independent; one failure never aborts the rest.
    for &name in &names {
        println!(
            "\n{} Generating {} configuration...",
            "→".cyan(),
            name.yellow()
        );
        match run_provider(&registry, name, &input, output, verbose) {
            Ok(artifacts) => {
                println!(
                    "{} {} wrote {} artifact(s) under {}",
                    "✓".green(),
                    name,
                    artifacts.len(),
                    output.join(name).display()
                );
                generated += 1;
            }
            Err(message) => {
                eprintln!("{} {} failed: {}", "⚠".yellow(), name, message);
                failures.push((name, message));
            }
        }
    }

    println!(
        "\n{} {}/{} providers generated",
        if failures.is_empty() { "✓".green().bold() } else { "⚠".yellow().bold() },
        generated,
        names.len()
    );

    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        for (name, message) in &failures {
            eprintln!("  {} {}: {}", "✗".red(), name, message);
        }
        ExitCode::from(2)
    }
}

/// One provider end-to-end: validate, generate, check the output
fn run_provider(
    registry: &AdapterRegistry,
    name: &str,
    input: &GenerationInput,
    output_root: &Path,
    verbose: bool,
) -> Result<ArtifactMap, String> {
    let adapter = registry
        .create(name, input.clone())
        .map_err(|e| e.to_string())?;

    let report = adapter.validate_spec();
    print_report(&report);
    if report.has_errors() {
        return Err(format!(
            "provider validation failed: {}",
            report.error_messages().join("; ")
        ));
    }

    let provider_dir = output_root.join(name);
    let artifacts = adapter
        .generate_config(&provider_dir)
        .map_err(|e| e.to_string())?;

    if verbose {
        for (artifact, path) in &artifacts {
            println!("  📄 {} -> {}", artifact, path.display());
        }
    }

    let check = adapter.validate_config(&artifacts);
    print_report(&check);
    if check.has_errors() {
        return Err(format!(
            "output validation failed: {}",
            check.error_messages().join("; ")
        ));
    }

    Ok(artifacts)
}

fn instructions_command(provider: ProviderArg) -> ExitCode {
    let registry = AdapterRegistry::with_builtin();

    for name in provider.names() {
        // Instructions are static; an empty input satisfies the
        // constructor.
        let input = GenerationInput {
            spec: gateway_config_gen_spec::OpenApiSpec::default(),
            routes: vec![],
            backends: BackendMap::new(),
            options: AdapterOptions::default(),
        };
        match registry.create(name, input) {
            Ok(adapter) => {
                println!("{}", name.yellow().bold());
                println!("{}\n", adapter.deployment_instructions());
            }
            Err(e) => return report_fatal(&e),
        }
    }
    ExitCode::SUCCESS
}

fn print_report(report: &ValidationReport) {
    for entry in report.entries() {
        match entry.severity {
            Severity::Error => eprintln!("  {} {}", "✗".red(), entry.message),
            Severity::Warning => eprintln!("  {} {}", "⚠".yellow(), entry.message),
        }
    }
}

fn report_fatal(error: &GatewayError) -> ExitCode {
    eprintln!("\n{} {}", "✗".red().bold(), error);
    eprintln!("  hint: {}", error.remediation());
    ExitCode::from(exit_code_for(error))
}

/// Spec defects exit 1; everything downstream exits 2
fn exit_code_for(error: &GatewayError) -> u8 {
    match error {
        GatewayError::SpecLoad(_)
        | GatewayError::SpecValidation { .. }
        | GatewayError::Json(_)
        | GatewayError::Yaml(_) => 1,
        GatewayError::UnknownProvider { .. }
        | GatewayError::Generation { .. }
        | GatewayError::OutputValidation { .. }
        | GatewayError::Io(_) => 2,
    }
}
