//! Cartage - release packaging for server-side applications
//!
//! Usage:
//!   cartage manifest check      # Compare Manifest.txt with the repository
//!   cartage manifest generate   # Regenerate Manifest.txt
//!   cartage pack                # Build the release package
//!   cartage metadata            # Write release-metadata.json here

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartage_core::compression::Compression;
use cartage_core::config::{self, CartageConfig};
use cartage_core::manifest::IgnoreMode;
use cartage_core::{Cartage, Error};

#[derive(Parser)]
#[command(name = "cartage", version)]
#[command(about = "Manage releaseable packages", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Silence normal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show the full error chain when an error occurs
    #[arg(short = 'T', long, global = true)]
    trace: bool,

    /// Use the specified configuration file
    #[arg(short = 'C', long, global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// The name of the package
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// The directory where the final package is written
    #[arg(short, long, global = true, value_name = "PATH")]
    target: Option<PathBuf>,

    /// The root path of the package
    #[arg(short, long, global = true, value_name = "PATH")]
    root_path: Option<PathBuf>,

    /// The timestamp used in the final package name
    #[arg(long, global = true)]
    timestamp: Option<String>,

    /// The compression type for tarballs (bzip2, gzip, none)
    #[arg(long, global = true)]
    compression: Option<Compression>,

    /// Do not extract or create the dependency cache
    #[arg(long, global = true)]
    disable_dependency_cache: bool,

    /// The directory holding the dependency cache
    #[arg(long, global = true, value_name = "PATH")]
    dependency_cache_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the Manifest.txt file
    Manifest {
        #[command(subcommand)]
        command: Option<ManifestCommand>,
    },

    /// Create a package based on the manifest
    #[command(alias = "build")]
    Pack {
        /// Do not check the status of the manifest before packaging
        #[arg(long)]
        skip_check: bool,
    },

    /// Create a release-metadata.json file in the current directory
    Metadata,

    /// Show information about cartage itself
    #[command(hide = true, alias = "i")]
    Info {
        #[command(subcommand)]
        command: InfoCommand,
    },

    /// Save the computed configuration as TOML
    #[command(name = "_save", hide = true)]
    Save {
        /// Output file, or `-` for standard output
        file: String,
    },
}

#[derive(Subcommand)]
enum ManifestCommand {
    /// Check Manifest.txt against the current repository
    Check,

    /// Install or update the .cartignore file
    Cartignore {
        /// Update an existing .cartignore (overwrite or merge)
        #[arg(long, value_parser = ["overwrite", "merge"])]
        mode: Option<String>,

        /// Overwrite an existing .cartignore (--mode overwrite)
        #[arg(short, long, alias = "overwrite")]
        force: bool,

        /// Merge an existing .cartignore (--mode merge)
        #[arg(short, long)]
        merge: bool,
    },

    /// Show the files that will be included in the package
    Show,

    /// Generate or update the Manifest.txt file
    #[command(alias = "update")]
    Generate,
}

#[derive(Subcommand)]
enum InfoCommand {
    /// Show the active plug-ins
    Plugins,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    match run(cli.command, &cli.global) {
        Ok(code) => code,
        Err(err) => report(&err, cli.global.trace),
    }
}

fn init_tracing(global: &GlobalArgs) {
    let default_filter = if global.verbose {
        "cartage=info"
    } else if global.quiet {
        "error"
    } else {
        "cartage=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(err: &anyhow::Error, trace: bool) -> ExitCode {
    if trace {
        eprintln!("Error: {err:?}");
    } else {
        eprintln!("Error: {err}");
    }

    let core = err.downcast_ref::<Error>();
    if let Some(Error::MissingManifest) = core {
        let mut command = Cli::command();
        if let Some(manifest) = command.find_subcommand_mut("manifest") {
            let _ = manifest.print_help();
        }
    }

    let code = core.map(Error::exit_code).unwrap_or(1);
    exit_code(code)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn load_config(global: &GlobalArgs) -> Result<CartageConfig> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let mut config = config::load(global.config_file.as_deref(), &cwd)?;

    if global.name.is_some() {
        config.name.clone_from(&global.name);
    }
    if global.target.is_some() {
        config.target.clone_from(&global.target);
    }
    if global.root_path.is_some() {
        config.root_path.clone_from(&global.root_path);
    }
    if global.timestamp.is_some() {
        config.timestamp.clone_from(&global.timestamp);
    }
    if global.compression.is_some() {
        config.compression = global.compression;
    }
    if global.dependency_cache_path.is_some() {
        config
            .dependency_cache_path
            .clone_from(&global.dependency_cache_path);
    }
    config.quiet |= global.quiet;
    config.verbose |= global.verbose;
    config.disable_dependency_cache |= global.disable_dependency_cache;

    config.validate()?;
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

fn run(command: Commands, global: &GlobalArgs) -> Result<ExitCode> {
    // Conflicting options are rejected before the repository is opened.
    let ignore_mode = match &command {
        Commands::Manifest {
            command: Some(ManifestCommand::Cartignore { mode, force, merge }),
        } => IgnoreMode::from_options(mode.as_deref(), *force, *merge)?,
        _ => None,
    };

    let cartage = Cartage::new(load_config(global)?)?;

    match command {
        Commands::Manifest { command } => run_manifest(&cartage, command, ignore_mode),
        Commands::Pack { skip_check } => run_pack(&cartage, skip_check),
        Commands::Metadata => {
            let cwd = std::env::current_dir()?;
            let path = cartage.save_local_release_metadata(&cwd)?;
            cartage.display(format!("Wrote {}", path.display()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info {
            command: InfoCommand::Plugins,
        } => {
            print_plugins(&cartage);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Save { file } => {
            save_config(cartage.config(), &file)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_manifest(
    cartage: &Cartage,
    command: Option<ManifestCommand>,
    ignore_mode: Option<IgnoreMode>,
) -> Result<ExitCode> {
    let manifest = cartage.manifest();

    match command.unwrap_or(ManifestCommand::Check) {
        ManifestCommand::Check => {
            let check = manifest.check()?;
            if let Some(diff) = &check.diff {
                print!("{diff}");
            }
            if check.up_to_date {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(exit_code(check.exit_code))
            }
        }
        ManifestCommand::Show => {
            let listing = manifest.resolve(None, |file| Ok(std::fs::read_to_string(file)?))?;
            print!("{listing}");
            Ok(ExitCode::SUCCESS)
        }
        ManifestCommand::Generate => {
            manifest.generate()?;
            Ok(ExitCode::SUCCESS)
        }
        ManifestCommand::Cartignore { .. } => {
            manifest.install_default_ignore(ignore_mode)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_pack(cartage: &Cartage, skip_check: bool) -> Result<ExitCode> {
    if !skip_check {
        let check = cartage.manifest().check()?;
        if !check.up_to_date {
            if let Some(diff) = &check.diff {
                print!("{diff}");
            }
            println!();
            eprintln!("Manifest.txt is not up-to-date.");
            return Ok(exit_code(check.exit_code));
        }
    }

    cartage.build_package()?;
    Ok(ExitCode::SUCCESS)
}

fn print_plugins(cartage: &Cartage) {
    let mut active: Vec<String> = cartage
        .plugins()
        .enabled()
        .map(|instance| format!("* {} ({})", instance.name(), instance.plugin().version()))
        .collect();

    if active.is_empty() {
        println!("No active plug-ins.");
        return;
    }

    active.sort();
    println!("Active Plug-ins:\n");
    for line in active {
        println!("{line}");
    }
}

fn save_config(config: &CartageConfig, file: &str) -> Result<()> {
    let toml = config::to_toml(config)?;
    if file == "-" {
        std::io::stdout().lock().write_all(toml.as_bytes())?;
    } else {
        let path = Path::new(file);
        std::fs::write(path, toml)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
