//! `sluice hooks` subcommands.

use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use sluice_hooks::HooksConfig;
use sluice_hooks::loader;

#[derive(Debug, Parser)]
pub struct HooksCli {
    #[clap(subcommand)]
    pub command: HooksSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum HooksSubcommand {
    /// List the configured hook bindings.
    List(ListArgs),
    /// Validate the hooks configuration file.
    Validate(ValidateArgs),
    /// Write a starter hooks configuration file.
    Init(InitArgs),
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Path to a hooks.json file (default: resolve from the current directory)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of a human-friendly table
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Path to a hooks.json file (default: resolve from the current directory)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Destination path (default: .sluice/hooks.json)
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long = "force")]
    pub force: bool,
}

pub fn run_hooks_cli(cli: HooksCli) -> Result<()> {
    match cli.command {
        HooksSubcommand::List(args) => run_list(args),
        HooksSubcommand::Validate(args) => run_validate(args),
        HooksSubcommand::Init(args) => run_init(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<HooksConfig> {
    match path {
        Some(path) => loader::load_from_file(path)
            .with_context(|| format!("unable to load {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("unable to resolve current directory")?;
            loader::load_hooks_config(&cwd).context("unable to load hooks configuration")
        }
    }
}

fn run_list(args: ListArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if config.is_disabled() {
        println!("All hooks are disabled.");
        return Ok(());
    }
    if config.binding_count() == 0 {
        println!("No hooks are currently configured.");
        return Ok(());
    }

    println!("Verification policy: {}", config.verification_policy);
    println!("{:<20} {:>8}  {:>7}  {}", "Hook Type", "Priority", "Timeout", "Command");

    let mut rows: Vec<_> = config.bindings().collect();
    rows.sort_by(|a, b| {
        a.0.wire_name()
            .cmp(b.0.wire_name())
            .then(a.1.priority.cmp(&b.1.priority))
    });
    for (hook_type, binding) in rows {
        println!(
            "{:<20} {:>8}  {:>6}s  {}",
            hook_type, binding.priority, binding.timeout, binding.command
        );
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<()> {
    match load_config(args.config.as_deref()) {
        Ok(config) => {
            println!(
                "Configuration is valid: {} hook binding(s) across {} hook type(s).",
                config.binding_count(),
                config.hooks.len()
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("Configuration is invalid: {err:#}");
            std::process::exit(2);
        }
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let path = args
        .path
        .unwrap_or_else(|| Path::new(loader::HOOKS_CONFIG_DIR).join(loader::HOOKS_JSON_FILENAME));

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
    }

    let starter = serde_json::to_string_pretty(&HooksConfig::default())?;
    std::fs::write(&path, format!("{starter}\n"))
        .with_context(|| format!("unable to write {}", path.display()))?;

    println!("Wrote starter hooks configuration to {}.", path.display());
    Ok(())
}
