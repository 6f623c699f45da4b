use anyhow::Result;
use clap::Parser;
use clap::Subcommand;

mod hooks;

#[derive(Debug, Parser)]
#[command(name = "sluice", about = "Operator tools for the Sluice gateway runtime")]
struct Cli {
    #[clap(subcommand)]
    command: RootCommand,
}

#[derive(Debug, Subcommand)]
enum RootCommand {
    /// Inspect and manage hook configuration.
    Hooks(hooks::HooksCli),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        RootCommand::Hooks(cmd) => hooks::run_hooks_cli(cmd),
    }
}
