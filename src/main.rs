mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{BulkAction, Context, UnitAction};

#[derive(Parser)]
#[command(name = "sysinit")]
#[command(about = "Declarative systemd unit lifecycle manager")]
struct Args {
    /// Service config (default: $XDG_CONFIG_HOME/sysinit/services.yaml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log commands instead of running them
    #[arg(long, short = 'n', global = true)]
    dry_run: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Directory descriptors are written to
    #[arg(long, global = true)]
    install_root: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered units and their state
    List,

    /// Install descriptor, reload the daemon and start a unit
    Start { name: String },

    /// Stop a unit
    Stop { name: String },

    /// Restart a unit
    Restart { name: String },

    /// Enable a unit to start at boot
    Enable { name: String },

    /// Disable a unit from starting at boot
    Disable { name: String },

    /// Write a unit's descriptor
    Load { name: String },

    /// Remove a unit's descriptor
    Unload { name: String },

    /// Rewrite a unit's descriptor and reload the daemon
    Reload { name: String },

    /// Show systemctl status for a unit
    Status { name: String },

    /// Show configuration and live state of a unit
    Info { name: String },

    /// Print the descriptor a unit would install
    Generate { name: String },

    /// Parse a descriptor file and print it as a config record
    Parse { path: PathBuf },

    /// Run an operation on every registered unit
    All {
        #[arg(value_enum)]
        action: BulkAction,
    },

    /// Stop every registered unit
    KillSwitch,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::new(
        args.config,
        args.dry_run,
        args.verbose,
        args.install_root,
        args.log_file,
    )?;

    match args.command {
        Command::List => commands::list(&ctx),
        Command::Start { name } => commands::unit(&ctx, &name, UnitAction::Start),
        Command::Stop { name } => commands::unit(&ctx, &name, UnitAction::Stop),
        Command::Restart { name } => commands::unit(&ctx, &name, UnitAction::Restart),
        Command::Enable { name } => commands::unit(&ctx, &name, UnitAction::Enable),
        Command::Disable { name } => commands::unit(&ctx, &name, UnitAction::Disable),
        Command::Load { name } => commands::unit(&ctx, &name, UnitAction::Load),
        Command::Unload { name } => commands::unit(&ctx, &name, UnitAction::Unload),
        Command::Reload { name } => commands::unit(&ctx, &name, UnitAction::Reload),
        Command::Status { name } => commands::unit(&ctx, &name, UnitAction::Status),
        Command::Info { name } => commands::info(&ctx, &name),
        Command::Generate { name } => commands::generate(&ctx, &name),
        Command::Parse { path } => commands::parse(&ctx, &path),
        Command::All { action } => commands::bulk(&ctx, action),
        Command::KillSwitch => commands::bulk(&ctx, BulkAction::KillSwitch),
    }
}
