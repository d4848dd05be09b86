use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "pcsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Converge declared Pacemaker primitives onto a live cluster", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Shadow CIB to read from and stage changes in
    #[arg(long, global = true, env = "CIB_shadow")]
    pub cib: Option<String>,

    /// pcs binary to run
    #[arg(long, global = true, env = "PCSYNC_PCS")]
    pub pcs: Option<String>,

    /// Desired-state manifest (TOML or JSON)
    #[arg(short, long, global = true, env = "PCSYNC_MANIFEST")]
    pub manifest: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the primitives currently in the CIB
    Status(StatusArgs),

    /// Preview the pcs commands apply would run
    Diff(TargetArgs),

    /// Run the pcs commands that converge the cluster
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct StatusArgs {
    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Only reconcile the declaration with this name
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only reconcile the declaration with this name
    pub target: Option<String>,

    /// Show what would run without running it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
