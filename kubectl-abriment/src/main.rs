use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod commands;
mod output;
mod settings;

use commands::{login::LoginArgs, logout::LogoutArgs};
use settings::Settings;

/// kubectl plugin for Abriment
///
/// Authenticates with the Abriment backend and keeps the abriment-cluster,
/// abriment-context and abriment-user entries of your kubeconfig up to date.
/// Every other entry in the file is left as it is. Run without a subcommand
/// for guided prompts.
#[derive(Parser, Debug)]
#[command(name = "kubectl-abriment", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    settings: Settings,

    /// Log what is happening to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Logout(LogoutArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Login(args)) => commands::login::run(args, &cli.settings),
        Some(Command::Logout(args)) => commands::logout::run(args, &cli.settings),
        None => commands::interactive::run(&cli.settings),
    }
}
