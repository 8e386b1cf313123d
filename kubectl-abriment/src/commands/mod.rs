use clap::ValueEnum;
use kubeconf::Mode;

pub mod interactive;
pub mod login;
pub mod logout;

/// `--dry-run` strategies; only the client side one exists.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRun {
    /// Print the resulting kubeconfig without saving it
    Client,
}

pub fn mode(dry_run: Option<DryRun>) -> Mode {
    match dry_run {
        Some(DryRun::Client) => Mode::Preview,
        None => Mode::Write,
    }
}
