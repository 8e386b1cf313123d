use anyhow::Context as _;
use clap::Args;
use kubeconf::{retract_file, Persisted, Retracted};

use super::{mode, DryRun};
use crate::output;
use crate::settings::Settings;

/// Remove the Abriment cluster, context and user from your kubeconfig
#[derive(Args, Debug, Default)]
pub struct LogoutArgs {
    /// Print the resulting kubeconfig instead of saving it
    #[arg(
        long,
        value_enum,
        value_name = "STRATEGY",
        num_args = 0..=1,
        default_missing_value = "client"
    )]
    pub dry_run: Option<DryRun>,
}

pub fn run(args: LogoutArgs, settings: &Settings) -> anyhow::Result<()> {
    let path = settings.kubeconfig_path()?;

    let retracted = retract_file(&path, mode(args.dry_run))
        .with_context(|| format!("logout failed for {}", path.display()))?;

    match retracted {
        Retracted::NoFile => {
            println!("No kubeconfig at {}, nothing to remove.", path.display());
        }
        Retracted::Done { removed, .. } if removed.is_empty() => {
            println!("Already logged out, no Abriment entries in {}.", path.display());
        }
        Retracted::Done {
            removed,
            previous,
            persisted,
        } => match persisted {
            Some(Persisted::Preview(rendered)) => {
                output::preview("Kubeconfig Preview:", &rendered);
                output::diff(Some(&previous), &rendered);
            }
            Some(Persisted::Written { path: written }) => {
                println!("Logged out successfully!");
                println!();
                output::location(&written);
                print!("{}", output::removed_table(&removed));
            }
            None => {
                println!("Already logged out, no Abriment entries in {}.", path.display());
            }
        },
    }

    Ok(())
}
