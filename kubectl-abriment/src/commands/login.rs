use std::{fs, path::PathBuf};

use anyhow::{bail, Context as _};
use clap::Args;
use console::style;
use kubeconf::{apply_bundle, ApplyOptions, MergePolicy, Persisted};
use tracing::info;

use super::{mode, DryRun};
use crate::api::{Client, Credentials};
use crate::output;
use crate::settings::Settings;

/// Log in and merge the cluster, context and user into your kubeconfig
#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Your username
    #[arg(short, long, requires = "password")]
    pub username: Option<String>,

    /// Your password
    #[arg(short, long, requires = "username")]
    pub password: Option<String>,

    /// Your authentication token
    #[arg(short, long, conflicts_with_all = ["username", "password"])]
    pub token: Option<String>,

    /// Project to scope the session to
    #[arg(long)]
    pub project: Option<String>,

    /// Print the resulting kubeconfig instead of saving it
    #[arg(
        long,
        value_enum,
        value_name = "STRATEGY",
        num_args = 0..=1,
        default_missing_value = "client"
    )]
    pub dry_run: Option<DryRun>,

    /// Merge a kubeconfig bundle from this file instead of downloading one
    #[arg(long, value_name = "FILE", conflicts_with_all = ["username", "password", "token"])]
    pub bundle: Option<PathBuf>,

    /// Do not replace Abriment entries that are already in the kubeconfig
    #[arg(long)]
    pub keep_existing: bool,

    /// Copy the kubeconfig aside before changing it
    #[arg(long)]
    pub backup: bool,
}

impl LoginArgs {
    fn credentials(&self) -> anyhow::Result<Credentials> {
        match (&self.token, &self.username, &self.password) {
            (Some(token), _, _) if !token.is_empty() => Ok(Credentials::Token(token.clone())),
            (_, Some(username), Some(password)) if !username.is_empty() => {
                Ok(Credentials::Password {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => bail!(
                "provide either --token or --username and --password\n\
                 Run \"kubectl abriment login --help\" for more information."
            ),
        }
    }

    fn options(&self) -> ApplyOptions {
        ApplyOptions {
            policy: if self.keep_existing {
                MergePolicy::PreserveExisting
            } else {
                MergePolicy::Overwrite
            },
            mode: mode(self.dry_run),
            backup: self.backup,
        }
    }
}

/// Get the bundle, either from disk or from the backend.
fn bundle(args: &LoginArgs, settings: &Settings) -> anyhow::Result<Vec<u8>> {
    if let Some(file) = &args.bundle {
        return fs::read(file).with_context(|| format!("failed to read {}", file.display()));
    }

    let credentials = args.credentials()?;
    let client = Client::new(settings);
    let session = client
        .login(&credentials, args.project.as_deref())
        .context("authentication failed")?;
    info!(user = ?session.user, project = ?session.project, "authenticated");
    eprintln!("{}", style("Authentication successful!").green());

    client
        .fetch_bundle(&session.token)
        .context("failed to retrieve kubeconfig")
}

pub fn run(args: LoginArgs, settings: &Settings) -> anyhow::Result<()> {
    let path = settings.kubeconfig_path()?;
    let bundle = bundle(&args, settings)?;

    let applied = apply_bundle(&path, &bundle, &args.options())
        .with_context(|| format!("failed to update {}", path.display()))?;

    match &applied.persisted {
        Persisted::Preview(rendered) => {
            output::preview("Kubeconfig Preview:", rendered);
            output::diff(applied.previous.as_ref(), rendered);
        }
        Persisted::Written { path } => {
            println!("Configuration saved successfully!");
            println!();
            output::location(path);
            if let Some(backup) = &applied.backup {
                println!("   Backup:   {}", backup.display());
            }
            print!("{}", output::changes_table(&applied.changes));
        }
    }

    Ok(())
}
