//! Guided mode, used when no subcommand is given.

use anyhow::bail;
use console::{style, Term};
use dialoguer::{Confirm, Input, Password, Select};

use super::login::{self, LoginArgs};
use super::logout::{self, LogoutArgs};
use super::DryRun;
use crate::settings::Settings;

const OPERATIONS: [&str; 2] = ["Login", "Logout"];
const AUTH_METHODS: [&str; 2] = ["Username and Password", "Token"];

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    if !Term::stdout().is_term() {
        bail!("interactive mode needs a terminal; use `kubectl abriment login` or `logout`");
    }

    println!("{}", style("Backend Configuration:").bold());
    println!("   Login Endpoint:  {}", settings.login_endpoint);
    println!("   Config Endpoint: {}", settings.config_endpoint);
    println!();

    let operation = Select::new()
        .with_prompt("Which operation would you like to do?")
        .items(&OPERATIONS)
        .default(0)
        .interact()?;
    if OPERATIONS[operation] == "Logout" {
        return logout::run(LogoutArgs::default(), settings);
    }

    let method = Select::new()
        .with_prompt("How would you like to authenticate?")
        .items(&AUTH_METHODS)
        .default(0)
        .interact()?;

    let mut args = LoginArgs::default();
    if AUTH_METHODS[method] == "Token" {
        args.token = Some(
            Password::new()
                .with_prompt("Enter your authentication token")
                .interact()?,
        );
    } else {
        args.username = Some(
            Input::<String>::new()
                .with_prompt("Enter your username")
                .interact_text()?,
        );
        args.password = Some(
            Password::new()
                .with_prompt("Enter your password")
                .interact()?,
        );
    }

    let preview = Confirm::new()
        .with_prompt("Preview the configuration without saving it? (dry-run)")
        .default(false)
        .interact()?;
    if preview {
        args.dry_run = Some(DryRun::Client);
    }

    login::run(args, settings)
}
