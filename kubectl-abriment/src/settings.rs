use std::{ffi::OsString, path::PathBuf, time::Duration};

use clap::Args;
use kubeconf::{path, PathError};

pub const DEFAULT_LOGIN_ENDPOINT: &str = "https://backend.abriment.com/dashboard/api/login/";
pub const DEFAULT_CONFIG_ENDPOINT: &str =
    "https://backend.abriment.com/dashboard/api/v1/paas/kubeconfig/";

/// Where to talk to and where to write; shared by every command.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Backend login endpoint
    #[arg(long, env = "LOGIN_ENDPOINT", default_value = DEFAULT_LOGIN_ENDPOINT, global = true)]
    pub login_endpoint: String,

    /// Backend kubeconfig endpoint
    #[arg(long, env = "CONFIG_ENDPOINT", default_value = DEFAULT_CONFIG_ENDPOINT, global = true)]
    pub config_endpoint: String,

    /// Kubeconfig file, or a directory to keep it in [default: ~/.kube/config]
    #[arg(long, env = path::KUBECONFIG_ENV, global = true)]
    pub kubeconfig: Option<OsString>,

    /// Timeout for each backend request, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 30, global = true)]
    pub timeout: u64,
}

impl Settings {
    pub fn kubeconfig_path(&self) -> Result<PathBuf, PathError> {
        path::resolve_default(self.kubeconfig.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
