//! Run configuration: CLI flags, environment, `.env` and config.toml

use anyhow::{Context, Result, bail};
use proxy_api::Credentials;
use reconcile::{PolicyOptions, RunMode};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cli::Cli;
use crate::paths;

/// Environment variable for the admin URL
pub const ENV_HOST: &str = "NPM_HOST";

/// Environment variable for the admin email
pub const ENV_EMAIL: &str = "NPM_EMAIL";

/// Environment variable for the admin password
pub const ENV_PASSWORD: &str = "NPM_PASSWORD";

// ============================================================================
// Config File
// ============================================================================

/// Contents of config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub exemptions: Vec<String>,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// `[policy]` table; each switch is OR-ed with its CLI flag
#[derive(Debug, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub hsts_subdomains: bool,
    #[serde(default)]
    pub cache_assets: bool,
    #[serde(default)]
    pub block_exploits: bool,
    #[serde(default)]
    pub enable_websockets: bool,
}

impl FileConfig {
    /// Load the config file
    ///
    /// An explicitly named file must exist. The default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (paths::expand(&path.to_string_lossy()), true),
            None => match paths::config_file() {
                Ok(path) => (path, false),
                Err(e) => {
                    log::debug!("No default config location: {e}");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            if required {
                bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_path(&path)
    }

    /// Parse a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Load `.env` from the working directory without overriding the environment
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Everything a run needs, resolved from all sources
#[derive(Debug)]
pub struct Settings {
    pub host: String,
    pub credentials: Credentials,
    pub mode: RunMode,
    pub policy: PolicyOptions,
    /// Non-fatal problems found while resolving
    pub warnings: Vec<String>,
}

impl Settings {
    /// Resolve settings with priority CLI > environment > config file
    ///
    /// `env` looks up an environment variable; `main` passes the process
    /// environment, tests pass a map.
    pub fn resolve<F>(cli: &Cli, file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        let host = pick(
            "--host",
            ENV_HOST,
            cli.host.as_deref(),
            env(ENV_HOST),
            file.host.as_deref(),
            &mut warnings,
        );
        let email = pick(
            "--email",
            ENV_EMAIL,
            cli.email.as_deref(),
            env(ENV_EMAIL),
            file.email.as_deref(),
            &mut warnings,
        );
        let password = pick(
            "--password",
            ENV_PASSWORD,
            cli.password.as_deref(),
            env(ENV_PASSWORD),
            file.password.as_deref(),
            &mut warnings,
        );

        let (host, email, password) = match (host, email, password) {
            (Some(h), Some(e), Some(p)) => (h, e, p),
            (h, e, p) => {
                let missing: Vec<&str> = [
                    (h.is_none(), "host (--host or NPM_HOST)"),
                    (e.is_none(), "email (--email or NPM_EMAIL)"),
                    (p.is_none(), "password (--password or NPM_PASSWORD)"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                bail!("Missing required settings: {}", missing.join(", "));
            }
        };

        let mode = RunMode::from_flags(cli.list, cli.print_advanced, cli.dry_run)?;
        let policy = build_policy(cli, file)?;

        Ok(Self {
            host,
            credentials: Credentials::new(email, password),
            mode,
            policy,
            warnings,
        })
    }
}

/// Pick the first non-empty value, warning when CLI and environment disagree
fn pick(
    flag: &str,
    var: &str,
    cli: Option<&str>,
    env: Option<String>,
    file: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let cli = cli.filter(|v| !v.trim().is_empty());
    let env = env.filter(|v| !v.trim().is_empty());

    if let (Some(c), Some(e)) = (cli, env.as_deref())
        && c != e
    {
        warnings.push(format!(
            "{flag} differs from {var} in the environment; using {flag}"
        ));
    }

    let source = if cli.is_some() {
        "command line"
    } else if env.is_some() {
        "environment"
    } else {
        "config file"
    };

    let value = cli
        .map(str::to_string)
        .or(env)
        .or_else(|| file.filter(|v| !v.trim().is_empty()).map(str::to_string));
    if value.is_some() {
        log::debug!("{flag}: using value from {source}");
    }
    value
}

fn build_policy(cli: &Cli, file: &FileConfig) -> Result<PolicyOptions> {
    let mut policy = PolicyOptions::new()
        .with_hsts_subdomains(cli.hsts_subdomains || file.policy.hsts_subdomains)
        .with_caching(cli.cache_assets || file.policy.cache_assets)
        .with_block_exploits(cli.block_exploits || file.policy.block_exploits)
        .with_websockets(cli.enable_websockets || file.policy.enable_websockets);

    if !cli.no_default_exemptions {
        policy = policy.with_default_exemptions();
    }

    for substring in file.exemptions.iter().chain(&cli.exempt) {
        policy
            .add_exemption(substring)
            .with_context(|| format!("Invalid exemption '{substring}'"))?;
    }

    Ok(policy)
}
