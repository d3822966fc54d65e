use clap::{ArgGroup, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proxy-hardener")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Enable Force SSL, HTTP/2, HSTS and other hardening on Nginx Proxy Manager hosts",
    long_about = None
)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list", "print_advanced", "dry_run"])
        .multiple(false)
))]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Proxy Manager admin URL (e.g. http://localhost:81) [env: NPM_HOST]
    #[arg(short = 'H', long, value_name = "URL")]
    pub host: Option<String>,

    /// Admin email [env: NPM_EMAIL]
    #[arg(short, long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Admin password [env: NPM_PASSWORD]
    #[arg(short, long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Config file (default: <config dir>/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // ------------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------------
    /// Enable HSTS for subdomains too
    #[arg(long, visible_alias = "hsd")]
    pub hsts_subdomains: bool,

    /// Enable caching of static assets
    #[arg(long, visible_alias = "ca")]
    pub cache_assets: bool,

    /// Block common exploits (exempt hosts are left alone)
    #[arg(long, visible_alias = "bce")]
    pub block_exploits: bool,

    /// Enable websocket support
    #[arg(long, visible_alias = "ws")]
    pub enable_websockets: bool,

    /// Extra domain substring exempt from --block-exploits (repeatable)
    #[arg(long = "exempt", value_name = "SUBSTR")]
    pub exempt: Vec<String>,

    /// Drop the built-in exemption list (tinyauth, vaultls, pocket-id, watchyourlan)
    #[arg(long)]
    pub no_default_exemptions: bool,

    // ------------------------------------------------------------------------
    // Run modes
    // ------------------------------------------------------------------------
    /// List proxy hosts and their current flags, change nothing
    #[arg(long)]
    pub list: bool,

    /// Print each host's advanced_config section, change nothing
    #[arg(long)]
    pub print_advanced: bool,

    /// Show what would change without applying anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
