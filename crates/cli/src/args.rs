//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the static CLI structure using clap derive macros.
//! - Capture provider-specific arguments verbatim for the second parsing
//!   phase (see `flags`), once the provider named on the command line is known.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not know which options a provider declares.

use clap::{Parser, Subcommand, ValueEnum};
use kconnect_config::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "kconnect")]
#[command(
    about = "kconnect - discover Kubernetes clusters and authenticate to them",
    long_about = None
)]
#[command(version)]
#[command(
    after_help = concat!(
        "Examples:\n",
        "  kconnect providers\n",
        "  kconnect config-items aad\n",
        "  kconnect auth aad --tenant-id contoso -u jane@contoso.com\n",
        "  kconnect use eks --idp-protocol aws-iam \\\n",
        "    --cluster-id arn:aws:eks:us-east-1:123456789012:cluster/dev\n",
    )
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    /// Allow logins that need a human (browser or device prompt)
    #[arg(
        long,
        global = true,
        env = "KCONNECT_INTERACTIVE",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_name = "BOOL"
    )]
    pub interactive: bool,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "KCONNECT_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of retries for rate-limited requests
    #[arg(long, global = true, env = "KCONNECT_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Skip TLS certificate verification
    #[arg(long, global = true, env = "KCONNECT_SKIP_VERIFY")]
    pub skip_verify: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Plugin kind filter for `config-items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Discovery,
    Identity,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered discovery and identity providers
    Providers,

    /// Show the configuration items a provider accepts
    ConfigItems {
        /// Provider name (e.g. eks, aad, aws-iam)
        provider: String,

        /// Only look at providers of this kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Scope passed to the provider when building its items
        #[arg(long, default_value = "")]
        scope: String,
    },

    /// Authenticate with an identity provider and print the identity summary
    #[command(disable_help_flag = true)]
    Auth {
        /// Identity provider name (e.g. aad, aws-iam)
        provider: String,

        /// Provider options; `kconnect auth <provider> --help` lists them
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "OPTIONS")]
        args: Vec<String>,
    },

    /// Discover a cluster, authenticating first, and print its connection details
    #[command(disable_help_flag = true)]
    Use {
        /// Discovery provider name (e.g. eks)
        provider: String,

        /// `--idp-protocol <NAME> --cluster-id <ID>` plus provider options;
        /// `kconnect use <provider> --help` lists them
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "OPTIONS")]
        args: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_provider_options_are_captured_verbatim() {
        let cli = Cli::try_parse_from([
            "kconnect",
            "-o",
            "json",
            "auth",
            "aad",
            "--tenant-id",
            "contoso",
            "-u",
            "jane",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Auth { provider, args } => {
                assert_eq!(provider, "aad");
                assert_eq!(args, vec!["--tenant-id", "contoso", "-u", "jane"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_interactive_takes_explicit_value() {
        let cli = Cli::try_parse_from(["kconnect", "--interactive", "false", "providers"]).unwrap();
        assert!(!cli.interactive);
    }
}
