//! Command-line definitions.

use clap::{Args, CommandFactory, Parser, Subcommand};
use colproxy_core::OracleConfig;
use colproxy_core::models::AdapterFamily;
use colproxy_core::oracle::config::DEFAULT_ORACLE_HOST;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Launcher for a SQL-transformation engine paired with a metadata oracle.
#[derive(Debug, Parser)]
#[command(name = "colproxy")]
#[command(about = "Run an engine next to a local metadata oracle and query it")]
#[command(disable_version_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "
colproxy - column metadata proxy for SQL-transformation engines

Starts the host engine with its arguments prepared and the oracle
address exported as COLPROXY_ORACLE_HOST and COLPROXY_ORACLE_PORT.
`colproxy resolve` reads the same variables, so it can be run from
inside the engine's process tree. The oracle either returns the columns,
reports the relation as absent, or defers to the real warehouse.

Own flags must come before PORT; everything after PROFILES_DIR is
forwarded to the engine verbatim.

EXAMPLES:
  colproxy --version
  colproxy 3000 ~/.dbt compile -m models/users.sql
  colproxy 3000 ~/.dbt deps
  colproxy resolve --port 3000 proj.analytics.users
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Ask the host engine for its own version; the oracle is not used
    #[arg(long = "version", help = "Print the host engine's version")]
    pub engine_version: bool,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Oracle port
    #[arg(value_name = "PORT", help = "Port the metadata oracle listens on")]
    pub port: Option<u16>,

    /// Profiles (credentials) directory
    #[arg(value_name = "PROFILES_DIR", help = "Directory holding the engine's profiles")]
    pub profiles_dir: Option<PathBuf>,

    /// Arguments forwarded to the engine
    #[arg(
        value_name = "ENGINE_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "Engine command and arguments, forwarded verbatim"
    )]
    pub engine_args: Vec<String>,
}

/// Subcommands besides the default launch mode.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the oracle about one relation and print the outcome as JSON
    Resolve(ResolveArgs),
}

/// Arguments for `colproxy resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Oracle port
    #[arg(long, env = "COLPROXY_ORACLE_PORT")]
    pub port: u16,

    /// Adapter family used to translate column types
    #[arg(long, default_value = "bigquery", value_parser = parse_family)]
    pub family: AdapterFamily,

    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Relation as `table`, `schema.table`, or `db.schema.table`
    #[arg(value_name = "RELATION")]
    pub relation: String,
}

/// Host engine selection.
#[derive(Debug, Args)]
pub struct EngineArgs {
    /// Engine executable
    #[arg(
        long,
        env = "COLPROXY_ENGINE_BIN",
        default_value = "dbt",
        help = "Host engine executable"
    )]
    pub engine_bin: String,

    /// Engine predates the `--no-send-anonymous-usage-stats` flag
    #[arg(long, help = "Use legacy engine flags (--no-anonymous-usage-stats)")]
    pub legacy_engine: bool,
}

/// Oracle address and timeouts.
#[derive(Debug, Clone, Args)]
pub struct OracleArgs {
    /// Oracle host
    #[arg(long, env = "COLPROXY_ORACLE_HOST", default_value = DEFAULT_ORACLE_HOST)]
    pub oracle_host: String,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl OracleArgs {
    /// Builds the oracle config for `port`.
    pub fn config(&self, port: u16) -> OracleConfig {
        OracleConfig::new(port)
            .with_host(self.oracle_host.clone())
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

/// Logging flags.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse_launch() -> Self {
        Self::try_parse_launch(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `argv`, forwarding everything after PROFILES_DIR untouched.
    ///
    /// Only the arguments up to and including PROFILES_DIR go through
    /// clap, so engine flags that share a name with colproxy's own
    /// (`-q`, `-v`, `--version`) still reach the engine.
    ///
    /// # Errors
    /// Returns the clap error for malformed colproxy arguments
    pub fn try_parse_launch<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let split = engine_args_start(&argv);
        let (own, forwarded) = argv.split_at(split);

        let mut cli = Self::try_parse_from(own)?;
        cli.engine_args
            .extend(forwarded.iter().map(|arg| arg.to_string_lossy().into_owned()));
        Ok(cli)
    }
}

/// Index of the first engine argument in `argv`, or `argv.len()` when
/// there is nothing to split off.
fn engine_args_start(argv: &[OsString]) -> usize {
    let command = Cli::command();
    let mut positionals = 0;
    let mut index = 1;

    while index < argv.len() {
        let arg = argv[index].to_string_lossy();

        if arg == "--" {
            return argv.len();
        }

        if let Some(long) = arg.strip_prefix("--") {
            if !long.contains('=') && takes_value(&command, |a| a.get_long() == Some(long)) {
                index += 1;
            }
        } else if let Some(short) = arg.strip_prefix('-').filter(|s| !s.is_empty()) {
            let mut chars = short.chars();
            if let (Some(c), None) = (chars.next(), chars.next())
                && takes_value(&command, |a| a.get_short() == Some(c))
            {
                index += 1;
            }
        } else {
            if positionals == 0 && command.find_subcommand(&*arg).is_some() {
                return argv.len();
            }
            positionals += 1;
            if positionals == 2 {
                return index + 1;
            }
        }

        index += 1;
    }

    argv.len()
}

fn takes_value(command: &clap::Command, matches: impl Fn(&clap::Arg) -> bool) -> bool {
    command
        .get_arguments()
        .any(|arg| matches(arg) && arg.get_action().takes_values())
}

fn parse_family(value: &str) -> Result<AdapterFamily, String> {
    value.parse::<AdapterFamily>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_flag_is_reserved() {
        let cli = Cli::try_parse_launch(["colproxy", "--version"]).unwrap();
        assert!(cli.engine_version);
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_launch_arguments_are_forwarded_verbatim() {
        let cli = Cli::try_parse_launch([
            "colproxy",
            "3000",
            "/home/user/.dbt",
            "compile",
            "-m",
            "models/users.sql",
            "--version",
        ])
        .unwrap();

        assert!(!cli.engine_version);
        assert_eq!(cli.port, Some(3000));
        assert_eq!(cli.profiles_dir, Some(PathBuf::from("/home/user/.dbt")));
        assert_eq!(
            cli.engine_args,
            ["compile", "-m", "models/users.sql", "--version"]
        );
    }

    #[test]
    fn test_engine_flags_sharing_our_names_are_forwarded() {
        let cli = Cli::try_parse_launch(["colproxy", "3000", "/tmp", "-q", "compile"]).unwrap();
        assert!(!cli.global.quiet);
        assert_eq!(cli.engine_args, ["-q", "compile"]);

        let cli = Cli::try_parse_launch(["colproxy", "3000", "/tmp", "--version"]).unwrap();
        assert!(!cli.engine_version);
        assert_eq!(cli.port, Some(3000));
        assert_eq!(cli.engine_args, ["--version"]);

        let cli = Cli::try_parse_launch(["colproxy", "3000", "/tmp", "-v", "run"]).unwrap();
        assert_eq!(cli.global.verbose, 0);
        assert_eq!(cli.engine_args, ["-v", "run"]);

        let cli = Cli::try_parse_launch([
            "colproxy",
            "3000",
            "/tmp",
            "--oracle-host",
            "db.internal",
            "--request-timeout-secs",
            "1",
        ])
        .unwrap();
        assert_eq!(cli.oracle.oracle_host, "localhost");
        assert_eq!(
            cli.engine_args,
            ["--oracle-host", "db.internal", "--request-timeout-secs", "1"]
        );
    }

    #[test]
    fn test_own_value_flags_do_not_count_as_positionals() {
        let cli = Cli::try_parse_launch([
            "colproxy",
            "-v",
            "--oracle-host",
            "127.0.0.1",
            "--connect-timeout-secs=2",
            "3000",
            "/tmp",
            "-q",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 1);
        assert!(!cli.global.quiet);
        assert_eq!(cli.oracle.oracle_host, "127.0.0.1");
        assert_eq!(cli.oracle.connect_timeout_secs, 2);
        assert_eq!(cli.profiles_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.engine_args, ["-q"]);
    }

    #[test]
    fn test_own_flags_before_port() {
        let cli = Cli::try_parse_launch([
            "colproxy",
            "-vv",
            "--engine-bin",
            "/opt/dbt/bin/dbt",
            "--legacy-engine",
            "--request-timeout-secs",
            "5",
            "3000",
            "/tmp/profiles",
            "deps",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.engine.engine_bin, "/opt/dbt/bin/dbt");
        assert!(cli.engine.legacy_engine);
        assert_eq!(
            cli.oracle.config(3000).request_timeout,
            Duration::from_secs(5)
        );
        assert_eq!(cli.engine_args, ["deps"]);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_launch(["colproxy", "not-a-port", "/tmp"]).is_err());
        assert!(Cli::try_parse_launch(["colproxy", "70000", "/tmp"]).is_err());
    }

    #[test]
    fn test_resolve_subcommand() {
        let cli = Cli::try_parse_launch([
            "colproxy",
            "resolve",
            "--port",
            "4000",
            "--family",
            "snowflake",
            "DB.PUBLIC.USERS",
        ])
        .unwrap();

        let Some(Command::Resolve(args)) = cli.command else {
            panic!("expected resolve subcommand");
        };
        assert_eq!(args.port, 4000);
        assert_eq!(args.family, AdapterFamily::Snowflake);
        assert_eq!(args.relation, "DB.PUBLIC.USERS");
        assert_eq!(args.oracle.config(args.port).host, "localhost");
    }

    #[test]
    fn test_resolve_rejects_unknown_family() {
        assert!(
            Cli::try_parse_launch([
                "colproxy", "resolve", "--port", "4000", "--family", "redshift", "a.b.c",
            ])
            .is_err()
        );
    }
}
