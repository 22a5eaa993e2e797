//! Host engine launching.
//!
//! The engine runs as a child process with inherited stdio. colproxy only
//! prepares its argument vector and environment: it adds the flags the
//! engine needs for non-interactive use, points it at the profiles
//! directory, and exports the oracle address. Anything the engine starts
//! inherits that address, so `colproxy resolve` run from an engine hook
//! reaches the same oracle without further flags.

use colproxy_core::{ColProxyError, OracleConfig, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable carrying the oracle host to the engine.
pub const ORACLE_HOST_ENV: &str = "COLPROXY_ORACLE_HOST";

/// Environment variable carrying the oracle port to the engine.
pub const ORACLE_PORT_ENV: &str = "COLPROXY_ORACLE_PORT";

/// Which flag spelling the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineGeneration {
    /// Engines with the programmatic runner (1.5 and later)
    Modern,
    /// Older engines
    Legacy,
}

impl EngineGeneration {
    /// Flag that turns off anonymous usage tracking.
    pub const fn no_stats_flag(self) -> &'static str {
        match self {
            Self::Modern => "--no-send-anonymous-usage-stats",
            Self::Legacy => "--no-anonymous-usage-stats",
        }
    }
}

/// A fully prepared engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLaunch {
    /// Executable name or path
    pub program: String,
    /// Full argument vector, program excluded
    pub args: Vec<String>,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
}

impl EngineLaunch {
    /// Invocation asking the engine for its own version string.
    pub fn version(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["--version".to_string()],
            env: Vec::new(),
        }
    }

    /// Invocation running `engine_args` against `profiles_dir` with the
    /// oracle at `oracle`.
    ///
    /// The argument order is: no-stats flag, `--no-use-colors`, the
    /// forwarded arguments, then `--profiles-dir <dir>`.
    pub fn command(
        program: impl Into<String>,
        generation: EngineGeneration,
        engine_args: &[String],
        profiles_dir: &Path,
        oracle: &OracleConfig,
    ) -> Self {
        let mut args = vec![
            generation.no_stats_flag().to_string(),
            "--no-use-colors".to_string(),
        ];
        args.extend(engine_args.iter().cloned());
        args.push("--profiles-dir".to_string());
        args.push(profiles_dir.display().to_string());

        Self {
            program: program.into(),
            args,
            env: vec![
                (ORACLE_HOST_ENV.to_string(), oracle.host.clone()),
                (ORACLE_PORT_ENV.to_string(), oracle.port.to_string()),
            ],
        }
    }

    /// Runs the engine to completion.
    ///
    /// # Returns
    /// `true` if the engine exited successfully
    ///
    /// # Errors
    /// Returns error if the engine cannot be started or waited on
    pub async fn run(&self) -> Result<bool> {
        info!(program = %self.program, "starting engine");
        debug!(args = ?self.args, "engine arguments");

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| ColProxyError::Io {
                context: format!("Failed to run engine '{}'", self.program),
                source: e,
            })?;

        info!(program = %self.program, %status, "engine finished");
        Ok(status.success())
    }
}

/// Checks that the profiles directory exists and returns it.
///
/// # Errors
/// Returns a configuration error if the path is missing or not a directory
pub fn validate_profiles_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(ColProxyError::configuration(format!(
            "profiles directory '{}' does not exist or is not a directory",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_launch() {
        let launch = EngineLaunch::version("dbt");
        assert_eq!(launch.program, "dbt");
        assert_eq!(launch.args, ["--version"]);
        assert!(launch.env.is_empty());
    }

    #[test]
    fn test_command_argument_order() {
        let launch = EngineLaunch::command(
            "dbt",
            EngineGeneration::Modern,
            &["compile".to_string(), "-m".to_string(), "models/a.sql".to_string()],
            Path::new("/home/user/.dbt"),
            &OracleConfig::new(3000),
        );

        assert_eq!(
            launch.args,
            [
                "--no-send-anonymous-usage-stats",
                "--no-use-colors",
                "compile",
                "-m",
                "models/a.sql",
                "--profiles-dir",
                "/home/user/.dbt",
            ]
        );
        assert!(launch.env.contains(&(ORACLE_PORT_ENV.to_string(), "3000".to_string())));
        assert!(launch.env.contains(&(ORACLE_HOST_ENV.to_string(), "localhost".to_string())));
    }

    #[test]
    fn test_legacy_engine_flag() {
        let launch = EngineLaunch::command(
            "dbt",
            EngineGeneration::Legacy,
            &["deps".to_string()],
            Path::new("/p"),
            &OracleConfig::new(3000),
        );
        assert_eq!(launch.args[0], "--no-anonymous-usage-stats");
        assert_eq!(launch.args[2], "deps");
    }
}
