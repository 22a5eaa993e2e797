//! colproxy binary.
//!
//! Exit code is 0 when the engine (or lookup) succeeds and 1 otherwise.

use anyhow::{Context, bail};
use colproxy::{Cli, Command, EngineGeneration, EngineLaunch, resolve, validate_profiles_dir};
use colproxy_core::init_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_launch();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    if let Some(Command::Resolve(args)) = &cli.command {
        let config = args.oracle.config(args.port);
        let report = resolve(config, args.family, &args.relation)
            .await
            .with_context(|| format!("Failed to resolve {}", args.relation))?;
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{}", json);
        return Ok(true);
    }

    // The version check never touches the oracle
    if cli.engine_version {
        return EngineLaunch::version(cli.engine.engine_bin.clone())
            .run()
            .await
            .context("Failed to query engine version");
    }

    let (Some(port), Some(profiles_dir)) = (cli.port, cli.profiles_dir.as_deref()) else {
        bail!("PORT and PROFILES_DIR are required; use --help for usage information");
    };

    let oracle = cli.oracle.config(port);
    oracle.validate().context("Invalid oracle settings")?;
    let profiles_dir = validate_profiles_dir(profiles_dir)?;

    let generation = if cli.engine.legacy_engine {
        EngineGeneration::Legacy
    } else {
        EngineGeneration::Modern
    };

    info!("Oracle: {}", oracle);
    info!("Profiles: {}", profiles_dir.display());

    let launch = EngineLaunch::command(
        cli.engine.engine_bin.clone(),
        generation,
        &cli.engine_args,
        &profiles_dir,
        &oracle,
    );
    launch.run().await.context("Engine invocation failed")
}
