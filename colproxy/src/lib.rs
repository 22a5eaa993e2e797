//! Launcher and lookup tool for a SQL-transformation engine paired with a
//! local metadata oracle.
//!
//! The binary has two modes:
//! - launch: `colproxy <PORT> <PROFILES_DIR> [ENGINE_ARGS]...` runs the
//!   engine with its argv prepared and the oracle address exported, or
//!   `colproxy --version` to ask the engine for its version
//! - `colproxy resolve`: query the oracle for one relation and print the
//!   outcome as JSON. The oracle address defaults to the exported one
//!
//! Column interception itself lives in `colproxy-core`
//! (`InterceptingFactory`, `OracleProxyResolver`) and is embedded by the
//! adapter host.

pub mod cli;
pub mod engine;
pub mod resolve;

pub use cli::{Cli, Command};
pub use engine::{EngineGeneration, EngineLaunch, validate_profiles_dir};
pub use resolve::{ResolveReport, resolve};
