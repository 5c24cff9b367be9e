//! netvisor-ztp CLI entry point.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use netvisor_ztp::error::Error;
use netvisor_ztp::{ExitPayload, ModuleContext, ModuleParams, ModuleRegistry, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let registry = ModuleRegistry::with_builtins();

    let exit_code = match &cli.command {
        Commands::Run(args) => run_module(&registry, settings, args)?,
        Commands::ListModules => {
            for name in registry.names() {
                if let Some(module) = registry.get(name) {
                    println!("{:<14} {}", name, module.description());
                }
            }
            0
        }
    };

    std::process::exit(exit_code);
}

fn run_module(registry: &ModuleRegistry, settings: Settings, args: &RunArgs) -> Result<i32> {
    let params = load_params(args)?;
    let ctx = ModuleContext::new(settings);

    let payload = ExitPayload::from_result(registry.execute(&args.module, &params, &ctx));
    netvisor_ztp::output::status_line(&args.module, &payload);
    println!("{}", payload.to_json());
    Ok(payload.exit_code())
}

/// Parameters from the YAML/JSON file, overridden by `-e key=value` pairs.
fn load_params(args: &RunArgs) -> Result<ModuleParams> {
    let mut params = ModuleParams::new();

    if let Some(path) = &args.params_file {
        let text = std::fs::read_to_string(path).map_err(|e| Error::ParamsFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        params = serde_yaml::from_str(&text).map_err(|e| Error::ParamsFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }

    for pair in &args.extra {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::InvalidParameter(format!("extra param '{}' is not key=value", pair))
        })?;
        params.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }

    Ok(params)
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
