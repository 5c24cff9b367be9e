//! Command-line interface for netvisor-ztp.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Zero Touch Provisioning modules for Pluribus Netvisor fabrics.
#[derive(Parser, Debug)]
#[command(name = "netvisor-ztp")]
#[command(version)]
#[command(about = "Provision eBGP/OSPF, VLAG and VLAN configuration on Netvisor switches")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a settings file
    #[arg(short = 'c', long, global = true, env = "NVZTP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a module and print its exit payload as JSON
    Run(RunArgs),
    /// List the available modules
    ListModules,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Module name (pn_ebgp_ospf, pn_vlag, pn_vlan)
    pub module: String,

    /// YAML or JSON file holding the module parameters
    #[arg(short = 'a', long = "args")]
    pub params_file: Option<PathBuf>,

    /// Extra parameters as key=value, overriding the file
    #[arg(short = 'e', long = "extra", action = clap::ArgAction::Append)]
    pub extra: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_args_file_and_extras() {
        let cli = Cli::parse_from([
            "netvisor-ztp",
            "run",
            "pn_vlag",
            "--args",
            "vlag.yml",
            "-e",
            "pn_vlagname=vlag-1",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.module, "pn_vlag");
                assert_eq!(args.params_file.unwrap(), PathBuf::from("vlag.yml"));
                assert_eq!(args.extra, ["pn_vlagname=vlag-1"]);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn parses_list_modules() {
        let cli = Cli::parse_from(["netvisor-ztp", "list-modules"]);
        assert!(matches!(cli.command, Commands::ListModules));
    }
}
