// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Launcher --> Command Dispatch
//!   Exec | Options | Configs | Version
//! ```

use std::process::ExitCode;

use lerna_rs::cli::global::GlobalOptions;
use lerna_rs::cli::{self, Command};
use lerna_rs::cmd::config::{run_configs_command, run_options_command};
use lerna_rs::cmd::exec::run_exec_command;
use lerna_rs::config::loader::ConfigLoader;
use lerna_rs::config::{CONFIG_FILE_NAME, Config, ENV_PREFIX};
use lerna_rs::core::process::{ChildRegistry, Launcher};
use lerna_rs::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = LogConfig::from_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options(args)) => run_options_command(args, config),
        Some(Command::Configs) => {
            let loader = build_config_loader(&cli.global);
            run_configs_command(&loader.format_loaded_files());
            Ok(())
        }
        Some(Command::Exec(args)) => {
            let launcher = Launcher::from_config(&config.process, ChildRegistry::global().clone());
            launcher.on_all_exited(|| tracing::trace!("no children left running"));
            run_exec_command(args, &launcher).await
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(CONFIG_FILE_NAME);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

fn load_config(global: &GlobalOptions) -> lerna_rs::error::Result<Config> {
    let mut loader = build_config_loader(global);
    for option in global.to_config_overrides() {
        loader = loader.set_override(&option)?;
    }
    loader.build()
}
