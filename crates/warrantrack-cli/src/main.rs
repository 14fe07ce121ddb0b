// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;
use warrantrack_api::Client;
use warrantrack_app::AppState;
use warrantrack_tui::UiSettings;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `warrantrack --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_path = logging::init(&config)?;

    let api_root = options
        .api_url
        .clone()
        .unwrap_or_else(|| config.api_base_url());
    let client = Client::new(&api_root, config.api_timeout()?).with_context(|| {
        format!(
            "invalid API root {api_root:?}; fix [api].base_url, {} or --api-url",
            config::API_URL_ENV
        )
    })?;
    info!(
        base_url = client.base_url(),
        log_path = %log_path.display(),
        "warrantrack starting"
    );

    if options.check_only {
        let records = client.list().context("check warranty api")?;
        println!(
            "ok: {} reachable, {} warranties",
            client.base_url(),
            records.len()
        );
        return Ok(());
    }

    let mut state = AppState::with_start_screen(config.start_screen(), config.expiry_policy());
    let mut runtime = ApiRuntime::new(client);
    let settings = UiSettings {
        notice_ttl: config.notice_timeout()?,
    };
    let result = warrantrack_tui::run_app(&mut state, &mut runtime, settings);
    info!(ok = result.is_ok(), "warrantrack exiting");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_url: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        api_url: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--api-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--api-url requires a URL"))?;
                options.api_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("warrantrack");
    println!("  --config <path>          Use a specific config path");
    println!("  --api-url <url>          Override the warranty API root for this run");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and check the API, then exit");
    println!("  --help                   Show this help");
}
