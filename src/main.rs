// src/main.rs

use anyhow::Result;
use clap::Parser;
use docpipe::cli::Cli;
use docpipe::errors::Error;
use docpipe::signal::setup_signal_handler;
use docpipe::{Config, ConfigBuilder, Pipeline, Response};
use std::io::Write;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging. Default to 'info' if RUST_LOG is not set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if cfg!(debug_assertions) {
                    "docpipe=debug".parse().unwrap()
                } else {
                    "docpipe=info".parse().unwrap()
                },
            ),
        )
        .init();

    log::debug!("Starting docpipe v{}...", env!("CARGO_PKG_VERSION"));

    // --- Setup ---
    let args = Cli::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // Configuration failures (e.g. no GITHUB_TOKEN) are fatal before
            // any request is served.
            eprintln!("docpipe: {}", e);
            std::process::exit(2);
        }
    };
    let token = setup_signal_handler()?;

    let pipeline = match Pipeline::with_parts(
        &config,
        Arc::new(docpipe::cache::MemoryStore::new()),
        token,
    ) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("docpipe: {}", e);
            std::process::exit(2);
        }
    };

    // --- Execution ---
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(pipeline.fetch_str(&args.url));

    // --- Error Handling & Output ---
    match result {
        Ok(response) => write_response(&args, response),
        Err(Error::Interrupted) => {
            eprintln!("\nOperation cancelled.");
            std::process::exit(130);
        }
        Err(e) => {
            eprintln!("docpipe: {}", e);
            std::process::exit(1);
        }
    }
}

/// Builds the runtime configuration from the environment, then applies CLI
/// overrides.
///
/// GITHUB_TOKEN is required up front: failing fast here beats a confusing
/// 401 halfway through a render.
fn build_config(args: &Cli) -> docpipe::errors::Result<Config> {
    let base = Config::from_env()?;

    let mut builder = ConfigBuilder::new().github_token(base.github_token);
    if let Some(jsr_api) = base.jsr_api {
        builder = builder.jsr_api(jsr_api);
    }
    if let Some(local_repo) = base.local_repo {
        builder = builder.local_repo(local_repo);
    }
    // The CLI flag wins over the environment.
    if let Some(local_repo) = &args.local_repo {
        builder = builder.local_repo(local_repo.clone());
    }
    builder.build()
}

/// Writes the response to stdout or the requested output file.
fn write_response(args: &Cli, response: Response) -> Result<()> {
    if !response.ok() {
        eprintln!(
            "docpipe: '{}' answered with status {}",
            response.url(),
            response.status()
        );
    }
    let exit_ok = response.ok();

    if args.include_headers {
        println!("{}", response.status());
        for (name, value) in response.headers() {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        println!();
    }

    let body = response.bytes();
    match &args.output {
        Some(path) => {
            std::fs::write(path, &body)
                .map_err(|e| docpipe::errors::io_error_with_path(e, path))?;
            log::info!("wrote {} bytes to {}", body.len(), path.display());
        }
        None => {
            std::io::stdout().write_all(&body)?;
        }
    }

    if !exit_ok {
        std::process::exit(1);
    }
    Ok(())
}
