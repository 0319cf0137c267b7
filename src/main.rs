// src/main.rs

use clap::Parser;
use cmis_objects::config::{CommandLineInput, Target};
use cmis_objects::{AppError, ClientConfig, FixtureRepository, RepositoryClient};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target as ConsoleTarget},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use serde::Serialize;
use std::sync::Arc;

/// Sets up logging configuration. Logs go to stderr so stdout stays JSON.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(ConsoleTarget::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .build(Root::builder().appender("stderr").build(log_level))?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized");
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String, AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.map_err(|e| AppError::InternalError {
        message: "failed to serialize output".to_string(),
        source: Some(Box::new(e)),
    })
}

/// Loads the fixture, runs the requested retrieval and prints it as JSON.
async fn execute(cli: &CommandLineInput) -> Result<(), AppError> {
    let config = ClientConfig::resolve(cli)?;
    let target = cli.target()?;

    let repository = Arc::new(FixtureRepository::load(&cli.fixture).await?);
    log::info!("Fixture holds {} type definitions", repository.type_count());
    let client = RepositoryClient::new(repository.clone(), repository.clone(), config);

    let output = match target {
        Target::Object(path) => {
            let (_, completion) = client.object(path);
            render(&delivered(completion.await)?, cli.pretty)?
        }
        Target::Children { folder, listing } => {
            let (_, completion) = client.children(folder, listing);
            render(&delivered(completion.await)?, cli.pretty)?
        }
        Target::AllChildren(folder) => {
            let (_, completion) = client.all_children(folder);
            render(&delivered(completion.await)?, cli.pretty)?
        }
    };

    println!("{}", output);
    log::info!(
        "Done ({} type definition fetches)",
        repository.type_fetch_count()
    );
    Ok(())
}

/// Nothing here cancels, so a missing result means the request task died.
fn delivered<T>(outcome: Option<Result<T, AppError>>) -> Result<T, AppError> {
    outcome.unwrap_or_else(|| {
        Err(AppError::InternalError {
            message: "request finished without delivering a result".to_string(),
            source: None,
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    if let Err(e) = execute(&cli).await {
        log::error!("{} failure: {}", e.stage(), e);
        return Err(e.into());
    }

    Ok(())
}
