use std::{env, sync::Arc};

use clap::Parser;
use kdsgen::{
    config::{self, Config, DEFAULT_STREAM_NAME, URL_NOT_SET},
    run, sender,
    sender::HttpSender,
};
use rand::Rng;
use tokio::runtime::Builder;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Could not construct the HTTP sender: {0}")]
    Sender(#[from] sender::Error),
    #[error("Load generation failed: {0}")]
    Run(#[from] run::Error),
}

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// the stream every message is addressed to
    #[clap(short = 's', long, default_value_t = DEFAULT_STREAM_NAME.to_string())]
    stream_name: String,
    /// the ingest endpoint URL, required
    #[clap(short = 'u', long, default_value_t = URL_NOT_SET.to_string())]
    url: String,
    /// seed for random operations, drawn from the operating system if absent
    #[clap(long)]
    seed: Option<u64>,
}

fn get_config(cli: Cli) -> Result<Config, config::Error> {
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    Config::new(cli.stream_name, &cli.url, seed)
}

async fn inner_main(config: Config) -> Result<(), Error> {
    info!(
        target_uri = %config.target_uri,
        stream_name = %config.stream_name,
        seed = config.seed,
        producers = config.producers.get(),
        total_events = config.total_events,
        "starting load generation"
    );

    let sender = HttpSender::new(
        config.target_uri.clone(),
        usize::from(config.producers.get()),
    )?;
    let report = run::run(config, Arc::new(sender)).await?;

    info!(
        events = report.events,
        batches = report.batches,
        "load generation complete"
    );
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting kdsgen {version} run.");

    let config = get_config(Cli::parse()).inspect_err(|err| error!("{err}"))?;

    let runtime = Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let res = runtime.block_on(inner_main(config));
    if let Err(err) = &res {
        error!("{err}");
    }
    info!("Bye. :)");
    res
}
