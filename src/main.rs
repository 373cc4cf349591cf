use std::process::ExitCode;

use crypto_tally::cli::{parse_args, usage, CliAdapter};
use crypto_tally::prettyprint::PrettyFormatter;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

#[tokio::main]
async fn main() -> ExitCode {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}\n\n{}", usage());
            return ExitCode::FAILURE;
        }
    };

    setup_tracing(command.verbosity());
    setup_panic_hook();

    info!("Starting crypto-tally");

    match CliAdapter::new().handle(command).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(report) => {
            error!("❌ {report:?}");
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    Registry::default()
        .with(
            // Library and binary share the `crypto_tally` target
            tracing_subscriber::filter::Targets::new().with_target("crypto_tally", level),
        )
        .with(stderr_layer)
        .init();
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
