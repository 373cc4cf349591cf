use std::path::PathBuf;

use error_stack::ResultExt;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::instrument;

use super::service_factory::TallyServiceFactory;
use crate::{
    config::{app_config::AppConfig, exchange_config::ExchangeKind},
    domain::selector::OverrideSelector,
    report::{render_sources, render_tsv, render_valuation, summary_line},
};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyArgs {
    pub selector: OverrideSelector,
    pub config_path: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub verbosity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tally(TallyArgs),
    Help,
}

impl Command {
    pub fn verbosity(&self) -> u8 {
        match self {
            Command::Tally(args) => args.verbosity,
            Command::Help => 0,
        }
    }
}

pub fn usage() -> String {
    let kinds: Vec<String> = ExchangeKind::iter().map(|kind| kind.to_string()).collect();
    format!(
        "Query and aggregate account balances from multiple cryptocurrency exchanges.\n\
         \n\
         Usage:\n\
         \x20 crypto-tally [OPTIONS]             Use the cache for all exchanges.\n\
         \x20 crypto-tally [OPTIONS] polo,trex   Ignore the cache for specific exchanges.\n\
         \x20 crypto-tally [OPTIONS] all         Ignore the cache entirely.\n\
         \n\
         Options:\n\
         \x20 --config <PATH>       Config file (default: $CONFIG_PATH or ./Config.*)\n\
         \x20 --cache-file <PATH>   Cache file, overrides `cache_file` from the config\n\
         \x20 -v, --verbose         More logging, repeat for more (-vv, -vvv)\n\
         \x20 -h, --help            Print this help\n\
         \n\
         Exchange codes are matched exactly against `short_code` or `name`.\n\
         Supported exchange kinds: {}\n",
        kinds.join(", ")
    )
}

/// Parses the arguments that follow the program name.
pub fn parse_args<I, S>(args: I) -> Result<Command, CommandError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tally = TallyArgs::default();
    let mut selector: Option<String> = None;
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => tally.config_path = Some(flag_value(&arg, args.next())?),
            "--cache-file" => tally.cache_file = Some(flag_value(&arg, args.next())?.into()),
            "--verbose" => tally.verbosity = tally.verbosity.saturating_add(1),
            flag if flag.len() > 1 && flag.starts_with('-') && flag[1..].chars().all(|c| c == 'v') => {
                let count = u8::try_from(flag.len() - 1).unwrap_or(u8::MAX);
                tally.verbosity = tally.verbosity.saturating_add(count);
            }
            flag if flag.starts_with('-') => {
                return Err(CommandError::InvalidCommand {
                    details: format!("unknown option '{flag}'"),
                })
            }
            _ if selector.is_some() => {
                return Err(CommandError::InvalidCommand {
                    details: format!("unexpected extra argument '{arg}'"),
                })
            }
            _ => selector = Some(arg),
        }
    }

    tally.selector =
        OverrideSelector::parse(selector.as_deref()).map_err(|e| CommandError::InvalidCommand {
            details: e.to_string(),
        })?;

    Ok(Command::Tally(tally))
}

fn flag_value(flag: &str, value: Option<String>) -> Result<String, CommandError> {
    value
        .filter(|value| !value.starts_with('-'))
        .ok_or_else(|| CommandError::InvalidCommand {
            details: format!("{flag} needs a value"),
        })
}

#[derive(Debug, Default)]
pub struct CliAdapter;

impl CliAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Runs a parsed command and returns what should go to stdout.
    #[instrument(skip(self))]
    pub async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::Help => Ok(usage()),
            Command::Tally(args) => self.tally(args).await,
        }
    }

    async fn tally(&self, args: TallyArgs) -> error_stack::Result<String, CommandError> {
        let config_path = args.config_path.unwrap_or_else(AppConfig::default_path);
        let config = AppConfig::load(&config_path).change_context_lazy(|| {
            CommandError::ExecutionFailed {
                details: format!("could not load configuration from '{config_path}'"),
            }
        })?;

        let service = TallyServiceFactory::create(&config, args.cache_file).change_context(
            CommandError::ExecutionFailed {
                details: "could not set up exchanges".to_string(),
            },
        )?;

        let run = service.run(&args.selector).await;

        tracing::info!("Balance sources:\n{}", render_sources(&run.outcome));
        for failure in &run.outcome.failures {
            tracing::warn!(
                "⚠️  {} ({}) could not be fetched this run",
                failure.name,
                failure.short_code
            );
        }
        if !run.cache_persisted {
            tracing::warn!("⚠️  Balances were not saved to the cache");
        }

        let mut output = format!(
            "{}\n{}\n",
            render_tsv(&run.outcome.table),
            summary_line(&run.outcome.table)
        );
        if let Some(valuation) = &run.valuation {
            output.push('\n');
            output.push_str(&render_valuation(valuation));
        }
        Ok(output)
    }
}
