use benchview_analysis::{plan_chart, AnalysisError};
use benchview_runner::{
    cli::{Cli, Command, PlotArgs, Sources},
    config::{ConfigErrors, SessionConfig},
    report::{self, OutputError, PlotRequest},
    session::{Session, SessionError},
};
use clap::Parser;
use std::{io, process::ExitCode};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error(transparent)]
    Plot(#[from] AnalysisError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<io::Error> for RunError {
    fn from(error: io::Error) -> Self {
        Self::Output(OutputError::Io(error))
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// open the files or the session named by `sources`
fn open(sources: &Sources) -> Result<(Session, Option<SessionConfig>), RunError> {
    if let Some(path) = sources.session.as_ref() {
        let config = SessionConfig::load(path)?;

        if config.preflight_checks() {
            return Err(ConfigErrors::Preflight.into());
        }

        return Ok((Session::from_config(&config)?, Some(config)));
    }

    let (first, others) = sources
        .files
        .split_first()
        .ok_or(SessionError::NotOpened)?;
    let mut session = Session::new();
    let mut rejected = session.open(first)?.len();

    for path in others {
        rejected += session.merge(path, sources.mode)?.len();
    }
    if rejected > 0 {
        info!(rejected = rejected, "Benchmarks with malformed names were left out");
    }

    Ok((session, None))
}

fn plot(args: PlotArgs) -> Result<(), RunError> {
    let (session, config) = open(&args.sources)?;
    let store = session.store().read();
    let indices = report::select(&store, args.filter.as_deref())?;

    let request = PlotRequest {
        chart: args.chart,
        x: args.x,
        y: args.y,
        z: args.z,
    };
    let defaults = config.as_ref().and_then(|config| config.plot.as_ref());
    let params = request.resolve(defaults, store.metadata())?;
    let plan = plan_chart(&store, &indices, &params)?;

    args.format.write(&mut io::stdout().lock(), &plan)?;

    Ok(())
}

fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Tree { sources, filter } => {
            let (session, _) = open(&sources)?;
            let store = session.store().read();
            let indices = report::select(&store, filter.as_deref())?;

            report::write_tree(&mut io::stdout().lock(), &store, &indices)?;
        }
        Command::Options { sources, format } => {
            let (session, _) = open(&sources)?;
            let store = session.store().read();

            format.write(&mut io::stdout().lock(), &report::options(&store))?;
        }
        Command::Plot(args) => plot(args)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = ?error, "{error}");

            ExitCode::FAILURE
        }
    }
}
