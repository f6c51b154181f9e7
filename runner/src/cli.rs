//! Command-line interface definitions for benchview.

use crate::{config::MergeMode, report::Format};
use benchview_analysis::{ChartKind, PlotAxis, ValueChannel};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect Google Benchmark results and prepare chart data.
#[derive(Parser, Debug)]
#[command(name = "benchview", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Raise the log level, once for debug and twice for trace. Overrides RUST_LOG.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the benchmark tree: families, containers and records.
    Tree {
        #[command(flatten)]
        sources: Sources,

        /// Only keep benchmarks whose full name matches this glob.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the chart types, axes and values the results support.
    Options {
        #[command(flatten)]
        sources: Sources,

        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Print the grouped data of one chart.
    Plot(PlotArgs),
}

/// Where results are loaded from.
#[derive(Args, Debug)]
pub struct Sources {
    /// Results files. The first one is opened and the others merged into it.
    #[arg(required_unless_present = "session")]
    pub files: Vec<PathBuf>,

    /// Session file naming the origin and the merges instead of `files`.
    #[arg(long, short = 's', conflicts_with = "files")]
    pub session: Option<PathBuf>,

    /// How files after the first one are merged.
    #[arg(long, value_enum, default_value_t = MergeMode::Append)]
    pub mode: MergeMode,
}

/// Arguments for the `plot` subcommand.
#[derive(Args, Debug)]
pub struct PlotArgs {
    #[command(flatten)]
    pub sources: Sources,

    /// Chart type, defaults to the session plot or the first available one.
    #[arg(long, value_enum)]
    pub chart: Option<ChartKind>,

    /// X axis, e.g. `arg1` or `template2`.
    #[arg(long, value_parser = parse_axis)]
    pub x: Option<PlotAxis>,

    /// Plotted value.
    #[arg(long, value_enum)]
    pub y: Option<ValueChannel>,

    /// Z axis of 3-D charts, e.g. `template1`.
    #[arg(long, value_parser = parse_axis)]
    pub z: Option<PlotAxis>,

    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Only keep benchmarks whose full name matches this glob.
    #[arg(long)]
    pub filter: Option<String>,
}

/// Parse `argN`/`argumentN`/`tN`/`templateN` (1-based, optional `:` or `=`) or `none`
pub fn parse_axis(value: &str) -> Result<PlotAxis, String> {
    let value = value.trim().to_lowercase();

    if value.is_empty() || value == "none" {
        return Ok(PlotAxis::EMPTY);
    }

    let split = value
        .find(|character: char| character.is_ascii_digit())
        .ok_or_else(|| format!("'{value}' has no axis number"))?;
    let (kind, number) = value.split_at(split);
    let kind = kind.trim_end_matches(&[':', '=', ' '][..]);

    let number = number
        .parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| format!("'{number}' is not an axis number, they start at 1"))?;

    match kind {
        "a" | "arg" | "argument" => Ok(PlotAxis::argument(number - 1)),
        "t" | "tpl" | "template" => Ok(PlotAxis::template(number - 1)),
        other => Err(format!(
            "unknown axis kind '{other}', expected 'arg' or 'template'"
        )),
    }
}

#[cfg(test)]
mod cli_test;
