use crate::{
    cli::{parse_axis, Cli, Command},
    config::MergeMode,
    report::Format,
};
use benchview_analysis::{ChartKind, PlotAxis, ValueChannel};
use clap::Parser;
use std::path::PathBuf;

#[test]
pub fn axis_spellings() {
    assert_eq!(parse_axis("arg1"), Ok(PlotAxis::argument(0)));
    assert_eq!(parse_axis("Argument 2"), Ok(PlotAxis::argument(1)));
    assert_eq!(parse_axis("a:3"), Ok(PlotAxis::argument(2)));
    assert_eq!(parse_axis("template1"), Ok(PlotAxis::template(0)));
    assert_eq!(parse_axis("t=2"), Ok(PlotAxis::template(1)));
    assert_eq!(parse_axis("none"), Ok(PlotAxis::EMPTY));
}

#[test]
pub fn invalid_axes() {
    assert!(parse_axis("arg0").is_err());
    assert!(parse_axis("argument").is_err());
    assert!(parse_axis("column1").is_err());
    assert!(parse_axis("arg1x").is_err());
}

#[test]
pub fn plot_command() {
    let cli = Cli::try_parse_from([
        "benchview",
        "-vv",
        "plot",
        "base.json",
        "run.json",
        "--mode",
        "overwrite",
        "--chart",
        "surface3d",
        "--x",
        "arg1",
        "--y",
        "cpu-time-median",
        "--z",
        "template1",
        "--format",
        "json",
        "--filter",
        "BM_Sort*",
    ])
    .unwrap();

    assert_eq!(cli.verbose, 2);
    let Command::Plot(args) = cli.command else {
        panic!("expected the plot command");
    };
    assert_eq!(
        args.sources.files,
        vec![PathBuf::from("base.json"), PathBuf::from("run.json")]
    );
    assert_eq!(args.sources.mode, MergeMode::Overwrite);
    assert_eq!(args.chart, Some(ChartKind::Surface3d));
    assert_eq!(args.x, Some(PlotAxis::argument(0)));
    assert_eq!(args.y, Some(ValueChannel::CpuTimeMedian));
    assert_eq!(args.z, Some(PlotAxis::template(0)));
    assert_eq!(args.format, Format::Json);
    assert_eq!(args.filter.as_deref(), Some("BM_Sort*"));
}

#[test]
pub fn sources_need_files_or_session() {
    assert!(Cli::try_parse_from(["benchview", "tree"]).is_err());
    assert!(Cli::try_parse_from(["benchview", "tree", "-s", "session.yaml", "a.json"]).is_err());

    let cli = Cli::try_parse_from(["benchview", "options", "--session", "session.yaml"]).unwrap();
    let Command::Options { sources, format } = cli.command else {
        panic!("expected the options command");
    };
    assert_eq!(sources.session, Some(PathBuf::from("session.yaml")));
    assert!(sources.files.is_empty());
    assert_eq!(sources.mode, MergeMode::Append);
    assert_eq!(format, Format::Yaml);
}
