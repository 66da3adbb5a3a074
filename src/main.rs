// In src/main.rs

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mandelbrot_threads::{
    bench::run_benchmark,
    config::Config,
    partition::Partition,
    view::View,
};

// Logging
use anyhow::{anyhow, Context};
use log::info;

fn cli() -> Command {
    Command::new("mandelbrot-threads")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders the Mandelbrot set serially and with a fixed pool of row workers")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("JSON config file; command-line flags override it"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(usize))
                .help("Number of worker threads, including the main thread (max 32)"),
        )
        .arg(
            Arg::new("view")
                .short('v')
                .long("view")
                .value_parser(value_parser!(u8).range(1..=2))
                .help("View preset: 1 = full set, 2 = zoomed"),
        )
        .arg(
            Arg::new("partition")
                .short('p')
                .long("partition")
                .value_parser(value_parser!(Partition))
                .help("Row assignment: interleaved or block"),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .value_parser(value_parser!(u32))
                .help("Maximum iterations per pixel"),
        )
        .arg(
            Arg::new("runs")
                .long("runs")
                .value_parser(value_parser!(usize))
                .help("Report the best of this many runs"),
        )
        .arg(
            Arg::new("no-verify")
                .long("no-verify")
                .action(ArgAction::SetTrue)
                .help("Skip comparing threaded output against serial output"),
        )
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.get_one::<std::path::PathBuf>("config") {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config.threads.count = threads;
    }
    if let Some(&index) = matches.get_one::<u8>("view") {
        config.view = View::from_index(index).ok_or_else(|| anyhow!("unknown view {}", index))?;
    }
    if let Some(&partition) = matches.get_one::<Partition>("partition") {
        config.threads.partition = partition;
    }
    if let Some(&iterations) = matches.get_one::<u32>("iterations") {
        config.max_iterations = iterations;
    }
    if let Some(&runs) = matches.get_one::<usize>("runs") {
        config.bench.runs = runs;
    }
    if matches.get_flag("no-verify") {
        config.bench.verify = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let matches = cli().get_matches();
    let config = build_config(&matches).context("Failed to build configuration")?;

    info!(
        "Rendering {}x{} ({:?} view, {} iterations) on {} threads, {} rows",
        config.image.width,
        config.image.height,
        config.view,
        config.max_iterations,
        config.threads.count,
        config.threads.partition
    );

    let report = run_benchmark(&config).context("Benchmark failed")?;

    println!(
        "[mandelbrot serial]:\t\t[{:.3}] ms",
        report.serial.as_secs_f64() * 1000.0
    );
    println!(
        "[mandelbrot thread]:\t\t[{:.3}] ms",
        report.threaded.as_secs_f64() * 1000.0
    );
    println!(
        "\t\t\t\t({:.2}x speedup from {} threads)",
        report.speedup(),
        report.num_threads
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        let matches = cli().try_get_matches_from(args.iter().copied())?;
        build_config(&matches)
    }

    #[test]
    fn no_flags_gives_defaults() {
        assert_eq!(parse(&["mandelbrot-threads"]).unwrap(), Config::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "mandelbrot-threads",
            "-t",
            "8",
            "-v",
            "2",
            "--partition",
            "block",
            "--iterations",
            "512",
            "--runs",
            "3",
            "--no-verify",
        ])
        .unwrap();
        assert_eq!(config.threads.count, 8);
        assert_eq!(config.view, View::Zoomed);
        assert_eq!(config.threads.partition, Partition::Block);
        assert_eq!(config.max_iterations, 512);
        assert_eq!(config.bench.runs, 3);
        assert!(!config.bench.verify);
    }

    #[test]
    fn too_many_threads_is_rejected() {
        assert!(parse(&["mandelbrot-threads", "-t", "33"]).is_err());
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert!(parse(&["mandelbrot-threads", "-v", "3"]).is_err());
    }
}
