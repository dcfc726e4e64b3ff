//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::chart_svg::SvgChartAdapter;
use crate::adapters::console_report;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{theme_names, validate_config};
use crate::domain::error::AllocatorError;
pub use crate::domain::pipeline::parse_portfolio_value;
use crate::domain::pipeline::{
    AllocationConfig, DEFAULT_LOOKBACK_DAYS, DEFAULT_PORTFOLIO_VALUE, run_allocation,
};
use crate::domain::theme::{Theme, ThemeGroups, parse_tickers};
use crate::domain::volatility::TRADING_DAYS_PER_YEAR;
use crate::domain::weights::ConvictionMultipliers;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceSeriesProvider;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_EXPORT_PATH: &str = "portfolio_allocation.csv";

#[derive(Parser, Debug)]
#[command(name = "themealloc", about = "Inverse-volatility theme portfolio allocator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute an allocation and buy list
    Allocate {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of <TICKER>.csv price files (overrides [portfolio] data_dir)
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Portfolio value in dollars
        #[arg(long)]
        value: Option<String>,
        /// Apply the [conviction] multipliers
        #[arg(long)]
        conviction: bool,
        /// Prompt for portfolio value and conviction multipliers
        #[arg(short, long)]
        interactive: bool,
        /// Last date of the lookback window (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Write the allocation table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a pie chart of theme weights to this SVG file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Validate a theme configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Allocate {
            config,
            data,
            value,
            conviction,
            interactive,
            as_of,
            output,
            chart,
        } => run_allocate(AllocateArgs {
            config_path: config,
            data_dir: data,
            value,
            conviction,
            interactive,
            as_of,
            output,
            chart,
        }),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AllocatorError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_theme_groups(config: &dyn ConfigPort) -> Result<ThemeGroups, AllocatorError> {
    let themes = theme_names(config)
        .into_iter()
        .map(|name| {
            let raw = config.get_string("themes", &name).ok_or_else(|| {
                AllocatorError::ConfigMissing {
                    section: "themes".into(),
                    key: name.clone(),
                }
            })?;
            let tickers = parse_tickers(&name, &raw)?;
            Theme::new(name, tickers)
        })
        .collect::<Result<Vec<_>, _>>()?;
    ThemeGroups::new(themes)
}

/// Command-line value first, then `[portfolio] value`. Unusable input falls
/// back to the default with a notice.
pub fn resolve_portfolio_value(value_override: Option<&str>, config: &dyn ConfigPort) -> f64 {
    let raw = value_override
        .map(str::to_string)
        .or_else(|| config.get_string("portfolio", "value"));
    match raw {
        Some(raw) => parse_portfolio_value(&raw).unwrap_or_else(|| {
            eprintln!(
                "Invalid portfolio value {:?}, using default ${:.2}",
                raw, DEFAULT_PORTFOLIO_VALUE
            );
            DEFAULT_PORTFOLIO_VALUE
        }),
        None => DEFAULT_PORTFOLIO_VALUE,
    }
}

/// Reads `[conviction]` for each theme; missing entries stay at 1.0 and
/// invalid ones fall back to 1.0 with a notice.
pub fn build_conviction(config: &dyn ConfigPort, themes: &ThemeGroups) -> ConvictionMultipliers {
    let mut conviction = ConvictionMultipliers::new();
    for theme in themes.iter() {
        let Some(raw) = config.get_string("conviction", &theme.name) else {
            continue;
        };
        let value = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
        if conviction.set(theme.name.clone(), value).is_err() {
            eprintln!(
                "Invalid conviction multiplier {:?} for {}, using 1.0",
                raw, theme.name
            );
        }
    }
    for key in config.section_keys("conviction") {
        if themes.get(&key).is_none() {
            log::warn!("conviction multiplier for unknown theme {}", key);
        }
    }
    conviction
}

pub fn build_allocation_config(
    config: &dyn ConfigPort,
    themes: &ThemeGroups,
    value_override: Option<&str>,
    use_conviction: bool,
) -> AllocationConfig {
    let use_conviction = use_conviction || config.get_bool("portfolio", "use_conviction", false);
    AllocationConfig {
        portfolio_value: resolve_portfolio_value(value_override, config),
        conviction: use_conviction.then(|| build_conviction(config, themes)),
        lookback_days: config.get_int("portfolio", "lookback_days", DEFAULT_LOOKBACK_DAYS),
        periods_per_year: config.get_double(
            "portfolio",
            "periods_per_year",
            TRADING_DAYS_PER_YEAR,
        ),
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn prompt_yes_no<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    write!(out, "{question} (y/n): ")?;
    out.flush()?;
    Ok(read_answer(input)?.eq_ignore_ascii_case("y"))
}

pub fn prompt_portfolio_value<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<f64> {
    write!(out, "Enter portfolio value ($): ")?;
    out.flush()?;
    let answer = read_answer(input)?;
    Ok(match parse_portfolio_value(&answer) {
        Some(v) => v,
        None => {
            writeln!(
                out,
                "Using default portfolio value: ${:.2}",
                DEFAULT_PORTFOLIO_VALUE
            )?;
            DEFAULT_PORTFOLIO_VALUE
        }
    })
}

/// Asks whether to use conviction multipliers, then one value per theme.
/// Empty or invalid answers become 1.0.
pub fn prompt_conviction<R: BufRead, W: Write>(
    themes: &ThemeGroups,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<ConvictionMultipliers>> {
    if !prompt_yes_no("Do you want to use conviction multipliers?", input, out)? {
        return Ok(None);
    }
    let mut conviction = ConvictionMultipliers::new();
    for theme in themes.iter() {
        write!(
            out,
            "Enter conviction multiplier for {} (default: 1.0): ",
            theme.name
        )?;
        out.flush()?;
        let answer = read_answer(input)?;
        let value = if answer.is_empty() {
            1.0
        } else {
            answer.parse::<f64>().unwrap_or(1.0)
        };
        if conviction.set(theme.name.clone(), value).is_err() {
            writeln!(out, "Invalid multiplier for {}, using 1.0", theme.name)?;
            conviction.set(theme.name.clone(), 1.0).ok();
        }
    }
    Ok(Some(conviction))
}

pub struct PromptAnswers {
    pub portfolio_value: f64,
    pub conviction: Option<ConvictionMultipliers>,
    pub export: bool,
}

/// Runs the interactive prompts in order. The export question is only asked
/// when `ask_export` is set. Read or write failures abort the whole sequence.
pub fn prompt_run_parameters<R: BufRead, W: Write>(
    themes: &ThemeGroups,
    ask_export: bool,
    input: &mut R,
    out: &mut W,
) -> io::Result<PromptAnswers> {
    let portfolio_value = prompt_portfolio_value(input, out)?;
    let conviction = prompt_conviction(themes, input, out)?;
    let export = ask_export && prompt_yes_no("Export allocation to CSV?", input, out)?;
    Ok(PromptAnswers {
        portfolio_value,
        conviction,
        export,
    })
}

pub struct AllocateArgs {
    pub config_path: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub value: Option<String>,
    pub conviction: bool,
    pub interactive: bool,
    pub as_of: Option<NaiveDate>,
    pub output: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

fn run_allocate(args: AllocateArgs) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", args.config_path.display());
    let config = match load_config(&args.config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Theme groups
    let themes = match build_theme_groups(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Run parameters, optionally from prompts
    let mut alloc_config =
        build_allocation_config(&config, &themes, args.value.as_deref(), args.conviction);
    let mut output = args.output;
    if args.interactive {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut err = io::stderr();
        match prompt_run_parameters(&themes, output.is_none(), &mut input, &mut err) {
            Ok(answers) => {
                alloc_config.portfolio_value = answers.portfolio_value;
                alloc_config.conviction = answers.conviction;
                if answers.export {
                    output = Some(PathBuf::from(DEFAULT_EXPORT_PATH));
                }
            }
            Err(e) => {
                let e = AllocatorError::from(e);
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    let data_dir = args.data_dir.unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("portfolio", "data_dir")
                .unwrap_or_else(|| "data".to_string()),
        )
    });
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let provider = CsvPriceAdapter::new(data_dir);
    run_allocate_pipeline(
        &provider,
        &themes,
        &alloc_config,
        as_of,
        output.as_deref(),
        args.chart.as_deref(),
    )
}

/// Stages 4-6: fetch, allocate, present and export.
pub fn run_allocate_pipeline(
    provider: &dyn PriceSeriesProvider,
    themes: &ThemeGroups,
    alloc_config: &AllocationConfig,
    as_of: NaiveDate,
    output: Option<&Path>,
    chart: Option<&Path>,
) -> ExitCode {
    eprintln!(
        "Allocating ${:.2} across {} themes ({} tickers), {} days to {}",
        alloc_config.portfolio_value,
        themes.len(),
        themes.unique_tickers().len(),
        alloc_config.lookback_days,
        as_of
    );

    let report = match run_allocation(provider, themes, alloc_config, as_of) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: allocation failed: {e}");
            return (&e).into();
        }
    };

    if !report.dropped.is_empty() {
        eprintln!("\nDropped themes:");
        eprint!("{}", console_report::format_dropped(&report.dropped));
    }
    if !report.overwritten_tickers.is_empty() {
        eprintln!(
            "\nShared tickers keep the weight of their last theme: {}",
            report.overwritten_tickers.join(", ")
        );
    }

    println!("{}", console_report::format_report(&report));

    let sinks: [(Option<&Path>, &dyn ReportPort, &str); 2] = [
        (output, &CsvExportAdapter, "Allocation exported to"),
        (chart, &SvgChartAdapter, "Chart written to"),
    ];
    for (path, sink, message) in sinks {
        let Some(path) = path else {
            continue;
        };
        if let Err(e) = sink.write(&report, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("{} {}", message, path.display());
    }

    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let themes = match build_theme_groups(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nThemes (processing order):");
    for theme in themes.iter() {
        eprintln!("  {}: {}", theme.name, theme.tickers.join(", "));
    }

    let alloc_config = build_allocation_config(&config, &themes, None, false);
    eprintln!("\nPortfolio value:  ${:.2}", alloc_config.portfolio_value);
    eprintln!("Lookback:         {} days", alloc_config.lookback_days);
    eprintln!("Periods per year: {}", alloc_config.periods_per_year);
    if let Some(conviction) = &alloc_config.conviction {
        eprintln!("Conviction:");
        for theme in themes.iter() {
            eprintln!("  {}: {}", theme.name, conviction.get(&theme.name));
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn parse_portfolio_value_accepts_dollar_formats() {
        assert_eq!(parse_portfolio_value("23429"), Some(23429.0));
        assert_eq!(parse_portfolio_value(" $10,000.50 "), Some(10000.5));
        assert_eq!(parse_portfolio_value("abc"), None);
        assert_eq!(parse_portfolio_value("-100"), None);
        assert_eq!(parse_portfolio_value("0"), None);
        assert_eq!(parse_portfolio_value(""), None);
    }

    #[test]
    fn prompt_value_falls_back_to_default() {
        let mut out = Vec::new();
        let value = prompt_portfolio_value(&mut Cursor::new("lots\n"), &mut out).unwrap();
        assert_eq!(value, DEFAULT_PORTFOLIO_VALUE);
        assert!(String::from_utf8(out).unwrap().contains("Using default portfolio value"));
    }

    #[test]
    fn prompt_value_reads_number() {
        let mut out = Vec::new();
        let value = prompt_portfolio_value(&mut Cursor::new("50000\n"), &mut out).unwrap();
        assert_eq!(value, 50_000.0);
    }

    struct FailAfter {
        data: Cursor<Vec<u8>>,
    }

    impl io::Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::other("stdin closed"));
            }
            Ok(n)
        }
    }

    impl BufRead for FailAfter {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            if self.data.position() as usize >= self.data.get_ref().len() {
                return Err(io::Error::other("stdin closed"));
            }
            self.data.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.data.consume(amt)
        }
    }

    fn single_theme() -> ThemeGroups {
        ThemeGroups::new(vec![Theme::new("AI", vec!["NVDA".into()]).unwrap()]).unwrap()
    }

    #[test]
    fn prompt_sequence_reads_export_answer() {
        let mut out = Vec::new();
        let answers = prompt_run_parameters(
            &single_theme(),
            true,
            &mut Cursor::new("5000\nn\ny\n"),
            &mut out,
        )
        .unwrap();
        assert_eq!(answers.portfolio_value, 5000.0);
        assert!(answers.conviction.is_none());
        assert!(answers.export);
    }

    #[test]
    fn prompt_sequence_skips_export_question() {
        let mut out = Vec::new();
        let answers =
            prompt_run_parameters(&single_theme(), false, &mut Cursor::new("5000\nn\n"), &mut out)
                .unwrap();
        assert!(!answers.export);
        assert!(!String::from_utf8(out).unwrap().contains("Export"));
    }

    #[test]
    fn export_prompt_read_error_propagates() {
        let mut input = FailAfter {
            data: Cursor::new(b"5000\nn\n".to_vec()),
        };
        let mut out = Vec::new();
        let result = prompt_run_parameters(&single_theme(), true, &mut input, &mut out);
        assert!(result.is_err());
        assert!(String::from_utf8(out).unwrap().contains("Export allocation to CSV?"));
    }

    #[test]
    fn prompt_conviction_declined() {
        let themes =
            ThemeGroups::new(vec![Theme::new("AI", vec!["NVDA".into()]).unwrap()]).unwrap();
        let mut out = Vec::new();
        let result = prompt_conviction(&themes, &mut Cursor::new("n\n"), &mut out).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn prompt_conviction_defaults_invalid_and_empty_to_one() {
        let themes = ThemeGroups::new(vec![
            Theme::new("AI", vec!["NVDA".into()]).unwrap(),
            Theme::new("Gold", vec!["FNV".into()]).unwrap(),
            Theme::new("Index", vec!["DIA".into()]).unwrap(),
        ])
        .unwrap();
        let mut out = Vec::new();
        let conviction = prompt_conviction(&themes, &mut Cursor::new("Y\n2.5\n\n-3\n"), &mut out)
            .unwrap()
            .unwrap();

        assert_eq!(conviction.get("AI"), 2.5);
        assert_eq!(conviction.get("Gold"), 1.0);
        assert_eq!(conviction.get("Index"), 1.0);
        assert!(String::from_utf8(out).unwrap().contains("Invalid multiplier for Index"));
    }
}
