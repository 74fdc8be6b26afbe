//! unexam CLI - exam problem extraction tool

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unexam::{
    CleanupPreset, DocumentRules, ExtractionReport, ExtractionStats, JsonLayout, OutputOptions,
    PageSelection, Pipeline, PipelineConfig, SourceKind,
};

#[derive(Parser)]
#[command(name = "unexam")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract exam problems from LaTeX and PDF to CSV and JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract problems from one source
    Extract {
        /// Input LaTeX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output base name (defaults to the input file stem)
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Extract problems from several sources, one output pair each
    Batch {
        /// Input LaTeX or PDF files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Re-normalize a previously written CSV or JSON file and rewrite the pair
    Fix {
        /// Input .csv or .json file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Rule file (TOML); supplies math delimiters and topic keywords
        #[arg(short, long, value_name = "TOML", env = "UNEXAM_RULES")]
        rules: Option<PathBuf>,

        /// Question cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// JSON layout: "array" or "keyed:<key>"
        #[arg(long, default_value = "array")]
        layout: String,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show spans and option counts without writing anything
    Inspect {
        /// Input LaTeX or PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Rule file (TOML)
        #[arg(short, long, value_name = "TOML", env = "UNEXAM_RULES")]
        rules: Option<PathBuf>,

        /// Source kind (detected when omitted)
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Print spans as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Options shared by `extract` and `batch`.
#[derive(Args)]
struct CommonArgs {
    /// Rule file (TOML)
    #[arg(short, long, value_name = "TOML", env = "UNEXAM_RULES")]
    rules: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Source kind (detected when omitted)
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Skip PDF pages whose text cannot be extracted
    #[arg(long)]
    lenient: bool,

    /// Question cleanup preset
    #[arg(long, value_enum)]
    cleanup: Option<CleanupLevel>,

    /// JSON layout: "array" or "keyed:<key>"
    #[arg(long, default_value = "array")]
    layout: String,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization and whitespace only)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (for PDF text layers)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// LaTeX file with \begin{document} ... \end{document}
    Latex,
    /// PDF file with a text layer
    Pdf,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Latex => SourceKind::LatexFile,
            KindArg::Pdf => SourceKind::Pdf,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            name,
            common,
        } => cmd_extract(&input, name, &common),
        Commands::Batch { inputs, common } => cmd_batch(&inputs, &common),
        Commands::Fix {
            input,
            output,
            rules,
            cleanup,
            layout,
            compact,
        } => cmd_fix(
            &input,
            output.as_deref(),
            rules.as_deref(),
            cleanup,
            &layout,
            compact,
        ),
        Commands::Inspect {
            input,
            rules,
            kind,
            pages,
            json,
        } => cmd_inspect(&input, rules.as_deref(), kind, pages.as_deref(), json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_rules(path: Option<&Path>) -> Result<DocumentRules, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => DocumentRules::from_file(path)?,
        None => DocumentRules::default(),
    })
}

fn parse_pages(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    Ok(match pages {
        Some(p) => p.parse::<PageSelection>()?,
        None => PageSelection::All,
    })
}

fn output_options(layout: &str, compact: bool) -> Result<OutputOptions, Box<dyn std::error::Error>> {
    let mut options = OutputOptions::new().with_json_layout(JsonLayout::parse(layout)?);
    if compact {
        options = options.compact();
    }
    Ok(options)
}

fn build_config(
    input: &Path,
    common: &CommonArgs,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let rules = load_rules(common.rules.as_deref())?;
    if rules.problems.is_empty() {
        log::warn!("Rule table is empty; no problems will be extracted");
    }

    let mut config = PipelineConfig::new(input)
        .with_rules(rules)
        .with_output_dir(&common.output)
        .with_pages(parse_pages(common.pages.as_deref())?)
        .with_output(output_options(&common.layout, common.compact)?);

    if let Some(kind) = common.kind {
        config = config.with_source_kind(kind.into());
    }
    if let Some(level) = common.cleanup {
        config = config.with_cleanup(level.into());
    }
    if common.lenient {
        config = config.lenient();
    }
    Ok(config)
}

fn cmd_extract(
    input: &Path,
    name: Option<String>,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = build_config(input, common)?;
    if let Some(name) = name {
        config = config.with_output_name(name);
    }

    let report = Pipeline::new(config)?.run()?;
    print_report(&report);
    print_stats(&report.stats());

    Ok(())
}

fn cmd_batch(inputs: &[PathBuf], common: &CommonArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Rules and output settings are shared; each input gets its own name
    let pipeline = Pipeline::new(build_config(Path::new(""), common)?)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let outcomes = pipeline.run_batch_with(inputs, |outcome| {
        pb.set_message(outcome.path.display().to_string());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let mut total = ExtractionStats::new();
    let mut failed = 0;
    println!();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                println!(
                    "{} {} ({} problems, {} warnings)",
                    "OK".green().bold(),
                    outcome.path.display(),
                    report.set.len(),
                    report.warnings.len()
                );
                total.merge(&report.stats());
            }
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", "FAIL".red().bold(), outcome.path.display(), e);
            }
        }
    }

    print_stats(&total);

    if failed > 0 {
        return Err(format!("{} of {} documents failed", failed, outcomes.len()).into());
    }
    Ok(())
}

fn cmd_fix(
    input: &Path,
    output: Option<&Path>,
    rules: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    layout: &str,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::new(input)
        .with_rules(load_rules(rules)?)
        .with_output(output_options(layout, compact)?);
    if let Some(level) = cleanup {
        config = config.with_cleanup(level.into());
    }

    let output_dir = output
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let report = Pipeline::new(config)?.refresh_file(input, &output_dir)?;
    print_report(&report);

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    rules: Option<&Path>,
    kind: Option<KindArg>,
    pages: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::new(input)
        .with_rules(load_rules(rules)?)
        .with_pages(parse_pages(pages)?)
        .lenient();
    if let Some(kind) = kind {
        config = config.with_source_kind(kind.into());
    }

    let pipeline = Pipeline::new(config)?;
    let doc = pipeline.load()?;
    let (spans, warnings) = pipeline.inspect(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&spans)?);
        return Ok(());
    }

    println!("{}", "Source".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Kind".bold(), doc.kind());
    println!("{}: {} bytes", "Body".bold(), doc.body().len());

    println!();
    println!("{}", "Spans".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for span in &spans {
        let count = if span.option_count == 5 {
            span.option_count.to_string().green()
        } else if span.option_count == 0 {
            span.option_count.to_string().dimmed()
        } else {
            span.option_count.to_string().yellow()
        };
        println!(
            "{:>4}  {:>7}..{:<7} {:<8} options: {}",
            span.index.bold(),
            span.start_offset,
            span.end_offset,
            span.boundary,
            count
        );
    }

    for warning in &warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    Ok(())
}

fn print_report(report: &ExtractionReport) {
    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    if let Some(written) = &report.written {
        println!("\n{}", "Output files:".green().bold());
        println!("  {} {}", "├─".dimmed(), written.csv.display());
        println!("  {} {}", "└─".dimmed(), written.json.display());
    }
}

fn print_stats(stats: &ExtractionStats) {
    println!();
    println!("{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Documents".bold(), stats.document_count);
    println!("{}: {}", "Problems".bold(), stats.problem_count);
    println!("{}: {}", "Multiple choice".bold(), stats.multiple_choice_count);
    println!("{}: {}", "Short answer".bold(), stats.short_answer_count);
    println!("{}: {}", "Complete".bold(), stats.complete_count);
    println!("{}: {}", "Needs review".bold(), stats.review_count);
    println!("{}: {}", "Missing".bold(), stats.missing_count);
}

fn cmd_version() {
    println!("{} {}", "unexam".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam problem extraction tool");
    println!();
    println!("License: MIT");
}
