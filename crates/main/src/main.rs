use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use servicedesk_docs::config::{BuildOptions, DEFAULT_OUTPUT_PATH, OUTPUT_PATH_ENV};
use servicedesk_docs::fonts::FONTS_DIR_ENV;
use servicedesk_docs::{builder, content, inspect};

/// Generates the Service Desk reference manual as a PDF.
///
/// Text layout needs Liberation Sans (or Windows Arial) metrics. Point
/// `--fonts-dir` or `SERVICE_DESK_DOCS_FONTS_DIR` at them when they are not
/// installed in a standard location.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate the Service Desk documentation PDF",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the manual (the default when no subcommand is given).
    Build(BuildArgs),

    /// Print the page count, headings and outline of an existing PDF.
    Inspect {
        /// PDF file to read.
        path: PathBuf,
    },
}

#[derive(Args, Clone, Debug)]
struct BuildArgs {
    /// Where to write the PDF. The parent directory must already exist.
    #[arg(short, long, env = OUTPUT_PATH_ENV, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Directory holding the LiberationSans-*.ttf files.
    #[arg(long, env = FONTS_DIR_ENV)]
    fonts_dir: Option<PathBuf>,

    /// Embed an outline entry for every section.
    #[arg(long)]
    bookmarks: bool,
}

impl From<BuildArgs> for BuildOptions {
    fn from(args: BuildArgs) -> Self {
        BuildOptions::new()
            .with_output(args.output)
            .with_fonts_dir(args.fonts_dir)
            .with_bookmarks(args.bookmarks)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let result = run(cli, &mut stdout.lock());

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Some(Commands::Build(args)) => run_build(args.into(), out),
        Some(Commands::Inspect { path }) => run_inspect(path, out),
        None => run_build(cli.build.into(), out),
    }
}

fn run_build(options: BuildOptions, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    log::debug!("Build options: {:?}", options);
    builder::generate(&options)?;
    writeln!(out, "{}", options.confirmation_message())?;
    Ok(())
}

fn run_inspect(path: PathBuf, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let summary = inspect::summarize_file(&path)?;
    let headings = content::service_desk_manual().headings();

    writeln!(out, "{}: {} page(s)", path.display(), summary.page_count)?;
    for heading in &headings {
        let marker = if summary.contains_line(heading) {
            "ok"
        } else {
            "missing"
        };
        writeln!(out, "  [{}] {}", marker, heading)?;
    }
    writeln!(
        out,
        "  headings in order: {}",
        if summary.has_headings_in_order(&headings) {
            "yes"
        } else {
            "no"
        }
    )?;
    if !summary.outline.is_empty() {
        writeln!(out, "  outline: {}", summary.outline.join(" | "))?;
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
