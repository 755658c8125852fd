//! citeanchor CLI - citation resolution tool
//!
//! Resolves citations against pre-rendered page fragments stored as JSON.

use citeanchor::{
    normalize, parse_citation, Citation, FragmentProvider, HighlightSpan, HighlightStyle,
    MatchSource, ResolutionResult, ResolveOptions, Resolver, StaticPages,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Citation anchor resolution and highlighting
#[derive(Parser)]
#[command(
    name = "citeanchor",
    author = "iyulab",
    version,
    about = "Resolve citations onto rendered document pages",
    long_about = "citeanchor - Citation anchor resolution and highlighting.\n\n\
                  Locates literal, range and page-qualified citations in the\n\
                  rendered text fragments of a page.\n\n\
                  Usage:\n  \
                  citeanchor resolve <pages.json> <page> <citation>\n  \
                  citeanchor normalize <text>\n  \
                  citeanchor parse <citation> --page <page>"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log matcher stages and fallbacks to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a citation on one page
    Resolve {
        /// Pages JSON file ({"pages": {"<n>": [{"text", "box"}]}})
        pages: PathBuf,

        /// Page number (1-based)
        page: u32,

        /// Citation string
        citation: String,

        /// Matching preset
        #[arg(long, default_value = "default")]
        mode: MatchMode,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the normalized form of a text
    Normalize {
        /// Text to normalize
        text: String,
    },

    /// Show how a citation is parsed for a page
    Parse {
        /// Citation string
        citation: String,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show version information
    Version,
}

/// Matching preset
#[derive(Clone, ValueEnum)]
enum MatchMode {
    /// Every matcher stage and the token fallback
    Default,
    /// Exact stages only
    Strict,
    /// Wider fuzzy windows
    Lenient,
}

impl From<MatchMode> for ResolveOptions {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Default => ResolveOptions::default(),
            MatchMode::Strict => ResolveOptions::strict(),
            MatchMode::Lenient => ResolveOptions::lenient(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "citeanchor=debug" } else { "citeanchor=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Resolve {
            pages,
            page,
            citation,
            mode,
            json,
            compact,
            output,
        } => {
            let provider = StaticPages::from_path(&pages)?;
            provider.validate()?;
            let fragments = provider.page_fragments(page)?;

            let resolver = Resolver::new().with_options(mode.into());
            let result = resolver.resolve_fragments(page, &citation, &fragments);

            if json {
                let rendered = if compact {
                    serde_json::to_string(&result)?
                } else {
                    serde_json::to_string_pretty(&result)?
                };
                write_output(output.as_ref(), &rendered)?;
                return Ok(());
            }

            println!("{}", "Citation Resolution".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Page".bold(), page);
            println!("{}: {}", "Fragments".bold(), fragments.len());

            if result.is_empty() {
                println!("{} Citation not located on page {}", "!".yellow().bold(), page);
                return Ok(());
            }

            for (i, span) in result.highlights.iter().enumerate() {
                println!("\n{} {} ({})", "Span".bold(), i + 1, describe_span(span));
                for &source_index in &span.source_indices {
                    let text = fragments
                        .get(source_index)
                        .map(|f| f.text.as_str())
                        .unwrap_or_default();
                    println!("  {} [{}] {}", "✓".green(), source_index, text);
                }
            }
            if let Some(target) = scroll_source_index(&result) {
                println!("\n{}: [{}]", "Scroll target".bold(), target);
            }

            if let Some(path) = output {
                fs::write(&path, serde_json::to_string_pretty(&result)?)?;
                println!("{} Result written: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Normalize { text } => {
            write_output(None, &normalize(&text))?;
        }

        Commands::Parse { citation, page } => {
            let parsed = parse_citation(&citation, page);
            println!("{}", "Parsed Citation".cyan().bold());
            println!("{}", "─".repeat(40));
            match &parsed {
                Citation::Literal { text } => {
                    println!("{}: literal", "Kind".bold());
                    println!("{}: {}", "Text".bold(), text);
                }
                Citation::Range {
                    start_phrase,
                    end_phrase,
                } => {
                    println!("{}: range", "Kind".bold());
                    println!("{}: {}", "Start".bold(), start_phrase);
                    println!("{}: {}", "End".bold(), end_phrase);
                }
                Citation::PageQualified { segments } => {
                    println!("{}: page-qualified", "Kind".bold());
                    if segments.is_empty() {
                        println!("{} No segments for page {}", "!".yellow().bold(), page);
                    }
                    for segment in segments {
                        println!("  {} [page {}] {}", "✓".green(), segment.page, segment.text);
                    }
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Renderer index of the scroll target, numbered like the span listing.
fn scroll_source_index(result: &ResolutionResult) -> Option<usize> {
    let target = result.scroll_target?;
    result.highlights.iter().find_map(|span| {
        let position = span.fragment_indices.iter().position(|&index| index == target)?;
        span.source_indices.get(position).copied()
    })
}

fn describe_span(span: &HighlightSpan) -> String {
    let style = match span.style {
        HighlightStyle::Exact => "exact",
        HighlightStyle::Range => "range",
    };
    let source = match span.source {
        MatchSource::Stage(stage) => format!("{} stage", stage),
        MatchSource::RangePair => "range pair".to_string(),
        MatchSource::ParagraphFallback => "paragraph fallback".to_string(),
        MatchSource::TokenFallback => "token fallback".to_string(),
    };
    format!("{}, {}", style, source)
}

fn print_version() {
    println!("{} {}", "citeanchor".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Citation anchor resolution and highlighting");
    println!();
    println!("Citation forms: literal, [RANGE]...|||...[/RANGE], [page: N | ...]");
    println!("Repository: https://github.com/iyulab/citeanchor");
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
