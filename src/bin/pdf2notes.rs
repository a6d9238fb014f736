//! CLI binary for pdf2notes.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2notes::{
    convert, inspect, ConversionConfig, ConversionProgressCallback, PageSelection,
    ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar tick per elaborated unit, with a log
/// line per unit above the bar.
struct CliProgressCallback {
    bar: ProgressBar,
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos:>3}/{len} units  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Elaborating");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            fallbacks: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_units: usize) {
        self.bar.set_length(total_units as u64);
    }

    fn on_unit_start(&self, unit_num: usize, _total: usize) {
        self.bar.set_message(format!("unit {unit_num}"));
    }

    fn on_unit_complete(&self, unit_num: usize, total: usize, markup_len: usize) {
        self.bar.println(format!(
            "  {} Unit {:>3}/{:<3}  {}",
            green("✓"),
            unit_num,
            total,
            dim(&format!("{markup_len:>5} chars of markup")),
        ));
        self.bar.inc(1);
    }

    fn on_unit_fallback(&self, unit_num: usize, total: usize, reason: &str) {
        self.fallbacks.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if reason.len() > 80 {
            format!("{}…", &reason[..79])
        } else {
            reason.to_string()
        };

        self.bar.println(format!(
            "  {} Unit {:>3}/{:<3}  {}",
            yellow("⚠"),
            unit_num,
            total,
            yellow(&format!("raw text used — {msg}")),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_units: usize, elaborated_count: usize) {
        self.bar.finish_and_clear();
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        if fallbacks == 0 {
            eprintln!(
                "{} {} units elaborated",
                green("✔"),
                bold(&elaborated_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} units elaborated  ({} rendered from raw text)",
                yellow("⚠"),
                bold(&elaborated_count.to_string()),
                total_units,
                yellow(&fallbacks.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion
  pdf2notes slides.pdf

  # Choose the output path
  pdf2notes slides.pdf -o notes.pdf

  # Specific pages with a specific model
  pdf2notes --pages 1-5 --model gpt-4.1 --provider openai slides.pdf

  # Inspect PDF metadata (no API key needed)
  pdf2notes --inspect-only slides.pdf

  # JSON stats on stdout
  pdf2notes --json slides.pdf -o notes.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key

SETUP:
  1. Set an API key:  export OPENAI_API_KEY=sk-...
  2. Convert:         pdf2notes slides.pdf -o notes.pdf

  Units whose elaboration call fails are rendered from the original page
  text, so a flaky connection degrades the output instead of aborting it.
"#;

/// Restructure PDF documents into styled, elaborated study notes using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2notes",
    version,
    about = "Restructure PDF documents into styled, elaborated study notes using LLMs",
    long_about = "Extract each page's text, elaborate it with a text-generation model into a \
structured outline (titles, subheadings, bullets, examples), and typeset the result as a \
styled landscape PDF. Supports OpenAI, Anthropic, Google Gemini, and any OpenAI-compatible \
endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local path to the source PDF.
    input: PathBuf,

    /// Write the styled notes PDF here. Default: "<input stem>_notes.pdf".
    #[arg(short, long, env = "PDF2NOTES_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "PDF2NOTES_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    /// Auto-detected from API key env vars if not set.
    #[arg(long, env = "PDF2NOTES_PROVIDER")]
    provider: Option<String>,

    /// Source page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2NOTES_PAGES", default_value = "all")]
    pages: String,

    /// Page margin in points.
    #[arg(long, env = "PDF2NOTES_MARGIN", default_value_t = 45.0)]
    margin: f64,

    /// Document title stamped into the output PDF metadata.
    #[arg(long, env = "PDF2NOTES_TITLE")]
    title: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2NOTES_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per unit.
    #[arg(long, env = "PDF2NOTES_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2NOTES_TEMPERATURE", default_value_t = 0.4)]
    temperature: f32,

    /// Retries per unit on LLM failure (then the unit falls back to raw text).
    #[arg(long, env = "PDF2NOTES_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Output run statistics as JSON on stdout.
    #[arg(long, env = "PDF2NOTES_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2NOTES_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2NOTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2NOTES_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = cli.input.to_string_lossy().to_string();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", input);
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&input, &output_path, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output.stats)
            .context("Failed to serialise stats")?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} units → {} pages  {}ms  →  {}",
            if output.stats.fallback_units == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            output.units.len(),
            output.stats.physical_pages,
            output.stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// "<input stem>_notes.pdf" next to the input file.
fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_notes.pdf"))
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let pages = parse_pages(&cli.pages)?;

    let mut builder = ConversionConfig::builder()
        .margin(cli.margin)
        .pages(pages)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let mut config = builder.build().context("Invalid configuration")?;

    // Apply fields the builder doesn't have setters for (or that need special handling)
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.title = cli.title.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        for &p in &pages {
            if p < 1 {
                anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
            }
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
