// crates/figma-cache-cli/src/main.rs
// ============================================================================
// Module: Figma Cache CLI Entry Point
// Description: Command-line surface for caching design nodes locally.
// Purpose: Resolve configuration, pick a run mode, and report progress.
// Dependencies: clap, dotenvy, figma-cache, thiserror.
// ============================================================================

//! ## Overview
//! `figma-cache` reads the URL listing and caches node metadata plus a 2x
//! render for every entry, one entry selected by slug or index, or a single
//! URL given on the command line. `--list` prints the listing without
//! touching the network. All user-facing strings go through the i18n catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use figma_cache::CacheEvent;
use figma_cache::CacheEvents;
use figma_cache::CachePipeline;
use figma_cache::CacheStore;
use figma_cache::FigmaCacheConfig;
use figma_cache::FigmaClient;
use figma_cache::JsonLinesEvents;
use figma_cache::PipelineStep;
use figma_cache::RefreshReason;
use figma_cache::UrlEntry;
use figma_cache::UrlListing;
use figma_cache::load_urls_file;
use figma_cache::run_batch;
use figma_cache_cli::i18n::Locale;
use figma_cache_cli::i18n::set_locale;
use figma_cache_cli::t;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the API token.
const TOKEN_ENV: &str = "FIGMA_TOKEN";
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "FIGMA_CACHE_LANG";
/// Label used for ad-hoc URLs without `--label`.
const ADHOC_LABEL: &str = "custom";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "figma-cache", disable_version_flag = true)]
struct Cli {
    /// Slug or zero-based index of a single listing entry to cache.
    #[arg(value_name = "IDENTIFIER", conflicts_with_all = ["list", "url"])]
    identifier: Option<String>,
    /// Refresh entries even when the cached version is current.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
    /// Print the listing grouped by section and exit.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "url")]
    list: bool,
    /// Cache one design URL instead of the listing.
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Label for `--url` (defaults to `custom`).
    #[arg(long, value_name = "LABEL", requires = "url")]
    label: Option<String>,
    /// Section recorded for `--url`.
    #[arg(long, value_name = "SECTION", requires = "url")]
    section: Option<String>,
    /// Platform recorded for `--url`.
    #[arg(long, value_name = "PLATFORM", requires = "url")]
    platform: Option<String>,
    /// Listing file (overrides `urls_file` from config).
    #[arg(long, value_name = "PATH")]
    urls_file: Option<PathBuf>,
    /// Cache root directory (overrides `cache_dir` from config).
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,
    /// Config file path (overrides `FIGMA_CACHE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Worker count for batch runs (overrides `jobs` from config).
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
    /// Emit cache events as JSON lines on stdout.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Preferred output language (overrides `FIGMA_CACHE_LANG`).
    #[arg(long, value_enum, value_name = "LANG")]
    lang: Option<LangArg>,
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
}

/// CLI language selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Hebrew.
    He,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::He => Self::He,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Resolves configuration and dispatches to the selected mode.
fn run() -> CliResult<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = resolve_config(&cli)?;
    if cli.list {
        return command_list(&config);
    }

    let token = resolve_token()?;
    let events: Arc<dyn CacheEvents> = if cli.json {
        Arc::new(JsonLinesEvents::new(std::io::stdout()))
    } else {
        Arc::new(ConsoleEvents)
    };
    let client = FigmaClient::new(config.api_config(token))
        .map_err(|err| CliError::new(t!("client.init_failed", error = err)))?
        .with_events(Arc::clone(&events));
    let store = CacheStore::new(&config.cache_dir);
    let pipeline = CachePipeline::new(&client, &store, events.as_ref());
    let output = Output {
        json: cli.json,
    };

    if let Some(url) = cli.url {
        let label = cli.label.unwrap_or_else(|| ADHOC_LABEL.to_string());
        let entry = UrlEntry::resolve(label, url.clone(), cli.section, cli.platform)
            .map_err(|err| CliError::new(t!("adhoc.invalid_url", url = url, error = err)))?;
        return cache_one(&pipeline, output, &entry, cli.force);
    }

    let listing = load_listing(&config)?;
    output.status(&t!("listing.found", count = listing.len(), path = config.urls_file))?;
    listing.report(events.as_ref());
    match cli.identifier {
        Some(identifier) => command_single(&pipeline, output, &listing, &identifier, cli.force),
        None => {
            let _summary = run_batch(&listing, &pipeline, config.batch_options(cli.force));
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Loads config and applies command-line overrides.
fn resolve_config(cli: &Cli) -> CliResult<FigmaCacheConfig> {
    let mut config = FigmaCacheConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    if let Some(path) = &cli.urls_file {
        config.urls_file = path.to_string_lossy().into_owned();
    }
    if let Some(path) = &cli.cache_dir {
        config.cache_dir = path.to_string_lossy().into_owned();
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    config.validate().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    Ok(config)
}

/// Reads the API token from the environment.
fn resolve_token() -> CliResult<String> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(CliError::new(format!("{}\n{}", t!("token.missing"), t!("token.hint")))),
    }
}

/// Loads the URL listing named by the config.
fn load_listing(config: &FigmaCacheConfig) -> CliResult<UrlListing> {
    load_urls_file(Path::new(&config.urls_file))
        .map_err(|err| CliError::new(t!("listing.load_failed", error = err)))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Prints the listing grouped by section.
fn command_list(config: &FigmaCacheConfig) -> CliResult<ExitCode> {
    let listing = load_listing(config)?;
    listing.report(&ConsoleEvents);

    let mut order: Vec<Option<&str>> = Vec::new();
    let mut groups: BTreeMap<Option<&str>, Vec<(usize, &UrlEntry)>> = BTreeMap::new();
    for (index, entry) in listing.entries().enumerate() {
        let section = entry.section.as_deref();
        if !groups.contains_key(&section) {
            order.push(section);
        }
        groups.entry(section).or_default().push((index, entry));
    }

    let mut lines = vec![t!("list.header")];
    for section in order {
        lines.push(String::new());
        let heading = section.map_or_else(|| t!("list.section.none"), str::to_string);
        lines.push(t!("list.section", section = heading));
        for (index, entry) in groups.get(&section).map(Vec::as_slice).unwrap_or_default() {
            let platform = entry.platform.clone().unwrap_or_else(|| t!("list.platform.none"));
            lines.push(t!("list.entry", index = index, platform = platform, label = entry.label));
            lines.push(t!("list.entry.url", url = entry.url));
            lines.push(t!("list.entry.slug", slug = entry.slug));
        }
    }
    lines.push(String::new());
    lines.push(t!("list.total", count = listing.len()));
    write_stdout_line(&lines.join("\n"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Caches the entry matching `identifier`.
fn command_single(
    pipeline: &CachePipeline<'_>,
    output: Output,
    listing: &UrlListing,
    identifier: &str,
    force: bool,
) -> CliResult<ExitCode> {
    let Some(entry) = listing.find(identifier) else {
        let mut lines = vec![t!("entry.not_found", identifier = identifier)];
        lines.push(t!("entry.available.header"));
        for (index, entry) in listing.entries().enumerate() {
            lines.push(t!("entry.available.item", index = index, slug = entry.slug));
        }
        return Err(CliError::new(lines.join("\n")));
    };
    cache_one(pipeline, output, entry, force)
}

/// Runs the pipeline for one entry and reports the outcome.
fn cache_one(
    pipeline: &CachePipeline<'_>,
    output: Output,
    entry: &UrlEntry,
    force: bool,
) -> CliResult<ExitCode> {
    match pipeline.cache_entry(entry, force) {
        Ok(_) => {
            output.status(&t!("entry.done", slug = entry.slug))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(CliError::new(t!("entry.failed", label = entry.label, error = err))),
    }
}

// ============================================================================
// SECTION: Event Reporting
// ============================================================================

/// Writes localized cache events to the terminal.
///
/// Warnings and failures go to stderr; progress goes to stdout.
struct ConsoleEvents;

impl CacheEvents for ConsoleEvents {
    fn emit(&self, event: &CacheEvent) {
        let (message, to_stderr) = render_event(event);
        let _ = if to_stderr { write_stderr_line(&message) } else { write_stdout_line(&message) };
    }
}

/// Renders an event as a localized line and picks its stream.
fn render_event(event: &CacheEvent) -> (String, bool) {
    match event {
        CacheEvent::EntryStarted {
            slug,
            label,
        } => (t!("event.started", label = label, slug = slug), false),
        CacheEvent::Fresh {
            slug,
            version,
        } => (t!("event.fresh", slug = slug, version = version), false),
        CacheEvent::Stale {
            slug,
            cached,
            remote,
        } => (t!("event.stale", slug = slug, cached = cached, remote = remote), false),
        CacheEvent::Refresh {
            slug,
            reason,
        } => (render_refresh(slug, *reason), false),
        CacheEvent::ProbeFailed {
            slug,
            error,
        } => (t!("event.probe_failed", slug = slug, error = error), true),
        CacheEvent::Step {
            slug,
            step,
        } => (render_step(slug, *step), false),
        CacheEvent::Retry {
            path,
            attempt,
            reason,
        } => (t!("event.retry", path = path, attempt = attempt, reason = reason), true),
        CacheEvent::Cached {
            slug,
        } => (t!("event.cached", slug = slug), false),
        CacheEvent::Failed {
            slug,
            error,
        } => (t!("event.failed", slug = slug, error = error), true),
        CacheEvent::InvalidUrl {
            line,
            label,
            url,
        } => (t!("event.invalid_url", line = line, label = label, url = url), true),
        CacheEvent::DuplicateSlug {
            slug,
            count,
        } => (t!("event.duplicate_slug", count = count, slug = slug), true),
        CacheEvent::Summary {
            cached,
            skipped,
            failed,
        } => (t!("event.summary", cached = cached, skipped = skipped, failed = failed), false),
    }
}

/// Renders a refresh that skipped the version comparison.
fn render_refresh(slug: &str, reason: RefreshReason) -> String {
    match reason {
        RefreshReason::Forced => t!("event.refresh.forced", slug = slug),
        RefreshReason::NotCached => t!("event.refresh.not_cached", slug = slug),
        RefreshReason::Unversioned => t!("event.refresh.unversioned", slug = slug),
        RefreshReason::ImageMissing => t!("event.refresh.image_missing", slug = slug),
    }
}

/// Renders a pipeline step tagged with its slug.
fn render_step(slug: &str, step: PipelineStep) -> String {
    match step {
        PipelineStep::FetchingMetadata => t!("event.step.fetching_metadata", slug = slug),
        PipelineStep::MetadataSaved => t!("event.step.metadata_saved", slug = slug),
        PipelineStep::FetchingImageUrl => t!("event.step.fetching_image_url", slug = slug),
        PipelineStep::DownloadingImage => t!("event.step.downloading_image", slug = slug),
        PipelineStep::ImageSaved => t!("event.step.image_saved", slug = slug),
        PipelineStep::RecordSaved => t!("event.step.record_saved", slug = slug),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Routes status lines away from stdout when it carries JSON events.
#[derive(Debug, Clone, Copy)]
struct Output {
    /// Stdout is reserved for JSON lines.
    json: bool,
}

impl Output {
    /// Writes a human-readable status line.
    fn status(self, message: &str) -> CliResult<()> {
        if self.json {
            write_stderr_line(message).map_err(|err| CliError::new(output_error("stderr", &err)))
        } else {
            write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
        }
    }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
