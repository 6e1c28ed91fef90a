use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use toolbench::blob::MemoryBlobStore;
use toolbench::compare::{CompareMode, CompareSession, Opacity, Slot};
use toolbench::config::{self, Language};
use toolbench::debounce::Debouncer;
use toolbench::diff;
use toolbench::export::DirectorySink;
use toolbench::imaging::RustBackend;
use toolbench::json_format::{self, JsonOutcome};
use toolbench::output;
use toolbench::resize::{ResizeSession, SourceFile};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("TOOLBENCH_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("TOOLBENCH_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "toolbench")]
#[command(about = "Offline image and text utilities")]
#[command(long_about = "\
Offline image and text utilities

  resize    Rescale one image to several output scales (1x, 1.5x, 2x, ...)
  compare   Build an overlay / side-by-side comparison page for two images
  diff      Character-by-character comparison of two text files
  json      Validate, pretty-print and highlight JSON

Scales are relative to the original scale: a 2x source resized to 1 is
halved. Output scales may be separated by ',' or '，'.

Run 'toolbench gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log debug diagnostics to stderr (otherwise RUST_LOG, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rescale an image to every requested output scale
    Resize(ResizeArgs),
    /// Render a comparison page for two images
    Compare(CompareArgs),
    /// Compare two text files character by character
    Diff(DiffArgs),
    /// Format and validate JSON from a file or stdin
    Json(JsonArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Persist the display language in config.toml
    SetLanguage {
        #[arg(value_enum)]
        language: LanguageArg,
    },
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Source image
    file: PathBuf,
    /// Scale the source image represents
    #[arg(long, short = 'o', default_value = "1")]
    original_scale: String,
    /// Output scales, e.g. "1.5,2,3"
    #[arg(long, short = 's')]
    scales: String,
    /// Directory results are saved into
    #[arg(long, default_value = "resized")]
    out: PathBuf,
    /// Save each result as its own file instead of one archive
    #[arg(long)]
    each: bool,
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Base image
    left: PathBuf,
    /// Image to compare against the base
    right: PathBuf,
    #[arg(long, value_enum, default_value_t = ModeArg::Overlay)]
    mode: ModeArg,
    /// Overlay opacity between 0 and 1
    #[arg(long, default_value_t = 0.5)]
    opacity: f64,
    /// HTML file to write
    #[arg(long, default_value = "compare.html")]
    out: PathBuf,
}

#[derive(clap::Args)]
struct DiffArgs {
    left: PathBuf,
    right: PathBuf,
    /// Also write a highlighted HTML page
    #[arg(long)]
    html: Option<PathBuf>,
    /// Recompute whenever either file changes
    #[arg(long)]
    watch: bool,
}

#[derive(clap::Args)]
struct JsonArgs {
    /// Input file (stdin when omitted)
    file: Option<PathBuf>,
    /// Write a highlighted HTML page instead of printing
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Overlay,
    SideBySide,
}

impl From<ModeArg> for CompareMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Overlay => CompareMode::Overlay,
            ModeArg::SideBySide => CompareMode::SideBySide,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    En,
    Zh,
}

impl From<LanguageArg> for Language {
    fn from(language: LanguageArg) -> Self {
        match language {
            LanguageArg::En => Language::En,
            LanguageArg::Zh => Language::Zh,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize(args) => {
            let config = config::load_config(&cli.config_dir)?;
            run_resize(&args, &config)?;
        }
        Command::Compare(args) => {
            let backend = RustBackend::new();
            let mut session = CompareSession::new();
            session.load(&backend, Slot::Left, SourceFile::from_path(&args.left)?)?;
            session.load(&backend, Slot::Right, SourceFile::from_path(&args.right)?)?;
            for slot in [Slot::Left, Slot::Right] {
                if let Some(image) = session.get(slot) {
                    println!("{}", image.info_line());
                }
            }
            session.set_mode(args.mode.into());
            session.set_opacity(Opacity::new(args.opacity));
            let page = session.render_page()?;
            std::fs::write(&args.out, page.into_string())?;
            println!(
                "{} ({}) → {}",
                session.mode().as_str(),
                session.opacity().percent_label(),
                args.out.display()
            );
        }
        Command::Diff(args) => {
            let config = config::load_config(&cli.config_dir)?;
            run_diff(&args)?;
            if args.watch {
                watch_diff(&args, config.debounce_delay())?;
            }
        }
        Command::Json(args) => {
            let config = config::load_config(&cli.config_dir)?;
            let input = match &args.file {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let outcome = json_format::format_json(&input);
            if let Some(path) = &args.html {
                let prefix = output::json_error_prefix(config.language);
                let page = json_format::render_page(&outcome, prefix);
                std::fs::write(path, page.into_string())?;
            }
            match outcome {
                JsonOutcome::Empty => {}
                JsonOutcome::Formatted(formatted) => {
                    if args.html.is_none() {
                        println!("{}", formatted.text());
                    }
                }
                JsonOutcome::Invalid(message) => {
                    eprintln!("{}", output::format_json_error(&message, config.language));
                    std::process::exit(1);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::SetLanguage { language } => {
            let language: Language = language.into();
            let path = config::save_language(&cli.config_dir, language)?;
            println!("language = {} → {}", language.code(), path.display());
        }
    }

    Ok(())
}

fn run_resize(
    args: &ResizeArgs,
    config: &config::ToolsConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let language = config.language;
    let backend = RustBackend::new();
    let blobs = MemoryBlobStore::new();
    let mut session = ResizeSession::new(config.resize_options());

    let file = SourceFile::from_path(&args.file)?;
    if let Err(e) = session.select_file(file) {
        eprintln!("{}", output::format_resize_error(&e, language));
        std::process::exit(2);
    }
    if let Some(file) = session.file() {
        if let Some((width, height)) = file.dimensions() {
            println!(
                "{}",
                output::format_image_info(&file.name, width, height, file.size())
            );
        }
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_progress_event(&event, language);
        }
    });
    let result = session
        .process(
            &backend,
            &blobs,
            &args.original_scale,
            &args.scales,
            Some(&tx),
        )
        .map(|results| results.len());
    drop(tx);
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let failure = match result {
        Ok(_) => None,
        Err(e) if e.is_validation() => {
            eprintln!("{}", output::format_resize_error(&e, language));
            std::process::exit(2);
        }
        Err(e) => Some(e),
    };

    // Whatever was produced before a failure is still saved
    if !session.results().is_empty() {
        output::print_results(session.results(), language);
        let mut sink = DirectorySink::new(&args.out);
        if args.each {
            for index in 0..session.results().len() {
                session.download(index, &blobs, &mut sink)?;
            }
            println!("Saved {} files → {}", sink.saved().len(), sink.dir().display());
        } else {
            let summary = session.download_all(&blobs, &mut sink, &config.export_options())?;
            println!("{}", output::format_export_summary(&summary, sink.dir()));
        }
    }

    if let Some(e) = failure {
        eprintln!("{}", output::format_resize_error(&e, language));
        std::process::exit(1);
    }
    Ok(())
}

fn run_diff(args: &DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let left = std::fs::read_to_string(&args.left)?;
    let right = std::fs::read_to_string(&args.right)?;
    let result = diff::character_diff(&left, &right);

    let left_label = args.left.display().to_string();
    let right_label = args.right.display().to_string();
    output::print_diff_output(&result, &left_label, &right_label);
    if let Some(path) = &args.html {
        let page = diff::render_page(&result, &left_label, &right_label);
        std::fs::write(path, page.into_string())?;
    }
    Ok(())
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Poll both files and recompute once changes have settled. Runs until
/// interrupted.
fn watch_diff(args: &DiffArgs, delay: Duration) -> Result<(), Box<dyn std::error::Error>> {
    const POLL: Duration = Duration::from_millis(50);

    let mut debouncer = Debouncer::new(delay);
    let mut seen = (modified(&args.left), modified(&args.right));
    tracing::info!(delay_ms = delay.as_millis() as u64, "watching for changes");

    loop {
        std::thread::sleep(POLL);
        let now = Instant::now();
        let current = (modified(&args.left), modified(&args.right));
        if current != seen {
            seen = current;
            debouncer.trigger(now);
        }
        if let Some(coalesced) = debouncer.fire(now) {
            tracing::debug!(coalesced, "files changed");
            println!();
            if let Err(e) = run_diff(args) {
                tracing::warn!(error = %e, "could not re-read inputs");
            }
        }
    }
}
