//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use storygen_core::pipeline::{RenderOptions, RenderRequest, render};
use storygen_shared::{
    AppConfig, EventLog, Field, FileEventLog, NullEventLog, OsFileSystem, init_config,
    load_config,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// storygen — assemble story prompts from templates and project context.
#[derive(Parser)]
#[command(
    name = "storygen",
    version,
    about = "Render a story template with project context and matched concept documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Render a template to stdout.
    Run {
        /// Templates directory (overrides the config file).
        #[arg(long, env = "STORYGEN_TEMPLATES")]
        templates: Option<PathBuf>,

        /// Project directory holding inc/ (defaults to the current directory).
        #[arg(long)]
        project: Option<PathBuf>,

        /// Do not append to the project event log.
        #[arg(long)]
        no_event_log: bool,

        /// Template name (without extension) followed by the user prompt.
        /// Prompt words are joined with spaces and may begin with `-`.
        #[arg(
            value_name = "TEMPLATE [PROMPT]...",
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        words: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Diagnostics go to stderr; stdout
/// carries the rendered document.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "storygen=warn",
        1 => "storygen=info",
        2 => "storygen=debug",
        _ => "storygen=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Run {
            templates,
            project,
            no_event_log,
            words,
        } => cmd_run(RunArgs {
            templates,
            project,
            no_event_log,
            words,
        }),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

struct RunArgs {
    templates: Option<PathBuf>,
    project: Option<PathBuf>,
    no_event_log: bool,
    words: Vec<String>,
}

const USAGE: &str = "Usage: storygen run <template-name> [user-prompt]\n\
                     Renders <templates-dir>/<template-name>.md with project context from ./inc/main.md.";

/// Event log for a CLI run. Warnings are always printed to stderr,
/// whatever the tracing filter says.
struct RunEventLog {
    sink: Box<dyn EventLog>,
}

impl EventLog for RunEventLog {
    fn record(&self, event: &str, fields: &[Field<'_>]) {
        self.sink.record(event, fields);
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {message}");
        self.record("warning", &[("message", message.to_string())]);
    }
}

fn cmd_run(args: RunArgs) -> Result<ExitCode> {
    let mut words = args.words.into_iter();
    let Some(template) = words.next() else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    };
    let prompt = words.collect::<Vec<_>>().join(" ");

    let config = load_config()?;

    let project_root = match args.project {
        Some(p) => p,
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    let sink: Box<dyn EventLog> = if args.no_event_log {
        Box::new(NullEventLog)
    } else {
        Box::new(FileEventLog::new(project_root.join(&config.paths.log_file)))
    };
    let event_log = RunEventLog { sink };
    let log = &event_log;

    log.record("start", &[]);
    log.record(
        "argv",
        &[(
            "args",
            serde_json::to_string(&std::env::args().skip(1).collect::<Vec<_>>())?,
        )],
    );

    log.record(
        "run",
        &[
            ("template", template.clone()),
            (
                "user_prompt",
                if prompt.is_empty() {
                    "none".to_string()
                } else {
                    format!("\"{prompt}\"")
                },
            ),
        ],
    );

    let templates_dir = match args.templates {
        Some(dir) => dir,
        None => config.paths.templates_path()?,
    };

    let options = RenderOptions {
        templates_dir,
        layout: config.paths.layout(&project_root),
        user_request_heading: config.render.user_request_heading.clone(),
    };
    let request = RenderRequest { template, prompt };

    info!(
        template = %request.template,
        project = %project_root.display(),
        templates = %options.templates_dir.display(),
        "rendering template"
    );

    let output = match render(&options, &request, &OsFileSystem, log) {
        Ok(output) => output,
        Err(err) if err.is_fatal_render() => {
            eprintln!("Error: {err}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    debug!(
        includes = output.includes.len(),
        missing = output.missing.len(),
        failed = output.failed.len(),
        "render finished"
    );

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output.document)?;
    stdout.flush()?;

    log.record("output", &[("bytes", output.document.len().to_string())]);
    log.record("end", &[]);

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show() -> Result<ExitCode> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}
