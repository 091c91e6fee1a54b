//! Editmark - A terminal text editor with a single emacs-style mark.
//!
//! # Usage
//!
//! ```bash
//! editmark notes.txt
//! editmark --keep-mark --mark-class bookmark notes.txt
//! editmark --exec "goto:3:1,mark:set-mark,goto:7:1,mark:select-to-mark-and-copy" notes.txt
//! ```

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use editmark::app::App;
use editmark::clipboard::MemoryClipboard;
use editmark::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use editmark::mark::{LINE_NUMBER_GUTTER, MarkOptions};
use editmark::perf;
use editmark::script::{parse_script, run_script};
use editmark::workspace::Workspace;

/// A terminal text editor with a single emacs-style mark
#[derive(Parser, Debug)]
#[command(name = "editmark", version, about, long_about = None)]
struct Cli {
    /// File to edit (created on save if missing)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Start with the line-number gutter hidden
    #[arg(long)]
    no_line_numbers: bool,

    /// Keep the mark when select-to-mark-and-copy/cut had nothing to select
    #[arg(long)]
    keep_mark: bool,

    /// Decoration class for the marked line number
    #[arg(long, value_name = "NAME")]
    mark_class: Option<String>,

    /// Run a comma-separated command script without a terminal and print
    /// the final clipboard
    #[arg(long, value_name = "CMDS")]
    exec: Option<String>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed event logs to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn run_headless(
    file: &Path,
    script: &str,
    options: MarkOptions,
    line_numbers: bool,
) -> Result<()> {
    let steps = parse_script(script).context("Invalid --exec script")?;
    let text = read_or_empty(file)?;

    let mut workspace = Workspace::new(MemoryClipboard::handle(), options);
    let view = workspace.open_view(&text);
    if !line_numbers && let Some(editor) = workspace.view_mut(view) {
        editor.set_gutter_visible(LINE_NUMBER_GUTTER, false);
    }
    run_script(&mut workspace, view, &steps).context("Script failed")?;

    let clipboard = workspace.clipboard().borrow().contents().unwrap_or_default();
    let mut out = std::io::stdout().lock();
    out.write_all(clipboard.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("EDITMARK_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        tracing::warn!(
            path = %debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize debug log"
        );
    }

    let options = effective.mark_options();
    let line_numbers = !effective.no_line_numbers;

    if let Some(script) = cli.exec.as_deref() {
        return run_headless(&cli.file, script, options, line_numbers);
    }

    let mut app = App::new(cli.file)
        .with_line_numbers(line_numbers)
        .with_mark_options(options);

    app.run().context("Application error")
}
