use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::mark::{ClearPolicy, DEFAULT_MARK_CLASS, MarkOptions};

/// Flags that may come from the command line or a config file.
///
/// Config files hold the same flags as the CLI, whitespace separated, with
/// `#` comment lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_line_numbers: bool,
    pub keep_mark: bool,
    pub perf: bool,
    pub mark_class: Option<String>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_line_numbers: self.no_line_numbers || other.no_line_numbers,
            keep_mark: self.keep_mark || other.keep_mark,
            perf: self.perf || other.perf,
            mark_class: other
                .mark_class
                .clone()
                .or_else(|| self.mark_class.clone()),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// Controller options these flags select.
    pub fn mark_options(&self) -> MarkOptions {
        MarkOptions {
            clear_policy: if self.keep_mark {
                ClearPolicy::OnSelection
            } else {
                ClearPolicy::Always
            },
            decoration_class: self
                .mark_class
                .clone()
                .unwrap_or_else(|| DEFAULT_MARK_CLASS.to_string()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("editmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("editmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("editmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("editmark")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".editmarkrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# editmark defaults (saved with --save)".to_string()];
    if flags.no_line_numbers {
        lines.push("--no-line-numbers".to_string());
    }
    if flags.keep_mark {
        lines.push("--keep-mark".to_string());
    }
    if let Some(class) = &flags.mark_class {
        lines.push(format!("--mark-class {class}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-line-numbers" => flags.no_line_numbers = true,
            "--keep-mark" => flags.keep_mark = true,
            "--perf" => flags.perf = true,
            "--mark-class" | "--debug-log" => {
                if let Some(next) = tokens.get(i + 1) {
                    set_valued_flag(&mut flags, token, next);
                    i += 1;
                }
            }
            _ => {
                if let Some((name, value)) = token.split_once('=') {
                    set_valued_flag(&mut flags, name, value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn set_valued_flag(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--mark-class" if !value.is_empty() => flags.mark_class = Some(value.to_string()),
        "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}
