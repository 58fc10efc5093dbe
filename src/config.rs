/// External configuration loader.
///
/// Reads `config.toml` from the first candidate directory that has one.
/// Missing files and missing keys fall back to defaults; a file that does
/// not parse is reported and ignored as a whole.
///
/// ```toml
/// [general]
/// levels_dir = "levels"
/// max_levels = 10
/// frame_rate = 60
/// log_file = "tilejump.log"
///
/// [gamepad]
/// jump = ["A"]
/// confirm = ["Start"]
/// cancel = ["Select"]
///
/// [audio]
/// enabled = true
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "tilejump";
const MAX_FRAME_RATE: u32 = 240;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub levels_dir: PathBuf,
    pub max_levels: u32,
    pub frame_rate: u32,
    /// `None` logs to stderr.
    pub log_file: Option<PathBuf>,
    pub gamepad: GamepadConfig,
    pub audio_enabled: bool,
    /// Problems found while loading. Reported once logging is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl GameConfig {
    /// Fixed simulation step.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_rate))
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    audio: TomlAudio,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_max_levels")]
    max_levels: u32,
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default = "default_log_file")]
    log_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_true")]
    enabled: bool,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_max_levels() -> u32 { 10 }
fn default_frame_rate() -> u32 { 60 }
fn default_log_file() -> String { format!("{APP_DIR}.log") }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_true() -> bool { true }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            max_levels: default_max_levels(),
            frame_rate: default_frame_rate(),
            log_file: default_log_file(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio { enabled: default_true() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml` in the candidate directories.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        let mut cfg = Self::resolve(toml_cfg, &search_dirs);
        warnings.append(&mut cfg.warnings);
        cfg.warnings = warnings;
        cfg
    }

    /// Parse a config document directly. Relative paths stay relative.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let general = toml_cfg.general;
        let mut warnings = Vec::new();

        let levels_dir = find_dir(&general.levels_dir, search_dirs);

        let max_levels = general.max_levels.max(1);
        let frame_rate = general.frame_rate.clamp(1, MAX_FRAME_RATE);
        if frame_rate != general.frame_rate {
            warnings.push(format!("frame_rate {} out of range, using {frame_rate}", general.frame_rate));
        }

        let log_file = if general.log_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(general.log_file))
        };

        GameConfig {
            levels_dir,
            max_levels,
            frame_rate,
            log_file,
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            audio_enabled: toml_cfg.audio.enabled,
            warnings,
        }
    }
}

/// Absolute paths are taken as-is; relative ones are looked up in each
/// search directory, falling back to the path relative to the CWD.
fn find_dir(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir, CWD, then user and system
/// data directories (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];
    let mut push = |dir: PathBuf| {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    };

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        push(cwd);
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() {
            push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() {
        push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable config.toml wins.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}
