//! # Configuration Module
//!
//! tet has no configuration file. The few knobs it has are read from `TET_*`
//! environment variables, optionally seeded from a `.env` file in the current
//! directory.
//!
//! ## Configuration Loading Flow (block diagram)
//!
//! ```text
//! +-------------------+     +-------------------+     +-------------------+
//! | .env file         | --> | process env       | --> | TET_* variables   |
//! | (optional)        |     | (dotenv merge)    |     |                   |
//! +-------------------+     +-------------------+     +-------------------+
//!                                                              |
//!                                                              v
//!                           +-------------------+     +-------------------+
//!                           | get_tet_config()  | <-- | Config struct     |
//!                           | cached, read-only |     | color, backtrace  |
//!                           +-------------------+     +-------------------+
//! ```
//!
//! ## Variables
//!
//! | variable        | values                     | default |
//! |-----------------|----------------------------|---------|
//! | `TET_COLOR`     | `auto`, `always`, `never`  | `auto`  |
//! | `TET_BACKTRACE` | `off`, `short`, `full`     | `short` |
//! | `TET_PROGRESS`  | `true`, `false`            | `true`  |
//!
//! ```bash
//! TET_BACKTRACE=full TET_COLOR=never cargo run -p my-suite
//! ```

use once_cell::sync::Lazy;
use std::{backtrace::Backtrace, str::FromStr};
use tracing::*;

use crate::{Error, Result};

const PREFIX: &str = "TET";

static CONFIG: Lazy<Config> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().unwrap_or_else(|e| {
        error!("falling back to the default configuration: {e}");
        Config::default()
    })
});

/// Get the configuration of the current process. It is loaded once, on first access.
pub fn get_tet_config() -> &'static Config {
    &CONFIG
}

/// tet's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether progress marks and the report are colored.
    pub color: ColorSetting,
    /// How much of a captured backtrace ends up in the report.
    pub backtrace: BacktraceMode,
    /// Whether a mark is printed for every assertion as it finishes.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            color: ColorSetting::Auto,
            backtrace: BacktraceMode::Short,
            progress: true,
        }
    }
}

impl Config {
    /// Load tet configuration from the process environment.
    pub fn load() -> Result<Config> {
        Config::from_vars(std::env::vars())
    }

    /// Build a configuration from `(key, value)` pairs. Keys without the `TET_` prefix are
    /// ignored, as are unknown `TET_*` keys.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Config>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Config::default();
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let Some(name) = key
                .strip_prefix(PREFIX)
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };

            match name {
                "COLOR" => cfg.color = parse(key, value, "auto, always, never")?,
                "BACKTRACE" => cfg.backtrace = parse(key, value, "off, short, full")?,
                "PROGRESS" => cfg.progress = parse_flag(key, value)?,
                _ => continue,
            }
            debug!("{key}={value:?} applied");
        }

        debug!("tet configuration loaded from env: {cfg:?}");
        Ok(cfg)
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn parse<T: FromStr>(key: &str, value: &str, expected: &'static str) -> Result<T> {
    value.parse().map_err(|_| invalid(key, value, expected))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid(key, value, "true, false"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorSetting {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorSetting {
    /// Resolve the setting against whether the target is a color-capable terminal.
    pub fn enabled(self, supports_color: bool) -> bool {
        match self {
            ColorSetting::Auto => supports_color,
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

/// Backtrace capture and display policy for raised errors and panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BacktraceMode {
    /// Capture nothing.
    Off,
    /// Capture, then drop frames belonging to tet, the standard library and the runtime.
    #[default]
    Short,
    /// Capture and show every frame.
    Full,
}

impl BacktraceMode {
    pub(crate) fn capture(self) -> Option<Backtrace> {
        match self {
            BacktraceMode::Off => None,
            BacktraceMode::Short | BacktraceMode::Full => Some(Backtrace::force_capture()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn defaults_when_nothing_is_set() -> Result<()> {
        let cfg = Config::from_vars([("HOME", "/root"), ("PATH", "/bin")])?;
        assert_eq!(cfg, Config::default());
        Ok(())
    }

    #[test_case("auto", ColorSetting::Auto; "auto")]
    #[test_case("always", ColorSetting::Always; "always")]
    #[test_case("NEVER", ColorSetting::Never; "case insensitive")]
    #[test_case(" never ", ColorSetting::Never; "surrounding whitespace")]
    fn color(value: &str, expected: ColorSetting) -> Result<()> {
        let cfg = Config::from_vars([("TET_COLOR", value)])?;
        assert_eq!(cfg.color, expected);
        Ok(())
    }

    #[test_case("off", BacktraceMode::Off; "off")]
    #[test_case("short", BacktraceMode::Short; "short")]
    #[test_case("Full", BacktraceMode::Full; "full")]
    fn backtrace(value: &str, expected: BacktraceMode) -> Result<()> {
        let cfg = Config::from_vars([("TET_BACKTRACE", value)])?;
        assert_eq!(cfg.backtrace, expected);
        Ok(())
    }

    #[test_case("false", false; "lowercase")]
    #[test_case("FALSE", false; "uppercase")]
    #[test_case("True", true; "mixed case")]
    fn progress(value: &str, expected: bool) -> Result<()> {
        let cfg = Config::from_vars([("TET_PROGRESS", value), ("TET_COLOR", "never")])?;
        assert_eq!(cfg.progress, expected);
        assert_eq!(cfg.color, ColorSetting::Never);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_ignored() -> Result<()> {
        let cfg = Config::from_vars([("TET_SOMETHING_ELSE", "1"), ("TETRIS", "yes")])?;
        assert_eq!(cfg, Config::default());
        Ok(())
    }

    #[test_case("TET_COLOR", "sometimes"; "color")]
    #[test_case("TET_BACKTRACE", "medium"; "backtrace")]
    #[test_case("TET_PROGRESS", "yes"; "progress")]
    fn invalid_value(key: &str, value: &str) {
        let err = Config::from_vars([(key, value)]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
        let msg = err.to_string();
        assert!(msg.contains(key), "error should name the variable: {msg}");
        assert!(msg.contains(value), "error should echo the value: {msg}");
    }

    #[test_case(ColorSetting::Auto, true, true; "auto on terminal")]
    #[test_case(ColorSetting::Auto, false, false; "auto off terminal")]
    #[test_case(ColorSetting::Always, false, true; "always")]
    #[test_case(ColorSetting::Never, true, false; "never")]
    fn color_resolution(setting: ColorSetting, terminal: bool, expected: bool) {
        assert_eq!(setting.enabled(terminal), expected);
    }
}
