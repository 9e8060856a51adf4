use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::{ffi::OsString, str::FromStr};
use tracing::*;
use tracing_subscriber::EnvFilter;

use crate::{
    get_tet_config, BacktraceMode, ColorSetting, Config, DotReporter, Reporter, Session, Summary,
};

/// Environment variable holding a tracing filter directive. Overrides `--log-level`.
pub const LOG_ENV: &str = "TET_LOG";

/// Build the CLI with clap's builder pattern
fn build_cli() -> ClapCommand {
    ClapCommand::new("tet")
        .about("Run a tet suite and print its failure report")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(Arg::new("color")
            .long("color")
            .help("Produce color output. Default is \"auto\" [env: TET_COLOR]")
            .value_parser(["auto", "always", "never"]))
        .arg(Arg::new("backtrace")
            .long("backtrace")
            .help("How much of a captured backtrace to print for errors. Default is \"short\" [env: TET_BACKTRACE]")
            .value_parser(["off", "short", "full"]))
        .arg(Arg::new("no-progress")
            .long("no-progress")
            .help("Do not print a mark for every finished check")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("log-level")
            .long("log-level")
            .help(format!("tet log level filter, written to stderr. [env: {LOG_ENV}]"))
            .default_value("off"))
}

/// Configuration after applying command-line overrides to the environment.
fn settings(matches: &ArgMatches, mut cfg: Config) -> eyre::Result<Config> {
    if let Some(color) = matches.get_one::<String>("color") {
        cfg.color = ColorSetting::from_str(color)?;
    }
    if let Some(backtrace) = matches.get_one::<String>("backtrace") {
        cfg.backtrace = BacktraceMode::from_str(backtrace)?;
    }
    if matches.get_flag("no-progress") {
        cfg.progress = false;
    }
    Ok(cfg)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber installed by the suite itself wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// tet CLI.
#[derive(Default)]
pub struct App {
    reporters: Vec<Box<dyn Reporter>>,
}

impl App {
    pub fn new() -> App {
        App {
            reporters: Vec::new(),
        }
    }

    /// Install a reporter in addition to the progress and report printer.
    pub fn install_reporter(&mut self, reporter: impl Reporter + 'static) {
        self.reporters.push(Box::new(reporter));
    }

    /// Parse command-line args and run `suite` in a fresh session.
    pub fn run(self, suite: impl FnOnce(&mut Session)) -> eyre::Result<Summary> {
        self.run_from(std::env::args_os(), suite)
    }

    /// Like [`App::run`] with explicit arguments, the first one being the program name.
    pub fn run_from<I, T>(self, args: I, suite: impl FnOnce(&mut Session)) -> eyre::Result<Summary>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = build_cli().get_matches_from(args);
        if let Err(e) = color_eyre::install() {
            debug!("color-eyre is already installed: {e}");
        }
        if let Some(level) = matches.get_one::<String>("log-level") {
            init_logging(level);
        }

        let cfg = settings(&matches, get_tet_config().clone())?;
        match cfg.color {
            ColorSetting::Always => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            ColorSetting::Never => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            ColorSetting::Auto => {}
        }
        info!("running suite with {cfg:?}");

        let mut session = Session::with_config(cfg.clone());
        session.add_reporter(DotReporter::new(&cfg));
        for reporter in self.reporters {
            session.add_boxed_reporter(reporter);
        }

        suite(&mut session);
        Ok(session.finish())
    }
}
