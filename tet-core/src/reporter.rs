use console::{style, Term};
use std::io::{self, Write};

use crate::{
    config::{BacktraceMode, ColorSetting, Config},
    event::{Event, Failure, Summary},
    label::LabelPath,
    raised::Raised,
    tree::ResultTree,
    Result,
};

/// Reporter trait. The trait is based on the "template method" pattern: implement the
/// `on_xxx` hooks you care about, the others do nothing.
pub trait Reporter {
    /// Called once per recorded event, right after the counters were updated.
    fn on_event(&mut self, _path: &LabelPath, _event: &Event) -> Result<()> {
        Ok(())
    }

    /// Called once when the session finishes.
    fn on_finish(&mut self, _summary: &Summary, _tree: &ResultTree) -> Result<()> {
        Ok(())
    }
}

pub struct NullReporter;

impl Reporter for NullReporter {}

/// Prints one mark per event while the run goes, and the summary and failure report
/// at the end.
pub struct DotReporter<W: Write = Term> {
    target: W,
    color: ColorSetting,
    terminal: bool,
    progress: bool,
    backtrace: BacktraceMode,
    /// Whether a progress line was started and still needs its newline.
    marked: bool,
}

impl DotReporter<Term> {
    pub fn new(cfg: &Config) -> DotReporter<Term> {
        let target = Term::stdout();
        let terminal = target.features().colors_supported();
        DotReporter {
            target,
            color: cfg.color,
            terminal,
            progress: cfg.progress,
            backtrace: cfg.backtrace,
            marked: false,
        }
    }
}

impl<W: Write> DotReporter<W> {
    /// Write to `target` instead. Automatic color is off for anything but the terminal.
    pub fn with_target<T: Write>(self, target: T) -> DotReporter<T> {
        DotReporter {
            target,
            color: self.color,
            terminal: false,
            progress: self.progress,
            backtrace: self.backtrace,
            marked: self.marked,
        }
    }

    pub fn into_target(self) -> W {
        self.target
    }

    fn use_color(&self) -> bool {
        self.color.enabled(self.terminal)
    }
}

impl<W: Write> Reporter for DotReporter<W> {
    fn on_event(&mut self, _path: &LabelPath, event: &Event) -> Result<()> {
        if !self.progress {
            return Ok(());
        }
        let mark = style(event.mark()).force_styling(self.use_color());
        let mark = match event {
            Event::Pass => mark.green(),
            Event::Fail(Failure::WrongError { .. }) => mark.yellow(),
            Event::Fail(_) => mark.red(),
            Event::Error(_) => mark.red().bold(),
        };
        write!(self.target, "{mark}")?;
        self.target.flush()?;
        self.marked = true;
        Ok(())
    }

    fn on_finish(&mut self, summary: &Summary, tree: &ResultTree) -> Result<()> {
        if self.marked {
            writeln!(self.target)?;
            self.marked = false;
        }
        let color = self.use_color();
        write_report(&mut self.target, summary, tree, self.backtrace, color)?;
        self.target.flush()?;
        Ok(())
    }
}

const LEAF_INDENT: &str = "  ";
const INDENT: &str = "    ";

/// Render the end-of-run report.
///
/// Nothing is written for a run without events. Otherwise the counts come first,
/// then every failure in tree order with its details indented beneath it.
pub fn write_report(
    w: &mut impl Write,
    summary: &Summary,
    tree: &ResultTree,
    backtrace: BacktraceMode,
    color: bool,
) -> io::Result<()> {
    if summary.tests == 0 {
        return Ok(());
    }

    let stats = style(summary).force_styling(color);
    if summary.passed() {
        writeln!(w, "{}", stats.green())?;
    } else {
        writeln!(w, "{}", stats.red())?;
    }

    if tree.is_empty() {
        return Ok(());
    }

    writeln!(w, "{}", style("Failed tests:").force_styling(color).bold())?;
    for (path, event) in tree.leaves() {
        let path = if path.is_empty() {
            String::from("(top level)")
        } else {
            path.to_string()
        };
        writeln!(w, "{LEAF_INDENT}- {}", style(path).force_styling(color).bold())?;
        for (depth, line) in details(event, backtrace) {
            writeln!(w, "{LEAF_INDENT}{}{line}", INDENT.repeat(depth))?;
        }
    }
    Ok(())
}

fn details(event: &Event, backtrace: BacktraceMode) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    match event {
        Event::Pass | Event::Fail(Failure::Falsy) => {}
        Event::Fail(Failure::Truthy) => lines.push((1, "EXPECTED: a falsy value".to_string())),
        Event::Fail(Failure::NotRaised { expected }) => {
            lines.push((1, format!("EXPECTED: {expected}")));
            lines.push((1, "GOT: nothing was raised".to_string()));
        }
        Event::Fail(Failure::WrongError { expected, got }) => {
            lines.push((1, format!("EXPECTED: {expected}")));
            raised_details(&mut lines, got, backtrace);
        }
        Event::Fail(Failure::Nested { operation, inside }) => {
            lines.push((1, format!("NESTED: {operation} called inside {inside}")));
        }
        Event::Fail(Failure::EmptyGroup) => {
            lines.push((1, "EMPTY GROUP: nothing was checked".to_string()))
        }
        Event::Error(raised) => raised_details(&mut lines, raised, backtrace),
    }
    lines
}

fn raised_details(lines: &mut Vec<(usize, String)>, raised: &Raised, backtrace: BacktraceMode) {
    lines.push((1, format!("ERROR: {raised}")));
    lines.extend(
        raised
            .causes()
            .iter()
            .map(|cause| (2, format!("caused by: {cause}"))),
    );
    if let Some(location) = raised.location() {
        lines.push((2, format!("at {location}")));
    }
    lines.extend(raised.frames(backtrace).into_iter().map(|frame| (2, frame)));
}
