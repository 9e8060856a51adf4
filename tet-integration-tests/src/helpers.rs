use console::Term;
use std::process::ExitCode;
use tet::Session;

pub const INTENDED_FAILURE: &str = "INTENDED FAILURE";
pub const INTENDED_ERROR: &str = "INTENDED ERROR";

/// Bookkeeping for checks that are supposed to fail.
///
/// tet checks itself with tet, so some of its checks must fail on purpose. Those run
/// under [`Intended::should_fail`] or [`Intended::should_err`], which label them and
/// remember whether they actually failed.
#[derive(Debug, Default)]
pub struct Intended {
    expected_fails: usize,
    missed_fails: usize,
    expected_errors: usize,
    missed_errors: usize,
}

/// Plain failures, without the errors.
fn fails(s: &Session) -> usize {
    let counters = s.counters();
    counters.fails - counters.errors
}

impl Intended {
    /// Run `body` in a group that is expected to record a failure.
    pub fn should_fail<T>(
        &mut self,
        s: &mut Session,
        body: impl FnOnce(&mut Session) -> T,
    ) -> Option<T> {
        self.expected_fails += 1;
        let before = fails(s);
        let output = s.group(INTENDED_FAILURE, body);
        if fails(s) == before {
            self.missed_fails += 1;
        }
        output
    }

    /// Run `body` in a group that is expected to record an error.
    pub fn should_err<T>(
        &mut self,
        s: &mut Session,
        body: impl FnOnce(&mut Session) -> T,
    ) -> Option<T> {
        self.expected_errors += 1;
        let before = s.counters().errors;
        let output = s.group(INTENDED_ERROR, body);
        if s.counters().errors == before {
            self.missed_errors += 1;
        }
        output
    }

    pub fn tally(&self, summary: &tet::Summary) -> Tally {
        let fails = summary.fails - summary.errors;
        Tally {
            missed_fails: self.missed_fails,
            missed_errors: self.missed_errors,
            unintended_fails: (fails + self.missed_fails).saturating_sub(self.expected_fails),
            unintended_errors: (summary.errors + self.missed_errors)
                .saturating_sub(self.expected_errors),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub missed_fails: usize,
    pub missed_errors: usize,
    pub unintended_fails: usize,
    pub unintended_errors: usize,
}

impl Tally {
    pub fn print(&self, term: &Term) -> std::io::Result<()> {
        term.write_line("")?;
        term.write_line(&format!("{} missed fails", self.missed_fails))?;
        term.write_line(&format!("{} missed errors", self.missed_errors))?;
        term.write_line(&format!("{} unintended fails", self.unintended_fails))?;
        term.write_line(&format!("{} unintended errors", self.unintended_errors))
    }

    pub fn exit_code(&self) -> ExitCode {
        if *self == Tally::default() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
