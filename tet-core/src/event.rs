use std::fmt;

use crate::raised::Raised;

/// The outcome of one check, recorded exactly once.
#[derive(Debug)]
pub enum Event {
    Pass,
    Fail(Failure),
    /// Something was raised where nothing was expected.
    Error(Raised),
}

#[derive(Debug)]
pub enum Failure {
    /// An `assert` body produced a falsy value.
    Falsy,
    /// A `deny` body produced a truthy value.
    Truthy,
    /// An `err` body completed without raising.
    NotRaised { expected: String },
    /// An `err` body raised, but not what was expected.
    WrongError { expected: String, got: Raised },
    /// An assertion-style operation was called inside the body of another one.
    Nested { operation: String, inside: String },
    /// A group finished without recording anything.
    EmptyGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Pass,
    Fail,
    Error,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Pass => EventKind::Pass,
            Event::Fail(_) => EventKind::Fail,
            Event::Error(_) => EventKind::Error,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Event::Pass)
    }

    /// Progress mark printed when the event is recorded.
    pub fn mark(&self) -> char {
        match self {
            Event::Pass => '.',
            Event::Fail(Failure::WrongError { .. }) => '?',
            Event::Fail(_) => 'F',
            Event::Error(_) => '!',
        }
    }

    /// The raised value attached to this event, if any.
    pub fn raised(&self) -> Option<&Raised> {
        match self {
            Event::Error(raised) | Event::Fail(Failure::WrongError { got: raised, .. }) => {
                Some(raised)
            }
            _ => None,
        }
    }
}

/// Aggregate counts of a run. Errors are a subset of fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub tests: usize,
    pub fails: usize,
    pub errors: usize,
}

impl Counters {
    pub(crate) fn count(&mut self, kind: EventKind) {
        self.tests += 1;
        match kind {
            EventKind::Pass => {}
            EventKind::Fail => self.fails += 1,
            EventKind::Error => {
                self.fails += 1;
                self.errors += 1;
            }
        }
    }

    pub fn passes(&self) -> usize {
        self.tests - self.fails
    }
}

/// Final counts of a finished session.
pub type Summary = Counters;

impl Summary {
    pub fn passed(&self) -> bool {
        self.fails == 0
    }
}

fn plural(f: &mut fmt::Formatter<'_>, count: usize, noun: &str) -> fmt::Result {
    match count {
        1 => write!(f, "1 {noun}"),
        n => write!(f, "{n} {noun}s"),
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        plural(f, self.tests, "test")?;
        f.write_str(", ")?;
        plural(f, self.fails, "fail")?;
        if self.errors > 0 {
            f.write_str(", ")?;
            plural(f, self.errors, "error")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn errors_are_counted_as_fails() {
        let mut counters = Counters::default();
        counters.count(EventKind::Pass);
        counters.count(EventKind::Fail);
        counters.count(EventKind::Error);
        assert_eq!(
            counters,
            Counters {
                tests: 3,
                fails: 2,
                errors: 1
            }
        );
        assert_eq!(counters.passes(), 1);
        assert!(!counters.passed());
    }

    #[test_case(1, 0, 0, "1 test, 0 fails"; "singular test")]
    #[test_case(2, 1, 0, "2 tests, 1 fail"; "singular fail")]
    #[test_case(5, 3, 1, "5 tests, 3 fails, 1 error"; "singular error")]
    #[test_case(9, 4, 2, "9 tests, 4 fails, 2 errors"; "plural error")]
    fn stats_line(tests: usize, fails: usize, errors: usize, expected: &str) {
        let counters = Counters {
            tests,
            fails,
            errors,
        };
        assert_eq!(counters.to_string(), expected);
    }

    #[test]
    fn marks_are_distinct() {
        let marks = [
            Event::Pass.mark(),
            Event::Fail(Failure::Falsy).mark(),
            Event::Fail(Failure::WrongError {
                expected: "any error".into(),
                got: Raised::msg("x"),
            })
            .mark(),
            Event::Error(Raised::msg("x")).mark(),
        ];
        assert_eq!(marks, ['.', 'F', '?', '!']);
    }
}
