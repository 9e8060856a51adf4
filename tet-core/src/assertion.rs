//! tet assertions.
//!
//! `assert`, `deny` and `err` are the assertion-style operations of a
//! [`Session`]. Each one runs under its own label, refuses to run inside the body
//! of another one, catches whatever the body raises and records exactly one
//! event.

use tracing::*;

use crate::{
    capture,
    event::{Event, Failure},
    label::Label,
    raised::{Expect, Raised},
    session::Session,
};

/// Values an `assert` or `deny` body may produce.
///
/// `Err` counts as raised rather than falsy, so a body can use `?`.
pub trait Truthy {
    fn truthy(self) -> Result<bool, Raised>;
}

impl Truthy for bool {
    fn truthy(self) -> Result<bool, Raised> {
        Ok(self)
    }
}

impl<T> Truthy for Option<T> {
    fn truthy(self) -> Result<bool, Raised> {
        Ok(self.is_some())
    }
}

impl<T: Truthy, E: Into<Raised>> Truthy for Result<T, E> {
    fn truthy(self) -> Result<bool, Raised> {
        self.map_err(Into::into)?.truthy()
    }
}

/// Values an `err` body may produce. A panic always counts as raised.
pub trait Raises {
    fn raised(self) -> Option<Raised>;
}

impl Raises for () {
    fn raised(self) -> Option<Raised> {
        None
    }
}

impl<T, E: Into<Raised>> Raises for Result<T, E> {
    fn raised(self) -> Option<Raised> {
        self.err().map(Into::into)
    }
}

impl Session {
    /// Checks that `body` produces a truthy value.
    ///
    /// Returns `true` only if the check passed.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// session.group("parse", |s| {
    ///     s.assert("port", |_| "8080".parse::<u16>().map(|port| port == 8080));
    ///     s.assert("empty", |_| "".parse::<u16>().is_err());
    /// });
    /// ```
    pub fn assert<L, R, F>(&mut self, label: L, body: F) -> bool
    where
        L: Label,
        R: Truthy,
        F: FnOnce(&mut Session) -> R,
    {
        self.check(
            "assert",
            label.to_label(),
            |s| body(s).truthy(),
            |outcome| match outcome {
                Ok(true) => Event::Pass,
                Ok(false) => Event::Fail(Failure::Falsy),
                Err(raised) => Event::Error(raised),
            },
        )
    }

    /// Checks that `body` produces a falsy value.
    pub fn deny<L, R, F>(&mut self, label: L, body: F) -> bool
    where
        L: Label,
        R: Truthy,
        F: FnOnce(&mut Session) -> R,
    {
        self.check(
            "deny",
            label.to_label(),
            |s| body(s).truthy(),
            |outcome| match outcome {
                Ok(false) => Event::Pass,
                Ok(true) => Event::Fail(Failure::Truthy),
                Err(raised) => Event::Error(raised),
            },
        )
    }

    /// Checks that `body` raises something `expect` matches, either by panicking or by
    /// returning `Err`.
    ///
    /// Something else raised is a wrong-error failure.
    pub fn err<L, R, F>(&mut self, label: L, expect: Expect, body: F) -> bool
    where
        L: Label,
        R: Raises,
        F: FnOnce(&mut Session) -> R,
    {
        self.check(
            "err",
            label.to_label(),
            |s| body(s).raised().map_or(Ok(()), Err),
            |outcome| match outcome {
                Ok(()) => Event::Fail(Failure::NotRaised {
                    expected: expect.to_string(),
                }),
                Err(raised) if expect.matches(&raised) => Event::Pass,
                Err(got) => Event::Fail(Failure::WrongError {
                    expected: expect.to_string(),
                    got,
                }),
            },
        )
    }

    /// [`Session::err`] accepting anything raised.
    pub fn err_any<L, R, F>(&mut self, label: L, body: F) -> bool
    where
        L: Label,
        R: Raises,
        F: FnOnce(&mut Session) -> R,
    {
        self.err(label, Expect::any(), body)
    }

    fn check<T>(
        &mut self,
        operation: &str,
        label: Option<String>,
        body: impl FnOnce(&mut Session) -> Result<T, Raised>,
        classify: impl FnOnce(Result<T, Raised>) -> Event,
    ) -> bool {
        let reason = match &label {
            Some(label) => format!("{operation}({label:?})"),
            None => format!("{operation}()"),
        };

        self.labeled(label, |s| {
            let event = match s.guard.claim(reason.clone()) {
                Err(inside) => {
                    warn!("{reason} called inside {inside}, not running it");
                    Event::Fail(Failure::Nested {
                        operation: reason,
                        inside,
                    })
                }
                Ok(()) => {
                    let mode = s.config().backtrace;
                    let outcome = capture::catch(mode, || body(s)).and_then(|outcome| outcome);
                    s.guard.release();
                    classify(outcome)
                }
            };
            let passed = event.is_pass();
            s.record(event);
            passed
        })
    }
}
