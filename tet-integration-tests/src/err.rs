use std::num::ParseIntError;
use tet::{Expect, Session};

use crate::helpers::Intended;

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("port is not a number")]
    Port(#[from] ParseIntError),
}

#[derive(Debug, thiserror::Error)]
#[error("no such method")]
struct NoMethodError;

fn load_port(raw: &str) -> Result<u16, ConfigError> {
    Ok(raw.parse()?)
}

pub fn run(s: &mut Session, intended: &mut Intended) {
    s.group("#err", |s| {
        s.group("passes when there is an error", |s| {
            let raised = s.err_any((), |_| -> () { panic!("not a method") });
            s.err_any((), |_| load_port("http"));
            s.assert("... and returns true", |_| raised);
        });

        s.group("allows you to specify an error type", |s| {
            s.err((), Expect::of::<ConfigError>(), |_| load_port("x"));

            s.group("... or one from its source chain", |s| {
                s.err((), Expect::of::<ParseIntError>(), |_| load_port("x"))
            });

            s.err("panics can be expected", Expect::panic(), |_| -> () {
                panic!("expected panic")
            });

            let raised = s.err((), Expect::of::<ConfigError>(), |_| load_port("x"));
            s.assert("... and returns true", |_| raised);
        });

        s.group("fails when there is no error", |s| {
            let raised = intended.should_fail(s, |s| s.err_any((), |_| load_port("80")));
            s.assert("... and returns false", |_| raised == Some(false));
        });

        s.group("fails given the wrong error type", |s| {
            let raised = intended.should_fail(s, |s| {
                s.err((), Expect::of::<NoMethodError>(), |_| load_port("x"))
            });
            s.assert("... and returns false", |_| raised == Some(false));

            intended.should_fail(s, |s| {
                s.err("a wrapped error is not its wrapper", Expect::of::<ConfigError>(), |_| {
                    "x".parse::<u16>()
                })
            });
            intended.should_fail(s, |s| {
                s.err("an error is not a panic", Expect::panic(), |_| load_port("x"))
            });
        });

        intended.should_fail(s, |s| s.err_any("Can have a name", |_| ()));
    });
}
