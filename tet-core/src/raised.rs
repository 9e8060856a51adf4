//! Errors and panics raised by checked code.
//!
//! A [`Raised`] is what tet records when a body "throws": either an error it
//! returned, or a panic caught at the group or assertion boundary. It keeps the
//! error's type name, message, cause chain and a backtrace, and it still owns
//! the error or panic payload itself so that [`Expect`] can test its type.

use std::{
    any::{type_name, Any},
    backtrace::Backtrace,
    borrow::Cow,
    error::Error as StdError,
    fmt,
};

use crate::{
    capture::{self, PanicSite},
    config::BacktraceMode,
};

const PANIC: &str = "panic";

enum Origin {
    Error(Box<dyn StdError + Send + Sync + 'static>),
    Panic(Box<dyn Any + Send + 'static>),
}

pub struct Raised {
    type_name: Cow<'static, str>,
    message: String,
    causes: Vec<String>,
    location: Option<String>,
    backtrace: Option<Backtrace>,
    origin: Origin,
}

impl<E> From<E> for Raised
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        let backtrace = capture::error_backtrace();
        Raised::new(type_name::<E>().into(), Box::new(error), backtrace)
    }
}

impl Raised {
    fn new(
        type_name: Cow<'static, str>,
        error: Box<dyn StdError + Send + Sync + 'static>,
        backtrace: Option<Backtrace>,
    ) -> Raised {
        let causes = std::iter::successors(error.source(), |e| (*e).source())
            .map(ToString::to_string)
            .collect();
        Raised {
            type_name,
            message: error.to_string(),
            causes,
            location: None,
            backtrace,
            origin: Origin::Error(error),
        }
    }

    /// Raise an ad-hoc error carrying only a message.
    pub fn msg(message: impl fmt::Display) -> Raised {
        Raised::from(Message(message.to_string()))
    }

    /// Raise an already boxed error. Its concrete type name is not known, so it is
    /// reported as `dyn Error`.
    pub fn from_boxed(error: Box<dyn StdError + Send + Sync + 'static>) -> Raised {
        Raised::new("dyn Error".into(), error, capture::error_backtrace())
    }

    pub(crate) fn from_panic(
        payload: Box<dyn Any + Send + 'static>,
        site: Option<PanicSite>,
    ) -> Raised {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("Box<dyn Any>"));
        let (location, backtrace) = match site {
            Some(site) => (site.location, site.backtrace),
            None => (None, None),
        };
        Raised {
            type_name: PANIC.into(),
            message,
            causes: Vec::new(),
            location,
            backtrace,
            origin: Origin::Panic(payload),
        }
    }

    /// Type name of the raised error, or `panic`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Messages of the error's `source()` chain, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// `file:line:col` of a panic.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub fn is_panic(&self) -> bool {
        matches!(self.origin, Origin::Panic(_))
    }

    /// Whether this is an `E`: the error itself or any error in its source chain is an
    /// `E`, or the panic payload is one.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        match &self.origin {
            Origin::Error(error) => {
                let root: &(dyn StdError + 'static) = error.as_ref();
                std::iter::successors(Some(root), |e| (*e).source()).any(|e| e.is::<E>())
            }
            Origin::Panic(payload) => payload.is::<E>(),
        }
    }

    /// Printable backtrace frames according to `mode`.
    pub fn frames(&self, mode: BacktraceMode) -> Vec<String> {
        self.backtrace
            .as_ref()
            .map(|backtrace| capture::frames(backtrace, mode))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raised")
            .field("type_name", &self.type_name)
            .field("message", &self.message)
            .field("causes", &self.causes)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.type_name, self.message)
    }
}

/// The error behind [`Raised::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Any,
    Panic,
    Type(fn(&Raised) -> bool),
}

/// What an `err` check expects its body to raise.
#[derive(Debug, Clone)]
pub struct Expect {
    name: Cow<'static, str>,
    matcher: Matcher,
}

impl Expect {
    /// Any error or panic.
    pub fn any() -> Expect {
        Expect {
            name: "any error".into(),
            matcher: Matcher::Any,
        }
    }

    /// A panic, whatever its payload.
    pub fn panic() -> Expect {
        Expect {
            name: PANIC.into(),
            matcher: Matcher::Panic,
        }
    }

    /// An `E`, directly or anywhere in the raised error's source chain.
    pub fn of<E: StdError + 'static>() -> Expect {
        Expect {
            name: type_name::<E>().into(),
            matcher: Matcher::Type(Raised::is::<E>),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, raised: &Raised) -> bool {
        match self.matcher {
            Matcher::Any => true,
            Matcher::Panic => raised.is_panic(),
            Matcher::Type(is) => is(raised),
        }
    }
}

impl Default for Expect {
    fn default() -> Self {
        Expect::any()
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
