use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

use crate::{config::BacktraceMode, raised::Raised};

/// Where a caught panic happened, recorded by the panic hook.
#[derive(Debug)]
pub(crate) struct PanicSite {
    pub(crate) location: Option<String>,
    pub(crate) backtrace: Option<Backtrace>,
}

thread_local! {
    /// Backtrace policy of the innermost body tet is currently evaluating on this thread.
    static SCOPE: Cell<Option<BacktraceMode>> = const { Cell::new(None) };
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Install tet's panic hook once per process.
///
/// Panics raised while a body runs under [`catch`] are recorded silently, since they end
/// up in the report. Panics anywhere else go to the hook that was installed before.
fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| match SCOPE.with(Cell::get) {
            Some(mode) => {
                let site = PanicSite {
                    location: info.location().map(ToString::to_string),
                    backtrace: mode.capture(),
                };
                LAST_PANIC.with(|last| *last.borrow_mut() = Some(site));
            }
            None => previous(info),
        }));
    });
}

/// Run `f`, turning a panic into a [`Raised`].
pub(crate) fn catch<T>(mode: BacktraceMode, f: impl FnOnce() -> T) -> Result<T, Raised> {
    install_hook();
    let outer = SCOPE.with(|scope| scope.replace(Some(mode)));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    SCOPE.with(|scope| scope.set(outer));

    result.map_err(|payload: Box<dyn Any + Send>| {
        let site = LAST_PANIC.with(|last| last.borrow_mut().take());
        Raised::from_panic(payload, site)
    })
}

/// Backtrace for an error converted into a [`Raised`] on this thread.
///
/// Inside [`catch`] the session's policy decides. Outside, the standard
/// `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` variables do.
pub(crate) fn error_backtrace() -> Option<Backtrace> {
    match SCOPE.with(Cell::get) {
        Some(mode) => mode.capture(),
        None => Some(Backtrace::capture()),
    }
}

const INTERNAL_PREFIXES: &[&str] = &[
    "tet_core::",
    "tet::",
    "std::",
    "core::",
    "alloc::",
    "test::",
    "rust_begin_unwind",
    "rust_panic",
    "__",
    "_start",
    "_pthread",
    "start_thread",
    "thread_start",
    "clone",
    "BaseThreadInitThunk",
    "RtlUserThreadStart",
];

fn has_internal_prefix(path: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Strip references, pointers, `dyn` and slice brackets off a type.
fn bare_type(ty: &str) -> &str {
    let mut ty = ty.trim();
    loop {
        let stripped = ty
            .trim_start_matches(['&', '[', '('])
            .trim_start_matches("mut ")
            .trim_start_matches("dyn ")
            .trim_start_matches("*const ")
            .trim_start_matches("*mut ");
        if stripped == ty {
            return ty;
        }
        ty = stripped;
    }
}

/// A type without a path: a generic parameter such as `T`, or a primitive such as `u8`.
fn is_pathless(ty: &str) -> bool {
    !ty.is_empty() && ty.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_internal_type(ty: &str) -> bool {
    let ty = bare_type(ty);
    ty.starts_with("fn(") || has_internal_prefix(ty)
}

/// Split the inside of `<X as Y>::f` or `<X>::f` into `X` and `Y`.
fn split_qualified(inner: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            // `->` of a fn pointer type.
            '>' if inner[..i].ends_with('-') => {}
            ')' | ']' | '>' if depth > 0 => depth -= 1,
            '>' => return (&inner[..i], None),
            ' ' if depth == 0 && inner[i..].starts_with(" as ") => {
                return (&inner[..i], Some(&inner[i + 4..]));
            }
            _ => {}
        }
    }
    (inner, None)
}

/// Whether a frame belongs to tet, the standard library, the test harness or the process
/// runtime.
///
/// `<X as Y>::f` is internal when both `X` and `Y` are. A generic or primitive `X` takes
/// after `Y`.
fn is_internal(symbol: &str) -> bool {
    if symbol == "main" || symbol == "<unknown>" {
        return true;
    }
    let Some(inner) = symbol.strip_prefix('<') else {
        return has_internal_prefix(symbol);
    };
    let (self_ty, trait_ty) = split_qualified(inner);
    let self_internal = is_pathless(bare_type(self_ty)) || is_internal_type(self_ty);
    self_internal && trait_ty.map_or(true, is_internal_type)
}

/// One printable line per frame, `symbol at file:line:col`.
///
/// [`BacktraceMode::Short`] keeps only frames outside tet, the standard library and the
/// process runtime.
pub(crate) fn frames(backtrace: &Backtrace, mode: BacktraceMode) -> Vec<String> {
    if mode == BacktraceMode::Off || backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse_frames(&backtrace.to_string())
        .into_iter()
        .filter(|(symbol, _)| mode == BacktraceMode::Full || !is_internal(symbol))
        .map(|(symbol, location)| match location {
            Some(location) => format!("{symbol} at {location}"),
            None => symbol,
        })
        .collect()
}

/// Split the `Display` output of a std backtrace into `(symbol, location)` pairs.
fn parse_frames(text: &str) -> Vec<(String, Option<String>)> {
    let mut frames: Vec<(String, Option<String>)> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some((_, slot)) = frames.last_mut() {
                slot.get_or_insert_with(|| location.to_string());
            }
            continue;
        }
        if let Some((index, symbol)) = line.split_once(": ") {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                frames.push((symbol.to_string(), None));
            }
        }
    }
    frames
}
