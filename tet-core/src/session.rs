use tracing::*;

use crate::{
    capture,
    config::{get_tet_config, Config},
    event::{Counters, Event, Failure, Summary},
    guard::NestingGuard,
    label::{Label, LabelPath, LabelStack},
    raised::Raised,
    reporter::{DotReporter, Reporter},
    tree::ResultTree,
};

/// Path segment under which an error escaping a group body is recorded.
pub const GROUP_ERROR: &str = "ERROR IN GROUP";

/// One run of checks: the label stack, the nesting guard, the counters, the
/// result tree and the reporters that watch it all.
///
/// The report is rendered once, by [`Session::finish`] or, if that was never
/// called, when the session is dropped.
pub struct Session {
    cfg: Config,
    labels: LabelStack,
    pub(crate) guard: NestingGuard,
    counters: Counters,
    tree: ResultTree,
    reporters: Vec<Box<dyn Reporter>>,
    finished: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    /// A session using the process configuration, reporting to stdout.
    pub fn new() -> Session {
        let cfg = get_tet_config().clone();
        let reporter = DotReporter::new(&cfg);
        let mut session = Session::with_config(cfg);
        session.add_reporter(reporter);
        session
    }

    /// A session without any reporter.
    pub fn with_config(cfg: Config) -> Session {
        debug!("session started: {cfg:?}");
        Session {
            cfg,
            labels: LabelStack::default(),
            guard: NestingGuard::default(),
            counters: Counters::default(),
            tree: ResultTree::new(),
            reporters: Vec::new(),
            finished: false,
        }
    }

    pub fn add_reporter(&mut self, reporter: impl Reporter + 'static) {
        self.reporters.push(Box::new(reporter));
    }

    pub fn add_boxed_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    /// Labels of the groups currently running.
    pub fn path(&self) -> LabelPath {
        self.labels.path()
    }

    /// Run `body` with `label` added to the label path.
    ///
    /// Returns what `body` returned, or `None` if it panicked. A panic is recorded as an
    /// error under [`GROUP_ERROR`] and goes no further. A group that records nothing at
    /// all is recorded as a failure.
    pub fn group<L, T, F>(&mut self, label: L, body: F) -> Option<T>
    where
        L: Label,
        F: FnOnce(&mut Session) -> T,
    {
        self.scoped(label, |s| Ok(body(s)))
    }

    /// Like [`Session::group`], with `Err` treated the same as a panic.
    pub fn try_group<L, T, E, F>(&mut self, label: L, body: F) -> Option<T>
    where
        L: Label,
        E: Into<Raised>,
        F: FnOnce(&mut Session) -> Result<T, E>,
    {
        self.scoped(label, |s| body(s).map_err(Into::into))
    }

    fn scoped<L, T, F>(&mut self, label: L, body: F) -> Option<T>
    where
        L: Label,
        F: FnOnce(&mut Session) -> Result<T, Raised>,
    {
        let before = self.counters.tests;
        let depth = self.labels.enter(label.to_label());

        let mode = self.cfg.backtrace;
        let outcome = capture::catch(mode, || body(self)).and_then(|result| result);
        let output = match outcome {
            Ok(output) => Some(output),
            Err(raised) => {
                warn!(path = %self.labels.path(), "error in group: {raised}");
                let marker = self.labels.enter(Some(GROUP_ERROR.to_string()));
                self.record(Event::Error(raised));
                self.labels.leave(marker);
                None
            }
        };

        if self.counters.tests == before {
            self.record(Event::Fail(Failure::EmptyGroup));
        }

        self.labels.leave(depth);
        output
    }

    /// Run `f` with `label` on the stack. Unlike a group, `f` is not caught and nothing is
    /// recorded for it.
    pub(crate) fn labeled<T>(
        &mut self,
        label: Option<String>,
        f: impl FnOnce(&mut Session) -> T,
    ) -> T {
        let depth = self.labels.enter(label);
        let output = f(self);
        self.labels.leave(depth);
        output
    }

    /// Count `event`, hand it to the reporters and, unless it passed, log it in the
    /// result tree under the current path.
    pub(crate) fn record(&mut self, event: Event) {
        let kind = event.kind();
        self.counters.count(kind);

        let path = self.labels.path();
        debug!(%path, %kind, "event recorded");
        for reporter in &mut self.reporters {
            if let Err(e) = reporter.on_event(&path, &event) {
                warn!("reporter failed on event: {e}");
            }
        }

        if !event.is_pass() {
            let parent = self.tree.attach(self.labels.frames_mut());
            self.tree.push_leaf(parent, event);
        }
    }

    fn report(&mut self) -> Summary {
        let summary = self.counters;
        if self.finished {
            return summary;
        }
        self.finished = true;

        debug!("session finished: {summary}");
        for reporter in &mut self.reporters {
            if let Err(e) = reporter.on_finish(&summary, &self.tree) {
                error!("reporter failed to write the report: {e}");
            }
        }
        summary
    }

    /// Render the report and return the final counts.
    pub fn finish(mut self) -> Summary {
        self.report()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.report();
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::event::EventKind;
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, panic::AssertUnwindSafe, rc::Rc};

    pub(crate) type Log = Rc<RefCell<Vec<(String, EventKind)>>>;

    /// Keeps `(path, kind)` of every event.
    pub(crate) struct Recording(pub(crate) Log);

    impl Reporter for Recording {
        fn on_event(&mut self, path: &LabelPath, event: &Event) -> crate::Result<()> {
            self.0.borrow_mut().push((path.to_string(), event.kind()));
            Ok(())
        }
    }

    pub(crate) fn session() -> (Session, Log) {
        let log = Log::default();
        let mut session = Session::with_config(Config::default());
        session.add_reporter(Recording(log.clone()));
        (session, log)
    }

    fn counters(tests: usize, fails: usize, errors: usize) -> Counters {
        Counters {
            tests,
            fails,
            errors,
        }
    }

    #[test]
    fn group_returns_body_output() {
        let (mut s, _) = session();
        let out = s.group("example", |s| {
            s.assert("inside", |_| true);
            "example output"
        });
        assert_eq!(out, Some("example output"));
    }

    #[test]
    fn label_path_is_concatenation_of_enclosing_labels() {
        let (mut s, log) = session();
        s.group("a", |s| {
            s.group((), |s| {
                s.group("b", |s| {
                    assert_eq!(s.path().to_string(), "a > b");
                    s.assert("c", |_| true)
                })
            })
        });
        assert_eq!(log.borrow().as_slice(), [("a > b > c".to_string(), EventKind::Pass)]);
        assert!(s.path().is_empty());
    }

    #[test]
    fn empty_group_is_a_failure() {
        let (mut s, log) = session();
        s.group("empty", |_| {});
        assert_eq!(s.counters(), counters(1, 1, 0));
        assert_eq!(log.borrow().as_slice(), [("empty".to_string(), EventKind::Fail)]);
        let (path, event) = s.tree().leaves().next().unwrap();
        assert_eq!(path.to_string(), "empty");
        assert!(matches!(event, Event::Fail(Failure::EmptyGroup)));
    }

    #[test]
    fn only_the_empty_inner_group_fails() {
        let (mut s, _) = session();
        s.group("outer", |s| s.group("inner", |_| ()));
        assert_eq!(s.counters(), counters(1, 1, 0));
        let paths: Vec<_> = s.tree().leaves().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, ["outer > inner"]);
    }

    #[test]
    fn panic_in_group_is_recorded_and_swallowed() {
        let (mut s, log) = session();
        let out: Option<()> = s.group("g", |_| panic!("Example Error"));
        assert_eq!(out, None);
        assert_eq!(s.counters(), counters(1, 1, 1));
        assert_eq!(
            log.borrow().as_slice(),
            [(format!("g > {GROUP_ERROR}"), EventKind::Error)]
        );
        assert!(s.path().is_empty(), "label stack leaked a frame");
    }

    #[test]
    fn panic_in_nested_group_keeps_siblings_running() {
        let (mut s, log) = session();
        s.group("outer", |s| {
            s.group("broken", |_| -> () { panic!("nope") });
            s.assert("sibling", |s| s.path().to_string() == "outer > sibling")
        });
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1], ("outer > sibling".to_string(), EventKind::Pass));
    }

    #[test]
    fn try_group_err_is_an_error() {
        let (mut s, log) = session();
        let out = s.try_group("parse", |_| "x".parse::<u32>());
        assert_eq!(out, None);
        assert_eq!(
            log.borrow().as_slice(),
            [(format!("parse > {GROUP_ERROR}"), EventKind::Error)]
        );
    }

    #[test]
    fn try_group_ok_passes_value_through() {
        let (mut s, _) = session();
        let out = s.try_group("parse", |s| {
            s.assert("fine", |_| true);
            "42".parse::<u32>()
        });
        assert_eq!(out, Some(42));
        assert_eq!(s.counters(), counters(1, 0, 0));
    }

    #[test]
    fn passing_paths_stay_out_of_the_tree() {
        let (mut s, _) = session();
        s.group("g", |s| {
            s.assert("a", |_| true);
            s.assert("b", |_| false);
        });
        s.group("clean", |s| s.assert("ok", |_| true));
        let paths: Vec<_> = s.tree().leaves().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, ["g > b"]);
        assert_eq!(s.tree().roots().len(), 1);
    }

    struct CountFinish(Rc<RefCell<usize>>);

    impl Reporter for CountFinish {
        fn on_finish(&mut self, _: &Summary, _: &ResultTree) -> crate::Result<()> {
            *self.0.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn finish_reports_once() {
        let finished = Rc::new(RefCell::new(0));
        let mut s = Session::with_config(Config::default());
        s.add_reporter(CountFinish(finished.clone()));
        s.assert("ok", |_| true);
        let summary = s.finish();
        assert_eq!(summary, counters(1, 0, 0));
        assert_eq!(*finished.borrow(), 1);

        let mut s = Session::with_config(Config::default());
        s.add_reporter(CountFinish(finished.clone()));
        drop(s);
        assert_eq!(*finished.borrow(), 2);
    }

    #[test]
    fn panic_outside_every_group_still_reports_once() {
        let finished = Rc::new(RefCell::new(0));
        let result: std::thread::Result<()> = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let mut s = Session::with_config(Config::default());
            s.add_reporter(CountFinish(finished.clone()));
            s.assert("ok", |_| true);
            panic!("escaped every group");
        }));
        assert!(result.is_err());
        assert_eq!(*finished.borrow(), 1);
    }

    #[test]
    fn report_goes_to_the_target() {
        let target = Shared::default();
        let cfg = Config {
            color: crate::config::ColorSetting::Never,
            ..Config::default()
        };
        let mut s = Session::with_config(cfg.clone());
        s.add_reporter(DotReporter::new(&cfg).with_target(target.clone()));
        s.group("g", |s| {
            s.assert("a", |_| true);
            s.assert("b", |_| false);
        });
        s.finish();
        assert_eq!(
            target.text(),
            ".F\n2 tests, 1 fail\nFailed tests:\n  - g > b\n"
        );
    }

    #[derive(Default, Clone)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl std::io::Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
