//! Labels and the stack of active groups.
//!
//! Every group, assertion and error check may carry a label. The labels of all
//! currently running groups form a [`LabelPath`], and every recorded event is
//! attributed to the path that was active when it happened.

use itertools::Itertools;
use std::{borrow::Cow, fmt};

use crate::tree::NodeId;

/// Separator placed between label segments when a path is displayed.
pub const SEPARATOR: &str = " > ";

/// Anything that can name a group or an assertion.
///
/// Returning `None`, or an empty string, means "no label": the group still runs
/// but contributes no segment to the label path.
pub trait Label {
    fn to_label(&self) -> Option<String>;
}

impl Label for str {
    fn to_label(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl Label for String {
    fn to_label(&self) -> Option<String> {
        self.as_str().to_label()
    }
}

impl Label for Cow<'_, str> {
    fn to_label(&self) -> Option<String> {
        self.as_ref().to_label()
    }
}

impl Label for fmt::Arguments<'_> {
    fn to_label(&self) -> Option<String> {
        self.to_string().to_label()
    }
}

impl<T: Label + ?Sized> Label for &T {
    fn to_label(&self) -> Option<String> {
        (**self).to_label()
    }
}

impl<T: Label> Label for Option<T> {
    fn to_label(&self) -> Option<String> {
        self.as_ref().and_then(Label::to_label)
    }
}

impl Label for () {
    fn to_label(&self) -> Option<String> {
        None
    }
}

macro_rules! display_label {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Label for $ty {
                fn to_label(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

display_label!(char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// The ordered labels of the active groups at the moment an event was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelPath(Vec<String>);

impl LabelPath {
    pub fn new(segments: Vec<String>) -> LabelPath {
        LabelPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for LabelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(SEPARATOR))
    }
}

impl<S: Into<String>> FromIterator<S> for LabelPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        LabelPath(iter.into_iter().map(Into::into).collect())
    }
}

/// One active group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) label: Option<String>,
    /// The result tree node of this group, created on its first failure.
    pub(crate) node: Option<NodeId>,
}

/// The stack of active groups.
///
/// [`LabelStack::enter`] hands out the depth to return to, and [`LabelStack::leave`]
/// truncates back to it. Leaving by depth rather than by popping one frame keeps the
/// stack balanced even when an inner frame was skipped by a caught panic.
#[derive(Debug, Default)]
pub(crate) struct LabelStack {
    frames: Vec<Frame>,
}

impl LabelStack {
    pub(crate) fn enter(&mut self, label: Option<String>) -> usize {
        let depth = self.frames.len();
        self.frames.push(Frame { label, node: None });
        depth
    }

    pub(crate) fn leave(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub(crate) fn path(&self) -> LabelPath {
        self.frames
            .iter()
            .filter_map(|frame| frame.label.clone())
            .collect()
    }

    pub(crate) fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(&"group", Some("group"); "str")]
    #[test_case(&String::from("owned"), Some("owned"); "string")]
    #[test_case(&"", None; "empty str")]
    #[test_case(&(), None; "unit")]
    #[test_case(&Some("inner"), Some("inner"); "some")]
    #[test_case(&None::<&str>, None; "none")]
    #[test_case(&42_u8, Some("42"); "integer")]
    #[test_case(&'x', Some("x"); "char")]
    fn label_text(label: &dyn Label, expected: Option<&str>) {
        assert_eq!(label.to_label().as_deref(), expected);
    }

    #[test]
    fn format_args_label() {
        let n = 3;
        assert_eq!(format_args!("case {n}").to_label().as_deref(), Some("case 3"));
    }

    #[test]
    fn path_skips_unlabeled_frames() {
        let mut stack = LabelStack::default();
        stack.enter(Some("a".into()));
        stack.enter(None);
        stack.enter(Some("b".into()));
        assert_eq!(stack.path(), ["a", "b"].into_iter().collect());
        assert_eq!(stack.path().to_string(), "a > b");
    }

    #[test]
    fn leave_restores_depth() {
        let mut stack = LabelStack::default();
        let outer = stack.enter(Some("outer".into()));
        stack.enter(Some("inner".into()));
        stack.enter(Some("innermost".into()));
        stack.leave(outer);
        assert!(stack.frames_mut().is_empty());
        assert!(stack.path().is_empty());
    }
}
