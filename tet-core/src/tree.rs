//! Ordered, hierarchical log of failures and errors.
//!
//! The tree is an arena: nodes live in one `Vec` and refer to each other by
//! [`NodeId`]. Label nodes stand for one run of a group; leaves hold a recorded
//! failing [`Event`]. Label nodes are only created the first time something
//! fails beneath them, so passing groups never show up. Nothing is ever removed
//! or reordered, which keeps the rendered report deterministic.

use crate::{
    event::Event,
    label::{Frame, LabelPath},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub enum NodeKind {
    Label(String),
    Leaf(Event),
}

#[derive(Debug)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

#[derive(Debug, Default)]
pub struct ResultTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    leaves: usize,
}

impl ResultTree {
    pub fn new() -> ResultTree {
        ResultTree::default()
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn push_label(&mut self, parent: Option<NodeId>, label: String) -> NodeId {
        self.push(parent, NodeKind::Label(label))
    }

    pub(crate) fn push_leaf(&mut self, parent: Option<NodeId>, event: Event) -> NodeId {
        self.leaves += 1;
        self.push(parent, NodeKind::Leaf(event))
    }

    /// Create label nodes for the labeled active groups that have none yet, and return
    /// the node the next leaf belongs under.
    pub(crate) fn attach(&mut self, frames: &mut [Frame]) -> Option<NodeId> {
        let mut parent = None;
        for frame in frames {
            let Some(label) = &frame.label else {
                continue;
            };
            let node = match frame.node {
                Some(node) => node,
                None => {
                    let node = self.push_label(parent, label.clone());
                    frame.node = Some(node);
                    node
                }
            };
            parent = Some(node);
        }
        parent
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether any failure or error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Labels of the label-node ancestors of `id`, root first. For a label node the
    /// path includes its own label.
    pub fn path(&self, id: NodeId) -> LabelPath {
        let mut labels: Vec<String> =
            std::iter::successors(Some(id), |id| self.nodes.get(id.0).and_then(|n| n.parent))
                .filter_map(|id| match &self.nodes.get(id.0)?.kind {
                    NodeKind::Label(label) => Some(label.clone()),
                    NodeKind::Leaf(_) => None,
                })
                .collect();
        labels.reverse();
        LabelPath::new(labels)
    }

    /// Depth-first walk in insertion order, yielding each node with its depth.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.iter().rev().map(|id| (*id, 0)).collect(),
        }
    }

    /// Every recorded failure with its full label path, in report order.
    pub fn leaves(&self) -> impl Iterator<Item = (LabelPath, &Event)> + '_ {
        self.walk().filter_map(|(id, _)| match &self.nodes[id.0].kind {
            NodeKind::Leaf(event) => Some((self.path(id), event)),
            NodeKind::Label(_) => None,
        })
    }
}

pub struct Walk<'a> {
    tree: &'a ResultTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Walk<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack
            .extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        Some((id, depth))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{event::Failure, label::LabelStack};
    use pretty_assertions::assert_eq;

    fn fail() -> Event {
        Event::Fail(Failure::Falsy)
    }

    #[test]
    fn leaf_path_equals_label_ancestors() {
        let mut tree = ResultTree::new();
        let a = tree.push_label(None, "a".into());
        let b = tree.push_label(Some(a), "b".into());
        let leaf = tree.push_leaf(Some(b), fail());
        assert_eq!(tree.path(leaf).to_string(), "a > b");
        assert_eq!(tree.path(b), tree.path(leaf));
        assert_eq!(tree.get(leaf).and_then(|n| n.parent), Some(b));
    }

    #[test]
    fn walk_is_depth_first_in_insertion_order() {
        let mut tree = ResultTree::new();
        let a = tree.push_label(None, "a".into());
        let a1 = tree.push_leaf(Some(a), fail());
        let b = tree.push_label(Some(a), "b".into());
        let b1 = tree.push_leaf(Some(b), fail());
        let a2 = tree.push_leaf(Some(a), fail());
        let c = tree.push_label(None, "c".into());
        let c1 = tree.push_leaf(Some(c), fail());

        let order: Vec<_> = tree.walk().collect();
        assert_eq!(
            order,
            [(a, 0), (a1, 1), (b, 1), (b1, 2), (a2, 1), (c, 0), (c1, 1)]
        );
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn leaves_yield_paths_in_report_order() {
        let mut tree = ResultTree::new();
        tree.push_leaf(None, fail());
        let g = tree.push_label(None, "g".into());
        tree.push_leaf(Some(g), Event::Fail(Failure::EmptyGroup));

        let leaves: Vec<_> = tree
            .leaves()
            .map(|(path, event)| (path.to_string(), event.mark()))
            .collect();
        assert_eq!(leaves, [(String::new(), 'F'), ("g".to_string(), 'F')]);
    }

    #[test]
    fn attach_creates_label_nodes_once_per_group_run() {
        let mut tree = ResultTree::new();
        let mut stack = LabelStack::default();
        let outer = stack.enter(Some("outer".into()));
        stack.enter(None);
        let first = tree.attach(stack.frames_mut());
        let second = tree.attach(stack.frames_mut());
        assert_eq!(first, second);
        assert_eq!(tree.walk().count(), 1);

        // A sibling run with the same label gets its own node.
        stack.leave(outer);
        stack.enter(Some("outer".into()));
        let third = tree.attach(stack.frames_mut());
        assert_ne!(first, third);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn attach_without_labels_is_root() {
        let mut tree = ResultTree::new();
        let mut stack = LabelStack::default();
        stack.enter(None);
        assert_eq!(tree.attach(stack.frames_mut()), None);
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn empty_tree() {
        let tree = ResultTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.walk().count(), 0);
    }
}
