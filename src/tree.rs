//! Syntax tree for parsed Piklisp source.
//!
//! Nodes live in a single arena owned by [`Tree`] and refer to each other
//! through [`NodeId`] handles. A node is either a leaf holding a token, or an
//! interior node holding an ordered list of children.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Node {
    content: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An s-expression tree.
///
/// Construction only ever grows the arena. [`Tree::collapse`] moves the root
/// handle down instead of removing nodes, so wrappers left above the root are
/// unreachable and ignored by equality, rendering and serialization.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Creates a tree holding a single detached, empty root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            root: NodeId(0),
        }
    }

    /// Creates a one-node tree whose root is a leaf holding `text`.
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                content: Some(text.into()),
                ..Node::default()
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrowed view of the root, for walking the tree.
    pub fn root_ref(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Appends a new empty node as the last child of `parent` and returns it.
    pub fn make_child(&mut self, parent: NodeId) -> NodeId {
        self.push_child(parent, None)
    }

    /// Appends a leaf holding `text` as the last child of `parent`.
    pub fn add_token(&mut self, parent: NodeId, text: impl Into<String>) {
        self.push_child(parent, Some(text.into()));
    }

    fn push_child(&mut self, parent: NodeId, content: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            content,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Strips content-less single-child wrappers off the top of the tree.
    ///
    /// While the root has no content and exactly one child, that child becomes
    /// the root. An empty root (no children) is kept as is.
    pub fn collapse(&mut self) {
        loop {
            let root = &self.nodes[self.root.0];
            match root.children.as_slice() {
                [only] if root.content.is_none() => self.root = *only,
                _ => break,
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Parent of `id`, or `None` if `id` is the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root {
            return None;
        }
        self.nodes[id.0].parent
    }

    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].content.as_deref()
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].content.is_some()
    }

    /// Number of `parent` steps from `id` up to the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(id));
        }
        count
    }

    /// True when the root is an empty interior node.
    pub fn is_empty(&self) -> bool {
        !self.is_leaf(self.root) && self.children(self.root).is_empty()
    }

    fn same_shape(&self, other: &Tree) -> bool {
        let mut pending = vec![(self.root, other.root)];
        while let Some((a, b)) = pending.pop() {
            let (left, right) = (&self.nodes[a.0], &other.nodes[b.0]);
            if left.content != right.content || left.children.len() != right.children.len() {
                return false;
            }
            pending.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other)
    }
}

impl Eq for Tree {}

// ============================================================================
// BORROWED NODE VIEW
// ============================================================================

/// A read-only view of one node, tied to the tree that owns it.
#[derive(Debug, Copy, Clone)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn content(&self) -> Option<&'a str> {
        self.tree.content(self.id)
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.is_leaf(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.parent(self.id).map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id).iter().map(move |&id| tree.node(id))
    }
}

enum Step {
    Open(NodeId),
    Space,
    Close,
}

// Walks with an explicit stack so deeply nested input cannot exhaust the
// call stack.
impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        let mut steps = vec![Step::Open(self.id)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Space => f.write_str(" ")?,
                Step::Close => f.write_str(")")?,
                Step::Open(id) => {
                    if let Some(text) = tree.content(id) {
                        f.write_str(text)?;
                        continue;
                    }
                    f.write_str("(")?;
                    steps.push(Step::Close);
                    for (i, &child) in tree.children(id).iter().enumerate().rev() {
                        steps.push(Step::Open(child));
                        if i > 0 {
                            steps.push(Step::Space);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root_ref())
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

// Leaves serialize as strings, interior nodes as arrays of their children.
impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(text) = self.content() {
            return serializer.serialize_str(text);
        }
        let children = self.children();
        let mut seq = serializer.serialize_seq(Some(children.len()))?;
        for child in children {
            seq.serialize_element(&child)?;
        }
        seq.end()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root_ref().serialize(serializer)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_root_is_detached_and_empty() {
        let tree = Tree::new();
        let root = tree.root();
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.content(root), None);
        assert!(tree.children(root).is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn make_child_appends_in_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.make_child(root);
        let b = tree.make_child(root);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.last_child(root), Some(b));
        assert_eq!(tree.parent(b), Some(root));
        assert_eq!(tree.depth(b), 1);
    }

    #[test]
    fn add_token_creates_leaf_child() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_token(root, "foo");
        let leaf = tree.last_child(root).unwrap();
        assert!(tree.is_leaf(leaf));
        assert_eq!(tree.content(leaf), Some("foo"));
        assert!(!tree.is_leaf(root));
    }

    #[test]
    fn collapse_strips_single_child_wrappers() {
        let mut tree = Tree::new();
        let outer = tree.make_child(tree.root());
        let inner = tree.make_child(outer);
        tree.add_token(inner, "a");
        tree.add_token(inner, "b");
        tree.collapse();
        assert_eq!(tree.root(), inner);
        assert_eq!(tree.parent(inner), None);
        assert_eq!(tree.to_string(), "(a b)");
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn collapse_reaches_a_single_leaf() {
        let mut tree = Tree::new();
        let block = tree.make_child(tree.root());
        tree.add_token(block, "x");
        tree.collapse();
        assert_eq!(tree, Tree::leaf("x"));
    }

    #[test]
    fn collapse_keeps_empty_root() {
        let mut tree = Tree::new();
        tree.collapse();
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "()");
    }

    #[test]
    fn equality_ignores_arena_layout() {
        let mut left = Tree::new();
        let wrapper = left.make_child(left.root());
        left.add_token(wrapper, "a");
        left.add_token(wrapper, "b");
        left.collapse();

        let mut right = Tree::new();
        right.add_token(right.root(), "a");
        right.add_token(right.root(), "b");

        assert_eq!(left, right);
    }

    #[test]
    fn node_ref_walks_children_and_parent() {
        let mut tree = Tree::new();
        let list = tree.make_child(tree.root());
        tree.add_token(list, "if");
        tree.add_token(list, "c");
        let root = tree.root_ref();
        let list_ref = root.children().next().unwrap();
        let names: Vec<_> = list_ref.children().filter_map(|n| n.content()).collect();
        assert_eq!(names, vec!["if", "c"]);
        assert_eq!(list_ref.parent().map(|p| p.id()), Some(tree.root()));
    }

    #[test]
    fn renders_mixed_leaves_and_lists() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_token(root, "if");
        let test = tree.make_child(root);
        tree.add_token(test, "<");
        tree.add_token(test, "n");
        tree.make_child(root);
        tree.add_token(root, "x");
        assert_eq!(tree.to_string(), "(if (< n) () x)");
    }

    #[test]
    fn unequal_when_a_leaf_differs_deep_down() {
        let build = |last: &str| {
            let mut tree = Tree::new();
            let outer = tree.make_child(tree.root());
            let inner = tree.make_child(outer);
            tree.add_token(inner, "a");
            tree.add_token(inner, last.to_string());
            tree
        };
        assert_eq!(build("b"), build("b"));
        assert_ne!(build("b"), build("c"));
    }

    #[test]
    fn very_deep_tree_compares_and_renders() {
        const DEPTH: usize = 100_000;
        let mut tree = Tree::new();
        let mut node = tree.root();
        for _ in 0..DEPTH {
            tree.add_token(node, "x");
            node = tree.make_child(node);
        }
        let copy = tree.clone();
        assert_eq!(tree, copy);

        let text = tree.to_string();
        assert!(text.starts_with("(x (x (x"));
        assert!(text.ends_with("())))"));
        assert_eq!(text.matches('(').count(), DEPTH + 1);
        assert_eq!(text.matches(')').count(), DEPTH + 1);
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let mut tree = Tree::new();
        tree.add_token(tree.root(), "fmt.Println");
        let args = tree.make_child(tree.root());
        tree.add_token(args, "\"hi\"");
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"["fmt.Println",["\"hi\""]]"#);
    }
}
