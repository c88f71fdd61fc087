use std::any::Any;
use std::cell::RefMut;
use std::fmt::{self, Write as _};
use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

/// Identifier of a node inside an [`Applier`] arena.
pub type NodeId = usize;

/// A node in the applied tree. Concrete node types live with the widgets that
/// emit them; the runtime only needs downcast hooks, a debug summary, and the
/// optional identity tag containers attach to their items.
pub trait Node: 'static {
    fn kind(&self) -> &'static str;

    /// One-line description used by `dump_tree`.
    fn summary(&self) -> String {
        self.kind().to_string()
    }

    /// Stable identity assigned by an enclosing container, if any.
    fn assigned_key(&self) -> Option<&str> {
        None
    }

    fn set_assigned_key(&mut self, _key: Option<String>) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Errors surfaced by node access and structural application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    Missing { id: NodeId },
    TypeMismatch { id: NodeId, expected: &'static str },
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Missing { id } => write!(f, "node {id} is not present in the applier"),
            NodeError::TypeMismatch { id, expected } => {
                write!(f, "node {id} is not of the expected type {expected}")
            }
        }
    }
}

impl std::error::Error for NodeError {}

/// Receiver of structural changes produced by composition.
pub trait Applier {
    fn create(&mut self, node: Box<dyn Node>) -> NodeId;
    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize)
        -> Result<(), NodeError>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError>;
    fn move_child(&mut self, parent: NodeId, from: usize, to: usize) -> Result<(), NodeError>;
    fn destroy(&mut self, id: NodeId);
    fn node(&self, id: NodeId) -> Option<&dyn Node>;
    fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn Node>;
    fn children(&self, id: NodeId) -> &[NodeId];
    fn root_id(&self) -> NodeId;
}

/// Implicit root every applier tree hangs from.
pub struct RootNode;

impl Node for RootNode {
    fn kind(&self) -> &'static str {
        "root"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// In-memory applier backing headless compositions and tests.
pub struct MemoryApplier {
    nodes: Vec<Option<Box<dyn Node>>>,
    children: FxHashMap<NodeId, Vec<NodeId>>,
    root: NodeId,
}

impl MemoryApplier {
    pub fn new() -> Self {
        let mut applier = Self {
            nodes: Vec::new(),
            children: FxHashMap::default(),
            root: 0,
        };
        applier.root = applier.create(Box::new(RootNode));
        applier
    }

    /// Number of live nodes, the implicit root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow a node downcast to its concrete type.
    pub fn with_node<N: Node, R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&N) -> R,
    ) -> Result<R, NodeError> {
        let node = self.node(id).ok_or(NodeError::Missing { id })?;
        let node = node
            .as_any()
            .downcast_ref::<N>()
            .ok_or(NodeError::TypeMismatch {
                id,
                expected: std::any::type_name::<N>(),
            })?;
        Ok(f(node))
    }

    /// Mutably borrow a node downcast to its concrete type.
    pub fn with_node_mut<N: Node, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut N) -> R,
    ) -> Result<R, NodeError> {
        let node = self.node_mut(id).ok_or(NodeError::Missing { id })?;
        let node = node
            .as_any_mut()
            .downcast_mut::<N>()
            .ok_or(NodeError::TypeMismatch {
                id,
                expected: std::any::type_name::<N>(),
            })?;
        Ok(f(node))
    }

    /// Render the subtree under `id` as indented text for debugging.
    pub fn dump_tree(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(id, 0, &mut out);
        out
    }

    fn dump_into(&self, id: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self.node(id) {
            Some(node) => {
                let _ = write!(out, "{}", node.summary());
                if let Some(key) = node.assigned_key() {
                    let _ = write!(out, " key={key}");
                }
                out.push('\n');
            }
            None => {
                let _ = writeln!(out, "<missing {id}>");
            }
        }
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.dump_into(child, depth + 1, out);
        }
    }
}

impl Default for MemoryApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl Applier for MemoryApplier {
    fn create(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(node));
        id
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), NodeError> {
        if self.node(parent).is_none() {
            return Err(NodeError::Missing { id: parent });
        }
        let list = self.children.entry(parent).or_default();
        let index = index.min(list.len());
        list.insert(index, child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        let list = self
            .children
            .get_mut(&parent)
            .ok_or(NodeError::Missing { id: parent })?;
        match list.iter().position(|&c| c == child) {
            Some(position) => {
                list.remove(position);
                Ok(())
            }
            None => Err(NodeError::Missing { id: child }),
        }
    }

    fn move_child(&mut self, parent: NodeId, from: usize, to: usize) -> Result<(), NodeError> {
        let list = self
            .children
            .get_mut(&parent)
            .ok_or(NodeError::Missing { id: parent })?;
        if from >= list.len() {
            log::warn!("move_child: index {from} out of bounds for parent {parent}");
            return Ok(());
        }
        let child = list.remove(from);
        let to = to.min(list.len());
        list.insert(to, child);
        Ok(())
    }

    fn destroy(&mut self, id: NodeId) {
        match self.nodes.get_mut(id) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.children.remove(&id);
            }
            _ => log::warn!("destroy: node {id} is already gone"),
        }
    }

    fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(id)?.as_deref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn Node> {
        match self.nodes.get_mut(id) {
            Some(slot) => slot.as_deref_mut(),
            None => None,
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn root_id(&self) -> NodeId {
        self.root
    }
}

/// Borrow guard handed out by [`crate::Composition::applier_mut`].
pub struct ApplierGuard<'a, A: Applier + 'static> {
    inner: RefMut<'a, A>,
}

impl<'a, A: Applier + 'static> ApplierGuard<'a, A> {
    pub(crate) fn new(inner: RefMut<'a, A>) -> Self {
        Self { inner }
    }
}

impl<'a, A: Applier + 'static> Deref for ApplierGuard<'a, A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.inner
    }
}

impl<'a, A: Applier + 'static> DerefMut for ApplierGuard<'a, A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label(String);

    impl Node for Label {
        fn kind(&self) -> &'static str {
            "label"
        }

        fn summary(&self) -> String {
            format!("label({})", self.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn create_and_access_nodes() {
        let mut applier = MemoryApplier::new();
        let id = applier.create(Box::new(Label("hello".into())));
        assert_eq!(applier.len(), 2);
        let text = applier.with_node::<Label, _>(id, |label| label.0.clone());
        assert_eq!(text.unwrap(), "hello");
        let err = applier.with_node::<RootNode, _>(id, |_| ()).unwrap_err();
        assert!(matches!(err, NodeError::TypeMismatch { .. }));
    }

    #[test]
    fn child_list_operations() {
        let mut applier = MemoryApplier::new();
        let root = applier.root_id();
        let a = applier.create(Box::new(Label("a".into())));
        let b = applier.create(Box::new(Label("b".into())));
        let c = applier.create(Box::new(Label("c".into())));
        applier.insert_child(root, a, 0).unwrap();
        applier.insert_child(root, b, 1).unwrap();
        applier.insert_child(root, c, 2).unwrap();
        applier.move_child(root, 2, 0).unwrap();
        assert_eq!(applier.children(root), &[c, a, b]);
        applier.remove_child(root, a).unwrap();
        assert_eq!(applier.children(root), &[c, b]);
        assert!(applier.remove_child(root, a).is_err());
    }

    #[test]
    fn destroy_clears_the_slot() {
        let mut applier = MemoryApplier::new();
        let id = applier.create(Box::new(Label("x".into())));
        applier.destroy(id);
        assert!(applier.node(id).is_none());
        assert_eq!(
            applier.with_node::<Label, _>(id, |_| ()).unwrap_err(),
            NodeError::Missing { id }
        );
    }

    #[test]
    fn dump_tree_is_indented() {
        let mut applier = MemoryApplier::new();
        let root = applier.root_id();
        let a = applier.create(Box::new(Label("a".into())));
        applier.insert_child(root, a, 0).unwrap();
        let dump = applier.dump_tree(root);
        assert!(dump.contains("root\n  label(a)\n"));
    }
}
