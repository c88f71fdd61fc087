//! Composition runtime for Trellis.
//!
//! A scaled-down, single-threaded take on positional memoization: content
//! functions run inside keyed groups, remember values in slots, and emit
//! nodes into an [`Applier`]. Re-running the same content reuses groups,
//! slots, and nodes in call order; stale subtrees are torn down. Ambient
//! values travel through [`CompositionLocal`]s resolved by the nearest
//! enclosing provider.

use std::any::Any;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;

mod composer_context;
mod node;
mod owned;
mod runtime;
mod state;

pub use node::{Applier, ApplierGuard, MemoryApplier, Node, NodeError, NodeId, RootNode};
pub use owned::Owned;
pub use runtime::{Runtime, RuntimeHandle};
pub use state::{mutableStateOf, MutableState, State};

/// Identity of a composition group.
pub type Key = u64;

type LocalKey = u64;

const ROOT_GROUP_KEY: Key = 0;
const PROVIDER_GROUP_KEY: Key = 0x5052_4f56_4944_4552; // ascii "PROVIDER"

static NEXT_LOCAL_KEY: AtomicU64 = AtomicU64::new(1);

/// Key for a call site, stable for the lifetime of the process.
pub fn location_key(file: &str, line: u32, column: u32) -> Key {
    let base = file.as_ptr() as u64;
    base.wrapping_mul(0x9E37_79B9_7F4A_7C15) // cheap mix
        ^ ((line as u64) << 32)
        ^ (column as u64)
}

/// Key derived from arbitrary hashable data, for user-keyed groups.
pub fn hash_key<K: Hash>(key: &K) -> Key {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// Composition locals
// ---------------------------------------------------------------------------

/// Ambient value resolved by nearest enclosing provider.
///
/// Reading outside any provider (or outside a composition entirely) yields
/// the default. Providers shadow only the locals they carry; everything else
/// resolves further up the stack.
pub struct CompositionLocal<T: Clone + 'static> {
    key: LocalKey,
    default: Rc<dyn Fn() -> T>,
}

impl<T: Clone + 'static> Clone for CompositionLocal<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            default: Rc::clone(&self.default),
        }
    }
}

impl<T: Clone + 'static> CompositionLocal<T> {
    /// Bind a value to this local for use with [`CompositionLocalProvider`].
    pub fn provides(&self, value: T) -> ProvidedValue {
        ProvidedValue {
            key: self.key,
            value: Rc::new(value),
        }
    }

    /// Resolve the nearest provided value, or the default.
    pub fn current(&self) -> T {
        match composer_context::try_with_composer(|composer| composer.read_local(self.key)) {
            Some(Some(value)) => match value.downcast::<T>() {
                Ok(value) => (*value).clone(),
                Err(_) => {
                    log::warn!("composition local {} provided with mismatched type", self.key);
                    (self.default)()
                }
            },
            _ => (self.default)(),
        }
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

/// A `(local, value)` pair scoped by a provider.
pub struct ProvidedValue {
    key: LocalKey,
    value: Rc<dyn Any>,
}

#[allow(non_snake_case)]
pub fn compositionLocalOf<T: Clone + 'static>(
    default: impl Fn() -> T + 'static,
) -> CompositionLocal<T> {
    CompositionLocal {
        key: NEXT_LOCAL_KEY.fetch_add(1, Ordering::Relaxed),
        default: Rc::new(default),
    }
}

pub fn composition_local_of<T: Clone + 'static>(
    default: impl Fn() -> T + 'static,
) -> CompositionLocal<T> {
    compositionLocalOf(default)
}

/// Scope `values` to `content`: locals read inside resolve to the provided
/// values, locals not listed keep their outer resolution.
#[allow(non_snake_case)]
pub fn CompositionLocalProvider(values: Vec<ProvidedValue>, content: impl FnOnce()) {
    with_current_composer(|composer| composer.with_composition_locals(values, content));
}

// ---------------------------------------------------------------------------
// Groups and slots
// ---------------------------------------------------------------------------

enum Slot {
    Value(Rc<dyn Any>),
    Node(NodeId),
}

struct Group {
    key: Key,
    slots: Vec<Slot>,
    children: Vec<Rc<RefCell<Group>>>,
}

impl Group {
    fn new(key: Key) -> Self {
        Self {
            key,
            slots: Vec::new(),
            children: Vec::new(),
        }
    }

    fn collect_nodes(&self, out: &mut Vec<NodeId>) {
        for slot in &self.slots {
            if let Slot::Node(id) = slot {
                out.push(*id);
            }
        }
        for child in &self.children {
            child.borrow().collect_nodes(out);
        }
    }
}

struct GroupFrame {
    group: Rc<RefCell<Group>>,
    child_cursor: usize,
    slot_cursor: usize,
}

struct ParentFrame {
    parent: NodeId,
    new_children: SmallVec<[NodeId; 8]>,
}

struct CaptureFrame {
    depth: usize,
    nodes: Vec<NodeId>,
}

struct LocalContext {
    values: FxHashMap<LocalKey, Rc<dyn Any>>,
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

pub(crate) struct ComposerCore {
    applier: Rc<RefCell<dyn Applier>>,
    runtime: RuntimeHandle,
    group_stack: RefCell<Vec<GroupFrame>>,
    parent_stack: RefCell<Vec<ParentFrame>>,
    local_stack: RefCell<Vec<LocalContext>>,
    capture_stack: RefCell<Vec<CaptureFrame>>,
    error: RefCell<Option<NodeError>>,
}

/// Drives one render pass: group navigation, slot memoization, node emission
/// and child reconciliation. Cheap to clone; all clones share the same pass.
pub struct Composer {
    core: Rc<ComposerCore>,
}

impl Composer {
    pub(crate) fn new(applier: Rc<RefCell<dyn Applier>>, runtime: RuntimeHandle) -> Self {
        Self {
            core: Rc::new(ComposerCore {
                applier,
                runtime,
                group_stack: RefCell::new(Vec::new()),
                parent_stack: RefCell::new(Vec::new()),
                local_stack: RefCell::new(Vec::new()),
                capture_stack: RefCell::new(Vec::new()),
                error: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn clone_core(&self) -> Rc<ComposerCore> {
        Rc::clone(&self.core)
    }

    pub(crate) fn from_core(core: Rc<ComposerCore>) -> Self {
        Self { core }
    }

    pub(crate) fn install<R>(&self, f: impl FnOnce(&Composer) -> R) -> R {
        let _guard = composer_context::activate(self);
        f(self)
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.core.runtime.clone()
    }

    /// Run `f` inside the group identified by `key` at the current cursor
    /// position, reusing (and re-ordering) a matching group from the previous
    /// pass when one exists.
    pub fn with_group<R>(&self, key: Key, f: impl FnOnce() -> R) -> R {
        self.begin_group(key);
        let result = f();
        self.end_group();
        result
    }

    fn begin_group(&self, key: Key) {
        let group = {
            let mut stack = self.core.group_stack.borrow_mut();
            let frame = stack.last_mut().expect("begin_group: no active root group");
            let cursor = frame.child_cursor;
            frame.child_cursor += 1;
            let mut parent = frame.group.borrow_mut();
            let found = parent.children[cursor..]
                .iter()
                .position(|g| g.borrow().key == key)
                .map(|offset| cursor + offset);
            match found {
                Some(index) if index == cursor => Rc::clone(&parent.children[index]),
                Some(index) => {
                    let group = parent.children.remove(index);
                    parent.children.insert(cursor, Rc::clone(&group));
                    group
                }
                None => {
                    let group = Rc::new(RefCell::new(Group::new(key)));
                    parent.children.insert(cursor, Rc::clone(&group));
                    group
                }
            }
        };
        self.core.group_stack.borrow_mut().push(GroupFrame {
            group,
            child_cursor: 0,
            slot_cursor: 0,
        });
    }

    fn end_group(&self) {
        let frame = self
            .core
            .group_stack
            .borrow_mut()
            .pop()
            .expect("end_group: unbalanced group stack");
        self.finish_frame(frame);
    }

    pub(crate) fn begin_root(&self, group: Rc<RefCell<Group>>) {
        self.core.group_stack.borrow_mut().push(GroupFrame {
            group,
            child_cursor: 0,
            slot_cursor: 0,
        });
    }

    pub(crate) fn finish_root(&self) {
        let frame = self
            .core
            .group_stack
            .borrow_mut()
            .pop()
            .expect("finish_root: unbalanced group stack");
        self.finish_frame(frame);
    }

    /// Drop everything this pass did not revisit and destroy the nodes that
    /// lived there.
    fn finish_frame(&self, frame: GroupFrame) {
        let mut stale = Vec::new();
        {
            let mut group = frame.group.borrow_mut();
            for removed in group.children.drain(frame.child_cursor..) {
                removed.borrow().collect_nodes(&mut stale);
            }
            for slot in group.slots.drain(frame.slot_cursor..) {
                if let Slot::Node(id) = slot {
                    stale.push(id);
                }
            }
        }
        if !stale.is_empty() {
            let mut applier = self.core.applier.borrow_mut();
            for id in stale {
                applier.destroy(id);
            }
        }
    }

    /// Remember a value in the current group, initializing it on first pass.
    pub fn remember<T: 'static>(&self, init: impl FnOnce() -> T) -> Owned<T> {
        {
            let mut stack = self.core.group_stack.borrow_mut();
            let frame = stack.last_mut().expect("remember: no active group");
            let group = frame.group.borrow();
            if let Some(Slot::Value(existing)) = group.slots.get(frame.slot_cursor) {
                if let Some(owned) = existing.downcast_ref::<Owned<T>>() {
                    let owned = owned.clone();
                    drop(group);
                    frame.slot_cursor += 1;
                    return owned;
                }
            }
        }
        let owned = Owned::new(init());
        let mut stale_node = None;
        {
            let mut stack = self.core.group_stack.borrow_mut();
            let frame = stack.last_mut().expect("remember: no active group");
            let mut group = frame.group.borrow_mut();
            let slot = Slot::Value(Rc::new(owned.clone()));
            if frame.slot_cursor < group.slots.len() {
                if let Slot::Node(id) = group.slots[frame.slot_cursor] {
                    stale_node = Some(id);
                }
                group.slots[frame.slot_cursor] = slot;
            } else {
                group.slots.push(slot);
            }
            frame.slot_cursor += 1;
        }
        if let Some(id) = stale_node {
            self.core.applier.borrow_mut().destroy(id);
        }
        owned
    }

    /// Emit (or reuse) a node at the current slot position and attach it to
    /// the current parent. The slot is reused only when node types match.
    pub fn emit_node<N: Node>(&self, init: impl FnOnce() -> N) -> NodeId {
        enum Plan {
            Reuse(NodeId),
            Replace(NodeId),
            Fresh,
        }

        let plan = {
            let stack = self.core.group_stack.borrow();
            let frame = stack.last().expect("emit_node: no active group");
            let group = frame.group.borrow();
            match group.slots.get(frame.slot_cursor) {
                Some(Slot::Node(id)) => {
                    let applier = self.core.applier.borrow();
                    match applier.node(*id) {
                        Some(node) if node.as_any().is::<N>() => Plan::Reuse(*id),
                        Some(_) => Plan::Replace(*id),
                        None => Plan::Fresh,
                    }
                }
                _ => Plan::Fresh,
            }
        };

        let id = match plan {
            Plan::Reuse(id) => id,
            Plan::Replace(old) => {
                self.core.applier.borrow_mut().destroy(old);
                self.core.applier.borrow_mut().create(Box::new(init()))
            }
            Plan::Fresh => self.core.applier.borrow_mut().create(Box::new(init())),
        };

        {
            let mut stack = self.core.group_stack.borrow_mut();
            let frame = stack.last_mut().expect("emit_node: no active group");
            let mut group = frame.group.borrow_mut();
            if frame.slot_cursor < group.slots.len() {
                group.slots[frame.slot_cursor] = Slot::Node(id);
            } else {
                group.slots.push(Slot::Node(id));
            }
            frame.slot_cursor += 1;
        }

        self.attach_to_parent(id);
        id
    }

    fn attach_to_parent(&self, id: NodeId) {
        let depth = {
            let mut parents = self.core.parent_stack.borrow_mut();
            match parents.last_mut() {
                Some(frame) => frame.new_children.push(id),
                None => log::warn!("node {id} emitted outside any parent scope"),
            }
            parents.len()
        };
        let mut captures = self.core.capture_stack.borrow_mut();
        if let Some(frame) = captures.last_mut() {
            if frame.depth == depth {
                frame.nodes.push(id);
            }
        }
    }

    /// Make `id` the parent for nodes emitted until the matching
    /// [`Composer::pop_parent`].
    pub fn push_parent(&self, id: NodeId) {
        self.core.parent_stack.borrow_mut().push(ParentFrame {
            parent: id,
            new_children: SmallVec::new(),
        });
    }

    /// Close the current parent scope and reconcile its child list.
    pub fn pop_parent(&self) {
        let frame = self
            .core
            .parent_stack
            .borrow_mut()
            .pop()
            .expect("pop_parent: unbalanced parent stack");
        self.reconcile_children(frame.parent, &frame.new_children);
    }

    fn reconcile_children(&self, parent: NodeId, new: &[NodeId]) {
        let mut applier = self.core.applier.borrow_mut();
        let mut working: Vec<NodeId> = applier.children(parent).to_vec();
        let mut pending = None;
        for stale in working.clone() {
            if !new.contains(&stale) {
                if let Err(err) = applier.remove_child(parent, stale) {
                    pending.get_or_insert(err);
                }
            }
        }
        working.retain(|c| new.contains(c));
        for (index, &child) in new.iter().enumerate() {
            match working.get(index) {
                Some(&current) if current == child => {}
                _ => {
                    if let Some(from) = working.iter().position(|&c| c == child) {
                        working.remove(from);
                        working.insert(index, child);
                        if let Err(err) = applier.move_child(parent, from, index) {
                            pending.get_or_insert(err);
                        }
                    } else {
                        working.insert(index, child);
                        if let Err(err) = applier.insert_child(parent, child, index) {
                            pending.get_or_insert(err);
                        }
                    }
                }
            }
        }
        drop(applier);
        if let Some(err) = pending {
            self.record_error(err);
        }
    }

    /// Run `f` and report which nodes it attached to the parent that was
    /// current when the capture began. Nested emissions are not reported.
    pub fn capture_nodes<R>(&self, f: impl FnOnce() -> R) -> (R, Vec<NodeId>) {
        let depth = self.core.parent_stack.borrow().len();
        self.core
            .capture_stack
            .borrow_mut()
            .push(CaptureFrame {
                depth,
                nodes: Vec::new(),
            });
        let result = f();
        let frame = self
            .core
            .capture_stack
            .borrow_mut()
            .pop()
            .expect("capture_nodes: unbalanced capture stack");
        (result, frame.nodes)
    }

    pub(crate) fn with_composition_locals<R>(
        &self,
        values: Vec<ProvidedValue>,
        content: impl FnOnce() -> R,
    ) -> R {
        let mut map = FxHashMap::default();
        for provided in values {
            map.insert(provided.key, provided.value);
        }
        self.core
            .local_stack
            .borrow_mut()
            .push(LocalContext { values: map });
        let result = self.with_group(PROVIDER_GROUP_KEY, content);
        self.core.local_stack.borrow_mut().pop();
        result
    }

    pub(crate) fn read_local(&self, key: LocalKey) -> Option<Rc<dyn Any>> {
        let stack = self.core.local_stack.borrow();
        stack.iter().rev().find_map(|ctx| ctx.values.get(&key).cloned())
    }

    /// Mutate a live node downcast to its concrete type.
    pub fn with_node_mut<N: Node, R>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut N) -> R,
    ) -> Result<R, NodeError> {
        let mut applier = self.core.applier.borrow_mut();
        let node = applier.node_mut(id).ok_or(NodeError::Missing { id })?;
        let node = node
            .as_any_mut()
            .downcast_mut::<N>()
            .ok_or(NodeError::TypeMismatch {
                id,
                expected: std::any::type_name::<N>(),
            })?;
        Ok(f(node))
    }

    /// Tag a live node with a container-assigned identity key.
    pub fn assign_node_key(&self, id: NodeId, key: Option<String>) -> Result<(), NodeError> {
        let mut applier = self.core.applier.borrow_mut();
        let node = applier.node_mut(id).ok_or(NodeError::Missing { id })?;
        node.set_assigned_key(key);
        Ok(())
    }

    fn record_error(&self, err: NodeError) {
        log::warn!("structural update failed: {err}");
        self.core.error.borrow_mut().get_or_insert(err);
    }

    pub(crate) fn take_error(&self) -> Option<NodeError> {
        self.core.error.borrow_mut().take()
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// A persistent composition over an applier: the group tree survives between
/// [`Composition::render`] calls so remembered state and emitted nodes are
/// reused positionally.
pub struct Composition<A: Applier + 'static> {
    applier: Rc<RefCell<A>>,
    applier_dyn: Rc<RefCell<dyn Applier>>,
    root_group: Rc<RefCell<Group>>,
    runtime: Runtime,
}

impl<A: Applier + 'static> Composition<A> {
    pub fn new(applier: A) -> Self {
        let applier = Rc::new(RefCell::new(applier));
        let applier_dyn: Rc<RefCell<dyn Applier>> = applier.clone();
        Self {
            applier,
            applier_dyn,
            root_group: Rc::new(RefCell::new(Group::new(ROOT_GROUP_KEY))),
            runtime: Runtime::new(),
        }
    }

    /// Run `content` against the persistent group tree and apply the
    /// resulting structural changes. Also clears the needs-frame flag.
    pub fn render(&mut self, key: Key, mut content: impl FnMut()) -> Result<(), NodeError> {
        let composer = Composer::new(Rc::clone(&self.applier_dyn), self.runtime.handle());
        composer.begin_root(Rc::clone(&self.root_group));
        let root_id = self.applier.borrow().root_id();
        composer.install(|c| {
            c.push_parent(root_id);
            c.with_group(key, || content());
            c.pop_parent();
        });
        composer.finish_root();
        self.runtime.set_needs_frame(false);
        match composer.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whether state writes scheduled another pass since the last render.
    pub fn should_render(&self) -> bool {
        self.runtime.needs_frame()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn applier_mut(&mut self) -> ApplierGuard<'_, A> {
        ApplierGuard::new(self.applier.borrow_mut())
    }

    /// First node attached under the applier root, if any.
    pub fn root(&self) -> Option<NodeId> {
        let applier = self.applier.borrow();
        applier.children(applier.root_id()).first().copied()
    }
}

// ---------------------------------------------------------------------------
// Free functions over the active composer
// ---------------------------------------------------------------------------

/// Access the composer of the composition currently rendering.
///
/// # Panics
/// Panics when no composition is active on this thread.
pub fn with_current_composer<R>(f: impl FnOnce(&Composer) -> R) -> R {
    composer_context::with_composer(f)
}

/// Run `f` inside a keyed group of the active composition.
pub fn with_group<R>(key: Key, f: impl FnOnce() -> R) -> R {
    with_current_composer(|composer| composer.with_group(key, f))
}

pub fn push_parent(id: NodeId) {
    with_current_composer(|composer| composer.push_parent(id));
}

pub fn pop_parent() {
    with_current_composer(|composer| composer.pop_parent());
}

/// See [`Composer::capture_nodes`].
pub fn capture_nodes<R>(f: impl FnOnce() -> R) -> (R, Vec<NodeId>) {
    with_current_composer(|composer| composer.capture_nodes(f))
}

/// See [`Composer::with_node_mut`].
pub fn with_node_mut<N: Node, R>(id: NodeId, f: impl FnOnce(&mut N) -> R) -> Result<R, NodeError> {
    with_current_composer(|composer| composer.with_node_mut(id, f))
}

/// See [`Composer::assign_node_key`].
pub fn assign_node_key(id: NodeId, key: Option<String>) -> Result<(), NodeError> {
    with_current_composer(|composer| composer.assign_node_key(id, key))
}

/// Remember a value in the current group across recompositions.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Owned<T> {
    with_current_composer(|composer| composer.remember(init))
}

/// Remembered mutable state, initialized once per position.
#[allow(non_snake_case)]
pub fn useState<T: Clone + 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    remember(|| mutableStateOf(init())).with(|state| state.clone())
}

pub fn use_state<T: Clone + 'static>(init: impl FnOnce() -> T) -> MutableState<T> {
    useState(init)
}
