use trellis_core::{
    location_key, Applier, ApplierGuard, Composition, Key, MemoryApplier, Node, NodeError, NodeId,
    RuntimeHandle,
};

/// Headless harness for exercising compositions in tests.
///
/// Owns an in-memory applier and keeps the installed content around so state
/// writes can be pumped through recompositions without a windowing backend.
pub struct ComposeTestRule {
    composition: Composition<MemoryApplier>,
    content: Option<Box<dyn FnMut()>>, // Stored user content for reuse across recompositions.
    root_key: Key,
}

impl ComposeTestRule {
    pub fn new() -> Self {
        Self {
            composition: Composition::new(MemoryApplier::new()),
            content: None,
            root_key: location_key(file!(), line!(), column!()),
        }
    }

    /// Install the provided content into the composition and perform an
    /// initial render.
    pub fn set_content(&mut self, content: impl FnMut() + 'static) -> Result<(), NodeError> {
        self.content = Some(Box::new(content));
        self.render()
    }

    /// Force a recomposition using the currently installed content.
    pub fn recomposition(&mut self) -> Result<(), NodeError> {
        self.render()
    }

    /// Re-render until no state write is pending.
    pub fn pump_until_idle(&mut self) -> Result<(), NodeError> {
        let mut i = 0;
        while self.composition.should_render() {
            i += 1;
            if i > 100 {
                panic!("pump_until_idle looped too many times!");
            }
            self.render()?;
        }
        Ok(())
    }

    /// Access the runtime driving this rule. Useful for constructing shared
    /// state objects within the composition.
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.composition.runtime_handle()
    }

    /// Gain mutable access to the underlying in-memory applier for assertions
    /// about the produced node tree.
    pub fn applier_mut(&mut self) -> ApplierGuard<'_, MemoryApplier> {
        self.composition.applier_mut()
    }

    /// Dump the current node tree as text for debugging.
    pub fn dump_tree(&mut self) -> String {
        let root = self.composition.applier_mut().root_id();
        self.composition.applier_mut().dump_tree(root)
    }

    /// Returns whether user content has been installed in this rule.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Returns the id of the root node produced by the current composition.
    pub fn root_id(&self) -> Option<NodeId> {
        self.composition.root()
    }

    /// Gain mutable access to the raw composition for advanced scenarios.
    pub fn composition(&mut self) -> &mut Composition<MemoryApplier> {
        &mut self.composition
    }

    fn render(&mut self) -> Result<(), NodeError> {
        if let Some(content) = self.content.as_mut() {
            self.composition.render(self.root_key, &mut **content)?;
        }
        Ok(())
    }
}

impl Default for ComposeTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a rule, install `content`, and panic on composition errors. For the
/// common test that only needs a composed tree to assert on.
pub fn run_test_composition(content: impl FnMut() + 'static) -> ComposeTestRule {
    let mut rule = ComposeTestRule::new();
    rule.set_content(content)
        .expect("run_test_composition: initial render failed");
    rule
}

/// Depth-first search of the applied tree for nodes matching `predicate`.
pub fn find_nodes(
    applier: &MemoryApplier,
    predicate: impl Fn(&dyn Node) -> bool,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack = vec![applier.root_id()];
    while let Some(id) = stack.pop() {
        if let Some(node) = applier.node(id) {
            if predicate(node) {
                found.push(id);
            }
        }
        for &child in applier.children(id).iter().rev() {
            stack.push(child);
        }
    }
    found
}

/// All nodes of the given kind, in depth-first order.
pub fn find_by_kind(applier: &MemoryApplier, kind: &str) -> Vec<NodeId> {
    find_nodes(applier, |node| node.kind() == kind)
}

/// Summaries of every live node, in depth-first order. Convenient for
/// asserting tree shape without chasing ids.
pub fn collect_summaries(applier: &MemoryApplier) -> Vec<String> {
    find_nodes(applier, |_| true)
        .into_iter()
        .filter_map(|id| applier.node(id).map(|node| node.summary()))
        .collect()
}
