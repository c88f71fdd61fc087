//! Collaborator widgets consumed by the list through narrow interfaces.

#![allow(non_snake_case)]

use std::rc::Rc;

use crate::composable;
use crate::context::local_config;
use trellis_core::NodeId;

mod nodes;

pub use nodes::{compose_node, GridRowNode, PagerNode, SpinNode, TextNode, ViewNode};

/// Display options for a [`View`].
#[derive(Clone, Default)]
pub struct ViewSpec {
    pub classes: Vec<String>,
    pub min_height: Option<f32>,
    pub width_percent: Option<f32>,
}

impl ViewSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = String>) -> Self {
        self.classes.extend(classes);
        self
    }

    pub fn min_height(mut self, height: f32) -> Self {
        self.min_height = Some(height);
        self
    }

    pub fn width_percent(mut self, percent: f32) -> Self {
        self.width_percent = Some(percent);
        self
    }
}

/// Generic classed container.
#[composable]
pub fn View(spec: ViewSpec, content: impl FnOnce()) -> NodeId {
    let id = compose_node(ViewNode::new);
    if let Err(err) = trellis_core::with_node_mut(id, |node: &mut ViewNode| {
        node.classes = spec.classes;
        node.min_height = spec.min_height;
        node.width_percent = spec.width_percent;
    }) {
        debug_assert!(false, "failed to update View node: {err}");
    }
    trellis_core::push_parent(id);
    content();
    trellis_core::pop_parent();
    id
}

/// Text leaf.
#[composable]
pub fn Text(value: impl Into<String>) -> NodeId {
    let value = value.into();
    let id = compose_node(|| TextNode::new(value.clone()));
    if let Err(err) = trellis_core::with_node_mut(id, |node: &mut TextNode| {
        node.text = value;
    }) {
        debug_assert!(false, "failed to update Text node: {err}");
    }
    id
}

/// Merged display values and callbacks for the pagination control.
#[derive(Clone, Default)]
pub struct PagerProps {
    pub current: usize,
    pub page_size: usize,
    pub total: usize,
    pub disabled: bool,
    pub simple: bool,
    pub show_size_changer: bool,
    pub page_size_options: Vec<usize>,
    pub rtl: bool,
    pub on_change: Option<Rc<dyn Fn(usize, usize)>>,
    pub on_show_size_change: Option<Rc<dyn Fn(usize, usize)>>,
}

/// Pagination control. Consumes the merged page state and re-emits
/// interactions through its callbacks; it keeps no state of its own.
#[composable]
pub fn Pager(props: PagerProps) -> NodeId {
    let id = compose_node(PagerNode::default);
    if let Err(err) = trellis_core::with_node_mut(id, |node: &mut PagerNode| {
        node.current = props.current;
        node.page_size = props.page_size;
        node.total = props.total;
        node.disabled = props.disabled;
        node.simple = props.simple;
        node.show_size_changer = props.show_size_changer;
        node.page_size_options = props.page_size_options;
        node.rtl = props.rtl;
        node.on_change = props.on_change;
        node.on_show_size_change = props.on_show_size_change;
    }) {
        debug_assert!(false, "failed to update Pager node: {err}");
    }
    id
}

/// Grid layout row around `content`.
#[composable]
pub fn GridRow(gutter: u32, content: impl FnOnce()) -> NodeId {
    let id = compose_node(GridRowNode::default);
    if let Err(err) = trellis_core::with_node_mut(id, |node: &mut GridRowNode| {
        node.gutter = gutter;
    }) {
        debug_assert!(false, "failed to update GridRow node: {err}");
    }
    trellis_core::push_parent(id);
    content();
    trellis_core::pop_parent();
    id
}

/// Loading-spinner display options. A bare boolean `loading` prop normalizes
/// to a config with just the spinning flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpinConfig {
    pub spinning: bool,
    pub tip: Option<String>,
}

impl SpinConfig {
    pub fn spinning() -> Self {
        Self {
            spinning: true,
            tip: None,
        }
    }
}

/// Loading overlay around `content`.
#[composable]
pub fn Spin(config: SpinConfig, content: impl FnOnce()) -> NodeId {
    let id = compose_node(SpinNode::default);
    if let Err(err) = trellis_core::with_node_mut(id, |node: &mut SpinNode| {
        node.spinning = config.spinning;
        node.tip = config.tip;
    }) {
        debug_assert!(false, "failed to update Spin node: {err}");
    }
    trellis_core::push_parent(id);
    content();
    trellis_core::pop_parent();
    id
}

/// Built-in empty state, used when neither the caller nor the ambient
/// configuration overrides it. `kind` names the requesting component.
#[composable]
pub fn Empty(kind: &str) -> NodeId {
    let config = local_config().current();
    let prefix = config.prefix_cls(Some("empty"), None);
    // List-like components get the compact presentation.
    let spec = match kind {
        "List" | "Select" => ViewSpec::new()
            .class(prefix.clone())
            .class(format!("{prefix}-normal")),
        _ => ViewSpec::new().class(prefix),
    };
    View(spec, || {
        Text("No data");
    })
}
