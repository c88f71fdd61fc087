use trellis_core::{Node, NodeId};

mod grid_row_node;
mod pager_node;
mod spin_node;
mod text_node;
mod view_node;

pub use grid_row_node::GridRowNode;
pub use pager_node::PagerNode;
pub use spin_node::SpinNode;
pub use text_node::TextNode;
pub use view_node::ViewNode;

pub fn compose_node<N: Node + 'static>(init: impl FnOnce() -> N) -> NodeId {
    trellis_core::with_current_composer(|composer| composer.emit_node(init))
}
