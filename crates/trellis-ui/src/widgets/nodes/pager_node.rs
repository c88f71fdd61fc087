use std::any::Any;
use std::rc::Rc;

use trellis_core::Node;

/// Pagination control node. Purely presentational: it stores the merged
/// display values and the two callbacks, and lets interactions be driven
/// through [`PagerNode::emit_change`] / [`PagerNode::emit_size_change`].
#[derive(Default)]
pub struct PagerNode {
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

impl PagerNode {
    /// Fire the page-change callback, as the control would on a page click.
    pub fn emit_change(&self, page: usize, page_size: usize) {
        if let Some(on_change) = self.on_change.clone() {
            on_change(page, page_size);
        }
    }

    /// Fire the size-change callback, as the control would on a size pick.
    pub fn emit_size_change(&self, page: usize, page_size: usize) {
        if let Some(on_show_size_change) = self.on_show_size_change.clone() {
            on_show_size_change(page, page_size);
        }
    }
}

impl Node for PagerNode {
    fn kind(&self) -> &'static str {
        "pager"
    }

    fn summary(&self) -> String {
        format!(
            "pager(current={} page_size={} total={})",
            self.current, self.page_size, self.total
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
