use std::any::Any;

use trellis_core::Node;

/// Grid layout row. Arranges whatever children composition attaches; only
/// the gutter travels through.
#[derive(Default)]
pub struct GridRowNode {
    pub gutter: u32,
}

impl Node for GridRowNode {
    fn kind(&self) -> &'static str {
        "grid-row"
    }

    fn summary(&self) -> String {
        format!("grid-row(gutter={})", self.gutter)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
