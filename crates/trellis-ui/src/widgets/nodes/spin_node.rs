use std::any::Any;

use trellis_core::Node;

/// Loading overlay node wrapping arbitrary children.
#[derive(Default)]
pub struct SpinNode {
    pub spinning: bool,
    pub tip: Option<String>,
}

impl Node for SpinNode {
    fn kind(&self) -> &'static str {
        "spin"
    }

    fn summary(&self) -> String {
        format!("spin(spinning={})", self.spinning)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
