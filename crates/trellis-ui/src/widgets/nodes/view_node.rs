use std::any::Any;

use trellis_core::Node;

/// Generic classed container. Carries the identity key an enclosing
/// container assigned, plus the two layout hints the list needs: a minimum
/// height for loading placeholders and a percentage width for grid cells.
#[derive(Default)]
pub struct ViewNode {
    pub classes: Vec<String>,
    pub min_height: Option<f32>,
    pub width_percent: Option<f32>,
    assigned_key: Option<String>,
}

impl ViewNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl Node for ViewNode {
    fn kind(&self) -> &'static str {
        "view"
    }

    fn summary(&self) -> String {
        format!("view({})", self.classes.join(" "))
    }

    fn assigned_key(&self) -> Option<&str> {
        self.assigned_key.as_deref()
    }

    fn set_assigned_key(&mut self, key: Option<String>) {
        self.assigned_key = key;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
