use std::any::Any;

use trellis_core::Node;

#[derive(Default)]
pub struct TextNode {
    pub text: String,
    assigned_key: Option<String>,
}

impl TextNode {
    pub fn new(text: String) -> Self {
        Self {
            text,
            assigned_key: None,
        }
    }
}

impl Node for TextNode {
    fn kind(&self) -> &'static str {
        "text"
    }

    fn summary(&self) -> String {
        format!("text({})", self.text)
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
