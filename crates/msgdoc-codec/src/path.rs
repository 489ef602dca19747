//! Location tracking for error reporting.

/// Position in the document being walked, rendered as a JSON Pointer.
#[derive(Debug, Default, Clone)]
pub(crate) struct Path {
    components: Vec<String>,
}

impl Path {
    pub(crate) fn push(&mut self, key: &str) {
        self.components.push(escape_component(key));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.components.push(index.to_string());
    }

    pub(crate) fn pop(&mut self) {
        self.components.pop();
    }

    pub(crate) fn pointer(&self) -> String {
        let mut out = String::new();
        for component in &self.components {
            out.push('/');
            out.push_str(component);
        }
        out
    }
}

fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_owned();
    }
    component.replace('~', "~0").replace('/', "~1")
}
