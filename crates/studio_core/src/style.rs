//! Document style scope that applied themes write onto.
//!
//! The stylesheet consuming these variables is owned by the UI; core only
//! writes `--name: value` pairs verbatim.

use crate::model::theme::StyleMap;

/// Root style scope of the rendered document.
pub trait StyleScope {
    fn set_property(&mut self, name: &str, value: &str);
    fn get_property(&self, name: &str) -> Option<&str>;
}

/// Scope that records properties in memory, e.g. for previews and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStyleScope {
    properties: StyleMap,
}

impl InMemoryStyleScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &StyleMap {
        &self.properties
    }

    /// Renders the recorded properties as a `:root { ... }` CSS block.
    pub fn render_root_css(&self) -> String {
        render_root_css(&self.properties)
    }
}

impl StyleScope for InMemoryStyleScope {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

/// Renders `styles` as a `:root` rule with one declaration per line.
pub fn render_root_css(styles: &StyleMap) -> String {
    let mut css = String::from(":root {\n");
    for (name, value) in styles {
        css.push_str(&format!("  {name}: {value};\n"));
    }
    css.push('}');
    css
}

#[cfg(test)]
mod tests {
    use super::{InMemoryStyleScope, StyleScope};

    #[test]
    fn render_keeps_first_write_order() {
        let mut scope = InMemoryStyleScope::new();
        scope.set_property("--p-color", "#333");
        scope.set_property("--h1-color", "#111");
        scope.set_property("--p-color", "#444");
        assert_eq!(
            scope.render_root_css(),
            ":root {\n  --p-color: #444;\n  --h1-color: #111;\n}"
        );
    }
}
