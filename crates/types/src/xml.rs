//! An owned, read-only XML tree.
//!
//! Parsing lives elsewhere (see `folio-source`); this module only models the
//! result and offers the small path language the filler uses to select rows
//! and read field values:
//!
//! - `/a/b/c` absolute element path from the document root
//! - `//b/c` every `b` anywhere in the tree, then its `c` children
//! - `b/c`, `.`, `*` relative steps, `@attr` as a final step

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Selects elements by path. Paths without a leading slash are relative to the root element.
    pub fn select(&self, path: &str) -> Vec<&XmlElement> {
        if let Some(rest) = path.strip_prefix("//") {
            let mut steps = rest.split('/').filter(|s| !s.is_empty());
            let Some(first) = steps.next() else {
                return Vec::new();
            };
            let mut matches = Vec::new();
            self.root.collect_descendants_or_self(first, &mut matches);
            let tail: Vec<&str> = steps.collect();
            select_steps(matches, &tail)
        } else if let Some(rest) = path.strip_prefix('/') {
            let steps: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
            match steps.split_first() {
                Some((first, tail)) if step_matches(first, &self.root.name) => {
                    select_steps(vec![&self.root], tail)
                }
                _ => Vec::new(),
            }
        } else {
            self.root.select(path)
        }
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push(&mut self, node: XmlNode) {
        self.children.push(node);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// The concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.append_text(out),
            }
        }
    }

    /// Selects elements by a relative path.
    pub fn select(&self, path: &str) -> Vec<&XmlElement> {
        let steps: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        select_steps(vec![self], &steps)
    }

    /// Reads a string value at a relative path; a final `@name` step reads an attribute.
    ///
    /// Returns `None` when nothing matches. When several elements match, the first wins.
    pub fn value_at(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() || path == "." {
            return Some(self.text());
        }
        match path.rsplit_once('/') {
            Some((prefix, last)) if last.starts_with('@') => self
                .select(prefix)
                .first()
                .and_then(|e| e.attribute(&last[1..]))
                .map(str::to_string),
            None if path.starts_with('@') => self.attribute(&path[1..]).map(str::to_string),
            _ => self.select(path).first().map(|e| e.text()),
        }
    }

    fn collect_descendants_or_self<'a>(&'a self, step: &str, out: &mut Vec<&'a XmlElement>) {
        if step_matches(step, &self.name) {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect_descendants_or_self(step, out);
        }
    }
}

fn step_matches(step: &str, name: &str) -> bool {
    step == "*" || step == name
}

fn select_steps<'a>(mut current: Vec<&'a XmlElement>, steps: &[&str]) -> Vec<&'a XmlElement> {
    for step in steps {
        if *step == "." {
            continue;
        }
        current = current
            .into_iter()
            .flat_map(|e| e.child_elements().filter(|c| step_matches(step, &c.name)))
            .collect();
    }
    current
}
