//! Arena-backed element tree the handlers read from and patch.
//!
//! Server data only ever lands in the tree as text nodes or attribute values
//! through [`ElementSpec`]; nothing here parses markup.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone)]
enum Content {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Slot {
    content: Content,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Child {
    Element(ElementSpec),
    Text(String),
}

/// description of an element subtree, built before it touches the document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

impl ElementSpec {
    pub(crate) fn new<T: AsRef<str>>(tag: T) -> Self {
        Self {
            tag: tag.as_ref().to_owned(),
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn id<T: Into<String>>(self, id: T) -> Self {
        self.attr("id", id)
    }

    /// whitespace separated, like the html attribute.
    pub(crate) fn class<T: AsRef<str>>(mut self, class: T) -> Self {
        self.classes
            .extend(class.as_ref().split_whitespace().map(str::to_owned));
        self
    }

    pub(crate) fn attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        let name = name.into();
        if name == "class" {
            return self.class(value.into());
        }
        self.attrs.push((name, value.into()));
        self
    }

    pub(crate) fn text<T: Into<String>>(mut self, text: T) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub(crate) fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(Child::Element(child));
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Document {
    slots: Vec<Slot>,
    /// slots of removed subtrees, reused by the next insert.
    free: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

const FIELD_TAGS: &[&str] = &["input", "textarea", "select"];

impl Document {
    pub(crate) fn new() -> Self {
        let body = Element {
            tag: "body".to_owned(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
        };
        Self {
            slots: vec![Slot {
                content: Content::Element(body),
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.slots.get(node.0)?.content {
            Content::Element(el) => Some(el),
            Content::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.slots.get_mut(node.0)?.content {
            Content::Element(el) => Some(el),
            Content::Text(_) => None,
        }
    }

    fn push(&mut self, parent: NodeId, content: Content) -> NodeId {
        let slot = Slot {
            content,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = slot;
                id
            }
            None => {
                self.slots.push(slot);
                NodeId(self.slots.len() - 1)
            }
        };
        self.slots[parent.0].children.push(id);
        id
    }

    /// frees `node` and everything under it. ids into the subtree go stale.
    fn release(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            let slot = &mut self.slots[node.0];
            stack.append(&mut slot.children);
            slot.parent = None;
            slot.content = Content::Text(String::new());
            self.free.push(node);
        }
    }

    /// appends `spec` as the last child of `parent`, returns the new element.
    pub(crate) fn append(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let ElementSpec {
            tag,
            classes,
            attrs,
            children,
        } = spec;
        let el = Element {
            tag,
            classes,
            attrs: attrs.into_iter().collect(),
        };
        let id = self.push(parent, Content::Element(el));
        for child in children {
            match child {
                Child::Element(spec) => {
                    self.append(id, spec);
                }
                Child::Text(text) => {
                    self.push(id, Content::Text(text));
                }
            }
        }
        id
    }

    /// detaches the node; returns false if it was not attached.
    pub(crate) fn remove(&mut self, node: NodeId) -> bool {
        let parent = match self.slots.get_mut(node.0).and_then(|slot| slot.parent.take()) {
            Some(parent) => parent,
            None => return false,
        };
        self.slots[parent.0].children.retain(|child| *child != node);
        self.release(node);
        true
    }

    /// pre-order, `from` itself excluded.
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut res = Vec::new();
        let mut stack: Vec<NodeId> = self.slots[from.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            res.push(node);
            stack.extend(self.slots[node.0].children.iter().rev());
        }
        res
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(id))
    }

    pub(crate) fn all_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    pub(crate) fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.find_within(self.root(), class)
    }

    pub(crate) fn find_within(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.has_class(*node, class))
    }

    pub(crate) fn form(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root()).into_iter().find(|node| {
            self.element(*node)
                .map_or(false, |el| el.tag == "form" && el.attrs.get("name").map(String::as_str) == Some(name))
        })
    }

    /// any named descendant of `form`, fields and buttons alike.
    pub(crate) fn field(&self, form: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(form)
            .into_iter()
            .find(|node| self.attr(*node, "name") == Some(name))
    }

    fn is_field(&self, node: NodeId) -> bool {
        match self.element(node) {
            Some(el) => {
                FIELD_TAGS.contains(&el.tag.as_str())
                    && el.attrs.contains_key("name")
                    && !matches!(el.attrs.get("type").map(String::as_str), Some("submit") | Some("button"))
            }
            None => false,
        }
    }

    /// name/value pairs in document order, what the browser would submit.
    pub(crate) fn form_fields(&self, form: NodeId) -> Vec<(String, String)> {
        self.descendants(form)
            .into_iter()
            .filter(|node| self.is_field(*node))
            .map(|node| {
                let name = self.attr(node, "name").unwrap_or_default().to_owned();
                let value = self.attr(node, "value").unwrap_or_default().to_owned();
                (name, value)
            })
            .collect()
    }

    pub(crate) fn reset_form(&mut self, form: NodeId) {
        let fields: Vec<NodeId> = self
            .descendants(form)
            .into_iter()
            .filter(|node| self.is_field(*node))
            .collect();
        for field in fields {
            self.set_attr(field, "value", "");
        }
    }

    pub(crate) fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    pub(crate) fn set_attr<T: Into<String>>(&mut self, node: NodeId, name: &str, value: T) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(name.to_owned(), value.into());
        }
    }

    pub(crate) fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.remove(name);
        }
    }

    pub(crate) fn classes(&self, node: NodeId) -> &[String] {
        match self.element(node) {
            Some(el) => &el.classes,
            None => &[],
        }
    }

    pub(crate) fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    pub(crate) fn swap_class(&mut self, node: NodeId, from: &str, to: &str) {
        if let Some(el) = self.element_mut(node) {
            el.classes.retain(|c| c != from);
            if !el.classes.iter().any(|c| c == to) {
                el.classes.push(to.to_owned());
            }
        }
    }

    pub(crate) fn is_disabled(&self, node: NodeId) -> bool {
        self.attr(node, "disabled").is_some()
    }

    pub(crate) fn text(&self, node: NodeId) -> String {
        match &self.slots[node.0].content {
            Content::Text(text) => text.clone(),
            Content::Element(_) => self
                .descendants(node)
                .into_iter()
                .filter_map(|child| match &self.slots[child.0].content {
                    Content::Text(text) => Some(text.as_str()),
                    Content::Element(_) => None,
                })
                .collect(),
        }
    }

    /// replaces every child of `node` with a single text node.
    pub(crate) fn set_text<T: Into<String>>(&mut self, node: NodeId, text: T) {
        if self.element(node).is_none() {
            return;
        }
        for child in std::mem::take(&mut self.slots[node.0].children) {
            self.release(child);
        }
        self.push(node, Content::Text(text.into()));
    }

    pub(crate) fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.slots[node.0].content {
            Content::Text(text) => out.push_str(&html_escape::encode_text(text)),
            Content::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.classes.is_empty() {
                    let classes = el.classes.join(" ");
                    out.push_str(&format!(" class=\"{}\"", html_escape::encode_double_quoted_attribute(&classes)));
                }
                for (name, value) in &el.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, html_escape::encode_double_quoted_attribute(value)));
                }
                out.push('>');
                for child in &self.slots[node.0].children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }

    /// one line per node, indented by depth; the terminal view renders this.
    pub(crate) fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.write_outline(self.root(), 0, &mut lines);
        lines
    }

    fn write_outline(&self, node: NodeId, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        match &self.slots[node.0].content {
            Content::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    lines.push(format!("{}\"{}\"", indent, text));
                }
            }
            Content::Element(el) => {
                let mut line = format!("{}{}", indent, el.tag);
                if let Some(id) = el.attrs.get("id") {
                    line.push('#');
                    line.push_str(id);
                }
                for class in &el.classes {
                    line.push('.');
                    line.push_str(class);
                }
                if let Some(value) = el.attrs.get("value") {
                    line.push_str(&format!(" = {:?}", value));
                }
                if self.is_disabled(node) {
                    line.push_str(" [disabled]");
                }
                lines.push(line);
                for child in &self.slots[node.0].children {
                    self.write_outline(*child, depth + 1, lines);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, ElementSpec};

    fn form_doc() -> Document {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append(
            root,
            ElementSpec::new("form")
                .attr("name", "commentForm")
                .child(ElementSpec::new("textarea").attr("name", "content").attr("value", "hi"))
                .child(
                    ElementSpec::new("input")
                        .attr("type", "hidden")
                        .attr("name", "parent")
                        .attr("value", "3"),
                )
                .child(
                    ElementSpec::new("button")
                        .attr("type", "submit")
                        .attr("name", "commentSubmit")
                        .text("Add comment"),
                ),
        );
        doc
    }

    #[test]
    fn form_fields_skip_buttons() {
        let doc = form_doc();
        let form = doc.form("commentForm").unwrap();
        assert_eq!(
            doc.form_fields(form),
            vec![
                ("content".to_string(), "hi".to_string()),
                ("parent".to_string(), "3".to_string())
            ]
        );
        let submit = doc.field(form, "commentSubmit").unwrap();
        assert_eq!(doc.text(submit), "Add comment");
    }

    #[test]
    fn reset_clears_fields_only() {
        let mut doc = form_doc();
        let form = doc.form("commentForm").unwrap();
        doc.reset_form(form);
        assert!(doc.form_fields(form).iter().all(|(_, value)| value.is_empty()));
        let submit = doc.field(form, "commentSubmit").unwrap();
        assert_eq!(doc.text(submit), "Add comment");
    }

    #[test]
    fn removed_nodes_leave_queries() {
        let mut doc = Document::new();
        let root = doc.root();
        let box_ = doc.append(root, ElementSpec::new("div").class("followers-box"));
        let entry = doc.append(box_, ElementSpec::new("div").id("user-slug-bob").class("col-md-2"));
        assert_eq!(doc.by_id("user-slug-bob"), Some(entry));
        assert!(doc.remove(entry));
        assert_eq!(doc.by_id("user-slug-bob"), None);
        assert!(!doc.remove(entry));
        assert_eq!(doc.to_html(box_), "<div class=\"followers-box\"></div>");
    }

    #[test]
    fn class_swap() {
        let mut doc = Document::new();
        let root = doc.root();
        let btn = doc.append(root, ElementSpec::new("button").class("btn btn-primary"));
        doc.swap_class(btn, "btn-primary", "btn-danger");
        assert_eq!(doc.classes(btn), ["btn", "btn-danger"]);
        doc.swap_class(btn, "btn-danger", "btn-primary");
        assert_eq!(doc.classes(btn), ["btn", "btn-primary"]);
        assert_eq!(doc.all_by_class("btn"), vec![btn]);
    }

    #[test]
    fn markup_in_text_stays_text() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append(root, ElementSpec::new("p").text("<img src=x onerror=alert(1)>"));
        assert_eq!(doc.text(p), "<img src=x onerror=alert(1)>");
        assert_eq!(doc.to_html(p), "<p>&lt;img src=x onerror=alert(1)&gt;</p>");
        assert!(doc.all_by_class("x").is_empty());
        assert_eq!(doc.descendants(p).len(), 1);
    }

    #[test]
    fn set_text_replaces_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let btn = doc.append(
            root,
            ElementSpec::new("button").child(ElementSpec::new("span").class("rating-sum").text("3")),
        );
        doc.set_text(btn, "Following");
        assert_eq!(doc.text(btn), "Following");
        assert_eq!(doc.find_within(btn, "rating-sum"), None);
    }

    #[test]
    fn replaced_nodes_free_their_slots() {
        let mut doc = Document::new();
        let root = doc.root();
        let btn = doc.append(
            root,
            ElementSpec::new("button").child(ElementSpec::new("span").class("rating-sum").text("0")),
        );
        let churn = |doc: &mut Document, n: usize| {
            doc.set_text(btn, n.to_string());
            let entry = doc.append(root, ElementSpec::new("div").id("user-slug-bob").text("bob"));
            assert!(doc.remove(entry));
        };
        churn(&mut doc, 0);
        let size = doc.slots.len();
        for n in 1..50 {
            churn(&mut doc, n);
        }
        assert_eq!(doc.slots.len(), size);
        assert_eq!(doc.text(btn), "49");
        assert_eq!(doc.by_id("user-slug-bob"), None);
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append(root, ElementSpec::new("a").attr("href", "\" onclick=\"x"));
        assert_eq!(doc.to_html(a), "<a href=\"&quot; onclick=&quot;x\"></a>");
    }
}
