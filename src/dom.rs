//! Presentation Capability
//!
//! The engine never touches the document directly; everything it needs from
//! the page goes through this trait. The browser implementation lives in
//! `browser`, tests use the in-memory mock below.

use crate::models;

/// Which of the two page-embedded card templates to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Full,
    Compact,
}

impl Template {
    /// Coarse status-to-template mapping.
    pub fn for_status(status: &str) -> Template {
        if models::is_compact_status(status) {
            Template::Compact
        } else {
            Template::Full
        }
    }
}

/// Minimal query/mutate/animate surface over the live page.
pub trait Dom: Clone + 'static {
    /// Handle to one element. Cheap to clone, compares by identity.
    type Node: Clone + PartialEq + 'static;

    /// Element lookup by id.
    fn find(&self, id: &str) -> Option<Self::Node>;
    /// Descendant lookup by selector, scoped to `node`.
    fn query(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Document-level lookup by selector.
    fn query_document(&self, selector: &str) -> Option<Self::Node>;
    /// Instantiate a detached card node from a template, if the template
    /// is present in the page.
    fn create_card(&self, template: Template) -> Option<Self::Node>;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attr(&self, node: &Self::Node, name: &str, value: &str);
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_html(&self, node: &Self::Node, html: &str);
    fn toggle_class(&self, node: &Self::Node, class: &str, on: bool);

    /// Insert `node` under `parent` before `reference`, or append when
    /// `reference` is `None`.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);
    fn detach(&self, node: &Self::Node);

    fn set_opacity(&self, node: &Self::Node, value: f64);
    /// Begin an opacity transition towards `target`.
    fn animate_opacity(&self, node: &Self::Node, target: f64);
    /// Reveal with a slide-down transition.
    fn slide_down(&self, node: &Self::Node);
    /// Collapse with a slide-up transition.
    fn slide_up(&self, node: &Self::Node);
    fn hide(&self, node: &Self::Node);
    fn is_hidden(&self, node: &Self::Node) -> bool;
}

#[cfg(test)]
pub mod mock {
    //! In-memory page double recording every mutation.

    use super::{Dom, Template};
    use crate::reconcile::selectors;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Clone, Default)]
    pub struct MockNode {
        pub attrs: HashMap<String, String>,
        pub text: String,
        pub html: String,
        pub children: Vec<usize>,
        pub parent: Option<usize>,
        /// Descendants addressable through `query`, keyed by selector.
        pub roles: HashMap<String, usize>,
        pub opacity: f64,
        pub hidden: bool,
        pub detached: bool,
    }

    struct MockInner {
        nodes: RefCell<Vec<MockNode>>,
        doc_roles: RefCell<HashMap<String, usize>>,
        missing_templates: RefCell<Vec<Template>>,
        /// Structural mutations: creations, insertions, detachments.
        structural_ops: Cell<usize>,
    }

    #[derive(Clone)]
    pub struct MockDom {
        inner: Rc<MockInner>,
    }

    impl MockDom {
        /// Build a page with one container per column key plus the footer
        /// roster block.
        pub fn new(columns: &[&str]) -> MockDom {
            let dom = MockDom {
                inner: Rc::new(MockInner {
                    nodes: RefCell::new(Vec::new()),
                    doc_roles: RefCell::new(HashMap::new()),
                    missing_templates: RefCell::new(Vec::new()),
                    structural_ops: Cell::new(0),
                }),
            };

            for key in columns {
                let column = dom.push(MockNode::default());
                dom.with(column, |n| {
                    n.attrs.insert("id".into(), (*key).to_string());
                });
                let count = dom.push(MockNode::default());
                dom.link_role(column, selectors::COLUMN_COUNT, count);
            }

            let footer = dom.push(MockNode::default());
            let footer_count = dom.push(MockNode::default());
            let footer_list = dom.push(MockNode::default());
            dom.link_role(footer, "span", footer_count);
            dom.link_role(footer, "ul", footer_list);
            dom.inner.doc_roles.borrow_mut().insert(selectors::FOOTER.to_string(), footer);

            dom
        }

        /// Register a document-level node reachable through `query_document`.
        pub fn add_document_slot(&self, selector: &str) -> usize {
            let node = self.push(MockNode::default());
            self.inner.doc_roles.borrow_mut().insert(selector.to_string(), node);
            node
        }

        /// Make `create_card` fail for the given template.
        pub fn remove_template(&self, template: Template) {
            self.inner.missing_templates.borrow_mut().push(template);
        }

        pub fn node(&self, node: usize) -> MockNode {
            self.inner.nodes.borrow()[node].clone()
        }

        /// Ids of attached children of a column, in document order.
        pub fn column_ids(&self, key: &str) -> Vec<String> {
            let column = self.find(key).expect("column should exist");
            let nodes = self.inner.nodes.borrow();
            nodes[column]
                .children
                .iter()
                .map(|&c| nodes[c].attrs.get("id").cloned().unwrap_or_default())
                .collect()
        }

        pub fn structural_ops(&self) -> usize {
            self.inner.structural_ops.get()
        }

        fn push(&self, node: MockNode) -> usize {
            let mut nodes = self.inner.nodes.borrow_mut();
            nodes.push(node);
            nodes.len() - 1
        }

        // Role descendants are addressable but never part of `children`,
        // which tracks inserted cards only.
        fn link_role(&self, parent: usize, selector: &str, child: usize) {
            let mut nodes = self.inner.nodes.borrow_mut();
            nodes[parent].roles.insert(selector.to_string(), child);
        }

        fn with<R>(&self, node: usize, f: impl FnOnce(&mut MockNode) -> R) -> R {
            f(&mut self.inner.nodes.borrow_mut()[node])
        }

        fn bump(&self) {
            self.inner.structural_ops.set(self.inner.structural_ops.get() + 1);
        }
    }

    impl Dom for MockDom {
        type Node = usize;

        fn find(&self, id: &str) -> Option<usize> {
            let nodes = self.inner.nodes.borrow();
            nodes
                .iter()
                .position(|n| !n.detached && n.attrs.get("id").map(String::as_str) == Some(id))
        }

        fn query(&self, node: &usize, selector: &str) -> Option<usize> {
            self.inner.nodes.borrow()[*node].roles.get(selector).copied()
        }

        fn query_document(&self, selector: &str) -> Option<usize> {
            self.inner.doc_roles.borrow().get(selector).copied()
        }

        fn create_card(&self, template: Template) -> Option<usize> {
            if self.inner.missing_templates.borrow().contains(&template) {
                return None;
            }
            self.bump();
            let card = self.push(MockNode::default());

            let link = self.push(MockNode::default());
            self.link_role(card, selectors::HEADER_LINK, link);
            let days = self.push(MockNode::default());
            self.link_role(card, selectors::HEADER_DAYS, days);

            // The compact template has no assignee or chip containers.
            if template == Template::Full {
                let main = self.push(MockNode::default());
                self.link_role(card, selectors::ASSIGNEES, main);
                let stickers = self.push(MockNode::default());
                self.link_role(card, selectors::STICKERS, stickers);
                let labels = self.push(MockNode::default());
                self.link_role(card, selectors::LABELS, labels);
            }

            Some(card)
        }

        fn attr(&self, node: &usize, name: &str) -> Option<String> {
            self.inner.nodes.borrow()[*node].attrs.get(name).cloned()
        }

        fn set_attr(&self, node: &usize, name: &str, value: &str) {
            self.with(*node, |n| {
                n.attrs.insert(name.to_string(), value.to_string());
            });
        }

        fn set_text(&self, node: &usize, text: &str) {
            self.with(*node, |n| n.text = text.to_string());
        }

        fn set_html(&self, node: &usize, html: &str) {
            self.with(*node, |n| n.html = html.to_string());
        }

        fn toggle_class(&self, node: &usize, class: &str, on: bool) {
            self.with(*node, |n| {
                let current = n.attrs.remove("class").unwrap_or_default();
                let mut classes: Vec<&str> =
                    current.split_whitespace().filter(|c| *c != class).collect();
                if on {
                    classes.push(class);
                }
                n.attrs.insert("class".into(), classes.join(" "));
            });
        }

        fn insert_before(&self, parent: &usize, node: &usize, reference: Option<&usize>) {
            self.bump();
            let mut nodes = self.inner.nodes.borrow_mut();
            // Like the real DOM, inserting an attached node moves it.
            if let Some(old_parent) = nodes[*node].parent.take() {
                nodes[old_parent].children.retain(|c| c != node);
            }
            let at = reference
                .and_then(|r| nodes[*parent].children.iter().position(|c| c == r))
                .unwrap_or(nodes[*parent].children.len());
            nodes[*parent].children.insert(at, *node);
            nodes[*node].parent = Some(*parent);
            nodes[*node].detached = false;
        }

        fn detach(&self, node: &usize) {
            self.bump();
            let mut nodes = self.inner.nodes.borrow_mut();
            if let Some(parent) = nodes[*node].parent.take() {
                nodes[parent].children.retain(|c| c != node);
            }
            nodes[*node].detached = true;
        }

        fn set_opacity(&self, node: &usize, value: f64) {
            self.with(*node, |n| n.opacity = value);
        }

        fn animate_opacity(&self, node: &usize, target: f64) {
            // Transitions complete instantly in the mock.
            self.with(*node, |n| n.opacity = target);
        }

        fn slide_down(&self, node: &usize) {
            self.with(*node, |n| n.hidden = false);
        }

        fn slide_up(&self, _node: &usize) {
            // Visual only; `hide` performs the collapse.
        }

        fn hide(&self, node: &usize) {
            self.with(*node, |n| n.hidden = true);
        }

        fn is_hidden(&self, node: &usize) -> bool {
            self.inner.nodes.borrow()[*node].hidden
        }
    }
}
