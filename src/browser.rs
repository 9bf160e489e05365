//! Browser Bindings
//!
//! `Dom` and `Scheduler` implementations over web-sys and gloo-timers.
//! Everything here is thin plumbing; the engine never calls web-sys
//! directly.

use crate::dom::{Dom, Template};
use crate::sched::Scheduler;
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

const FULL_TEMPLATE_ID: &str = "card-template";
const COMPACT_TEMPLATE_ID: &str = "compact-card-template";

/// Opacity transition approximating the fade the board used before.
const FADE_TRANSITION: &str = "opacity 0.4s ease";

#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new(document: Document) -> Self {
        BrowserDom { document }
    }

    fn style(node: &Element) -> Option<web_sys::CssStyleDeclaration> {
        node.dyn_ref::<HtmlElement>().map(|el| el.style())
    }

    fn set_style(node: &Element, property: &str, value: &str) {
        if let Some(style) = Self::style(node) {
            let _ = style.set_property(property, value);
        }
    }
}

impl Dom for BrowserDom {
    type Node = Element;

    fn find(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query(&self, node: &Element, selector: &str) -> Option<Element> {
        node.query_selector(selector).ok().flatten()
    }

    fn query_document(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn create_card(&self, template: Template) -> Option<Element> {
        let id = match template {
            Template::Full => FULL_TEMPLATE_ID,
            Template::Compact => COMPACT_TEMPLATE_ID,
        };
        let tmpl = self.document.get_element_by_id(id)?;
        let holder = self.document.create_element("div").ok()?;
        holder.set_inner_html(&tmpl.inner_html());
        holder.first_element_child()
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attr(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn toggle_class(&self, node: &Element, class: &str, on: bool) {
        let list = node.class_list();
        let _ = if on { list.add_1(class) } else { list.remove_1(class) };
    }

    fn insert_before(&self, parent: &Element, node: &Element, reference: Option<&Element>) {
        let _ = parent.insert_before(node, reference.map(|r| r.unchecked_ref()));
    }

    fn detach(&self, node: &Element) {
        node.remove();
    }

    fn set_opacity(&self, node: &Element, value: f64) {
        Self::set_style(node, "transition", "");
        Self::set_style(node, "opacity", &value.to_string());
    }

    fn animate_opacity(&self, node: &Element, target: f64) {
        Self::set_style(node, "transition", FADE_TRANSITION);
        Self::set_style(node, "opacity", &target.to_string());
    }

    fn slide_down(&self, node: &Element) {
        Self::set_style(node, "display", "");
        let list = node.class_list();
        let _ = list.remove_1("sliding-up");
        let _ = list.add_1("sliding-down");
    }

    fn slide_up(&self, node: &Element) {
        let list = node.class_list();
        let _ = list.remove_1("sliding-down");
        let _ = list.add_1("sliding-up");
    }

    fn hide(&self, node: &Element) {
        Self::set_style(node, "display", "none");
    }

    fn is_hidden(&self, node: &Element) -> bool {
        Self::style(node)
            .and_then(|style| style.get_property_value("display").ok())
            .map(|display| display == "none")
            .unwrap_or(false)
    }
}

/// Cancel-on-drop wrapper over gloo's timer handles.
pub enum BrowserHandle {
    Timeout(Timeout),
    Interval(Interval),
}

#[derive(Clone)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = BrowserHandle;

    fn timeout(&self, delay_ms: u32, f: Box<dyn FnOnce()>) -> BrowserHandle {
        BrowserHandle::Timeout(Timeout::new(delay_ms, move || f()))
    }

    fn interval(&self, period_ms: u32, f: Box<dyn FnMut()>) -> BrowserHandle {
        let mut f = f;
        BrowserHandle::Interval(Interval::new(period_ms, move || f()))
    }
}
