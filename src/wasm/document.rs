//! [`Dom`] over the live page.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, HtmlMediaElement, MouseEvent, Node};

use crate::content::{ClickHandler, Dom};
use crate::error::{Error, Result};

use super::describe;

/// The page document as seen from the content program.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    /// Wraps the current window's document.
    ///
    /// # Errors
    ///
    /// [`Error::Dom`] outside a window context.
    pub fn from_window() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| Error::dom("no window document"))?;
        Ok(Self { document })
    }

    /// Element the mutation observer should watch: `<body>`, or the root
    /// element when the body is not parsed yet.
    ///
    /// # Errors
    ///
    /// [`Error::Dom`] for an empty document.
    pub fn observe_root(&self) -> Result<Element> {
        self.document
            .body()
            .map(Element::from)
            .or_else(|| self.document.document_element())
            .ok_or_else(|| Error::dom("document has no root element"))
    }
}

fn dom_error(context: &str) -> impl Fn(wasm_bindgen::JsValue) -> Error + '_ {
    move |e| Error::dom(format!("{context}: {}", describe(&e)))
}

impl Dom for WebDocument {
    type Node = Element;

    fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        self.document
            .query_selector(selector)
            .map_err(dom_error(selector))
    }

    fn query_selector_in(&self, scope: &Element, selector: &str) -> Result<Option<Element>> {
        scope.query_selector(selector).map_err(dom_error(selector))
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn media_duration(&self, node: &Element) -> Option<f64> {
        node.dyn_ref::<HtmlMediaElement>().map(HtmlMediaElement::duration)
    }

    fn set_media_position(&self, node: &Element, seconds: f64) -> Result<()> {
        let media = node
            .dyn_ref::<HtmlMediaElement>()
            .ok_or_else(|| Error::dom(format!("<{}> is not a media element", node.tag_name())))?;
        media.set_current_time(seconds);
        Ok(())
    }

    fn click(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.click();
        }
    }

    fn create_element(&self, tag: &str) -> Result<Element> {
        self.document
            .create_element(tag)
            .map_err(dom_error("createElement"))
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<()> {
        node.set_attribute(name, value).map_err(dom_error(name))
    }

    fn append_clone(&self, parent: &Element, source: &Element) -> Result<()> {
        let copy = source
            .clone_node_with_deep(true)
            .map_err(dom_error("cloneNode"))?;
        parent.append_child(&copy).map_err(dom_error("appendChild"))?;
        Ok(())
    }

    fn set_inner_html(&self, node: &Element, html: &str) -> Result<()> {
        node.set_inner_html(html);
        Ok(())
    }

    fn insert_before(&self, parent: &Element, node: &Element, reference: &Element) -> Result<()> {
        let reference: &Node = reference;
        parent
            .insert_before(node, Some(reference))
            .map_err(dom_error("insertBefore"))?;
        Ok(())
    }

    fn set_click_handler(&self, node: &Element, handler: ClickHandler) -> Result<()> {
        let element = node
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| Error::dom(format!("<{}> cannot take a click handler", node.tag_name())))?;

        // The JS function owns the closure; it is freed once the button is
        // removed and collected.
        let closure =
            Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| handler()).into_js_value();
        element.set_onclick(Some(closure.unchecked_ref()));
        Ok(())
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }
}
