use wasm_bindgen::prelude::*;
use web_sys::{window, Document};

use crate::error::SceneError;
use crate::styles::{StyleRegistry, StyleSheet};

/// The page's `<head>`, one `<style>` element per id.
pub struct DocumentStyleSheet {
    document: Document,
}

impl DocumentStyleSheet {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn append(&self, id: &str, css: &str) -> Result<(), JsValue> {
        let style = self.document.create_element("style")?;
        style.set_id(id);
        style.set_text_content(Some(css));
        let head = self.document.head().ok_or("document has no <head>")?;
        head.append_child(&style)?;
        Ok(())
    }
}

impl StyleSheet for DocumentStyleSheet {
    fn contains(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn insert(&mut self, id: &str, css: &str) {
        if let Err(err) = self.append(id, css) {
            log::warn!("style `{id}` not injected: {err:?}");
        }
    }
}

/// Registers the overlay keyframes in the page once. Returns whether this
/// call inserted them.
#[wasm_bindgen(js_name = ensureStyles)]
pub fn ensure_styles() -> Result<bool, JsValue> {
    let document = window()
        .ok_or(SceneError::NoWindow)?
        .document()
        .ok_or(SceneError::NoDocument)?;
    let mut sheet = DocumentStyleSheet::new(document);
    Ok(StyleRegistry::global().ensure_registered(&mut sheet))
}
