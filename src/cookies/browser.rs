//! Browser adapter (wasm32 only).
//!
//! [`HtmlDocumentJar`] exposes the page's `document.cookie` as a
//! [`DocumentJar`], so a [`CookieStore`] compiled to WebAssembly works on the
//! real browser jar. The document is looked up on every call instead of being
//! held, which keeps the jar `Send + Sync`.
use std::any::Any;
use std::sync::Arc;

use crate::cookies::{CookieStore, DocumentJar};
use crate::errors::CookieError;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlDocument;

/// The current page's cookie jar.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlDocumentJar;

impl HtmlDocumentJar {
    pub fn new() -> Self {
        Self
    }

    fn document() -> Result<HtmlDocument, CookieError> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CookieError::Host("no document available".into()))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| CookieError::Host("document is not an HTML document".into()))
    }
}

/// Converts a JavaScript exception into a [`CookieError`].
fn host_error(js_error: JsValue) -> CookieError {
    let message = if let Some(string) = js_error.as_string() {
        string
    } else {
        format!("JavaScript error: {:?}", js_error)
    };
    CookieError::Host(message)
}

impl DocumentJar for HtmlDocumentJar {
    fn as_any(&self) -> &dyn Any { self }

    fn cookie_string(&self) -> Result<String, CookieError> {
        Self::document()?.cookie().map_err(host_error)
    }

    fn write_entry(&self, descriptor: &str) -> Result<(), CookieError> {
        Self::document()?.set_cookie(descriptor).map_err(host_error)
    }
}

impl CookieStore {
    /// Creates a store over the current page's `document.cookie`.
    pub fn for_document() -> Self {
        CookieStore::new(Arc::new(HtmlDocumentJar::new()))
    }
}
