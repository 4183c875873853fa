use thiserror::Error;

/// Failures that can occur while mounting a scene or loading configuration.
///
/// Nothing on the render path returns these: a missing surface degrades to
/// drawing nothing.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no global window")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("canvas element `{0}` not found")]
    CanvasNotFound(String),
    #[error("2d drawing context unavailable")]
    ContextUnavailable,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("javascript error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SceneError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        SceneError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
