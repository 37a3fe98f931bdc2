//! Errors raised at the browser boundary.

use wasm_bindgen::JsValue;

/// Failures talking to the DOM, the Firebase SDK or the embedded config.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Not running in a browser window.
	#[error("no global `window` object")]
	MissingWindow,
	/// The window has no document.
	#[error("window has no document")]
	MissingDocument,
	/// The canvas refused a 2D context.
	#[error("could not acquire a 2d canvas context")]
	CanvasContext,
	/// A JavaScript call threw.
	#[error("javascript error: {0}")]
	Js(String),
	/// The embedded config is not valid JSON for [`AppConfig`](crate::config::AppConfig).
	#[error("invalid configuration: {0}")]
	Config(#[from] serde_json::Error),
	/// The Firebase SDK is missing or uninitialised.
	#[error("authentication backend unavailable: {0}")]
	AuthUnavailable(String),
	/// Firebase rejected the credentials.
	#[error("sign-in failed: {0}")]
	SignIn(String),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Self::Js(describe_js(&value))
	}
}

/// Best-effort human readable text for a thrown JS value.
pub fn describe_js(value: &JsValue) -> String {
	if let Some(text) = value.as_string() {
		return text;
	}
	js_sys::Reflect::get(value, &JsValue::from_str("message"))
		.ok()
		.and_then(|message| message.as_string())
		.unwrap_or_else(|| format!("{value:?}"))
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
