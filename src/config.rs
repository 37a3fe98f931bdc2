//! Application configuration.
//!
//! Defaults reproduce the stock editor. A page may override any subset of
//! fields with a JSON document embedded as
//! `<script id="synapse-config" type="application/json">`.

use log::warn;
use serde::Deserialize;

use crate::components::graph_editor::{CardGeometry, LayoutParams};
use crate::error::{Error, Result};

/// Id of the script element holding the JSON overrides.
pub const CONFIG_ELEMENT_ID: &str = "synapse-config";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Editor canvas settings.
	pub editor: EditorConfig,
	/// Authentication gate settings.
	pub auth: AuthConfig,
}

/// Editor canvas settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Force layout parameters.
	pub layout: LayoutParams,
	/// Lower zoom bound.
	pub min_scale: f64,
	/// Upper zoom bound.
	pub max_scale: f64,
	/// Pointer travel, in screen pixels, below which a press on a node still counts as a click.
	pub click_threshold: f64,
	/// Screen-pixel tolerance for pressing a link.
	pub link_hit_tolerance: f64,
	/// Unpin a repositioned node as soon as it is dropped.
	pub release_on_drop: bool,
	/// Card shape drawn for every node.
	pub card: CardGeometry,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			layout: LayoutParams::default(),
			min_scale: 0.25,
			max_scale: 1.0,
			click_threshold: 4.0,
			link_hit_tolerance: 6.0,
			release_on_drop: false,
			card: CardGeometry::default(),
		}
	}
}

/// Authentication gate settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	/// Require a signed-in user before the editor is shown.
	pub enabled: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self { enabled: true }
	}
}

impl AppConfig {
	/// Parses a (possibly partial) JSON override document.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Reads overrides from the current document, falling back to defaults.
	pub fn load() -> Self {
		match Self::from_document() {
			Ok(Some(config)) => config,
			Ok(None) => Self::default(),
			Err(err) => {
				warn!("ignoring page configuration: {err}");
				Self::default()
			}
		}
	}

	fn from_document() -> Result<Option<Self>> {
		let document = web_sys::window()
			.ok_or(Error::MissingWindow)?
			.document()
			.ok_or(Error::MissingDocument)?;
		let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
			return Ok(None);
		};
		match element.text_content() {
			Some(text) if !text.trim().is_empty() => Self::from_json(&text).map(Some),
			_ => Ok(None),
		}
	}
}
