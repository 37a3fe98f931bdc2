//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod auth;
pub mod components;
pub mod config;
pub mod error;
mod pages;

use crate::components::auth_gate::AuthGate;
use crate::config::AppConfig;
use crate::pages::editor::Editor;
use crate::pages::login::Login;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Routes the editor and login pages behind the authentication gate.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	provide_context(AppConfig::load());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Synapse" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<AuthGate>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Editor />
					<Route path=path!("/login") view=Login />
				</Routes>
			</AuthGate>
		</Router>
	}
}
