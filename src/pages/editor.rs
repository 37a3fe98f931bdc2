use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

use crate::auth::{AuthProvider, FirebaseAuth};
use crate::components::graph_editor::GraphEditor;
use crate::config::AppConfig;

fn sign_out() {
	let auth = match FirebaseAuth::connect() {
		Ok(auth) => auth,
		Err(err) => {
			error!("cannot sign out: {err}");
			return;
		}
	};
	spawn_local(async move {
		if let Err(err) = auth.sign_out().await {
			error!("sign out failed: {err}");
		}
	});
}

/// Full-window editor with the sign-out control.
#[component]
pub fn Editor() -> impl IntoView {
	let config = use_context::<AppConfig>().unwrap_or_default();
	let logout = config.auth.enabled.then(|| {
		view! {
			<button class="syn-ui-logout" on:click=move |_| sign_out()>
				"Sign out"
			</button>
		}
	});

	view! {
		<div class="fullscreen-graph">
			<GraphEditor config=config.editor fullscreen=true />
			<div class="syn-ui">{logout}</div>
		</div>
	}
}
