//! Route guard driven by the auth provider.

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use leptos_router::NavigateOptions;
use log::{error, warn};

use crate::auth::{AuthState, FirebaseAuth, GateDecision, gate_decision, watch};
use crate::config::AppConfig;

/// Shows its children only to visitors the auth gate lets stay on the current
/// route, and navigates everyone else.
#[component]
pub fn AuthGate(children: ChildrenFn) -> impl IntoView {
	let enabled = use_context::<AppConfig>().unwrap_or_default().auth.enabled;
	let observed = RwSignal::new(None::<AuthState>);
	let pathname = use_location().pathname;

	if enabled {
		match FirebaseAuth::connect() {
			// the gate lives as long as the page
			Ok(auth) => watch(&auth, move |state| observed.set(Some(state))).detach(),
			Err(err) => {
				error!("{err}, treating visitor as signed out");
				observed.set(Some(AuthState::SignedOut));
			}
		}
	} else {
		warn!("authentication gate disabled by configuration");
	}

	let navigate = use_navigate();
	Effect::new(move |_| {
		let Some(state) = observed.get() else {
			return;
		};
		if let GateDecision::Redirect(to) = gate_decision(&state, &pathname.get()) {
			navigate(to, NavigateOptions::default());
		}
	});

	let allowed = move || {
		!enabled
			|| observed.with(|state| {
				state
					.as_ref()
					.is_some_and(|state| gate_decision(state, &pathname.get()) == GateDecision::Stay)
			})
	};

	view! { <Show when=allowed>{children()}</Show> }
}
