use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::auth::{AuthProvider, FirebaseAuth};

/// Email and password sign-in. The auth gate leaves this page once the backend
/// reports a signed-in user.
#[component]
pub fn Login() -> impl IntoView {
	let email = RwSignal::new(String::new());
	let password = RwSignal::new(String::new());
	let failure = RwSignal::new(None::<String>);
	let pending = RwSignal::new(false);

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		if pending.get_untracked() {
			return;
		}
		let auth = match FirebaseAuth::connect() {
			Ok(auth) => auth,
			Err(err) => {
				failure.set(Some(err.to_string()));
				return;
			}
		};
		let (email, password) = (email.get_untracked(), password.get_untracked());
		pending.set(true);
		failure.set(None);
		spawn_local(async move {
			match auth.sign_in(&email, &password).await {
				Ok(()) => info!("sign-in accepted for {email}"),
				Err(err) => {
					warn!("sign-in rejected: {err}");
					failure.set(Some(err.to_string()));
				}
			}
			pending.set(false);
		});
	};

	view! {
		<div class="syn-page syn-login">
			<form on:submit=on_submit>
				<h1>"Sign in"</h1>
				<input
					type="email"
					placeholder="Email"
					autocomplete="username"
					prop:value=move || email.get()
					on:input=move |ev| email.set(event_target_value(&ev))
				/>
				<input
					type="password"
					placeholder="Password"
					autocomplete="current-password"
					prop:value=move || password.get()
					on:input=move |ev| password.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=move || pending.get()>
					"Sign in"
				</button>
				{move || failure.get().map(|message| view! { <p class="syn-login-error">{message}</p> })}
			</form>
		</div>
	}
}
