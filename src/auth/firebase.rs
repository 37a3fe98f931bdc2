//! Bindings to the Firebase Auth namespace (`firebase.auth()`) loaded by the host page.

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::{AuthFuture, AuthListener, AuthProvider, AuthState, AuthSubscription, AuthUser};
use crate::error::{Error, Result, describe_js};

#[wasm_bindgen]
extern "C" {
	#[derive(Clone)]
	type JsAuth;

	#[wasm_bindgen(catch, js_namespace = firebase, js_name = auth)]
	fn firebase_auth() -> std::result::Result<JsAuth, JsValue>;

	#[wasm_bindgen(method, js_name = onAuthStateChanged)]
	fn on_auth_state_changed(this: &JsAuth, observer: &Closure<dyn FnMut(JsValue)>) -> Function;

	#[wasm_bindgen(method, js_name = signOut)]
	fn sign_out(this: &JsAuth) -> Promise;

	#[wasm_bindgen(method, js_name = signInWithEmailAndPassword)]
	fn sign_in_with_email_and_password(this: &JsAuth, email: &str, password: &str) -> Promise;
}

/// Firebase-backed [`AuthProvider`].
#[derive(Clone)]
pub struct FirebaseAuth {
	auth: JsAuth,
}

impl FirebaseAuth {
	/// Connects to the default Firebase app. Fails if the SDK is missing or uninitialised.
	pub fn connect() -> Result<Self> {
		let auth = firebase_auth().map_err(|err| Error::AuthUnavailable(describe_js(&err)))?;
		Ok(Self { auth })
	}
}

fn state_from_js(user: &JsValue) -> AuthState {
	if user.is_null() || user.is_undefined() {
		return AuthState::SignedOut;
	}
	let field = |name: &str| {
		Reflect::get(user, &JsValue::from_str(name))
			.ok()
			.and_then(|value| value.as_string())
	};
	AuthState::SignedIn(AuthUser {
		uid: field("uid").unwrap_or_default(),
		email: field("email"),
	})
}

fn settle(promise: Promise, wrap: fn(String) -> Error) -> AuthFuture {
	Box::pin(async move {
		JsFuture::from(promise)
			.await
			.map(|_| ())
			.map_err(|err| wrap(describe_js(&err)))
	})
}

impl AuthProvider for FirebaseAuth {
	fn on_auth_state_changed(&self, listener: AuthListener) -> AuthSubscription {
		let observer = Closure::<dyn FnMut(JsValue)>::new(move |user: JsValue| {
			listener(state_from_js(&user));
		});
		let unsubscribe = self.auth.on_auth_state_changed(&observer);
		AuthSubscription::new(move || {
			let _ = unsubscribe.call0(&JsValue::NULL);
			drop(observer);
		})
	}

	fn sign_out(&self) -> AuthFuture {
		settle(self.auth.sign_out(), Error::Js)
	}

	fn sign_in(&self, email: &str, password: &str) -> AuthFuture {
		settle(
			self.auth.sign_in_with_email_and_password(email, password),
			Error::SignIn,
		)
	}
}
