//! Authentication gate.
//!
//! The editor never checks permissions itself. It only observes whether a
//! user is signed in and sends signed-out visitors to the login route.

mod firebase;
mod memory;

use std::future::Future;
use std::pin::Pin;

use log::info;

pub use firebase::FirebaseAuth;
pub use memory::MemoryAuth;

use crate::error::Result;

/// Route of the sign-in form.
pub const LOGIN_PATH: &str = "/login";
/// Route of the editor.
pub const EDITOR_PATH: &str = "/";

/// Identity reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
	/// Backend user id.
	pub uid: String,
	/// Account email, when the provider exposes one.
	pub email: Option<String>,
}

/// One observation of the authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
	/// A user is signed in.
	SignedIn(AuthUser),
	/// Nobody is signed in.
	SignedOut,
}

impl AuthState {
	/// Whether a user identity is present.
	pub fn is_signed_in(&self) -> bool {
		matches!(self, Self::SignedIn(_))
	}
}

/// Callback invoked on every authentication state observation.
pub type AuthListener = Box<dyn Fn(AuthState)>;

/// Completion of a sign-in or sign-out request.
pub type AuthFuture = Pin<Box<dyn Future<Output = Result<()>>>>;

/// Keeps an auth listener registered. Dropping it unsubscribes.
pub struct AuthSubscription {
	unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl AuthSubscription {
	/// Wraps the function that removes the listener.
	pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
		Self {
			unsubscribe: Some(Box::new(unsubscribe)),
		}
	}

	/// Leaves the listener registered for the rest of the page's life.
	pub fn detach(self) {
		std::mem::forget(self);
	}
}

impl Drop for AuthSubscription {
	fn drop(&mut self) {
		if let Some(unsubscribe) = self.unsubscribe.take() {
			unsubscribe();
		}
	}
}

/// The authentication backend as seen by the editor.
pub trait AuthProvider {
	/// Registers `listener`; it fires with the current state and on every change.
	fn on_auth_state_changed(&self, listener: AuthListener) -> AuthSubscription;

	/// Signs the current user out.
	fn sign_out(&self) -> AuthFuture;

	/// Signs in with email and password.
	fn sign_in(&self, email: &str, password: &str) -> AuthFuture;
}

/// Where a visitor on `path` must go given an auth observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
	/// Leave the visitor where they are.
	Stay,
	/// Navigate to this route.
	Redirect(&'static str),
}

/// Signed-out visitors anywhere but the login route are sent to it; signed-in
/// visitors on the login route are sent to the editor.
pub fn gate_decision(state: &AuthState, path: &str) -> GateDecision {
	match state {
		AuthState::SignedOut if path != LOGIN_PATH => GateDecision::Redirect(LOGIN_PATH),
		AuthState::SignedIn(_) if path == LOGIN_PATH => GateDecision::Redirect(EDITOR_PATH),
		_ => GateDecision::Stay,
	}
}

/// Subscribes `sink` to `provider`, logging every transition.
pub fn watch(provider: &dyn AuthProvider, sink: impl Fn(AuthState) + 'static) -> AuthSubscription {
	provider.on_auth_state_changed(Box::new(move |state| {
		match &state {
			AuthState::SignedIn(user) => info!("signed in as {}", user.email.as_deref().unwrap_or(&user.uid)),
			AuthState::SignedOut => info!("signed out"),
		}
		sink(state);
	}))
}
