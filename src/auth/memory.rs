use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{AuthFuture, AuthListener, AuthProvider, AuthState, AuthSubscription, AuthUser};
use crate::error::Error;

#[derive(Default)]
struct Inner {
	state: Option<AuthUser>,
	accounts: HashMap<String, String>,
	listeners: Vec<(u64, Rc<dyn Fn(AuthState)>)>,
	next_listener: u64,
}

/// In-process auth backend. Useful for tests and for running the editor without Firebase.
#[derive(Clone, Default)]
pub struct MemoryAuth {
	inner: Rc<RefCell<Inner>>,
}

impl MemoryAuth {
	/// Backend with nobody signed in.
	pub fn signed_out() -> Self {
		Self::default()
	}

	/// Backend with `user` already signed in.
	pub fn signed_in(user: AuthUser) -> Self {
		let auth = Self::default();
		auth.inner.borrow_mut().state = Some(user);
		auth
	}

	/// Registers an account that `sign_in` will accept.
	pub fn with_account(self, email: &str, password: &str) -> Self {
		self.inner
			.borrow_mut()
			.accounts
			.insert(email.to_owned(), password.to_owned());
		self
	}

	/// Current state.
	pub fn state(&self) -> AuthState {
		match &self.inner.borrow().state {
			Some(user) => AuthState::SignedIn(user.clone()),
			None => AuthState::SignedOut,
		}
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	fn set_state(&self, user: Option<AuthUser>) {
		self.inner.borrow_mut().state = user;
		let state = self.state();
		// listeners may re-enter the backend, so call them without holding the borrow
		let listeners: Vec<_> = self
			.inner
			.borrow()
			.listeners
			.iter()
			.map(|(_, listener)| listener.clone())
			.collect();
		for listener in listeners {
			listener(state.clone());
		}
	}
}

impl AuthProvider for MemoryAuth {
	fn on_auth_state_changed(&self, listener: AuthListener) -> AuthSubscription {
		let listener: Rc<dyn Fn(AuthState)> = Rc::from(listener);
		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = inner.next_listener;
			inner.next_listener += 1;
			inner.listeners.push((id, listener.clone()));
			id
		};
		listener(self.state());

		let inner = Rc::downgrade(&self.inner);
		AuthSubscription::new(move || {
			if let Some(inner) = inner.upgrade() {
				inner.borrow_mut().listeners.retain(|(other, _)| *other != id);
			}
		})
	}

	fn sign_out(&self) -> AuthFuture {
		self.set_state(None);
		Box::pin(std::future::ready(Ok(())))
	}

	fn sign_in(&self, email: &str, password: &str) -> AuthFuture {
		let accepted = self.inner.borrow().accounts.get(email).is_some_and(|p| p == password);
		let result = if accepted {
			self.set_state(Some(AuthUser {
				uid: format!("memory:{email}"),
				email: Some(email.to_owned()),
			}));
			Ok(())
		} else {
			Err(Error::SignIn("invalid email or password".into()))
		};
		Box::pin(std::future::ready(result))
	}
}

#[cfg(test)]
mod tests {
	use pollster::block_on;

	use super::*;

	#[test]
	fn sign_in_checks_credentials() {
		let auth = MemoryAuth::signed_out().with_account("ada@example.com", "engine");
		assert!(matches!(
			block_on(auth.sign_in("ada@example.com", "wrong")),
			Err(Error::SignIn(_))
		));
		assert_eq!(auth.state(), AuthState::SignedOut);

		block_on(auth.sign_in("ada@example.com", "engine")).unwrap();
		assert!(auth.state().is_signed_in());
	}

	#[test]
	fn listeners_fire_on_subscribe_and_change() {
		let auth = MemoryAuth::signed_out().with_account("a@b.c", "pw");
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		let _sub = auth.on_auth_state_changed(Box::new(move |state| {
			sink.borrow_mut().push(state.is_signed_in())
		}));
		block_on(auth.sign_in("a@b.c", "pw")).unwrap();
		block_on(auth.sign_out()).unwrap();
		assert_eq!(*seen.borrow(), vec![false, true, false]);
	}
}
