//! Application credentials and the per-invocation signing session.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AppKey, AppSecret},
};

/// Application key/secret pair supplied by the caller for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Public application key, sent on the token endpoint.
	pub app_key: AppKey,
	/// Shared secret, sent on the token endpoint and used as the HMAC key afterwards.
	pub app_secret: AppSecret,
}
impl Credentials {
	/// Creates a credential pair.
	pub fn new(app_key: AppKey, app_secret: AppSecret) -> Self {
		Self { app_key, app_secret }
	}

	/// Opens a signing session once the token endpoint has issued `access_token`.
	pub fn session(&self, access_token: AccessToken) -> Session {
		Session { access_token, app_secret: self.app_secret.clone() }
	}
}

/// Immutable per-invocation context handed to every signed stage.
///
/// Nothing here outlives the invocation: the token is never cached and the session is dropped
/// once polling finishes or times out.
#[derive(Clone, Debug)]
pub struct Session {
	/// Bearer token attached to signed calls.
	pub access_token: AccessToken,
	/// HMAC key used for request signatures.
	pub app_secret: AppSecret,
}
impl Session {
	/// Creates a session from its parts.
	pub fn new(access_token: AccessToken, app_secret: AppSecret) -> Self {
		Self { access_token, app_secret }
	}
}
