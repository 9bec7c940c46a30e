//! Stage orchestrators powered by the task client.

pub mod common;
pub mod generate;
pub mod poll;

mod submit;
mod token;

pub use generate::*;
pub use poll::*;

// self
use crate::{_prelude::*, descriptor::ServiceDescriptor, http::TaskHttpClient};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Task client specialized for the crate's default reqwest transport.
pub type ReqwestTaskClient = TaskClient<ReqwestHttpClient>;

/// Drives the token → submit → poll sequence against a single service descriptor.
///
/// The client holds only immutable configuration plus a shareable transport. Everything scoped
/// to one invocation (credentials, the access token, the task id) travels through method
/// arguments, so one client can serve any number of sequential or concurrent invocations
/// without sharing state between them.
#[derive(Clone)]
pub struct TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Service host and endpoint paths.
	pub descriptor: ServiceDescriptor,
	/// Fixed polling cadence and time budget.
	pub poll_policy: PollPolicy,
}
impl<C> TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(descriptor: ServiceDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), descriptor, poll_policy: PollPolicy::default() }
	}

	/// Replaces the polling cadence.
	pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
		self.poll_policy = poll_policy;

		self
	}
}
#[cfg(feature = "reqwest")]
impl TaskClient<ReqwestHttpClient> {
	/// Creates a new client for the provided descriptor.
	///
	/// The client provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly.
	pub fn new(descriptor: ServiceDescriptor) -> Self {
		Self::with_http_client(descriptor, ReqwestHttpClient::default())
	}
}
impl<C> Debug for TaskClient<C>
where
	C: ?Sized + TaskHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TaskClient")
			.field("descriptor", &self.descriptor)
			.field("poll_policy", &self.poll_policy)
			.finish()
	}
}
