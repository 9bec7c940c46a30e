//! Client-level error types shared across flows, the transport seam, and the field adapter.

// self
use crate::{_prelude::*, obs::Stage};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// [`Error::Auth`] and [`Error::Submission`] are logical rejections reported by the service;
/// the generation flow turns them into soft failures. Every other variant is a hard failure.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, request construction).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Service answered with a body the client could not understand.
	#[error(transparent)]
	Response(#[from] ResponseError),

	/// Token endpoint rejected the application credentials.
	#[error("Token endpoint rejected the application credentials: {reason}.")]
	Auth {
		/// Service-supplied reason string, when available.
		reason: String,
	},
	/// Task endpoint declined to create a generation task.
	#[error("Task endpoint declined the generation request: {reason}.")]
	Submission {
		/// Service-supplied reason string, when available.
		reason: String,
	},
}
impl Error {
	/// Returns `true` for logical rejections that should surface as soft failures.
	pub fn is_rejection(&self) -> bool {
		matches!(self, Self::Auth { .. } | Self::Submission { .. })
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Service descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::descriptor::ServiceDescriptorError),
	/// Endpoint URL could not be assembled from the descriptor.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpoint {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Generation request could not be serialized into a JSON body.
	#[error("Generation request could not be serialized.")]
	RequestSerialize(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {stage} endpoint.")]
	Network {
		/// Stage whose request failed.
		stage: Stage,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outbound request could not be assembled.
	#[error("HTTP request for the {stage} endpoint could not be built.")]
	Request {
		/// Stage whose request failed.
		stage: Stage,
		/// Underlying `http` builder failure.
		#[source]
		source: ::http::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(stage: Stage, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { stage, source: Box::new(src) }
	}
}

/// Failures while interpreting a service response body.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Response body was not the JSON document the stage expects.
	#[error("The {stage} endpoint returned malformed JSON.")]
	Malformed {
		/// Stage whose response failed to parse.
		stage: Stage,
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response reported success but omitted a field the stage requires.
	#[error("The {stage} endpoint response is missing `{field}`.")]
	MissingField {
		/// Stage whose response was incomplete.
		stage: Stage,
		/// JSON path of the absent field.
		field: &'static str,
	},
	/// Task identifier returned by the service failed validation.
	#[error("The {stage} endpoint returned an invalid task identifier.")]
	InvalidTaskId {
		/// Stage that received the identifier.
		stage: Stage,
		/// Validation failure.
		#[source]
		source: crate::auth::IdentifierError,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn rejections_are_distinguished_from_hard_failures() {
		assert!(Error::Auth { reason: "bad key".into() }.is_rejection());
		assert!(Error::Submission { reason: "quota".into() }.is_rejection());
		assert!(
			!Error::from(ResponseError::MissingField { stage: Stage::Token, field: "data" })
				.is_rejection()
		);
	}

	#[test]
	fn transport_errors_name_the_stage() {
		let err = TransportError::network(
			Stage::Poll,
			std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"),
		);

		assert_eq!(err.to_string(), "Network error occurred while calling the poll endpoint.");
	}
}
