//! HMAC request signatures for the task endpoints.
//!
//! Every signed call carries `X-Timestamp` (epoch seconds) and `X-Signature`, where the
//! signature is the lowercase hex HMAC-SHA256 of
//!
//! ```text
//! METHOD&PATH&TIMESTAMP&CANONICAL_QUERY&NORMALIZED_BODY
//! ```
//!
//! keyed by the app secret. `NORMALIZED_BODY` is the transmitted body with every whitespace
//! character removed, so the service signs compacted JSON while the wire carries the original
//! text. [`SignedRequest`] produces the timestamp and the signature together so the two can
//! never drift apart.

// crates.io
use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::AppSecret, obs::Stage};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signing timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

const PAYLOAD_DELIMITER: &str = "&";

/// Epoch-seconds timestamp rendered exactly as it is sent and signed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp(String);
impl Timestamp {
	/// Captures the current wall-clock second.
	pub fn now() -> Self {
		Self::from_unix(OffsetDateTime::now_utc().unix_timestamp())
	}

	/// Wraps a fixed epoch second.
	pub fn from_unix(seconds: i64) -> Self {
		Self(seconds.to_string())
	}

	/// Returns the decimal representation.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for Timestamp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// A request whose signature was derived from its own method, path, query, body, and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: Method,
	/// Request path without host or query.
	pub path: String,
	/// Timestamp placed in [`TIMESTAMP_HEADER`].
	pub timestamp: Timestamp,
	/// Literal query string sent on the wire (empty when the request has none).
	pub canonical_query: String,
	/// Body sent on the wire, before normalization.
	pub body: String,
	/// Lowercase hex signature placed in [`SIGNATURE_HEADER`].
	pub signature: String,
}
impl SignedRequest {
	/// Signs a request stamped with the current second.
	pub fn now(
		stage: Stage,
		method: Method,
		path: impl Into<String>,
		canonical_query: impl Into<String>,
		body: impl Into<String>,
		secret: &AppSecret,
	) -> Self {
		let signed = Self::at(Timestamp::now(), method, path, canonical_query, body, secret);

		crate::obs::record_signature(stage, signed.timestamp.as_str(), &signed.signature);

		signed
	}

	/// Signs a request stamped with `timestamp`.
	pub fn at(
		timestamp: Timestamp,
		method: Method,
		path: impl Into<String>,
		canonical_query: impl Into<String>,
		body: impl Into<String>,
		secret: &AppSecret,
	) -> Self {
		let path = path.into();
		let canonical_query = canonical_query.into();
		let body = body.into();
		let signature = sign(
			method.as_str(),
			&path,
			timestamp.as_str(),
			&canonical_query,
			&body,
			secret.expose(),
		);

		Self { method, path, timestamp, canonical_query, body, signature }
	}
}

/// Removes every whitespace character from `body`; blank input yields `""`.
///
/// Whitespace follows the ECMAScript `\s` class the service uses: Unicode `White_Space`
/// without U+0085, plus U+FEFF.
pub fn normalize_body(body: &str) -> String {
	body.chars().filter(|c| !is_signature_whitespace(*c)).collect()
}

/// Joins the signed fields with `&`, normalizing the body first.
pub fn canonical_payload(
	method: &str,
	path: &str,
	timestamp: &str,
	canonical_query: &str,
	body: &str,
) -> String {
	[method, path, timestamp, canonical_query, &normalize_body(body)].join(PAYLOAD_DELIMITER)
}

/// Computes the lowercase hex HMAC-SHA256 signature of a request.
pub fn sign(
	method: &str,
	path: &str,
	timestamp: &str,
	canonical_query: &str,
	body: &str,
	secret: &str,
) -> String {
	let payload = canonical_payload(method, path, timestamp, canonical_query, body);

	hmac_sha256_hex(secret.as_bytes(), payload.as_bytes())
}

fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take a key of any size.");

	mac.update(data);

	hex::encode(mac.finalize().into_bytes())
}

fn is_signature_whitespace(c: char) -> bool {
	match c {
		'\u{FEFF}' => true,
		'\u{0085}' => false,
		_ => c.is_whitespace(),
	}
}
