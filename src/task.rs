//! Wire models for the image-task protocol: the generation request and the response
//! envelopes of the token, creation, and status endpoints.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, IdentifierError, TaskId},
	error::ConfigError,
};

/// Model requested when the caller does not pick one.
pub const DEFAULT_MODEL_NAME: &str = "gpt-image-1";

/// Rendering quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageQuality {
	/// Highest fidelity.
	High,
	#[default]
	/// Balanced quality.
	Medium,
	/// Fastest rendering.
	Low,
}

/// Output dimensions. Serialized with the service's underscore-prefixed labels
/// (`_1024x1024`); plain `1024x1024` is accepted when deserializing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
	#[default]
	/// 1024×1024.
	#[serde(rename = "_1024x1024", alias = "1024x1024")]
	Square,
	/// 1024×1536.
	#[serde(rename = "_1024x1536", alias = "1024x1536")]
	Portrait,
	/// 1536×1024.
	#[serde(rename = "_1536x1024", alias = "1536x1024")]
	Landscape,
}
impl ImageSize {
	/// Returns `(width, height)` in pixels.
	pub const fn dimensions(self) -> (u32, u32) {
		match self {
			ImageSize::Square => (1024, 1024),
			ImageSize::Portrait => (1024, 1536),
			ImageSize::Landscape => (1536, 1024),
		}
	}
}
impl Display for ImageSize {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let (width, height) = self.dimensions();

		write!(f, "{width}x{height}")
	}
}

/// Number of images to generate, restricted to `1..=3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ImageAmount(u8);
impl ImageAmount {
	/// Largest batch the service accepts.
	pub const MAX: u8 = 3;

	/// Validates and wraps `value`.
	pub fn new(value: u8) -> Result<Self, GenerationRequestError> {
		if (1..=Self::MAX).contains(&value) {
			Ok(Self(value))
		} else {
			Err(GenerationRequestError::AmountOutOfRange { value })
		}
	}

	/// Returns the wrapped count.
	pub const fn get(self) -> u8 {
		self.0
	}
}
impl Default for ImageAmount {
	fn default() -> Self {
		Self(1)
	}
}
impl TryFrom<u8> for ImageAmount {
	type Error = GenerationRequestError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ImageAmount> for u8 {
	fn from(value: ImageAmount) -> Self {
		value.0
	}
}

/// Validation failures for [`GenerationRequest`] inputs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum GenerationRequestError {
	/// The image description was empty or whitespace.
	#[error("Image description cannot be empty.")]
	EmptyUserText,
	/// The model name was empty or whitespace.
	#[error("Model name cannot be empty.")]
	EmptyModelName,
	/// The amount is outside `1..=3`.
	#[error("Image amount must be between 1 and 3, got {value}.")]
	AmountOutOfRange {
		/// Rejected amount.
		value: u8,
	},
}

/// Task-creation payload sent to the service.
///
/// The struct is immutable once built: `with_*` helpers consume and return the value, and the
/// serialized form is produced exactly once per submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
	model_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	system_text: Option<String>,
	user_text: String,
	quality: ImageQuality,
	image_size: ImageSize,
	amount: ImageAmount,
	should_retry: bool,
	#[serde(rename = "async")]
	is_async: bool,
}
impl GenerationRequest {
	/// Creates an asynchronous, non-retrying request with default settings.
	pub fn new(user_text: impl Into<String>) -> Result<Self, GenerationRequestError> {
		let user_text = user_text.into();

		if user_text.trim().is_empty() {
			return Err(GenerationRequestError::EmptyUserText);
		}

		Ok(Self {
			model_name: DEFAULT_MODEL_NAME.into(),
			system_text: None,
			user_text,
			quality: ImageQuality::default(),
			image_size: ImageSize::default(),
			amount: ImageAmount::default(),
			should_retry: false,
			is_async: true,
		})
	}

	/// Overrides the model name.
	pub fn with_model_name(
		mut self,
		model_name: impl Into<String>,
	) -> Result<Self, GenerationRequestError> {
		let model_name = model_name.into();

		if model_name.trim().is_empty() {
			return Err(GenerationRequestError::EmptyModelName);
		}

		self.model_name = model_name;

		Ok(self)
	}

	/// Sets the optional system prompt.
	pub fn with_system_text(mut self, system_text: Option<String>) -> Self {
		self.system_text = system_text;

		self
	}

	/// Overrides the quality tier.
	pub fn with_quality(mut self, quality: ImageQuality) -> Self {
		self.quality = quality;

		self
	}

	/// Overrides the output size.
	pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
		self.image_size = image_size;

		self
	}

	/// Overrides the number of images.
	pub fn with_amount(mut self, amount: ImageAmount) -> Self {
		self.amount = amount;

		self
	}

	/// Model requested from the service.
	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	/// Optional system prompt.
	pub fn system_text(&self) -> Option<&str> {
		self.system_text.as_deref()
	}

	/// Image description.
	pub fn user_text(&self) -> &str {
		&self.user_text
	}

	/// Quality tier.
	pub fn quality(&self) -> ImageQuality {
		self.quality
	}

	/// Output size.
	pub fn image_size(&self) -> ImageSize {
		self.image_size
	}

	/// Number of images.
	pub fn amount(&self) -> ImageAmount {
		self.amount
	}

	/// Whether the service may retry internally (always `false`).
	pub fn should_retry(&self) -> bool {
		self.should_retry
	}

	/// Whether the task runs asynchronously (always `true`).
	pub fn is_async(&self) -> bool {
		self.is_async
	}

	/// Serializes the request into the JSON body that is both sent and signed.
	pub fn to_json(&self) -> Result<String, ConfigError> {
		serde_json::to_string(self).map_err(ConfigError::RequestSerialize)
	}
}

/// Common `{success, message, data}` envelope wrapping every service response.
///
/// Only the flag is interpreted up front. `data` stays raw until the flag is known to be
/// `true`, so a rejection may carry any payload shape without failing to parse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ApiEnvelope {
	/// Logical success flag, independent of the HTTP status; `null` counts as `false`.
	#[serde(default)]
	pub success: Option<bool>,
	/// Optional explanation, usually a string.
	#[serde(default, alias = "msg")]
	pub message: Option<Value>,
	/// Stage-specific payload, decoded on demand with [`ApiEnvelope::payload`].
	#[serde(default)]
	pub data: Option<Value>,
}
impl ApiEnvelope {
	/// Returns `true` only for an explicit `"success": true`.
	pub fn is_success(&self) -> bool {
		self.success.unwrap_or(false)
	}

	/// Returns the rejection reason: the message, else a string payload, else a placeholder.
	pub fn reason(&self) -> String {
		match (&self.message, &self.data) {
			(Some(Value::String(message)), _) => message.clone(),
			(Some(message), _) if !message.is_null() => message.to_string(),
			(_, Some(Value::String(data))) => data.clone(),
			_ => "no message".into(),
		}
	}

	/// Decodes `data` into the stage payload; `null` or absent yields `None`.
	pub fn payload<T>(&self) -> Result<Option<T>, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		match &self.data {
			None | Some(Value::Null) => Ok(None),
			Some(data) => serde_path_to_error::deserialize(data).map(Some),
		}
	}
}

/// Payload of the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
	/// Issued bearer token.
	#[serde(default)]
	pub access_token: Option<AccessToken>,
}

/// Payload of the task-creation endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreated {
	/// Identifier of the created task.
	#[serde(default)]
	pub task_id: Option<RawTaskId>,
}

/// Task identifier as the service spells it: a JSON string or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTaskId {
	/// Integer identifier.
	Number(i64),
	/// String identifier.
	Text(String),
}
impl TryFrom<RawTaskId> for TaskId {
	type Error = IdentifierError;

	fn try_from(value: RawTaskId) -> Result<Self, Self::Error> {
		match value {
			RawTaskId::Number(n) => TaskId::new(n.to_string()),
			RawTaskId::Text(s) => TaskId::try_from(s),
		}
	}
}

/// Server-side task state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "Value")]
pub enum TaskStatus {
	/// Still running.
	Doing,
	/// Finished with images.
	Succeeded,
	/// Any other terminal value, failure codes included.
	Other(String),
}
impl TaskStatus {
	/// Returns `true` for every state except [`TaskStatus::Doing`].
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Doing)
	}

	/// Returns the wire label.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Doing => "DOING",
			Self::Succeeded => "SUCC",
			Self::Other(value) => value,
		}
	}
}
impl From<String> for TaskStatus {
	fn from(value: String) -> Self {
		match value.as_str() {
			"DOING" => Self::Doing,
			"SUCC" => Self::Succeeded,
			_ => Self::Other(value),
		}
	}
}
impl From<Value> for TaskStatus {
	fn from(value: Value) -> Self {
		match value {
			Value::String(label) => label.into(),
			other => Self::Other(other.to_string()),
		}
	}
}
impl Display for TaskStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Payload of the task-status endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
	/// Current state; absent values are treated as a non-success terminal state.
	#[serde(default)]
	pub status: Option<TaskStatus>,
	/// Generated image URLs, present once the task succeeded.
	#[serde(default)]
	pub image_urls: Option<Vec<String>>,
}
