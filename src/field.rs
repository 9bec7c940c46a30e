//! Host field adapter: the outermost boundary between a spreadsheet field extension and the
//! task client.
//!
//! The host hands over its runtime form values as [`FormItemParams`] and expects a
//! [`FieldResponse`] back. Every logical outcome (success or soft failure) is reported with
//! [`FieldCode::Success`]; only hard failures carry [`FieldCode::Error`], without data.

// self
use crate::{
	_prelude::*,
	attachment::Attachment,
	auth::{AppKey, AppSecret, Credentials, IdentifierError},
	flows::{GenerationOutcome, TaskClient},
	http::TaskHttpClient,
	obs,
	task::{GenerationRequest, GenerationRequestError, ImageAmount, ImageQuality, ImageSize},
};

/// Problems found while turning host form values into an invocation.
#[derive(Debug, ThisError)]
pub enum FieldParamsError {
	/// No description segment was supplied.
	#[error("Image description is missing.")]
	MissingDescription,
	/// The application key is not a usable identifier.
	#[error("AppKey is invalid.")]
	InvalidAppKey(#[source] IdentifierError),
	/// The application secret is blank.
	#[error("AppSecret cannot be empty.")]
	EmptyAppSecret,
	/// The generation parameters were rejected.
	#[error(transparent)]
	Request(#[from] GenerationRequestError),
}

/// One text segment of a referenced host cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
	/// Segment kind reported by the host, e.g. `text`.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Segment text.
	pub text: String,
}

/// Single-select option as delivered by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption<T> {
	/// Display label, ignored by the client.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Selected value.
	pub value: T,
}
impl<T> SelectOption<T> {
	/// Wraps `value` without a label.
	pub fn new(value: T) -> Self {
		Self { label: None, value }
	}
}

/// Runtime form values supplied by the host, keyed exactly as the host sends them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItemParams {
	/// Optional system prompt. The host key keeps its historical spelling.
	#[serde(default, rename = "sysPropmt", skip_serializing_if = "Option::is_none")]
	pub system_prompt: Option<String>,
	/// Referenced description cell; the first segment's text is used.
	#[serde(default, rename = "imgDesc")]
	pub description: Vec<TextSegment>,
	/// Requested image count; defaults to one.
	#[serde(default, rename = "imgAmount", skip_serializing_if = "Option::is_none")]
	pub amount: Option<SelectOption<ImageAmount>>,
	/// Requested quality; defaults to `MEDIUM`.
	#[serde(default, rename = "imgQuality", skip_serializing_if = "Option::is_none")]
	pub quality: Option<SelectOption<ImageQuality>>,
	/// Requested dimensions; defaults to square.
	#[serde(default, rename = "imgSize", skip_serializing_if = "Option::is_none")]
	pub image_size: Option<SelectOption<ImageSize>>,
	/// Application key.
	#[serde(default)]
	pub app_key: String,
	/// Application secret.
	#[serde(default)]
	pub app_secret: String,
}
impl FormItemParams {
	/// Splits the form into credentials and a validated generation request.
	pub fn into_invocation(self) -> Result<(Credentials, GenerationRequest), FieldParamsError> {
		let app_key = AppKey::new(&self.app_key).map_err(FieldParamsError::InvalidAppKey)?;

		if self.app_secret.trim().is_empty() {
			return Err(FieldParamsError::EmptyAppSecret);
		}

		let user_text = self
			.description
			.into_iter()
			.next()
			.map(|segment| segment.text)
			.ok_or(FieldParamsError::MissingDescription)?;
		let request = GenerationRequest::new(user_text)?
			.with_system_text(self.system_prompt.filter(|text| !text.trim().is_empty()))
			.with_amount(self.amount.map(|option| option.value).unwrap_or_default())
			.with_quality(self.quality.map(|option| option.value).unwrap_or_default())
			.with_image_size(self.image_size.map(|option| option.value).unwrap_or_default());

		Ok((Credentials::new(app_key, AppSecret::new(self.app_secret)), request))
	}
}

/// Result code understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum FieldCode {
	/// The field was filled, possibly with a failure message.
	Success = 0,
	/// The invocation aborted; the cell is left empty.
	Error = 1,
}
impl From<FieldCode> for u8 {
	fn from(code: FieldCode) -> Self {
		code as u8
	}
}

/// Payload of a [`FieldCode::Success`] response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldData {
	/// Generated images.
	Attachments(Vec<Attachment>),
	/// User-facing failure message, rendered in the cell.
	Message {
		/// Message text.
		id: String,
	},
}

/// Response returned to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldResponse {
	/// Result code.
	pub code: FieldCode,
	/// Cell content; absent on [`FieldCode::Error`].
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<FieldData>,
}
impl FieldResponse {
	/// Success carrying attachments.
	pub fn attachments(attachments: Vec<Attachment>) -> Self {
		Self { code: FieldCode::Success, data: Some(FieldData::Attachments(attachments)) }
	}

	/// Success carrying a message instead of images.
	pub fn message(message: impl Into<String>) -> Self {
		Self { code: FieldCode::Success, data: Some(FieldData::Message { id: message.into() }) }
	}

	/// Hard failure with no cell content.
	pub fn error() -> Self {
		Self { code: FieldCode::Error, data: None }
	}
}
impl From<GenerationOutcome> for FieldResponse {
	fn from(outcome: GenerationOutcome) -> Self {
		match outcome {
			GenerationOutcome::Success(attachments) => Self::attachments(attachments),
			GenerationOutcome::LogicalFailure(failure) => Self::message(failure.message()),
			GenerationOutcome::TransportError(_) => Self::error(),
		}
	}
}

/// Runs one host invocation end to end.
pub async fn execute<C>(client: &TaskClient<C>, params: FormItemParams) -> FieldResponse
where
	C: ?Sized + TaskHttpClient,
{
	let (credentials, request) = match params.into_invocation() {
		Ok(invocation) => invocation,
		Err(e) => {
			obs::record_invocation_outcome("invalid_params", &e);

			return FieldResponse::error();
		},
	};

	client.generate(&credentials, &request).await.into()
}
