// self
use crate::{
	_prelude::*,
	descriptor::{ServiceDescriptor, ServicePaths},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ServiceDescriptorError {
	/// Base URL could not be parsed.
	#[error("Base URL `{url}` cannot be parsed.")]
	UnparsableBase {
		/// Offending input.
		url: String,
	},
	/// Base URL must be `http` or `https`.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Base URL must name a host.
	#[error("Base URL has no host: {url}.")]
	MissingHost {
		/// Offending URL.
		url: String,
	},
	/// Base URL must not carry a query or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	UnexpectedQuery {
		/// Offending URL.
		url: String,
	},
	/// Endpoint paths must be absolute.
	#[error("The {endpoint} path must start with `/`: {path}.")]
	RelativePath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug)]
pub struct ServiceDescriptorBuilder {
	/// Base URL (defaults to the production host).
	pub base: Option<Url>,
	/// Endpoint paths.
	pub paths: ServicePaths,
}
impl ServiceDescriptorBuilder {
	/// Creates a new builder seeded with production paths.
	pub fn new() -> Self {
		Self { base: None, paths: ServicePaths::default() }
	}

	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base = Some(url);

		self
	}

	/// Parses and sets the base URL.
	pub fn base_str(mut self, url: &str) -> Result<Self, ServiceDescriptorError> {
		let parsed = Url::parse(url)
			.map_err(|_| ServiceDescriptorError::UnparsableBase { url: url.into() })?;

		self.base = Some(parsed);

		Ok(self)
	}

	/// Overrides the token exchange path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.paths.token = path.into();

		self
	}

	/// Overrides the task creation path.
	pub fn create_task_path(mut self, path: impl Into<String>) -> Self {
		self.paths.create_task = path.into();

		self
	}

	/// Overrides the task status path.
	pub fn task_status_path(mut self, path: impl Into<String>) -> Self {
		self.paths.task_status = path.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ServiceDescriptorError> {
		let descriptor = match self.base {
			Some(base) => ServiceDescriptor { base, paths: self.paths },
			None => ServiceDescriptor { paths: self.paths, ..ServiceDescriptor::default() },
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ServiceDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ServiceDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		let url = || self.base.to_string();

		if !matches!(self.base.scheme(), "http" | "https") {
			return Err(ServiceDescriptorError::UnsupportedScheme { url: url() });
		}
		if self.base.host_str().is_none_or(str::is_empty) {
			return Err(ServiceDescriptorError::MissingHost { url: url() });
		}
		if self.base.query().is_some() || self.base.fragment().is_some() {
			return Err(ServiceDescriptorError::UnexpectedQuery { url: url() });
		}

		validate_path("token", &self.paths.token)?;
		validate_path("create_task", &self.paths.create_task)?;
		validate_path("task_status", &self.paths.task_status)?;

		Ok(())
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ServiceDescriptorError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ServiceDescriptorError::RelativePath { endpoint, path: path.into() })
	}
}
