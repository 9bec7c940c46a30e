//! Signed asynchronous image-task client for spreadsheet field extensions: acquire a bearer
//! token, submit an HMAC-signed generation job, poll it under a fixed time budget, and hand the
//! resulting image URLs back as host attachments.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod attachment;
pub mod auth;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod flows;
pub mod http;
pub mod obs;
pub mod signature;
pub mod task;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _};
