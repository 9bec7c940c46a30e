//! Mapping from generated image URLs to host attachments.

// self
use crate::_prelude::*;

/// Content-type marker telling the host that `content` is a fetchable URL.
pub const URL_CONTENT_TYPE: &str = "attachment/url";

/// Host attachment referencing one generated image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
	/// Display file name.
	pub name: String,
	/// Image URL.
	pub content: String,
	/// Always [`URL_CONTENT_TYPE`].
	pub content_type: String,
}
impl Attachment {
	/// Builds the attachment for the image at zero-based `index`.
	pub fn from_url(url: impl Into<String>, index: usize) -> Self {
		let content = url.into();
		let name = file_name(&content, index);

		Self { name, content, content_type: URL_CONTENT_TYPE.into() }
	}
}

/// Maps image URLs to attachments, preserving provider order.
pub fn to_attachments<S>(image_urls: &[S]) -> Vec<Attachment>
where
	S: AsRef<str>,
{
	image_urls
		.iter()
		.enumerate()
		.map(|(index, url)| Attachment::from_url(url.as_ref(), index))
		.collect()
}

/// Final path segment of `url`, or `generated_image_<index + 1>.png` when it has none.
pub fn file_name(url: &str, index: usize) -> String {
	final_segment(url).unwrap_or_else(|| format!("generated_image_{}.png", index + 1))
}

fn final_segment(url: &str) -> Option<String> {
	let segment = match Url::parse(url) {
		Ok(parsed) => parsed.path_segments()?.next_back()?.to_owned(),
		Err(_) => {
			let path = url.split(['?', '#']).next().unwrap_or(url);

			path.rsplit('/').next().unwrap_or(path).to_owned()
		},
	};

	if segment.is_empty() { None } else { Some(segment) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn single_url_becomes_named_attachment() {
		let attachments = to_attachments(&["https://x/a.png"]);

		assert_eq!(
			attachments,
			vec![Attachment {
				name: "a.png".into(),
				content: "https://x/a.png".into(),
				content_type: "attachment/url".into(),
			}]
		);
	}

	#[test]
	fn missing_segment_falls_back_to_index_name() {
		assert_eq!(file_name("https://x/images/", 0), "generated_image_1.png");
		assert_eq!(file_name("https://x", 2), "generated_image_3.png");
		assert_eq!(file_name("", 1), "generated_image_2.png");
	}

	#[test]
	fn query_and_fragment_are_not_part_of_the_name() {
		assert_eq!(file_name("https://cdn.example.com/out/b.png?sig=abc#top", 0), "b.png");
		assert_eq!(file_name("relative/dir/c.webp?x=1", 0), "c.webp");
	}

	#[test]
	fn order_is_preserved() {
		let urls = vec![
			"https://x/2.png".to_owned(),
			"https://x/dir/".to_owned(),
			"https://x/1.png".to_owned(),
		];
		let names: Vec<_> = to_attachments(&urls).into_iter().map(|a| a.name).collect();

		assert_eq!(names, ["2.png", "generated_image_2.png", "1.png"]);
	}
}
