//! Rendering of untrusted user content.
//!
//! Titles are stripped down to plain text. Post bodies are rendered from
//! Markdown to HTML and the result is sanitized before it is handed out, so
//! raw HTML in the source never survives beyond the tags and attributes that
//! are explicitly allowed.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Holds the sanitizer configurations and Markdown options used to render
/// user content. Construct it once and share it.
pub struct Renderer {
	strict: ammonia::Builder<'static>,
	ugc: ammonia::Builder<'static>,
	options: Options,
}

impl Default for Renderer {
	fn default() -> Self {
		Self::new()
	}
}

impl Renderer {
	pub fn new() -> Self {
		let mut strict = ammonia::Builder::empty();
		strict.clean_content_tags(HashSet::from(["script", "style"]));

		let mut ugc = ammonia::Builder::default();
		ugc.add_tag_attributes("a", &["target"])
			.link_rel(Some("nofollow noopener noreferrer"));

		for heading in HEADINGS {
			ugc.add_tag_attributes(heading, &["id"]);
		}

		let mut options = Options::empty();
		options.insert(Options::ENABLE_TABLES);
		options.insert(Options::ENABLE_STRIKETHROUGH);
		options.insert(Options::ENABLE_FOOTNOTES);
		options.insert(Options::ENABLE_TASKLISTS);

		Self {
			strict,
			ugc,
			options,
		}
	}

	/// Strips all markup from `raw`, leaving only its text.
	pub fn plain_text(&self, raw: &str) -> String {
		if raw.is_empty() {
			return String::new();
		}

		self.strict.clean(raw).to_string()
	}

	/// Renders a Markdown post body into HTML that is safe to embed.
	pub fn post_body(&self, markdown: &str) -> String {
		self.ugc.clean(&self.markdown_to_html(markdown)).to_string()
	}

	/// Renders Markdown to HTML, adding heading anchors and opening
	/// external links in a new tab.
	///
	/// The output is not safe on its own, since raw HTML passes through.
	fn markdown_to_html(&self, markdown: &str) -> String {
		let mut events = Parser::new_ext(markdown, self.options).collect::<Vec<_>>();
		add_heading_anchors(&mut events);

		let events = events.into_iter().map(|event| match event {
			Event::Start(Tag::Link {
				link_type,
				dest_url,
				title,
				..
			}) => Event::InlineHtml(open_link(link_type, &dest_url, &title).into()),
			Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
			event => event,
		});

		let mut output = String::with_capacity(markdown.len() * 2);
		html::push_html(&mut output, events);
		output
	}
}

/// Gives every heading an `id` derived from its text, suffixed with
/// `-1`, `-2`, ... when the same anchor appears more than once.
fn add_heading_anchors(events: &mut [Event<'_>]) {
	let mut seen = HashMap::<String, usize>::new();
	let mut open: Option<(usize, String)> = None;

	for index in 0..events.len() {
		let mut closed = None;

		match &events[index] {
			Event::Start(Tag::Heading { id: None, .. }) => open = Some((index, String::new())),
			Event::Text(text) | Event::Code(text) => {
				if let Some((_, buffer)) = &mut open {
					buffer.push_str(text);
				}
			}
			Event::End(TagEnd::Heading(..)) => closed = open.take(),
			_ => {}
		}

		let Some((start, text)) = closed else {
			continue;
		};

		let anchor = anchor_name(&text);
		let count = seen.entry(anchor.clone()).or_insert(0);
		let anchor = if *count == 0 {
			anchor
		} else {
			format!("{anchor}-{count}")
		};
		*count += 1;

		if let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(start) {
			*id = Some(anchor.into());
		}
	}
}

/// Converts heading text into an anchor name: lowercase letters and digits,
/// with every other run of characters collapsed into a single `-`.
fn anchor_name(text: &str) -> String {
	let mut anchor = String::with_capacity(text.len());
	let mut pending_dash = false;

	for c in text.chars() {
		if c.is_alphanumeric() {
			if pending_dash && !anchor.is_empty() {
				anchor.push('-');
			}

			pending_dash = false;
			anchor.extend(c.to_lowercase());
		} else {
			pending_dash = true;
		}
	}

	if anchor.is_empty() {
		anchor.push_str("section");
	}

	anchor
}

fn is_external(url: &str) -> bool {
	let lower = url.trim_start().to_ascii_lowercase();

	lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Builds the opening tag of a link. Attribute values are escaped here and
/// parsed back by the sanitizer.
fn open_link(link_type: LinkType, dest_url: &str, title: &str) -> String {
	let href = match link_type {
		LinkType::Email => format!("mailto:{dest_url}"),
		_ => dest_url.to_owned(),
	};

	let mut tag = format!("<a href=\"{}\"", ammonia::clean_text(&href));

	if !title.is_empty() {
		tag.push_str(&format!(" title=\"{}\"", ammonia::clean_text(title)));
	}

	if is_external(&href) {
		tag.push_str(" target=\"_blank\"");
	}

	tag.push('>');
	tag
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_plain_text_strips_markup() {
		let renderer = Renderer::new();

		assert_eq!(renderer.plain_text("<script>alert(1)</script>hello"), "hello");
		assert_eq!(renderer.plain_text("<b>bold</b> <i>move</i>"), "bold move");
		assert_eq!(
			renderer.plain_text("<a href=\"javascript:alert(1)\">click</a>"),
			"click"
		);
		assert_eq!(renderer.plain_text("<style>p { color: red }</style>"), "");
	}

	#[test]
	fn test_plain_text_empty() {
		let renderer = Renderer::new();

		assert_eq!(renderer.plain_text(""), "");
		assert_eq!(renderer.plain_text("just words"), "just words");
	}

	#[test]
	fn test_post_body_removes_scripts() {
		let renderer = Renderer::new();
		let html = renderer.post_body("# Title\n<script>alert(1)</script>\n**bold**");

		assert!(html.contains("<h1"));
		assert!(html.contains("<strong>bold</strong>"));
		assert!(!html.contains("<script"));
		assert!(!html.contains("alert(1)"));
	}

	#[test]
	fn test_post_body_removes_event_handlers() {
		let renderer = Renderer::new();
		let html = renderer.post_body("<img src=\"x.png\" onerror=\"alert(1)\">\n\n<div onclick=\"alert(2)\">hi</div>");

		assert!(!html.contains("onerror"));
		assert!(!html.contains("onclick"));
		assert!(html.contains("hi"));
	}

	#[test]
	fn test_post_body_removes_dangerous_links() {
		let renderer = Renderer::new();
		let html = renderer.post_body("[click](javascript:alert(1)) and <a href=\"javascript:alert(2)\">raw</a>");

		assert!(!html.contains("javascript"));
		assert!(html.contains("click"));
		assert!(html.contains("raw"));
	}

	#[test]
	fn test_post_body_heading_anchors() {
		let renderer = Renderer::new();
		let html = renderer.post_body("# Hello, World!\n\n## Hello World\n\n### `code` block");

		assert!(html.contains("<h1 id=\"hello-world\">"));
		assert!(html.contains("<h2 id=\"hello-world-1\">"));
		assert!(html.contains("<h3 id=\"code-block\">"));
	}

	#[test]
	fn test_post_body_external_links() {
		let renderer = Renderer::new();
		let html = renderer.post_body("[out](https://example.com/a?b=1&c=2 \"Example\") and [in](/posts/abc)");

		assert!(html.contains("href=\"https://example.com/a?b=1&amp;c=2\""));
		assert!(html.contains("title=\"Example\""));
		assert!(html.contains("target=\"_blank\""));
		assert!(html.contains("rel=\"nofollow noopener noreferrer\""));
		assert_eq!(html.matches("target=").count(), 1);
		assert!(html.contains("href=\"/posts/abc\""));
	}

	#[test]
	fn test_post_body_autolinks() {
		let renderer = Renderer::new();
		let html = renderer.post_body("<https://example.com> <me@example.com>");

		assert!(html.contains("href=\"https://example.com\""));
		assert!(html.contains("href=\"mailto:me@example.com\""));
	}

	#[test]
	fn test_post_body_attribute_breakout() {
		let renderer = Renderer::new();
		let html = renderer.post_body("[x](https://example.com/\"onmouseover=\"alert(1))");

		assert!(!html.contains(" onmouseover="));
	}

	#[test]
	fn test_post_body_common_formatting() {
		let renderer = Renderer::new();
		let html = renderer.post_body(
			"*em* ~~gone~~ `code`\n\n- one\n- two\n\n> quote\n\n| A | B |\n|---|---|\n| 1 | 2 |",
		);

		assert!(html.contains("<em>em</em>"));
		assert!(html.contains("<del>gone</del>"));
		assert!(html.contains("<code>code</code>"));
		assert!(html.contains("<li>one</li>"));
		assert!(html.contains("<blockquote>"));
		assert!(html.contains("<table>"));
	}

	#[test]
	fn test_post_body_malformed_markdown() {
		let renderer = Renderer::new();

		assert_eq!(renderer.post_body(""), "");
		assert!(renderer.post_body("**unclosed [link](").contains("unclosed"));
		assert!(renderer.post_body("<div><p>unbalanced").contains("unbalanced"));
	}

	#[test]
	fn test_anchor_name() {
		assert_eq!(anchor_name("Hello World"), "hello-world");
		assert_eq!(anchor_name("  Trim -- me  "), "trim-me");
		assert_eq!(anchor_name("Café ☕"), "café");
		assert_eq!(anchor_name("!!!"), "section");
	}
}
