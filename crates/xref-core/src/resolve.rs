//! Renderer-level link resolution.
//!
//! Turns long names (and `{@link ...}` markers left in text by the link
//! expander) into anchors using the [`Registry`]. Targets the registry does
//! not know are rendered as plain text and reported with a warning; an
//! unknown link never fails the run.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::html::escape_attr;
use crate::registry::Registry;

/// `{@link target}`, `{@link target text}`, `{@link target|text}`,
/// `{@linkcode ...}`, `{@linkplain ...}` and `[text]{@link target}`.
static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\[([^\]]+)\])?\{@link(code|plain)?\s+([^}]*?)\s*\}")
        .expect("invalid link tag regex")
});

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:https?|ftp)s?://").expect("invalid url prefix regex"));

/// Display form of a resolved (or unresolved) reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// Anchor to a known page.
    Link { href: String, text: String },
    /// Plain text: unknown targets and `any`.
    Text(String),
    /// Literal values such as `null`.
    Code(String),
}

impl Reference {
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::Text(_) | Self::Code(_) => None,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Link { text, .. } => text,
            Self::Text(text) | Self::Code(text) => text,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link { href, text } => write!(f, r#"<a href="{}">{text}</a>"#, escape_attr(href)),
            Self::Text(text) => f.write_str(text),
            Self::Code(text) => write!(f, "<code>{text}</code>"),
        }
    }
}

/// Resolves long names against a registry on behalf of one page or doclet.
#[derive(Clone, Copy, Debug)]
pub struct LinkResolver<'a> {
    registry: &'a Registry,
    context: &'a str,
}

impl<'a> LinkResolver<'a> {
    pub(crate) fn new(registry: &'a Registry, context: &'a str) -> Self {
        Self { registry, context }
    }

    /// Link a long name, with `text` as the display text (defaults to the
    /// long name). `text` is inserted as-is, so callers escape it.
    #[must_use]
    pub fn link_to(&self, longname: &str, text: Option<&str>) -> Reference {
        match longname {
            "any" => return Reference::Text(longname.to_owned()),
            "null" | "undefined" | "true" | "false" => {
                return Reference::Code(longname.to_owned());
            }
            _ => {}
        }

        let target = match longname {
            "boolean" | "function" | "number" | "string" => capitalize(longname),
            _ => longname.to_owned(),
        };
        let text = text.unwrap_or(&target).to_owned();

        if ABSOLUTE_URL.is_match(&target) {
            return Reference::Link { href: target, text };
        }

        match self.registry.resolve(&target) {
            Some(url) => Reference::Link {
                href: url.to_owned(),
                text,
            },
            None => {
                tracing::warn!(target = %target, context = %self.context, "Unknown link");
                Reference::Text(text)
            }
        }
    }

    /// Replace every `{@link ...}` marker in `text` with an anchor.
    #[must_use]
    pub fn resolve_links(&self, text: &str) -> String {
        LINK_TAG
            .replace_all(text, |caps: &Captures<'_>| self.resolve_tag(caps))
            .into_owned()
    }

    fn resolve_tag(&self, caps: &Captures<'_>) -> String {
        let body = caps.get(3).map_or("", |m| m.as_str());
        let (target, inline_text) = split_link_body(body);
        let text = caps
            .get(1)
            .map(|m| m.as_str())
            .or(inline_text)
            .unwrap_or(target);
        let text = if caps.get(2).is_some_and(|m| m.as_str() == "code") {
            format!("<code>{text}</code>")
        } else {
            text.to_owned()
        };

        self.link_to(target, Some(&text)).to_string()
    }
}

/// Split `target text` / `target|text` into its parts.
fn split_link_body(body: &str) -> (&str, Option<&str>) {
    let split = body
        .split_once('|')
        .or_else(|| body.split_once(char::is_whitespace));
    match split {
        Some((target, text)) if !text.trim().is_empty() => (target.trim(), Some(text.trim())),
        Some((target, _)) => (target.trim(), None),
        None => (body.trim(), None),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("Foo", "Foo.html");
        registry.register("Foo#bar", "Foo.html#bar");
        registry.register("Function", "external-Function.html");
        registry
    }

    #[test]
    fn test_link_to_known() {
        let registry = registry();
        let resolver = registry.resolver("test");

        let reference = resolver.link_to("Foo#bar", Some("bar"));

        assert_eq!(reference.href(), Some("Foo.html#bar"));
        assert_eq!(reference.to_string(), r#"<a href="Foo.html#bar">bar</a>"#);
    }

    #[test]
    fn test_link_to_unknown_is_plain_text() {
        let registry = registry();

        let reference = registry.resolver("test").link_to("Missing", None);

        assert_eq!(reference, Reference::Text("Missing".to_owned()));
    }

    #[test]
    fn test_link_to_literals() {
        let registry = registry();
        let resolver = registry.resolver("test");

        assert_eq!(resolver.link_to("any", Some("ignored")).to_string(), "any");
        assert_eq!(resolver.link_to("null", None).to_string(), "<code>null</code>");
        assert_eq!(resolver.link_to("false", None).to_string(), "<code>false</code>");
    }

    #[test]
    fn test_link_to_capitalizes_primitives() {
        let registry = registry();

        let reference = registry.resolver("test").link_to("function", Some("function"));

        assert_eq!(reference.href(), Some("external-Function.html"));
        assert_eq!(reference.text(), "function");
    }

    #[test]
    fn test_link_to_url_target() {
        let registry = registry();

        let reference = registry
            .resolver("test")
            .link_to("https://example.com/a?b=1&c=2", None);

        assert_eq!(
            reference.to_string(),
            r#"<a href="https://example.com/a?b=1&amp;c=2">https://example.com/a?b=1&c=2</a>"#
        );
    }

    #[test]
    fn test_resolve_links_forms() {
        let registry = registry();
        let resolver = registry.resolver("Foo");

        assert_eq!(
            resolver.resolve_links("See {@link Foo}."),
            r#"See <a href="Foo.html">Foo</a>."#
        );
        assert_eq!(
            resolver.resolve_links("See {@link Foo#bar .bar} and {@link Foo|the class}."),
            r#"See <a href="Foo.html#bar">.bar</a> and <a href="Foo.html">the class</a>."#
        );
        assert_eq!(
            resolver.resolve_links("[Caption]{@link Foo}"),
            r#"<a href="Foo.html">Caption</a>"#
        );
        assert_eq!(
            resolver.resolve_links("{@linkcode Foo#bar}"),
            r#"<a href="Foo.html#bar"><code>Foo#bar</code></a>"#
        );
    }

    #[test]
    fn test_resolve_links_unknown_falls_back_to_text() {
        let registry = registry();

        let html = registry
            .resolver("Foo")
            .resolve_links("Uses {@link Nowhere the void}.");

        assert_eq!(html, "Uses the void.");
    }

    #[test]
    fn test_resolve_links_url_target() {
        let registry = registry();

        let html = registry
            .resolver("Foo")
            .resolve_links("{@link https://phabricator.wikimedia.org/T123 T123}");

        assert_eq!(
            html,
            r#"<a href="https://phabricator.wikimedia.org/T123">T123</a>"#
        );
    }
}
