//! Per-page views of the navigation tree.

use std::collections::HashSet;
use std::fmt::{self, Write};

use serde::Serialize;
use xref_core::{escape_attr, htmlsafe};

use crate::tree::{NavLabel, NavTree};

/// Navigation item with children, for JSON output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display markup (heading title, link text or plain markup).
    pub html: String,
    /// Link target, absent for headings and plain entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub heading: bool,
    /// Whether the item is the current page or contains it.
    #[serde(rename = "isOn", skip_serializing_if = "std::ops::Not::not")]
    pub is_on: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

/// Navigation as seen from one page.
///
/// A view owns its highlight set; marking items in one view never affects
/// the tree or any other view.
#[derive(Clone, Debug)]
pub struct NavView<'a> {
    tree: &'a NavTree,
    current: HashSet<usize>,
}

impl<'a> NavView<'a> {
    pub(crate) fn new(tree: &'a NavTree) -> Self {
        Self {
            tree,
            current: HashSet::new(),
        }
    }

    /// Highlight every item linking to `filename` and their ancestors.
    ///
    /// Returns `false` if no item links to `filename`.
    pub fn mark(&mut self, filename: &str) -> bool {
        let matches = self.tree.find_hrefs(filename);
        if matches.is_empty() {
            tracing::debug!(filename, "Page not in navigation");
            return false;
        }
        for mut idx in matches {
            self.current.insert(idx);
            while let Some(parent) = self.tree.parent(idx) {
                self.current.insert(parent);
                idx = parent;
            }
        }
        true
    }

    /// Remove all highlighting.
    pub fn clear(&mut self) {
        self.current.clear();
    }

    #[must_use]
    pub fn is_on(&self, idx: usize) -> bool {
        self.current.contains(&idx)
    }

    /// Highlighted items in document order.
    #[must_use]
    pub fn current(&self) -> Vec<usize> {
        let mut current: Vec<usize> = self.current.iter().copied().collect();
        current.sort_unstable();
        current
    }

    /// Serializable item tree.
    #[must_use]
    pub fn items(&self) -> Vec<NavItem> {
        self.tree.roots().iter().map(|&idx| self.item(idx)).collect()
    }

    fn item(&self, idx: usize) -> NavItem {
        let (html, href, heading) = match self.tree.label(idx) {
            Some(NavLabel::Link { href, html }) => (html.clone(), Some(href.clone()), false),
            Some(NavLabel::Html(html)) => (html.clone(), None, false),
            Some(NavLabel::Heading(title)) => (htmlsafe(title), None, true),
            None => (String::new(), None, false),
        };
        NavItem {
            html,
            href,
            heading,
            is_on: self.is_on(idx),
            children: self
                .tree
                .children(idx)
                .iter()
                .map(|&child| self.item(child))
                .collect(),
        }
    }

    /// Render to sidebar markup.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn write_item(&self, out: &mut fmt::Formatter<'_>, idx: usize) -> fmt::Result {
        let class = if self.tree.parent(idx).is_some() {
            "nav__sub-item"
        } else {
            "nav__item"
        };
        let on = if self.is_on(idx) { " is-on" } else { "" };
        write!(out, r#"<li class="{class}{on}">"#)?;

        match self.tree.label(idx) {
            Some(NavLabel::Link { href, html }) => {
                write!(out, r#"<a href="{}">{html}</a>"#, escape_attr(href))?;
            }
            Some(NavLabel::Html(html)) => out.write_str(html)?,
            Some(NavLabel::Heading(title)) => write!(out, "<a>{}</a>", htmlsafe(title))?,
            None => {}
        }

        let children = self.tree.children(idx);
        if !children.is_empty() {
            out.write_str(r#"<ul class="nav__sub-items">"#)?;
            for &child in children {
                self.write_item(out, child)?;
            }
            out.write_str("</ul>")?;
        }

        out.write_str("</li>")
    }
}

impl fmt::Display for NavView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<ol>")?;
        for &idx in self.tree.roots() {
            self.write_item(f, idx)?;
        }
        f.write_char('\n')?;
        f.write_str("</ol>")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xref_core::{MemberRef, Members, Registry};

    use super::*;
    use crate::tree::NavConfig;

    fn tree() -> NavTree {
        let mut registry = Registry::new();
        registry.register("Foo", "classes/Foo.html");
        registry.register("Bar", "classes/Bar.html");
        let members = Members {
            classes: vec![MemberRef::new("Foo", "Foo"), MemberRef::new("Bar", "Bar")],
            ..Members::default()
        };
        NavTree::build(&members, &registry, &NavConfig::default())
    }

    #[test]
    fn test_view_marks_item_and_ancestors() {
        let tree = tree();
        let view = tree.view("classes/Foo.html");

        let classes = tree.roots()[1];
        let foo = tree.children(classes)[0];
        assert_eq!(view.current(), vec![classes, foo]);
    }

    #[test]
    fn test_views_are_independent() {
        let tree = tree();

        let mut first = tree.view("classes/Foo.html");
        let second = tree.view("classes/Foo.html");
        assert_eq!(first.render(), second.render());

        first.clear();
        first.mark("classes/Bar.html");

        let foo = tree.children(tree.roots()[1])[0];
        assert!(!first.is_on(foo));
        assert!(second.is_on(foo));
        assert_eq!(tree.view("classes/Foo.html").render(), second.render());
    }

    #[test]
    fn test_unknown_page_marks_nothing() {
        let tree = tree();
        let mut view = tree.view("missing.html");

        assert!(view.current().is_empty());
        assert!(!view.mark("also-missing.html"));
    }

    #[test]
    fn test_render_markup() {
        let tree = tree();

        assert_eq!(
            tree.view("classes/Bar.html").render(),
            concat!(
                r#"<ol><li class="nav__item"><a href="index.html">Home</a></li>"#,
                r#"<li class="nav__item is-on"><a>Classes</a><ul class="nav__sub-items">"#,
                r#"<li class="nav__sub-item"><a href="classes/Foo.html">Foo</a></li>"#,
                r#"<li class="nav__sub-item is-on"><a href="classes/Bar.html">Bar</a></li>"#,
                "</ul></li>\n</ol>"
            )
        );
    }

    #[test]
    fn test_every_matching_anchor_marked() {
        let mut registry = Registry::new();
        registry.register("module:foo", "module-foo.html");
        let members = Members {
            externals: vec![MemberRef::new("module:foo", "foo")],
            classes: vec![MemberRef::new("module:foo", "foo")],
            ..Members::default()
        };
        let tree = NavTree::build(&members, &registry, &NavConfig::default());

        let rendered = tree.view("module-foo.html").render();

        assert_eq!(rendered.matches("nav__sub-item is-on").count(), 2);
        assert_eq!(rendered.matches("nav__item is-on").count(), 2);
    }

    #[test]
    fn test_home_view() {
        let tree = tree();
        let view = tree.view("index.html");

        assert_eq!(view.current(), vec![tree.roots()[0]]);
    }

    #[test]
    fn test_items_json() {
        let tree = tree();
        let items = tree.view("classes/Foo.html").items();

        assert_eq!(items.len(), 2);
        assert!(items[1].heading);
        assert!(items[1].is_on);
        assert_eq!(items[1].children[0].href.as_deref(), Some("classes/Foo.html"));

        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"html": "Home", "href": "index.html"})
        );
    }
}
