//! Navigation tree construction.
//!
//! # Architecture
//!
//! Items are stored in a flat `Vec` in document (pre-order) order with
//! parent/children relationships tracked by indices. The tree is immutable
//! once built; per-page highlighting lives in [`NavView`](crate::NavView).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use xref_core::{MemberRef, Members, Reference, Registry, Tutorial, strip_quotes};

use crate::view::NavView;

static NAMESPACE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(module|event):").expect("invalid namespace prefix regex"));

/// Navigation settings.
#[derive(Clone, Debug, Default)]
pub struct NavConfig {
    /// Show full long names instead of short names.
    pub use_longname_in_nav: bool,
}

/// Content of one navigation item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavLabel {
    /// Anchor; `html` is inserted verbatim.
    Link { href: String, html: String },
    /// Markup without an anchor (unresolved names, missing tutorials).
    Html(String),
    /// Section heading.
    Heading(String),
}

impl NavLabel {
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::Html(_) | Self::Heading(_) => None,
        }
    }

    fn from_reference(reference: Reference) -> Self {
        match reference {
            Reference::Link { href, text } => Self::Link { href, html: text },
            other @ (Reference::Text(_) | Reference::Code(_)) => Self::Html(other.to_string()),
        }
    }
}

/// Immutable navigation tree.
#[derive(Clone, Debug)]
pub struct NavTree {
    labels: Vec<NavLabel>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl NavTree {
    /// Build the sidebar for a documentation set.
    ///
    /// Sections appear in a fixed order and only when they have entries.
    /// Modules, namespaces, classes, interfaces, events and mixins share one
    /// seen-set, so a long name listed under an earlier section is not
    /// repeated later. Externals and tutorials are deduplicated on their own.
    #[must_use]
    pub fn build(members: &Members, registry: &Registry, config: &NavConfig) -> Self {
        let mut builder = NavTreeBuilder::new();
        let resolver = registry.resolver("navigation");
        let link = |member: &MemberRef, display: &str| {
            member.longname.as_deref().map_or_else(
                || NavLabel::Html(display.to_owned()),
                |longname| NavLabel::from_reference(resolver.link_to(longname, Some(display))),
            )
        };

        builder.add_item(
            NavLabel::Link {
                href: registry.index_url().to_owned(),
                html: "Home".to_owned(),
            },
            None,
        );

        let mut seen = HashSet::new();
        let sections: [(&str, &[MemberRef], bool); 7] = [
            ("Modules", members.modules.as_slice(), true),
            ("Externals", members.externals.as_slice(), false),
            ("Namespaces", members.namespaces.as_slice(), true),
            ("Classes", members.classes.as_slice(), true),
            ("Interfaces", members.interfaces.as_slice(), true),
            ("Events", members.events.as_slice(), true),
            ("Mixins", members.mixins.as_slice(), true),
        ];
        for (title, items, shared) in sections {
            let mut own_seen = HashSet::new();
            let seen = if shared { &mut seen } else { &mut own_seen };
            let labels: Vec<NavLabel> = member_entries(items, seen, config, title == "Externals")
                .into_iter()
                .map(|(member, display)| link(member, &display))
                .collect();
            builder.add_section(title, labels);
        }

        let mut seen_tutorials = HashSet::new();
        let tutorials = members
            .tutorials
            .iter()
            .filter(|tutorial| seen_tutorials.insert(tutorial.name.as_str()))
            .map(|tutorial| tutorial_label(tutorial, registry))
            .collect();
        builder.add_section("Tutorials", tutorials);

        builder.build()
    }

    /// Number of items, headings included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Top-level items in order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[must_use]
    pub fn label(&self, idx: usize) -> Option<&NavLabel> {
        self.labels.get(idx)
    }

    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents.get(idx).copied().flatten()
    }

    /// Titles of the sections present, in order.
    #[must_use]
    pub fn section_titles(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter_map(|&idx| match &self.labels[idx] {
                NavLabel::Heading(title) => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First item, in document order, linking exactly to `href`.
    #[must_use]
    pub fn find_href(&self, href: &str) -> Option<usize> {
        self.labels.iter().position(|label| label.href() == Some(href))
    }

    /// Every item linking exactly to `href`, in document order.
    #[must_use]
    pub fn find_hrefs(&self, href: &str) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.href() == Some(href))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Independent view with every item for `filename` and their ancestors
    /// highlighted.
    #[must_use]
    pub fn view(&self, filename: &str) -> NavView<'_> {
        let mut view = NavView::new(self);
        view.mark(filename);
        view
    }
}

/// Entries of one section with their display text, skipping long names
/// already listed.
fn member_entries<'a>(
    items: &'a [MemberRef],
    seen: &mut HashSet<String>,
    config: &NavConfig,
    strip_external_quotes: bool,
) -> Vec<(&'a MemberRef, String)> {
    let mut entries = Vec::new();
    for item in items {
        let Some(longname) = item.longname.as_deref() else {
            entries.push((item, item.name.clone()));
            continue;
        };
        if !seen.insert(longname.to_owned()) {
            continue;
        }

        let display = if config.use_longname_in_nav {
            longname
        } else {
            item.name.as_str()
        };
        let display = NAMESPACE_PREFIX.replace_all(display, "");
        let display = if strip_external_quotes {
            strip_quotes(&display).to_owned()
        } else {
            display.into_owned()
        };
        entries.push((item, display));
    }
    entries
}

fn tutorial_label(tutorial: &Tutorial, registry: &Registry) -> NavLabel {
    match registry.tutorial(&tutorial.name) {
        Some(link) => NavLabel::Link {
            href: link.url.clone(),
            html: link.title.clone(),
        },
        None => NavLabel::Html(format!(
            r#"<em class="disabled">Tutorial: {}</em>"#,
            tutorial.name
        )),
    }
}

/// Builder for constructing a [`NavTree`].
struct NavTreeBuilder {
    labels: Vec<NavLabel>,
    children: Vec<Vec<usize>>,
    parents: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl NavTreeBuilder {
    fn new() -> Self {
        Self {
            labels: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Add an item and return its index.
    fn add_item(&mut self, label: NavLabel, parent: Option<usize>) -> usize {
        let idx = self.labels.len();
        self.labels.push(label);
        self.children.push(Vec::new());
        self.parents.push(parent);

        if let Some(parent) = parent {
            self.children[parent].push(idx);
        } else {
            self.roots.push(idx);
        }
        idx
    }

    /// Add a heading with its entries; empty sections are left out.
    fn add_section(&mut self, title: &str, entries: Vec<NavLabel>) {
        if entries.is_empty() {
            return;
        }
        let heading = self.add_item(NavLabel::Heading(title.to_owned()), None);
        for entry in entries {
            self.add_item(entry, Some(heading));
        }
    }

    fn build(self) -> NavTree {
        NavTree {
            labels: self.labels,
            children: self.children,
            parents: self.parents,
            roots: self.roots,
        }
    }
}
