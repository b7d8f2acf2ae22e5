//! Long-name registry.
//!
//! Maps every documented long name to the URL of the page (and fragment)
//! that documents it. Entries are write-once: the first registration for a
//! long name wins and later attempts are silently ignored, since the
//! pipeline legitimately visits the same doclet more than once.
//!
//! Aliases (shortnames and configured link-map entries) live in the same
//! map but are also recorded in a separate set so page generation can skip
//! them: an alias never owns a page of its own.

use std::collections::{HashMap, HashSet};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::doclet::{Doclet, Scope};
use crate::filename::FilenameAllocator;
use crate::resolve::LinkResolver;

/// Reserved long name of the global-scope page.
pub const GLOBAL_NAME: &str = "global";

/// Reserved name of the home page. Never registered as a long name.
pub const INDEX_NAME: &str = "index";

/// Characters `encodeURI` escapes.
const URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Output location of a tutorial page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TutorialLink {
    pub url: String,
    pub title: String,
}

/// Write-once long-name to URL store.
#[derive(Debug)]
pub struct Registry {
    urls: HashMap<String, String>,
    /// Long names in registration order.
    order: Vec<String>,
    aliases: HashSet<String>,
    tutorials: HashMap<String, TutorialLink>,
    /// Fragment id handed out to each long name.
    ids: HashMap<String, String>,
    files: FilenameAllocator,
    index_url: String,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with the reserved `index` and `global` filenames
    /// already claimed.
    ///
    /// `global` is registered as a long name. `index` only has its filename
    /// reserved: a real symbol (a module's default export, say) may
    /// legitimately be called `index`.
    #[must_use]
    pub fn new() -> Self {
        let mut files = FilenameAllocator::new();
        let index_url = files.unique_filename(INDEX_NAME);
        let global_url = files.unique_filename(GLOBAL_NAME);

        let mut registry = Self {
            urls: HashMap::new(),
            order: Vec::new(),
            aliases: HashSet::new(),
            tutorials: HashMap::new(),
            ids: HashMap::new(),
            files,
            index_url,
        };
        registry.register(GLOBAL_NAME, &global_url);
        registry
    }

    /// Filename of the home page.
    #[must_use]
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Filename of the global-scope page.
    #[must_use]
    pub fn global_url(&self) -> &str {
        self.urls.get(GLOBAL_NAME).map_or("", String::as_str)
    }

    /// Store `longname → url`.
    ///
    /// Returns `false` without touching the registry if the long name is
    /// already mapped.
    pub fn register(&mut self, longname: &str, url: &str) -> bool {
        if self.urls.contains_key(longname) {
            return false;
        }
        self.urls.insert(longname.to_owned(), url.to_owned());
        self.order.push(longname.to_owned());
        true
    }

    /// Store an alias pointing at an existing URL.
    ///
    /// Aliases never overwrite a mapping; returns `false` if `name` is
    /// already mapped.
    pub fn register_alias(&mut self, name: &str, url: &str) -> bool {
        if !self.register(name, url) {
            return false;
        }
        self.aliases.insert(name.to_owned());
        true
    }

    #[must_use]
    pub fn resolve(&self, longname: &str) -> Option<&str> {
        self.urls.get(longname).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, longname: &str) -> bool {
        self.urls.contains_key(longname)
    }

    /// Whether `name` was registered as an alias rather than a long name.
    #[must_use]
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered names in registration order, aliases included.
    pub fn longnames(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(name, url)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|name| self.urls.get(name).map(|url| (name.as_str(), url.as_str())))
    }

    /// Claim a fresh output filename, e.g. for a source listing page.
    pub fn claim_filename(&mut self, name: &str) -> String {
        self.files.unique_filename(name)
    }

    /// Allocate (once) the page of a tutorial.
    pub fn register_tutorial(&mut self, name: &str, title: &str) -> String {
        if let Some(existing) = self.tutorials.get(name) {
            return existing.url.clone();
        }
        let url = self.files.unique_filename(&format!("tutorial-{name}"));
        self.tutorials.insert(
            name.to_owned(),
            TutorialLink {
                url: url.clone(),
                title: title.to_owned(),
            },
        );
        url
    }

    #[must_use]
    pub fn tutorial(&self, name: &str) -> Option<&TutorialLink> {
        self.tutorials.get(name)
    }

    /// Link resolver that names `context` in its unknown-link warnings.
    #[must_use]
    pub fn resolver<'a>(&'a self, context: &'a str) -> LinkResolver<'a> {
        LinkResolver::new(self, context)
    }

    /// Compute the canonical URL of a doclet.
    ///
    /// Repeated calls for the same doclet return the same URL.
    ///
    /// Container kinds (and module exports) get a page of their own.
    /// Everything else lives on its parent's page, or on the global page,
    /// under a fragment that is unique within that page. Parent pages are
    /// allocated and registered on first use.
    pub fn create_link(&mut self, doclet: &Doclet) -> String {
        let longname = doclet.longname.as_str();
        let named_differently = doclet.name.as_deref() != Some(longname);

        let (filename, fragment) = if doclet.kind.is_container() || doclet.is_module_exports() {
            (self.page_for(longname), None)
        } else if has_container_prefix(longname) {
            // Mistagged doclet whose long name says it should be a container.
            let filename = self.page_for(doclet.memberof.as_deref().unwrap_or(longname));
            let fragment = named_differently.then(|| self.fragment_for(&filename, doclet));
            (filename, fragment)
        } else {
            let filename = self.page_for(doclet.memberof.as_deref().unwrap_or(GLOBAL_NAME));
            let fragment = (named_differently || doclet.scope == Some(Scope::Global))
                .then(|| self.fragment_for(&filename, doclet));
            (filename, fragment)
        };

        let url = match fragment {
            Some(fragment) if !fragment.is_empty() => format!("{filename}#{fragment}"),
            _ => filename,
        };
        utf8_percent_encode(&url, URI).to_string()
    }

    /// Page filename for a long name, allocating and registering it if new.
    fn page_for(&mut self, longname: &str) -> String {
        if let Some(url) = self.urls.get(longname) {
            return url.split('#').next().unwrap_or(url).to_owned();
        }
        let url = self.files.unique_filename(longname);
        self.register(longname, &url);
        url
    }

    fn fragment_for(&mut self, filename: &str, doclet: &Doclet) -> String {
        if let Some(id) = self.ids.get(&doclet.longname) {
            return id.clone();
        }

        let mut id = format!(
            "{}{}{}",
            doclet.kind.namespace(),
            doclet.name.as_deref().unwrap_or_default(),
            doclet.variation.as_deref().unwrap_or_default()
        );
        let punctuation = doclet.scope.as_ref().map_or("", Scope::punctuation);
        if !punctuation.is_empty() && id.starts_with(punctuation) {
            id.drain(..punctuation.len());
        }
        if id.is_empty() {
            return id;
        }

        let id = self.files.unique_id(filename, &id);
        self.ids.insert(doclet.longname.clone(), id.clone());
        id
    }
}

/// Whether the long name starts with a container namespace (`module:x`).
fn has_container_prefix(longname: &str) -> bool {
    let token = longname.split_whitespace().next().unwrap_or_default();
    token.rsplit_once(':').is_some_and(|(prefix, _)| {
        matches!(
            prefix,
            "class" | "module" | "external" | "namespace" | "mixin" | "interface"
        )
    })
}
