//! Publishing pipeline.
//!
//! Runs every phase over a doclet set in a fixed order: the registry must
//! know every URL before links are expanded, and aliases are derived from
//! the complete registry.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use serde::Serialize;

use crate::aliases::{AliasReport, add_shortname_aliases};
use crate::doclet::{Doclet, DocletSet, Example, Kind, Scope};
use crate::expand::{DEFAULT_TICKET_BASE_URL, DEFAULT_TICKET_PREFIX, LinkExpander};
use crate::members::{Members, Tutorial, attach_module_symbols};
use crate::registry::{GLOBAL_NAME, Registry};
use crate::signature::{
    add_attribs, add_signature_params, add_signature_returns, add_signature_types,
    needs_signature,
};

static EXAMPLE_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<caption>([\s\S]+?)</caption>(\s*[\n\r])([\s\S]+)$")
        .expect("invalid example caption regex")
});

/// Error returned when the pipeline cannot complete.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Doclet input is not a valid JSON doclet array.
    #[error("Invalid doclet input: {0}")]
    Input(#[from] serde_json::Error),
    /// A doclet has no URL after registration.
    #[error("No URL registered for {0}")]
    MissingUrl(String),
}

/// Pipeline settings.
#[derive(Clone, Debug)]
pub struct PublishConfig {
    /// Base URL for ticket links; ticket linking is off unless it is absolute.
    pub ticket_base_url: String,
    /// Ticket id prefix (`T` in `T12345`).
    pub ticket_prefix: String,
    /// Long names of external documentation, pre-registered as aliases.
    pub link_map: BTreeMap<String, String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            ticket_base_url: DEFAULT_TICKET_BASE_URL.to_owned(),
            ticket_prefix: DEFAULT_TICKET_PREFIX.to_owned(),
            link_map: BTreeMap::new(),
        }
    }
}

/// Page the renderer has to generate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longname: Option<String>,
}

/// Source file referenced by some doclet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path as recorded in the doclet metadata.
    pub path: String,
    /// Path relative to the common directory of all source files.
    pub shortpath: String,
    pub filename: String,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PublishOutput {
    pub doclets: DocletSet,
    pub registry: Registry,
    pub aliases: AliasReport,
    pub members: Members,
    pub pages: Vec<Page>,
    pub source_files: Vec<SourceFile>,
}

/// Runs the cross-reference pipeline.
#[derive(Clone, Debug)]
pub struct Publisher {
    config: PublishConfig,
    expander: LinkExpander,
}

impl Publisher {
    #[must_use]
    pub fn new(config: PublishConfig) -> Self {
        let expander = LinkExpander::new(&config.ticket_base_url, &config.ticket_prefix);
        Self { config, expander }
    }

    /// Parse a JSON doclet array and run the pipeline over it.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Input`] if the JSON is not a doclet array, and
    /// any error of [`Publisher::run`].
    pub fn run_json(
        &self,
        json: &str,
        tutorials: &[Tutorial],
    ) -> Result<PublishOutput, PublishError> {
        self.run(DocletSet::from_json(json)?, tutorials)
    }

    /// Run every phase over `doclets`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingUrl`] if a doclet ends up without a
    /// registered URL.
    pub fn run(
        &self,
        mut doclets: DocletSet,
        tutorials: &[Tutorial],
    ) -> Result<PublishOutput, PublishError> {
        let start = Instant::now();
        let input_count = doclets.len();

        let mut registry = Registry::new();
        for (longname, url) in &self.config.link_map {
            registry.register_alias(longname, url);
        }

        doclets.prune();
        doclets.sort_by_longname();

        let source_paths = prepare(&mut doclets, &mut registry);
        let shortpaths = shorten_paths(&source_paths);

        for doclet in doclets.iter_mut().filter(|d| !d.longname.is_empty()) {
            let url = registry.create_link(doclet);
            registry.register(&doclet.longname, &url);

            if let Some(path) = doclet.source_path()
                && let Some(shortpath) = shortpaths.get(&path)
                && let Some(meta) = doclet.meta.as_mut()
            {
                meta.shortpath = Some(shortpath.clone());
            }
        }

        for doclet in doclets.iter_mut() {
            self.expander.expand_doclet(doclet);
        }

        let aliases = add_shortname_aliases(&mut registry);

        for doclet in doclets.iter_mut().filter(|d| !d.longname.is_empty()) {
            let url = registry
                .resolve(&doclet.longname)
                .ok_or_else(|| PublishError::MissingUrl(doclet.longname.clone()))?;
            doclet.id = Some(match url.rsplit_once('#') {
                Some((_, fragment)) => fragment.to_owned(),
                None => doclet.display_name().to_owned(),
            });

            if needs_signature(doclet) {
                let context = doclet.longname.clone();
                let resolver = registry.resolver(&context);
                add_signature_params(doclet);
                add_signature_returns(doclet, &resolver);
                add_attribs(doclet);
            }
        }

        let ancestors = ancestor_links(&doclets, &registry);
        for (doclet, ancestors) in doclets.iter_mut().zip(ancestors) {
            doclet.ancestors = ancestors;

            if matches!(doclet.kind, Kind::Member | Kind::Constant) {
                let context = doclet.longname.clone();
                add_signature_types(doclet, &registry.resolver(&context));
                add_attribs(doclet);
                doclet.kind = Kind::Member;
            }
        }

        let members = Members::categorize(&doclets, tutorials);
        attach_module_symbols(&mut doclets);

        for tutorial in tutorials.iter().flat_map(Tutorial::walk) {
            registry.register_tutorial(&tutorial.name, tutorial.display_title());
        }

        let source_files = register_source_files(&source_paths, &shortpaths, &mut registry);
        let pages = collect_pages(&registry, &members, tutorials, &source_files);

        tracing::info!(
            input_count,
            doclet_count = doclets.len(),
            alias_count = aliases.added.len(),
            ambiguous_count = aliases.ambiguous.len(),
            page_count = pages.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Doclets published"
        );

        Ok(PublishOutput {
            doclets,
            registry,
            aliases,
            members,
            pages,
            source_files,
        })
    }
}

/// Per-doclet preparation: captions, `see` anchors and source paths.
///
/// Returns the distinct source paths in first-seen order.
fn prepare(doclets: &mut DocletSet, registry: &mut Registry) -> Vec<String> {
    let mut source_paths = Vec::new();
    let mut seen = HashSet::new();

    for doclet in doclets.iter_mut() {
        doclet.attribs = Some(String::new());

        for example in &mut doclet.examples {
            split_caption(example);
        }

        if doclet.see.iter().any(|see| is_hash_link(see)) {
            let url = registry.create_link(doclet);
            for see in &mut doclet.see {
                if is_hash_link(see) {
                    *see = hash_to_link(&url, see);
                }
            }
        }

        if let Some(path) = doclet.source_path()
            && seen.insert(path.clone())
        {
            source_paths.push(path);
        }
    }

    source_paths
}

/// Move a leading `<caption>...</caption>` line into the caption field.
fn split_caption(example: &mut Example) {
    if !example.caption.is_empty() {
        return;
    }
    let Some(caps) = EXAMPLE_CAPTION.captures(&example.code) else {
        return;
    };
    let caption = caps[1].to_owned();
    let code = caps[3].to_owned();
    example.caption = caption;
    example.code = code;
}

fn is_hash_link(see: &str) -> bool {
    see.len() > 1 && see.starts_with('#')
}

/// `<a href="page.html#hash">#hash</a>` on the page of `url`.
fn hash_to_link(url: &str, hash: &str) -> String {
    let page = url.split('#').next().unwrap_or(url);
    format!(r#"<a href="{page}{hash}">{hash}</a>"#)
}

/// Map each source path to its path relative to the deepest directory all
/// of them share, always with forward slashes.
fn shorten_paths(paths: &[String]) -> HashMap<String, String> {
    let split: Vec<Vec<&str>> = paths.iter().map(|p| p.split(['/', '\\']).collect()).collect();

    let common = split.first().map_or(0, |first| {
        let dir_len = first.len().saturating_sub(1);
        (0..dir_len)
            .take_while(|&i| {
                split
                    .iter()
                    .all(|segments| segments.len() > i + 1 && segments[i] == first[i])
            })
            .count()
    });

    paths
        .iter()
        .zip(&split)
        .map(|(path, segments)| (path.clone(), segments[common..].join("/")))
        .collect()
}

/// Ancestor links of every doclet, outermost first.
///
/// The last link carries the scope punctuation of the doclet itself, so the
/// links read as a prefix of its name (`Foo.` `Bar#`).
fn ancestor_links(doclets: &DocletSet, registry: &Registry) -> Vec<Vec<String>> {
    let mut by_longname: HashMap<&str, &Doclet> = HashMap::new();
    for doclet in doclets {
        by_longname.entry(doclet.longname.as_str()).or_insert(doclet);
    }

    doclets
        .iter()
        .map(|doclet| {
            let mut chain = Vec::new();
            let mut visited = HashSet::from([doclet.longname.as_str()]);
            let mut current = doclet;
            while let Some(parent) = current
                .memberof
                .as_deref()
                .and_then(|memberof| by_longname.get(memberof).copied())
            {
                if !visited.insert(parent.longname.as_str()) {
                    break;
                }
                chain.push(parent);
                current = parent;
            }
            chain.reverse();

            let resolver = registry.resolver(&doclet.longname);
            let mut links: Vec<String> = chain
                .iter()
                .map(|ancestor| {
                    let punctuation = ancestor.scope.as_ref().map_or("", Scope::punctuation);
                    let text = format!("{punctuation}{}", ancestor.display_name());
                    resolver.link_to(&ancestor.longname, Some(&text)).to_string()
                })
                .collect();
            if let Some(last) = links.last_mut() {
                last.push_str(doclet.scope.as_ref().map_or("", Scope::punctuation));
            }
            links
        })
        .collect()
}

fn register_source_files(
    paths: &[String],
    shortpaths: &HashMap<String, String>,
    registry: &mut Registry,
) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|path| {
            let shortpath = shortpaths.get(path)?.clone();
            let filename = registry.claim_filename(&shortpath);
            registry.register(&shortpath, &filename);
            Some(SourceFile {
                path: path.clone(),
                shortpath,
                filename,
            })
        })
        .collect()
}

/// Pages to generate: home, global, one per container long name (aliases
/// never own a page), tutorials and source listings.
fn collect_pages(
    registry: &Registry,
    members: &Members,
    tutorials: &[Tutorial],
    source_files: &[SourceFile],
) -> Vec<Page> {
    let mut pages = vec![Page {
        title: "Home".to_owned(),
        filename: registry.index_url().to_owned(),
        longname: None,
    }];

    if !members.globals.is_empty() {
        pages.push(Page {
            title: "Global".to_owned(),
            filename: registry.global_url().to_owned(),
            longname: Some(GLOBAL_NAME.to_owned()),
        });
    }

    let mut containers: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for (label, group) in members.containers() {
        for member in group {
            let Some(longname) = member.longname.as_deref() else {
                continue;
            };
            let titles = containers.entry(longname).or_default();
            if !titles.iter().any(|(seen, _)| *seen == label) {
                titles.push((label, member.name.as_str()));
            }
        }
    }

    for (longname, url) in registry.entries() {
        if registry.is_alias(longname) {
            continue;
        }
        for (label, name) in containers.get(longname).into_iter().flatten() {
            pages.push(Page {
                title: format!("{label}: {name}"),
                filename: url.to_owned(),
                longname: Some(longname.to_owned()),
            });
        }
    }

    for tutorial in tutorials.iter().flat_map(Tutorial::walk) {
        if let Some(link) = registry.tutorial(&tutorial.name) {
            pages.push(Page {
                title: format!("Tutorial: {}", link.title),
                filename: link.url.clone(),
                longname: None,
            });
        }
    }

    pages.extend(source_files.iter().map(|file| Page {
        title: format!("Source: {}", file.shortpath),
        filename: file.filename.clone(),
        longname: None,
    }));

    pages
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DOCLETS: &str = r##"[
        {
            "longname": "module:mw/Api~Api",
            "name": "Api",
            "kind": "class",
            "memberof": "module:mw/Api",
            "scope": "inner",
            "description": "Client, see {@link #get} and T100.",
            "params": [{"name": "options", "optional": true}, {"name": "options.url"}],
            "meta": {"path": "/repo/src/mw", "filename": "Api.js", "code": {"type": "ClassDeclaration"}}
        },
        {
            "longname": "module:mw/Api~Api#get",
            "name": "get",
            "kind": "function",
            "memberof": "module:mw/Api~Api",
            "scope": "instance",
            "see": ["#post", "Other docs"],
            "returns": [{"type": {"names": ["Promise"]}}],
            "meta": {"path": "/repo/src/mw", "filename": "Api.js"}
        },
        {
            "longname": "module:mw/Api",
            "name": "mw/Api",
            "kind": "module",
            "meta": {"path": "/repo/src", "filename": "index.js"}
        },
        {
            "longname": "LIMIT",
            "name": "LIMIT",
            "kind": "constant",
            "scope": "global",
            "type": {"names": ["number"]},
            "examples": ["<caption>Usage</caption>\nuse(LIMIT);"]
        },
        {
            "longname": "Hidden",
            "name": "Hidden",
            "kind": "class",
            "undocumented": true
        }
    ]"##;

    fn publish(config: PublishConfig, tutorials: &[Tutorial]) -> PublishOutput {
        Publisher::new(config).run_json(DOCLETS, tutorials).unwrap()
    }

    #[test]
    fn test_pipeline_registers_and_prunes() {
        let output = publish(PublishConfig::default(), &[]);

        assert_eq!(output.doclets.len(), 4);
        assert!(output.doclets.find("Hidden").is_none());
        assert_eq!(
            output.registry.resolve("module:mw/Api~Api"),
            Some("module-mw_Api-Api.html")
        );
        assert_eq!(
            output.registry.resolve("module:mw/Api~Api#get"),
            Some("module-mw_Api-Api.html#get")
        );
        assert_eq!(output.registry.resolve("LIMIT"), Some("global.html#LIMIT"));
    }

    #[test]
    fn test_pipeline_expands_text() {
        let output = publish(PublishConfig::default(), &[]);
        let api = output.doclets.find("module:mw/Api~Api").unwrap();

        assert_eq!(
            api.description.as_deref(),
            Some(
                "Client, see {@link module:mw/Api~Api#get #get} and \
                 {@link https://phabricator.wikimedia.org/T100 T100}."
            )
        );
    }

    #[test]
    fn test_pipeline_aliases() {
        let output = publish(PublishConfig::default(), &[]);

        assert_eq!(output.aliases.added, vec!["Api".to_owned(), "Api#get".to_owned()]);
        assert_eq!(output.registry.resolve("Api#get"), Some("module-mw_Api-Api.html#get"));
        assert!(output.registry.is_alias("Api"));
    }

    #[test]
    fn test_pipeline_signatures_and_ids() {
        let output = publish(PublishConfig::default(), &[]);

        let api = output.doclets.find("module:mw/Api~Api").unwrap();
        assert_eq!(api.id.as_deref(), Some("Api"));
        assert_eq!(
            api.signature.as_deref(),
            Some(
                r#"<span class="signature">(options<span class="signature-attributes">opt</span>)</span><span class="type-signature"></span>"#
            )
        );
        assert_eq!(
            api.attribs.as_deref(),
            Some(r#"<span class="type-signature"></span>"#)
        );

        let get = output.doclets.find("module:mw/Api~Api#get").unwrap();
        assert_eq!(get.id.as_deref(), Some("get"));
        assert_eq!(
            get.see,
            vec![
                r##"<a href="module-mw_Api-Api.html#post">#post</a>"##.to_owned(),
                "Other docs".to_owned(),
            ]
        );
    }

    #[test]
    fn test_pipeline_constant_becomes_member() {
        let output = publish(PublishConfig::default(), &[]);
        let limit = output.doclets.find("LIMIT").unwrap();

        assert_eq!(limit.kind, Kind::Member);
        assert_eq!(
            limit.signature.as_deref(),
            Some(r#"<span class="type-signature"> :number</span>"#)
        );
        assert_eq!(
            limit.attribs.as_deref(),
            Some(r#"<span class="type-signature">(constant) </span>"#)
        );
        assert_eq!(limit.examples[0].caption, "Usage");
        assert_eq!(limit.examples[0].code, "use(LIMIT);");
        assert_eq!(output.members.globals.len(), 1);
    }

    #[test]
    fn test_pipeline_ancestors() {
        let output = publish(PublishConfig::default(), &[]);
        let get = output.doclets.find("module:mw/Api~Api#get").unwrap();

        assert_eq!(
            get.ancestors,
            vec![
                r#"<a href="module-mw_Api.html">mw/Api</a>"#.to_owned(),
                r#"<a href="module-mw_Api-Api.html">~Api</a>#"#.to_owned(),
            ]
        );
    }

    #[test]
    fn test_pipeline_source_paths_shortened() {
        let output = publish(PublishConfig::default(), &[]);

        let shortpaths: Vec<&str> = output
            .source_files
            .iter()
            .map(|file| file.shortpath.as_str())
            .collect();
        assert_eq!(shortpaths, vec!["index.js", "mw/Api.js"]);

        let api = output.doclets.find("module:mw/Api~Api").unwrap();
        assert_eq!(
            api.meta.as_ref().and_then(|m| m.shortpath.as_deref()),
            Some("mw/Api.js")
        );
        assert_eq!(output.registry.resolve("mw/Api.js"), Some("mw_Api.js.html"));
    }

    #[test]
    fn test_link_map_preseeded_and_kept() {
        let mut config = PublishConfig::default();
        config
            .link_map
            .insert("LIMIT".to_owned(), "https://example.org/limit".to_owned());
        config
            .link_map
            .insert("jQuery".to_owned(), "https://api.jquery.com/".to_owned());

        let output = publish(config, &[]);

        assert_eq!(output.registry.resolve("jQuery"), Some("https://api.jquery.com/"));
        assert_eq!(output.registry.resolve("LIMIT"), Some("https://example.org/limit"));
        assert!(output.registry.is_alias("jQuery"));
        assert!(output.pages.iter().all(|page| page.longname.as_deref() != Some("jQuery")));
    }

    #[test]
    fn test_pages() {
        let tutorials = vec![Tutorial {
            name: "intro".to_owned(),
            title: "Introduction".to_owned(),
            children: Vec::new(),
        }];
        let output = publish(PublishConfig::default(), &tutorials);

        let titles: Vec<(&str, &str)> = output
            .pages
            .iter()
            .map(|page| (page.title.as_str(), page.filename.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![
                ("Home", "index.html"),
                ("Global", "global.html"),
                ("Class: Api", "module-mw_Api-Api.html"),
                ("Module: mw/Api", "module-mw_Api.html"),
                ("Tutorial: Introduction", "tutorial-intro.html"),
                ("Source: index.js", "index.js.html"),
                ("Source: mw/Api.js", "mw_Api.js.html"),
            ]
        );
    }

    #[test]
    fn test_invalid_json() {
        let result = Publisher::new(PublishConfig::default()).run_json("{", &[]);

        assert!(matches!(result, Err(PublishError::Input(_))));
    }

    #[test]
    fn test_shorten_paths() {
        let paths = vec![
            "/repo/src/a/x.js".to_owned(),
            "/repo/src/b/y.js".to_owned(),
            r"C:\other\z.js".to_owned(),
        ];
        let short = shorten_paths(&paths[..2]);
        assert_eq!(short["/repo/src/a/x.js"], "a/x.js");
        assert_eq!(short["/repo/src/b/y.js"], "b/y.js");

        let windows = shorten_paths(&paths[2..]);
        assert_eq!(windows[r"C:\other\z.js"], "z.js");
    }

    #[test]
    fn test_ancestor_cycle_terminates() {
        let mut a = Doclet::new("A", Kind::Namespace);
        a.memberof = Some("B".to_owned());
        let mut b = Doclet::new("B", Kind::Namespace);
        b.memberof = Some("A".to_owned());

        let output = Publisher::new(PublishConfig::default())
            .run(DocletSet::from(vec![a, b]), &[])
            .unwrap();

        assert_eq!(output.doclets.find("A").unwrap().ancestors.len(), 1);
    }
}
