//! Doclet records as produced by the upstream comment parser.
//!
//! Doclets arrive as a JSON array. Only the fields the pipeline reads or
//! writes are modelled explicitly; everything else is carried through
//! unchanged in `extra` so the renderer still sees it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Kind of a documented symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    Class,
    Constant,
    Event,
    External,
    File,
    Function,
    Interface,
    Member,
    Mixin,
    Module,
    Namespace,
    Package,
    Typedef,
    /// Any kind the pipeline has no rules for.
    Other(String),
}

impl Kind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Class => "class",
            Self::Constant => "constant",
            Self::Event => "event",
            Self::External => "external",
            Self::File => "file",
            Self::Function => "function",
            Self::Interface => "interface",
            Self::Member => "member",
            Self::Mixin => "mixin",
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Typedef => "typedef",
            Self::Other(other) => other,
        }
    }

    /// Kinds that get their own output page.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Module
                | Self::External
                | Self::Namespace
                | Self::Mixin
                | Self::Interface
        )
    }

    /// Long-name namespace prefix used in link fragments (`module:` etc.).
    #[must_use]
    pub(crate) fn namespace(&self) -> &'static str {
        match self {
            Self::Event => "event:",
            Self::External => "external:",
            Self::Module => "module:",
            _ => "",
        }
    }
}

impl From<String> for Kind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "class" => Self::Class,
            "constant" => Self::Constant,
            "event" => Self::Event,
            "external" => Self::External,
            "file" => Self::File,
            "function" => Self::Function,
            "interface" => Self::Interface,
            "member" => Self::Member,
            "mixin" => Self::Mixin,
            "module" => Self::Module,
            "namespace" => Self::Namespace,
            "package" => Self::Package,
            "typedef" => Self::Typedef,
            _ => Self::Other(value),
        }
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

/// Scope of a symbol relative to its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    Global,
    Static,
    Instance,
    Inner,
    Other(String),
}

impl Scope {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => "global",
            Self::Static => "static",
            Self::Instance => "instance",
            Self::Inner => "inner",
            Self::Other(other) => other,
        }
    }

    /// Long-name separator encoding this scope.
    #[must_use]
    pub fn punctuation(&self) -> &'static str {
        match self {
            Self::Static => ".",
            Self::Instance => "#",
            Self::Inner => "~",
            Self::Global | Self::Other(_) => "",
        }
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        match value.as_str() {
            "global" => Self::Global,
            "static" => Self::Static,
            "instance" => Self::Instance,
            "inner" => Self::Inner,
            _ => Self::Other(value),
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

/// Declared type of a symbol or descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameter, return, property or exception descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_spec: Option<TypeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Variadic (`...name`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub variable: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Param {
    /// Create a descriptor with just a name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn type_names(&self) -> &[String] {
        self.type_spec.as_ref().map_or(&[], |t| t.names.as_slice())
    }
}

/// Code example, optionally captioned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawExample")]
pub struct Example {
    pub caption: String,
    pub code: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExample {
    Code(String),
    Captioned {
        #[serde(default)]
        caption: String,
        code: String,
    },
}

impl From<RawExample> for Example {
    fn from(raw: RawExample) -> Self {
        match raw {
            RawExample::Code(code) => Self {
                caption: String::new(),
                code,
            },
            RawExample::Captioned { caption, code } => Self { caption, code },
        }
    }
}

/// Information about the parsed source construct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMeta {
    /// Syntax node type, e.g. `FunctionExpression`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Source location of a doclet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineno: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeMeta>,
    /// Source path relative to the common prefix of all sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortpath: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One documented symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doclet {
    /// Canonical identifier; empty for anonymous inline entries.
    #[serde(default)]
    pub longname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memberof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    #[serde(rename = "async", default, skip_serializing_if = "is_false")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub generator: bool,
    /// Abstract member.
    #[serde(rename = "virtual", default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub undocumented: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classdesc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub author: Vec<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub see: Vec<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_spec: Option<TypeSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub yields: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub augments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Display signature (HTML), written by the signature synthesizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Attribute badge line (HTML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribs: Option<String>,
    /// Anchor id on the owning page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Links to the `memberof` chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<String>,
    /// Classes and functions exported as this module's value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Doclet>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Accept either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

impl Doclet {
    /// Create a doclet whose name is the last segment of `longname`.
    #[must_use]
    pub fn new(longname: &str, kind: Kind) -> Self {
        let name = longname
            .rsplit(['.', '#', '~'])
            .next()
            .unwrap_or(longname)
            .to_owned();
        Self {
            longname: longname.to_owned(),
            name: Some(name),
            kind,
            memberof: None,
            scope: None,
            variation: None,
            access: None,
            is_async: false,
            generator: false,
            is_virtual: false,
            readonly: false,
            nullable: None,
            undocumented: false,
            ignore: false,
            description: None,
            classdesc: None,
            summary: None,
            author: Vec::new(),
            see: Vec::new(),
            type_spec: None,
            params: Vec::new(),
            returns: Vec::new(),
            yields: Vec::new(),
            properties: Vec::new(),
            exceptions: Vec::new(),
            augments: Vec::new(),
            examples: Vec::new(),
            meta: None,
            signature: None,
            attribs: None,
            id: None,
            ancestors: Vec::new(),
            modules: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Declared type names, empty if the doclet has no type.
    #[must_use]
    pub fn type_names(&self) -> &[String] {
        self.type_spec.as_ref().map_or(&[], |t| t.names.as_slice())
    }

    /// Short name, falling back to the long name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.longname)
    }

    /// Whether this is a non-module doclet standing for a module's exported
    /// value (`module.exports = function () {}`).
    #[must_use]
    pub fn is_module_exports(&self) -> bool {
        self.name.as_deref() == Some(self.longname.as_str())
            && self.longname.starts_with("module:")
            && self.kind != Kind::Module
    }

    /// Path of the source file this doclet came from.
    ///
    /// A `path` of literally `"null"` is treated as absent.
    #[must_use]
    pub fn source_path(&self) -> Option<String> {
        let meta = self.meta.as_ref()?;
        let filename = meta.filename.as_deref()?;
        match meta.path.as_deref() {
            Some(dir) if !dir.is_empty() && dir != "null" => {
                Some(format!("{}/{filename}", dir.trim_end_matches(['/', '\\'])))
            }
            _ => Some(filename.to_owned()),
        }
    }
}

/// Ordered collection of doclets for one documentation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocletSet {
    doclets: Vec<Doclet>,
}

impl DocletSet {
    /// Parse a JSON array of doclets.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doclets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doclets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Doclet> {
        self.doclets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Doclet> {
        self.doclets.iter_mut()
    }

    /// First doclet with the given long name.
    #[must_use]
    pub fn find(&self, longname: &str) -> Option<&Doclet> {
        self.doclets.iter().find(|d| d.longname == longname)
    }

    /// Drop doclets that should never be published: undocumented,
    /// explicitly ignored, or members of anonymous scopes.
    pub fn prune(&mut self) {
        self.doclets.retain(|d| {
            !d.undocumented && !d.ignore && d.memberof.as_deref() != Some("<anonymous>")
        });
    }

    /// Stable sort by long name.
    pub fn sort_by_longname(&mut self) {
        self.doclets.sort_by(|a, b| a.longname.cmp(&b.longname));
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Doclet> {
        self.doclets
    }
}

impl From<Vec<Doclet>> for DocletSet {
    fn from(doclets: Vec<Doclet>) -> Self {
        Self { doclets }
    }
}

impl<'a> IntoIterator for &'a DocletSet {
    type Item = &'a Doclet;
    type IntoIter = std::slice::Iter<'a, Doclet>;

    fn into_iter(self) -> Self::IntoIter {
        self.doclets.iter()
    }
}
