//! Cross-reference resolution and link rewriting for API documentation.
//!
//! This crate provides:
//! - [`Registry`]: long name to URL mapping with collision-free filenames
//! - [`LinkExpander`]: shorthand, bare-URL and ticket link expansion
//! - [`add_shortname_aliases`]: unambiguous `~` shortname aliases
//! - Signature and attribute synthesis for functions, classes and members
//! - [`Publisher`]: the pipeline running all of the above over a doclet set
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use xref_core::{PublishConfig, Publisher};
//!
//! let json = r#"[{"longname": "Foo", "name": "Foo", "kind": "class",
//!                 "description": "See {@link #bar}."}]"#;
//! let output = Publisher::new(PublishConfig::default()).run_json(json, &[])?;
//!
//! assert_eq!(output.registry.resolve("Foo"), Some("Foo.html"));
//! # Ok(())
//! # }
//! ```

mod aliases;
mod doclet;
mod expand;
mod filename;
mod html;
mod members;
mod publish;
mod registry;
mod resolve;
mod signature;

pub use aliases::{AliasReport, add_shortname_aliases, shortname};
pub use doclet::{CodeMeta, Doclet, DocletSet, Example, Kind, Meta, Param, Scope, TypeSpec};
pub use expand::{
    DEFAULT_TICKET_BASE_URL, DEFAULT_TICKET_PREFIX, FieldShape, LinkExpander, TextField,
};
pub use filename::FilenameAllocator;
pub use html::{escape_attr, htmlsafe};
pub use members::{MemberRef, Members, Tutorial, attach_module_symbols, strip_quotes};
pub use publish::{Page, PublishConfig, PublishError, PublishOutput, Publisher, SourceFile};
pub use registry::{GLOBAL_NAME, INDEX_NAME, Registry, TutorialLink};
pub use resolve::{LinkResolver, Reference};
pub use signature::{
    ParamEntry, add_attribs, add_signature_params, add_signature_returns, add_signature_types,
    attributes, needs_signature, param_entries, plain_params,
};
