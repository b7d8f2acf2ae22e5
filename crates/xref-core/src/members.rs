//! Member categorization for navigation and page generation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::doclet::{Doclet, DocletSet, Kind};

/// Lightweight reference to a categorized doclet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// `None` for inline entries that have no identity of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longname: Option<String>,
    pub name: String,
}

impl MemberRef {
    #[must_use]
    pub fn new(longname: &str, name: &str) -> Self {
        Self {
            longname: Some(longname.to_owned()),
            name: name.to_owned(),
        }
    }

    fn from_doclet(doclet: &Doclet) -> Self {
        Self {
            longname: (!doclet.longname.is_empty()).then(|| doclet.longname.clone()),
            name: doclet.display_name().to_owned(),
        }
    }
}

/// Tutorial tree node as supplied by the tutorial loader.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutorial {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Tutorial>,
}

impl Tutorial {
    /// Title, falling back to the name.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    /// This tutorial and all its descendants, depth first.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &Tutorial> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(Tutorial::walk)))
    }
}

/// Doclets grouped by navigation category, each in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Members {
    pub modules: Vec<MemberRef>,
    pub externals: Vec<MemberRef>,
    pub namespaces: Vec<MemberRef>,
    pub classes: Vec<MemberRef>,
    pub interfaces: Vec<MemberRef>,
    pub events: Vec<MemberRef>,
    pub mixins: Vec<MemberRef>,
    /// Top-level members, functions, constants and typedefs.
    pub globals: Vec<MemberRef>,
    /// Top-level tutorials.
    pub tutorials: Vec<Tutorial>,
}

impl Members {
    /// Categorize a doclet set.
    ///
    /// External names have surrounding quotes stripped. Module exports are
    /// not globals even though they have no `memberof`.
    #[must_use]
    pub fn categorize(doclets: &DocletSet, tutorials: &[Tutorial]) -> Self {
        let mut members = Self {
            tutorials: tutorials.to_vec(),
            ..Self::default()
        };

        for doclet in doclets {
            let group = match doclet.kind {
                Kind::Module => &mut members.modules,
                Kind::External => &mut members.externals,
                Kind::Namespace => &mut members.namespaces,
                Kind::Class => &mut members.classes,
                Kind::Interface => &mut members.interfaces,
                Kind::Event => &mut members.events,
                Kind::Mixin => &mut members.mixins,
                Kind::Member | Kind::Function | Kind::Constant | Kind::Typedef
                    if doclet.memberof.is_none() && !doclet.is_module_exports() =>
                {
                    &mut members.globals
                }
                _ => continue,
            };

            let mut member = MemberRef::from_doclet(doclet);
            if doclet.kind == Kind::External {
                member.name = strip_quotes(&member.name).to_owned();
            }
            group.push(member);
        }

        members
    }

    /// Container groups with the page-title prefix of each.
    #[must_use]
    pub fn containers(&self) -> [(&'static str, &[MemberRef]); 6] {
        [
            ("Module", self.modules.as_slice()),
            ("Class", self.classes.as_slice()),
            ("Namespace", self.namespaces.as_slice()),
            ("Mixin", self.mixins.as_slice()),
            ("External", self.externals.as_slice()),
            ("Interface", self.interfaces.as_slice()),
        ]
    }
}

/// Strip one pair of surrounding double quotes (`"jquery.fn"`).
#[must_use]
pub fn strip_quotes(name: &str) -> &str {
    let name = name.strip_prefix('"').unwrap_or(name);
    name.strip_suffix('"').unwrap_or(name)
}

/// Attach classes and functions exported as a whole module to that module's
/// doclet.
///
/// A module whose long name is shared by a class or function exports only
/// that symbol. Copies of those symbols (classes always, functions only when
/// documented) are stored in the module's `modules` list under the display
/// name `(require("name"))`.
pub fn attach_module_symbols(doclets: &mut DocletSet) {
    let mut symbols: HashMap<String, Vec<Doclet>> = HashMap::new();
    for doclet in doclets.iter() {
        if doclet.longname.starts_with("module:")
            && matches!(doclet.kind, Kind::Class | Kind::Function)
        {
            symbols
                .entry(doclet.longname.clone())
                .or_default()
                .push(doclet.clone());
        }
    }

    for module in doclets.iter_mut().filter(|d| d.kind == Kind::Module) {
        let Some(exported) = symbols.get(&module.longname) else {
            continue;
        };
        module.modules = exported
            .iter()
            .filter(|symbol| symbol.description.is_some() || symbol.kind == Kind::Class)
            .cloned()
            .map(|mut symbol| {
                if let Some(name) = symbol.name.as_deref().and_then(|n| n.strip_prefix("module:")) {
                    symbol.name = Some(format!(r#"(require("{name}"))"#));
                }
                symbol
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn doclet(longname: &str, kind: Kind) -> Doclet {
        let mut doclet = Doclet::new(longname, kind);
        if let Some((_, name)) = longname.split_once(':') {
            doclet.name = Some(name.to_owned());
        }
        doclet
    }

    #[test]
    fn test_categorize_groups_in_input_order() {
        let mut global_fn = doclet("helper", Kind::Function);
        global_fn.memberof = None;
        let mut method = doclet("Foo#bar", Kind::Function);
        method.memberof = Some("Foo".to_owned());
        let mut external = doclet("external:\"jquery.fn\"", Kind::External);
        external.name = Some("\"jquery.fn\"".to_owned());

        let set = DocletSet::from(vec![
            doclet("module:b", Kind::Module),
            doclet("module:a", Kind::Module),
            doclet("Foo", Kind::Class),
            global_fn,
            method,
            external,
            doclet("mw", Kind::Namespace),
            doclet("event:ready", Kind::Event),
        ]);

        let members = Members::categorize(&set, &[]);

        assert_eq!(
            members.modules,
            vec![MemberRef::new("module:b", "b"), MemberRef::new("module:a", "a")]
        );
        assert_eq!(members.classes, vec![MemberRef::new("Foo", "Foo")]);
        assert_eq!(members.globals, vec![MemberRef::new("helper", "helper")]);
        assert_eq!(
            members.externals,
            vec![MemberRef::new("external:\"jquery.fn\"", "jquery.fn")]
        );
        assert_eq!(members.namespaces.len(), 1);
        assert_eq!(members.events.len(), 1);
        assert!(members.mixins.is_empty());
    }

    #[test]
    fn test_module_exports_not_global() {
        let mut exports = doclet("module:foo", Kind::Function);
        exports.name = Some("module:foo".to_owned());

        let members = Members::categorize(&DocletSet::from(vec![exports]), &[]);

        assert!(members.globals.is_empty());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"jquery.fn\""), "jquery.fn");
        assert_eq!(strip_quotes("jQuery"), "jQuery");
        assert_eq!(strip_quotes("\""), "");
    }

    #[test]
    fn test_attach_module_symbols() {
        let mut class = doclet("module:foo", Kind::Class);
        class.name = Some("module:foo".to_owned());
        let mut undocumented_fn = doclet("module:foo", Kind::Function);
        undocumented_fn.name = Some("module:foo".to_owned());
        let mut documented_fn = doclet("module:bar", Kind::Function);
        documented_fn.name = Some("module:bar".to_owned());
        documented_fn.description = Some("Does bar.".to_owned());

        let mut set = DocletSet::from(vec![
            doclet("module:foo", Kind::Module),
            class,
            undocumented_fn,
            doclet("module:bar", Kind::Module),
            documented_fn,
            doclet("module:baz", Kind::Module),
        ]);

        attach_module_symbols(&mut set);

        let foo = set.find("module:foo").unwrap();
        assert_eq!(foo.kind, Kind::Module);
        assert_eq!(foo.modules.len(), 1);
        assert_eq!(foo.modules[0].name.as_deref(), Some(r#"(require("foo"))"#));

        let bar = set.find("module:bar").unwrap();
        assert_eq!(bar.modules.len(), 1);
        assert_eq!(bar.modules[0].kind, Kind::Function);

        assert!(set.find("module:baz").unwrap().modules.is_empty());
    }

    #[test]
    fn test_tutorial_walk() {
        let tutorial = Tutorial {
            name: "intro".to_owned(),
            title: "Introduction".to_owned(),
            children: vec![Tutorial {
                name: "setup".to_owned(),
                ..Tutorial::default()
            }],
        };

        let names: Vec<&str> = tutorial.walk().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["intro", "setup"]);
        assert_eq!(tutorial.children[0].display_title(), "setup");
    }
}
