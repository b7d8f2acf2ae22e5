//! Display signatures and attribute badges.
//!
//! Signatures are HTML fragments stored on the doclet (`signature`,
//! `attribs`); the structured `params`, `returns` and `type` fields are only
//! read.

use std::fmt;

use crate::doclet::{Doclet, Kind, Param, Scope};
use crate::html::htmlsafe;
use crate::resolve::LinkResolver;

/// Whether a doclet is rendered with a call signature.
#[must_use]
pub fn needs_signature(doclet: &Doclet) -> bool {
    match doclet.kind {
        Kind::Function | Kind::Class => true,
        Kind::Typedef => doclet
            .type_names()
            .iter()
            .any(|name| name.eq_ignore_ascii_case("function")),
        Kind::Namespace => doclet
            .meta
            .as_ref()
            .and_then(|meta| meta.code.as_ref())
            .and_then(|code| code.node_type.as_deref())
            .is_some_and(|node_type| node_type.contains("Function") || node_type.contains("function")),
        _ => false,
    }
}

/// `opt`, then `nullable` / `non-null` when nullability is explicit.
fn signature_badges(optional: bool, nullable: Option<bool>) -> Vec<&'static str> {
    let mut badges = Vec::new();
    if optional {
        badges.push("opt");
    }
    match nullable {
        Some(true) => badges.push("nullable"),
        Some(false) => badges.push("non-null"),
        None => {}
    }
    badges
}

/// One parameter as it appears in a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamEntry<'a> {
    pub name: &'a str,
    pub variadic: bool,
    pub badges: Vec<&'static str>,
}

impl<'a> ParamEntry<'a> {
    fn from_param(param: &'a Param) -> Option<Self> {
        let name = param.name.as_deref().filter(|name| !name.is_empty())?;
        if name.contains('.') {
            return None;
        }
        Some(Self {
            name,
            variadic: param.variable,
            badges: signature_badges(param.optional, param.nullable),
        })
    }

    /// HTML form: `&hellip;name<span class="signature-attributes">opt</span>`.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if self.variadic {
            html.push_str("&hellip;");
        }
        html.push_str(self.name);
        if !self.badges.is_empty() {
            html.push_str(r#"<span class="signature-attributes">"#);
            html.push_str(&self.badges.join(", "));
            html.push_str("</span>");
        }
        html
    }
}

/// Plain form: `...name[opt, nullable]`.
impl fmt::Display for ParamEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            f.write_str("...")?;
        }
        f.write_str(self.name)?;
        if !self.badges.is_empty() {
            write!(f, "[{}]", self.badges.join(", "))?;
        }
        Ok(())
    }
}

/// Signature entries for a parameter list.
///
/// Nested properties (`options.timeout`) and unnamed params are skipped.
#[must_use]
pub fn param_entries(params: &[Param]) -> Vec<ParamEntry<'_>> {
    params.iter().filter_map(ParamEntry::from_param).collect()
}

/// Plain-text parameter list, e.g. `a, d[opt]`.
#[must_use]
pub fn plain_params(params: &[Param]) -> String {
    param_entries(params)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Append `(a, b)` to the doclet's signature.
pub fn add_signature_params(doclet: &mut Doclet) {
    let params = param_entries(&doclet.params)
        .iter()
        .map(ParamEntry::to_html)
        .collect::<Vec<_>>()
        .join(", ");
    let signature = doclet.signature.take().unwrap_or_default();
    doclet.signature = Some(format!("{signature}({params})"));
}

/// Wrap the signature and append ` &rarr; (badges) {T1|T2}`.
///
/// `yields` take precedence over `returns`.
pub fn add_signature_returns(doclet: &mut Doclet, resolver: &LinkResolver<'_>) {
    let source = if doclet.yields.is_empty() {
        &doclet.returns
    } else {
        &doclet.yields
    };

    let mut badges: Vec<&'static str> = Vec::new();
    for item in source {
        for badge in signature_badges(item.optional, item.nullable) {
            if !badges.contains(&badge) {
                badges.push(badge);
            }
        }
    }

    let types: Vec<String> = source
        .iter()
        .flat_map(|item| type_links(item.type_names(), resolver))
        .collect();

    let returns = if types.is_empty() {
        String::new()
    } else {
        format!(
            " &rarr; {}{{{}}}",
            attribs_string(&badges),
            types.join("|")
        )
    };

    let signature = doclet.signature.take().unwrap_or_default();
    doclet.signature = Some(format!(
        r#"<span class="signature">{signature}</span><span class="type-signature">{returns}</span>"#
    ));
}

/// Append the declared type as ` :T1|T2`.
pub fn add_signature_types(doclet: &mut Doclet, resolver: &LinkResolver<'_>) {
    let types = type_links(doclet.type_names(), resolver);
    let types = if types.is_empty() {
        String::new()
    } else {
        format!(" :{}", types.join("|"))
    };

    let signature = doclet.signature.take().unwrap_or_default();
    doclet.signature = Some(format!(
        r#"{signature}<span class="type-signature">{types}</span>"#
    ));
}

/// Attribute badges of a doclet, in display order.
#[must_use]
pub fn attributes(doclet: &Doclet) -> Vec<String> {
    let mut attribs = Vec::new();

    if doclet.is_async {
        attribs.push("async".to_owned());
    }
    if doclet.generator {
        attribs.push("generator".to_owned());
    }
    if doclet.is_virtual {
        attribs.push("abstract".to_owned());
    }
    if let Some(access) = doclet.access.as_deref().filter(|access| *access != "public") {
        attribs.push(access.to_owned());
    }
    if let Some(scope) = &doclet.scope
        && !matches!(scope, Scope::Instance | Scope::Global)
        && matches!(doclet.kind, Kind::Function | Kind::Member | Kind::Constant)
    {
        attribs.push(scope.as_str().to_owned());
    }
    if doclet.readonly && doclet.kind == Kind::Member {
        attribs.push("readonly".to_owned());
    }
    if doclet.kind == Kind::Constant {
        attribs.push("constant".to_owned());
    }
    match doclet.nullable {
        Some(true) => attribs.push("nullable".to_owned()),
        Some(false) => attribs.push("non-null".to_owned()),
        None => {}
    }

    attribs
}

/// Set `attribs` to `<span class="type-signature">(a, b) </span>`.
pub fn add_attribs(doclet: &mut Doclet) {
    let attribs = attributes(doclet);
    doclet.attribs = Some(format!(
        r#"<span class="type-signature">{}</span>"#,
        attribs_string(&attribs)
    ));
}

fn attribs_string<S: AsRef<str>>(attribs: &[S]) -> String {
    if attribs.is_empty() {
        return String::new();
    }
    let joined = attribs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    htmlsafe(&format!("({joined}) "))
}

fn type_links(names: &[String], resolver: &LinkResolver<'_>) -> Vec<String> {
    names
        .iter()
        .map(|name| resolver.link_to(name, Some(&htmlsafe(name))).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::doclet::{CodeMeta, Meta, TypeSpec};
    use crate::registry::Registry;

    fn typed(names: &[&str]) -> Option<TypeSpec> {
        Some(TypeSpec {
            names: names.iter().map(|&n| n.to_owned()).collect(),
            ..TypeSpec::default()
        })
    }

    fn params() -> Vec<Param> {
        vec![
            Param::named("a"),
            Param::named("b.c"),
            Param {
                optional: true,
                ..Param::named("d")
            },
        ]
    }

    #[test]
    fn test_needs_signature() {
        assert!(needs_signature(&Doclet::new("f", Kind::Function)));
        assert!(needs_signature(&Doclet::new("C", Kind::Class)));
        assert!(!needs_signature(&Doclet::new("m", Kind::Member)));

        let mut callback = Doclet::new("Callback", Kind::Typedef);
        callback.type_spec = typed(&["Function"]);
        assert!(needs_signature(&callback));
        callback.type_spec = typed(&["Object"]);
        assert!(!needs_signature(&callback));

        let mut namespace = Doclet::new("ns", Kind::Namespace);
        assert!(!needs_signature(&namespace));
        namespace.meta = Some(Meta {
            code: Some(CodeMeta {
                node_type: Some("FunctionExpression".to_owned()),
                ..CodeMeta::default()
            }),
            ..Meta::default()
        });
        assert!(needs_signature(&namespace));
    }

    #[test]
    fn test_plain_params_skip_nested() {
        assert_eq!(plain_params(&params()), "a, d[opt]");
    }

    #[test]
    fn test_plain_params_badges() {
        let params = vec![
            Param {
                variable: true,
                nullable: Some(false),
                ..Param::named("rest")
            },
            Param {
                optional: true,
                nullable: Some(true),
                ..Param::named("x")
            },
        ];
        assert_eq!(plain_params(&params), "...rest[non-null], x[opt, nullable]");
    }

    #[test]
    fn test_add_signature_params_html() {
        let mut doclet = Doclet::new("f", Kind::Function);
        doclet.params = params();

        add_signature_params(&mut doclet);

        assert_eq!(
            doclet.signature.as_deref(),
            Some(r#"(a, d<span class="signature-attributes">opt</span>)"#)
        );
        assert_eq!(doclet.params.len(), 3);
    }

    #[test]
    fn test_add_signature_returns() {
        let mut registry = Registry::new();
        registry.register("Foo", "Foo.html");
        let resolver = registry.resolver("f");

        let mut doclet = Doclet::new("f", Kind::Function);
        doclet.returns = vec![
            Param {
                type_spec: typed(&["Foo", "null"]),
                nullable: Some(true),
                ..Param::default()
            },
            Param {
                type_spec: typed(&["Array.<string>"]),
                nullable: Some(true),
                ..Param::default()
            },
        ];
        add_signature_params(&mut doclet);
        add_signature_returns(&mut doclet, &resolver);

        assert_eq!(
            doclet.signature.as_deref(),
            Some(
                "<span class=\"signature\">()</span><span class=\"type-signature\"> &rarr; \
                 (nullable) {<a href=\"Foo.html\">Foo</a>|<code>null</code>|Array.&lt;string>}</span>"
            )
        );
    }

    #[test]
    fn test_yields_preferred_over_returns() {
        let registry = Registry::new();
        let resolver = registry.resolver("gen");

        let mut doclet = Doclet::new("gen", Kind::Function);
        doclet.returns = vec![Param {
            type_spec: typed(&["Iterator"]),
            ..Param::default()
        }];
        doclet.yields = vec![Param {
            type_spec: typed(&["number"]),
            ..Param::default()
        }];
        add_signature_returns(&mut doclet, &resolver);

        assert_eq!(
            doclet.signature.as_deref(),
            Some(
                r#"<span class="signature"></span><span class="type-signature"> &rarr; {number}</span>"#
            )
        );
    }

    #[test]
    fn test_no_return_types_leaves_empty_span() {
        let registry = Registry::new();
        let mut doclet = Doclet::new("f", Kind::Function);
        add_signature_params(&mut doclet);
        add_signature_returns(&mut doclet, &registry.resolver("f"));

        assert_eq!(
            doclet.signature.as_deref(),
            Some(r#"<span class="signature">()</span><span class="type-signature"></span>"#)
        );
    }

    #[test]
    fn test_add_signature_types() {
        let mut registry = Registry::new();
        registry.register("Foo", "Foo.html");
        let resolver = registry.resolver("m");

        let mut member = Doclet::new("m", Kind::Member);
        member.type_spec = typed(&["Foo", "number"]);
        add_signature_types(&mut member, &resolver);
        assert_eq!(
            member.signature.as_deref(),
            Some(r#"<span class="type-signature"> :<a href="Foo.html">Foo</a>|number</span>"#)
        );

        let mut untyped = Doclet::new("u", Kind::Member);
        add_signature_types(&mut untyped, &resolver);
        assert_eq!(
            untyped.signature.as_deref(),
            Some(r#"<span class="type-signature"></span>"#)
        );
    }

    #[test]
    fn test_attributes_order() {
        let mut doclet = Doclet::new("Foo.bar", Kind::Function);
        doclet.is_async = true;
        doclet.generator = true;
        doclet.is_virtual = true;
        doclet.access = Some("protected".to_owned());
        doclet.scope = Some(Scope::Static);
        doclet.nullable = Some(false);

        assert_eq!(
            attributes(&doclet),
            vec!["async", "generator", "abstract", "protected", "static", "non-null"]
        );
    }

    #[test]
    fn test_attributes_scope_and_kind_rules() {
        let mut class = Doclet::new("Foo.Inner", Kind::Class);
        class.scope = Some(Scope::Static);
        class.access = Some("public".to_owned());
        assert!(attributes(&class).is_empty());

        let mut constant = Doclet::new("Foo~LIMIT", Kind::Constant);
        constant.scope = Some(Scope::Inner);
        constant.readonly = true;
        assert_eq!(attributes(&constant), vec!["inner", "constant"]);

        let mut member = Doclet::new("Foo#size", Kind::Member);
        member.scope = Some(Scope::Instance);
        member.readonly = true;
        assert_eq!(attributes(&member), vec!["readonly"]);
    }

    #[test]
    fn test_add_attribs_escapes() {
        let mut doclet = Doclet::new("Foo#size", Kind::Member);
        doclet.access = Some("a&b<c".to_owned());
        add_attribs(&mut doclet);
        assert_eq!(
            doclet.attribs.as_deref(),
            Some(r#"<span class="type-signature">(a&amp;b&lt;c) </span>"#)
        );

        let mut plain = Doclet::new("f", Kind::Function);
        add_attribs(&mut plain);
        assert_eq!(
            plain.attribs.as_deref(),
            Some(r#"<span class="type-signature"></span>"#)
        );
    }
}
