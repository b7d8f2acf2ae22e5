//! Shorthand and URL link expansion for documentation text.
//!
//! Text is rewritten in three passes, in this order:
//!
//! 1. `{@link .name}` / `{@link #name}` shorthand is qualified with the base
//!    of the current long name.
//! 2. Bare web URLs and domains become `{@link URL}`.
//! 3. Ticket ids such as `T12345` become `{@link <base>T12345 T12345}`.
//!
//! Every `{@link ...}` span, whether it was already in the text or was
//! produced by an earlier pass, is opaque to later passes. URLs that are
//! left alone because they sit inside markup are opaque as well. Running the
//! expander on its own output is therefore a no-op.

use std::sync::LazyLock;

use regex::Regex;

use crate::doclet::{Doclet, Param};

/// Default base URL for ticket autolinking.
pub const DEFAULT_TICKET_BASE_URL: &str = "https://phabricator.wikimedia.org/";

/// Default ticket identifier prefix.
pub const DEFAULT_TICKET_PREFIX: &str = "T";

/// Any explicit reference marker, e.g. `{@link Foo#bar text}`.
static LINK_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*@link\w*\s+[^}]*\}").expect("invalid link markup regex"));

/// A marker whose whole target is member shorthand.
static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\s*@link\s+([#.])([\w$]+)\s*\}$").expect("invalid shorthand regex")
});

/// Ticket ids bounded by ASCII word boundaries.
static TICKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)([A-Z]+)([0-9]+)(?-u:\b)").expect("invalid ticket regex")
});

const GENERIC_TLDS: &str = "com|net|org|edu|gov|mil|aero|asia|biz|cat|coop|info|int|jobs|mobi|museum";
const SPONSORED_TLDS: &str = "post|pro|tel|travel|xxx";
const COUNTRY_TLDS: &str = "ac|ad|ae|af|ag|ai|al|am|an|ao|aq|ar|as|at|au|aw|ax|az|ba|bb|bd|be|bf|bg|bh|bi|bj|bm|bn|bo|br|bs|bt|bv|bw|by|bz|ca|cc|cd|cf|cg|ch|ci|ck|cl|cm|cn|co|cr|cs|cu|cv|cx|cy|cz|dd|de|dj|dk|dm|do|dz|ec|ee|eg|eh|er|es|et|eu|fi|fj|fk|fm|fo|fr|ga|gb|gd|ge|gf|gg|gh|gi|gl|gm|gn|gp|gq|gr|gs|gt|gu|gw|gy|hk|hm|hn|hr|ht|hu|id|ie|il|im|in|io|iq|ir|is|it|je|jm|jo|jp|ke|kg|kh|ki|km|kn|kp|kr|kw|ky|kz|la|lb|lc|li|lk|lr|ls|lt|lu|lv|ly|ma|mc|md|me|mg|mh|mk|ml|mm|mn|mo|mp|mq|mr|ms|mt|mu|mv|mw|mx|my|mz|na|nc|ne|nf|ng|ni|nl|no|np|nr|nu|nz|om|pa|pe|pf|pg|ph|pk|pl|pm|pn|pr|ps|pt|pw|py|qa|re|ro|rs|ru|rw|sa|sb|sc|sd|se|sg|sh|si|sj|sk|sl|sm|sn|so|sr|ss|st|su|sv|sx|sy|sz|tc|td|tf|tg|th|tj|tk|tl|tm|tn|to|tp|tr|tt|tv|tw|tz|ua|ug|uk|us|uy|uz|va|vc|ve|vg|vi|vn|vu|wf|ws|ye|yt|yu|za|zm|zw";

/// Liberal web URL pattern (after John Gruber's).
///
/// The first branch matches scheme URLs and domain-plus-path URLs, greedily,
/// allowing balanced parentheses one level deep and refusing to end on
/// punctuation or quotes. The second branch matches bare domains with a
/// known TLD that are not the host part of an e-mail address.
const WEB_URL_PATTERN: &str = r##"(?i)\b((?:https?:(?:/{1,3}|[a-z0-9%])|[a-z0-9.-]+[.](?:TLDS_WITH_NAME)/)(?:[^\s()<>{}\[\]]+|\([^\s()]*?\([^\s()]+\)[^\s()]*?\)|\([^\s]+?\))+(?:\([^\s()]*?\([^\s()]+\)[^\s()]*?\)|\([^\s]+?\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’])|(?:[a-z0-9]+(?:[.-][a-z0-9]+)*[.](?:TLDS)\b/?(?!@)))"##;

static WEB_URL: LazyLock<fancy_regex::Regex> = LazyLock::new(|| {
    let pattern = WEB_URL_PATTERN
        .replace(
            "TLDS_WITH_NAME",
            &format!("{GENERIC_TLDS}|name|{SPONSORED_TLDS}|{COUNTRY_TLDS}"),
        )
        .replace("TLDS", &format!("{GENERIC_TLDS}|{SPONSORED_TLDS}|{COUNTRY_TLDS}"));
    fancy_regex::Regex::new(&pattern).expect("invalid web url regex")
});

/// Shape of a text-bearing doclet field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldShape {
    /// A single free-text value.
    Text,
    /// A sequence of free-text values.
    TextList,
    /// A sequence of descriptors whose own text fields are walked.
    RecordList,
}

/// Doclet fields the expander rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextField {
    Author,
    Classdesc,
    Description,
    Exceptions,
    Params,
    Properties,
    Returns,
    See,
    Summary,
}

impl TextField {
    pub const ALL: [Self; 9] = [
        Self::Author,
        Self::Classdesc,
        Self::Description,
        Self::Exceptions,
        Self::Params,
        Self::Properties,
        Self::Returns,
        Self::See,
        Self::Summary,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Classdesc => "classdesc",
            Self::Description => "description",
            Self::Exceptions => "exceptions",
            Self::Params => "params",
            Self::Properties => "properties",
            Self::Returns => "returns",
            Self::See => "see",
            Self::Summary => "summary",
        }
    }

    #[must_use]
    pub const fn shape(self) -> FieldShape {
        match self {
            Self::Classdesc | Self::Description | Self::Summary => FieldShape::Text,
            Self::Author | Self::See => FieldShape::TextList,
            Self::Exceptions | Self::Params | Self::Properties | Self::Returns => {
                FieldShape::RecordList
            }
        }
    }

    /// Fields that usually hold plain prose (names, citations) and are only
    /// expanded when they already contain a link marker.
    const fn requires_marker(self) -> bool {
        matches!(self, Self::Author | Self::See)
    }
}

/// Borrowed storage of one text field.
enum FieldSlot<'a> {
    Text(&'a mut Option<String>),
    TextList(&'a mut Vec<String>),
    RecordList(&'a mut Vec<Param>),
}

fn doclet_slot(doclet: &mut Doclet, field: TextField) -> FieldSlot<'_> {
    match field {
        TextField::Author => FieldSlot::TextList(&mut doclet.author),
        TextField::Classdesc => FieldSlot::Text(&mut doclet.classdesc),
        TextField::Description => FieldSlot::Text(&mut doclet.description),
        TextField::Exceptions => FieldSlot::RecordList(&mut doclet.exceptions),
        TextField::Params => FieldSlot::RecordList(&mut doclet.params),
        TextField::Properties => FieldSlot::RecordList(&mut doclet.properties),
        TextField::Returns => FieldSlot::RecordList(&mut doclet.returns),
        TextField::See => FieldSlot::TextList(&mut doclet.see),
        TextField::Summary => FieldSlot::Text(&mut doclet.summary),
    }
}

/// Text fields of a descriptor record; descriptors only carry a description.
fn record_slot(record: &mut Param, field: TextField) -> Option<FieldSlot<'_>> {
    match field {
        TextField::Description => Some(FieldSlot::Text(&mut record.description)),
        _ => None,
    }
}

/// Piece of text during expansion.
#[derive(Debug)]
enum Segment {
    /// Still eligible for later passes.
    Text(String),
    /// Reference markup or markup-owned URL; emitted verbatim.
    Markup(String),
}

#[derive(Clone, Debug)]
struct TicketLinks {
    base_url: String,
    prefix: String,
}

/// Rewrites reference shorthand, bare URLs and ticket ids into explicit
/// `{@link ...}` markers.
#[derive(Clone, Debug)]
pub struct LinkExpander {
    tickets: Option<TicketLinks>,
}

impl Default for LinkExpander {
    fn default() -> Self {
        Self::new(DEFAULT_TICKET_BASE_URL, DEFAULT_TICKET_PREFIX)
    }
}

impl LinkExpander {
    /// Create an expander.
    ///
    /// Ticket autolinking is disabled when `ticket_base_url` is not an
    /// absolute `http(s)` URL, so no link is ever produced that a browser
    /// cannot follow.
    #[must_use]
    pub fn new(ticket_base_url: &str, ticket_prefix: &str) -> Self {
        let tickets = if ticket_base_url.starts_with("http") {
            Some(TicketLinks {
                base_url: ticket_base_url.to_owned(),
                prefix: ticket_prefix.to_owned(),
            })
        } else {
            tracing::debug!(base_url = %ticket_base_url, "Ticket autolinking disabled");
            None
        };
        Self { tickets }
    }

    #[must_use]
    pub fn tickets_enabled(&self) -> bool {
        self.tickets.is_some()
    }

    /// Expand one text value written in the scope of `longname`.
    #[must_use]
    pub fn expand_text(&self, text: &str, longname: &str) -> String {
        let segments = expand_shorthand(text, longname);
        let segments = map_text(segments, |text| link_urls(&text));
        let segments = map_text(segments, |text| self.link_tickets(&text));

        segments
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) | Segment::Markup(text) => text,
            })
            .collect()
    }

    /// Expand every text-bearing field of a doclet in place, and qualify
    /// module-relative `augments` entries.
    pub fn expand_doclet(&self, doclet: &mut Doclet) {
        let longname = doclet.longname.clone();

        for parent in &mut doclet.augments {
            if let Some(qualified) = qualify_module_shorthand(parent, &longname) {
                *parent = qualified;
            }
        }

        for field in TextField::ALL {
            self.expand_slot(field, doclet_slot(doclet, field), &longname);
        }
    }

    fn expand_slot(&self, field: TextField, slot: FieldSlot<'_>, longname: &str) {
        match slot {
            FieldSlot::Text(value) => {
                if let Some(text) = value {
                    self.expand_field_text(field, text, longname);
                }
            }
            FieldSlot::TextList(values) => {
                for text in values {
                    self.expand_field_text(field, text, longname);
                }
            }
            FieldSlot::RecordList(records) => {
                for record in records {
                    for inner in TextField::ALL {
                        if let Some(slot) = record_slot(record, inner) {
                            self.expand_slot(inner, slot, longname);
                        }
                    }
                }
            }
        }
    }

    fn expand_field_text(&self, field: TextField, text: &mut String, longname: &str) {
        if field.requires_marker() && !text.contains("{@link") {
            return;
        }
        *text = self.expand_text(text, longname);
    }

    fn link_tickets(&self, text: &str) -> Vec<Segment> {
        let Some(tickets) = &self.tickets else {
            return vec![Segment::Text(text.to_owned())];
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in TICKET.captures_iter(text) {
            if &caps[1] != tickets.prefix {
                continue;
            }
            let Some(token) = caps.get(0) else {
                continue;
            };
            push_text(&mut segments, &text[last..token.start()]);
            segments.push(Segment::Markup(format!(
                "{{@link {}{} {}}}",
                tickets.base_url,
                token.as_str(),
                token.as_str()
            )));
            last = token.end();
        }
        push_text(&mut segments, &text[last..]);
        segments
    }
}

/// Split text into markup spans and plain text, qualifying member shorthand.
fn expand_shorthand(text: &str, longname: &str) -> Vec<Segment> {
    let base = longname
        .split(['#', '.'])
        .next()
        .unwrap_or(longname);

    let mut segments = Vec::new();
    let mut last = 0;
    for span in LINK_MARKUP.find_iter(text) {
        push_text(&mut segments, &text[last..span.start()]);
        let markup = match SHORTHAND.captures(span.as_str()) {
            Some(caps) => {
                let member = format!("{}{}", &caps[1], &caps[2]);
                format!("{{@link {base}{member} {member}}}")
            }
            None => span.as_str().to_owned(),
        };
        segments.push(Segment::Markup(markup));
        last = span.end();
    }
    push_text(&mut segments, &text[last..]);
    segments
}

/// Wrap bare URLs, leaving those that are already a markup target or an
/// attribute value alone.
fn link_urls(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for found in WEB_URL.find_iter(text) {
        let url = match found {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(error = %err, "URL scan aborted");
                break;
            }
        };
        push_text(&mut segments, &text[last..url.start()]);
        if follows_markup(&text[..url.start()]) {
            segments.push(Segment::Markup(url.as_str().to_owned()));
        } else {
            segments.push(Segment::Markup(format!("{{@link {}}}", url.as_str())));
        }
        last = url.end();
    }
    push_text(&mut segments, &text[last..]);
    segments
}

/// Whether text ending in `before` makes the next URL part of existing markup.
fn follows_markup(before: &str) -> bool {
    before.ends_with("{@link ")
        || before.ends_with('@')
        || before.ends_with("='")
        || before.ends_with("=\"")
}

/// Replace a leading `:` or `~` with the module root of `longname`.
fn qualify_module_shorthand(name: &str, longname: &str) -> Option<String> {
    let rest = name.strip_prefix([':', '~'])?;
    let module_root = longname.split('~').next().unwrap_or(longname);
    Some(format!("{module_root}~{rest}"))
}

fn map_text(segments: Vec<Segment>, mut f: impl FnMut(String) -> Vec<Segment>) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => out.extend(f(text)),
            markup @ Segment::Markup(_) => out.push(markup),
        }
    }
    out
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_owned()));
    }
}
