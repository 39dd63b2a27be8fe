//! Placeholder substitution for the share page template.
//!
//! The template is plain HTML with two kinds of markers:
//!
//! - `{{name}}` placeholders, replaced with request-specific values
//! - `{{#flag}}…{{/flag}}` blocks, kept only when `flag` is set, and the
//!   negated `{{^flag}}…{{/flag}}`, kept only when it is not
//!
//! Blocks are resolved first, then placeholders in a single left-to-right
//! pass. Replacement text is never re-scanned, so stored content cannot
//! smuggle in further placeholders. Text values are HTML-escaped by maud;
//! markup values are inserted as-is and must be built with maud.

pub mod components;
pub mod template;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use maud::html;
use regex::{Captures, Regex};

pub use template::Template;

/// Whether a placeholder is filled once or everywhere it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Appears once; only the first occurrence is replaced.
    Single,
    /// May repeat across several tags; every occurrence is replaced.
    Global,
}

/// The fixed placeholder vocabulary of the share page template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    PageTitle,
    OgTitle,
    OgDescription,
    OgImageUrl,
    CanonicalUrl,
    DeepLinkUrl,
    AppStoreUrl,
    SiteName,
    ContentTitle,
    ContentDescription,
    ContentEmoji,
    ContentMedia,
    ActionTag,
    ButtonText,
}

impl Placeholder {
    pub const ALL: [Self; 14] = [
        Self::PageTitle,
        Self::OgTitle,
        Self::OgDescription,
        Self::OgImageUrl,
        Self::CanonicalUrl,
        Self::DeepLinkUrl,
        Self::AppStoreUrl,
        Self::SiteName,
        Self::ContentTitle,
        Self::ContentDescription,
        Self::ContentEmoji,
        Self::ContentMedia,
        Self::ActionTag,
        Self::ButtonText,
    ];

    /// Name as written between the braces.
    pub fn name(self) -> &'static str {
        match self {
            Self::PageTitle => "pageTitle",
            Self::OgTitle => "ogTitle",
            Self::OgDescription => "ogDescription",
            Self::OgImageUrl => "ogImageUrl",
            Self::CanonicalUrl => "canonicalUrl",
            Self::DeepLinkUrl => "deepLinkUrl",
            Self::AppStoreUrl => "appStoreUrl",
            Self::SiteName => "siteName",
            Self::ContentTitle => "contentTitle",
            Self::ContentDescription => "contentDescription",
            Self::ContentEmoji => "contentEmoji",
            Self::ContentMedia => "contentMedia",
            Self::ActionTag => "actionTag",
            Self::ButtonText => "buttonText",
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            Self::OgTitle
            | Self::OgDescription
            | Self::OgImageUrl
            | Self::CanonicalUrl
            | Self::DeepLinkUrl
            | Self::AppStoreUrl
            | Self::SiteName => Slot::Global,
            Self::PageTitle
            | Self::ContentTitle
            | Self::ContentDescription
            | Self::ContentEmoji
            | Self::ContentMedia
            | Self::ActionTag
            | Self::ButtonText => Slot::Single,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The full token, e.g. `{{ogTitle}}`.
    pub fn token(self) -> String {
        format!("{{{{{}}}}}", self.name())
    }
}

/// A replacement value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text, HTML-escaped on insertion.
    Text(String),
    /// Pre-built markup, inserted verbatim.
    Markup(String),
}

impl Value {
    fn rendered(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Owned(escape_text(text)),
            Self::Markup(markup) => Cow::Borrowed(markup),
        }
    }
}

/// Placeholder → value mapping for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    values: BTreeMap<Placeholder, Value>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: Value) {
        self.values.insert(placeholder, value);
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&Value> {
        self.values.get(&placeholder)
    }

    /// The raw text of a text value, before escaping.
    pub fn text(&self, placeholder: Placeholder) -> Option<&str> {
        match self.values.get(&placeholder)? {
            Value::Text(text) => Some(text),
            Value::Markup(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Placeholder, Value)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (Placeholder, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Named boolean switches for conditional blocks. Unset flags are false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    flags: BTreeMap<String, bool>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: bool) -> &mut Self {
        self.flags.insert(name.to_string(), value);
        self
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}

impl<'a> FromIterator<(&'a str, bool)> for Flags {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        Self {
            flags: iter
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z][A-Za-z0-9_]*)\}\}").expect("valid regex"));

static BLOCK_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([#^])([A-Za-z][A-Za-z0-9_]*)\}\}").expect("valid regex"));

/// Render a template with the given values and flags.
///
/// Never fails. Tokens outside the vocabulary, and known tokens without a
/// value, are left in place; values whose token does not appear are unused.
pub fn render(template: &str, values: &PlaceholderMap, flags: &Flags) -> String {
    let expanded = resolve_blocks(template, flags);
    substitute(&expanded, values)
}

/// Keep or drop every conditional block according to `flags`.
///
/// Blocks with different flags may nest. An opening marker without a
/// matching close is left verbatim.
fn resolve_blocks(template: &str, flags: &Flags) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(caps) = BLOCK_OPEN_RE.captures(rest) {
        let (Some(open), Some(sigil), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        out.push_str(&rest[..open.start()]);

        let after_open = &rest[open.end()..];
        let close = format!("{{{{/{}}}}}", name.as_str());

        match after_open.find(&close) {
            Some(close_at) => {
                let negated = sigil.as_str() == "^";
                if flags.is_set(name.as_str()) != negated {
                    out.push_str(&resolve_blocks(&after_open[..close_at], flags));
                }
                rest = &after_open[close_at + close.len()..];
            }
            None => {
                out.push_str(open.as_str());
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Replace placeholders in one pass over `template`.
fn substitute(template: &str, values: &PlaceholderMap) -> String {
    let mut filled: BTreeSet<Placeholder> = BTreeSet::new();

    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[0];
            let Some(placeholder) = Placeholder::from_name(&caps[1]) else {
                return token.to_string();
            };
            let Some(value) = values.get(placeholder) else {
                return token.to_string();
            };
            if placeholder.slot() == Slot::Single && !filled.insert(placeholder) {
                return token.to_string();
            }
            value.rendered().into_owned()
        })
        .into_owned()
}

/// HTML-escape text for use in element content or a quoted attribute.
pub fn escape_text(text: &str) -> String {
    html! { (text) }.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn values(pairs: &[(Placeholder, &str)]) -> PlaceholderMap {
        pairs.iter().map(|(p, v)| (*p, text(v))).collect()
    }

    // -- vocabulary --

    #[test]
    fn names_round_trip() {
        for placeholder in Placeholder::ALL {
            assert_eq!(Placeholder::from_name(placeholder.name()), Some(placeholder));
        }
        assert_eq!(Placeholder::from_name("nope"), None);
    }

    #[test]
    fn token_wraps_name_in_braces() {
        assert_eq!(Placeholder::OgTitle.token(), "{{ogTitle}}");
    }

    #[test]
    fn title_fields_repeat_globally() {
        assert_eq!(Placeholder::OgTitle.slot(), Slot::Global);
        assert_eq!(Placeholder::CanonicalUrl.slot(), Slot::Global);
        assert_eq!(Placeholder::PageTitle.slot(), Slot::Single);
    }

    // -- substitution --

    #[test]
    fn global_placeholder_replaced_everywhere() {
        let out = render(
            "<title>{{ogTitle}}</title><meta content=\"{{ogTitle}}\">{{ogTitle}}",
            &values(&[(Placeholder::OgTitle, "Soup")]),
            &Flags::new(),
        );
        assert_eq!(out, "<title>Soup</title><meta content=\"Soup\">Soup");
    }

    #[test]
    fn single_placeholder_replaced_once() {
        let out = render(
            "{{pageTitle}}|{{pageTitle}}",
            &values(&[(Placeholder::PageTitle, "Soup")]),
            &Flags::new(),
        );
        assert_eq!(out, "Soup|{{pageTitle}}");
    }

    #[test]
    fn unknown_and_unset_tokens_left_alone() {
        let out = render(
            "{{mystery}} {{ogTitle}} {{ buttonText }}",
            &PlaceholderMap::new(),
            &Flags::new(),
        );
        assert_eq!(out, "{{mystery}} {{ogTitle}} {{ buttonText }}");
    }

    #[test]
    fn unused_values_are_ignored() {
        let out = render(
            "static",
            &values(&[(Placeholder::OgTitle, "Soup")]),
            &Flags::new(),
        );
        assert_eq!(out, "static");
    }

    #[test]
    fn text_values_are_escaped() {
        let out = render(
            "<h1>{{contentTitle}}</h1>",
            &values(&[(Placeholder::ContentTitle, "<script>alert(\"x\")</script> & co")]),
            &Flags::new(),
        );
        assert_eq!(
            out,
            "<h1>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; co</h1>"
        );
    }

    #[test]
    fn apostrophes_and_symbols_pass_through() {
        let out = render(
            "{{ogTitle}}",
            &values(&[(Placeholder::OgTitle, "Sarah's Kitchen • 🏠")]),
            &Flags::new(),
        );
        assert_eq!(out, "Sarah's Kitchen • 🏠");
    }

    #[test]
    fn markup_values_are_verbatim() {
        let map: PlaceholderMap = [(
            Placeholder::ContentMedia,
            Value::Markup("<div class=\"recipe-emoji\">📚</div>".to_string()),
        )]
        .into_iter()
        .collect();
        let out = render("{{contentMedia}}", &map, &Flags::new());
        assert_eq!(out, "<div class=\"recipe-emoji\">📚</div>");
    }

    #[test]
    fn replacement_text_is_not_rescanned() {
        let out = render(
            "{{ogTitle}} {{ogDescription}}",
            &values(&[
                (Placeholder::OgTitle, "{{ogDescription}}"),
                (Placeholder::OgDescription, "desc"),
            ]),
            &Flags::new(),
        );
        assert_eq!(out, "{{ogDescription}} desc");
    }

    #[test]
    fn render_is_deterministic() {
        let template = "{{#a}}A{{/a}}{{^a}}B{{/a}} {{ogTitle}} {{pageTitle}}";
        let map = values(&[
            (Placeholder::OgTitle, "t"),
            (Placeholder::PageTitle, "p"),
        ]);
        let flags: Flags = [("a", true)].into_iter().collect();
        assert_eq!(render(template, &map, &flags), render(template, &map, &flags));
    }

    // -- conditional blocks --

    #[test]
    fn block_kept_when_flag_true() {
        let flags: Flags = [("fallback", true)].into_iter().collect();
        assert_eq!(
            render("a{{#fallback}}b{{/fallback}}c", &PlaceholderMap::new(), &flags),
            "abc"
        );
    }

    #[test]
    fn block_removed_when_flag_false_or_unset() {
        let flags: Flags = [("fallback", false)].into_iter().collect();
        assert_eq!(
            render("a{{#fallback}}b{{/fallback}}c", &PlaceholderMap::new(), &flags),
            "ac"
        );
        assert_eq!(
            render("a{{#other}}b{{/other}}c", &PlaceholderMap::new(), &Flags::new()),
            "ac"
        );
    }

    #[test]
    fn negated_block_is_the_inverse() {
        let on: Flags = [("hasImage", true)].into_iter().collect();
        let template = "{{^hasImage}}no image{{/hasImage}}";
        assert_eq!(render(template, &PlaceholderMap::new(), &on), "");
        assert_eq!(
            render(template, &PlaceholderMap::new(), &Flags::new()),
            "no image"
        );
    }

    #[test]
    fn nested_blocks_with_different_flags() {
        let flags: Flags = [("outer", true), ("inner", false)].into_iter().collect();
        let out = render(
            "[{{#outer}}o{{#inner}}i{{/inner}}{{^inner}}!i{{/inner}}{{/outer}}]",
            &PlaceholderMap::new(),
            &flags,
        );
        assert_eq!(out, "[o!i]");
    }

    #[test]
    fn placeholders_inside_removed_blocks_disappear() {
        let out = render(
            "{{#fallback}}{{ogTitle}}{{/fallback}}{{ogTitle}}",
            &values(&[(Placeholder::OgTitle, "T")]),
            &Flags::new(),
        );
        assert_eq!(out, "T");
    }

    #[test]
    fn unclosed_block_left_verbatim() {
        let out = render(
            "a{{#fallback}}b {{ogTitle}}",
            &values(&[(Placeholder::OgTitle, "T")]),
            &Flags::new(),
        );
        assert_eq!(out, "a{{#fallback}}b T");
    }

    #[test]
    fn multiple_blocks_same_flag() {
        let flags: Flags = [("x", true)].into_iter().collect();
        let out = render(
            "{{#x}}1{{/x}}-{{^x}}2{{/x}}-{{#x}}3{{/x}}",
            &PlaceholderMap::new(),
            &flags,
        );
        assert_eq!(out, "1--3");
    }

    // -- maps and flags --

    #[test]
    fn placeholder_map_text_accessor() {
        let mut map = PlaceholderMap::new();
        map.insert(Placeholder::OgTitle, text("Soup"));
        map.insert(Placeholder::ContentMedia, Value::Markup("<i></i>".to_string()));
        assert_eq!(map.text(Placeholder::OgTitle), Some("Soup"));
        assert_eq!(map.text(Placeholder::ContentMedia), None);
        assert_eq!(map.text(Placeholder::PageTitle), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn flags_default_false() {
        let mut flags = Flags::new();
        assert!(!flags.is_set("fallback"));
        flags.set("fallback", true);
        assert!(flags.is_set("fallback"));
    }
}
