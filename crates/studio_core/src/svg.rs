//! SVG recoloring and inspection.
//!
//! # Responsibility
//! - Recolor icon markup as a pure string-in/string-out transform.
//! - Offer validation and structure diagnostics for icon callers.
//!
//! # Invariants
//! - `apply_color_to_svg` is idempotent for identical `(color, mode)`.
//! - Tags that are not rewritten are serialized byte-for-byte as parsed.
//! - Only `fill`/`stroke` attributes of colorable elements (and the root's
//!   `currentColor` fill) are touched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Element names whose paint attributes are recolored.
pub const COLORABLE_TAGS: [&str; 6] = ["path", "circle", "polygon", "ellipse", "line", "polyline"];
/// Fill value meaning "inherit from context"; stripped from the root after recoloring.
pub const INHERIT_COLOR: &str = "currentColor";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<[?!][^>]*>|</\s*[A-Za-z][\w:.-]*\s*>|<(?P<name>[A-Za-z][\w:.-]*)(?P<attrs>(?:\s+[^\s=/>]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*(?P<close>/?)>"#,
    )
    .expect("valid svg token regex")
});
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<name>[^\s=/>]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+)))?"#)
        .expect("valid svg attribute regex")
});
static CLOSE_SVG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</(?:[A-Za-z][\w.-]*:)?svg\s*>").expect("valid svg close regex")
});

/// Recolor policy for icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color outlines where an element is stroked, interiors otherwise.
    #[default]
    Main,
    /// Force interior fill on every colorable element.
    Fill,
}

impl ColorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Fill => "fill",
        }
    }
}

impl Display for ColorMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = SvgError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "fill" => Ok(Self::Fill),
            other => Err(SvgError::UnknownColorMode(other.to_string())),
        }
    }
}

/// SVG transform failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgError {
    /// Markup has no `<svg>` root element.
    MissingRoot,
    /// Color is blank or would break attribute quoting.
    InvalidColor(String),
    UnknownColorMode(String),
}

impl Display for SvgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRoot => write!(f, "markup has no <svg> root element"),
            Self::InvalidColor(value) => write!(f, "invalid color value: `{value}`"),
            Self::UnknownColorMode(value) => {
                write!(f, "unknown color mode `{value}`; expected main|fill")
            }
        }
    }
}

impl Error for SvgError {}

/// Paint attributes declared by one colorable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElementInfo {
    pub tag: String,
    pub fill: Option<String>,
    pub stroke: Option<String>,
}

impl SvgElementInfo {
    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    pub fn has_stroke(&self) -> bool {
        self.stroke.is_some()
    }
}

/// Recolors every colorable element of `svg` according to `mode`.
///
/// - `Fill`: sets `fill` unconditionally.
/// - `Main`: sets `stroke` when the element has a non-`none` stroke,
///   otherwise sets `fill`.
///
/// Afterwards a root `fill="currentColor"` is removed.
pub fn apply_color_to_svg(svg: &str, color: &str, mode: ColorMode) -> Result<String, SvgError> {
    let color = validate_color(color)?;
    let mut nodes = tokenize(svg);
    let root = root_index(&nodes)?;

    for node in nodes.iter_mut() {
        let Node::Start(tag) = node else {
            continue;
        };
        if !is_colorable(&tag.name) {
            continue;
        }
        let target = match mode {
            ColorMode::Fill => "fill",
            ColorMode::Main if has_visible_stroke(tag) => "stroke",
            ColorMode::Main => "fill",
        };
        tag.set_attr(target, color);
    }

    if let Node::Start(root_tag) = &mut nodes[root] {
        if root_tag.attr("fill").map(str::trim) == Some(INHERIT_COLOR) {
            root_tag.remove_attr("fill");
        }
    }

    Ok(serialize(&nodes))
}

/// Returns whether `svg` opens with an `<svg>` root element and closes it.
///
/// Element names are case-sensitive, so this accepts exactly the markup
/// `apply_color_to_svg` can recolor.
pub fn is_well_formed_svg(svg: &str) -> bool {
    root_index(&tokenize(svg)).is_ok() && CLOSE_SVG_RE.is_match(svg)
}

/// Lists colorable elements in document order with their paint attributes.
pub fn analyze_svg_structure(svg: &str) -> Vec<SvgElementInfo> {
    tokenize(svg)
        .iter()
        .filter_map(|node| match node {
            Node::Start(tag) if is_colorable(&tag.name) => Some(SvgElementInfo {
                tag: tag.name.clone(),
                fill: tag.attr("fill").map(str::to_string),
                stroke: tag.attr("stroke").map(str::to_string),
            }),
            _ => None,
        })
        .collect()
}

fn validate_color(color: &str) -> Result<&str, SvgError> {
    let trimmed = color.trim();
    if trimmed.is_empty() || trimmed.contains(['"', '\'', '<', '>']) {
        return Err(SvgError::InvalidColor(color.to_string()));
    }
    Ok(trimmed)
}

fn is_colorable(name: &str) -> bool {
    COLORABLE_TAGS.contains(&name)
}

fn has_visible_stroke(tag: &StartTag<'_>) -> bool {
    tag.attr("stroke")
        .map(str::trim)
        .is_some_and(|value| !value.is_empty() && value != "none")
}

fn root_index(nodes: &[Node<'_>]) -> Result<usize, SvgError> {
    nodes
        .iter()
        .position(|node| matches!(node, Node::Start(_)))
        .filter(|&index| match &nodes[index] {
            Node::Start(tag) => local_name(&tag.name) == "svg",
            Node::Raw(_) => false,
        })
        .ok_or(SvgError::MissingRoot)
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

#[derive(Debug)]
enum Node<'a> {
    /// Text, comments, end tags, and declarations, kept verbatim.
    Raw(&'a str),
    Start(StartTag<'a>),
}

#[derive(Debug)]
struct StartTag<'a> {
    raw: &'a str,
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
    dirty: bool,
}

#[derive(Debug)]
struct Attribute {
    name: String,
    value: Option<String>,
}

impl StartTag<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = Some(value.to_string()),
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
        }
        self.dirty = true;
    }

    fn remove_attr(&mut self, name: &str) {
        let before = self.attrs.len();
        self.attrs.retain(|attr| attr.name != name);
        self.dirty |= self.attrs.len() != before;
    }

    fn write_to(&self, out: &mut String) {
        if !self.dirty {
            out.push_str(self.raw);
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                let quote = if value.contains('"') { '\'' } else { '"' };
                out.push('=');
                out.push(quote);
                out.push_str(value);
                out.push(quote);
            }
        }
        if self.self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }
}

fn tokenize(svg: &str) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for caps in TOKEN_RE.captures_iter(svg) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            nodes.push(Node::Raw(&svg[cursor..whole.start()]));
        }
        cursor = whole.end();

        let Some(name) = caps.name("name") else {
            nodes.push(Node::Raw(whole.as_str()));
            continue;
        };
        let attrs = caps.name("attrs").map_or_else(Vec::new, |m| parse_attrs(m.as_str()));
        nodes.push(Node::Start(StartTag {
            raw: whole.as_str(),
            name: name.as_str().to_string(),
            attrs,
            self_closing: caps.name("close").is_some_and(|m| !m.as_str().is_empty()),
            dirty: false,
        }));
    }

    if cursor < svg.len() {
        nodes.push(Node::Raw(&svg[cursor..]));
    }
    nodes
}

fn parse_attrs(source: &str) -> Vec<Attribute> {
    ATTR_RE
        .captures_iter(source)
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str().to_string();
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().to_string());
            Some(Attribute { name, value })
        })
        .collect()
}

fn serialize(nodes: &[Node<'_>]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Raw(text) => out.push_str(text),
            Node::Start(tag) => tag.write_to(&mut out),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{analyze_svg_structure, apply_color_to_svg, is_well_formed_svg, ColorMode, SvgError};

    const STROKED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor"><path d="M0 0h24" stroke="red" stroke-width="2"/></svg>"#;
    const FILLED: &str = r#"<svg viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></svg>"#;

    #[test]
    fn main_mode_prefers_existing_stroke() {
        let out = apply_color_to_svg(STROKED, "#0088ff", ColorMode::Main).unwrap();
        assert!(out.contains(r##"stroke="#0088ff""##));
        assert!(out.contains(r#"stroke-width="2""#));
        assert!(!out.contains(r##"fill="#0088ff""##));
    }

    #[test]
    fn main_mode_fills_unstroked_elements() {
        let out = apply_color_to_svg(FILLED, "#0088ff", ColorMode::Main).unwrap();
        assert_eq!(
            out,
            r##"<svg viewBox="0 0 24 24"><circle cx="12" cy="12" r="10" fill="#0088ff" /></svg>"##
        );
    }

    #[test]
    fn stroke_none_counts_as_unstroked() {
        let svg = r#"<svg><polygon points="0,0 1,1" stroke="none"/></svg>"#;
        let out = apply_color_to_svg(svg, "blue", ColorMode::Main).unwrap();
        assert!(out.contains(r#"stroke="none""#));
        assert!(out.contains(r#"fill="blue""#));
    }

    #[test]
    fn fill_mode_sets_fill_on_every_colorable_element() {
        let svg = r#"<svg><path d="M1" stroke="red"/><line x1="0" fill="none"/><g><ellipse rx="1"/></g></svg>"#;
        let out = apply_color_to_svg(svg, "green", ColorMode::Fill).unwrap();
        let info = analyze_svg_structure(&out);
        assert_eq!(info.len(), 3);
        assert!(info.iter().all(|el| el.fill.as_deref() == Some("green")));
        assert_eq!(info[0].stroke.as_deref(), Some("red"));
    }

    #[test]
    fn recolor_is_idempotent() {
        for mode in [ColorMode::Main, ColorMode::Fill] {
            let once = apply_color_to_svg(STROKED, "#123456", mode).unwrap();
            let twice = apply_color_to_svg(&once, "#123456", mode).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn root_inherit_fill_is_stripped() {
        let out = apply_color_to_svg(STROKED, "#123456", ColorMode::Main).unwrap();
        assert!(!out.contains("currentColor"));
        assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">"#));
    }

    #[test]
    fn untouched_markup_is_preserved_verbatim() {
        let svg = "<?xml version=\"1.0\"?>\n<!-- icon -->\n<svg width='24'>\n  <g id='x'><rect  width='3'/></g>\n</svg>";
        assert_eq!(apply_color_to_svg(svg, "red", ColorMode::Fill).unwrap(), svg);
    }

    #[test]
    fn non_svg_root_and_bad_colors_are_rejected() {
        assert_eq!(
            apply_color_to_svg("<div><path/></div>", "red", ColorMode::Fill),
            Err(SvgError::MissingRoot)
        );
        assert!(matches!(
            apply_color_to_svg(FILLED, "red\" onload=\"x", ColorMode::Fill),
            Err(SvgError::InvalidColor(_))
        ));
    }

    #[test]
    fn well_formedness_requires_open_and_close_tags() {
        assert!(is_well_formed_svg(FILLED));
        assert!(!is_well_formed_svg("<svg viewBox=\"0 0 1 1\">"));
        assert!(!is_well_formed_svg("</svg>"));
    }

    #[test]
    fn accepted_markup_is_always_recolorable() {
        let upper = r#"<SVG viewBox="0 0 1 1"><path d="M0 0"/></SVG>"#;
        assert!(!is_well_formed_svg(upper));
        assert_eq!(
            apply_color_to_svg(upper, "red", ColorMode::Fill),
            Err(SvgError::MissingRoot)
        );
        assert!(!is_well_formed_svg("<div><svg></svg></div>"));

        let prolog = r#"<?xml version="1.0"?><svg><path d="M0 0"/></svg>"#;
        assert!(is_well_formed_svg(prolog));
        assert!(apply_color_to_svg(prolog, "red", ColorMode::Fill).is_ok());
    }

    #[test]
    fn color_mode_parses_case_insensitively() {
        assert_eq!("FILL".parse::<ColorMode>().unwrap(), ColorMode::Fill);
        assert!("outline".parse::<ColorMode>().is_err());
    }
}
