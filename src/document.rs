//! Document assembly.
//!
//! The document is first described as a small tree ([`Document`]) and only
//! turned into text by its `Display` impl, so every interpolation point and its
//! escaping rule is visible in one place:
//!
//! - stylesheet bodies and the engine source are inserted verbatim,
//! - class names and link targets are attribute-escaped,
//! - content is already script-escaped by [`crate::content::serialize_content`].

use crate::content::SerializedContent;
use crate::engine::ConverterEngine;
use crate::options::{OptionInstruction, CONVERTER_VAR};
use crate::stylesheets::{StylesheetCache, Stylesheets};
use std::fmt;

/// Id of the region receiving converter errors.
pub const ERROR_REGION_ID: &str = "mdpanel-error";
/// Id of the region receiving the converted markup.
pub const CONTENT_REGION_ID: &str = "mdpanel-content";
/// Text shown in the content region until the script has run.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

// ---------------------------------------------------------------------------
// Intermediate representation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum HeadElement {
    /// Inlined stylesheet bodies, concatenated in list order.
    Style(String),
    /// Stylesheet that could not be inlined.
    Link(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConverterScript {
    pub engine: ConverterEngine,
    pub options: Vec<OptionInstruction>,
    pub content: SerializedContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub head: Vec<HeadElement>,
    pub classes: Vec<String>,
    pub script: ConverterScript,
}

/// Inputs of one document build.
pub struct DocumentBuilder<'a> {
    pub content: &'a SerializedContent,
    pub options: &'a [OptionInstruction],
    pub stylesheets: &'a Stylesheets,
    pub cache: &'a StylesheetCache,
    pub classes: &'a [String],
    pub engine: &'a ConverterEngine,
}

impl DocumentBuilder<'_> {
    pub fn document(&self) -> Document {
        let inlined: String = self
            .stylesheets
            .iter()
            .filter_map(|reference| self.cache.get(reference))
            .collect();

        let mut head = vec![HeadElement::Style(inlined)];
        head.extend(
            self.stylesheets
                .iter()
                .filter(|reference| !self.cache.contains(reference))
                .map(|reference| HeadElement::Link(reference.to_string())),
        );

        Document {
            head,
            classes: self.classes.to_vec(),
            script: ConverterScript {
                engine: self.engine.clone(),
                options: self.options.to_vec(),
                content: self.content.clone(),
            },
        }
    }

    /// Assemble the document text.
    pub fn build(&self) -> String {
        self.document().to_string()
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl fmt::Display for HeadElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadElement::Style(css) => writeln!(f, "<style>{css}</style>"),
            HeadElement::Link(href) => writeln!(
                f,
                r#"<link rel="stylesheet" type="text/css" href="{}">"#,
                escape_attr(href)
            ),
        }
    }
}

impl fmt::Display for ConverterScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<script>{}</script>", self.engine.source())?;
        writeln!(f, "<script>")?;
        writeln!(f, "try {{")?;
        writeln!(f, "  var {CONVERTER_VAR} = new showdown.Converter();")?;
        for option in &self.options {
            writeln!(f, "  {option}")?;
        }
        writeln!(
            f,
            "  var target = document.getElementById(\"{CONTENT_REGION_ID}\");"
        )?;
        writeln!(
            f,
            "  target.innerHTML = {CONVERTER_VAR}.makeHtml(\"{}\");",
            self.content
        )?;
        writeln!(f, "  var anchors = target.getElementsByTagName(\"a\");")?;
        writeln!(f, "  for (var i = 0; i < anchors.length; i++) {{")?;
        writeln!(f, "    if (anchors[i].href.indexOf(\"http\") === 0) {{")?;
        writeln!(f, "      anchors[i].target = \"_blank\";")?;
        writeln!(f, "    }}")?;
        writeln!(f, "  }}")?;
        writeln!(f, "}} catch (e) {{")?;
        writeln!(
            f,
            "  document.getElementById(\"{ERROR_REGION_ID}\").textContent = e.message;"
        )?;
        writeln!(f, "}}")?;
        writeln!(f, "</script>")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, r#"<meta http-equiv="X-UA-Compatible" content="IE=edge">"#)?;
        writeln!(f, r#"<meta charset="UTF-8">"#)?;
        for element in &self.head {
            write!(f, "{element}")?;
        }
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, r#"<div class="{}">"#, escape_attr(&self.classes.join(" ")))?;
        writeln!(f, r#"<div id="{ERROR_REGION_ID}"></div>"#)?;
        writeln!(f, r#"<div id="{CONTENT_REGION_ID}">{LOADING_PLACEHOLDER}</div>"#)?;
        writeln!(f, "</div>")?;
        write!(f, "{}", self.script)?;
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
