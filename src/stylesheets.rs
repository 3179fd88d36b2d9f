//! Stylesheet references and the per-panel body cache.
//!
//! Remote-looking references (`http`, `https`, `file`) are fetched once and
//! their bodies inlined into the document from then on. Everything else, and
//! anything whose fetch failed, is emitted as a `<link>` element instead.

use crate::diagnostics::Diagnostics;
use crate::fetch::ResourceFetcher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DIAG_SOURCE: &str = "stylesheets";

/// An ordered list of stylesheet references. A single string is accepted
/// wherever a list is and becomes a one-element list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StylesheetsRepr", into = "Vec<String>")]
pub struct Stylesheets(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum StylesheetsRepr {
    One(String),
    Many(Vec<String>),
}

impl From<StylesheetsRepr> for Stylesheets {
    fn from(repr: StylesheetsRepr) -> Self {
        match repr {
            StylesheetsRepr::One(reference) => Stylesheets(vec![reference]),
            StylesheetsRepr::Many(references) => Stylesheets(references),
        }
    }
}

impl From<Stylesheets> for Vec<String> {
    fn from(stylesheets: Stylesheets) -> Self {
        stylesheets.0
    }
}

impl From<&str> for Stylesheets {
    fn from(reference: &str) -> Self {
        Stylesheets(vec![reference.to_string()])
    }
}

impl From<String> for Stylesheets {
    fn from(reference: String) -> Self {
        Stylesheets(vec![reference])
    }
}

impl From<Vec<String>> for Stylesheets {
    fn from(references: Vec<String>) -> Self {
        Stylesheets(references)
    }
}

impl From<Vec<&str>> for Stylesheets {
    fn from(references: Vec<&str>) -> Self {
        Stylesheets(references.into_iter().map(str::to_string).collect())
    }
}

impl Stylesheets {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// True when the reference names something the fetcher can retrieve.
pub fn is_remote_reference(reference: &str) -> bool {
    match url::Url::parse(reference) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "file"),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Reference string → fetched body. Grows only; entries are never refreshed.
#[derive(Debug, Default)]
pub struct StylesheetCache {
    bodies: HashMap<String, String>,
}

impl StylesheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every remote reference that is not cached yet. Failures are
    /// recorded as warnings and leave the reference uncached.
    pub fn resolve(
        &mut self,
        stylesheets: &Stylesheets,
        fetcher: &dyn ResourceFetcher,
        diagnostics: &mut Diagnostics,
    ) {
        for reference in stylesheets.iter() {
            if self.bodies.contains_key(reference) || !is_remote_reference(reference) {
                continue;
            }
            match fetcher.fetch_text(reference) {
                Ok(body) => {
                    tracing::debug!(reference, bytes = body.len(), "cached stylesheet");
                    self.bodies.insert(reference.to_string(), body);
                }
                Err(e) => {
                    diagnostics.warn(
                        DIAG_SOURCE,
                        format!("Could not load stylesheet {reference}: {e}"),
                    );
                }
            }
        }
    }

    pub fn get(&self, reference: &str) -> Option<&str> {
        self.bodies.get(reference).map(String::as_str)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.bodies.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::testing::CannedFetcher;
    use super::*;
    use crate::fetch::HttpFetcher;

    #[test]
    fn remote_detection() {
        assert!(is_remote_reference("https://cdn.example.com/a.css"));
        assert!(is_remote_reference("http://example.com/a.css"));
        assert!(is_remote_reference("file:///tmp/a.css"));
        assert!(!is_remote_reference("styles/local.css"));
        assert!(!is_remote_reference("ftp://example.com/a.css"));
        assert!(!is_remote_reference(""));
    }

    #[test]
    fn single_string_normalizes_to_list() {
        let one: Stylesheets = serde_json::from_str(r#""a.css""#).unwrap();
        assert_eq!(one, Stylesheets::from(vec!["a.css"]));
        assert_eq!(Stylesheets::from("a.css").len(), 1);
    }

    #[test]
    fn local_references_are_never_fetched() {
        let fetcher = CannedFetcher::default();
        let mut cache = StylesheetCache::new();
        let mut diag = Diagnostics::default();

        cache.resolve(&Stylesheets::from("theme/local.css"), &fetcher, &mut diag);
        assert!(fetcher.requests.lock().is_empty());
        assert!(cache.is_empty());
        assert!(diag.is_empty());
    }

    #[test]
    fn cached_reference_is_fetched_once() {
        let url = "https://cdn.example.com/a.css";
        let fetcher = CannedFetcher::default().with(url, "a{}");
        let mut cache = StylesheetCache::new();
        let mut diag = Diagnostics::default();

        cache.resolve(&Stylesheets::from(url), &fetcher, &mut diag);
        cache.resolve(&Stylesheets::from(vec![url, "local.css"]), &fetcher, &mut diag);

        assert_eq!(fetcher.request_count(url), 1);
        assert_eq!(cache.get(url), Some("a{}"));
    }

    #[test]
    fn failed_fetch_is_recorded_and_not_cached() {
        let url = "https://cdn.example.com/missing.css";
        let fetcher = CannedFetcher::default();
        let mut cache = StylesheetCache::new();
        let mut diag = Diagnostics::default();

        cache.resolve(&Stylesheets::from(url), &fetcher, &mut diag);
        assert!(!cache.contains(url));
        assert_eq!(diag.len(), 1);
        assert!(diag.entries(0)[0].message.contains(url));

        // Failures are retried on the next assignment
        cache.resolve(&Stylesheets::from(url), &fetcher, &mut diag);
        assert_eq!(fetcher.request_count(url), 2);
    }

    #[test]
    fn http_stylesheet_hits_network_once() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/site.css")
            .with_status(200)
            .with_body("h1 { font-size: 2em; }")
            .expect(1)
            .create();

        let url = format!("{}/site.css", server.url());
        let fetcher = HttpFetcher::new().unwrap();
        let mut cache = StylesheetCache::new();
        let mut diag = Diagnostics::default();

        cache.resolve(&Stylesheets::from(url.as_str()), &fetcher, &mut diag);
        cache.resolve(&Stylesheets::from(url.as_str()), &fetcher, &mut diag);

        mock.assert();
        assert_eq!(cache.get(&url), Some("h1 { font-size: 2em; }"));
    }
}
