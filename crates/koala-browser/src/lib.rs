//! High-level document API for the Koala engine.
//!
//! # Scope
//!
//! This crate provides:
//! - **Document Loading** - read an HTML file or string and parse it
//! - **Stylesheet Collection** - `<style>` elements, local `<link rel="stylesheet">`
//!   files and caller-supplied CSS, in cascade order
//! - **Style Computation** - the cascade over the whole DOM
//! - **Layout Tree** - positioned boxes for a configurable viewport
//!
//! # Not Yet Implemented
//!
//! - Network loading (`http://` and `https://` documents or stylesheets)
//! - Images, fonts and painting

pub use koala_css as css;
pub use koala_dom as dom;
pub use koala_html as html;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use koala_common::warning::{clear_warnings, warn_once};
use koala_css::layout::{LayoutBox, LayoutConfig, build_layout_tree};
use koala_css::{
    ComputedStyle, StyleMap, Stylesheet, StylesheetSource, apply_styles_to_tree,
    parse_stylesheet, query_selector, query_selector_all, stylesheet_sources,
};
use koala_dom::{DomTree, NodeId};
use koala_html::{HTMLParser, HTMLTokenizer};

/// A fully loaded and parsed document.
///
/// Contains everything the pipeline produced: DOM, stylesheets, computed
/// styles, the layout tree, and debugging information.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Original HTML source.
    pub html_source: String,

    /// File the document was read from, if any.
    pub source_path: Option<PathBuf>,

    /// Parsed DOM tree.
    pub dom: DomTree,

    /// Author stylesheets in cascade order: document sheets, then extra CSS.
    pub stylesheets: Vec<Stylesheet>,

    /// Computed style per element.
    pub styles: StyleMap,

    /// Layout tree rooted at the initial containing block.
    pub layout_tree: LayoutBox,

    /// Recovered parse problems and stylesheets that could not be loaded.
    pub parse_issues: Vec<String>,
}

impl LoadedDocument {
    /// Computed style of an element.
    #[must_use]
    pub fn style_of(&self, id: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(&id)
    }

    /// First element in the document matching a selector list.
    #[must_use]
    pub fn query_selector(&self, selectors: &str) -> Option<NodeId> {
        query_selector(&self.dom, self.dom.root(), selectors)
    }

    /// Every element in the document matching a selector list.
    #[must_use]
    pub fn query_selector_all(&self, selectors: &str) -> Vec<NodeId> {
        query_selector_all(&self.dom, self.dom.root(), selectors)
    }

    /// `href` of the link under the point, if any.
    #[must_use]
    pub fn link_at(&self, x: f32, y: f32) -> Option<&str> {
        self.layout_tree
            .find_link(&self.dom, x, y)
            .map(|(_, href)| href)
    }
}

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Failed to read a file.
    #[error("failed to read '{}': {source}", path.display())]
    FileError {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A stylesheet link points at a scheme this crate does not fetch.
    #[error("cannot fetch stylesheet '{href}': only local files are supported")]
    UnsupportedScheme {
        /// The link's `href`.
        href: String,
    },

    /// A relative stylesheet link in a document that has no location.
    #[error("cannot resolve stylesheet '{href}' without a document location")]
    NoBaseDirectory {
        /// The link's `href`.
        href: String,
    },
}

/// Load a document from a file path.
///
/// Handles:
/// - File reading
/// - HTML tokenization and tree building
/// - `<style>` and local `<link rel="stylesheet">` sheets, resolved
///   relative to the document's directory
/// - `extra_css`, appended after the document's own sheets
/// - Style computation and layout
///
/// # Errors
///
/// Returns [`LoadError::FileError`] if the document cannot be read. A
/// linked stylesheet that fails to load is recorded in
/// [`LoadedDocument::parse_issues`] and treated as empty.
pub fn load_document(
    path: &Path,
    extra_css: &[String],
    config: &LayoutConfig,
) -> Result<LoadedDocument, LoadError> {
    let html_source = fs::read_to_string(path).map_err(|source| LoadError::FileError {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut doc = build_document(&html_source, Some(base_dir), extra_css, config);
    doc.source_path = Some(path.to_path_buf());
    Ok(doc)
}

/// Parse an HTML string into a [`LoadedDocument`].
///
/// Linked stylesheets cannot be resolved without a location; they are
/// reported in [`LoadedDocument::parse_issues`].
#[must_use]
pub fn parse_document(html: &str, extra_css: &[String], config: &LayoutConfig) -> LoadedDocument {
    build_document(html, None, extra_css, config)
}

fn build_document(
    html: &str,
    base_dir: Option<&Path>,
    extra_css: &[String],
    config: &LayoutConfig,
) -> LoadedDocument {
    clear_warnings();

    // STEP 1: Tokenize and build the tree.
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.run();
    let (dom, issues) = HTMLParser::new(tokenizer.into_tokens()).run_with_issues();
    let mut parse_issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
    tracing::debug!(
        nodes = dom.descendants(dom.root()).count(),
        issues = parse_issues.len(),
        "parsed document"
    );

    // STEP 2: Collect stylesheets in document order.
    //
    // [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
    // "If the resource is not available, the user agent must act as if
    // the resource was an empty style sheet."
    let mut stylesheets = Vec::new();
    for source in stylesheet_sources(&dom) {
        let css = match source {
            StylesheetSource::Inline(css) => css,
            StylesheetSource::External(href) => match read_linked_stylesheet(&href, base_dir) {
                Ok(css) => css,
                Err(err) => {
                    let message = err.to_string();
                    warn_once("Koala Browser", &message);
                    parse_issues.push(message);
                    continue;
                }
            },
        };
        let sheet = parse_stylesheet(&css);
        if !sheet.rules.is_empty() {
            stylesheets.push(sheet);
        }
    }

    // STEP 3: Caller-supplied CSS comes last, so it wins ties.
    stylesheets.extend(extra_css.iter().map(|css| parse_stylesheet(css)));

    // STEP 4: Cascade.
    let styles = apply_styles_to_tree(&dom, &stylesheets);
    tracing::debug!(
        sheets = stylesheets.len(),
        styled = styles.len(),
        "computed styles"
    );

    // STEP 5: Layout.
    let layout_tree = build_layout_tree(&dom, &styles, config);

    LoadedDocument {
        html_source: html.to_string(),
        source_path: None,
        dom,
        stylesheets,
        styles,
        layout_tree,
        parse_issues,
    }
}

/// [§ 4.2.4.3 Fetching and processing a resource from a link element](https://html.spec.whatwg.org/multipage/semantics.html#link-type-stylesheet)
///
/// Only local files are read: `file://` URLs and paths relative to the
/// document's directory.
fn read_linked_stylesheet(href: &str, base_dir: Option<&Path>) -> Result<String, LoadError> {
    let path = if let Some(local) = href.strip_prefix("file://") {
        PathBuf::from(local)
    } else if href.contains("://") || href.starts_with("//") || href.starts_with("data:") {
        return Err(LoadError::UnsupportedScheme {
            href: href.to_string(),
        });
    } else if Path::new(href).is_absolute() {
        PathBuf::from(href)
    } else {
        let base = base_dir.ok_or_else(|| LoadError::NoBaseDirectory {
            href: href.to_string(),
        })?;
        base.join(href)
    };

    fs::read_to_string(&path).map_err(|source| LoadError::FileError { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_css::values::Color;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("koala-browser-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_document_runs_the_pipeline() {
        let doc = parse_document(
            r#"<style>p { color: red }</style><p id="x">hi</p>"#,
            &[],
            &LayoutConfig::default(),
        );
        let p = doc.query_selector("#x").unwrap();
        assert_eq!(doc.style_of(p).unwrap().color, Color::rgb(255, 0, 0));
        assert!(doc.layout_tree.find_by_id(p).is_some());
        assert_eq!(doc.stylesheets.len(), 1);
        assert!(doc.source_path.is_none());
    }

    #[test]
    fn test_extra_css_overrides_document_sheets() {
        let doc = parse_document(
            r#"<style>p { color: red }</style><p>hi</p>"#,
            &["p { color: blue }".to_string()],
            &LayoutConfig::default(),
        );
        let p = doc.query_selector("p").unwrap();
        assert_eq!(doc.style_of(p).unwrap().color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_unresolvable_links_are_reported() {
        let doc = parse_document(
            r#"<link rel="stylesheet" href="site.css"><link rel="stylesheet" href="https://x.test/a.css">"#,
            &[],
            &LayoutConfig::default(),
        );
        assert_eq!(doc.parse_issues.len(), 2);
        assert!(doc.parse_issues[0].contains("site.css"));
        assert!(doc.parse_issues[1].contains("only local files"));
    }

    #[test]
    fn test_load_document_reads_linked_stylesheets() {
        let dir = scratch_dir("links");
        fs::write(dir.join("site.css"), "div { width: 120px }").unwrap();
        let page = dir.join("index.html");
        fs::write(
            &page,
            r#"<link rel="stylesheet" href="site.css"><div id="d"></div><link rel="stylesheet" href="missing.css">"#,
        )
        .unwrap();

        let doc = load_document(&page, &[], &LayoutConfig::default()).unwrap();
        let d = doc.query_selector("#d").unwrap();
        assert_eq!(doc.layout_tree.find_by_id(d).unwrap().rect.width, 120.0);
        assert_eq!(doc.parse_issues.len(), 1);
        assert!(doc.parse_issues[0].contains("missing.css"));
        assert_eq!(doc.source_path.as_deref(), Some(page.as_path()));
    }

    #[test]
    fn test_missing_document_is_a_file_error() {
        let path = scratch_dir("missing").join("nope.html");
        let err = load_document(&path, &[], &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::FileError { .. }));
        assert!(err.to_string().contains("nope.html"));
    }

    #[test]
    fn test_link_at_finds_anchor_href() {
        let doc = parse_document(
            r#"<div><a href="/next">next</a></div>"#,
            &[],
            &LayoutConfig::default(),
        );
        assert_eq!(doc.link_at(2.0, 2.0), Some("/next"));
        assert_eq!(doc.link_at(900.0, 2.0), None);
    }
}
