//! Koala CLI - HTML/CSS parsing and layout inspector
//!
//! Usage:
//!   koala <file>                  Print the DOM, computed styles and layout tree
//!   koala <file> --dump layout    Print only the layout tree
//!   koala <file> --json           Emit styles and layout as JSON
//!   koala --html '<h1>Hello</h1>' Parse an HTML string
//!
//! Logging is controlled by `-v` (repeatable) or `RUST_LOG`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use koala_browser::{LoadedDocument, load_document, parse_document};
use koala_css::{ComputedStyle, LayoutBox, LayoutConfig, dump_layout_tree};
use koala_dom::{DomTree, NodeId, NodeType};
use koala_html::dump_tree;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Koala - inspect how an HTML document is parsed, styled and laid out
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print everything for a file
    koala ./index.html

    # Layout tree for a phone-sized viewport
    koala --width 375 --height 667 --dump layout ./index.html

    # Add a user stylesheet and emit JSON
    koala --css reset.css --json ./index.html

    # Parse inline HTML
    koala --html '<div style="display: flex"><p>a</p><p>b</p></div>'
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse an HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Stylesheet applied after the document's own stylesheets (repeatable)
    #[arg(long, value_name = "FILE")]
    css: Vec<PathBuf>,

    /// Layout configuration as a JSON file; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport width, overriding the configuration
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height, overriding the configuration
    #[arg(long)]
    height: Option<f32>,

    /// What to print
    #[arg(long, value_enum, default_value_t = Dump::All)]
    dump: Dump,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Dump {
    Dom,
    Styles,
    Layout,
    All,
}

impl Dump {
    const fn includes(self, section: Self) -> bool {
        matches!(self, Self::All) || self as u8 == section as u8
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = layout_config(&cli)?;
    tracing::debug!(?config, "layout configuration");

    let doc = load_doc(&cli, &config)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&JsonReport::new(&doc, cli.dump))
            .context("failed to serialize report")?;
        println!("{json}");
    } else {
        print_report(&doc, cli.dump);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file first, then the `--width`/`--height` overrides.
fn layout_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(width) = cli.width {
        config.viewport_width = width;
    }
    if let Some(height) = cli.height {
        config.viewport_height = height;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<LayoutConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config '{}'", path.display()))
}

fn load_doc(cli: &Cli, config: &LayoutConfig) -> Result<LoadedDocument> {
    let extra_css = cli
        .css
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("failed to read stylesheet '{}'", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(html) = &cli.html {
        return Ok(parse_document(html, &extra_css, config));
    }
    let path = cli
        .path
        .as_deref()
        .context("no input file or --html provided")?;
    Ok(load_document(path, &extra_css, config)?)
}

fn print_report(doc: &LoadedDocument, dump: Dump) {
    if dump.includes(Dump::Dom) {
        println!("{}", "=== DOM Tree ===".bold());
        print_dom(&doc.dom, doc.dom.root(), 0);
        println!();
    }

    if dump.includes(Dump::Styles) {
        println!(
            "{} {}",
            "=== Computed Styles ===".bold(),
            format!("({} sheets)", doc.stylesheets.len()).dimmed()
        );
        for id in doc.dom.descendant_elements(doc.dom.root()) {
            if let Some(style) = doc.style_of(id) {
                println!("{} {}", node_label(&doc.dom, id).cyan(), style_summary(style));
            }
        }
        println!();
    }

    if dump.includes(Dump::Layout) {
        println!(
            "{} {}",
            "=== Layout Tree ===".bold(),
            format!("({} boxes)", doc.layout_tree.box_count()).dimmed()
        );
        print!("{}", dump_layout_tree(&doc.layout_tree, &doc.dom, 0));
        println!();
    }

    if !doc.parse_issues.is_empty() {
        println!("{}", "=== Parse Issues ===".yellow().bold());
        for issue in &doc.parse_issues {
            println!("  - {issue}");
        }
    }
}

fn print_dom(tree: &DomTree, id: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{indent}{}", "#document".dimmed()),
        NodeType::Element(element) => {
            let attrs: String = element
                .attrs
                .iter()
                .map(|(name, value)| format!(" {}=\"{value}\"", name.yellow()))
                .collect();
            println!("{indent}<{}{attrs}>", element.tag_name.cyan());
        }
        NodeType::Text(text) => println!("{indent}{}", format!("{text:?}").green()),
    }
    for &child in tree.children(id) {
        print_dom(tree, child, depth + 1);
    }
}

/// `tag#id.class` for an element.
fn node_label(tree: &DomTree, id: NodeId) -> String {
    let Some(element) = tree.as_element(id) else {
        return format!("{id:?}");
    };
    let mut label = element.tag_name.clone();
    if let Some(element_id) = element.id() {
        label.push('#');
        label.push_str(element_id);
    }
    let mut classes: Vec<&str> = element.classes().into_iter().collect();
    classes.sort_unstable();
    for class in classes {
        label.push('.');
        label.push_str(class);
    }
    label
}

fn style_summary(style: &ComputedStyle) -> String {
    format!(
        "display: {}; color: {}; background-color: {}; font-size: {}px; width: {}; height: {}",
        style.display,
        style.color,
        style.background_color,
        style.font_size,
        style.width,
        style.height
    )
}

#[derive(Serialize)]
struct JsonStyle<'a> {
    node: usize,
    label: String,
    style: &'a ComputedStyle,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    styles: Option<Vec<JsonStyle<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a LayoutBox>,
    parse_issues: &'a [String],
}

impl<'a> JsonReport<'a> {
    fn new(doc: &'a LoadedDocument, dump: Dump) -> Self {
        let styles = dump.includes(Dump::Styles).then(|| {
            let by_node: BTreeMap<usize, &ComputedStyle> =
                doc.styles.iter().map(|(id, style)| (id.0, style)).collect();
            by_node
                .into_iter()
                .map(|(node, style)| JsonStyle {
                    node,
                    label: node_label(&doc.dom, NodeId(node)),
                    style,
                })
                .collect()
        });

        Self {
            dom: dump
                .includes(Dump::Dom)
                .then(|| dump_tree(&doc.dom, doc.dom.root(), 0)),
            styles,
            layout: dump.includes(Dump::Layout).then_some(&doc.layout_tree),
            parse_issues: &doc.parse_issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_stylesheet_is_an_error() {
        let cli = Cli::parse_from(["koala", "--html", "<p>x</p>", "--css", "/nonexistent/koala.css"]);
        let err = load_doc(&cli, &LayoutConfig::default()).unwrap_err();
        assert!(err.to_string().contains("koala.css"));
    }

    #[test]
    fn test_viewport_flags_override_defaults() {
        let cli = Cli::parse_from(["koala", "--html", "<p>x</p>", "--width", "375"]);
        let config = layout_config(&cli).unwrap();
        assert_eq!(config.viewport_width, 375.0);
        assert_eq!(config.viewport_height, LayoutConfig::default().viewport_height);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("koala-cli-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "viewport_width": 640 }"#).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.viewport_width, 640.0);
        assert_eq!(config.root_font_size, 16.0);
    }

    #[test]
    fn test_dump_sections() {
        assert!(Dump::All.includes(Dump::Layout));
        assert!(Dump::Styles.includes(Dump::Styles));
        assert!(!Dump::Dom.includes(Dump::Layout));
    }

    #[test]
    fn test_node_label_sorts_classes() {
        let doc = parse_document(
            r#"<div id="main" class="b a"></div>"#,
            &[],
            &LayoutConfig::default(),
        );
        let div = doc.query_selector("div").unwrap();
        assert_eq!(node_label(&doc.dom, div), "div#main.a.b");
    }

    #[test]
    fn test_json_report_respects_dump() {
        let doc = parse_document("<p>hi</p>", &[], &LayoutConfig::default());
        let value = serde_json::to_value(JsonReport::new(&doc, Dump::Layout)).unwrap();
        assert!(value.get("layout").is_some());
        assert!(value.get("styles").is_none());
        assert!(value.get("dom").is_none());
    }
}
