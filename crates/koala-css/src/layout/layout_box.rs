//! Layout box types and layout algorithms.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! The layout tree is rebuilt from scratch from the DOM and its [`StyleMap`]
//! on every call to [`build_layout_tree`].

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;

use koala_dom::{DomTree, NodeId, NodeType};
use serde::{Serialize, Serializer};

use crate::cascade::StyleMap;
use crate::style::{BoxSizing, ComputedStyle, DisplayValue, FlexDirection, Position, Sides, Visibility};
use crate::values::{Length, LengthUnit, ResolveContext};

use super::LayoutConfig;
use super::box_model::{
    BoxDimensions, EdgeSizes, Rect, clamp_auto_height, collapse_margins,
    compute_box_dimensions_with,
};
use super::flex::{FlexContainer, FlexItem};
use super::inline::{
    ApproximateFontMetrics, FontMetrics, InlineCursor, TextLine, used_line_height, wrap_text,
};

/// Default size of an `<img>` without `width`/`height` attributes.
const DEFAULT_IMAGE_SIZE: (f32, f32) = (200.0, 150.0);

/// Default content width of text-entry form controls.
const DEFAULT_CONTROL_WIDTH: f32 = 200.0;

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "The following sections describe the types of boxes that may be generated
/// in CSS 2.1. A box's type affects, in part, its behavior in the visual
/// formatting model."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxKind {
    /// [§ 9.1.1 The viewport](https://www.w3.org/TR/CSS2/visuren.html#viewport)
    /// The initial containing block.
    Document,
    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    Block,
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    /// Spans the union of its content.
    Inline,
    /// An atomic inline that lays out its own content.
    InlineBlock,
    /// [§ 3 Flex Layout Box Model](https://www.w3.org/TR/css-flexbox-1/#box-model)
    Flex,
    /// [§ 2.5 Text Runs](https://www.w3.org/TR/css-display-3/#text-nodes)
    ///
    /// "A text run is the most basic box generated."
    Text,
    /// A replaced `<img>`.
    Image,
    /// `<input>`, `<button>`, `<select>` or `<textarea>`.
    FormControl,
}

/// Facts about a box the painter and hit testing need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutFlags {
    /// Box for a run of text.
    pub text: bool,
    /// Box for an image.
    pub image: bool,
    /// Inside an `<a href>`.
    pub link: bool,
    /// Box for a form control.
    pub form: bool,
    /// `visibility` is not `visible`: the box takes space but is not drawn.
    pub hidden: bool,
}

/// A node in the layout tree.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "Each box is associated with its generating element."
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// The generating DOM node (a text node for [`BoxKind::Text`]).
    #[serde(serialize_with = "serialize_node")]
    pub node: NodeId,
    /// What kind of box this is.
    pub kind: BoxKind,
    /// Resolved box model, positioned.
    pub dimensions: BoxDimensions,
    /// The border box; for text, the union of its lines.
    pub rect: Rect,
    /// Line fragments of a text box.
    pub lines: Vec<TextLine>,
    /// Paint and hit-test flags.
    pub flags: LayoutFlags,
    /// Child boxes in the layout tree.
    pub children: Vec<LayoutBox>,
}

fn serialize_node<S: Serializer>(node: &NodeId, serializer: S) -> Result<S::Ok, S::Error> {
    node.0.serialize(serializer)
}

impl LayoutBox {
    fn new(node: NodeId, kind: BoxKind, dimensions: BoxDimensions, flags: LayoutFlags) -> Self {
        Self {
            node,
            kind,
            dimensions,
            rect: dimensions.border_box(),
            lines: Vec::new(),
            flags,
            children: Vec::new(),
        }
    }

    fn text(node: NodeId, lines: Vec<TextLine>, link: bool, hidden: bool) -> Self {
        let rect = union(lines.iter().map(|l| l.rect)).unwrap_or_default();
        let dimensions = BoxDimensions {
            x: rect.x,
            y: rect.y,
            content_width: rect.width,
            content_height: Some(rect.height),
            ..BoxDimensions::default()
        };
        Self {
            node,
            kind: BoxKind::Text,
            dimensions,
            rect,
            lines,
            flags: LayoutFlags {
                text: true,
                link,
                hidden,
                ..LayoutFlags::default()
            },
            children: Vec::new(),
        }
    }

    /// Recursively shift a box and all its descendants by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.dimensions.x += dx;
        self.dimensions.y += dy;
        self.rect.x += dx;
        self.rect.y += dy;
        for line in &mut self.lines {
            line.rect.x += dx;
            line.rect.y += dy;
        }
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    /// Number of boxes in this subtree, including this one.
    #[must_use]
    pub fn box_count(&self) -> usize {
        1 + self.children.iter().map(Self::box_count).sum::<usize>()
    }

    /// The first box in this subtree generated by `node`, in tree order.
    #[must_use]
    pub fn find_by_id(&self, node: NodeId) -> Option<&Self> {
        if self.node == node {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(node))
    }

    /// The deepest visible box containing the point. Later siblings win, as
    /// they paint on top.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<&Self> {
        if let Some(hit) = self.children.iter().rev().find_map(|c| c.hit_test(x, y)) {
            return Some(hit);
        }
        let inside = if self.lines.is_empty() {
            self.rect.contains(x, y)
        } else {
            self.lines.iter().any(|line| line.rect.contains(x, y))
        };
        (inside && !self.flags.hidden).then_some(self)
    }

    /// [§ 4.6.4 Links](https://html.spec.whatwg.org/multipage/links.html#links-created-by-a-and-area-elements)
    ///
    /// The `<a href>` at the point: the hit box's node or its nearest
    /// ancestor. Returns the anchor and its `href`.
    #[must_use]
    pub fn find_link<'t>(&self, tree: &'t DomTree, x: f32, y: f32) -> Option<(NodeId, &'t str)> {
        let hit = self.hit_test(x, y)?;
        std::iter::once(hit.node)
            .chain(tree.ancestors(hit.node))
            .find_map(|id| anchor_href(tree, id).map(|href| (id, href)))
    }
}

fn anchor_href(tree: &DomTree, id: NodeId) -> Option<&str> {
    tree.as_element(id)
        .filter(|e| e.tag_name == "a")
        .and_then(|e| e.get_attribute("href"))
}

fn union(rects: impl Iterator<Item = Rect>) -> Option<Rect> {
    rects.reduce(|a, b| {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect {
            x,
            y,
            width: (a.x + a.width).max(b.x + b.width) - x,
            height: (a.y + a.height).max(b.y + b.height) - y,
        }
    })
}

/// Build the layout tree with [`ApproximateFontMetrics`] from `config`.
#[must_use]
pub fn build_layout_tree(tree: &DomTree, styles: &StyleMap, config: &LayoutConfig) -> LayoutBox {
    let metrics = ApproximateFontMetrics::from_config(config);
    build_layout_tree_with(tree, styles, config, &metrics)
}

/// Build the layout tree, measuring text with `metrics`.
///
/// The root box is the initial containing block: viewport-wide, as tall as
/// its content.
#[must_use]
pub fn build_layout_tree_with(
    tree: &DomTree,
    styles: &StyleMap,
    config: &LayoutConfig,
    metrics: &dyn FontMetrics,
) -> LayoutBox {
    let builder = LayoutBuilder {
        tree,
        styles,
        config,
        metrics,
        fallback: ComputedStyle::default(),
        flex_items: RefCell::default(),
    };
    let root = builder.layout_document();
    tracing::debug!(
        boxes = root.box_count(),
        height = root.rect.height,
        "built layout tree"
    );
    root
}

/// Normal-flow state inside one block container.
struct FlowState {
    cursor: InlineCursor,
    /// Bottom margin of the previous in-flow block, while nothing inline
    /// separates it from the next one.
    prev_margin_bottom: Option<f32>,
}

impl FlowState {
    const fn new(content: Rect) -> Self {
        Self {
            cursor: InlineCursor::new(content.x, content.x + content.width, content.y),
            prev_margin_bottom: None,
        }
    }
}

/// The containing block children are laid out against.
#[derive(Clone, Copy)]
struct Containing {
    content: Rect,
    /// `None` while the height depends on the content.
    height: Option<f32>,
    link: bool,
}

/// Inputs that fully determine a flex item laid out at the origin: the
/// item, its containing block and the forced border-box size, as `f32` bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct FlexItemKey {
    node: NodeId,
    containing: [u32; 2],
    containing_height: Option<u32>,
    border_size: Option<[u32; 2]>,
    link: bool,
}

impl FlexItemKey {
    fn new(node: NodeId, containing: Containing, border_size: Option<(f32, f32)>) -> Self {
        Self {
            node,
            containing: [containing.content.width.to_bits(), containing.content.height.to_bits()],
            containing_height: containing.height.map(f32::to_bits),
            border_size: border_size.map(|(w, h)| [w.to_bits(), h.to_bits()]),
            link: containing.link,
        }
    }
}

struct LayoutBuilder<'a> {
    tree: &'a DomTree,
    styles: &'a StyleMap,
    config: &'a LayoutConfig,
    metrics: &'a dyn FontMetrics,
    fallback: ComputedStyle,
    /// Flex items already laid out at the origin. Each item is measured and
    /// then placed, so without this nested flex containers are laid out
    /// once per ancestor pass.
    flex_items: RefCell<HashMap<FlexItemKey, LayoutBox>>,
}

impl LayoutBuilder<'_> {
    fn style(&self, id: NodeId) -> &ComputedStyle {
        self.styles.get(&id).unwrap_or(&self.fallback)
    }

    fn tag(&self, id: NodeId) -> &str {
        self.tree.tag_name(id).unwrap_or_default()
    }

    fn resolve_context(&self, style: &ComputedStyle, width: f32, height: f32) -> ResolveContext {
        ResolveContext {
            font_size: style.font_size,
            root_font_size: self.config.root_font_size,
            parent_width: width,
            parent_height: height,
            viewport_width: self.config.viewport_width,
            viewport_height: self.config.viewport_height,
            char_width: style.font_size * self.config.char_width_ratio,
            x_height: style.font_size * self.config.x_height_ratio,
        }
    }

    /// [§ 9.1.2 Containing blocks](https://www.w3.org/TR/CSS2/visuren.html#containing-block)
    fn layout_document(&self) -> LayoutBox {
        let content = Rect {
            x: 0.0,
            y: 0.0,
            width: self.config.viewport_width,
            height: 0.0,
        };
        let containing = Containing {
            content,
            height: Some(self.config.viewport_height),
            link: false,
        };
        let mut state = FlowState::new(content);
        let children = self.layout_flow(self.tree.root(), &self.fallback, containing, &mut state);
        state.cursor.finish_line();

        let dimensions = BoxDimensions {
            content_width: content.width,
            content_height: Some(state.cursor.y),
            ..BoxDimensions::default()
        };
        let mut root = LayoutBox::new(
            self.tree.root(),
            BoxKind::Document,
            dimensions,
            LayoutFlags::default(),
        );
        root.children = children;
        root
    }

    /// [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
    ///
    /// Lay out the children of `parent` into `state`. Inline elements recurse
    /// into the same state so their content shares line boxes.
    fn layout_flow(
        &self,
        parent: NodeId,
        parent_style: &ComputedStyle,
        containing: Containing,
        state: &mut FlowState,
    ) -> Vec<LayoutBox> {
        let mut boxes = Vec::new();
        for &child in self.tree.children(parent) {
            let Some(node) = self.tree.get(child) else {
                continue;
            };
            match &node.node_type {
                NodeType::Text(text) => {
                    if text.trim().is_empty() || parent == self.tree.root() {
                        continue;
                    }
                    let lines = wrap_text(text, parent_style, self.metrics, &mut state.cursor);
                    state.prev_margin_bottom = None;
                    if !lines.is_empty() {
                        let hidden = parent_style.visibility != Visibility::Visible;
                        boxes.push(LayoutBox::text(child, lines, containing.link, hidden));
                    }
                }
                NodeType::Element(_) => {
                    if let Some(layout_box) = self.layout_element(child, containing, state) {
                        boxes.push(layout_box);
                    }
                }
                NodeType::Document => {}
            }
        }
        boxes
    }

    fn layout_element(
        &self,
        id: NodeId,
        containing: Containing,
        state: &mut FlowState,
    ) -> Option<LayoutBox> {
        let style = self.style(id);

        // [§ 2.6 display: none](https://www.w3.org/TR/css-display-3/#valdef-display-none)
        //
        // "The element and its descendants generate no boxes or text runs."
        if style.is_display_none() {
            return None;
        }

        let tag = self.tag(id);
        if tag == "br" {
            let cursor = &mut state.cursor;
            cursor.line_height = cursor
                .line_height
                .max(used_line_height(style, self.metrics));
            cursor.new_line();
            return None;
        }

        let kind = box_kind(tag, style.display);
        let mut layout_box = if style.display.is_block_level() {
            // STEP 1: A block starts on a fresh line, after the previous
            // block's bottom margin collapses with its top margin.
            state.cursor.finish_line();
            let dims = self.element_dimensions(id, kind, style, containing);
            let top = state.prev_margin_bottom.map_or(state.cursor.y, |prev| {
                state.cursor.y - prev + collapse_margins(prev, dims.margin.top) - dims.margin.top
            });
            let layout_box = self.layout_block(id, kind, style, dims, containing.content.x, top, containing.link);
            state.cursor.y = top + layout_box.dimensions.margin_box().height;
            state.prev_margin_bottom = Some(layout_box.dimensions.margin.bottom);
            layout_box
        } else if kind == BoxKind::Inline {
            // STEP 2: Inline content flows through the same line boxes.
            state.prev_margin_bottom = None;
            self.layout_inline(id, style, containing, state)
        } else {
            // STEP 3: Atomic inlines are placed whole, wrapping if needed.
            state.prev_margin_bottom = None;
            let dims = self.element_dimensions(id, kind, style, containing);
            let mut layout_box = self.layout_block(id, kind, style, dims, 0.0, 0.0, containing.link);
            let outer = layout_box.dimensions.margin_box();
            let (x, y) = state.cursor.place(outer.width, outer.height);
            layout_box.translate(x, y);
            layout_box
        };

        self.apply_relative_offset(&mut layout_box, style, containing);
        tracing::trace!(node = id.0, kind = ?layout_box.kind, "laid out element");
        Some(layout_box)
    }

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "Once a box has been laid out according to the normal flow, it may be
    /// shifted relative to this position."
    fn apply_relative_offset(&self, layout_box: &mut LayoutBox, style: &ComputedStyle, containing: Containing) {
        if style.position != Position::Relative {
            return;
        }
        let ctx = self.resolve_context(style, containing.content.width, containing.height.unwrap_or(0.0));
        let inset = &style.inset;
        let dx = if inset.left.is_auto() {
            -inset.right.resolve(&ctx)
        } else {
            inset.left.resolve(&ctx)
        };
        let dy = if inset.top.is_auto() {
            -inset.bottom.resolve_height(&ctx)
        } else {
            inset.top.resolve_height(&ctx)
        };
        layout_box.translate(dx, dy);
    }

    /// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
    ///
    /// Box model for an element, with intrinsic sizes for replaced elements
    /// and shrink-to-fit widths for atomic inlines.
    fn element_dimensions(
        &self,
        id: NodeId,
        kind: BoxKind,
        style: &ComputedStyle,
        containing: Containing,
    ) -> BoxDimensions {
        // A percentage height against an auto-height containing block
        // behaves as auto.
        let style: Cow<'_, ComputedStyle> =
            if containing.height.is_none() && style.height.unit == LengthUnit::Percent {
                let mut owned = style.clone();
                owned.height = Length::AUTO;
                Cow::Owned(owned)
            } else {
                Cow::Borrowed(style)
            };
        let ctx = self.resolve_context(
            &style,
            containing.content.width,
            containing.height.unwrap_or(0.0),
        );
        let mut dims = compute_box_dimensions_with(&style, &ctx);

        let intrinsic = self.intrinsic_size(id, kind, &style);
        if style.width.is_auto() {
            if let Some((width, _)) = intrinsic {
                dims.content_width = width;
            } else if !style.display.is_block_level() || kind == BoxKind::FormControl {
                // [§ 10.3.9 'Inline-block', non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
                // shrink-to-fit = min(max(preferred minimum, available), preferred)
                let available = dims.content_width;
                dims.content_width = self.max_content_width(id).min(available.max(0.0));
            }
        }
        if style.height.is_auto()
            && let Some((_, Some(height))) = intrinsic
        {
            dims.content_height = Some(height);
        }
        dims
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Content size of replaced elements and fixed-size form controls.
    fn intrinsic_size(&self, id: NodeId, kind: BoxKind, style: &ComputedStyle) -> Option<(f32, Option<f32>)> {
        let line = used_line_height(style, self.metrics);
        match (kind, self.tag(id)) {
            (BoxKind::Image, _) => {
                let element = self.tree.as_element(id)?;
                let width = pixel_attribute(element.get_attribute("width"));
                let height = pixel_attribute(element.get_attribute("height"));
                Some((
                    width.unwrap_or(DEFAULT_IMAGE_SIZE.0),
                    Some(height.unwrap_or(DEFAULT_IMAGE_SIZE.1)),
                ))
            }
            (BoxKind::FormControl, "input" | "select") => Some((DEFAULT_CONTROL_WIDTH, Some(line))),
            (BoxKind::FormControl, "textarea") => Some((DEFAULT_CONTROL_WIDTH * 1.5, Some(line * 3.0))),
            _ => None,
        }
    }

    /// [§ 9.2.2 Inline-level elements](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// Horizontal margin, border and padding offset the content; the box
    /// covers the union of what its content produced.
    fn layout_inline(
        &self,
        id: NodeId,
        style: &ComputedStyle,
        containing: Containing,
        state: &mut FlowState,
    ) -> LayoutBox {
        let ctx = self.resolve_context(style, containing.content.width, containing.height.unwrap_or(0.0));
        let margin = edges(&style.margin, &ctx);
        let border = edges(&style.border_width, &ctx);
        let padding = edges(&style.padding, &ctx);

        state.cursor.x += margin.left + border.left + padding.left;
        let start = (state.cursor.x, state.cursor.y);
        let inner = Containing {
            link: containing.link || anchor_href(self.tree, id).is_some(),
            ..containing
        };
        let children = self.layout_flow(id, style, inner, state);
        let end_x = state.cursor.x;
        state.cursor.x += padding.right + border.right + margin.right;

        let content = union(children.iter().map(|c| c.rect)).unwrap_or(Rect {
            x: start.0,
            y: start.1,
            width: (end_x - start.0).max(0.0),
            height: 0.0,
        });
        let dimensions = BoxDimensions {
            x: content.x - padding.left - border.left - margin.left,
            y: content.y - padding.top - border.top - margin.top,
            content_width: content.width,
            content_height: Some(content.height),
            padding,
            border,
            margin,
        };
        let mut layout_box = LayoutBox::new(id, BoxKind::Inline, dimensions, flags(BoxKind::Inline, style, inner.link));
        layout_box.children = children;
        layout_box
    }

    /// Lay out a box that establishes its own content area: place it with
    /// its margin box at `(x, y)`, lay out its children inside, and settle an
    /// auto height from them.
    #[allow(clippy::too_many_arguments)]
    fn layout_block(
        &self,
        id: NodeId,
        kind: BoxKind,
        style: &ComputedStyle,
        mut dims: BoxDimensions,
        x: f32,
        y: f32,
        link: bool,
    ) -> LayoutBox {
        dims.set_position(x, y);
        let content = dims.content_rect();
        let inner = Containing {
            content,
            height: dims.content_height,
            link: link || anchor_href(self.tree, id).is_some(),
        };

        let (children, used_height) = if matches!(kind, BoxKind::Image)
            || (kind == BoxKind::FormControl && self.tag(id) != "button")
        {
            (Vec::new(), 0.0)
        } else if style.display.is_flex() {
            self.layout_flex(id, style, inner)
        } else {
            let mut state = FlowState::new(content);
            let children = self.layout_flow(id, style, inner, &mut state);
            state.cursor.finish_line();
            (children, state.cursor.y - content.y)
        };

        // [§ 10.6.3 Block-level non-replaced elements in normal flow when
        // 'overflow' computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
        //
        // "the height is the distance between the top content edge and ...
        // the bottom edge of the last line box / bottom border edge of the
        // last in-flow child"
        if dims.content_height.is_none() {
            let ctx = self.resolve_context(style, content.width, 0.0);
            dims.set_content_height(clamp_auto_height(style, &ctx, used_height));
        }

        let mut layout_box = LayoutBox::new(id, kind, dims, flags(kind, style, inner.link));
        layout_box.children = children;
        layout_box
    }

    /// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
    ///
    /// Returns the laid-out children and the used content height.
    fn layout_flex(
        &self,
        id: NodeId,
        style: &ComputedStyle,
        containing: Containing,
    ) -> (Vec<LayoutBox>, f32) {
        let content = containing.content;
        let is_row = style.flex_direction.is_row();
        let ctx = self.resolve_context(style, content.width, containing.height.unwrap_or(0.0));

        // STEP 1: [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
        //
        // "Each in-flow child of a flex container becomes a flex item, and
        // each contiguous sequence of child text runs is wrapped in an
        // anonymous block container flex item."
        //
        // [§ 5.4 Display Order](https://www.w3.org/TR/css-flexbox-1/#order-property)
        // Items are sorted stably by `order`.
        let mut children: Vec<(NodeId, i32)> = self
            .tree
            .children(id)
            .iter()
            .filter_map(|&child| match self.tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) if !text.trim().is_empty() => Some((child, 0)),
                Some(NodeType::Element(_)) => {
                    let child_style = self.style(child);
                    (!child_style.is_display_none()).then_some((child, child_style.order))
                }
                _ => None,
            })
            .collect();
        children.sort_by_key(|&(_, order)| order);

        // STEP 2: [§ 9.2 Line Length Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
        // Lay each item out once at its hypothetical size to learn its
        // flex base size and hypothetical cross size.
        let hypothetical = Containing {
            content: Rect { x: 0.0, y: 0.0, ..content },
            height: containing.height,
            link: containing.link,
        };
        let mut items = Vec::with_capacity(children.len());
        for (index, &(child, _)) in children.iter().enumerate() {
            let measured = self.layout_flex_item(child, style, hypothetical, None);
            let border_box = measured.dimensions.border_box();
            let margin = measured.dimensions.margin;
            let (main, cross) = if is_row {
                (border_box.width, border_box.height)
            } else {
                (border_box.height, border_box.width)
            };

            // Anonymous text items use the initial flex values.
            let mut item = if self.tree.as_text(child).is_some() {
                FlexItem::new(index, main, 0.0, 1.0)
            } else {
                let item_style = self.style(child);
                let basis = flex_basis(item_style, &ctx, is_row, &measured.dimensions).unwrap_or(main);
                FlexItem {
                    align_self: item_style.align_self,
                    ..FlexItem::new(index, basis, item_style.flex_grow, item_style.flex_shrink)
                }
            };
            item.cross_size = cross;
            if is_row {
                item.margin_main_start = margin.left;
                item.margin_main_end = margin.right;
                item.margin_cross_start = margin.top;
                item.margin_cross_end = margin.bottom;
            } else {
                item.margin_main_start = margin.top;
                item.margin_main_end = margin.bottom;
                item.margin_cross_start = margin.left;
                item.margin_cross_end = margin.right;
            }
            items.push(item);
        }

        // STEP 3: Run the flex algorithm. A column without a definite height
        // is exactly as tall as its items.
        let main_size = if is_row {
            content.width
        } else {
            containing.height.unwrap_or_else(|| {
                let gap = style.row_gap.resolve_height(&ctx);
                items
                    .iter()
                    .map(|i| i.flex_basis + i.margin_main_start + i.margin_main_end)
                    .sum::<f32>()
                    + items.len().saturating_sub(1) as f32 * gap
            })
        };
        let cross_size = if is_row { containing.height } else { Some(content.width) };
        let mut flex = FlexContainer::from_style(style, &ctx, main_size, cross_size);
        flex.items = items;
        flex.layout();

        // STEP 4: Lay each item out again at its final size and move it into place.
        let mut boxes = Vec::with_capacity(children.len());
        for item in &flex.items {
            let (child, _) = children[item.index];
            let rect = flex.item_rect(item);
            let mut layout_box = self.layout_flex_item(child, style, hypothetical, Some((rect.width, rect.height)));
            let dx = content.x + rect.x - layout_box.rect.x;
            let dy = content.y + rect.y - layout_box.rect.y;
            layout_box.translate(dx, dy);
            if self.tree.as_element(child).is_some() {
                self.apply_relative_offset(&mut layout_box, self.style(child), containing);
            }
            boxes.push(layout_box);
        }

        // [§ 9.9 Cross Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-cross-container)
        //
        // "If the cross size property is a definite size, use that; otherwise,
        // use the largest of the flex lines' cross sizes."
        let used_height = match (style.flex_direction, containing.height) {
            (_, Some(height)) => height,
            (FlexDirection::Row | FlexDirection::RowReverse, None) => flex.used_cross_size(),
            (FlexDirection::Column | FlexDirection::ColumnReverse, None) => flex.used_main_size(),
        };
        (boxes, used_height)
    }

    /// Lay out one flex item at the origin. With `border_size`, its border
    /// box is forced to that size; otherwise it is sized as if it were an
    /// inline-block (rows) or a block (columns).
    ///
    /// Results are memoized, so each distinct sizing of an item is laid out
    /// once per tree.
    fn layout_flex_item(
        &self,
        child: NodeId,
        container_style: &ComputedStyle,
        containing: Containing,
        border_size: Option<(f32, f32)>,
    ) -> LayoutBox {
        let key = FlexItemKey::new(child, containing, border_size);
        if let Some(cached) = self.flex_items.borrow().get(&key) {
            return cached.clone();
        }
        let layout_box = self.layout_flex_item_uncached(child, container_style, containing, border_size);
        let _ = self
            .flex_items
            .borrow_mut()
            .insert(key, layout_box.clone());
        layout_box
    }

    fn layout_flex_item_uncached(
        &self,
        child: NodeId,
        container_style: &ComputedStyle,
        containing: Containing,
        border_size: Option<(f32, f32)>,
    ) -> LayoutBox {
        if let Some(text) = self.tree.as_text(child) {
            let width = border_size.map_or(containing.content.width, |(w, _)| w);
            let mut cursor = InlineCursor::new(0.0, width, 0.0);
            let lines = wrap_text(text.trim(), container_style, self.metrics, &mut cursor);
            let hidden = container_style.visibility != Visibility::Visible;
            let mut layout_box = LayoutBox::text(child, lines, containing.link, hidden);
            if let Some((w, h)) = border_size {
                layout_box.rect.width = w;
                layout_box.rect.height = h;
            }
            return layout_box;
        }

        // [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
        // "The display value of a flex item is blockified."
        let style = self.style(child);
        let kind = match box_kind(self.tag(child), style.display) {
            BoxKind::Inline | BoxKind::InlineBlock => BoxKind::Block,
            other => other,
        };
        let mut dims = self.element_dimensions(child, kind, style, containing);
        if container_style.flex_direction.is_row() && style.width.is_auto() && kind == BoxKind::Block {
            let frame = dims.padding.horizontal() + dims.border.horizontal() + dims.margin.horizontal();
            dims.content_width = self
                .max_content_width(child)
                .min((containing.content.width - frame).max(0.0));
        }
        if let Some((width, height)) = border_size {
            dims.content_width = (width - dims.padding.horizontal() - dims.border.horizontal()).max(0.0);
            dims.content_height = Some((height - dims.padding.vertical() - dims.border.vertical()).max(0.0));
        }
        self.layout_block(child, kind, style, dims, 0.0, 0.0, containing.link)
    }

    /// [§ 4.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
    ///
    /// "The max-content size of a box is its ideal size ... if given infinite
    /// available space." Inline content is summed along the line; block
    /// children each take their own line.
    fn max_content_width(&self, id: NodeId) -> f32 {
        let style = self.style(id);
        let mut line = 0.0_f32;
        let mut widest = 0.0_f32;
        for &child in self.tree.children(id) {
            if let Some(text) = self.tree.as_text(child) {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                let transformed = style.text_transform.apply(&collapsed);
                line += self.metrics.text_width(&transformed, style.font_size);
                continue;
            }
            let child_style = self.style(child);
            if child_style.is_display_none() {
                continue;
            }
            if self.tag(child) == "br" {
                widest = widest.max(line);
                line = 0.0;
                continue;
            }
            let outer = self.outer_max_content_width(child, child_style);
            if child_style.display.is_block_level() {
                widest = widest.max(line).max(outer);
                line = 0.0;
            } else {
                line += outer;
            }
        }
        widest.max(line)
    }

    fn outer_max_content_width(&self, id: NodeId, style: &ComputedStyle) -> f32 {
        let ctx = self.resolve_context(style, 0.0, 0.0);
        let margin = edges(&style.margin, &ctx);
        let border = edges(&style.border_width, &ctx);
        let padding = edges(&style.padding, &ctx);
        let frame = padding.horizontal() + border.horizontal();
        let kind = box_kind(self.tag(id), style.display);
        let content = if !style.width.is_auto() && style.width.unit != LengthUnit::Percent {
            let width = style.width.resolve(&ctx);
            if style.box_sizing == BoxSizing::BorderBox {
                (width - frame).max(0.0)
            } else {
                width
            }
        } else if let Some((width, _)) = self.intrinsic_size(id, kind, style) {
            width
        } else {
            self.max_content_width(id)
        };
        content + frame + margin.horizontal()
    }
}

fn flags(kind: BoxKind, style: &ComputedStyle, link: bool) -> LayoutFlags {
    LayoutFlags {
        text: false,
        image: kind == BoxKind::Image,
        link,
        form: kind == BoxKind::FormControl,
        hidden: style.visibility != Visibility::Visible,
    }
}

/// [§ 7.1 The flex-basis property](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
///
/// A definite `flex-basis` as a border-box size, or `None` for `auto`
/// (or a percentage of an indefinite main size).
fn flex_basis(
    style: &ComputedStyle,
    ctx: &ResolveContext,
    is_row: bool,
    dims: &BoxDimensions,
) -> Option<f32> {
    let basis = style.flex_basis;
    if basis.is_auto() || basis.is_none() {
        return None;
    }
    let (size, frame) = if is_row {
        (basis.resolve(ctx), dims.padding.horizontal() + dims.border.horizontal())
    } else {
        if basis.unit == LengthUnit::Percent && ctx.parent_height <= 0.0 {
            return None;
        }
        (basis.resolve_height(ctx), dims.padding.vertical() + dims.border.vertical())
    };
    Some(match style.box_sizing {
        BoxSizing::BorderBox => size.max(frame),
        BoxSizing::ContentBox => size.max(0.0) + frame,
    })
}

fn edges(sides: &Sides<Length>, ctx: &ResolveContext) -> EdgeSizes {
    EdgeSizes {
        top: sides.top.resolve(ctx),
        right: sides.right.resolve(ctx),
        bottom: sides.bottom.resolve(ctx),
        left: sides.left.resolve(ctx),
    }
}

fn pixel_attribute(value: Option<&str>) -> Option<f32> {
    let value = value?.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.parse::<f32>().ok().filter(|n| n.is_finite() && *n >= 0.0)
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Replaced elements and form controls keep their own kind whatever their
/// `display`.
fn box_kind(tag: &str, display: DisplayValue) -> BoxKind {
    match tag {
        "img" => BoxKind::Image,
        "input" | "button" | "select" | "textarea" => BoxKind::FormControl,
        _ => match display {
            DisplayValue::Flex | DisplayValue::InlineFlex => BoxKind::Flex,
            DisplayValue::InlineBlock => BoxKind::InlineBlock,
            DisplayValue::Inline => BoxKind::Inline,
            _ => BoxKind::Block,
        },
    }
}

/// Print the layout tree to stdout.
pub fn print_layout_tree(layout_box: &LayoutBox, tree: &DomTree, indent: usize) {
    print!("{}", dump_layout_tree(layout_box, tree, indent));
}

/// Indented dump of a layout subtree, one box per line with its border box.
#[must_use]
pub fn dump_layout_tree(layout_box: &LayoutBox, tree: &DomTree, indent: usize) -> String {
    let mut out = String::new();
    write_layout_tree(layout_box, tree, indent, &mut out);
    out
}

fn write_layout_tree(layout_box: &LayoutBox, tree: &DomTree, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let r = layout_box.rect;
    let label = match layout_box.kind {
        BoxKind::Text => {
            let text: Vec<&str> = layout_box.lines.iter().map(|l| l.text.as_str()).collect();
            format!("{:?}", text.join(" / "))
        }
        BoxKind::Document => String::new(),
        _ => format!("<{}>", tree.tag_name(layout_box.node).unwrap_or("?")),
    };
    let _ = writeln!(
        out,
        "{prefix}{:?} {label} at ({}, {}) size {}x{}",
        layout_box.kind, r.x, r.y, r.width, r.height
    );
    for child in &layout_box.children {
        write_layout_tree(child, tree, indent + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koala_dom::ElementData;

    #[test]
    fn test_translate_moves_subtree() {
        let mut parent = LayoutBox::new(NodeId(1), BoxKind::Block, BoxDimensions::default(), LayoutFlags::default());
        parent.children.push(LayoutBox::text(
            NodeId(2),
            vec![TextLine {
                text: "hi".to_string(),
                rect: Rect { x: 0.0, y: 0.0, width: 10.0, height: 5.0 },
            }],
            false,
            false,
        ));
        parent.translate(3.0, 4.0);
        assert_eq!(parent.rect.x, 3.0);
        assert_eq!(parent.children[0].lines[0].rect.y, 4.0);
        assert_eq!(parent.box_count(), 2);
    }

    #[test]
    fn test_box_kind() {
        assert_eq!(box_kind("img", DisplayValue::Block), BoxKind::Image);
        assert_eq!(box_kind("button", DisplayValue::InlineBlock), BoxKind::FormControl);
        assert_eq!(box_kind("span", DisplayValue::Inline), BoxKind::Inline);
        assert_eq!(box_kind("li", DisplayValue::ListItem), BoxKind::Block);
        assert_eq!(box_kind("nav", DisplayValue::InlineFlex), BoxKind::Flex);
    }

    #[test]
    fn test_pixel_attribute() {
        assert_eq!(pixel_attribute(Some("120")), Some(120.0));
        assert_eq!(pixel_attribute(Some(" 64px ")), Some(64.0));
        assert_eq!(pixel_attribute(Some("wide")), None);
        assert_eq!(pixel_attribute(None), None);
    }

    #[test]
    fn test_empty_document_is_viewport_wide() {
        let tree = DomTree::new();
        let root = build_layout_tree(&tree, &StyleMap::new(), &LayoutConfig::default());
        assert_eq!(root.kind, BoxKind::Document);
        assert_eq!(root.rect.width, 1024.0);
        assert_eq!(root.rect.height, 0.0);
    }

    #[test]
    fn test_unstyled_block_takes_line_height() {
        let mut tree = DomTree::new();
        let div = tree.create_element(ElementData::new("div"));
        tree.append_child(tree.root(), div);
        let text = tree.create_text("hello");
        tree.append_child(div, text);

        let mut styles = StyleMap::new();
        let _ = styles.insert(
            div,
            ComputedStyle {
                display: DisplayValue::Block,
                ..ComputedStyle::default()
            },
        );
        let root = build_layout_tree(&tree, &styles, &LayoutConfig::default());
        let div_box = &root.children[0];
        assert_eq!(div_box.rect.width, 1024.0);
        // 16px font, 1.4 line height ratio.
        assert!((div_box.rect.height - 22.4).abs() < 1e-4);
        assert!(div_box.children[0].flags.text);
    }
}
