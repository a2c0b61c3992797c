//! CSS Flexbox Layout Algorithm.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! The engine is a pure function of the container and its items: every call
//! to [`FlexContainer::layout`] rebuilds the lines from the items and
//! overwrites the item outputs. It never touches the layout tree; the caller
//! copies [`FlexContainer::item_rect`] back onto its boxes.
//!
//! Supported: both axes and their `-reverse` forms, `flex-wrap`,
//! grow/shrink distribution, `justify-content`, `align-items`/`align-self`,
//! `align-content` and `row-gap`/`column-gap`. `baseline` aligns like
//! `flex-start`.

use serde::Serialize;

use crate::style::{
    AlignContent, AlignItems, AlignSelf, ComputedStyle, FlexDirection, FlexWrap, JustifyContent,
};
use crate::values::ResolveContext;

use super::box_model::Rect;

/// [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
///
/// One child of a flex container. Inputs are filled by the caller; outputs
/// are written by [`FlexContainer::layout`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlexItem {
    /// Caller-defined handle, typically the child's index.
    pub index: usize,
    /// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    /// The flex base size, as an outer size minus margins.
    pub flex_basis: f32,
    /// Hypothetical cross size before stretching.
    pub cross_size: f32,
    /// flex-grow factor.
    pub flex_grow: f32,
    /// flex-shrink factor.
    pub flex_shrink: f32,
    /// Margin before the item on the main axis.
    pub margin_main_start: f32,
    /// Margin after the item on the main axis.
    pub margin_main_end: f32,
    /// Margin before the item on the cross axis.
    pub margin_cross_start: f32,
    /// Margin after the item on the cross axis.
    pub margin_cross_end: f32,
    /// The item's `align-self`.
    pub align_self: AlignSelf,

    /// Output: offset of the item's main-start edge (inside its margin).
    pub main_pos: f32,
    /// Output: offset of the item's cross-start edge (inside its margin).
    pub cross_pos: f32,
    /// Output: used main size.
    pub main_size: f32,
    /// Output: used cross size.
    pub final_cross_size: f32,
}

impl FlexItem {
    /// An item with the given basis and grow/shrink factors and no margins.
    #[must_use]
    pub fn new(index: usize, flex_basis: f32, flex_grow: f32, flex_shrink: f32) -> Self {
        Self {
            index,
            flex_basis,
            flex_grow,
            flex_shrink,
            ..Self::default()
        }
    }

    fn outer_basis(&self) -> f32 {
        self.flex_basis + self.margin_main_start + self.margin_main_end
    }

    fn outer_main(&self) -> f32 {
        self.main_size + self.margin_main_start + self.margin_main_end
    }

    fn outer_cross(&self, size: f32) -> f32 {
        size + self.margin_cross_start + self.margin_cross_end
    }
}

/// [§ 6 Flex Lines](https://www.w3.org/TR/css-flexbox-1/#flex-lines)
///
/// "Flex items in a flex container are laid out and aligned within flex
/// lines, hypothetical containers used for grouping and alignment."
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlexLine {
    /// Positions in [`FlexContainer::items`], in placement order.
    pub items: Vec<usize>,
    /// Outer main size of the items plus gaps.
    pub main_size: f32,
    /// Cross size of the line.
    pub cross_size: f32,
    /// Offset of the line on the cross axis.
    pub cross_start: f32,
}

/// A flex container and its items for one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlexContainer {
    /// Inner main size.
    pub main_size: f32,
    /// Inner cross size, `None` when it follows from the lines.
    pub cross_size: Option<f32>,
    /// `flex-direction`.
    pub direction: FlexDirection,
    /// `flex-wrap`.
    pub wrap: FlexWrap,
    /// `justify-content`.
    pub justify_content: JustifyContent,
    /// `align-items`.
    pub align_items: AlignItems,
    /// `align-content`.
    pub align_content: AlignContent,
    /// Gap between items on the main axis.
    pub main_gap: f32,
    /// Gap between lines on the cross axis.
    pub cross_gap: f32,
    /// The items, in `order`-modified document order.
    pub items: Vec<FlexItem>,
    /// Output: the lines built by the last [`FlexContainer::layout`].
    pub lines: Vec<FlexLine>,
}

/// Start offset and inter-item spacing shared by `justify-content` and
/// `align-content`.
#[derive(Debug, Clone, Copy)]
enum Distribution {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl From<JustifyContent> for Distribution {
    fn from(value: JustifyContent) -> Self {
        match value {
            JustifyContent::FlexStart => Self::Start,
            JustifyContent::FlexEnd => Self::End,
            JustifyContent::Center => Self::Center,
            JustifyContent::SpaceBetween => Self::SpaceBetween,
            JustifyContent::SpaceAround => Self::SpaceAround,
            JustifyContent::SpaceEvenly => Self::SpaceEvenly,
        }
    }
}

impl Distribution {
    /// [§ 8.2 justify-content](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    ///
    /// Returns `(initial_offset, spacing)` for `count` items sharing `free` space.
    fn offsets(self, free: f32, count: usize) -> (f32, f32) {
        let free = free.max(0.0);
        if count == 0 {
            return (0.0, 0.0);
        }
        let n = count as f32;
        match self {
            Self::Start => (0.0, 0.0),
            Self::End => (free, 0.0),
            Self::Center => (free / 2.0, 0.0),
            // "If the leftover free-space is negative or there is only a
            // single flex item on the line, this value is identical to
            // flex-start."
            Self::SpaceBetween if count == 1 => (0.0, 0.0),
            Self::SpaceBetween => (0.0, free / (n - 1.0)),
            Self::SpaceAround => {
                let spacing = free / n;
                (spacing / 2.0, spacing)
            }
            Self::SpaceEvenly => {
                let spacing = free / (n + 1.0);
                (spacing, spacing)
            }
        }
    }
}

impl FlexContainer {
    /// A container configured from its computed style, with no items yet.
    /// Gaps resolve against `ctx`.
    #[must_use]
    pub fn from_style(
        style: &ComputedStyle,
        ctx: &ResolveContext,
        main_size: f32,
        cross_size: Option<f32>,
    ) -> Self {
        let row_gap = style.row_gap.resolve_height(ctx);
        let column_gap = style.column_gap.resolve(ctx);
        let (main_gap, cross_gap) = if style.flex_direction.is_row() {
            (column_gap, row_gap)
        } else {
            (row_gap, column_gap)
        };
        Self {
            main_size,
            cross_size,
            direction: style.flex_direction,
            wrap: style.flex_wrap,
            justify_content: style.justify_content,
            align_items: style.align_items,
            align_content: style.align_content,
            main_gap,
            cross_gap,
            items: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Append an item.
    pub fn add_item(&mut self, item: FlexItem) {
        self.items.push(item);
    }

    /// Run the flex layout algorithm over the current items.
    pub fn layout(&mut self) {
        self.lines.clear();
        if self.items.is_empty() {
            return;
        }

        // STEP 1: Axis determination. Items are stored in main/cross terms;
        // only `item_rect` maps them back to x/y. `-reverse` affects order
        // within each line, handled in step 4.

        // STEP 2: Collect items into lines.
        self.lines = self.collect_lines();

        // STEP 3: Resolve flexible lengths, line by line.
        for line in &self.lines {
            resolve_flexible_lengths(&mut self.items, &line.items, self.main_size, self.main_gap);
        }

        // STEP 4: Main-axis placement.
        let distribution = Distribution::from(self.justify_content);
        for line in &mut self.lines {
            if self.direction.is_reverse() {
                line.items.reverse();
            }
            place_main_axis(&mut self.items, line, self.main_size, self.main_gap, distribution);
        }

        // STEP 5: Cross sizes per line, then stretch.
        for line in &mut self.lines {
            line.cross_size = line
                .items
                .iter()
                .map(|&i| self.items[i].outer_cross(self.items[i].cross_size))
                .fold(0.0, f32::max);
        }

        // STEP 6: Cross-axis placement of lines, then of items within them.
        self.place_lines();
        for line in &self.lines {
            for &i in &line.items {
                let item = &mut self.items[i];
                let align = item.align_self.resolve(self.align_items);
                item.final_cross_size = if align == AlignItems::Stretch {
                    (line.cross_size - item.margin_cross_start - item.margin_cross_end).max(0.0)
                } else {
                    item.cross_size
                };
                let slack = line.cross_size - item.outer_cross(item.final_cross_size);
                let offset = match align {
                    AlignItems::FlexEnd => slack,
                    AlignItems::Center => slack / 2.0,
                    AlignItems::Stretch | AlignItems::FlexStart | AlignItems::Baseline => 0.0,
                };
                item.cross_pos = line.cross_start + offset + item.margin_cross_start;
            }
        }

        tracing::trace!(
            items = self.items.len(),
            lines = self.lines.len(),
            "flex layout"
        );
    }

    /// [§ 9.3 step 5](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
    ///
    /// "Collect flex items into flex lines: If the flex container is
    /// single-line, collect all the flex items into a single flex line."
    fn collect_lines(&self) -> Vec<FlexLine> {
        if self.wrap == FlexWrap::Nowrap {
            let items: Vec<usize> = (0..self.items.len()).collect();
            let main_size = self.outer_usage(&items, FlexItem::outer_basis);
            return vec![FlexLine {
                items,
                main_size,
                ..FlexLine::default()
            }];
        }

        // "Otherwise, starting from the first uncollected item, collect
        // consecutive items one by one until the first time that the next
        // collected item would not fit into the flex container's inner main
        // size."
        let mut lines: Vec<FlexLine> = Vec::new();
        let mut current = FlexLine::default();
        for (i, item) in self.items.iter().enumerate() {
            let mut size = item.outer_basis();
            if !current.items.is_empty() {
                size += self.main_gap;
            }
            if !current.items.is_empty() && current.main_size + size > self.main_size {
                lines.push(std::mem::take(&mut current));
                size = item.outer_basis();
            }
            current.main_size += size;
            current.items.push(i);
        }
        if !current.items.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn outer_usage(&self, items: &[usize], size: fn(&FlexItem) -> f32) -> f32 {
        items.iter().map(|&i| size(&self.items[i])).sum::<f32>() + gaps(items.len(), self.main_gap)
    }

    /// [§ 9.4 step 15](https://www.w3.org/TR/css-flexbox-1/#algo-line-align)
    ///
    /// "Align all flex lines per align-content."
    fn place_lines(&mut self) {
        let count = self.lines.len();
        let used: f32 = self.lines.iter().map(|l| l.cross_size).sum::<f32>() + gaps(count, self.cross_gap);
        let free = self.cross_size.map_or(0.0, |size| (size - used).max(0.0));

        let (start, spacing) = match self.align_content {
            AlignContent::Stretch => {
                // "Lines stretch to take up the remaining space."
                let extra = free / count as f32;
                for line in &mut self.lines {
                    line.cross_size += extra;
                }
                (0.0, 0.0)
            }
            AlignContent::FlexStart => Distribution::Start.offsets(free, count),
            AlignContent::FlexEnd => Distribution::End.offsets(free, count),
            AlignContent::Center => Distribution::Center.offsets(free, count),
            AlignContent::SpaceBetween => Distribution::SpaceBetween.offsets(free, count),
            AlignContent::SpaceAround => Distribution::SpaceAround.offsets(free, count),
            AlignContent::SpaceEvenly => Distribution::SpaceEvenly.offsets(free, count),
        };

        // `wrap-reverse` stacks lines from the cross-end edge.
        let reverse = self.wrap == FlexWrap::WrapReverse;
        let mut pos = start;
        let order: Vec<usize> = if reverse {
            (0..count).rev().collect()
        } else {
            (0..count).collect()
        };
        for i in order {
            self.lines[i].cross_start = pos;
            pos += self.lines[i].cross_size + self.cross_gap + spacing;
        }
    }

    /// Largest outer main size used by any line after layout.
    #[must_use]
    pub fn used_main_size(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| self.outer_usage(&line.items, FlexItem::outer_main))
            .fold(0.0, f32::max)
    }

    /// Total cross size of the lines after layout, including gaps.
    #[must_use]
    pub fn used_cross_size(&self) -> f32 {
        self.lines.iter().map(|l| l.cross_size).sum::<f32>() + gaps(self.lines.len(), self.cross_gap)
    }

    /// Position and size of an item relative to the container's content box,
    /// with main/cross mapped back to x/y.
    #[must_use]
    pub fn item_rect(&self, item: &FlexItem) -> Rect {
        if self.direction.is_row() {
            Rect {
                x: item.main_pos,
                y: item.cross_pos,
                width: item.main_size,
                height: item.final_cross_size,
            }
        } else {
            Rect {
                x: item.cross_pos,
                y: item.main_pos,
                width: item.final_cross_size,
                height: item.main_size,
            }
        }
    }
}

fn gaps(count: usize, gap: f32) -> f32 {
    count.saturating_sub(1) as f32 * gap
}

/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
///
/// Single-pass distribution: positive free space by `flex-grow`, negative
/// free space by `flex-shrink × flex-basis`. Sizes never go below 0.
fn resolve_flexible_lengths(items: &mut [FlexItem], line: &[usize], available: f32, gap: f32) {
    let used: f32 = line.iter().map(|&i| items[i].outer_basis()).sum::<f32>() + gaps(line.len(), gap);
    let free = available - used;

    for &i in line {
        items[i].main_size = items[i].flex_basis;
    }

    if free > 0.0 {
        // "Find the ratio of the item's flex grow factor to the sum of the
        // flex grow factors of all unfrozen items on the line."
        let total_grow: f32 = line.iter().map(|&i| items[i].flex_grow).sum();
        if total_grow > 0.0 {
            for &i in line {
                let item = &mut items[i];
                item.main_size = free.mul_add(item.flex_grow / total_grow, item.flex_basis);
            }
        }
    } else if free < 0.0 {
        // "For every unfrozen item on the line, multiply its flex shrink
        // factor by its inner flex base size, and note this as its scaled
        // flex shrink factor."
        let total_scaled: f32 = line
            .iter()
            .map(|&i| items[i].flex_shrink * items[i].flex_basis)
            .sum();
        if total_scaled > 0.0 {
            for &i in line {
                let item = &mut items[i];
                let ratio = item.flex_shrink * item.flex_basis / total_scaled;
                item.main_size = free.mul_add(ratio, item.flex_basis).max(0.0);
            }
        }
    }
}

/// [§ 9.5 Main-Axis Alignment](https://www.w3.org/TR/css-flexbox-1/#main-alignment)
fn place_main_axis(
    items: &mut [FlexItem],
    line: &mut FlexLine,
    available: f32,
    gap: f32,
    distribution: Distribution,
) {
    let used: f32 = line.items.iter().map(|&i| items[i].outer_main()).sum::<f32>() + gaps(line.items.len(), gap);
    line.main_size = used;

    let (start, spacing) = distribution.offsets(available - used, line.items.len());
    let mut pos = start;
    for &i in &line.items {
        let item = &mut items[i];
        item.main_pos = pos + item.margin_main_start;
        pos += item.outer_main() + gap + spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(main_size: f32, items: Vec<FlexItem>) -> FlexContainer {
        FlexContainer {
            main_size,
            items,
            ..FlexContainer::default()
        }
    }

    #[test]
    fn test_equal_grow_splits_space() {
        let mut flex = row(300.0, (0..3).map(|i| FlexItem::new(i, 0.0, 1.0, 1.0)).collect());
        flex.layout();
        let positions: Vec<(f32, f32)> = flex.items.iter().map(|i| (i.main_pos, i.main_size)).collect();
        assert_eq!(positions, vec![(0.0, 100.0), (100.0, 100.0), (200.0, 100.0)]);
    }

    #[test]
    fn test_zero_grow_keeps_basis() {
        let mut flex = row(300.0, vec![FlexItem::new(0, 50.0, 0.0, 1.0)]);
        flex.layout();
        assert_eq!(flex.items[0].main_size, 50.0);
    }

    #[test]
    fn test_shrink_weighted_by_basis() {
        let mut flex = row(
            150.0,
            vec![FlexItem::new(0, 100.0, 0.0, 1.0), FlexItem::new(1, 100.0, 0.0, 1.0)],
        );
        flex.layout();
        assert_eq!(flex.items[0].main_size, 75.0);
        assert_eq!(flex.items[1].main_pos, 75.0);
    }

    #[test]
    fn test_zero_shrink_overflows() {
        let mut flex = row(100.0, vec![FlexItem::new(0, 80.0, 0.0, 0.0), FlexItem::new(1, 80.0, 0.0, 0.0)]);
        flex.layout();
        assert_eq!(flex.items[1].main_size, 80.0);
        assert_eq!(flex.used_main_size(), 160.0);
    }

    #[test]
    fn test_justify_offsets() {
        assert_eq!(Distribution::End.offsets(90.0, 3), (90.0, 0.0));
        assert_eq!(Distribution::Center.offsets(90.0, 3), (45.0, 0.0));
        assert_eq!(Distribution::SpaceBetween.offsets(90.0, 3), (0.0, 45.0));
        assert_eq!(Distribution::SpaceBetween.offsets(90.0, 1), (0.0, 0.0));
        assert_eq!(Distribution::SpaceAround.offsets(90.0, 3), (15.0, 30.0));
        assert_eq!(Distribution::SpaceEvenly.offsets(80.0, 3), (20.0, 20.0));
        assert_eq!(Distribution::Center.offsets(-10.0, 3), (0.0, 0.0));
    }

    #[test]
    fn test_wrap_starts_new_line() {
        let mut flex = row(100.0, (0..3).map(|i| FlexItem::new(i, 40.0, 0.0, 1.0)).collect());
        flex.wrap = FlexWrap::Wrap;
        flex.main_gap = 10.0;
        flex.layout();
        assert_eq!(flex.lines.len(), 2);
        assert_eq!(flex.lines[0].items, vec![0, 1]);
        assert_eq!(flex.lines[1].items, vec![2]);
    }

    #[test]
    fn test_reverse_places_last_item_first() {
        let mut flex = row(300.0, (0..2).map(|i| FlexItem::new(i, 50.0, 0.0, 1.0)).collect());
        flex.direction = FlexDirection::RowReverse;
        flex.layout();
        assert_eq!(flex.items[1].main_pos, 0.0);
        assert_eq!(flex.items[0].main_pos, 50.0);
    }

    #[test]
    fn test_stretch_and_center_cross_axis() {
        let mut tall = FlexItem::new(0, 10.0, 0.0, 1.0);
        tall.cross_size = 80.0;
        let mut short = FlexItem::new(1, 10.0, 0.0, 1.0);
        short.cross_size = 20.0;
        let mut centered = FlexItem::new(2, 10.0, 0.0, 1.0);
        centered.cross_size = 20.0;
        centered.align_self = AlignSelf::Center;

        let mut flex = row(300.0, vec![tall, short, centered]);
        flex.layout();
        assert_eq!(flex.items[1].final_cross_size, 80.0);
        assert_eq!(flex.items[2].final_cross_size, 20.0);
        assert_eq!(flex.items[2].cross_pos, 30.0);
        assert_eq!(flex.used_cross_size(), 80.0);
    }

    #[test]
    fn test_column_maps_main_to_y() {
        let mut flex = row(200.0, vec![FlexItem::new(0, 50.0, 1.0, 1.0)]);
        flex.direction = FlexDirection::Column;
        flex.cross_size = Some(120.0);
        flex.layout();
        let rect = flex.item_rect(&flex.items[0]);
        assert_eq!((rect.width, rect.height), (120.0, 200.0));
    }
}
