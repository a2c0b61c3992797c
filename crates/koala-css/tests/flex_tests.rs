//! Integration tests for the flexbox algorithm, both on detached
//! containers and through the full style and layout pipeline.

use koala_css::cascade::{apply_styles_to_tree, extract_stylesheets};
use koala_css::layout::{FlexContainer, FlexItem, LayoutBox, LayoutConfig, Rect, build_layout_tree};
use koala_css::style::{AlignItems, FlexDirection, FlexWrap, JustifyContent};
use koala_dom::DomTree;
use quickcheck_macros::quickcheck;

fn layout(html: &str) -> (DomTree, LayoutBox) {
    let tree = koala_html::parse(html);
    let styles = apply_styles_to_tree(&tree, &extract_stylesheets(&tree));
    let root = build_layout_tree(&tree, &styles, &LayoutConfig::default());
    (tree, root)
}

fn rect_of(tree: &DomTree, root: &LayoutBox, id: &str) -> Rect {
    let node = tree.get_element_by_id(id).unwrap();
    root.find_by_id(node).unwrap().rect
}

fn container(main_size: f32, items: Vec<FlexItem>) -> FlexContainer {
    FlexContainer {
        main_size,
        items,
        ..FlexContainer::default()
    }
}

#[test]
fn test_three_equal_items_share_the_row() {
    let mut flex = container(300.0, (0..3).map(|i| FlexItem::new(i, 0.0, 1.0, 1.0)).collect());
    flex.layout();
    for (i, item) in flex.items.iter().enumerate() {
        assert_eq!(item.main_size, 100.0);
        assert_eq!(item.main_pos, 100.0 * i as f32);
    }
}

#[test]
fn test_three_equal_items_through_the_pipeline() {
    let (tree, root) = layout(
        r#"<style>
            .row { display: flex; width: 300px; }
            .row div { flex: 1; height: 20px; }
        </style>
        <div class="row"><div id="a"></div><div id="b"></div><div id="c"></div></div>"#,
    );
    let rects = ["a", "b", "c"].map(|id| rect_of(&tree, &root, id));
    assert_eq!(rects.map(|r| r.x), [0.0, 100.0, 200.0]);
    assert_eq!(rects.map(|r| r.width), [100.0, 100.0, 100.0]);
    assert_eq!(rects[0].height, 20.0);
}

#[test]
fn test_grow_ratio_and_margins() {
    let mut flex = container(
        400.0,
        vec![
            FlexItem::new(0, 50.0, 1.0, 1.0),
            FlexItem {
                margin_main_start: 10.0,
                margin_main_end: 10.0,
                ..FlexItem::new(1, 50.0, 3.0, 1.0)
            },
        ],
    );
    flex.layout();
    // Free space 280: 70 to the first item, 210 to the second.
    assert_eq!(flex.items[0].main_size, 120.0);
    assert_eq!(flex.items[1].main_size, 260.0);
    assert_eq!(flex.items[1].main_pos, 130.0);
}

#[test]
fn test_gap_and_justify_space_between() {
    let mut flex = container(200.0, (0..3).map(|i| FlexItem::new(i, 40.0, 0.0, 1.0)).collect());
    flex.main_gap = 10.0;
    flex.justify_content = JustifyContent::SpaceBetween;
    flex.layout();
    let positions: Vec<f32> = flex.items.iter().map(|i| i.main_pos).collect();
    // 200 - 120 - 20 = 60 free, split into two 30px slots on top of the gap.
    assert_eq!(positions, vec![0.0, 80.0, 160.0]);
}

#[test]
fn test_justify_center_and_end() {
    let mut flex = container(100.0, vec![FlexItem::new(0, 40.0, 0.0, 1.0)]);
    flex.justify_content = JustifyContent::Center;
    flex.layout();
    assert_eq!(flex.items[0].main_pos, 30.0);

    flex.justify_content = JustifyContent::FlexEnd;
    flex.layout();
    assert_eq!(flex.items[0].main_pos, 60.0);
}

#[test]
fn test_wrap_reverse_stacks_lines_from_the_end() {
    let mut flex = container(
        100.0,
        (0..3)
            .map(|i| FlexItem {
                cross_size: 10.0,
                ..FlexItem::new(i, 60.0, 0.0, 1.0)
            })
            .collect(),
    );
    flex.wrap = FlexWrap::WrapReverse;
    flex.align_items = AlignItems::FlexStart;
    flex.layout();
    assert_eq!(flex.lines.len(), 3);
    assert_eq!(flex.items[0].cross_pos, 20.0);
    assert_eq!(flex.items[2].cross_pos, 0.0);
    assert_eq!(flex.used_cross_size(), 30.0);
}

#[test]
fn test_column_container_through_the_pipeline() {
    let (tree, root) = layout(
        r#"<div style="display: flex; flex-direction: column; width: 200px">
            <div id="a" style="height: 30px"></div>
            <div id="b" style="height: 50px; margin-top: 5px"></div>
        </div>"#,
    );
    let a = rect_of(&tree, &root, "a");
    let b = rect_of(&tree, &root, "b");
    assert_eq!((a.y, a.height, a.width), (0.0, 30.0, 200.0));
    assert_eq!((b.y, b.height), (35.0, 50.0));
    let outer = &root.children[0];
    assert_eq!(outer.rect.height, 85.0);
}

#[test]
fn test_order_property_reorders_items() {
    let (tree, root) = layout(
        r#"<div style="display: flex">
            <div id="first" style="width: 50px; order: 2"></div>
            <div id="second" style="width: 50px"></div>
        </div>"#,
    );
    assert_eq!(rect_of(&tree, &root, "second").x, 0.0);
    assert_eq!(rect_of(&tree, &root, "first").x, 50.0);
}

#[test]
fn test_align_items_center_in_a_tall_row() {
    let (tree, root) = layout(
        r#"<div style="display: flex; height: 100px; align-items: center">
            <div id="a" style="width: 10px; height: 20px"></div>
        </div>"#,
    );
    let a = rect_of(&tree, &root, "a");
    assert_eq!((a.y, a.height), (40.0, 20.0));
}

#[test]
fn test_relative_offset_applies_to_flex_items() {
    let (tree, root) = layout(
        r#"<div style="display: flex">
            <div id="a" style="width: 50px; height: 20px"></div>
            <div id="b" style="width: 50px; height: 20px; position: relative; left: 10px; top: 5px"></div>
        </div>"#,
    );
    let a = rect_of(&tree, &root, "a");
    let b = rect_of(&tree, &root, "b");
    assert_eq!((a.x, a.y), (0.0, 0.0));
    assert_eq!((b.x, b.y), (60.0, 5.0));
}

#[test]
fn test_deeply_nested_flex_containers_lay_out_quickly() {
    const DEPTH: usize = 30;
    let html = format!(
        "{}<span id=\"leaf\">x</span>{}",
        r#"<div style="display: flex">"#.repeat(DEPTH),
        "</div>".repeat(DEPTH)
    );

    let start = std::time::Instant::now();
    let (tree, root) = layout(&html);
    let elapsed = start.elapsed();

    assert!(elapsed.as_secs_f32() < 2.0, "layout took {elapsed:?}");
    let leaf = rect_of(&tree, &root, "leaf");
    assert_eq!((leaf.x, leaf.y), (0.0, 0.0));
    assert!(leaf.width > 0.0);
}

#[test]
fn test_item_rect_maps_axes() {
    let mut flex = container(100.0, vec![FlexItem::new(0, 40.0, 0.0, 1.0)]);
    flex.direction = FlexDirection::Column;
    flex.items[0].cross_size = 25.0;
    flex.align_items = AlignItems::FlexStart;
    flex.layout();
    let rect = flex.item_rect(&flex.items[0]);
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (0.0, 0.0, 25.0, 40.0));
}

/// With positive grow factors and room to spare, the items (plus gaps)
/// exactly fill a single-line container.
#[quickcheck]
fn prop_growing_items_fill_the_line(bases: Vec<u8>, grows: Vec<u8>, gap: u8) -> bool {
    if bases.is_empty() {
        return true;
    }
    let items: Vec<FlexItem> = bases
        .iter()
        .enumerate()
        .map(|(i, &basis)| {
            let grow = grows.get(i).map_or(1.0, |&g| f32::from(g % 5) + 1.0);
            FlexItem::new(i, f32::from(basis), grow, 1.0)
        })
        .collect();
    let gap = f32::from(gap % 20);
    let used: f32 = items.iter().map(|i| i.flex_basis).sum::<f32>() + gap * (items.len() - 1) as f32;
    let mut flex = container(used + 500.0, items);
    flex.main_gap = gap;
    flex.layout();

    let total: f32 = flex.items.iter().map(|i| i.main_size).sum::<f32>() + gap * (flex.items.len() - 1) as f32;
    (total - flex.main_size).abs() <= 1e-2 * flex.main_size.max(1.0)
}
