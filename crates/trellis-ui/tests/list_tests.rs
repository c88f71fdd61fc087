//! End-to-end list behavior driven through the headless test rule.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trellis_core::{Applier, MemoryApplier};
use trellis_testing::{find_by_kind, find_nodes, run_test_composition, ComposeTestRule};
use trellis_ui::{
    ConfigProvider, ConfigProviderProps, GridConfig, GridRowNode, ItemLayout, KeyedItem, List,
    ListLocale, ListSpec, Locale, PagerNode, PaginationConfig, PaginationPosition, RowKey, Text,
    TextNode, ViewNode,
};

#[derive(Clone)]
struct Item {
    key: Option<String>,
    id: String,
    label: String,
}

impl Item {
    fn new(label: &str) -> Self {
        Self {
            key: Some(label.to_string()),
            id: format!("id-{label}"),
            label: label.to_string(),
        }
    }

    fn keyless(label: &str) -> Self {
        Self {
            key: None,
            id: format!("id-{label}"),
            label: label.to_string(),
        }
    }
}

impl KeyedItem for Item {
    fn item_key(&self) -> Option<String> {
        self.key.clone()
    }

    fn key_field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            _ => None,
        }
    }
}

fn items(labels: &[&str]) -> Vec<Item> {
    labels.iter().map(|label| Item::new(label)).collect()
}

fn render_label(item: &Item, _index: usize) {
    Text(item.label.clone());
}

fn view_with_class(applier: &MemoryApplier, class: &str) -> Vec<usize> {
    find_nodes(applier, |node| {
        node.as_any()
            .downcast_ref::<ViewNode>()
            .is_some_and(|view| view.has_class(class))
    })
}

/// Labels of the item nodes under the `<prefix>-items` container, in order.
fn visible_texts(rule: &mut ComposeTestRule) -> Vec<String> {
    let applier = rule.applier_mut();
    let containers = view_with_class(&applier, "trellis-list-items");
    let Some(&container) = containers.first() else {
        return Vec::new();
    };
    applier
        .children(container)
        .iter()
        .filter_map(|&id| {
            applier
                .with_node::<TextNode, _>(id, |text| text.text.clone())
                .ok()
        })
        .collect()
}

fn item_keys(rule: &mut ComposeTestRule) -> Vec<String> {
    let applier = rule.applier_mut();
    let containers = view_with_class(&applier, "trellis-list-items");
    let Some(&container) = containers.first() else {
        return Vec::new();
    };
    applier
        .children(container)
        .iter()
        .filter_map(|&id| applier.node(id).and_then(|n| n.assigned_key().map(str::to_string)))
        .collect()
}

fn emit_page_change(rule: &mut ComposeTestRule, page: usize, page_size: usize) {
    let applier = rule.applier_mut();
    let pagers = find_by_kind(&applier, "pager");
    let &pager = pagers.first().expect("no pager mounted");
    applier
        .with_node::<PagerNode, _>(pager, |node| node.emit_change(page, page_size))
        .unwrap();
    drop(applier);
    rule.pump_until_idle().unwrap();
}

#[test]
fn pagination_walks_pages_and_reclamps_after_shrink() {
    let data: Rc<RefCell<Vec<Item>>> = Rc::new(RefCell::new(items(&["a", "b", "c"])));
    let content_data = Rc::clone(&data);
    let mut rule = run_test_composition(move || {
        List(
            ListSpec::new(content_data.borrow().clone())
                .render_item(render_label)
                .pagination(PaginationConfig::uncontrolled().defaults(1, 2)),
        );
    });
    assert_eq!(visible_texts(&mut rule), vec!["a", "b"]);

    emit_page_change(&mut rule, 2, 2);
    assert_eq!(visible_texts(&mut rule), vec!["c"]);

    // Shrink while the shadow state says page 2: display reclamps to page 1.
    *data.borrow_mut() = items(&["a"]);
    rule.recomposition().unwrap();
    assert_eq!(visible_texts(&mut rule), vec!["a"]);
    let applier = rule.applier_mut();
    let pagers = find_by_kind(&applier, "pager");
    applier
        .with_node::<PagerNode, _>(pagers[0], |node| assert_eq!(node.current, 1))
        .unwrap();
}

#[test]
fn visible_slice_length_follows_the_window() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b", "c", "d", "e"]))
                .render_item(render_label)
                .pagination(PaginationConfig::uncontrolled().defaults(2, 3)),
        );
    });
    // n = 5, p = 3, current = 2: min(3, 5 - 3) = 2 items.
    assert_eq!(visible_texts(&mut rule), vec!["d", "e"]);
}

#[test]
fn stale_current_is_clamped_down_for_display() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b", "c", "d", "e"]))
                .render_item(render_label)
                .pagination(PaginationConfig::uncontrolled().defaults(9, 2)),
        );
    });
    // max page is 3; the stale 9 clamps down and the last page shows.
    assert_eq!(visible_texts(&mut rule), vec!["e"]);
    let applier = rule.applier_mut();
    let pagers = find_by_kind(&applier, "pager");
    applier
        .with_node::<PagerNode, _>(pagers[0], |node| assert_eq!(node.current, 3))
        .unwrap();
}

#[test]
fn disabled_pagination_renders_the_full_source() {
    let labels: Vec<String> = (0..500).map(|i| format!("row-{i}")).collect();
    let data: Vec<Item> = labels.iter().map(|l| Item::keyless(l)).collect();
    let mut rule = run_test_composition(move || {
        List(ListSpec::new(data.clone()).render_item(render_label));
    });
    assert_eq!(visible_texts(&mut rule).len(), 500);
    let applier = rule.applier_mut();
    assert!(find_by_kind(&applier, "pager").is_empty());
    let root = view_with_class(&applier, "trellis-list")[0];
    applier
        .with_node::<ViewNode, _>(root, |view| {
            assert!(!view.has_class("trellis-list-something-after-last-item"));
        })
        .unwrap();
}

#[test]
fn key_extraction_function_takes_precedence() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b"]))
                .render_item(render_label)
                .row_key(RowKey::extract(|item: &Item| Some(format!("fn-{}", item.label)))),
        );
    });
    assert_eq!(item_keys(&mut rule), vec!["fn-a", "fn-b"]);
}

#[test]
fn key_field_is_used_without_a_function() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b"]))
                .render_item(render_label)
                .row_key(RowKey::field("id")),
        );
    });
    assert_eq!(item_keys(&mut rule), vec!["id-a", "id-b"]);
}

#[test]
fn item_key_is_used_without_row_key() {
    let mut rule = run_test_composition(|| {
        List(ListSpec::new(items(&["a", "b"])).render_item(render_label));
    });
    assert_eq!(item_keys(&mut rule), vec!["a", "b"]);
}

#[test]
fn synthetic_keys_fall_back_to_slice_position() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(vec![Item::keyless("a"), Item::keyless("b")])
                .render_item(render_label),
        );
    });
    assert_eq!(item_keys(&mut rule), vec!["list-item-0", "list-item-1"]);
}

#[test]
fn loading_swaps_body_for_placeholder_and_keeps_extra_children() {
    let loading = Rc::new(Cell::new(false));
    let content_loading = Rc::clone(&loading);
    let mut rule = run_test_composition(move || {
        List(
            ListSpec::new(items(&["a", "b"]))
                .render_item(render_label)
                .loading(content_loading.get())
                .children(|| {
                    Text("extra");
                }),
        );
    });
    assert_eq!(visible_texts(&mut rule), vec!["a", "b"]);

    loading.set(true);
    rule.recomposition().unwrap();
    assert!(visible_texts(&mut rule).is_empty());
    let applier = rule.applier_mut();
    let placeholders = view_with_class(&applier, "trellis-list-placeholder");
    assert_eq!(placeholders.len(), 1);
    applier
        .with_node::<ViewNode, _>(placeholders[0], |view| {
            assert_eq!(view.min_height, Some(53.0));
        })
        .unwrap();
    let extra = find_nodes(&applier, |node| {
        node.as_any()
            .downcast_ref::<TextNode>()
            .is_some_and(|text| text.text == "extra")
    });
    assert_eq!(extra.len(), 1);
}

#[test]
fn controlled_values_win_but_shadow_keeps_tracking() {
    let controlled = Rc::new(Cell::new(true));
    let caller_seen: Rc<RefCell<Vec<(usize, usize)>>> = Rc::default();
    let content_controlled = Rc::clone(&controlled);
    let content_seen = Rc::clone(&caller_seen);
    let mut rule = run_test_composition(move || {
        let pagination = if content_controlled.get() {
            let seen = Rc::clone(&content_seen);
            PaginationConfig::controlled(1, 2).on_change(move |page, size| {
                seen.borrow_mut().push((page, size));
            })
        } else {
            PaginationConfig::uncontrolled()
        };
        List(
            ListSpec::new(items(&["a", "b", "c", "d"]))
                .render_item(render_label)
                .pagination(pagination),
        );
    });
    assert_eq!(visible_texts(&mut rule), vec!["a", "b"]);

    // The caller never re-renders with a new `current`, so display stays on
    // page 1, but the shadow cell and the caller's handler both saw the event.
    emit_page_change(&mut rule, 2, 2);
    assert_eq!(visible_texts(&mut rule), vec!["a", "b"]);
    assert_eq!(*caller_seen.borrow(), vec![(2, 2)]);

    // Dropping the controlled override surfaces the tracked shadow state.
    controlled.set(false);
    rule.recomposition().unwrap();
    assert_eq!(visible_texts(&mut rule), vec!["c", "d"]);
}

#[test]
fn size_change_events_update_both_fields() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b", "c", "d", "e"]))
                .render_item(render_label)
                .pagination(PaginationConfig::uncontrolled().defaults(1, 2).show_size_changer(true)),
        );
    });
    let applier = rule.applier_mut();
    let pagers = find_by_kind(&applier, "pager");
    applier
        .with_node::<PagerNode, _>(pagers[0], |node| {
            assert!(node.show_size_changer);
            node.emit_size_change(1, 4);
        })
        .unwrap();
    drop(applier);
    rule.pump_until_idle().unwrap();
    assert_eq!(visible_texts(&mut rule), vec!["a", "b", "c", "d"]);
}

#[test]
fn zero_page_size_falls_back_to_no_pagination() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b", "c"]))
                .render_item(render_label)
                .pagination(PaginationConfig::controlled(1, 0)),
        );
    });
    assert_eq!(visible_texts(&mut rule), vec!["a", "b", "c"]);
    assert!(find_by_kind(&rule.applier_mut(), "pager").is_empty());
}

#[test]
fn grid_mode_wraps_items_in_keyed_cells() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a", "b", "c"]))
                .render_item(render_label)
                .grid(GridConfig::new().gutter(16).column(2)),
        );
    });
    let applier = rule.applier_mut();
    let rows = find_by_kind(&applier, "grid-row");
    assert_eq!(rows.len(), 1);
    applier
        .with_node::<GridRowNode, _>(rows[0], |row| assert_eq!(row.gutter, 16))
        .unwrap();
    let cells: Vec<usize> = applier.children(rows[0]).to_vec();
    assert_eq!(cells.len(), 3);
    for (index, &cell) in cells.iter().enumerate() {
        let label = ["a", "b", "c"][index];
        assert_eq!(applier.node(cell).unwrap().assigned_key(), Some(label));
        applier
            .with_node::<ViewNode, _>(cell, |view| assert_eq!(view.width_percent, Some(50.0)))
            .unwrap();
    }
    drop(applier);
    let root = view_with_class(&rule.applier_mut(), "trellis-list-grid");
    assert_eq!(root.len(), 1);
}

#[test]
fn tree_order_header_body_footer_and_pager_positions() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a"]))
                .render_item(render_label)
                .header(|| {
                    Text("head");
                })
                .footer(|| {
                    Text("foot");
                })
                .pagination(
                    PaginationConfig::uncontrolled()
                        .defaults(1, 10)
                        .position(PaginationPosition::Both),
                ),
        );
    });
    let applier = rule.applier_mut();
    let root = view_with_class(&applier, "trellis-list")[0];
    let kinds: Vec<String> = applier
        .children(root)
        .iter()
        .map(|&id| {
            applier
                .with_node::<ViewNode, _>(id, |view| view.classes.join(" "))
                .unwrap_or_else(|_| applier.node(id).unwrap().kind().to_string())
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "trellis-list-pagination",
            "trellis-list-header",
            "spin",
            "trellis-list-footer",
            "trellis-list-pagination",
        ]
    );
}

#[test]
fn load_more_replaces_the_bottom_pager() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a"]))
                .render_item(render_label)
                .load_more(|| {
                    Text("load more");
                })
                .pagination(PaginationConfig::uncontrolled()),
        );
    });
    let applier = rule.applier_mut();
    assert!(find_by_kind(&applier, "pager").is_empty());
    let more = find_nodes(&applier, |node| {
        node.as_any()
            .downcast_ref::<TextNode>()
            .is_some_and(|text| text.text == "load more")
    });
    assert_eq!(more.len(), 1);
}

#[test]
fn empty_source_renders_the_empty_state() {
    let mut rule = run_test_composition(|| {
        List(ListSpec::new(Vec::<Item>::new()).render_item(render_label));
    });
    let applier = rule.applier_mut();
    assert_eq!(view_with_class(&applier, "trellis-list-empty-text").len(), 1);
    assert_eq!(view_with_class(&applier, "trellis-empty").len(), 1);
    let no_data = find_nodes(&applier, |node| {
        node.as_any()
            .downcast_ref::<TextNode>()
            .is_some_and(|text| text.text == "No data")
    });
    assert_eq!(no_data.len(), 1);
}

#[test]
fn empty_text_override_beats_the_builtin() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(Vec::<Item>::new())
                .render_item(render_label)
                .empty_text("nothing here"),
        );
    });
    let applier = rule.applier_mut();
    assert!(view_with_class(&applier, "trellis-empty").is_empty());
    let custom = find_nodes(&applier, |node| {
        node.as_any()
            .downcast_ref::<TextNode>()
            .is_some_and(|text| text.text == "nothing here")
    });
    assert_eq!(custom.len(), 1);
}

#[test]
fn ambient_locale_supplies_the_empty_text() {
    let mut rule = run_test_composition(|| {
        let locale = Locale {
            locale: "fr".to_string(),
            list: Some(ListLocale {
                empty_text: "Aucune donnee".to_string(),
            }),
            form: None,
        };
        ConfigProvider(ConfigProviderProps::new().locale(locale), || {
            List(ListSpec::new(Vec::<Item>::new()).render_item(render_label));
        });
    });
    let applier = rule.applier_mut();
    assert!(view_with_class(&applier, "trellis-empty").is_empty());
    let localized = find_nodes(&applier, |node| {
        node.as_any()
            .downcast_ref::<TextNode>()
            .is_some_and(|text| text.text == "Aucune donnee")
    });
    assert_eq!(localized.len(), 1);
}

#[test]
fn missing_render_item_renders_no_item_nodes() {
    let mut rule = run_test_composition(|| {
        List(ListSpec::new(items(&["a", "b"])));
    });
    assert!(visible_texts(&mut rule).is_empty());
    // The items container mounts; nothing is attached under it.
    let applier = rule.applier_mut();
    let containers = view_with_class(&applier, "trellis-list-items");
    assert_eq!(containers.len(), 1);
    assert!(applier.children(containers[0]).is_empty());
}

#[test]
fn item_renderers_observe_the_published_list_context() {
    let seen: Rc<RefCell<Vec<trellis_ui::ListContext>>> = Rc::default();
    let content_seen = Rc::clone(&seen);
    run_test_composition(move || {
        let seen = Rc::clone(&content_seen);
        List(
            ListSpec::new(items(&["a"]))
                .grid(GridConfig::new().column(2))
                .item_layout(ItemLayout::Vertical)
                .render_item(move |_, _| {
                    seen.borrow_mut()
                        .push(trellis_ui::local_list_context().current());
                }),
        );
    });
    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].grid, Some(GridConfig::new().column(2)));
    assert_eq!(seen[0].item_layout, ItemLayout::Vertical);
}

#[test]
fn vertical_layout_and_size_show_in_the_class_list() {
    let mut rule = run_test_composition(|| {
        List(
            ListSpec::new(items(&["a"]))
                .render_item(render_label)
                .item_layout(ItemLayout::Vertical)
                .size(trellis_ui::ListSize::Large)
                .bordered(true)
                .class_name("caller-class"),
        );
    });
    let applier = rule.applier_mut();
    let root = view_with_class(&applier, "trellis-list")[0];
    applier
        .with_node::<ViewNode, _>(root, |view| {
            assert!(view.has_class("trellis-list-vertical"));
            assert!(view.has_class("trellis-list-lg"));
            assert!(view.has_class("trellis-list-bordered"));
            assert!(view.has_class("trellis-list-split"));
            assert!(view.has_class("caller-class"));
        })
        .unwrap();
}
