//! Paginated collection view.
//!
//! [`List`] accepts a data source, a per-item render function, and a
//! pagination/grid configuration, and produces the structured tree: pager,
//! header, a loading-scoped body, footer, load-more. Pagination state lives
//! in a single shadow cell that interaction events always mutate; controlled
//! callers overlay their values at read time.

#![allow(non_snake_case)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use trellis_core::{
    compositionLocalOf, hash_key, useState, with_group, CompositionLocal,
    CompositionLocalProvider, MutableState, NodeId,
};

use crate::composable;
use crate::context::{local_config, ConfigContext};
use crate::locale::local_locale;
use crate::widgets::{GridRow, Pager, PagerProps, Spin, SpinConfig, Text, View, ViewSpec};

/// Minimum body height while loading with no content of its own.
const LOADING_PLACEHOLDER_MIN_HEIGHT: f32 = 53.0;

// ---------------------------------------------------------------------------
// Item identity
// ---------------------------------------------------------------------------

/// Identity of a rendered item. User keys and synthetic positional fallbacks
/// are kept apart so they can never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKey {
    User(String),
    Index(usize),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::User(key) => f.write_str(key),
            ItemKey::Index(index) => write!(f, "list-item-{index}"),
        }
    }
}

/// Caller-side key source: an extraction function or a field name looked up
/// through [`KeyedItem::key_field`].
pub enum RowKey<T> {
    Extract(Rc<dyn Fn(&T) -> Option<String>>),
    Field(String),
}

impl<T> RowKey<T> {
    pub fn extract(f: impl Fn(&T) -> Option<String> + 'static) -> Self {
        RowKey::Extract(Rc::new(f))
    }

    pub fn field(name: impl Into<String>) -> Self {
        RowKey::Field(name.into())
    }
}

impl<T> Clone for RowKey<T> {
    fn clone(&self) -> Self {
        match self {
            RowKey::Extract(f) => RowKey::Extract(Rc::clone(f)),
            RowKey::Field(name) => RowKey::Field(name.clone()),
        }
    }
}

/// Key lookup hooks an item type may implement. Both default to "no key";
/// the list then falls through to its synthetic positional key.
pub trait KeyedItem {
    /// The item's own key field, if it carries one.
    fn item_key(&self) -> Option<String> {
        None
    }

    /// Lookup of a named key field, used with [`RowKey::Field`].
    fn key_field(&self, _name: &str) -> Option<String> {
        None
    }
}

macro_rules! plain_keyed {
    ($($ty:ty),* $(,)?) => {
        $(impl KeyedItem for $ty {})*
    };
}

plain_keyed!(
    String, &'static str, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64,
);

fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|key| !key.is_empty())
}

/// Ordered key strategy chain: extraction function, configured field, the
/// item's own key, synthetic position. Each tier falls through on an empty
/// result.
fn resolve_key<T: KeyedItem>(row_key: Option<&RowKey<T>>, item: &T, index: usize) -> ItemKey {
    let configured = match row_key {
        Some(RowKey::Extract(f)) => non_empty(f(item)),
        Some(RowKey::Field(name)) => non_empty(item.key_field(name)),
        None => None,
    };
    match configured.or_else(|| non_empty(item.item_key())) {
        Some(key) => ItemKey::User(key),
        None => ItemKey::Index(index),
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Who owns the displayed page values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaginationMode {
    /// Caller values are authoritative for display; the shadow cell still
    /// tracks interactions so uncontrolled reads stay consistent.
    Controlled { current: usize, page_size: usize },
    /// The list owns the values, seeded from the defaults.
    Uncontrolled {
        default_current: usize,
        default_page_size: usize,
    },
}

impl Default for PaginationMode {
    fn default() -> Self {
        PaginationMode::Uncontrolled {
            default_current: 1,
            default_page_size: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaginationPosition {
    Top,
    #[default]
    Bottom,
    Both,
}

impl PaginationPosition {
    fn at_top(self) -> bool {
        matches!(self, PaginationPosition::Top | PaginationPosition::Both)
    }

    fn at_bottom(self) -> bool {
        matches!(self, PaginationPosition::Bottom | PaginationPosition::Both)
    }
}

pub type PageCallback = Rc<dyn Fn(usize, usize)>;

/// Pagination configuration. Every field is optional and independently
/// defaulted; a missing field never invalidates the rest.
#[derive(Clone)]
pub struct PaginationConfig {
    pub mode: PaginationMode,
    pub position: PaginationPosition,
    /// Overrides the data-source length for page math and the control.
    pub total: Option<usize>,
    pub simple: bool,
    pub disabled: bool,
    pub show_size_changer: bool,
    pub page_size_options: Vec<usize>,
    pub on_change: Option<PageCallback>,
    pub on_show_size_change: Option<PageCallback>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            mode: PaginationMode::default(),
            position: PaginationPosition::default(),
            total: None,
            simple: false,
            disabled: false,
            show_size_changer: false,
            page_size_options: vec![10, 20, 50, 100],
            on_change: None,
            on_show_size_change: None,
        }
    }
}

impl PaginationConfig {
    pub fn uncontrolled() -> Self {
        Self::default()
    }

    pub fn controlled(current: usize, page_size: usize) -> Self {
        Self {
            mode: PaginationMode::Controlled { current, page_size },
            ..Self::default()
        }
    }

    pub fn defaults(mut self, default_current: usize, default_page_size: usize) -> Self {
        self.mode = PaginationMode::Uncontrolled {
            default_current,
            default_page_size,
        };
        self
    }

    pub fn position(mut self, position: PaginationPosition) -> Self {
        self.position = position;
        self
    }

    pub fn total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn simple(mut self, simple: bool) -> Self {
        self.simple = simple;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn show_size_changer(mut self, show: bool) -> Self {
        self.show_size_changer = show;
        self
    }

    pub fn on_change(mut self, f: impl Fn(usize, usize) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    pub fn on_show_size_change(mut self, f: impl Fn(usize, usize) + 'static) -> Self {
        self.on_show_size_change = Some(Rc::new(f));
        self
    }
}

/// The single internal pagination cell: always the mutation target, whatever
/// the mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageState {
    pub current: usize,
    pub page_size: usize,
}

pub(crate) fn max_page(total: usize, page_size: usize) -> usize {
    debug_assert!(page_size > 0);
    total.div_ceil(page_size).max(1)
}

/// Clamp the display state downward to the last page. Never raises `current`
/// above 1 when the total is 0, and never writes the shadow cell.
pub(crate) fn clamp_display(mut state: PageState, total: usize) -> PageState {
    if state.current == 0 {
        state.current = 1;
    }
    let max = max_page(total, state.page_size);
    if state.current > max {
        state.current = max;
    }
    state
}

/// The contiguous window over the data source, or `None` when the window
/// start is out of bounds and the full source should show instead.
pub(crate) fn visible_window(len: usize, state: PageState) -> Option<std::ops::Range<usize>> {
    let start = state.current.saturating_sub(1).saturating_mul(state.page_size);
    if start >= len {
        return None;
    }
    Some(start..(start + state.page_size).min(len))
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

/// Grid configuration: a gutter plus a column count, optionally refined per
/// breakpoint. Viewport observation is a collaborator concern; the list only
/// carries the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridConfig {
    pub gutter: u32,
    pub column: Option<u32>,
    pub xs: Option<u32>,
    pub sm: Option<u32>,
    pub md: Option<u32>,
    pub lg: Option<u32>,
    pub xl: Option<u32>,
    pub xxl: Option<u32>,
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gutter(mut self, gutter: u32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    /// Columns for the given viewport breakpoint, falling back to the plain
    /// column count, then to 4.
    pub fn column_count(&self, breakpoint: Option<Breakpoint>) -> u32 {
        let per_breakpoint = breakpoint.and_then(|bp| match bp {
            Breakpoint::Xs => self.xs,
            Breakpoint::Sm => self.sm,
            Breakpoint::Md => self.md,
            Breakpoint::Lg => self.lg,
            Breakpoint::Xl => self.xl,
            Breakpoint::Xxl => self.xxl,
        });
        per_breakpoint.or(self.column).unwrap_or(4).max(1)
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ItemLayout {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListSize {
    #[default]
    Default,
    Large,
    Small,
}

/// Boolean or full spinner configuration; normalized before use.
#[derive(Clone, Debug, PartialEq)]
pub enum Loading {
    Flag(bool),
    Spin(SpinConfig),
}

impl Default for Loading {
    fn default() -> Self {
        Loading::Flag(false)
    }
}

impl Loading {
    pub fn normalize(&self) -> SpinConfig {
        match self {
            Loading::Flag(spinning) => SpinConfig {
                spinning: *spinning,
                tip: None,
            },
            Loading::Spin(config) => config.clone(),
        }
    }
}

/// Render-only flags derived from props and the ambient direction.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PresentationFlags {
    pub vertical: bool,
    pub size: ListSize,
    pub split: bool,
    pub bordered: bool,
    pub loading: bool,
    pub grid: bool,
    pub something_after_last_item: bool,
    pub rtl: bool,
}

impl PresentationFlags {
    pub(crate) fn class_list(&self, prefix: &str) -> SmallVec<[String; 8]> {
        let mut classes = SmallVec::new();
        classes.push(prefix.to_string());
        if self.vertical {
            classes.push(format!("{prefix}-vertical"));
        }
        match self.size {
            ListSize::Default => {}
            ListSize::Large => classes.push(format!("{prefix}-lg")),
            ListSize::Small => classes.push(format!("{prefix}-sm")),
        }
        if self.split {
            classes.push(format!("{prefix}-split"));
        }
        if self.bordered {
            classes.push(format!("{prefix}-bordered"));
        }
        if self.loading {
            classes.push(format!("{prefix}-loading"));
        }
        if self.grid {
            classes.push(format!("{prefix}-grid"));
        }
        if self.something_after_last_item {
            classes.push(format!("{prefix}-something-after-last-item"));
        }
        if self.rtl {
            classes.push(format!("{prefix}-rtl"));
        }
        classes
    }
}

/// Layout mode published to item components for the list subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ListContext {
    pub grid: Option<GridConfig>,
    pub item_layout: ItemLayout,
}

pub fn local_list_context() -> CompositionLocal<ListContext> {
    thread_local! {
        static LOCAL_LIST: RefCell<Option<CompositionLocal<ListContext>>> =
            const { RefCell::new(None) };
    }
    LOCAL_LIST.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(compositionLocalOf(ListContext::default));
        }
        opt.as_ref().unwrap().clone()
    })
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

pub type Content = Rc<dyn Fn()>;
pub type RenderItem<T> = Rc<dyn Fn(&T, usize)>;

/// Props for [`List`]. Every field is optional and independently defaulted.
pub struct ListSpec<T> {
    pub data_source: Vec<T>,
    pub render_item: Option<RenderItem<T>>,
    pub row_key: Option<RowKey<T>>,
    pub pagination: Option<PaginationConfig>,
    pub grid: Option<GridConfig>,
    pub item_layout: ItemLayout,
    pub size: ListSize,
    pub bordered: bool,
    pub split: bool,
    pub loading: Loading,
    pub header: Option<Content>,
    pub footer: Option<Content>,
    pub load_more: Option<Content>,
    pub children: Option<Content>,
    pub empty_text: Option<String>,
    pub class_name: Option<String>,
    pub prefix_cls: Option<String>,
}

impl<T> ListSpec<T> {
    pub fn new(data_source: Vec<T>) -> Self {
        Self {
            data_source,
            render_item: None,
            row_key: None,
            pagination: None,
            grid: None,
            item_layout: ItemLayout::default(),
            size: ListSize::default(),
            bordered: false,
            split: true,
            loading: Loading::default(),
            header: None,
            footer: None,
            load_more: None,
            children: None,
            empty_text: None,
            class_name: None,
            prefix_cls: None,
        }
    }

    pub fn render_item(mut self, f: impl Fn(&T, usize) + 'static) -> Self {
        self.render_item = Some(Rc::new(f));
        self
    }

    pub fn row_key(mut self, row_key: RowKey<T>) -> Self {
        self.row_key = Some(row_key);
        self
    }

    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn grid(mut self, grid: GridConfig) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn item_layout(mut self, layout: ItemLayout) -> Self {
        self.item_layout = layout;
        self
    }

    pub fn size(mut self, size: ListSize) -> Self {
        self.size = size;
        self
    }

    pub fn bordered(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Loading::Flag(loading);
        self
    }

    pub fn loading_with(mut self, config: SpinConfig) -> Self {
        self.loading = Loading::Spin(config);
        self
    }

    pub fn header(mut self, content: impl Fn() + 'static) -> Self {
        self.header = Some(Rc::new(content));
        self
    }

    pub fn footer(mut self, content: impl Fn() + 'static) -> Self {
        self.footer = Some(Rc::new(content));
        self
    }

    pub fn load_more(mut self, content: impl Fn() + 'static) -> Self {
        self.load_more = Some(Rc::new(content));
        self
    }

    pub fn children(mut self, content: impl Fn() + 'static) -> Self {
        self.children = Some(Rc::new(content));
        self
    }

    pub fn empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = Some(text.into());
        self
    }

    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    pub fn prefix_cls(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_cls = Some(prefix.into());
        self
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Paginated collection view. Returns the id of its root node.
#[composable]
pub fn List<T: KeyedItem + 'static>(spec: ListSpec<T>) -> NodeId {
    let config = local_config().current();
    let prefix = config.prefix_cls(Some("list"), spec.prefix_cls.as_deref());
    let rtl = config.is_rtl();

    // The shadow cell, seeded once per position. Events mutate it in every
    // mode; renders never write it.
    let seed = match spec.pagination.as_ref().map(|p| p.mode) {
        Some(PaginationMode::Controlled { current, page_size }) => PageState { current, page_size },
        Some(PaginationMode::Uncontrolled {
            default_current,
            default_page_size,
        }) => PageState {
            current: default_current,
            page_size: default_page_size,
        },
        None => PageState {
            current: 1,
            page_size: 10,
        },
    };
    let shadow = useState(move || seed);

    // Display merge: shadow first, controlled caller values on top.
    let mut display = shadow.value();
    if let Some(PaginationMode::Controlled { current, page_size }) =
        spec.pagination.as_ref().map(|p| p.mode)
    {
        display = PageState { current, page_size };
    }

    let mut paginate = spec.pagination.is_some();
    if paginate && display.page_size == 0 {
        log::warn!("list pagination disabled for this pass: page_size is 0");
        paginate = false;
    }

    let source_len = spec.data_source.len();
    let total = spec
        .pagination
        .as_ref()
        .and_then(|p| p.total)
        .unwrap_or(source_len);
    if paginate {
        display = clamp_display(display, total);
    }

    let window = if paginate {
        visible_window(source_len, display)
    } else {
        None
    };
    let window = window.unwrap_or(0..source_len);

    let spin = spec.loading.normalize();
    let flags = PresentationFlags {
        vertical: spec.item_layout == ItemLayout::Vertical,
        size: spec.size,
        split: spec.split,
        bordered: spec.bordered,
        loading: spin.spinning,
        grid: spec.grid.is_some(),
        something_after_last_item: spec.load_more.is_some() || paginate || spec.footer.is_some(),
        rtl,
    };
    let mut root_classes: Vec<String> = flags.class_list(&prefix).into_vec();
    if let Some(class) = spec.class_name.clone() {
        root_classes.push(class);
    }

    let on_change = pager_event(&shadow, spec.pagination.as_ref().and_then(|p| p.on_change.clone()));
    let on_show_size_change = pager_event(
        &shadow,
        spec.pagination
            .as_ref()
            .and_then(|p| p.on_show_size_change.clone()),
    );

    let list_context = ListContext {
        grid: spec.grid,
        item_layout: spec.item_layout,
    };

    View(ViewSpec::new().classes(root_classes), move || {
        CompositionLocalProvider(vec![local_list_context().provides(list_context)], move || {
            let pagination = spec.pagination.clone().unwrap_or_default();
            let position = pagination.position;

            if paginate && position.at_top() {
                with_group(hash_key(&"list-pager-top"), || {
                    render_pager(&prefix, &pagination, display, total, rtl, &on_change, &on_show_size_change);
                });
            }

            if let Some(header) = spec.header.clone() {
                with_group(hash_key(&"list-header"), || {
                    View(ViewSpec::new().class(format!("{prefix}-header")), || header());
                });
            }

            with_group(hash_key(&"list-body"), || {
                let spin = spin.clone();
                let spinning = spin.spinning;
                Spin(spin, || {
                    render_body(&spec, &config, &prefix, &window, spinning);
                    if let Some(children) = spec.children.as_ref() {
                        with_group(hash_key(&"list-extra-children"), || children());
                    }
                });
            });

            if let Some(footer) = spec.footer.clone() {
                with_group(hash_key(&"list-footer"), || {
                    View(ViewSpec::new().class(format!("{prefix}-footer")), || footer());
                });
            }

            if let Some(load_more) = spec.load_more.clone() {
                with_group(hash_key(&"list-load-more"), || load_more());
            } else if paginate && position.at_bottom() {
                with_group(hash_key(&"list-pager-bottom"), || {
                    render_pager(&prefix, &pagination, display, total, rtl, &on_change, &on_show_size_change);
                });
            }
        });
    })
}

/// Shadow-state write first, then the caller's handler, so the handler
/// always observes state that matches the next render.
fn pager_event(shadow: &MutableState<PageState>, caller: Option<PageCallback>) -> PageCallback {
    let shadow = shadow.clone();
    Rc::new(move |page, page_size| {
        shadow.set(PageState {
            current: page,
            page_size,
        });
        if let Some(caller) = caller.as_ref() {
            caller(page, page_size);
        }
    })
}

fn render_pager(
    prefix: &str,
    pagination: &PaginationConfig,
    display: PageState,
    total: usize,
    rtl: bool,
    on_change: &PageCallback,
    on_show_size_change: &PageCallback,
) {
    View(ViewSpec::new().class(format!("{prefix}-pagination")), || {
        Pager(PagerProps {
            current: display.current,
            page_size: display.page_size,
            total,
            disabled: pagination.disabled,
            simple: pagination.simple,
            show_size_changer: pagination.show_size_changer,
            page_size_options: pagination.page_size_options.clone(),
            rtl,
            on_change: Some(on_change.clone()),
            on_show_size_change: Some(on_show_size_change.clone()),
        });
    });
}

fn render_body<T: KeyedItem + 'static>(
    spec: &ListSpec<T>,
    config: &ConfigContext,
    prefix: &str,
    window: &std::ops::Range<usize>,
    spinning: bool,
) {
    let visible = &spec.data_source[window.clone()];

    if spinning {
        with_group(hash_key(&"list-placeholder"), || {
            View(
                ViewSpec::new()
                    .class(format!("{prefix}-placeholder"))
                    .min_height(LOADING_PLACEHOLDER_MIN_HEIGHT),
                || {},
            );
        });
    } else if !visible.is_empty() {
        with_group(hash_key(&"list-items"), || {
            if let Some(grid) = spec.grid {
                render_grid_items(spec, &grid, visible);
            } else {
                render_linear_items(spec, prefix, visible);
            }
        });
    } else if spec.children.is_none() {
        with_group(hash_key(&"list-empty"), || {
            View(ViewSpec::new().class(format!("{prefix}-empty-text")), || {
                if let Some(text) = spec.empty_text.clone() {
                    Text(text);
                } else if let Some(render_empty) = config.render_empty.clone() {
                    render_empty("List");
                } else if let Some(text) = locale_empty_text() {
                    Text(text);
                } else {
                    crate::widgets::Empty("List");
                }
            });
        });
    }
}

/// Empty text from the nearest published locale, when its bundle has a list
/// section.
fn locale_empty_text() -> Option<String> {
    local_locale()
        .current()
        .and_then(|value| value.locale.list)
        .map(|list| list.empty_text)
}

fn render_linear_items<T: KeyedItem + 'static>(spec: &ListSpec<T>, prefix: &str, visible: &[T]) {
    View(ViewSpec::new().class(format!("{prefix}-items")), || {
        for (index, item) in visible.iter().enumerate() {
            let key = resolve_key(spec.row_key.as_ref(), item, index).to_string();
            // Key the group so item state follows identity, then attach the
            // key to the first node the renderer produced.
            with_group(hash_key(&key), || {
                let ((), produced) = trellis_core::capture_nodes(|| {
                    if let Some(render_item) = spec.render_item.as_ref() {
                        render_item(item, index);
                    }
                });
                if let Some(&first) = produced.first() {
                    if let Err(err) = trellis_core::assign_node_key(first, Some(key.clone())) {
                        debug_assert!(false, "failed to key list item node: {err}");
                    }
                }
            });
        }
    });
}

fn render_grid_items<T: KeyedItem + 'static>(spec: &ListSpec<T>, grid: &GridConfig, visible: &[T]) {
    let columns = grid.column_count(None);
    let width_percent = 100.0 / columns as f32;
    GridRow(grid.gutter, || {
        for (index, item) in visible.iter().enumerate() {
            let key = resolve_key(spec.row_key.as_ref(), item, index).to_string();
            with_group(hash_key(&key), || {
                let cell = View(ViewSpec::new().width_percent(width_percent), || {
                    if let Some(render_item) = spec.render_item.as_ref() {
                        render_item(item, index);
                    }
                });
                if let Err(err) = trellis_core::assign_node_key(cell, Some(key.clone())) {
                    debug_assert!(false, "failed to key list grid cell: {err}");
                }
            });
        }
    });
}
