//! UI components for Trellis.
//!
//! Two cooperating pieces over the composition runtime: [`ConfigProvider`],
//! which merges caller overrides with inherited ambient configuration and
//! republishes it for a subtree, and [`List`], a paginated collection view
//! that derives its visible slice, keys its items, and adapts to the ambient
//! configuration. Collaborator widgets ([`Pager`], [`GridRow`], [`Spin`],
//! [`Empty`]) are narrow and presentational.

pub mod config_provider;
pub mod context;
pub mod list;
pub mod locale;
pub mod validate;
pub mod widgets;

pub use config_provider::{ConfigProvider, ConfigProviderProps};
pub use context::{
    local_component_size, local_config, ComponentSize, ConfigContext, Csp, Direction,
    EmptyRenderer, PageHeaderConfig, PopupContainerResolver, PrefixClsFn, SpaceConfig, SpaceSize,
    DEFAULT_PREFIX,
};
pub use list::{
    local_list_context, Breakpoint, GridConfig, ItemKey, ItemLayout, KeyedItem, List, ListContext,
    ListSize, ListSpec, Loading, PageState, PaginationConfig, PaginationMode, PaginationPosition,
    RowKey,
};
pub use locale::{
    local_locale, receive_legacy_locale, FormLocale, ListLocale, Locale, LocaleContextValue,
    LocaleOrigin,
};
pub use trellis_core::{Composition, MemoryApplier};
pub use trellis_macros::composable;
pub use validate::{local_validate_messages, FormConfig, ValidateMessages};
pub use widgets::{
    compose_node, Empty, GridRow, GridRowNode, Pager, PagerNode, PagerProps, Spin, SpinConfig,
    SpinNode, Text, TextNode, View, ViewNode, ViewSpec,
};
