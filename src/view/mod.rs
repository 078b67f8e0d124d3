//! Renderer-neutral view models.
//!
//! The web UI and the terminal client both render from these structures; the
//! core never touches a DOM. Mutations bump revision counters so tests (and
//! renderers) can tell whether anything visible changed.

pub mod pagination;
pub mod panel;
pub mod table;

pub use pagination::Pagination;
pub use panel::{PanelState, Panels};
pub use table::{Keyed, KeyedTable};
