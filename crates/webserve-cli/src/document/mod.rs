//! Turning build output into the served HTML document.
//!
//! [`compose`] is pure: it only depends on the template text and the slot
//! values. [`inline_assets`] reads the assets subtree and runs after
//! composition in inline mode.

mod compose;
mod inline;

pub use compose::{FETCH_SHIM, Marker, RELOAD_CLIENT, SlotValues, compose};
pub use inline::{InlineOutcome, inline_assets};
