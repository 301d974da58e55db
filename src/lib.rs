//! # ref-hub
//!
//! An in-process reference registry: a keyed store of arbitrary values
//! ("refs") supporting retrieval-before-availability. Callers may ask for a
//! value that does not exist yet and receive a callback when it eventually
//! appears, is replaced, or is removed. Useful as a lightweight
//! cross-component hub (service locator + event bus) inside one process.
//!
//! The core surface lives on [`RefHub`]: reads (`get_ref`, `get_ref_with`,
//! `get_refs`, `get_next_ref`, `get_remove_ref`), writes (`set_ref`,
//! `set_ref_with_ttl`), removals (`unset_ref`, `unset_all`), named channels
//! (`create_channel`) and durable observers (`observe_ref`). Future-returning
//! adapters (`when_ref`, `when_next_ref`, `when_unset_ref`) and the
//! property-style [`RefProxy`] sit on top of the callback protocol.

mod adapter;
mod config;
mod constants;
mod core;
mod errors;

pub use core::*;

pub use adapter::*;
pub use config::*;
pub use errors::*;
