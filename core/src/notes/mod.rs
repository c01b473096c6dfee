//! Note lifecycle primitives
//!
//! This module provides:
//! - **Duration policy**: pure predicates deciding which notes an event expires
//! - **Store**: the sanitizing wrapper over the host's flag storage
//! - **Errors**: the creation/cleanup error taxonomy

pub mod duration;
pub mod error;
pub mod store;

pub use error::{NoteError, SideEffectSkip};
pub use store::{NoteStore, StoreKey, resolve_store_owner};
