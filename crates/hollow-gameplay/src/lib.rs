//! # Hollow Gameplay
//!
//! Gameplay systems for Hollow.
//!
//! This crate provides the two simulation cores and the seams they talk through:
//! - Room records and pathway bookkeeping
//! - Procedural dungeon layout generation (main path plus branches)
//! - Room instantiation boundary and asset catalog
//! - Bed pool with exclusive assignment
//! - Day/night clock and sleep schedule
//! - Navigation interface
//! - Villager behaviour state machine

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod beds;
pub mod instantiate;
pub mod layout;
pub mod navigation;
pub mod room;
pub mod time;
pub mod villager;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::beds::*;
    pub use crate::instantiate::*;
    pub use crate::layout::*;
    pub use crate::navigation::*;
    pub use crate::room::*;
    pub use crate::time::*;
    pub use crate::villager::*;
}

pub use prelude::*;
