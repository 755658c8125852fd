//! Data model shared by every resolution stage.
//!
//! All entities are created fresh per resolution call and discarded after
//! the highlight is projected; nothing here is cached between calls.

mod citation;
mod fragment;
mod highlight;
mod matching;

pub use citation::*;
pub use fragment::*;
pub use highlight::*;
pub use matching::*;
