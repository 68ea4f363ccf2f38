//! Match-3 board engine: pair detection, cascade resolution, scoring and playback sequencing.
//!
//! Game state is mutated eagerly by [`Session`]; every step also produces an [`ActionQueue`]
//! describing what changed, which a [`Sequencer`] plays back against an [`ActionSink`].

pub use action::*;
pub use detect::*;
pub use error::*;
pub use gem::*;
pub use generator::*;
pub use grid::*;
pub use level::*;
pub use resolve::*;
pub use rules::*;
pub use sequencer::*;
pub use session::*;
pub use types::*;

mod action;
mod detect;
mod error;
mod gem;
mod generator;
mod grid;
mod level;
mod resolve;
mod rules;
pub mod score;
mod sequencer;
mod session;
mod types;
