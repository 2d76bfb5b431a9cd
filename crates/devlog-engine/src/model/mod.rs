//! Canvas document model.
//!
//! A post is a [`Document`]: a title plus an ordered list of positioned
//! [`Block`]s. Blocks are mutated only through [`apply`], which merges a
//! partial [`BlockUpdate`] into the block with a matching id.

pub mod block;
pub mod document;
pub mod ids;
pub mod update;

pub use block::{Block, BlockKind, Dimension, Position, Size};
pub use document::{Document, Post, PostSummary, format_saved_at};
pub use ids::{BlockId, PostId};
pub use update::{BlockUpdate, PositionUpdate, apply};
