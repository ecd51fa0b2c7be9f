//! Provenance stages
//!
//! The two [`crate::nodes::FrameHandoff`] implementations that give the
//! demonstration pipeline its semantics: [`EmbedStage`] stamps each
//! frame with the next sequence value, [`ExtractStage`] reads the stamp
//! back downstream to confirm lossless propagation.

mod embed;
mod extract;

pub use embed::EmbedStage;
pub use extract::ExtractStage;
