//! Per-dimension layer content and the combinators that build it.
//!
//! Each dimension has its own content type:
//!
//! - [`SymbolicExpr`] for the semantic and logical dimensions
//! - [`Timeline`] for the temporal dimension
//! - [`SpatialShape`] for the spatial dimension
//! - [`EmotionVector`] for the emotional dimension
//!
//! Every content type has an identity value (its [`Default`]) that stands in
//! for "no contribution", so each dimension of a message is always populated.

mod emotional;
mod spatial;
mod symbolic;
mod temporal;

pub use emotional::EmotionVector;
pub use spatial::SpatialShape;
pub use symbolic::SymbolicExpr;
pub use temporal::{TemporalEvent, Timeline};

pub(crate) use emotional::EmotionalLayer;
pub(crate) use spatial::SpatialLayer;
pub(crate) use symbolic::SymbolicLayer;
pub(crate) use temporal::TemporalLayer;

use kspk_core::Dimension;

use crate::compose::NodeContext;

/// Combinator for one dimension.
///
/// The compositor calls [`Layer::combine`] once per node in post-order, with
/// the node and the already combined content of its children in source order.
pub(crate) trait Layer {
    type Content: Default;

    fn dimension(&self) -> Dimension;

    /// Combine the children's content with the node's own contribution.
    fn combine(&mut self, node: &NodeContext<'_>, children: Vec<Self::Content>) -> Self::Content;

    /// Whether the node itself adds anything to this dimension.
    fn contributes(&self, node: &NodeContext<'_>) -> bool {
        node.weight(self.dimension()) != 0.0
    }
}
