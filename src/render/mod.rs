mod graph;

use anyhow::Result;

use crate::analysis::regions::Region;

pub use graph::PlottersRenderer;

/// Draws the aligned reference and user curves for the learner.
pub trait Renderer: Send + Sync {
    /// Render to an encoded image (PNG).
    fn render(
        &self,
        reference_aligned: &[f32],
        user_aligned: &[f32],
        regions: &[Region],
        title: &str,
    ) -> Result<Vec<u8>>;
}
