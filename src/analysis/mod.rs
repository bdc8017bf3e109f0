pub mod contour;
pub mod extractor;
pub mod feedback;
pub mod references;
pub mod regions;
pub mod score;
pub mod validation;
