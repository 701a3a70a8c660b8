/// Hex colour parsing
pub mod color;
/// Full-size composition and output
pub mod compose;
/// Reduced previews with element positions
pub mod preview;
/// Outline fonts and the built-in bitmap fallback
pub mod typeface;

pub use compose::Compositor;
pub use preview::Preview;
pub use typeface::Typeface;
