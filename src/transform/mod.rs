//! Markup transforms applied between rendering and PDF conversion.
//!
//! Both transforms degrade gracefully: an unreadable image or stylesheet is
//! logged and the markup passes through unchanged.

mod inline;
mod style;

pub use inline::inline_assets;
pub use style::inject_styles;
