//! Shared stylesheet injection (markup → markup).
//!
//! The stylesheet is read on every call so edits to it show up in the next
//! document without any invalidation step.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::{debug, log};

/// First closing head tag, any case.
static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

/// Insert the stylesheet at `stylesheet` as an inline `<style>` block right
/// before `</head>`.
///
/// Returns the markup unchanged when the stylesheet cannot be read or the
/// markup has no head-closing marker.
pub fn inject_styles(markup: &str, stylesheet: &Path) -> String {
    let Some(marker) = HEAD_CLOSE.find(markup) else {
        debug!("style"; "no </head> marker, skipping {}", stylesheet.display());
        return markup.to_string();
    };

    let css = match std::fs::read_to_string(stylesheet) {
        Ok(css) => css,
        Err(err) => {
            log!("style"; "skipping stylesheet `{}`: {}", stylesheet.display(), err);
            return markup.to_string();
        }
    };

    let block = style_block(&css);
    let mut out = String::with_capacity(markup.len() + block.len());
    out.push_str(&markup[..marker.start()]);
    out.push_str(&block);
    out.push_str(&markup[marker.start()..]);
    out
}

fn style_block(css: &str) -> String {
    // A literal `</style>` would close the block early.
    let css = css.replace("</style", "<\\/style");
    format!("<style>\n{}\n</style>\n", css.trim_end())
}
