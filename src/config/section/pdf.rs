//! `[pdf]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pdf]
//! command = ["weasyprint", "--base-url", "{base_dir}", "-", "-"]
//! timeout_secs = 120
//! ```
//!
//! The converter reads HTML on stdin and writes the PDF to stdout.
//! `{base_dir}` expands to the directory relative references resolve against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Converter program followed by its arguments.
    pub command: Vec<String>,

    /// Kill the converter after this many seconds.
    pub timeout_secs: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            command: ["weasyprint", "--base-url", "{base_dir}", "-", "-"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: 120,
        }
    }
}
