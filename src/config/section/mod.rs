//! Configuration section definitions for `docpress.toml`.

mod pdf;
mod templates;
mod watch;

pub use pdf::PdfConfig;
pub use templates::TemplatesConfig;
pub use watch::WatchConfig;
