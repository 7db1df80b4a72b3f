//! Shared helpers: command execution, HTML escaping, MIME detection, paths.

pub mod exec;
pub mod html;
pub mod mime;
pub mod path;
