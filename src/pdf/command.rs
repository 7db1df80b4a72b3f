//! External converter process.
//!
//! Command arguments: `program args...` with `{base_dir}` substituted.
//! Markup is written to stdin and PDF bytes are read from stdout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::PdfConverter;
use crate::config::PdfConfig;
use crate::error::{PipelineError, Result};
use crate::utils::exec::Cmd;

/// Placeholder replaced by the document base directory.
const BASE_DIR_PLACEHOLDER: &str = "{base_dir}";

#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    pub fn new(command: &[String], timeout: Duration) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| PipelineError::Conversion("converter command is empty".into()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn from_config(config: &PdfConfig) -> Result<Self> {
        Self::new(&config.command, Duration::from_secs(config.timeout_secs))
    }

    /// Locate the converter executable on `PATH`.
    fn executable(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|e| {
            PipelineError::Conversion(format!("converter `{}` not found: {e}", self.program))
        })
    }

    fn expand_args(&self, base_dir: &Path) -> Vec<String> {
        let base = base_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(BASE_DIR_PLACEHOLDER, &base))
            .collect()
    }
}

impl PdfConverter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, markup: &str, base_dir: &Path) -> Result<Vec<u8>> {
        let executable = self.executable()?;

        let output = Cmd::new(&executable)
            .args(self.expand_args(base_dir))
            .cwd(base_dir)
            .stdin(markup)
            .timeout(self.timeout)
            .run()
            .map_err(|e| PipelineError::Conversion(format!("{e:#}")))?;

        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn converter(command: &[&str]) -> CommandConverter {
        let command: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        CommandConverter::new(&command, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_markup_piped_through_stdin() {
        let dir = TempDir::new().unwrap();
        let conv = converter(&["sh", "-c", "printf '%%PDF-1.4 '; cat"]);
        let bytes = conv.convert("<p>hi</p>", dir.path()).unwrap();
        assert_eq!(bytes, b"%PDF-1.4 <p>hi</p>");
    }

    #[test]
    fn test_base_dir_substituted() {
        let dir = TempDir::new().unwrap();
        let conv = converter(&["sh", "-c", "printf '%s' \"$0\"", "--base={base_dir}"]);
        let bytes = conv.convert("", dir.path()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("--base={}", dir.path().display())
        );
    }

    #[test]
    fn test_runs_in_base_dir() {
        let dir = TempDir::new().unwrap();
        let conv = converter(&["sh", "-c", "cat > /dev/null; pwd"]);
        let bytes = conv.convert("x", dir.path()).unwrap();
        let cwd = String::from_utf8(bytes).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(cwd.trim()).canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_missing_program_is_conversion_error() {
        let conv = converter(&["docpress-missing-converter"]);
        let err = conv.convert("", Path::new(".")).unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(ref m) if m.contains("not found")));
    }

    #[test]
    fn test_failure_carries_diagnostic() {
        let conv = converter(&["sh", "-c", "cat > /dev/null; echo 'bad markup' >&2; exit 1"]);
        let err = conv.convert("<p>", Path::new(".")).unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(ref m) if m.contains("bad markup")));
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandConverter::new(&[], Duration::from_secs(1)).is_err());
    }
}
