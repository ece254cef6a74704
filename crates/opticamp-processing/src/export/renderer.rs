//! Rendering HTML documents to PDF with an external executable.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::Builder;
use thiserror::Error;
use tracing::{debug, info};

/// Rendering failures. None of them aborts an analysis.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Rendering executable not found at: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("Rendering executable is not executable: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Rendering failed with {}: {message}", .executable.display())]
    ProcessFailed { executable: PathBuf, message: String },

    #[error("Rendered document is empty or corrupt ({size} bytes). Check the executable at: {}", .executable.display())]
    EmptyOutput { executable: PathBuf, size: usize },

    #[error("Temporary file error: {0}")]
    TempFile(#[from] std::io::Error),
}

impl RenderError {
    /// Stable error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ExecutableNotFound(_) => "RENDERER_NOT_FOUND",
            Self::PermissionDenied(_) => "RENDERER_NOT_EXECUTABLE",
            Self::ProcessFailed { .. } => "RENDER_FAILED",
            Self::EmptyOutput { .. } => "RENDER_EMPTY_OUTPUT",
            Self::TempFile(_) => "RENDER_IO_ERROR",
        }
    }
}

/// Turns an HTML document into a binary document.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}

/// Renderer backed by the `wkhtmltopdf` executable.
///
/// The HTML and the output go through uniquely named temporary files that
/// are removed when rendering returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    executable: PathBuf,
    min_bytes: usize,
}

impl WkhtmltopdfRenderer {
    pub fn new(executable: impl Into<PathBuf>, min_bytes: usize) -> Self {
        Self {
            executable: executable.into(),
            min_bytes,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn check_executable(&self) -> Result<(), RenderError> {
        if !self.executable.is_file() {
            return Err(RenderError::ExecutableNotFound(self.executable.clone()));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&self.executable)?.permissions().mode();
            if mode & 0o111 == 0 {
                return Err(RenderError::PermissionDenied(self.executable.clone()));
            }
        }

        Ok(())
    }
}

impl DocumentRenderer for WkhtmltopdfRenderer {
    fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        self.check_executable()?;

        let mut html_file = Builder::new()
            .prefix("opticamp-")
            .suffix(".html")
            .tempfile()?;
        html_file.write_all(html.as_bytes())?;
        html_file.flush()?;

        let output_file = Builder::new()
            .prefix("opticamp-")
            .suffix(".pdf")
            .tempfile()?;

        debug!(
            "Rendering {} -> {}",
            html_file.path().display(),
            output_file.path().display()
        );

        let output = Command::new(&self.executable)
            .arg("--quiet")
            .arg("--encoding")
            .arg("utf-8")
            .arg(html_file.path())
            .arg(output_file.path())
            .output()
            .map_err(|e| RenderError::ProcessFailed {
                executable: self.executable.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RenderError::ProcessFailed {
                executable: self.executable.clone(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let bytes = fs::read(output_file.path())?;
        if bytes.len() < self.min_bytes {
            return Err(RenderError::EmptyOutput {
                executable: self.executable.clone(),
                size: bytes.len(),
            });
        }

        info!("Rendered document: {} bytes", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable() {
        let renderer = WkhtmltopdfRenderer::new("/nonexistent/wkhtmltopdf", 1000);
        let err = renderer.render("<html></html>").unwrap_err();
        assert!(matches!(err, RenderError::ExecutableNotFound(_)));
        assert_eq!(err.error_code(), "RENDERER_NOT_FOUND");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str, mode: u32) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
            path
        }

        #[test]
        fn test_not_executable() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(dir.path(), "render", "exit 0", 0o644);
            let err = WkhtmltopdfRenderer::new(path, 1000)
                .render("<html></html>")
                .unwrap_err();
            assert!(matches!(err, RenderError::PermissionDenied(_)));
        }

        #[test]
        fn test_process_failure() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(dir.path(), "render", "echo broken >&2\nexit 3", 0o755);
            let err = WkhtmltopdfRenderer::new(path, 1000)
                .render("<html></html>")
                .unwrap_err();
            match err {
                RenderError::ProcessFailed { message, .. } => assert!(message.contains("broken")),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_undersized_output() {
            let dir = tempfile::tempdir().unwrap();
            let body = "for last; do :; done\nprintf 'tiny' > \"$last\"";
            let path = script(dir.path(), "render", body, 0o755);
            let err = WkhtmltopdfRenderer::new(path, 1000)
                .render("<html></html>")
                .unwrap_err();
            assert!(matches!(err, RenderError::EmptyOutput { size: 4, .. }));
        }

        #[test]
        fn test_successful_render() {
            let dir = tempfile::tempdir().unwrap();
            let body = "for last; do :; done\nhead -c 2048 /dev/zero > \"$last\"";
            let path = script(dir.path(), "render", body, 0o755);
            let bytes = WkhtmltopdfRenderer::new(path, 1000)
                .render("<html><body>ok</body></html>")
                .unwrap();
            assert_eq!(bytes.len(), 2048);
        }
    }
}
