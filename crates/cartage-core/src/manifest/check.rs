use super::{MANIFEST_FILE, Manifest, write_file_list};
use crate::error::{Error, Result};
use crate::process::{CommandLine, CommandRunner};

/// Outcome of comparing `Manifest.txt` against the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCheck {
    pub up_to_date: bool,
    /// Exit status of `diff`; `1` when it was killed by a signal.
    pub exit_code: i32,
    /// Unified diff text; `None` in quiet mode.
    pub diff: Option<String>,
}

impl Manifest<'_> {
    /// Compare `Manifest.txt` with a freshly generated file list.
    pub fn check(&self) -> Result<ManifestCheck> {
        if !self.manifest_file().exists() {
            return Err(Error::MissingManifest);
        }

        let mut scratch = tempfile::Builder::new()
            .prefix("Manifest.")
            .suffix(".tmp")
            .tempfile_in(self.root)?;
        write_file_list(scratch.as_file_mut(), &self.file_list()?)?;

        let mut diff = CommandLine::new("diff")
            .arg("-du")
            .arg(MANIFEST_FILE)
            .path_arg(scratch.path())
            .current_dir(self.root);
        if self.quiet {
            diff = diff.arg("-q");
        }

        let output = CommandRunner::new(self.quiet).capture(&diff)?;
        let exit_code = output.status.unwrap_or(1);
        tracing::debug!(exit_code, "Compared {MANIFEST_FILE}");

        Ok(ManifestCheck {
            up_to_date: output.success(),
            exit_code,
            diff: (!self.quiet).then_some(output.stdout),
        })
    }
}
