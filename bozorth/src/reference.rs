//! Producers of human-readable comparison tables.
//!
//! The score never depends on an oracle; they exist to cross-check results.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::bozorth::{match_outcome, BozorthState};
use crate::error::Error;
use crate::report::ComparisonReport;
use crate::template::Template;
use crate::types::MatchParameters;

pub trait ComparisonOracle {
    /// Produces the comparison table for a probe and a gallery template.
    fn compare(&self, probe: &Path, gallery: &Path) -> Result<String, Error>;
}

/// The NBIS `bozorth3` executable, or anything with the same command line.
#[derive(Debug, Clone)]
pub struct Bozorth3Binary {
    program: PathBuf,
    verbose: bool,
}

impl Default for Bozorth3Binary {
    fn default() -> Self {
        Bozorth3Binary::new("bozorth3")
    }
}

impl Bozorth3Binary {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Bozorth3Binary {
            program: program.into(),
            verbose: true,
        }
    }

    /// Passes `-v` before the template paths. Enabled by default.
    pub fn verbose(self, verbose: bool) -> Self {
        Bozorth3Binary { verbose, ..self }
    }

    fn command(&self, probe: &Path, gallery: &Path) -> Command {
        let mut command = Command::new(&self.program);
        if self.verbose {
            command.arg("-v");
        }
        command.arg(probe).arg(gallery);
        command
    }
}

impl ComparisonOracle for Bozorth3Binary {
    fn compare(&self, probe: &Path, gallery: &Path) -> Result<String, Error> {
        debug!(
            "Running {} on {} and {}",
            self.program.display(),
            probe.display(),
            gallery.display()
        );

        let output = self
            .command(probe, gallery)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ExternalTool {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Renders the comparison table from this crate's own pipeline.
#[derive(Debug, Clone, Default)]
pub struct InProcessOracle {
    parameters: MatchParameters,
}

impl InProcessOracle {
    pub fn new(parameters: MatchParameters) -> Self {
        InProcessOracle { parameters }
    }
}

impl ComparisonOracle for InProcessOracle {
    fn compare(&self, probe: &Path, gallery: &Path) -> Result<String, Error> {
        let probe_template = Template::load(probe)?;
        let gallery_template = Template::load(gallery)?;

        let outcome = match_outcome(
            probe_template.table(),
            gallery_template.table(),
            &self.parameters,
            &mut BozorthState::new(),
        );

        let probe_name = probe.display().to_string();
        let gallery_name = gallery.display().to_string();
        let report = ComparisonReport::new(&outcome)
            .with_names(&probe_name, &gallery_name)
            .to_string();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_template(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn in_process_oracle_renders_report() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_template(dir.path(), "probe.xyt", "0 0 0\n10 0 90\n0 10 180\n");
        let table = InProcessOracle::default().compare(&probe, &probe).unwrap();
        assert!(table.contains("matched pairs: 6"));
        assert!(table.contains("score: 4"));
    }

    #[test]
    fn in_process_oracle_propagates_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_template(dir.path(), "probe.xyt", "0 0\n");
        let gallery = dir.path().join("gallery.xyt");

        assert!(matches!(
            InProcessOracle::default().compare(&probe, &probe),
            Err(Error::Parse { .. })
        ));
        let valid = write_template(dir.path(), "valid.xyt", "0 0 0\n");
        assert!(matches!(
            InProcessOracle::default().compare(&valid, &gallery),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn verbose_flag_comes_first() {
        let command = Bozorth3Binary::new("bozorth3").command(Path::new("a.xyt"), Path::new("b.xyt"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["-v", "a.xyt", "b.xyt"]);

        let command = Bozorth3Binary::new("bozorth3")
            .verbose(false)
            .command(Path::new("a.xyt"), Path::new("b.xyt"));
        assert_eq!(command.get_args().count(), 2);
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let result = Bozorth3Binary::new("/nonexistent/bozorth3")
            .compare(Path::new("a.xyt"), Path::new("b.xyt"));
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_external_tool_error() {
        let result = Bozorth3Binary::new("false").compare(Path::new("a.xyt"), Path::new("b.xyt"));
        assert!(matches!(result, Err(Error::ExternalTool { code: Some(1), .. })));
    }

    #[cfg(unix)]
    #[test]
    fn captures_standard_output() {
        let table = Bozorth3Binary::new("echo")
            .verbose(false)
            .compare(Path::new("a.xyt"), Path::new("b.xyt"))
            .unwrap();
        assert_eq!(table.trim_end(), "a.xyt b.xyt");
    }
}
