//! Subprocess backend for the `mystem` morphological analyzer.
//!
//! `mystem` is started once, lazily, with `--format json -i -d -c` and fed one
//! line per request; it answers with one JSON array per input line holding
//! every segment (whitespace included). The process is shared behind a mutex,
//! so requests from several threads are serialized. A failed exchange kills
//! the process; the next request starts a fresh one.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::analysis::analyzer::MorphAnalyzer;
use crate::analysis::token::WordAnalysis;
use crate::error::{AnketaError, Result};

/// Arguments selecting JSON output with grammar info, disambiguation and
/// complete input echo.
const MYSTEM_ARGS: &[&str] = &["--format", "json", "-i", "-d", "-c"];

struct MystemProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl MystemProcess {
    fn spawn(binary: &Path) -> Result<Self> {
        let mut child = Command::new(binary)
            .args(MYSTEM_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AnketaError::analyzer(format!("failed to start {}: {e}", binary.display()))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnketaError::analyzer("mystem stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AnketaError::analyzer("mystem stdout unavailable"))?;

        debug!("Started {} (pid {})", binary.display(), child.id());
        Ok(MystemProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn exchange(&mut self, line: &str) -> Result<Vec<WordAnalysis>> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;

        let mut response = String::new();
        if self.stdout.read_line(&mut response)? == 0 {
            return Err(AnketaError::analyzer("mystem closed its output"));
        }

        let mut words: Vec<WordAnalysis> = serde_json::from_str(response.trim_end())?;
        // The echoed line terminator is not part of the answer.
        if words.last().is_some_and(|w| w.text == "\n") {
            words.pop();
        }
        Ok(words)
    }
}

impl Drop for MystemProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Morphological analyzer backed by a `mystem` subprocess.
pub struct MystemAnalyzer {
    binary: PathBuf,
    process: Mutex<Option<MystemProcess>>,
}

impl std::fmt::Debug for MystemAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MystemAnalyzer")
            .field("binary", &self.binary)
            .field("running", &self.process.lock().is_some())
            .finish()
    }
}

impl MystemAnalyzer {
    /// Create an analyzer for the given `mystem` binary. The process starts on
    /// first use.
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        MystemAnalyzer {
            binary: binary.into(),
            process: Mutex::new(None),
        }
    }

    /// Create an analyzer and start the process right away, failing fast when
    /// the binary is missing.
    pub fn spawn<P: Into<PathBuf>>(binary: P) -> Result<Self> {
        let analyzer = Self::new(binary);
        *analyzer.process.lock() = Some(MystemProcess::spawn(&analyzer.binary)?);
        Ok(analyzer)
    }

    /// Path of the binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl MorphAnalyzer for MystemAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<WordAnalysis>> {
        // One request per line: embedded line breaks would split the answer.
        let line = text.replace(['\r', '\n'], " ");

        let mut guard = self.process.lock();
        if guard.is_none() {
            *guard = Some(MystemProcess::spawn(&self.binary)?);
        }

        let result = match guard.as_mut() {
            Some(process) => process.exchange(&line),
            None => Err(AnketaError::analyzer("mystem process unavailable")),
        };
        if let Err(e) = &result {
            warn!("mystem exchange failed, restarting on next request: {e}");
            *guard = None;
        }
        result
    }

    fn name(&self) -> &'static str {
        "mystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_fails_fast() {
        let result = MystemAnalyzer::spawn("/nonexistent/mystem-binary");
        assert!(matches!(result, Err(AnketaError::Analyzer(_))));
    }

    #[test]
    fn test_lazy_analyzer_reports_spawn_failure_per_request() {
        let analyzer = MystemAnalyzer::new("/nonexistent/mystem-binary");
        assert_eq!(analyzer.name(), "mystem");
        assert!(analyzer.analyze("нет скамеек").is_err());
        assert!(analyzer.analyze("нет скамеек").is_err());
    }
}
