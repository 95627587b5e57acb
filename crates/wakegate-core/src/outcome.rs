//! Captured remote output and classification of an `etherwake` run.

/// Printed by `etherwake -D` after the packet was handed to the kernel.
pub const SUCCESS_MARKER: &str = "Sendto worked";

/// Text used when a failing command printed nothing on stderr.
pub const UNKNOWN_ERROR: &str = "unknown error";

const TOOL_MISSING_MARKER: &str = "not found";

/// Everything a remote command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Stdout decoded as UTF-8, invalid sequences replaced.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// What an `etherwake` run amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeClassification {
    /// Exit status 0.  `confirmed` is set when stdout carried the
    /// [`SUCCESS_MARKER`].
    Sent { confirmed: bool },
    /// The router has no `etherwake` binary.
    ToolMissing,
    /// Any other nonzero exit, with the trimmed stderr text.
    Failed(String),
}

/// Classifies the output of the wake command.
///
/// Rules are applied in order: a nonzero exit whose stderr mentions
/// "not found" (any case) is [`WakeClassification::ToolMissing`], any other
/// nonzero exit is [`WakeClassification::Failed`], and exit 0 is
/// [`WakeClassification::Sent`].
pub fn classify_wake(output: &CommandOutput) -> WakeClassification {
    if output.success() {
        let confirmed = output.stdout_text().contains(SUCCESS_MARKER);
        return WakeClassification::Sent { confirmed };
    }

    let stderr = output.stderr_text();
    if stderr.to_lowercase().contains(TOOL_MISSING_MARKER) {
        return WakeClassification::ToolMissing;
    }

    let text = stderr.trim();
    if text.is_empty() {
        WakeClassification::Failed(UNKNOWN_ERROR.to_string())
    } else {
        WakeClassification::Failed(text.to_string())
    }
}
