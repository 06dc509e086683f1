use async_trait::async_trait;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened in this environment.
    Unavailable(String),
    /// The clipboard refused the write.
    Rejected(String),
    /// A clipboard helper program ran but failed.
    CommandFailed(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "clipboard unavailable: {msg}"),
            ClipboardError::Rejected(msg) => write!(f, "clipboard write rejected: {msg}"),
            ClipboardError::CommandFailed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Asynchronous clipboard write. The primary path of a copy.
#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Synchronous clipboard write used when the primary path fails.
pub trait FallbackClipboard: Send + Sync {
    fn copy_sync(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Native clipboard through `arboard`, run on the blocking pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardWriter for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let owned = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
            clipboard
                .set_text(owned)
                .map_err(|err| ClipboardError::Rejected(err.to_string()))
        })
        .await
        .map_err(|err| ClipboardError::Unavailable(err.to_string()))?
    }
}

/// Pipes text into the platform's clipboard helper program.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandClipboard;

impl FallbackClipboard for CommandClipboard {
    fn copy_sync(&self, text: &str) -> Result<(), ClipboardError> {
        copy_to_clipboard(text)
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    #[cfg(target_os = "macos")]
    {
        return run_with_stdin("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return run_with_stdin("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if run_with_stdin("wl-copy", &[], text).is_ok() {
            return Ok(());
        }
        if run_with_stdin("xclip", &["-selection", "clipboard"], text).is_ok() {
            return Ok(());
        }
        if run_with_stdin("xsel", &["--clipboard", "--input"], text).is_ok() {
            return Ok(());
        }
        Err(ClipboardError::Unavailable(
            "no clipboard command found (install wl-copy, xclip, or xsel)".to_string(),
        ))
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    match Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                let written = stdin.write_all(input.as_bytes());
                // Close the pipe so the helper sees EOF before we wait on it.
                drop(stdin);
                if let Err(err) = written {
                    let _ = child.wait();
                    return Err(ClipboardError::CommandFailed(format!(
                        "clipboard command `{cmd}` did not take the text: {err}"
                    )));
                }
            }
            match child.wait() {
                Ok(status) if status.success() => Ok(()),
                _ => Err(ClipboardError::CommandFailed(format!(
                    "clipboard command `{cmd}` failed"
                ))),
            }
        }
        Err(_) => Err(ClipboardError::Unavailable(format!(
            "clipboard command `{cmd}` not available"
        ))),
    }
}
