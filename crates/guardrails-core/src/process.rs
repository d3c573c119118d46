//! Capped subprocess execution for collaborator tools (git, package manager).
//!
//! stdout is bounded by a caller-supplied cap; stderr is drained
//! concurrently and only its head is kept for error messages.

use std::io::Read;
use std::path::Path;
use std::process::{ChildStderr, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::error::ToolError;
use crate::types::truncate_chars;

/// Default cap on captured subprocess stdout (16 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 16 * 1024 * 1024;

const STDERR_MAX_CHARS: usize = 400;

const STDERR_KEEP_BYTES: u64 = 64 * 1024;

/// Runs `program args...` in `cwd` and returns its stdout.
///
/// Output beyond `max_bytes` is a [`ToolError::OutputTooLarge`], never a
/// silently truncated result. A non-zero exit status is a
/// [`ToolError::CommandFailed`] carrying the (truncated) stderr.
///
/// # Errors
///
/// Returns a [`ToolError`] if the process cannot be spawned, exits
/// unsuccessfully, or exceeds the buffer cap.
pub fn run_capped(
    program: &str,
    args: &[&str],
    cwd: &Path,
    max_bytes: usize,
) -> Result<Vec<u8>, ToolError> {
    let command = describe(program, args);
    debug!(command = %command, "spawning");

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn {
            command: command.clone(),
            source,
        })?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);

    // A child blocked on a full stderr pipe never closes stdout.
    let (stdout, stderr) = std::thread::scope(|scope| {
        let stderr_reader = scope.spawn(move || drain(stderr_pipe, STDERR_KEEP_BYTES));
        let stdout = read_limited(stdout_pipe, limit);
        if stdout.as_ref().map_or(true, |out| out.len() > max_bytes) {
            let _ = child.kill();
        }
        (stdout, stderr_reader.join().unwrap_or_default())
    });

    let stdout = stdout.map_err(|source| {
        let _ = child.wait();
        ToolError::Spawn {
            command: command.clone(),
            source,
        }
    })?;

    if stdout.len() > max_bytes {
        let _ = child.wait();
        return Err(ToolError::OutputTooLarge {
            command,
            limit: max_bytes,
        });
    }

    let status = child.wait().map_err(|source| ToolError::Spawn {
        command: command.clone(),
        source,
    })?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        return Err(ToolError::CommandFailed {
            command,
            status: status.to_string(),
            stderr: truncate_chars(stderr.trim(), STDERR_MAX_CHARS),
            help: None,
        });
    }

    Ok(stdout)
}

fn read_limited(pipe: Option<ChildStdout>, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    if let Some(pipe) = pipe {
        pipe.take(limit).read_to_end(&mut out)?;
    }
    Ok(out)
}

/// Reads the pipe to EOF, keeping only the first `keep` bytes.
fn drain(pipe: Option<ChildStderr>, keep: u64) -> Vec<u8> {
    let mut kept = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.by_ref().take(keep).read_to_end(&mut kept);
        let _ = std::io::copy(&mut pipe, &mut std::io::sink());
    }
    kept
}

/// Formats a command line for messages.
#[must_use]
pub fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = run_capped("sh", &["-c", "printf hello"], Path::new("."), 64).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn output_over_cap_is_a_tool_failure() {
        let err = run_capped("sh", &["-c", "printf 0123456789"], Path::new("."), 4).unwrap_err();
        assert!(matches!(err, ToolError::OutputTooLarge { limit: 4, .. }));
    }

    #[test]
    fn non_zero_exit_is_a_tool_failure() {
        let err = run_capped("sh", &["-c", "echo broken >&2; exit 3"], Path::new("."), 64)
            .unwrap_err();
        match err {
            ToolError::CommandFailed { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let err = run_capped("guardrails-no-such-program", &[], Path::new("."), 64).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn large_stderr_does_not_block_stdout() {
        let out = run_capped(
            "sh",
            &["-c", "head -c 200000 /dev/zero >&2; printf hi"],
            Path::new("."),
            64,
        )
        .unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn large_stderr_on_failure_is_kept_bounded() {
        let err = run_capped(
            "sh",
            &["-c", "head -c 200000 /dev/zero | tr '\\0' e >&2; exit 1"],
            Path::new("."),
            64,
        )
        .unwrap_err();
        match err {
            ToolError::CommandFailed { stderr, .. } => {
                assert_eq!(stderr.chars().count(), STDERR_MAX_CHARS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_over_cap_with_chatty_stderr_is_a_tool_failure() {
        let err = run_capped(
            "sh",
            &["-c", "head -c 200000 /dev/zero >&2; head -c 200000 /dev/zero"],
            Path::new("."),
            1024,
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::OutputTooLarge { limit: 1024, .. }));
    }
}
