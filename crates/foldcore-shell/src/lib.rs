use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no folder selected")]
    EmptyPath,
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// Desktop integrations for a selected result path.
pub trait ShellActions {
    fn open_folder(&self, full_path: &str) -> Result<(), ShellError>;
    fn copy_path(&self, full_path: &str) -> Result<(), ShellError>;
}

/// Program and arguments used for one desktop action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// Talks to the platform file manager and clipboard through helper programs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl ShellActions for SystemShell {
    fn open_folder(&self, full_path: &str) -> Result<(), ShellError> {
        let path = non_empty(full_path)?;
        let command = open_command(path).ok_or(ShellError::Unsupported("opening folders"))?;
        tracing::debug!(program = command.program, %path, "opening folder");

        Command::new(command.program)
            .args(&command.args)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: command.program.to_string(),
                source,
            })?;
        Ok(())
    }

    fn copy_path(&self, full_path: &str) -> Result<(), ShellError> {
        let path = non_empty(full_path)?;
        let candidates = clipboard_commands();
        if candidates.is_empty() {
            return Err(ShellError::Unsupported("clipboard access"));
        }

        let mut last_err = None;
        for command in candidates {
            match pipe_into(&command, path) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(program = command.program, "clipboard helper failed: {err}");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(ShellError::Unsupported("clipboard access")))
    }
}

fn non_empty(path: &str) -> Result<&str, ShellError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        Err(ShellError::EmptyPath)
    } else {
        Ok(trimmed)
    }
}

pub fn open_command(path: &str) -> Option<ShellCommand> {
    if cfg!(target_os = "windows") {
        Some(ShellCommand {
            program: "explorer",
            args: vec![path.to_string()],
        })
    } else if cfg!(target_os = "macos") {
        Some(ShellCommand {
            program: "open",
            args: vec![path.to_string()],
        })
    } else if cfg!(unix) {
        Some(ShellCommand {
            program: "xdg-open",
            args: vec![path.to_string()],
        })
    } else {
        None
    }
}

/// Clipboard helpers to try, in order.
pub fn clipboard_commands() -> Vec<ShellCommand> {
    if cfg!(target_os = "windows") {
        vec![ShellCommand {
            program: "clip",
            args: Vec::new(),
        }]
    } else if cfg!(target_os = "macos") {
        vec![ShellCommand {
            program: "pbcopy",
            args: Vec::new(),
        }]
    } else if cfg!(unix) {
        vec![
            ShellCommand {
                program: "wl-copy",
                args: Vec::new(),
            },
            ShellCommand {
                program: "xclip",
                args: vec!["-selection".to_string(), "clipboard".to_string()],
            },
        ]
    } else {
        Vec::new()
    }
}

fn pipe_into(command: &ShellCommand, text: &str) -> Result<(), ShellError> {
    let spawn_err = |source| ShellError::Spawn {
        program: command.program.to_string(),
        source,
    };

    let mut child = Command::new(command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(spawn_err)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(spawn_err)?;
    }

    let status = child.wait().map_err(spawn_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(ShellError::ExitStatus {
            program: command.program.to_string(),
            status: status.to_string(),
        })
    }
}
