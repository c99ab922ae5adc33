use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("empty path")]
    EmptyPath,
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),
    #[error("failed to start opener for {}: {message}", .path.display())]
    Spawn { path: PathBuf, message: String },
}

pub fn validate_path(path: &str) -> Result<PathBuf, LaunchError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(LaunchError::EmptyPath);
    }

    let candidate = Path::new(trimmed);
    if !candidate.exists() {
        return Err(LaunchError::MissingPath(candidate.to_path_buf()));
    }

    Ok(candidate.to_path_buf())
}

/// Hands the path to the platform's default opener. Returns once the opener
/// has been spawned; it is not waited on.
pub fn launch_path(path: &str) -> Result<(), LaunchError> {
    let target = validate_path(path)?;
    opener_command(&target)
        .spawn()
        .map(|_child| ())
        .map_err(|error| LaunchError::Spawn {
            path: target,
            message: error.to_string(),
        })
}

fn opener_command(target: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(target);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(target);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(target);
        command
    }
}
