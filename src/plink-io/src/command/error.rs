use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlinkCommandError {
    #[error("Failed to spawn '{0}'")]
    Spawn(String, #[source] std::io::Error),

    #[error("'{tool}' exited with {status}")]
    ExitStatus{tool: String, status: std::process::ExitStatus},
}
