//! Error type for the command-line front end.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] dg_project::ProjectError),

    #[error("Engine error: {0}")]
    Engine(#[from] dg_heavygas::HeavyGasError),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
