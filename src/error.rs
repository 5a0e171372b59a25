use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: std::io::Error },
    RegistryNotFound(PathBuf),
    Registry { path: PathBuf, message: String },
    NamespaceNotFound(String),
    NoFields { app: String, model: String },
}

impl Error {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "IO error at {}: {}", path.display(), source),
            Error::RegistryNotFound(root) => write!(
                f,
                "no model registry manifest found under {}",
                root.display()
            ),
            Error::Registry { path, message } => {
                write!(f, "invalid model registry {}: {}", path.display(), message)
            }
            Error::NamespaceNotFound(name) => {
                write!(f, "application not found in model registry: {}", name)
            }
            Error::NoFields { app, model } => {
                write!(f, "model {}.{} has no fields to serialize", app, model)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
