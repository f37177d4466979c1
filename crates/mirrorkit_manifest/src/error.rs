use std::path::PathBuf;

/// Errors raised while loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or has unexpected keys.
    #[error("failed to parse manifest")]
    Parse(#[from] toml::de::Error),

    /// A `[[copy]]` entry is unusable.
    #[error("copy task #{index}: {message}")]
    InvalidTask { index: usize, message: String },
}
