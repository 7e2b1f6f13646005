use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Insufficient credits: bet {required} exceeds balance {available}")]
    InsufficientCredits { required: f64, available: f64 },

    #[error("Game '{game}' does not accept command '{command}'")]
    CommandNotSupported { game: &'static str, command: String },

    #[error("Unknown slot theme '{theme}'")]
    UnknownTheme { theme: String },

    #[error("Invalid input: '{raw}' is not a whole number")]
    InvalidInput { raw: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ArcadeResult<T> = Result<T, ArcadeError>;
