use crate::art::ArtError;
use crate::export::ExportError;
use crate::state::StateError;
use crate::storage::StorageError;
use crate::theme::ThemeError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Art(#[from] ArtError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no artwork has been uploaded")]
    NoArtwork,
}
