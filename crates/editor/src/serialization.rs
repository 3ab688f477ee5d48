//! Tour file import/export.
//!
//! Export is a pure function of the document. Import parses into the wire
//! types first and only then normalizes, so a malformed file never reaches
//! the document.

use std::path::Path;

use shared::ids::require_id;
use shared::wire::TourFile;
use shared::{FallbackIds, IdError, TourDocument};

use crate::error::{ExportError, ImportError};
use crate::state::tour::normalize_imported_document;

/// Serialize the document to pretty-printed interchange JSON.
pub fn export_tour(doc: &TourDocument) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&TourFile::from(doc))?)
}

/// Parse interchange JSON without normalizing it. Scene keys are checked
/// here; hotspot ids are repaired later by normalization.
pub fn parse_tour(text: &str) -> Result<TourFile, ImportError> {
    let file: TourFile = serde_json::from_str(text)?;
    for key in file.scenes.keys() {
        check_stored_id(key).map_err(|reason| ImportError::InvalidSceneId {
            id: key.clone(),
            reason,
        })?;
    }
    Ok(file)
}

/// Stored ids are used verbatim, so surrounding whitespace is not trimmed away.
pub(crate) fn check_stored_id(id: &str) -> Result<(), IdError> {
    match require_id(id)? {
        trimmed if trimmed.len() == id.len() => Ok(()),
        _ => Err(IdError::BadCharacters),
    }
}

/// Parse and normalize in one step.
pub fn import_tour(text: &str, fallback_ids: &mut FallbackIds) -> Result<TourDocument, ImportError> {
    let file = parse_tour(text)?;
    Ok(normalize_imported_document(file, fallback_ids))
}

/// Read and parse a tour file.
pub async fn load_tour_file(path: impl AsRef<Path>) -> Result<TourFile, ImportError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let file = parse_tour(&text)?;
    tracing::info!(path = %path.display(), scenes = file.scenes.len(), "read tour file");
    Ok(file)
}

/// Write the document as interchange JSON.
pub async fn save_tour_file(path: impl AsRef<Path>, doc: &TourDocument) -> Result<(), ExportError> {
    let path = path.as_ref();
    let json = export_tour(doc)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), scenes = doc.scenes.len(), "wrote tour file");
    Ok(())
}
