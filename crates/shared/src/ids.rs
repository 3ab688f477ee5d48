//! Identifier policy for scenes and hotspots.
//!
//! Ids are restricted to `[A-Za-z0-9_-]+`. An empty candidate is not an
//! error: it asks the caller to generate an id. Generators never look at a
//! persisted counter except [`FallbackIds`], which is seeded from the ids
//! already present in a document.

use thiserror::Error;

/// Why a candidate identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id may only contain letters, digits, '_' and '-'")]
    BadCharacters,
    #[error("id is already in use")]
    Duplicate,
}

/// Outcome of validating a user-supplied id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRequest<'a> {
    /// Blank input, the caller should generate an id.
    Auto,
    /// A well-formed explicit id.
    Explicit(&'a str),
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validate a candidate id. Surrounding whitespace is ignored.
pub fn validate_id(candidate: &str) -> Result<IdRequest<'_>, IdError> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Ok(IdRequest::Auto);
    }
    if candidate.chars().all(is_id_char) {
        Ok(IdRequest::Explicit(candidate))
    } else {
        Err(IdError::BadCharacters)
    }
}

/// Like [`validate_id`] but for places where an id must be given explicitly.
pub fn require_id(candidate: &str) -> Result<&str, IdError> {
    match validate_id(candidate)? {
        IdRequest::Auto => Err(IdError::Empty),
        IdRequest::Explicit(id) => Ok(id),
    }
}

/// Lowest unused `hs_<target>_NNN` id, counting from 001.
pub fn generate_hotspot_id(target_scene_id: &str, is_taken: impl Fn(&str) -> bool) -> String {
    lowest_free(|n| format!("hs_{target_scene_id}_{n:03}"), is_taken)
}

/// Lowest unused `scene_N` id, counting from 1.
pub fn generate_scene_id(is_taken: impl Fn(&str) -> bool) -> String {
    lowest_free(|n| format!("scene_{n}"), is_taken)
}

fn lowest_free(make: impl Fn(u64) -> String, is_taken: impl Fn(&str) -> bool) -> String {
    let mut n = 1;
    loop {
        let candidate = make(n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Trailing number of an `hs_*` id (`hs_lobby_012` → 12).
pub fn numeric_suffix(id: &str) -> Option<u64> {
    if !id.starts_with("hs_") {
        return None;
    }
    let (_, tail) = id.rsplit_once('_')?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Monotonic counter for `hs_<scene>_<n>` ids handed out during import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackIds {
    next: u64,
}

impl Default for FallbackIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FallbackIds {
    /// Seed the counter one past the highest numeric suffix among `ids`.
    pub fn seeded_from<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let max = ids.into_iter().filter_map(numeric_suffix).max().unwrap_or(0);
        Self {
            next: max.saturating_add(1),
        }
    }

    /// Next value the counter will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Never moves the counter backwards.
    pub fn bump_past<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let seeded = Self::seeded_from(ids);
        self.next = self.next.max(seeded.next);
    }

    /// Produce `hs_<scene_id>_<n>`, skipping anything `is_taken` reports.
    /// Once the counter is exhausted the lowest free number is used instead.
    pub fn next_id(&mut self, scene_id: &str, is_taken: impl Fn(&str) -> bool) -> String {
        while let Some(after) = self.next.checked_add(1) {
            let candidate = format!("hs_{scene_id}_{}", self.next);
            self.next = after;
            if !is_taken(&candidate) {
                return candidate;
            }
        }
        lowest_free(|n| format!("hs_{scene_id}_{n}"), is_taken)
    }
}
