use crate::error::{Error, Result};

const MAX_PLAYLIST_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_EXTERNAL_ID_LEN: usize = 255;

/// Trims and checks a playlist name, returning the normalized form.
pub fn validate_playlist_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Playlist name cannot be empty"));
    }
    if name.chars().count() > MAX_PLAYLIST_NAME_LEN {
        return Err(Error::validation(format!(
            "Playlist name cannot exceed {MAX_PLAYLIST_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(Error::validation(
            "Playlist name cannot contain control characters",
        ));
    }
    Ok(name.to_string())
}

pub fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::validation(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_cover(cover: &str) -> Result<()> {
    if cover.trim().is_empty() {
        return Err(Error::validation("Cover cannot be empty"));
    }
    Ok(())
}

pub fn validate_external_id(external_id: &str) -> Result<()> {
    if external_id.is_empty() {
        return Err(Error::validation("Track id cannot be empty"));
    }
    if external_id.len() > MAX_EXTERNAL_ID_LEN {
        return Err(Error::validation(format!(
            "Track id cannot exceed {MAX_EXTERNAL_ID_LEN} bytes"
        )));
    }
    if external_id.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(Error::validation(
            "Track id cannot contain whitespace or control characters",
        ));
    }
    Ok(())
}
