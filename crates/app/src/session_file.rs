use std::{fs, io::ErrorKind, path::Path};

use finflow_client::Session;

use crate::error::Result;

/// Reads the saved session, if any.
pub fn load(path: &str) -> Result<Option<Session>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save(path: &str, session: &Session) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(session)?;
    fs::write(path, payload)?;
    Ok(())
}

pub fn remove(path: &str) -> Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}
