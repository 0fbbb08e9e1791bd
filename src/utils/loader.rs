//! Loading texts and keys from files.
//!
//! A file holds one line of alphabet symbols. A single trailing newline
//! (`\n` or `\r\n`) is dropped; every other byte must be a symbol.

use std::path::Path;

use tracing::debug;

use crate::core::message::Message;
use crate::error::{constants, ProtocolError, Result};

/// Read `path` into a validated [`Message`].
///
/// # Errors
/// `ProtocolError::Loader` naming the path, for open/read failures and for
/// the first byte outside the alphabet.
pub async fn load_message<P: AsRef<Path>>(path: P) -> Result<Message> {
    let path = path.as_ref();
    let mut data = tokio::fs::read(path)
        .await
        .map_err(|e| ProtocolError::Loader {
            path: path.to_path_buf(),
            reason: format!("{}: {e}", constants::ERR_FILE_OPEN),
        })?;

    strip_line_ending(&mut data);

    let message = Message::try_from(data).map_err(|e| ProtocolError::Loader {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), len = message.len(), "Loaded message");
    Ok(message)
}

fn strip_line_ending(data: &mut Vec<u8>) {
    if data.last() == Some(&b'\n') {
        data.pop();
        if data.last() == Some(&b'\r') {
            data.pop();
        }
    }
}
