// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Serialize, Serializer};

/// Identifier of one validation session.
///
/// The id doubles as a directory name and as the stem of the report files in the temp dir, so
/// it only ever contains ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId {
    value: String,
}

impl SessionId {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_session_id(&value)?;
        Ok(Self { value })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("session id must not be empty")]
    Empty,
    #[error("session id contains {0:?}; only ASCII alphanumerics, '-' and '_' are allowed")]
    InvalidChar(char),
}

fn validate_session_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if let Some(ch) = value
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')))
    {
        return Err(IdError::InvalidChar(ch));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{IdError, SessionId};

    #[test]
    fn session_id_rejects_empty() {
        assert_eq!(SessionId::new(""), Err(IdError::Empty));
    }

    #[test]
    fn session_id_rejects_path_separators() {
        assert_eq!(SessionId::new("a/b"), Err(IdError::InvalidChar('/')));
        assert_eq!(SessionId::new(".."), Err(IdError::InvalidChar('.')));
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let id = SessionId::new("folder-20260101-101010").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"folder-20260101-101010\"");
    }
}
