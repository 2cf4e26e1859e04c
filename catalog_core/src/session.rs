use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The identity of the signed-in user. The value is never validated; an
/// absent identity is sent to the server as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Option<String>);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The form the identity takes inside a URL path.
    pub fn path_segment(&self) -> &str {
        self.0.as_deref().unwrap_or("null")
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SessionFile {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Local persistent storage holding the signed-in user under the `userId` key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored user. Anything that keeps the identity from being
    /// read leaves the user anonymous.
    pub fn load_user(&self) -> UserId {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file, user is anonymous");
                return UserId::anonymous();
            }
            Err(err) => {
                warn!(path = %self.path.display(), "unable to read session file: {err}");
                return UserId::anonymous();
            }
        };
        match toml::from_str::<SessionFile>(&contents) {
            Ok(session) => UserId(session.user_id),
            Err(err) => {
                warn!(path = %self.path.display(), "unable to parse session file: {err}");
                UserId::anonymous()
            }
        }
    }
}
