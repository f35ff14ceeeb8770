use serde::Serialize;

use huddle_shared::constants::CONNECTION_LOST_NOTICE;

/// One-time, non-blocking notices for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notice {
    ConnectionLost,
    ConnectionRestored,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::ConnectionLost => CONNECTION_LOST_NOTICE,
            Notice::ConnectionRestored => "Back online",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}
