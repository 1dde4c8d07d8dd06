use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection status of a WhatsApp instance as reported to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    #[serde(alias = "close", alias = "disconnected")]
    Idle,
    Connecting,
    Loading,
    #[serde(alias = "connected")]
    Open,
    Error,
}

impl ConnectionState {
    /// Maps the state string returned by `/instance/connectionState`.
    pub fn from_wire(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "open" | "connected" => Self::Open,
            "connecting" => Self::Connecting,
            "loading" => Self::Loading,
            "error" => Self::Error,
            _ => Self::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Loading => "loading",
            Self::Open => "open",
            Self::Error => "error",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    #[serde(default)]
    pub pairing_code: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

impl QrCode {
    /// The image payload, if the server already generated one.
    pub fn image(&self) -> Option<&str> {
        self.base64.as_deref().filter(|b| !b.trim().is_empty())
    }

    pub fn pairing(&self) -> Option<&str> {
        self.pairing_code.as_deref().filter(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub instance_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInstanceResponse {
    pub instance: InstanceInfo,
    #[serde(default)]
    pub qrcode: Option<QrCode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionStateResponse {
    pub instance: InstanceInfo,
}

/// Result of asking the server for a fresh QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Qr(QrCode),
    AlreadyOpen,
}

/// One reading of the session service, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub instance_name: Option<String>,
    pub connection_state: ConnectionState,
    pub qr_code: Option<String>,
    pub pairing_code: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_checked: Option<DateTime<Utc>>,
}

impl ConnectionSnapshot {
    pub fn has_qr(&self) -> bool {
        self.qr_code.as_deref().is_some_and(|qr| !qr.is_empty())
    }
}
