//! Pure mapping from a session snapshot onto what the connection card shows.

use crate::company::Company;
use zapdesk_evolution::ConnectionState;

const DATA_URI_SCHEME: &str = "data:";
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// The five mutually exclusive states of the connection card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Connected,
    Connecting,
    AwaitingScan,
    Error,
    Disconnected,
}

/// `is_loading` never selects a state on its own; it only disables actions.
pub fn derive_view_state(status: ConnectionState, has_qr: bool, _is_loading: bool) -> ViewState {
    if status.is_open() {
        return ViewState::Connected;
    }
    if has_qr {
        return ViewState::AwaitingScan;
    }
    match status {
        ConnectionState::Connecting | ConnectionState::Loading => ViewState::Connecting,
        ConnectionState::Error => ViewState::Error,
        // An in-flight request on an idle session only disables the actions.
        ConnectionState::Idle | ConnectionState::Open => ViewState::Disconnected,
    }
}

/// Normalizes a QR payload into an image source.
pub fn qr_image_src(qr: &str) -> String {
    if qr.is_empty() {
        return String::new();
    }
    if qr.starts_with(DATA_URI_SCHEME) {
        return qr.to_string();
    }
    format!("{PNG_DATA_URI_PREFIX}{qr}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Active,
    Connecting,
    Error,
}

impl StatusBadge {
    pub fn for_status(status: ConnectionState) -> Option<Self> {
        match status {
            ConnectionState::Open => Some(Self::Active),
            ConnectionState::Connecting | ConnectionState::Loading => Some(Self::Connecting),
            ConnectionState::Error => Some(Self::Error),
            ConnectionState::Idle => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "● Active",
            Self::Connecting => "◌ Connecting",
            Self::Error => "! Error",
        }
    }
}

pub fn status_description(status: ConnectionState) -> &'static str {
    match status {
        ConnectionState::Open => "Your WhatsApp is connected and ready to send notifications",
        ConnectionState::Connecting | ConnectionState::Loading => {
            "Waiting for you to scan the QR code..."
        }
        ConnectionState::Error => "A connection error occurred",
        ConnectionState::Idle => "Connect your WhatsApp to send automatic notifications",
    }
}

/// Label shown under the success icon of a connected session.
pub fn instance_label(company: Option<&Company>) -> String {
    company
        .and_then(|c| c.instance_name().or(Some(c.name.as_str())))
        .filter(|label| !label.is_empty())
        .unwrap_or("Your business")
        .to_string()
}
