//! Typed WhatsApp session state machine.
//!
//! The driver feeds [`SessionEvent`]s produced by API calls into
//! [`SessionState::apply`]; the UI only ever sees the resulting
//! [`ConnectionState`] plus the QR and pairing payloads.

use crate::types::ConnectionState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    AwaitingScan {
        qr: String,
        pairing: Option<String>,
    },
    Connected,
    Errored {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectRequested,
    QrReceived { qr: String, pairing: Option<String> },
    Opened,
    Closed,
    Failed(String),
}

impl SessionState {
    pub fn apply(self, event: SessionEvent) -> SessionState {
        match (self, event) {
            (_, SessionEvent::Failed(message)) => SessionState::Errored { message },
            (_, SessionEvent::Closed) => SessionState::Disconnected,
            (_, SessionEvent::Opened) => SessionState::Connected,
            // A paired session stays paired until it is closed.
            (SessionState::Connected, SessionEvent::ConnectRequested)
            | (SessionState::Connected, SessionEvent::QrReceived { .. }) => SessionState::Connected,
            (_, SessionEvent::ConnectRequested) => SessionState::Connecting,
            (_, SessionEvent::QrReceived { qr, pairing }) => {
                SessionState::AwaitingScan { qr, pairing }
            }
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        match self {
            SessionState::Disconnected => ConnectionState::Idle,
            SessionState::Connecting => ConnectionState::Loading,
            SessionState::AwaitingScan { .. } => ConnectionState::Connecting,
            SessionState::Connected => ConnectionState::Open,
            SessionState::Errored { .. } => ConnectionState::Error,
        }
    }

    pub fn qr_code(&self) -> Option<&str> {
        match self {
            SessionState::AwaitingScan { qr, .. } => Some(qr),
            _ => None,
        }
    }

    pub fn pairing_code(&self) -> Option<&str> {
        match self {
            SessionState::AwaitingScan { pairing, .. } => pairing.as_deref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Errored { message } => Some(message),
            _ => None,
        }
    }

    /// Whether the driver should keep polling the server.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::AwaitingScan { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qr(payload: &str) -> SessionEvent {
        SessionEvent::QrReceived {
            qr: payload.to_string(),
            pairing: Some("ABCD1234".to_string()),
        }
    }

    #[test]
    fn connect_flow_reaches_connected_and_drops_qr() {
        let state = SessionState::default()
            .apply(SessionEvent::ConnectRequested)
            .apply(qr("first"));
        assert_eq!(state.connection_state(), ConnectionState::Connecting);
        assert_eq!(state.qr_code(), Some("first"));
        assert_eq!(state.pairing_code(), Some("ABCD1234"));

        let state = state.apply(qr("second"));
        assert_eq!(state.qr_code(), Some("second"));

        let state = state.apply(SessionEvent::Opened);
        assert_eq!(state, SessionState::Connected);
        assert_eq!(state.qr_code(), None);
    }

    #[test]
    fn connected_ignores_late_qr_codes() {
        let state = SessionState::Connected.apply(qr("late"));
        assert_eq!(state, SessionState::Connected);
        let state = state.apply(SessionEvent::ConnectRequested);
        assert_eq!(state, SessionState::Connected);
    }

    #[test]
    fn close_and_failure_win_from_any_state() {
        let awaiting = SessionState::Connecting.apply(qr("x"));
        assert_eq!(
            awaiting.clone().apply(SessionEvent::Closed),
            SessionState::Disconnected
        );

        let errored = awaiting.apply(SessionEvent::Failed("boom".into()));
        assert_eq!(errored.connection_state(), ConnectionState::Error);
        assert_eq!(errored.error(), Some("boom"));
        assert!(!errored.is_pending());

        let retried = errored.apply(SessionEvent::ConnectRequested);
        assert_eq!(retried, SessionState::Connecting);
        assert_eq!(retried.connection_state(), ConnectionState::Loading);
    }
}
