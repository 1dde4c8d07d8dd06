//! WhatsApp integration settings page.
//!
//! The panel owns only local UI state (the name draft, the saving flag and
//! the QR image fallback). Connection state arrives as
//! [`ConnectionSnapshot`]s and user intents leave through
//! [`SessionActions`].

pub mod instance_form;
pub mod qr_image;
pub mod view_state;

use crate::toast::Notifier;
use instance_form::InstanceForm;
use qr_image::QrImage;
use std::path::{Path, PathBuf};
use view_state::{derive_view_state, qr_image_src, ViewState};
use zapdesk_evolution::{ConnectionSnapshot, SessionHandle};

/// Session operations the panel forwards to.
pub trait SessionActions {
    fn create_instance(&self);
    fn disconnect(&self);
    fn refresh_qr_code(&self);
}

impl SessionActions for SessionHandle {
    fn create_instance(&self) {
        SessionHandle::create_instance(self);
    }

    fn disconnect(&self) {
        SessionHandle::disconnect(self);
    }

    fn refresh_qr_code(&self) {
        SessionHandle::refresh_qr_code(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Connect,
    Disconnect,
    Cancel,
    RefreshQr,
    RetryImage,
}

impl PanelAction {
    pub fn label(&self) -> &'static str {
        match self {
            PanelAction::Connect => "Connect WhatsApp",
            PanelAction::Disconnect => "Disconnect",
            PanelAction::Cancel => "Cancel",
            PanelAction::RefreshQr => "Refresh QR code",
            PanelAction::RetryImage => "Try again",
        }
    }

    pub fn hotkey(&self) -> char {
        match self {
            PanelAction::Connect => 'c',
            PanelAction::Disconnect | PanelAction::Cancel => 'd',
            PanelAction::RefreshQr => 'r',
            PanelAction::RetryImage => 't',
        }
    }
}

pub struct IntegrationPanel {
    pub form: InstanceForm,
    qr_dir: PathBuf,
    qr_image_error: bool,
    loaded_src: Option<String>,
    qr_file: Option<PathBuf>,
}

impl IntegrationPanel {
    pub fn new(qr_dir: impl Into<PathBuf>) -> Self {
        Self {
            form: InstanceForm::new(),
            qr_dir: qr_dir.into(),
            qr_image_error: false,
            loaded_src: None,
            qr_file: None,
        }
    }

    pub fn view_state(&self, snapshot: &ConnectionSnapshot) -> ViewState {
        derive_view_state(
            snapshot.connection_state,
            snapshot.has_qr(),
            snapshot.is_loading,
        )
    }

    /// Saving the name and driving the session exclude each other.
    pub fn is_busy(&self, snapshot: &ConnectionSnapshot) -> bool {
        self.form.is_saving() || snapshot.is_loading
    }

    pub fn qr_image_error(&self) -> bool {
        self.qr_image_error
    }

    pub fn qr_file(&self) -> Option<&Path> {
        self.qr_file.as_deref()
    }

    pub fn actions(&self, snapshot: &ConnectionSnapshot) -> Vec<PanelAction> {
        match self.view_state(snapshot) {
            ViewState::Connected => vec![PanelAction::Disconnect],
            ViewState::Connecting => Vec::new(),
            ViewState::AwaitingScan if self.qr_image_error => vec![
                PanelAction::RetryImage,
                PanelAction::Cancel,
                PanelAction::RefreshQr,
            ],
            ViewState::AwaitingScan => vec![PanelAction::Cancel, PanelAction::RefreshQr],
            ViewState::Error | ViewState::Disconnected => vec![PanelAction::Connect],
        }
    }

    pub fn action_enabled(&self, action: PanelAction, snapshot: &ConnectionSnapshot) -> bool {
        !self.is_busy(snapshot) && self.actions(snapshot).contains(&action)
    }

    /// Runs `action` if it is offered and enabled; returns whether it ran.
    pub fn trigger(
        &mut self,
        action: PanelAction,
        snapshot: &ConnectionSnapshot,
        session: &dyn SessionActions,
    ) -> bool {
        if !self.action_enabled(action, snapshot) {
            return false;
        }
        match action {
            PanelAction::Connect => session.create_instance(),
            PanelAction::Disconnect | PanelAction::Cancel => session.disconnect(),
            PanelAction::RefreshQr => session.refresh_qr_code(),
            PanelAction::RetryImage => self.retry_image(session),
        }
        true
    }

    /// Validates the draft; returns the name to persist when a save should start.
    pub fn request_save(
        &mut self,
        snapshot: &ConnectionSnapshot,
        notifier: &mut dyn Notifier,
    ) -> Option<String> {
        if self.is_busy(snapshot) {
            return None;
        }
        match self.form.begin_save() {
            Ok(name) => Some(name),
            Err(e) => {
                notifier.notify(e.toast());
                None
            }
        }
    }

    pub fn on_image_load(&mut self, path: PathBuf) {
        self.qr_image_error = false;
        self.qr_file = Some(path);
    }

    pub fn on_image_error(&mut self) {
        self.qr_image_error = true;
        self.qr_file = None;
    }

    /// Clears the fallback and asks for a fresh code. The current payload is
    /// forgotten so it is decoded again even if the service sends it back.
    pub fn retry_image(&mut self, session: &dyn SessionActions) {
        self.qr_image_error = false;
        self.loaded_src = None;
        session.refresh_qr_code();
    }

    /// Loads the QR image whenever the snapshot carries a new payload.
    pub fn sync_qr(&mut self, snapshot: &ConnectionSnapshot) {
        let Some(qr) = snapshot.qr_code.as_deref().filter(|qr| !qr.is_empty()) else {
            self.loaded_src = None;
            self.qr_file = None;
            self.qr_image_error = false;
            return;
        };

        let src = qr_image_src(qr);
        if self.loaded_src.as_deref() == Some(src.as_str()) {
            return;
        }

        let loaded = QrImage::from_data_uri(&src).and_then(|image| image.save_to(&self.qr_dir));
        match loaded {
            Ok(path) => {
                tracing::debug!("QR image written to {}", path.display());
                self.on_image_load(path);
            }
            Err(e) => {
                let preview: String = qr.chars().take(50).collect();
                tracing::error!("Failed to load QR image ({e}), src: {preview}");
                self.on_image_error();
            }
        }
        self.loaded_src = Some(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::Toast;
    use std::cell::Cell;
    use zapdesk_evolution::ConnectionState;

    #[derive(Default)]
    struct CountingSession {
        creates: Cell<u32>,
        disconnects: Cell<u32>,
        refreshes: Cell<u32>,
    }

    impl SessionActions for CountingSession {
        fn create_instance(&self) {
            self.creates.set(self.creates.get() + 1);
        }
        fn disconnect(&self) {
            self.disconnects.set(self.disconnects.get() + 1);
        }
        fn refresh_qr_code(&self) {
            self.refreshes.set(self.refreshes.get() + 1);
        }
    }

    #[derive(Default)]
    struct Toasts(Vec<Toast>);

    impl Notifier for Toasts {
        fn notify(&mut self, toast: Toast) {
            self.0.push(toast);
        }
    }

    fn snapshot(state: ConnectionState, qr: Option<&str>) -> ConnectionSnapshot {
        ConnectionSnapshot {
            instance_name: Some("barber".into()),
            connection_state: state,
            qr_code: qr.map(str::to_string),
            ..ConnectionSnapshot::default()
        }
    }

    fn panel() -> (IntegrationPanel, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        (IntegrationPanel::new(dir.path().join("qr")), dir)
    }

    #[test]
    fn image_failure_then_retry_requests_one_refresh() {
        let (mut panel, _dir) = panel();
        let session = CountingSession::default();
        let awaiting = snapshot(ConnectionState::Connecting, Some("iVBORw0KGgo="));

        panel.on_image_error();
        assert!(panel.qr_image_error());
        assert_eq!(panel.actions(&awaiting)[0], PanelAction::RetryImage);

        assert!(panel.trigger(PanelAction::RetryImage, &awaiting, &session));
        assert!(!panel.qr_image_error());
        assert_eq!(session.refreshes.get(), 1);
        assert_eq!(session.creates.get(), 0);
        assert_eq!(session.disconnects.get(), 0);
    }

    #[test]
    fn retry_with_the_same_bad_payload_shows_fallback_again() {
        let (mut panel, _dir) = panel();
        let session = CountingSession::default();
        let bad = snapshot(ConnectionState::Connecting, Some("not base64 !!"));

        panel.sync_qr(&bad);
        assert!(panel.qr_image_error());

        assert!(panel.trigger(PanelAction::RetryImage, &bad, &session));
        assert!(!panel.qr_image_error());
        assert_eq!(session.refreshes.get(), 1);

        panel.sync_qr(&bad);
        assert!(panel.qr_image_error());
        assert!(panel.qr_file().is_none());
        assert_eq!(panel.actions(&bad)[0], PanelAction::RetryImage);
    }

    #[test]
    fn unchanged_payload_is_not_decoded_twice() {
        let (mut panel, dir) = panel();
        let good = snapshot(ConnectionState::Connecting, Some("iVBORw0KGgo="));

        panel.sync_qr(&good);
        let file = panel.qr_file().map(Path::to_path_buf).expect("qr file");
        std::fs::remove_file(&file).expect("remove");

        panel.sync_qr(&good);
        assert!(!file.exists());
        assert!(dir.path().join("qr").exists());
    }

    #[test]
    fn undecodable_qr_sets_fallback_and_valid_qr_clears_it() {
        let (mut panel, _dir) = panel();
        panel.sync_qr(&snapshot(ConnectionState::Connecting, Some("not base64 !!")));
        assert!(panel.qr_image_error());
        assert!(panel.qr_file().is_none());

        panel.sync_qr(&snapshot(ConnectionState::Connecting, Some("iVBORw0KGgo=")));
        assert!(!panel.qr_image_error());
        assert!(panel.qr_file().is_some_and(|p| p.exists()));

        panel.sync_qr(&snapshot(ConnectionState::Open, None));
        assert!(panel.qr_file().is_none());
    }

    #[test]
    fn actions_follow_view_state() {
        let (panel, _dir) = panel();
        assert_eq!(
            panel.actions(&snapshot(ConnectionState::Open, Some("stale"))),
            vec![PanelAction::Disconnect]
        );
        assert!(panel
            .actions(&snapshot(ConnectionState::Loading, None))
            .is_empty());
        assert_eq!(
            panel.actions(&snapshot(ConnectionState::Connecting, Some("qr"))),
            vec![PanelAction::Cancel, PanelAction::RefreshQr]
        );
        assert_eq!(
            panel.actions(&snapshot(ConnectionState::Error, None)),
            vec![PanelAction::Connect]
        );
    }

    #[test]
    fn actions_are_disabled_while_busy() {
        let (mut panel, _dir) = panel();
        let session = CountingSession::default();
        let mut idle = snapshot(ConnectionState::Idle, None);

        panel.form.draft.set("barber");
        let mut toasts = Toasts::default();
        assert_eq!(panel.request_save(&idle, &mut toasts).as_deref(), Some("barber"));
        assert!(!panel.trigger(PanelAction::Connect, &idle, &session));
        assert_eq!(session.creates.get(), 0);

        panel.form.finish_save(Err("boom"), &mut toasts);
        idle.is_loading = true;
        assert!(panel.request_save(&idle, &mut toasts).is_none());

        idle.is_loading = false;
        assert!(panel.trigger(PanelAction::Connect, &idle, &session));
        assert_eq!(session.creates.get(), 1);
    }

    #[test]
    fn cancel_disconnects_and_unoffered_actions_do_nothing() {
        let (mut panel, _dir) = panel();
        let session = CountingSession::default();
        let awaiting = snapshot(ConnectionState::Connecting, Some("qr"));

        assert!(!panel.trigger(PanelAction::Connect, &awaiting, &session));
        assert!(panel.trigger(PanelAction::Cancel, &awaiting, &session));
        assert_eq!(session.disconnects.get(), 1);
        assert_eq!(session.creates.get(), 0);
    }

    #[test]
    fn invalid_names_never_start_a_save() {
        let (mut panel, _dir) = panel();
        let idle = snapshot(ConnectionState::Idle, None);
        let mut toasts = Toasts::default();

        panel.form.draft.set("   ");
        assert!(panel.request_save(&idle, &mut toasts).is_none());
        panel.form.draft.set("minha barbearia");
        assert!(panel.request_save(&idle, &mut toasts).is_none());

        assert!(!panel.form.is_saving());
        let titles: Vec<&str> = toasts.0.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Name required", "Invalid name"]);
    }
}
