use crate::api::EvolutionApi;
use crate::error::ApiError;
use crate::session::{SessionEvent, SessionState};
use crate::types::{ConnectOutcome, ConnectionSnapshot, ConnectionState};
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const INSTANCE_NOT_CONFIGURED: &str = "instance name not configured";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    UseInstance(String),
    Create,
    RefreshQr,
    Disconnect,
}

/// Cheap, cloneable front door to a running [`SessionDriver`].
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    fn send(&self, command: SessionCommand) {
        if self.command_tx.send(command).is_err() {
            warn!("Session driver is not running; command dropped");
        }
    }

    pub fn use_instance(&self, name: impl Into<String>) {
        self.send(SessionCommand::UseInstance(name.into()));
    }

    pub fn create_instance(&self) {
        self.send(SessionCommand::Create);
    }

    pub fn refresh_qr_code(&self) {
        self.send(SessionCommand::RefreshQr);
    }

    pub fn disconnect(&self) {
        self.send(SessionCommand::Disconnect);
    }
}

/// Owns the session state machine, executes commands against the API and
/// polls the connection state while a scan is pending.
pub struct SessionDriver {
    api: EvolutionApi,
    instance: Option<String>,
    state: SessionState,
    is_loading: bool,
    last_checked: Option<chrono::DateTime<Utc>>,
    poll_interval: Duration,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    snapshot_tx: mpsc::UnboundedSender<ConnectionSnapshot>,
}

impl SessionDriver {
    pub fn new(
        api: EvolutionApi,
        instance: Option<String>,
        poll_interval: Duration,
        snapshot_tx: mpsc::UnboundedSender<ConnectionSnapshot>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let driver = Self {
            api,
            instance: instance.filter(|name| !name.trim().is_empty()),
            state: SessionState::default(),
            is_loading: false,
            last_checked: None,
            poll_interval,
            command_rx,
            snapshot_tx,
        };
        (driver, SessionHandle { command_tx })
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            instance_name: self.instance.clone(),
            connection_state: self.state.connection_state(),
            qr_code: self.state.qr_code().map(str::to_string),
            pairing_code: self.state.pairing_code().map(str::to_string),
            is_loading: self.is_loading,
            error: self.state.error().map(str::to_string),
            last_checked: self.last_checked,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        self.refresh_status().await;

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Session driver stopped");
                    break;
                }
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("All session handles dropped");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if self.state.is_pending() {
                        self.poll().await;
                    }
                }
            }
        }
    }

    fn publish(&self) {
        let _ = self.snapshot_tx.send(self.snapshot());
    }

    fn transition(&mut self, event: SessionEvent) {
        let previous = self.state.connection_state();
        self.state = std::mem::take(&mut self.state).apply(event);
        let next = self.state.connection_state();
        if previous != next {
            info!("WhatsApp session {previous} -> {next}");
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.publish();
    }

    fn require_instance(&mut self) -> Option<String> {
        if self.instance.is_none() {
            self.transition(SessionEvent::Failed(INSTANCE_NOT_CONFIGURED.to_string()));
            self.publish();
        }
        self.instance.clone()
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        debug!(?command, "Session command");
        match command {
            SessionCommand::UseInstance(name) => {
                let name = name.trim().to_string();
                if name.is_empty() || self.instance.as_deref() == Some(name.as_str()) {
                    return;
                }
                self.instance = Some(name);
                self.state = SessionState::Disconnected;
                self.refresh_status().await;
            }
            SessionCommand::Create => {
                let Some(instance) = self.require_instance() else {
                    return;
                };
                self.transition(SessionEvent::ConnectRequested);
                self.set_loading(true);
                match self.api.create_instance(&instance).await {
                    Ok(created) => match created.qrcode.as_ref().and_then(|qr| qr.image()) {
                        Some(image) => {
                            let pairing = created
                                .qrcode
                                .as_ref()
                                .and_then(|qr| qr.pairing())
                                .map(str::to_string);
                            self.transition(SessionEvent::QrReceived {
                                qr: image.to_string(),
                                pairing,
                            });
                        }
                        None => self.fetch_qr(&instance).await,
                    },
                    Err(ApiError::AlreadyExists(_)) => {
                        debug!("Instance {instance} already exists, requesting QR code");
                        self.fetch_qr(&instance).await;
                    }
                    Err(e) => self.transition(SessionEvent::Failed(e.session_message())),
                }
                self.set_loading(false);
            }
            SessionCommand::RefreshQr => {
                let Some(instance) = self.require_instance() else {
                    return;
                };
                self.set_loading(true);
                self.fetch_qr(&instance).await;
                self.set_loading(false);
            }
            SessionCommand::Disconnect => {
                let Some(instance) = self.require_instance() else {
                    return;
                };
                self.set_loading(true);
                match self.api.logout(&instance).await {
                    Ok(()) | Err(ApiError::NotFound(_)) => self.transition(SessionEvent::Closed),
                    Err(e) => self.transition(SessionEvent::Failed(e.session_message())),
                }
                self.set_loading(false);
            }
        }
    }

    async fn fetch_qr(&mut self, instance: &str) {
        match self.api.connect(instance).await {
            Ok(ConnectOutcome::AlreadyOpen) => self.transition(SessionEvent::Opened),
            Ok(ConnectOutcome::Qr(qr)) => match qr.image() {
                Some(image) => self.transition(SessionEvent::QrReceived {
                    qr: image.to_string(),
                    pairing: qr.pairing().map(str::to_string),
                }),
                // The server has not generated a code yet; polling retries.
                None => {
                    if !self.state.is_pending() {
                        self.transition(SessionEvent::ConnectRequested);
                    }
                }
            },
            Err(e) => self.transition(SessionEvent::Failed(e.session_message())),
        }
    }

    async fn refresh_status(&mut self) {
        let Some(instance) = self.instance.clone() else {
            self.publish();
            return;
        };

        match self.api.connection_state(&instance).await {
            Ok(state) => {
                self.last_checked = Some(Utc::now());
                if state.is_open() {
                    self.transition(SessionEvent::Opened);
                } else {
                    self.transition(SessionEvent::Closed);
                }
            }
            Err(ApiError::NotFound(_)) => {
                self.last_checked = Some(Utc::now());
                self.transition(SessionEvent::Closed);
            }
            Err(e) => {
                warn!("Failed to read state of instance {instance}: {e}");
                self.transition(SessionEvent::Failed(e.session_message()));
            }
        }
        self.publish();
    }

    async fn poll(&mut self) {
        let Some(instance) = self.instance.clone() else {
            return;
        };

        match self.api.connection_state(&instance).await {
            Ok(ConnectionState::Open) => {
                self.last_checked = Some(Utc::now());
                self.transition(SessionEvent::Opened);
                self.publish();
            }
            Ok(_) => {
                self.last_checked = Some(Utc::now());
                if self.state.qr_code().is_none() {
                    self.fetch_qr(&instance).await;
                    self.publish();
                }
            }
            Err(ApiError::NotFound(_)) => {
                self.transition(SessionEvent::Closed);
                self.publish();
            }
            // Transient failures do not end the scan; the next tick polls again.
            Err(e) => warn!("Polling instance {instance} failed: {e}"),
        }
    }
}
