use crate::company::{Company, CompanyPatch, CompanyStore};
use crate::keybinds::Keybinds;
use crate::panel::{IntegrationPanel, PanelAction};
use crate::toast::{Notifier, Toast, ToastQueue};
use crate::ui::layout::{DragTarget, LayoutState};
use crate::ui::panel::{NavItem, PanelType};
use crate::Config;
use anyhow::Result;
use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::Frame;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zapdesk_evolution::{ConnectionSnapshot, EvolutionApi, SessionDriver, SessionHandle};

mod actions;
mod effects;
mod input;
mod render;
mod state;
mod types;

pub use state::App;
pub use types::{AppAsyncEvent, Focus};

impl App {
    pub(super) fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        let message = format!(
            "{context}: {}",
            Self::redact_sensitive(&error.to_string(), &self.config.evolution.api_key)
        );
        self.last_error = Some(message.clone());
        tracing::warn!("{message}");
    }

    pub(super) fn clear_error(&mut self) {
        self.last_error = None;
        self.show_error_details = false;
    }

    fn redact_sensitive(input: &str, api_key: &str) -> String {
        if api_key.is_empty() {
            input.to_string()
        } else {
            input.replace(api_key, "[REDACTED]")
        }
    }

    pub(super) fn spawn_app_task<F>(&self, future: F)
    where
        F: Future<Output = AppAsyncEvent> + Send + 'static,
    {
        if let Some(tx) = self.app_async_tx.clone() {
            tokio::spawn(async move {
                let event = future.await;
                let _ = tx.send(event);
            });
        }
    }
}
