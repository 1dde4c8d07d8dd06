use super::*;

impl App {
    /// Starts the session driver and the initial company load. Must run
    /// inside a tokio runtime.
    pub async fn init(&mut self) -> Result<()> {
        self.start_session_driver();
        self.load_company();
        Ok(())
    }

    fn start_session_driver(&mut self) {
        let Some(snapshot_tx) = self.session_tx.take() else {
            return;
        };

        let evolution = &self.config.evolution;
        let poll_interval = evolution.poll_interval();
        let api = match EvolutionApi::with_timeout(
            &evolution.base_url,
            evolution.api_key.clone(),
            evolution.request_timeout(),
        ) {
            Ok(api) => api,
            Err(e) => {
                self.report_error("Evolution API is not configured", e);
                return;
            }
        };

        let (driver, handle) = SessionDriver::new(api, None, poll_interval, snapshot_tx);
        let cancel = self.shutdown.child_token();
        tokio::spawn(driver.run(cancel));
        self.session_handle = Some(handle);
        tracing::info!(
            "Session driver started against {}",
            self.config.evolution.base_url
        );
    }

    pub(super) fn load_company(&mut self) {
        self.company_loading = true;
        let store = Arc::clone(&self.store);
        self.spawn_app_task(async move {
            AppAsyncEvent::CompanyLoaded {
                result: store.load().await.map_err(|e| e.to_string()),
            }
        });
    }

    pub fn process_events(&mut self) {
        let mut latest = None;
        if let Some(ref mut rx) = self.session_rx {
            while let Ok(snapshot) = rx.try_recv() {
                latest = Some(snapshot);
            }
        }
        if let Some(snapshot) = latest {
            if snapshot.error.is_some() && snapshot.error != self.session.error {
                tracing::debug!("Session reported error: {:?}", snapshot.error);
            }
            self.session = snapshot;
            self.panel.sync_qr(&self.session);
            self.clamp_selected_action();
        }

        let mut async_events = Vec::new();
        if let Some(ref mut rx) = self.app_async_rx {
            while let Ok(event) = rx.try_recv() {
                async_events.push(event);
            }
        }
        for event in async_events {
            self.handle_async_event(event);
        }

        self.toasts.prune(Instant::now());
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
