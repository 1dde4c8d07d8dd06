use super::*;

impl App {
    pub(super) fn handle_async_event(&mut self, event: AppAsyncEvent) {
        match event {
            AppAsyncEvent::CompanyLoaded { result } => {
                self.company_loading = false;
                match result {
                    Ok(company) => {
                        tracing::info!("Loaded company {} ({})", company.name, company.id);
                        self.panel.form.seed(&company);
                        if let (Some(handle), Some(name)) =
                            (&self.session_handle, company.instance_name())
                        {
                            handle.use_instance(name);
                        }
                        self.company = Some(company);
                        self.clear_error();
                    }
                    Err(e) => {
                        self.report_error("Failed to load company", &e);
                        self.toasts
                            .notify(Toast::destructive("Error loading company", e));
                    }
                }
            }
            AppAsyncEvent::InstanceNameSaved { result } => match result {
                Ok(company) => {
                    self.panel.form.finish_save(Ok(&company), &mut self.toasts);
                    if let (Some(handle), Some(name)) =
                        (&self.session_handle, company.instance_name())
                    {
                        handle.use_instance(name);
                    }
                    self.company = Some(company);
                }
                Err(e) => {
                    self.panel.form.finish_save(Err(e.as_str()), &mut self.toasts);
                }
            },
        }
    }

    pub(super) fn save_instance_name(&mut self) {
        if self.company_loading || self.company.is_none() {
            return;
        }
        let Some(name) = self.panel.request_save(&self.session, &mut self.toasts) else {
            return;
        };

        tracing::info!("Saving instance name {name}");
        let store = Arc::clone(&self.store);
        self.spawn_app_task(async move {
            AppAsyncEvent::InstanceNameSaved {
                result: store
                    .update(CompanyPatch::instance_name(name))
                    .await
                    .map_err(|e| e.to_string()),
            }
        });
    }

    pub(super) fn revert_instance_name(&mut self) {
        if !self.panel.form.is_saving() {
            self.panel.form.revert(self.company.as_ref());
        }
    }

    pub(super) fn available_actions(&self) -> Vec<PanelAction> {
        self.panel.actions(&self.session)
    }

    pub(super) fn clamp_selected_action(&mut self) {
        let count = self.available_actions().len();
        self.selected_action = self.selected_action.min(count.saturating_sub(1));
    }

    pub(super) fn select_next_action(&mut self, forward: bool) {
        let count = self.available_actions().len();
        if count == 0 {
            self.selected_action = 0;
            return;
        }
        self.selected_action = if forward {
            (self.selected_action + 1) % count
        } else {
            (self.selected_action + count - 1) % count
        };
    }

    pub(super) fn trigger_selected_action(&mut self) {
        if let Some(action) = self.available_actions().get(self.selected_action).copied() {
            self.trigger_action(action);
        }
    }

    pub(super) fn trigger_action(&mut self, action: PanelAction) {
        let Some(handle) = self.session_handle.as_ref() else {
            self.report_error(action.label(), "session service is not running");
            return;
        };
        if self.panel.trigger(action, &self.session, handle) {
            tracing::debug!(?action, "Panel action triggered");
            self.clamp_selected_action();
        }
    }

    pub(super) fn trigger_hotkey(&mut self, key: char) -> bool {
        let action = self
            .available_actions()
            .into_iter()
            .find(|action| action.hotkey() == key);
        match action {
            Some(action) => {
                self.trigger_action(action);
                true
            }
            None => false,
        }
    }

    pub(super) fn open_nav_item(&mut self) {
        let Some(item) = NavItem::ALL.get(self.nav_cursor).copied() else {
            return;
        };
        if item.is_available() {
            self.focus = Focus::NameField;
        } else {
            self.toasts.notify(Toast::info(
                item.label(),
                "This page is not available in the terminal dashboard",
            ));
        }
    }

    pub(super) fn cycle_focus(&mut self, forward: bool) {
        let order: &[Focus] = if self.layout.sidebar_open() {
            &[Focus::Sidebar, Focus::NameField, Focus::Actions]
        } else {
            &[Focus::NameField, Focus::Actions]
        };
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    pub(super) fn toggle_sidebar(&mut self) {
        self.layout.toggle_sidebar();
        if !self.layout.sidebar_open() && self.focus == Focus::Sidebar {
            self.focus = Focus::NameField;
        }
    }
}
