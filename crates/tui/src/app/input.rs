use super::*;

const PAGE_SCROLL: u16 = 10;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if key.code == KeyCode::Char('q') && ctrl {
            return Ok(true);
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return Ok(false);
        }

        if self.show_error_details {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('E')) {
                self.show_error_details = false;
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = true;
                return Ok(false);
            }
            KeyCode::Char('b') if ctrl => {
                self.toggle_sidebar();
                return Ok(false);
            }
            KeyCode::Tab => {
                self.cycle_focus(true);
                return Ok(false);
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return Ok(false);
            }
            KeyCode::PageDown => {
                self.layout.scroll_down(PAGE_SCROLL);
                return Ok(false);
            }
            KeyCode::PageUp => {
                self.layout.scroll_up(PAGE_SCROLL);
                return Ok(false);
            }
            _ => {}
        }

        if self.company.is_none()
            && !self.company_loading
            && key.code == KeyCode::Char('r')
            && !ctrl
        {
            self.load_company();
            return Ok(false);
        }

        match self.focus {
            Focus::NameField => self.handle_name_field_key(key),
            Focus::Actions => self.handle_actions_key(key),
            Focus::Sidebar => self.handle_sidebar_key(key),
        }

        Ok(false)
    }

    fn handle_name_field_key(&mut self, key: KeyEvent) {
        if self.company.is_none() {
            return;
        }
        match key.code {
            KeyCode::Enter => return self.save_instance_name(),
            KeyCode::Esc => return self.revert_instance_name(),
            KeyCode::Down => {
                self.focus = Focus::Actions;
                return;
            }
            _ => {}
        }

        let editable = !self.panel.form.is_saving();
        let draft = &mut self.panel.form.draft;
        match key.code {
            KeyCode::Char(c)
                if editable && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                draft.handle_char(c)
            }
            KeyCode::Backspace if editable => draft.handle_backspace(),
            KeyCode::Delete if editable => draft.handle_delete(),
            KeyCode::Left => draft.move_left(),
            KeyCode::Right => draft.move_right(),
            KeyCode::Home => draft.move_home(),
            KeyCode::End => draft.move_end(),
            _ => {}
        }
    }

    fn handle_actions_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.trigger_selected_action(),
            KeyCode::Up | KeyCode::Left => self.select_next_action(false),
            KeyCode::Down | KeyCode::Right => self.select_next_action(true),
            _ => {
                self.handle_global_hotkey(key);
            }
        }
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.nav_cursor = self.nav_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.nav_cursor = (self.nav_cursor + 1).min(NavItem::ALL.len() - 1);
            }
            KeyCode::Enter => self.open_nav_item(),
            _ => {
                self.handle_global_hotkey(key);
            }
        }
    }

    /// Single-letter shortcuts; not reachable while typing in the name field.
    fn handle_global_hotkey(&mut self, key: KeyEvent) -> bool {
        let KeyCode::Char(c) = key.code else {
            return false;
        };
        match c {
            'E' => {
                if self.last_error.is_some() {
                    self.show_error_details = true;
                }
                true
            }
            'x' => {
                self.toasts.dismiss_latest();
                true
            }
            other => self.trigger_hotkey(other),
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<bool> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.last_mouse_pos = (mouse.column, mouse.row);
                if let Some(target) = self.hit_test(mouse.column, mouse.row) {
                    match target {
                        HitTarget::SidebarDivider => {
                            self.drag_target = Some(DragTarget::Sidebar);
                        }
                        HitTarget::NavItem(idx) => {
                            self.focus = Focus::Sidebar;
                            self.nav_cursor = idx;
                            self.open_nav_item();
                        }
                        HitTarget::HeaderToggle => self.toggle_sidebar(),
                        HitTarget::Main => self.focus = Focus::NameField,
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(target) = self.drag_target {
                    let delta = mouse.column as i16 - self.last_mouse_pos.0 as i16;
                    self.layout.handle_drag(target, delta);
                    self.last_mouse_pos = (mouse.column, mouse.row);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_target = None;
            }
            MouseEventKind::ScrollDown => self.layout.scroll_down(1),
            MouseEventKind::ScrollUp => self.layout.scroll_up(1),
            _ => {}
        }
        Ok(false)
    }

    fn hit_test(&self, col: u16, row: u16) -> Option<HitTarget> {
        if let Some(sidebar) = self.layout.get_rect(PanelType::Sidebar) {
            let edge = sidebar.x + sidebar.width.saturating_sub(1);
            if (col == edge || col == edge + 1) && Self::rect_contains(sidebar, edge, row) {
                return Some(HitTarget::SidebarDivider);
            }
        }

        for panel in self.layout.get_panels() {
            if Self::rect_contains(panel.rect, col, row) {
                return match panel.panel_type {
                    PanelType::Sidebar => Self::hit_sidebar(panel.rect, row),
                    PanelType::Header => (col <= panel.rect.x + 4).then_some(HitTarget::HeaderToggle),
                    PanelType::Main => Some(HitTarget::Main),
                };
            }
        }

        None
    }

    fn hit_sidebar(rect: Rect, row: u16) -> Option<HitTarget> {
        // Border plus the title row sit above the first item.
        let first_item_row = rect.y + 2;
        if row < first_item_row {
            return None;
        }
        let idx = (row - first_item_row) as usize;
        (idx < NavItem::ALL.len()).then_some(HitTarget::NavItem(idx))
    }

    fn rect_contains(rect: Rect, col: u16, row: u16) -> bool {
        col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
    }
}

#[derive(Debug, Clone, Copy)]
enum HitTarget {
    SidebarDivider,
    NavItem(usize),
    HeaderToggle,
    Main,
}
