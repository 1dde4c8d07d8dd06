use super::*;
use crate::panel::view_state::{instance_label, status_description, StatusBadge, ViewState};
use crate::toast::ToastVariant;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 4;

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let panels = self.layout.calculate_layout(area).to_vec();

        for panel in panels {
            match panel.panel_type {
                PanelType::Header => self.render_header(frame, panel.rect),
                PanelType::Sidebar => self.render_sidebar(frame, panel.rect),
                PanelType::Main => self.render_main(frame, panel.rect),
            }
        }

        self.render_toasts(frame, area);

        if self.show_help {
            self.render_help(frame, area);
        }

        if self.show_error_details {
            self.render_error_details(frame, area);
        }
    }

    fn spinner(&self) -> &'static str {
        SPINNER[(self.tick / 3) as usize % SPINNER.len()]
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph};

        let toggle = if self.layout.sidebar_open() { "◀" } else { "☰" };
        let company = self
            .company
            .as_ref()
            .map(|c| format!(" · {}", c.name))
            .unwrap_or_default();

        let mut spans = vec![
            Span::styled(format!(" {toggle} "), Style::default().fg(Color::Cyan)),
            Span::styled(
                "WhatsApp Integration",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(company),
        ];
        if self.last_error.is_some() {
            spans.push(Span::styled(
                "   ⚠ error [E]",
                Style::default().fg(Color::Red),
            ));
        }
        spans.push(Span::styled(
            format!("   {}   [Ctrl+B] sidebar   [?] help", self.focus.label()),
            Style::default().fg(Color::DarkGray),
        ));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, List, ListItem};

        let is_focused = self.focus == Focus::Sidebar;
        let mut items = vec![ListItem::new(" PAGES ")
            .style(Style::default().add_modifier(Modifier::BOLD))];

        for (idx, item) in NavItem::ALL.iter().enumerate() {
            let prefix = if is_focused && idx == self.nav_cursor {
                "> "
            } else {
                "  "
            };
            let style = if item.is_available() {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            items.push(ListItem::new(format!("{prefix}{}", item.label())).style(style));
        }

        let border_style = if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        frame.render_widget(
            List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(" zapdesk "),
            ),
            area,
        );
    }

    fn render_main(&mut self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        let lines = self.page_lines();

        let width = inner.width.max(1) as usize;
        let content_height: usize = lines
            .iter()
            .map(|line| line.width().max(1).div_ceil(width))
            .sum();
        self.layout
            .clamp_scroll(content_height.min(u16::MAX as usize) as u16, inner.height);

        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.layout.main_scroll(), 0)),
            area,
        );
    }

    fn page_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "WhatsApp Integration",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Connect your WhatsApp to send automatic notifications to your clients",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];

        if self.company.is_none() {
            let placeholder = if self.company_loading {
                format!("{} Loading company...", self.spinner())
            } else {
                "Could not load company data. Press r to try again.".to_string()
            };
            lines.push(Line::from(placeholder));
            return lines;
        }

        self.push_instance_card(&mut lines);
        lines.push(Line::default());
        self.push_connection_card(&mut lines);
        lines
    }

    fn push_instance_card(&self, lines: &mut Vec<Line<'static>>) {
        let form = &self.panel.form;
        let focused = self.focus == Focus::NameField;
        let company = self.company.as_ref();

        lines.push(section_title("Instance identification"));
        lines.push(Line::from(Span::styled(
            "A unique name that identifies your business in the WhatsApp service",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());

        let value = form.displayed_value(company).to_string();
        let field = if value.is_empty() && !(focused && !form.is_saving()) {
            Span::styled("ex: barbearia-centro", Style::default().fg(Color::DarkGray))
        } else if focused && !form.is_saving() {
            let cursor = if form.draft.is_empty() { 0 } else { form.draft.cursor() };
            let mut shown: String = value.chars().take(cursor).collect();
            shown.push('█');
            shown.extend(value.chars().skip(cursor));
            Span::raw(shown)
        } else {
            Span::raw(value)
        };
        let field_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let save_enabled = form.can_save() && !self.panel.is_busy(&self.session);
        let save = if form.is_saving() {
            Span::styled(
                format!("  [{} Saving...]", self.spinner()),
                Style::default().fg(Color::Yellow),
            )
        } else if save_enabled {
            Span::styled("  [Enter] Save", Style::default().fg(Color::Green))
        } else {
            Span::styled("  [Enter] Save", Style::default().fg(Color::DarkGray))
        };

        lines.push(Line::from(vec![
            Span::raw("Instance name: "),
            Span::styled("[ ", field_style),
            field,
            Span::styled(" ]", field_style),
            save,
        ]));
        lines.push(Line::from(Span::styled(
            "Only letters, numbers, hyphens and underscores. Saved in lowercase.",
            Style::default().fg(Color::DarkGray),
        )));

        if let Some(name) = company.and_then(Company::instance_name) {
            lines.push(Line::from(vec![
                Span::raw("Configured instance: "),
                Span::styled(name.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            ]));
        }
    }

    fn push_connection_card(&self, lines: &mut Vec<Line<'static>>) {
        let status = self.session.connection_state;
        let mut title = vec![Span::styled(
            "── WhatsApp connection ──",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(badge) = StatusBadge::for_status(status) {
            let color = match badge {
                StatusBadge::Active => Color::Green,
                StatusBadge::Connecting => Color::Yellow,
                StatusBadge::Error => Color::Red,
            };
            title.push(Span::raw("  "));
            title.push(Span::styled(badge.label(), Style::default().fg(color)));
        }
        lines.push(Line::from(title));
        lines.push(Line::from(Span::styled(
            status_description(status),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());

        match self.panel.view_state(&self.session) {
            ViewState::Connected => {
                lines.push(Line::from(Span::styled(
                    "✔ WhatsApp connected",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!(
                    "Instance: {}",
                    instance_label(self.company.as_ref())
                )));
                if let Some(checked) = self.session.last_checked {
                    let local = checked.with_timezone(&chrono::Local);
                    lines.push(Line::from(Span::styled(
                        format!("Last checked at {}", local.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            ViewState::Connecting => {
                lines.push(Line::from(format!("{} Generating QR code...", self.spinner())));
                lines.push(Line::from(Span::styled(
                    "This can take a few seconds",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ViewState::AwaitingScan => self.push_qr_lines(lines),
            ViewState::Error => {
                lines.push(Line::from(Span::styled(
                    "✖ Connection error",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(
                    self.session
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string()),
                ));
            }
            ViewState::Disconnected => {
                lines.push(Line::from("WhatsApp not connected"));
                lines.push(Line::from(Span::styled(
                    "Connect to generate a QR code and link your phone",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        let actions = self.available_actions();
        if actions.is_empty() {
            return;
        }
        lines.push(Line::default());
        let busy = self.panel.is_busy(&self.session);
        let mut spans = Vec::new();
        for (idx, action) in actions.iter().enumerate() {
            let mut style = if busy {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            };
            if self.focus == Focus::Actions && idx == self.selected_action {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(
                format!(" [{}] {} ", action.hotkey(), action_caption(*action, busy)),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    fn push_qr_lines(&self, lines: &mut Vec<Line<'static>>) {
        if self.panel.qr_image_error() {
            lines.push(Line::from(Span::styled(
                "⚠ Could not load the QR code image",
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(Span::styled(
                "Try again, or request a new QR code",
                Style::default().fg(Color::DarkGray),
            )));
        } else if let Some(path) = self.panel.qr_file() {
            lines.push(Line::from("Scan the QR code with WhatsApp:"));
            lines.push(Line::from(Span::styled(
                path.display().to_string(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
            lines.push(Line::from(Span::styled(
                "On your phone: Settings > Linked devices > Link a device",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            lines.push(Line::from(format!("{} Loading QR code...", self.spinner())));
        }

        if let Some(code) = self.session.pairing_code.as_deref() {
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::raw("Or use the pairing code: "),
                Span::styled(
                    code.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    fn render_toasts(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

        let width = TOAST_WIDTH.min(area.width);
        let x = area.x + area.width.saturating_sub(width + 1);
        let mut y = area.y + 1;

        for toast in self.toasts.visible() {
            if y + TOAST_HEIGHT > area.y + area.height {
                break;
            }
            let rect = Rect::new(x, y, width, TOAST_HEIGHT);
            let color = match toast.variant {
                ToastVariant::Destructive => Color::Red,
                ToastVariant::Default => Color::Green,
            };

            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(toast.description.clone())
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(color))
                            .title(format!(" {} ", toast.title)),
                    ),
                rect,
            );
            y += TOAST_HEIGHT;
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph};
        let help_text = self.keybinds.help_text();
        let popup_area = centered_rect(60, 80, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press ? to close "),
            ),
            popup_area,
        );
    }

    fn render_error_details(&self, frame: &mut Frame, area: Rect) {
        use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

        let popup_area = centered_rect(60, 30, area);
        let details = self
            .last_error
            .as_deref()
            .unwrap_or("No error details available.");
        let text = format!("{details}\n\n[Esc] or [Enter] to close");

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Error Details "),
            ),
            popup_area,
        );
    }
}

fn action_caption(action: PanelAction, busy: bool) -> &'static str {
    match action {
        PanelAction::Connect if busy => "Generating QR code...",
        _ => action.label(),
    }
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("── {title} ──"),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    use ratatui::layout::{Constraint, Direction, Layout};

    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
