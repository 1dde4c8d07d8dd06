use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::panel::{Panel, PanelType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    Sidebar,
}

pub const MIN_SIDEBAR_WIDTH: u16 = 16;
pub const MAX_SIDEBAR_WIDTH: u16 = 40;
const HEADER_HEIGHT: u16 = 3;

/// Holds the sidebar open/closed state and width plus the main region scroll.
pub struct LayoutState {
    sidebar_open: bool,
    sidebar_width: u16,
    main_scroll: u16,
    cached_panels: Vec<Panel>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new(true, 24)
    }
}

impl LayoutState {
    pub fn new(sidebar_open: bool, sidebar_width: u16) -> Self {
        Self {
            sidebar_open,
            sidebar_width: sidebar_width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH),
            main_scroll: 0,
            cached_panels: Vec::new(),
        }
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn sidebar_width(&self) -> u16 {
        self.sidebar_width
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn main_scroll(&self) -> u16 {
        self.main_scroll
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.main_scroll = self.main_scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.main_scroll = self.main_scroll.saturating_sub(lines);
    }

    /// Keeps the scroll offset inside content that is `content_height` rows
    /// tall when shown in a viewport of `viewport` rows.
    pub fn clamp_scroll(&mut self, content_height: u16, viewport: u16) {
        self.main_scroll = self
            .main_scroll
            .min(content_height.saturating_sub(viewport));
    }

    pub fn calculate_layout(&mut self, area: Rect) -> &[Panel] {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(area);

        self.cached_panels.clear();

        let body = if self.sidebar_open {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(self.sidebar_width), Constraint::Min(20)])
                .split(area);
            self.cached_panels.push(Panel {
                panel_type: PanelType::Sidebar,
                rect: horizontal[0],
            });
            Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
                .split(horizontal[1])
        } else {
            vertical
        };

        self.cached_panels.push(Panel {
            panel_type: PanelType::Header,
            rect: body[0],
        });
        self.cached_panels.push(Panel {
            panel_type: PanelType::Main,
            rect: body[1],
        });

        &self.cached_panels
    }

    pub fn get_panels(&self) -> &[Panel] {
        &self.cached_panels
    }

    pub fn handle_drag(&mut self, target: DragTarget, delta: i16) {
        match target {
            DragTarget::Sidebar => {
                let new_width = (self.sidebar_width as i16 + delta)
                    .clamp(MIN_SIDEBAR_WIDTH as i16, MAX_SIDEBAR_WIDTH as i16)
                    as u16;
                self.sidebar_width = new_width;
            }
        }
    }

    pub fn get_rect(&self, panel_type: PanelType) -> Option<Rect> {
        self.cached_panels
            .iter()
            .find(|p| p.panel_type == panel_type)
            .map(|p| p.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 30,
    };

    #[test]
    fn open_sidebar_spans_full_height_beside_header_and_main() {
        let mut layout = LayoutState::new(true, 24);
        layout.calculate_layout(AREA);

        let sidebar = layout.get_rect(PanelType::Sidebar).expect("sidebar");
        let header = layout.get_rect(PanelType::Header).expect("header");
        let main = layout.get_rect(PanelType::Main).expect("main");

        assert_eq!(sidebar, Rect::new(0, 0, 24, 30));
        assert_eq!(header, Rect::new(24, 0, 76, 3));
        assert_eq!(main, Rect::new(24, 3, 76, 27));
    }

    #[test]
    fn collapsed_sidebar_gives_main_the_full_width() {
        let mut layout = LayoutState::new(true, 24);
        layout.toggle_sidebar();
        assert!(!layout.sidebar_open());
        layout.calculate_layout(AREA);

        assert!(layout.get_rect(PanelType::Sidebar).is_none());
        assert_eq!(layout.get_rect(PanelType::Main), Some(Rect::new(0, 3, 100, 27)));
        assert_eq!(layout.get_panels().len(), 2);
    }

    #[test]
    fn drag_is_clamped() {
        let mut layout = LayoutState::new(true, 24);
        layout.handle_drag(DragTarget::Sidebar, 5);
        assert_eq!(layout.sidebar_width(), 29);
        layout.handle_drag(DragTarget::Sidebar, 100);
        assert_eq!(layout.sidebar_width(), MAX_SIDEBAR_WIDTH);
        layout.handle_drag(DragTarget::Sidebar, -100);
        assert_eq!(layout.sidebar_width(), MIN_SIDEBAR_WIDTH);
        assert_eq!(LayoutState::new(true, 2).sidebar_width(), MIN_SIDEBAR_WIDTH);
    }

    #[test]
    fn scroll_saturates_and_clamps_to_content() {
        let mut layout = LayoutState::default();
        layout.scroll_up(3);
        assert_eq!(layout.main_scroll(), 0);
        layout.scroll_down(50);
        layout.clamp_scroll(40, 27);
        assert_eq!(layout.main_scroll(), 13);
        layout.clamp_scroll(10, 27);
        assert_eq!(layout.main_scroll(), 0);
    }
}
