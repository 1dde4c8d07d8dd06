use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelType {
    Header,
    Sidebar,
    Main,
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub panel_type: PanelType,
    pub rect: Rect,
}

/// Dashboard pages listed in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Dashboard,
    Appointments,
    Clients,
    Integrations,
    Settings,
}

impl NavItem {
    pub const ALL: [NavItem; 5] = [
        NavItem::Dashboard,
        NavItem::Appointments,
        NavItem::Clients,
        NavItem::Integrations,
        NavItem::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Dashboard => "Dashboard",
            NavItem::Appointments => "Appointments",
            NavItem::Clients => "Clients",
            NavItem::Integrations => "WhatsApp",
            NavItem::Settings => "Settings",
        }
    }

    /// Only the integration page has content in this build.
    pub fn is_available(&self) -> bool {
        matches!(self, NavItem::Integrations)
    }
}
