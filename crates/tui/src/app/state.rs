use super::*;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub layout: LayoutState,
    pub keybinds: Keybinds,
    pub focus: Focus,
    pub nav_cursor: usize,
    pub panel: IntegrationPanel,
    pub company: Option<Company>,
    pub company_loading: bool,
    pub session: ConnectionSnapshot,
    pub session_handle: Option<SessionHandle>,
    pub store: Arc<dyn CompanyStore>,
    pub toasts: ToastQueue,
    pub selected_action: usize,
    pub tick: u64,
    pub show_help: bool,
    pub drag_target: Option<DragTarget>,
    pub last_mouse_pos: (u16, u16),
    pub app_async_tx: Option<mpsc::UnboundedSender<AppAsyncEvent>>,
    pub app_async_rx: Option<mpsc::UnboundedReceiver<AppAsyncEvent>>,
    pub session_tx: Option<mpsc::UnboundedSender<ConnectionSnapshot>>,
    pub session_rx: Option<mpsc::UnboundedReceiver<ConnectionSnapshot>>,
    pub shutdown: CancellationToken,
    pub last_error: Option<String>,
    pub show_error_details: bool,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn CompanyStore>, data_dir: &Path) -> Self {
        let (app_async_tx, app_async_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let layout = LayoutState::new(config.ui.sidebar_open, config.ui.sidebar_width);
        let toasts = ToastQueue::new(Duration::from_secs(config.ui.toast_seconds.max(1)));
        let nav_cursor = NavItem::ALL
            .iter()
            .position(NavItem::is_available)
            .unwrap_or(0);

        Self {
            should_quit: false,
            config,
            layout,
            keybinds: Keybinds,
            focus: Focus::NameField,
            nav_cursor,
            panel: IntegrationPanel::new(data_dir.join("qr")),
            company: None,
            company_loading: true,
            session: ConnectionSnapshot::default(),
            session_handle: None,
            store,
            toasts,
            selected_action: 0,
            tick: 0,
            show_help: false,
            drag_target: None,
            last_mouse_pos: (0, 0),
            app_async_tx: Some(app_async_tx),
            app_async_rx: Some(app_async_rx),
            session_tx: Some(session_tx),
            session_rx: Some(session_rx),
            shutdown: CancellationToken::new(),
            last_error: None,
            show_error_details: false,
        }
    }
}
