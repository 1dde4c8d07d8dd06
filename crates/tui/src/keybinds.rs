pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Navigation:
  Tab / Shift+Tab  Move focus (sidebar, name field, actions)
  ↑ / ↓            Move within sidebar or action list
  PgUp / PgDn      Scroll page
  Ctrl + B         Toggle sidebar

Instance name (name field focused):
  Type             Edit the name
  Enter            Save name
  Esc              Revert to saved name

WhatsApp connection:
  Enter            Run selected action
  c                Connect WhatsApp
  d                Disconnect / cancel
  r                Refresh QR code
  t                Try loading the QR image again

General:
  r                Reload company data after a failed load
  ?                Toggle this help
  Shift + E        Show latest error details
  x                Dismiss newest notification
  Ctrl + Q         Quit

Mouse:
  Scroll           Scroll page
  Click            Focus name field or select page
  Click + drag     Resize sidebar
"#
        .to_string()
    }
}
