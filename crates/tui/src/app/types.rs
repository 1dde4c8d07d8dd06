use crate::company::Company;

/// Results of background work, delivered to the UI thread once per frame.
#[derive(Debug)]
pub enum AppAsyncEvent {
    CompanyLoaded { result: Result<Company, String> },
    InstanceNameSaved { result: Result<Company, String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    NameField,
    Actions,
}

impl Focus {
    pub fn label(&self) -> &'static str {
        match self {
            Focus::Sidebar => "[sidebar]",
            Focus::NameField => "[name]",
            Focus::Actions => "[actions]",
        }
    }
}
