//! Application state types for the console UI.

use crate::disk::DiskInfo;

/// What a list-selection screen is choosing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPurpose {
    /// Pick the interface to switch to DHCP
    DhcpInterface,
    /// Pick the interface to give a static address
    StaticInterface,
    /// Pick the disk whose last partition gets expanded
    ExpandDisk,
}

/// One field of a sequential input form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub required: bool,
}

impl FormField {
    pub fn required(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            required: true,
        }
    }

    pub fn optional(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            required: false,
        }
    }
}

/// What a completed form feeds into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Static address assignment for the named interface
    StaticConfig(String),
    /// Hostname change
    SetHostname,
}

/// Sequential input form state.
#[derive(Debug, Clone)]
pub struct FormState {
    pub title: String,
    pub fields: Vec<FormField>,
    pub current: usize,
    pub action: FormAction,
}

/// Action staged behind a yes/no confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Grow the last partition of the named disk
    ExpandDisk(String),
    /// Derive and roll out the service password
    ApplyPassword,
}

/// Main application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current screen
    pub mode: AppMode,
    /// Main menu selection index
    pub main_selection: usize,
    /// Network menu selection index
    pub network_selection: usize,
    /// Disk menu selection index
    pub disk_selection: usize,
    /// Password menu selection index
    pub password_selection: usize,
    /// Items of the current list-selection screen
    pub select_items: Vec<String>,
    /// Selection index of the list-selection screen
    pub select_index: usize,
    /// What the list-selection screen chooses for
    pub select_purpose: Option<SelectPurpose>,
    /// Cached disk inventory for the selection screen
    pub disks: Vec<DiskInfo>,
    /// Active input form, when in Form mode
    pub form: Option<FormState>,
    /// Action awaiting confirmation, when in Confirm mode
    pub pending: Option<PendingAction>,
    /// Whether the confirm dialog has "yes" highlighted
    pub confirm_yes: bool,
    /// Title of the output pane
    pub output_title: String,
    /// Output pane lines
    pub output: Vec<String>,
    /// Output pane scroll offset
    pub output_scroll: usize,
    /// Status line message
    pub status_message: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::MainMenu,
            main_selection: 0,
            network_selection: 0,
            disk_selection: 0,
            password_selection: 0,
            select_items: Vec::new(),
            select_index: 0,
            select_purpose: None,
            disks: Vec::new(),
            form: None,
            pending: None,
            confirm_yes: false,
            output_title: String::new(),
            output: Vec::new(),
            output_scroll: 0,
            status_message: "Ready".to_string(),
        }
    }
}

/// Console screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Entry point
    MainMenu,
    /// Network submenu
    NetworkMenu,
    /// Disk submenu
    DiskMenu,
    /// Service password submenu
    PasswordMenu,
    /// Generic list selection (interface or disk)
    Select,
    /// Sequential input form
    Form,
    /// Yes/no confirmation dialog
    Confirm,
    /// Scrollable output pane
    Output,
}
