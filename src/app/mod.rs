//! Application event loop and key handling.
//!
//! The console is a small state machine: menus select an action, actions
//! either run immediately and land in the output pane, or go through a
//! list-selection screen, an input form, or a confirmation dialog first.

mod state;

pub use state::{
    AppMode, AppState, FormAction, FormField, FormState, PendingAction, SelectPurpose,
};

use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use crate::disk;
use crate::error::Result;
use crate::hosts;
use crate::identity;
use crate::net;
use crate::paths::ConsolePaths;
use crate::runner::{CommandRunner, SystemRunner};
use crate::ui;

pub struct App {
    state: AppState,
    paths: ConsolePaths,
    runner: SystemRunner,
    should_quit: bool,
}

impl App {
    pub fn new(paths: ConsolePaths) -> Self {
        info!("creating console app");
        Self {
            state: AppState::default(),
            paths,
            runner: SystemRunner,
            should_quit: false,
        }
    }

    /// Main event loop: draw, poll, handle keys until quit.
    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.state))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.state.mode {
            AppMode::MainMenu => self.handle_main_menu(key),
            AppMode::NetworkMenu => self.handle_network_menu(key),
            AppMode::DiskMenu => self.handle_disk_menu(key),
            AppMode::PasswordMenu => self.handle_password_menu(key),
            AppMode::Select => self.handle_select(key),
            AppMode::Form => self.handle_form(key),
            AppMode::Confirm => self.handle_confirm(key),
            AppMode::Output => self.handle_output(key),
        }
    }

    fn handle_main_menu(&mut self, key: KeyEvent) {
        let count = ui::menus::MAIN_MENU_ITEMS.len();
        match key.code {
            KeyCode::Up => self.state.main_selection = prev(self.state.main_selection, count),
            KeyCode::Down => self.state.main_selection = next(self.state.main_selection, count),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => match self.state.main_selection {
                0 => self.state.mode = AppMode::NetworkMenu,
                1 => self.state.mode = AppMode::DiskMenu,
                2 => self.show_hosts(),
                3 => self.state.mode = AppMode::PasswordMenu,
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_network_menu(&mut self, key: KeyEvent) {
        let count = ui::menus::NETWORK_MENU_ITEMS.len();
        match key.code {
            KeyCode::Up => self.state.network_selection = prev(self.state.network_selection, count),
            KeyCode::Down => {
                self.state.network_selection = next(self.state.network_selection, count)
            }
            KeyCode::Esc => self.state.mode = AppMode::MainMenu,
            KeyCode::Enter => match self.state.network_selection {
                0 => self.show_network(),
                1 => self.pick_interface(SelectPurpose::DhcpInterface),
                2 => self.pick_interface(SelectPurpose::StaticInterface),
                3 => self.open_hostname_form(),
                _ => self.state.mode = AppMode::MainMenu,
            },
            _ => {}
        }
    }

    fn handle_disk_menu(&mut self, key: KeyEvent) {
        let count = ui::menus::DISK_MENU_ITEMS.len();
        match key.code {
            KeyCode::Up => self.state.disk_selection = prev(self.state.disk_selection, count),
            KeyCode::Down => self.state.disk_selection = next(self.state.disk_selection, count),
            KeyCode::Esc => self.state.mode = AppMode::MainMenu,
            KeyCode::Enter => match self.state.disk_selection {
                0 => self.show_disks(),
                1 => self.pick_disk(),
                2 => self.rescan_disks(),
                _ => self.state.mode = AppMode::MainMenu,
            },
            _ => {}
        }
    }

    fn handle_password_menu(&mut self, key: KeyEvent) {
        let count = ui::menus::PASSWORD_MENU_ITEMS.len();
        match key.code {
            KeyCode::Up => {
                self.state.password_selection = prev(self.state.password_selection, count)
            }
            KeyCode::Down => {
                self.state.password_selection = next(self.state.password_selection, count)
            }
            KeyCode::Esc => self.state.mode = AppMode::MainMenu,
            KeyCode::Enter => match self.state.password_selection {
                0 => self.show_derived_password(),
                1 => {
                    self.state.pending = Some(PendingAction::ApplyPassword);
                    self.state.confirm_yes = false;
                    self.state.mode = AppMode::Confirm;
                }
                2 => self.show_checksum_drift(),
                _ => self.state.mode = AppMode::MainMenu,
            },
            _ => {}
        }
    }

    fn handle_select(&mut self, key: KeyEvent) {
        let count = self.state.select_items.len();
        match key.code {
            KeyCode::Up => self.state.select_index = prev(self.state.select_index, count),
            KeyCode::Down => self.state.select_index = next(self.state.select_index, count),
            KeyCode::Esc => {
                self.state.select_purpose = None;
                self.state.mode = AppMode::MainMenu;
            }
            KeyCode::Enter => match self.state.select_purpose {
                Some(SelectPurpose::DhcpInterface) => {
                    if let Some(name) = self.state.select_items.get(self.state.select_index) {
                        let name = name.clone();
                        self.apply_dhcp(&name);
                    }
                }
                Some(SelectPurpose::StaticInterface) => {
                    if let Some(name) = self.state.select_items.get(self.state.select_index) {
                        let name = name.clone();
                        self.open_static_form(&name);
                    }
                }
                Some(SelectPurpose::ExpandDisk) => {
                    // The list shows labels; the plan needs the device name
                    if let Some(disk) = self.state.disks.get(self.state.select_index) {
                        self.state.pending = Some(PendingAction::ExpandDisk(disk.name.clone()));
                        self.state.confirm_yes = false;
                        self.state.mode = AppMode::Confirm;
                    }
                }
                None => {}
            },
            _ => {}
        }
    }

    fn handle_form(&mut self, key: KeyEvent) {
        let Some(form) = self.state.form.as_mut() else {
            self.state.mode = AppMode::MainMenu;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.state.form = None;
                self.state.mode = AppMode::MainMenu;
            }
            KeyCode::Char(c) => form.fields[form.current].value.push(c),
            KeyCode::Backspace => {
                form.fields[form.current].value.pop();
            }
            KeyCode::Up => {
                if form.current > 0 {
                    form.current -= 1;
                }
            }
            KeyCode::Down | KeyCode::Tab => {
                if form.current + 1 < form.fields.len() {
                    form.current += 1;
                }
            }
            KeyCode::Enter => {
                let field = &form.fields[form.current];
                let missing = field.required && field.value.trim().is_empty();
                let label = field.label.clone();
                if missing {
                    self.state.status_message = format!("{label} is required");
                    return;
                }
                if form.current + 1 < form.fields.len() {
                    form.current += 1;
                } else if let Some(form) = self.state.form.take() {
                    self.submit_form(form);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.state.confirm_yes = !self.state.confirm_yes;
            }
            KeyCode::Esc => {
                self.state.pending = None;
                self.state.mode = AppMode::MainMenu;
            }
            KeyCode::Enter => {
                let pending = self.state.pending.take();
                if !self.state.confirm_yes {
                    self.state.mode = AppMode::MainMenu;
                    return;
                }
                match pending {
                    Some(PendingAction::ExpandDisk(disk)) => self.expand_disk(&disk),
                    Some(PendingAction::ApplyPassword) => self.apply_password(),
                    None => self.state.mode = AppMode::MainMenu,
                }
            }
            _ => {}
        }
    }

    fn handle_output(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.state.output_scroll = self.state.output_scroll.saturating_sub(1),
            KeyCode::Down => {
                if self.state.output_scroll + 1 < self.state.output.len() {
                    self.state.output_scroll += 1;
                }
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.state.mode = AppMode::MainMenu;
            }
            _ => {}
        }
    }

    // --- actions ---

    fn show_output(&mut self, title: &str, lines: Vec<String>) {
        self.state.output_title = title.to_string();
        self.state.output = lines;
        self.state.output_scroll = 0;
        self.state.mode = AppMode::Output;
    }

    fn show_error(&mut self, context: &str, err: impl std::fmt::Display) {
        debug!("{} failed: {}", context, err);
        self.state.status_message = format!("{context} failed");
        self.show_output(context, vec![format!("Error: {err}")]);
    }

    fn show_network(&mut self) {
        match self.network_summary() {
            Ok(lines) => self.show_output("Network settings", lines),
            Err(e) => self.show_error("Network settings", e),
        }
    }

    fn network_summary(&self) -> Result<Vec<String>> {
        let settings = net::NetworkSettings::read_all(&self.paths)?;
        let mut lines = Vec::new();
        lines.push(format!(
            "Managed: {}",
            if settings.is_managed() { "yes" } else { "no" }
        ));
        lines.push(String::new());
        for (name, conf) in settings.interfaces() {
            let proto = conf
                .bootproto
                .map(|b| b.to_string())
                .unwrap_or_else(|| "unset".to_string());
            lines.push(format!("{name}: {proto}"));
            if let Some(ref ip) = conf.ipaddr {
                lines.push(format!("  address {ip}"));
            }
            if let Some(ref mask) = conf.netmask {
                lines.push(format!("  netmask {mask}"));
            }
            if let Some(ref gw) = conf.gateway {
                lines.push(format!("  gateway {gw}"));
            }
        }
        let nameservers = net::nameservers(&self.paths)?;
        if !nameservers.is_empty() {
            lines.push(String::new());
            lines.push(format!("Nameservers: {}", nameservers.join(" ")));
        }
        Ok(lines)
    }

    fn show_hosts(&mut self) {
        match hosts::read_block(&self.paths.hosts_file) {
            Ok(entries) => {
                let lines: Vec<String> = if entries.is_empty() {
                    vec!["No managed hosts entries".to_string()]
                } else {
                    entries.iter().map(|e| e.render()).collect()
                };
                self.show_output("Managed hosts entries", lines);
            }
            Err(e) => self.show_error("Managed hosts entries", e),
        }
    }

    fn pick_interface(&mut self, purpose: SelectPurpose) {
        match net::filtered_interface_names(&self.paths) {
            Ok(names) if names.is_empty() => {
                self.state.status_message = "No configurable interfaces found".to_string();
            }
            Ok(names) => {
                self.state.select_items = names;
                self.state.select_index = 0;
                self.state.select_purpose = Some(purpose);
                self.state.mode = AppMode::Select;
            }
            Err(e) => self.show_error("Interface listing", e),
        }
    }

    fn pick_disk(&mut self) {
        match disk::list_disks(&self.paths) {
            Ok(disks) if disks.is_empty() => {
                self.state.status_message = "No disks found".to_string();
            }
            Ok(disks) => {
                self.state.select_items = disks
                    .iter()
                    .map(|d| format!("{} ({} MB)", d.name, d.size_mb))
                    .collect();
                // selection maps back through this cache
                self.state.disks = disks;
                self.state.select_index = 0;
                self.state.select_purpose = Some(SelectPurpose::ExpandDisk);
                self.state.mode = AppMode::Select;
            }
            Err(e) => self.show_error("Disk listing", e),
        }
    }

    fn apply_dhcp(&mut self, interface: &str) {
        self.state.select_purpose = None;
        match net::apply_dhcp(&self.runner, &self.paths, interface) {
            Ok(_) => {
                self.state.status_message = format!("{interface} switched to DHCP");
                self.show_output(
                    "DHCP",
                    vec![format!("{interface} reconfigured for DHCP and restarted")],
                );
            }
            Err(e) => self.show_error("DHCP configuration", e),
        }
    }

    fn open_static_form(&mut self, interface: &str) {
        self.state.select_purpose = None;
        self.state.form = Some(FormState {
            title: format!("Static address for {interface}"),
            fields: vec![
                FormField::required("Address"),
                FormField::required("Netmask"),
                FormField::optional("Gateway"),
                FormField::optional("Nameservers (space separated)"),
                FormField::optional("Search domain"),
                FormField::optional("Hostname"),
            ],
            current: 0,
            action: FormAction::StaticConfig(interface.to_string()),
        });
        self.state.mode = AppMode::Form;
    }

    fn open_hostname_form(&mut self) {
        self.state.form = Some(FormState {
            title: "Set hostname".to_string(),
            fields: vec![FormField::required("Hostname")],
            current: 0,
            action: FormAction::SetHostname,
        });
        self.state.mode = AppMode::Form;
    }

    fn submit_form(&mut self, form: FormState) {
        match form.action {
            FormAction::StaticConfig(ref interface) => {
                let value = |i: usize| form.fields[i].value.trim().to_string();
                let optional = |i: usize| {
                    let v = value(i);
                    if v.is_empty() {
                        None
                    } else {
                        Some(v)
                    }
                };
                let conf = net::StaticConfig {
                    address: value(0),
                    netmask: value(1),
                    gateway: optional(2),
                    nameservers: value(3)
                        .split_whitespace()
                        .map(str::to_string)
                        .collect(),
                    search_domain: optional(4),
                    hostname: optional(5),
                };
                match net::apply_static(&self.runner, &self.paths, interface, &conf) {
                    Ok(_) => {
                        self.state.status_message = format!("{interface} reconfigured");
                        self.show_output(
                            "Static address",
                            vec![format!(
                                "{interface} set to {} / {} and restarted",
                                conf.address, conf.netmask
                            )],
                        );
                    }
                    Err(e) => self.show_error("Static configuration", e),
                }
            }
            FormAction::SetHostname => {
                let hostname = form.fields[0].value.trim().to_string();
                let result = net::NetworkSettings::read_all(&self.paths)
                    .and_then(|s| s.set_hostname(&self.runner, &hostname));
                match result {
                    Ok(()) => {
                        self.state.status_message = format!("Hostname set to {hostname}");
                        self.show_output("Hostname", vec![format!("Hostname set to {hostname}")]);
                    }
                    Err(e) => self.show_error("Hostname change", e),
                }
            }
        }
    }

    fn show_disks(&mut self) {
        match disk::list_disks(&self.paths) {
            Ok(disks) => {
                let lines = disks
                    .iter()
                    .map(|d| format!("{:<12} {:>10} MB", d.name, d.size_mb))
                    .collect();
                self.show_output("Disks", lines);
            }
            Err(e) => self.show_error("Disk listing", e),
        }
    }

    fn rescan_disks(&mut self) {
        match disk::rescan_disks(&self.paths) {
            Ok(results) => {
                let lines = results
                    .iter()
                    .map(|r| match r.previous_size_mb {
                        Some(mb) => format!("{} rescanned (was {} MB)", r.disk.name, mb),
                        None => format!("{} rescanned", r.disk.name),
                    })
                    .collect();
                self.show_output("Disk rescan", lines);
            }
            Err(e) => self.show_error("Disk rescan", e),
        }
    }

    fn expand_disk(&mut self, disk_name: &str) {
        let result = disk::last_partition(&self.runner, &self.paths, disk_name)
            .and_then(|plan| disk::expand(&self.runner, &plan));
        match result {
            Ok(()) => {
                self.state.status_message = format!("{disk_name} expanded");
                self.show_output(
                    "Partition expansion",
                    vec![format!(
                        "Last partition of {disk_name} grown to maximum size"
                    )],
                );
            }
            Err(e) => self.show_error("Partition expansion", e),
        }
    }

    fn derived_password(&self) -> Result<String> {
        let hostname = self
            .runner
            .run("hostname", &[])?
            .ensure_success("hostname")?
            .stdout
            .trim()
            .to_string();
        let aliases: Vec<String> = hosts::read_block(&self.paths.hosts_file)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|e| e.aliases)
            .collect();
        identity::derive_password(&hostname, &aliases)
    }

    fn show_derived_password(&mut self) {
        match self.derived_password() {
            Ok(password) => self.show_output(
                "Derived password",
                vec![format!("Service password: {password}")],
            ),
            Err(e) => self.show_error("Password derivation", e),
        }
    }

    fn apply_password(&mut self) {
        match self.derived_password() {
            Ok(password) => {
                let targets = identity::RolloutTargets::default();
                let report = identity::apply_password(&self.runner, &targets, &password);
                self.state.status_message = if report.all_ok() {
                    "Password rollout complete".to_string()
                } else {
                    "Password rollout had failures".to_string()
                };
                let lines = report.to_string().lines().map(str::to_string).collect();
                self.show_output("Password rollout", lines);
            }
            Err(e) => self.show_error("Password rollout", e),
        }
    }

    fn show_checksum_drift(&mut self) {
        match identity::verify_checksums(&self.paths) {
            Ok(drifts) if drifts.is_empty() => {
                self.show_output(
                    "Checksum verification",
                    vec!["All tracked files match their recorded digests".to_string()],
                );
            }
            Ok(drifts) => {
                let lines = drifts
                    .iter()
                    .map(|d| match &d.current {
                        Some(_) => format!("modified: {}", d.path.display()),
                        None => format!("missing:  {}", d.path.display()),
                    })
                    .collect();
                self.show_output("Checksum verification", lines);
            }
            Err(e) => self.show_error("Checksum verification", e),
        }
    }
}

fn next(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}

fn prev(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + count - 1) % count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_wrapping() {
        assert_eq!(next(4, 5), 0);
        assert_eq!(prev(0, 5), 4);
        assert_eq!(next(0, 0), 0);
        assert_eq!(prev(0, 0), 0);
    }
}
