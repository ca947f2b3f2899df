//! Application state and key handling
//!
//! The view is a flat list of rows (section headers and entries) rebuilt
//! from the catalog whenever the query, sort key or missing-ROM toggle
//! changes. Launching is returned to the caller as an [`Action`] so the
//! terminal can be released first.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use shmuparch_catalog::{Catalog, LogicalEntry, RomVariant, SortKey, filter, sort};
use shmuparch_config::ShmuparchConfig;
use shmuparch_emulator::{LaunchResolver, LaunchSpec, RuntimeOptions, SelectionError};

/// One line of the game list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Row {
    Header(String),
    /// Catalog id
    Entry(String),
}

/// Variant chooser shown when a game has several launchable ROMs
#[derive(Debug)]
pub(crate) struct Picker {
    pub title: String,
    pub game_id: String,
    pub candidates: Vec<RomVariant>,
    pub state: ListState,
}

/// What the main loop should do after a key press
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Launch(Box<LaunchSpec>),
    Quit,
}

/// Application state
pub(crate) struct App {
    catalog: Catalog,
    config: ShmuparchConfig,
    options: RuntimeOptions,

    pub query: String,
    pub sort_key: SortKey,
    pub show_missing: bool,

    pub rows: Vec<Row>,
    pub list_state: ListState,
    pub picker: Option<Picker>,

    /// Entry rows moved by PageUp / PageDown, updated from the list height
    pub page_size: usize,
    pub status: String,
}

impl App {
    pub fn new(
        catalog: Catalog,
        config: ShmuparchConfig,
        options: RuntimeOptions,
        show_missing: bool,
    ) -> Self {
        let mut app = Self {
            catalog,
            config,
            options,
            query: String::new(),
            sort_key: SortKey::default(),
            show_missing,
            rows: Vec::new(),
            list_state: ListState::default(),
            picker: None,
            page_size: 10,
            status: "Ready".to_string(),
        };
        app.refresh();
        app
    }

    pub fn resolver(&self) -> LaunchResolver<'_> {
        LaunchResolver::new(&self.config)
    }

    pub fn config(&self) -> &ShmuparchConfig {
        &self.config
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_remote(&self) -> bool {
        self.options.mister || self.config.mister.enabled
    }

    pub fn entry(&self, id: &str) -> Option<&LogicalEntry> {
        self.catalog.get(id)
    }

    pub fn selected_entry(&self) -> Option<&LogicalEntry> {
        match self.list_state.selected().and_then(|i| self.rows.get(i)) {
            Some(Row::Entry(id)) => self.catalog.get(id),
            _ => None,
        }
    }

    /// Number of entry rows currently listed
    pub fn shown_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Entry(_)))
            .count()
    }

    /// Rebuild the rows, keeping the selected game when it is still listed
    pub fn refresh(&mut self) {
        let keep = self.selected_entry().map(|e| e.id().to_string());

        let visible = filter::visible(self.catalog.entries(), self.show_missing);
        let matched = filter::apply(&self.query, visible);
        let sorted = sort::apply(self.sort_key, matched);

        let mut rows = Vec::new();
        for section in sort::sections(self.sort_key, &sorted) {
            rows.push(Row::Header(section.title));
            rows.extend(section.entries.iter().map(|e| Row::Entry(e.id().to_string())));
        }
        self.rows = rows;

        let position = keep
            .and_then(|id| self.rows.iter().position(|r| *r == Row::Entry(id.clone())))
            .or_else(|| self.entry_rows().first().copied());
        self.list_state.select(position);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.picker.is_some() {
            return self.handle_picker_key(key);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('v') if ctrl => {
                self.show_missing = !self.show_missing;
                self.status = if self.show_missing {
                    "Showing missing ROMs".to_string()
                } else {
                    "Hiding missing ROMs".to_string()
                };
                self.refresh();
            }
            KeyCode::Char('r') if ctrl => self.rescan(),
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                self.refresh();
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.refresh();
            }
            KeyCode::Tab => {
                self.sort_key = self.sort_key.next();
                self.status = format!("Sort: {}", self.sort_key);
                self.refresh();
            }
            KeyCode::Up => self.move_selection(-1, true),
            KeyCode::Down => self.move_selection(1, true),
            KeyCode::PageUp => self.move_selection(-(self.page_size as isize), false),
            KeyCode::PageDown => self.move_selection(self.page_size as isize, false),
            KeyCode::Home => self.list_state.select(self.entry_rows().first().copied()),
            KeyCode::End => self.list_state.select(self.entry_rows().last().copied()),
            KeyCode::Enter => return self.launch_selected(),
            KeyCode::Esc => {
                if self.query.is_empty() {
                    return Action::Quit;
                }
                self.query.clear();
                self.refresh();
            }
            _ => {}
        }
        Action::None
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Action {
        let Some(picker) = self.picker.as_mut() else {
            return Action::None;
        };
        let count = picker.candidates.len();
        if count == 0 {
            self.picker = None;
            return Action::None;
        }

        match key.code {
            KeyCode::Up => {
                let i = picker.state.selected().unwrap_or(0);
                picker.state.select(Some(if i == 0 { count - 1 } else { i - 1 }));
            }
            KeyCode::Down => {
                let i = picker.state.selected().unwrap_or(0);
                picker.state.select(Some(if i + 1 >= count { 0 } else { i + 1 }));
            }
            KeyCode::Enter => {
                let chosen = picker
                    .state
                    .selected()
                    .and_then(|i| picker.candidates.get(i))
                    .map(|v| v.rom.clone());
                let game_id = picker.game_id.clone();
                self.picker = None;
                return self.launch(&game_id, chosen.as_deref());
            }
            KeyCode::Esc => self.picker = None,
            _ => {}
        }
        Action::None
    }

    fn launch_selected(&mut self) -> Action {
        match self.selected_entry().map(|e| e.id().to_string()) {
            Some(id) => self.launch(&id, None),
            None => Action::None,
        }
    }

    fn launch(&mut self, id: &str, chosen: Option<&str>) -> Action {
        let Some(entry) = self.catalog.get(id) else {
            return Action::None;
        };

        let resolved = self.resolver().resolve(entry, chosen, &self.options);
        match resolved {
            Ok(spec) => Action::Launch(Box::new(spec)),
            Err(SelectionError::Ambiguous { title, .. }) => {
                let candidates: Vec<RomVariant> = self
                    .resolver()
                    .candidates(entry)
                    .into_iter()
                    .cloned()
                    .collect();
                let mut state = ListState::default();
                state.select(Some(0));
                self.status = format!("Choose a version of {}", title);
                self.picker = Some(Picker {
                    title,
                    game_id: id.to_string(),
                    candidates,
                    state,
                });
                Action::None
            }
            Err(e) => {
                self.status = e.to_string();
                Action::None
            }
        }
    }

    /// Re-check ROM availability
    pub fn rescan(&mut self) {
        let result = {
            let resolver = LaunchResolver::new(&self.config);
            self.catalog.rescan(resolver.checker())
        };
        self.status = if result.root_readable {
            format!(
                "Found {} of {} ROMs ({} ms)",
                result.variants_available, result.variants_checked, result.duration_ms
            )
        } else {
            format!("ROM directory not readable: {}", self.config.paths.rom_dir.display())
        };
        self.refresh();
    }

    fn entry_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r, Row::Entry(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Move over entry rows, skipping headers
    fn move_selection(&mut self, delta: isize, wrap: bool) {
        let entries = self.entry_rows();
        if entries.is_empty() {
            self.list_state.select(None);
            return;
        }

        let last = entries.len() as isize - 1;
        let current = self
            .list_state
            .selected()
            .and_then(|row| entries.iter().position(|&i| i == row))
            .unwrap_or(0) as isize;

        let target = current + delta;
        let target = if wrap && target < 0 {
            last
        } else if wrap && target > last {
            0
        } else {
            target.clamp(0, last)
        };
        self.list_state.select(Some(entries[target as usize]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
[[game]]
id = "ddp"
title = "DoDonPachi"
developer = "Cave"
quality = 9
difficulty_1cc = 6
variants = [
    { rom = "ddonpach", label = "World" },
    { rom = "ddonpachj", label = "Japan" },
]

[[game]]
id = "esprade"
title = "ESP Ra.De."
developer = "Cave"
quality = 7

[[game]]
id = "garegga"
title = "Battle Garegga"
developer = "Raizing"
quality = 9
difficulty_1cc = 8
variants = [{ rom = "bgaregga", label = "Europe" }]
"#;

    struct TestApp {
        #[allow(dead_code)]
        temp_dir: TempDir,
        app: App,
    }

    fn app_with(roms: &[&str]) -> TestApp {
        let temp_dir = TempDir::new().unwrap();
        for rom in roms {
            fs::write(temp_dir.path().join(format!("{}.zip", rom)), b"ROM").unwrap();
        }

        let mut config = ShmuparchConfig::default();
        config.paths.rom_dir = temp_dir.path().to_path_buf();

        let catalog = Catalog::load_from_str(CATALOG).unwrap();
        let mut app = App::new(catalog, config, RuntimeOptions::new(), false);
        app.rescan();
        TestApp { temp_dir, app }
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> Action {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_rows_have_section_headers() {
        let t = app_with(&["ddonpach", "esprade", "bgaregga"]);
        assert_eq!(
            t.app.rows,
            vec![
                Row::Header("Cave".to_string()),
                Row::Entry("ddp".to_string()),
                Row::Entry("esprade".to_string()),
                Row::Header("Raizing".to_string()),
                Row::Entry("garegga".to_string()),
            ]
        );
        assert_eq!(t.app.list_state.selected(), Some(1));
    }

    #[test]
    fn test_missing_toggle() {
        let mut t = app_with(&["bgaregga"]);
        assert_eq!(t.app.shown_count(), 1);

        ctrl(&mut t.app, 'v');
        assert_eq!(t.app.shown_count(), 3);
        assert!(t.app.show_missing);
    }

    #[test]
    fn test_typing_filters_and_esc_clears() {
        let mut t = app_with(&["ddonpach", "esprade", "bgaregga"]);
        type_str(&mut t.app, "q>8");
        assert_eq!(t.app.shown_count(), 2);

        press(&mut t.app, KeyCode::Backspace);
        press(&mut t.app, KeyCode::Backspace);
        assert_eq!(t.app.query, "q");

        assert_eq!(press(&mut t.app, KeyCode::Esc), Action::None);
        assert!(t.app.query.is_empty());
        assert_eq!(press(&mut t.app, KeyCode::Esc), Action::Quit);
    }

    #[test]
    fn test_navigation_skips_headers() {
        let mut t = app_with(&["ddonpach", "esprade", "bgaregga"]);
        press(&mut t.app, KeyCode::Down);
        press(&mut t.app, KeyCode::Down);
        assert_eq!(t.app.selected_entry().unwrap().id(), "garegga");

        press(&mut t.app, KeyCode::Down);
        assert_eq!(t.app.selected_entry().unwrap().id(), "ddp");

        press(&mut t.app, KeyCode::End);
        assert_eq!(t.app.list_state.selected(), Some(4));
        press(&mut t.app, KeyCode::PageUp);
        assert_eq!(t.app.list_state.selected(), Some(1));
    }

    #[test]
    fn test_tab_cycles_sort_and_keeps_selection() {
        let mut t = app_with(&["ddonpach", "esprade", "bgaregga"]);
        press(&mut t.app, KeyCode::End);
        press(&mut t.app, KeyCode::Tab);

        assert_eq!(t.app.sort_key, SortKey::Quality);
        assert_eq!(t.app.selected_entry().unwrap().id(), "garegga");
        assert_eq!(t.app.rows[0], Row::Header("Excellent (9-10)".to_string()));
    }

    #[test]
    fn test_enter_launches_single_variant() {
        let mut t = app_with(&["bgaregga"]);
        match press(&mut t.app, KeyCode::Enter) {
            Action::Launch(spec) => assert_eq!(spec.variant.rom, "bgaregga"),
            other => panic!("expected launch, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_entry_opens_picker() {
        let mut t = app_with(&["ddonpach", "ddonpachj"]);
        assert_eq!(press(&mut t.app, KeyCode::Enter), Action::None);

        let picker = t.app.picker.as_ref().unwrap();
        assert_eq!(picker.candidates.len(), 2);

        press(&mut t.app, KeyCode::Down);
        match press(&mut t.app, KeyCode::Enter) {
            Action::Launch(spec) => assert_eq!(spec.variant.rom, "ddonpachj"),
            other => panic!("expected launch, got {:?}", other),
        }
        assert!(t.app.picker.is_none());
    }

    #[test]
    fn test_missing_entry_reports_status() {
        let mut t = app_with(&[]);
        ctrl(&mut t.app, 'v');
        assert_eq!(press(&mut t.app, KeyCode::Enter), Action::None);
        assert_eq!(t.app.status, "No ROM found for DoDonPachi");
    }
}
