//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub switch_screen: Vec<String>,
    pub select: Vec<String>,
    pub search: Vec<String>,
    pub save: Vec<String>,
    pub delete: Vec<String>,
    pub undo: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub retry: Vec<String>,
    pub refresh: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            switch_screen: keys(&["Tab", "BackTab"]),
            select: keys(&["Enter"]),
            search: keys(&["/"]),
            save: keys(&["s"]),
            delete: keys(&["d", "Delete"]),
            undo: keys(&["u"]),
            open_in_browser: keys(&["o"]),
            retry: keys(&["r"]),
            refresh: keys(&["R"]),
        }
    }
}

impl KeybindingConfig {
    fn table(&self) -> [(Action, &[String]); 14] {
        [
            (Action::Quit, self.quit.as_slice()),
            (Action::MoveUp, self.move_up.as_slice()),
            (Action::MoveDown, self.move_down.as_slice()),
            (Action::NextPage, self.next_page.as_slice()),
            (Action::PrevPage, self.prev_page.as_slice()),
            (Action::SwitchScreen, self.switch_screen.as_slice()),
            (Action::Select, self.select.as_slice()),
            (Action::Search, self.search.as_slice()),
            (Action::Save, self.save.as_slice()),
            (Action::Delete, self.delete.as_slice()),
            (Action::Undo, self.undo.as_slice()),
            (Action::OpenInBrowser, self.open_in_browser.as_slice()),
            (Action::Retry, self.retry.as_slice()),
            (Action::Refresh, self.refresh.as_slice()),
        ]
    }

    /// First action whose bindings match the key, in declaration order.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        self.table()
            .into_iter()
            .find(|(_, bindings)| {
                bindings
                    .iter()
                    .filter_map(|b| parse_key_string(b).ok())
                    .any(|binding| binding.matches(key))
            })
            .map(|(action, _)| action)
            .unwrap_or(Action::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is implied by uppercase characters, so it is ignored when unbound.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse "j", "PageDown", "Ctrl+c", "Shift+Tab" and the like.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // "+" alone is the plus key, not a separator
    if s == "+" {
        return Ok(KeyBinding {
            code: KeyCode::Char('+'),
            modifiers: KeyModifiers::NONE,
        });
    }

    let mut parts: Vec<&str> = s.split('+').collect();
    let key_part = parts.pop().unwrap_or_default();

    let mut modifiers = KeyModifiers::NONE;
    for part in parts {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}
