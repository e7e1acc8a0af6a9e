// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier via crossterm et traduit les touches en actions.
//
// Raccourcis :
//   Tab / Shift+Tab : champ suivant / précédent du formulaire
//   ← →             : valeur précédente / suivante (intervalle, période)
//   Entrée          : fetch
//   ↑ ↓             : défilement du tableau
//   F2              : tableau ↔ graphique
//   F3              : export CSV
//   Échap (x2)      : quitter, Ctrl+C quitte directement
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'événement pendant le délai de poll
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// Seuls les KeyEventKind::Press sont gardés : certains OS envoient
    /// aussi Release.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : KeyEvent → action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// Ctrl+C : sortie immédiate
pub fn is_force_quit_event(event: &Event) -> bool {
    match event {
        Event::Key(key) => {
            key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        }
        Event::Tick => false,
    }
}

/// Échap : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_next_field_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

pub fn is_previous_field_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::BackTab))
}

pub fn is_next_value_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right))
}

pub fn is_previous_value_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left))
}

pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::PageUp))
}

pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::PageDown))
}

pub fn is_chart_toggle_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::F(2)))
}

pub fn is_export_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::F(3)))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère autorisé dans un symbole Yahoo (ex: "MDKA.JK", "^JKSE", "IDR=X")
pub fn is_symbol_char_event(event: &Event) -> bool {
    match event {
        Event::Key(key) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            matches!(key.code, KeyCode::Char(c) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        }
        _ => false,
    }
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Esc)));
        assert!(!is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_force_quit_needs_control() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_force_quit_event(&ctrl_c));
        assert!(!is_force_quit_event(&key(KeyCode::Char('c'))));
        assert!(!is_symbol_char_event(&ctrl_c));
    }

    #[test]
    fn test_symbol_chars() {
        assert!(is_symbol_char_event(&key(KeyCode::Char('M'))));
        assert!(is_symbol_char_event(&key(KeyCode::Char('.'))));
        assert!(is_symbol_char_event(&key(KeyCode::Char('^'))));
        assert!(!is_symbol_char_event(&key(KeyCode::Char(' '))));
        assert!(!is_symbol_char_event(&key(KeyCode::Enter)));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('j'))), Some('j'));
    }

    #[test]
    fn test_function_keys() {
        assert!(is_chart_toggle_event(&key(KeyCode::F(2))));
        assert!(is_export_event(&key(KeyCode::F(3))));
        assert!(!is_export_event(&key(KeyCode::F(2))));
    }
}
