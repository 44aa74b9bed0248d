use runtime::{Key, KeyEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shortcut {
    ClearSelection,
    Refresh,
}

/// `Escape` clears the selection; `r`, Ctrl/Cmd+R and F5 refresh.
pub fn shortcut_for(event: &KeyEvent) -> Option<Shortcut> {
    let m = event.modifiers;
    match event.key {
        Key::Escape => Some(Shortcut::ClearSelection),
        Key::Char('r' | 'R') if !m.alt && (m.command() || !m.any() || m.shift) => Some(Shortcut::Refresh),
        Key::Function(5) => Some(Shortcut::Refresh),
        _ => None,
    }
}
