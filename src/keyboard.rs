//! Translation from winit keys to toolkit keys.

use winit::keyboard::{Key as LogicalKey, KeyLocation, ModifiersState, NamedKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Unknown,
    /// A key that produces a character; see [`KeyTranslation::character`].
    Normal,

    LeftShift,
    LeftCtrl,
    LeftSuper,
    LeftAlt,
    RightShift,
    RightCtrl,
    RightSuper,
    RightAlt,

    Menu,
    Escape,
    Backspace,
    Enter,
    Tab,
    CapsLock,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    PrintScreen,
    ScrollLock,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Up,
    Left,
    Down,
    Right,

    NumLock,
    /// Numpad operator; the character says which.
    Numpad,
    NumpadHome,
    NumpadUp,
    NumpadPageUp,
    NumpadLeft,
    NumpadMiddle,
    NumpadRight,
    NumpadEnd,
    NumpadDown,
    NumpadPageDown,
    NumpadInsert,
    NumpadDelete,
    NumpadEnter,
}

/// Held modifier keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModKeys(u8);

impl ModKeys {
    pub const NONE: ModKeys = ModKeys(0);
    pub const SUPER: ModKeys = ModKeys(1 << 0);
    pub const SHIFT: ModKeys = ModKeys(1 << 1);
    pub const CTRL: ModKeys = ModKeys(1 << 2);
    pub const ALT: ModKeys = ModKeys(1 << 3);

    pub fn contains(self, other: ModKeys) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ModKeys {
    type Output = ModKeys;

    fn bitor(self, rhs: ModKeys) -> ModKeys {
        ModKeys(self.0 | rhs.0)
    }
}

impl From<ModifiersState> for ModKeys {
    fn from(state: ModifiersState) -> Self {
        let mut mods = ModKeys::NONE;
        if state.super_key() {
            mods = mods | ModKeys::SUPER;
        }
        if state.shift_key() {
            mods = mods | ModKeys::SHIFT;
        }
        if state.control_key() {
            mods = mods | ModKeys::CTRL;
        }
        if state.alt_key() {
            mods = mods | ModKeys::ALT;
        }
        mods
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTranslation {
    pub key: Key,
    pub character: Option<char>,
}

impl KeyTranslation {
    fn key(key: Key) -> Self {
        Self {
            key,
            character: None,
        }
    }

    fn character(key: Key, c: char) -> Self {
        Self {
            key,
            character: Some(c),
        }
    }
}

pub fn translate(key: &LogicalKey, location: KeyLocation) -> KeyTranslation {
    let numpad = location == KeyLocation::Numpad;
    let right = location == KeyLocation::Right;

    let named = match key {
        LogicalKey::Named(named) => *named,
        LogicalKey::Character(s) => {
            let mut chars = s.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if numpad && matches!(c, '/' | '*' | '-' | '+') => {
                    KeyTranslation::character(Key::Numpad, c)
                }
                (Some(c), None) => KeyTranslation::character(Key::Normal, c),
                _ => KeyTranslation::key(Key::Unknown),
            };
        }
        _ => return KeyTranslation::key(Key::Unknown),
    };

    let key = match named {
        NamedKey::Shift if right => Key::RightShift,
        NamedKey::Shift => Key::LeftShift,
        NamedKey::Control if right => Key::RightCtrl,
        NamedKey::Control => Key::LeftCtrl,
        NamedKey::Super | NamedKey::Meta if right => Key::RightSuper,
        NamedKey::Super | NamedKey::Meta => Key::LeftSuper,
        NamedKey::Alt | NamedKey::AltGraph if right => Key::RightAlt,
        NamedKey::Alt => Key::LeftAlt,
        NamedKey::AltGraph => Key::RightAlt,

        NamedKey::ContextMenu => Key::Menu,
        NamedKey::Escape => Key::Escape,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Enter if numpad => Key::NumpadEnter,
        NamedKey::Enter => Key::Enter,
        NamedKey::Tab => Key::Tab,
        NamedKey::CapsLock => Key::CapsLock,
        NamedKey::Space => return KeyTranslation::character(Key::Normal, ' '),

        NamedKey::F1 => Key::F1,
        NamedKey::F2 => Key::F2,
        NamedKey::F3 => Key::F3,
        NamedKey::F4 => Key::F4,
        NamedKey::F5 => Key::F5,
        NamedKey::F6 => Key::F6,
        NamedKey::F7 => Key::F7,
        NamedKey::F8 => Key::F8,
        NamedKey::F9 => Key::F9,
        NamedKey::F10 => Key::F10,
        NamedKey::F11 => Key::F11,
        NamedKey::F12 => Key::F12,

        NamedKey::PrintScreen => Key::PrintScreen,
        // Pause has no key of its own
        NamedKey::Pause | NamedKey::ScrollLock => Key::ScrollLock,

        NamedKey::Insert if numpad => Key::NumpadInsert,
        NamedKey::Insert => Key::Insert,
        NamedKey::Delete if numpad => Key::NumpadDelete,
        NamedKey::Delete => Key::Delete,
        NamedKey::Home if numpad => Key::NumpadHome,
        NamedKey::Home => Key::Home,
        NamedKey::End if numpad => Key::NumpadEnd,
        NamedKey::End => Key::End,
        NamedKey::PageUp if numpad => Key::NumpadPageUp,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown if numpad => Key::NumpadPageDown,
        NamedKey::PageDown => Key::PageDown,

        NamedKey::ArrowUp if numpad => Key::NumpadUp,
        NamedKey::ArrowUp => Key::Up,
        NamedKey::ArrowLeft if numpad => Key::NumpadLeft,
        NamedKey::ArrowLeft => Key::Left,
        NamedKey::ArrowDown if numpad => Key::NumpadDown,
        NamedKey::ArrowDown => Key::Down,
        NamedKey::ArrowRight if numpad => Key::NumpadRight,
        NamedKey::ArrowRight => Key::Right,
        // numpad 5 with num lock off
        NamedKey::Clear if numpad => Key::NumpadMiddle,

        NamedKey::NumLock => Key::NumLock,
        _ => Key::Unknown,
    };

    KeyTranslation::key(key)
}
