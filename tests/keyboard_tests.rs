use tuber::keyboard::{translate, Key, KeyTranslation, ModKeys};
use winit::keyboard::{Key as LogicalKey, KeyLocation, ModifiersState, NamedKey};

fn named(key: NamedKey, location: KeyLocation) -> Key {
    translate(&LogicalKey::Named(key), location).key
}

fn chars(s: &str, location: KeyLocation) -> KeyTranslation {
    translate(&LogicalKey::Character(s.into()), location)
}

#[test]
fn printable_keys_carry_their_character() {
    let t = chars("q", KeyLocation::Standard);
    assert_eq!(t.key, Key::Normal);
    assert_eq!(t.character, Some('q'));

    let space = translate(&LogicalKey::Named(NamedKey::Space), KeyLocation::Standard);
    assert_eq!(space.key, Key::Normal);
    assert_eq!(space.character, Some(' '));

    // composed strings have no single key
    assert_eq!(chars("ab", KeyLocation::Standard).key, Key::Unknown);
}

#[test]
fn numpad_operators() {
    for op in ["/", "*", "-", "+"] {
        let t = chars(op, KeyLocation::Numpad);
        assert_eq!(t.key, Key::Numpad);
        assert_eq!(t.character, op.chars().next());
    }
    // digits from the numpad are plain characters
    assert_eq!(chars("7", KeyLocation::Numpad).key, Key::Normal);
    // and operators elsewhere too
    assert_eq!(chars("-", KeyLocation::Standard).key, Key::Normal);
}

#[test]
fn navigation_keys_split_by_location() {
    use KeyLocation::{Numpad, Standard};

    assert_eq!(named(NamedKey::Home, Standard), Key::Home);
    assert_eq!(named(NamedKey::Home, Numpad), Key::NumpadHome);
    assert_eq!(named(NamedKey::ArrowUp, Numpad), Key::NumpadUp);
    assert_eq!(named(NamedKey::ArrowLeft, Standard), Key::Left);
    assert_eq!(named(NamedKey::PageDown, Numpad), Key::NumpadPageDown);
    assert_eq!(named(NamedKey::Insert, Numpad), Key::NumpadInsert);
    assert_eq!(named(NamedKey::Delete, Numpad), Key::NumpadDelete);
    assert_eq!(named(NamedKey::Delete, Standard), Key::Delete);
    assert_eq!(named(NamedKey::Clear, Numpad), Key::NumpadMiddle);
    assert_eq!(named(NamedKey::Enter, Numpad), Key::NumpadEnter);
    assert_eq!(named(NamedKey::Enter, Standard), Key::Enter);
}

#[test]
fn modifiers_split_left_and_right() {
    use KeyLocation::{Left, Right};

    assert_eq!(named(NamedKey::Shift, Left), Key::LeftShift);
    assert_eq!(named(NamedKey::Shift, Right), Key::RightShift);
    assert_eq!(named(NamedKey::Control, Right), Key::RightCtrl);
    assert_eq!(named(NamedKey::Super, Left), Key::LeftSuper);
    assert_eq!(named(NamedKey::Alt, Left), Key::LeftAlt);
    assert_eq!(named(NamedKey::AltGraph, Left), Key::RightAlt);
}

#[test]
fn function_and_lock_keys() {
    let std = KeyLocation::Standard;
    assert_eq!(named(NamedKey::F1, std), Key::F1);
    assert_eq!(named(NamedKey::F12, std), Key::F12);
    assert_eq!(named(NamedKey::Escape, std), Key::Escape);
    assert_eq!(named(NamedKey::CapsLock, std), Key::CapsLock);
    assert_eq!(named(NamedKey::NumLock, std), Key::NumLock);
    assert_eq!(named(NamedKey::Pause, std), Key::ScrollLock);
    assert_eq!(named(NamedKey::ContextMenu, std), Key::Menu);
    assert_eq!(named(NamedKey::F24, std), Key::Unknown);
}

#[test]
fn modifier_state_maps_to_mod_keys() {
    assert!(ModKeys::from(ModifiersState::empty()).is_empty());

    let mods = ModKeys::from(ModifiersState::SHIFT | ModifiersState::CONTROL);
    assert!(mods.contains(ModKeys::SHIFT));
    assert!(mods.contains(ModKeys::CTRL));
    assert!(!mods.contains(ModKeys::ALT));
    assert!(!mods.contains(ModKeys::SUPER));
    assert_eq!(mods, ModKeys::SHIFT | ModKeys::CTRL);
}
