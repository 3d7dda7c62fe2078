//! Logical key events and hot-key matching.
//!
//! Hosts deliver raw `(keyval, is_press, state)` triples. `KeyEvent::from_raw`
//! canonicalizes them: release events carry `ModifierType::RELEASE` and the
//! NumLock bit (`MOD2`) is dropped so it never breaks hot-key comparisons.

use bitflags::bitflags;

bitflags! {
    /// Modifier state bits, laid out like the IBus / X11 modifier mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierType: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        /// Usually Alt
        const MOD1 = 1 << 3;
        /// Usually NumLock
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
        const RELEASE = 1 << 30;
    }
}

/// X11 keysym values inspected by the dispatcher.
///
/// Printable ASCII keysyms equal their code points.
pub mod keysym {
    pub const SPACE: u32 = 0x020;
    pub const COMMA: u32 = 0x02c;
    pub const MINUS: u32 = 0x02d;
    pub const PERIOD: u32 = 0x02e;
    pub const SLASH: u32 = 0x02f;
    pub const KEY_1: u32 = 0x031;
    pub const KEY_9: u32 = 0x039;
    pub const SEMICOLON: u32 = 0x03b;
    pub const EQUAL: u32 = 0x03d;

    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const KP_LEFT: u32 = 0xff96;
    pub const KP_UP: u32 = 0xff97;
    pub const KP_RIGHT: u32 = 0xff98;
    pub const KP_DOWN: u32 = 0xff99;
    pub const KP_PAGE_UP: u32 = 0xff9a;
    pub const KP_PAGE_DOWN: u32 = 0xff9b;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CONTROL_R: u32 = 0xffe4;
    pub const ALT_L: u32 = 0xffe9;
    pub const ALT_R: u32 = 0xffea;
    pub const DELETE: u32 = 0xffff;
}

/// A normalized key event. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Keysym value
    pub code: u32,
    /// Modifier mask, including `RELEASE` for key releases
    pub mask: ModifierType,
}

impl KeyEvent {
    /// Build an event from the raw host triple.
    ///
    /// Unknown bits in `state` are kept (hosts may set private bits), except
    /// NumLock which is always cleared.
    pub fn from_raw(keyval: u32, is_press: bool, state: u32) -> Self {
        let mut mask = ModifierType::from_bits_retain(state);
        if !is_press {
            mask |= ModifierType::RELEASE;
        }
        mask.remove(ModifierType::MOD2);
        Self { code: keyval, mask }
    }

    /// A key press with the given modifiers.
    pub fn press(code: u32, mask: ModifierType) -> Self {
        Self::from_raw(code, true, mask.bits())
    }

    /// A key release with the given modifiers (`RELEASE` is added).
    pub fn release(code: u32, mask: ModifierType) -> Self {
        Self::from_raw(code, false, mask.bits())
    }

    /// A plain press of a printable character.
    pub fn char(ch: char) -> Self {
        Self::press(ch as u32, ModifierType::empty())
    }

    pub fn is_release(&self) -> bool {
        self.mask.contains(ModifierType::RELEASE)
    }

    pub fn has_control(&self) -> bool {
        self.mask.contains(ModifierType::CONTROL)
    }

    pub fn has_alt(&self) -> bool {
        self.mask.contains(ModifierType::MOD1)
    }

    /// The key as a character when its keysym lies in the 7-bit range.
    pub fn printable_char(&self) -> Option<char> {
        if self.code <= 0x7f {
            char::from_u32(self.code)
        } else {
            None
        }
    }

    /// Check whether this event triggers the hot-key `(code, mask)`.
    ///
    /// Release hot-keys (mask containing `RELEASE`) only fire when the
    /// previous event was the press of the same key, so `Shift_L` used as a
    /// modifier for another key does not count.
    pub fn matches_hotkey(&self, code: u32, mask: ModifierType, prev: Option<&KeyEvent>) -> bool {
        if self.code != code || self.mask != mask {
            return false;
        }
        if !self.is_release() {
            return true;
        }
        matches!(prev, Some(prev) if prev.code == self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_release_and_numlock() {
        let state = (ModifierType::SHIFT | ModifierType::MOD2).bits();
        let key = KeyEvent::from_raw(keysym::SHIFT_L, false, state);
        assert!(key.is_release());
        assert!(!key.mask.contains(ModifierType::MOD2));
        assert_eq!(key.mask, ModifierType::SHIFT | ModifierType::RELEASE);
    }

    #[test]
    fn test_printable_char() {
        assert_eq!(KeyEvent::char('a').printable_char(), Some('a'));
        let bs = KeyEvent::press(keysym::BACKSPACE, ModifierType::empty());
        assert_eq!(bs.printable_char(), None);
    }

    #[test]
    fn test_release_hotkey_needs_matching_press() {
        let shift_mask = ModifierType::SHIFT | ModifierType::RELEASE;
        let press = KeyEvent::press(keysym::SHIFT_L, ModifierType::empty());
        let release = KeyEvent::release(keysym::SHIFT_L, ModifierType::SHIFT);

        assert!(release.matches_hotkey(keysym::SHIFT_L, shift_mask, Some(&press)));

        // Shift used as a modifier for 'A' in between
        let letter = KeyEvent::press('A' as u32, ModifierType::SHIFT);
        assert!(!release.matches_hotkey(keysym::SHIFT_L, shift_mask, Some(&letter)));
        assert!(!release.matches_hotkey(keysym::SHIFT_L, shift_mask, None));
    }

    #[test]
    fn test_press_hotkey_exact_mask() {
        let ctrl_period = KeyEvent::press(keysym::PERIOD, ModifierType::CONTROL);
        assert!(ctrl_period.matches_hotkey(keysym::PERIOD, ModifierType::CONTROL, None));
        let ctrl_shift = KeyEvent::press(keysym::PERIOD, ModifierType::CONTROL | ModifierType::SHIFT);
        assert!(!ctrl_shift.matches_hotkey(keysym::PERIOD, ModifierType::CONTROL, None));
    }
}
