//! Symbolic key names for scripted and interactive sessions.
//!
//! A key line is typed character by character. `<Name>` sends a named key,
//! and modifier prefixes `C-` (Control), `A-` (Alt) and `S-` (Shift) may
//! precede the name or a single character: `<C-comma>`, `<A-2>`,
//! `<S-space>`. Modifier keys themselves (`<Shift_L>`, `<Shift_R>`) send a
//! press followed by a release, which is what the mode hot-keys expect.

use anyhow::{bail, Result};
use libtable_core::{keysym, KeyEvent, ModifierType};
use phf::phf_map;

/// Lowercased key name to keysym.
static KEY_NAMES: phf::Map<&'static str, u32> = phf_map! {
    "space" => keysym::SPACE,
    "comma" => keysym::COMMA,
    "minus" => keysym::MINUS,
    "period" => keysym::PERIOD,
    "slash" => keysym::SLASH,
    "semicolon" => keysym::SEMICOLON,
    "equal" => keysym::EQUAL,
    "lt" => 0x03c,
    "gt" => 0x03e,
    "backspace" => keysym::BACKSPACE,
    "tab" => keysym::TAB,
    "return" => keysym::RETURN,
    "enter" => keysym::RETURN,
    "escape" => keysym::ESCAPE,
    "esc" => keysym::ESCAPE,
    "home" => keysym::HOME,
    "end" => keysym::END,
    "left" => keysym::LEFT,
    "up" => keysym::UP,
    "right" => keysym::RIGHT,
    "down" => keysym::DOWN,
    "page_up" => keysym::PAGE_UP,
    "page_down" => keysym::PAGE_DOWN,
    "kp_enter" => keysym::KP_ENTER,
    "kp_left" => keysym::KP_LEFT,
    "kp_up" => keysym::KP_UP,
    "kp_right" => keysym::KP_RIGHT,
    "kp_down" => keysym::KP_DOWN,
    "kp_page_up" => keysym::KP_PAGE_UP,
    "kp_page_down" => keysym::KP_PAGE_DOWN,
    "shift_l" => keysym::SHIFT_L,
    "shift_r" => keysym::SHIFT_R,
    "control_l" => keysym::CONTROL_L,
    "control_r" => keysym::CONTROL_R,
    "alt_l" => keysym::ALT_L,
    "alt_r" => keysym::ALT_R,
    "delete" => keysym::DELETE,
};

/// Keysym for a key name, case-insensitive. Single characters map to their
/// own code.
pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(ch as u32);
    }
    KEY_NAMES.get(name.to_lowercase().as_str()).copied()
}

/// Modifier bit a key contributes to the mask while held.
fn modifier_of(code: u32) -> Option<ModifierType> {
    match code {
        keysym::SHIFT_L | keysym::SHIFT_R => Some(ModifierType::SHIFT),
        keysym::CONTROL_L | keysym::CONTROL_R => Some(ModifierType::CONTROL),
        keysym::ALT_L | keysym::ALT_R => Some(ModifierType::MOD1),
        _ => None,
    }
}

/// Parse `C-A-name` into a keysym and modifier mask.
pub fn parse_key_spec(spec: &str) -> Result<(u32, ModifierType)> {
    let mut mask = ModifierType::empty();
    let mut rest = spec;
    loop {
        let Some((prefix, tail)) = rest.split_once('-') else {
            break;
        };
        if tail.is_empty() {
            break;
        }
        match prefix {
            "C" => mask |= ModifierType::CONTROL,
            "A" => mask |= ModifierType::MOD1,
            "S" => mask |= ModifierType::SHIFT,
            _ => break,
        }
        rest = tail;
    }
    match keysym_from_name(rest) {
        Some(code) => Ok((code, mask)),
        None => bail!("unknown key name {:?}", spec),
    }
}

/// Expand one named key into the events a keyboard would send.
fn named_key_events(spec: &str) -> Result<Vec<KeyEvent>> {
    let (code, mask) = parse_key_spec(spec)?;
    Ok(match modifier_of(code) {
        Some(bit) => vec![KeyEvent::press(code, mask), KeyEvent::release(code, mask | bit)],
        None => vec![KeyEvent::press(code, mask)],
    })
}

/// Turn a key line into key events.
///
/// ```
/// # use libtable::keys::parse_key_line;
/// let keys = parse_key_line("wq<space>").unwrap();
/// assert_eq!(keys.len(), 3);
/// ```
pub fn parse_key_line(line: &str) -> Result<Vec<KeyEvent>> {
    let mut events = Vec::new();
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch != '<' {
            events.push(KeyEvent::char(ch));
            continue;
        }
        let spec: String = chars.by_ref().take_while(|&c| c != '>').collect();
        if spec.is_empty() {
            // "<>" stands for a literal '<'
            events.push(KeyEvent::char('<'));
            continue;
        }
        events.extend(named_key_events(&spec)?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keysym_from_name() {
        assert_eq!(keysym_from_name("space"), Some(keysym::SPACE));
        assert_eq!(keysym_from_name("BackSpace"), Some(keysym::BACKSPACE));
        assert_eq!(keysym_from_name("Page_Down"), Some(keysym::PAGE_DOWN));
        assert_eq!(keysym_from_name("a"), Some('a' as u32));
        assert_eq!(keysym_from_name("nosuchkey"), None);
    }

    #[test]
    fn test_parse_key_spec_modifiers() {
        assert_eq!(
            parse_key_spec("C-comma").unwrap(),
            (keysym::COMMA, ModifierType::CONTROL)
        );
        assert_eq!(
            parse_key_spec("C-A-2").unwrap(),
            ('2' as u32, ModifierType::CONTROL | ModifierType::MOD1)
        );
        // A bare minus is a key, not a prefix separator
        assert_eq!(parse_key_spec("-").unwrap(), (keysym::MINUS, ModifierType::empty()));
        assert_eq!(parse_key_spec("C--").unwrap(), (keysym::MINUS, ModifierType::CONTROL));
        assert!(parse_key_spec("X-a").is_err());
    }

    #[test]
    fn test_parse_key_line() {
        let events = parse_key_line("zh<A-1><Shift_L><>").unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], KeyEvent::char('z'));
        assert_eq!(events[2], KeyEvent::press('1' as u32, ModifierType::MOD1));
        assert_eq!(events[3], KeyEvent::press(keysym::SHIFT_L, ModifierType::empty()));
        assert!(events[4].is_release());
        assert_eq!(events[4].code, keysym::SHIFT_L);
        assert_eq!(events[5], KeyEvent::char('<'));
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        assert!(parse_key_line("a<Hyper_Q>").is_err());
    }
}
