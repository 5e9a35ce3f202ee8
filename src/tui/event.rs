//! Raw terminal input decoding.
//!
//! Turns whatever a single stdin read returned into structured key events.
//! Handles:
//! - Printable UTF-8 (one event per codepoint, multi-byte included)
//! - Control bytes (Ctrl+A through Ctrl+Z, Enter, Tab, Backspace)
//! - CSI sequences (`ESC [ params final`) with xterm modifier parameters
//! - SS3 sequences (`ESC O final`), the "application cursor" arrow encoding
//! - `ESC <key>` as Alt+key, and a lone `ESC` as Escape
//!
//! Decoding never fails. Sequences it can't make sense of degrade to an
//! Escape key-press (complete but unknown sequences) or are dropped
//! (invalid UTF-8).

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Escape,
    Enter,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// A character key; the codepoint is in `Key::ch`
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub name: KeyName,
    pub ch: Option<char>,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Key {
    pub fn named(name: KeyName) -> Self {
        Self {
            name,
            ch: None,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub fn char(ch: char) -> Self {
        Self {
            ch: Some(ch),
            ..Self::named(KeyName::Char)
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn with_modifiers(mut self, mods: Modifiers) -> Self {
        self.shift |= mods.shift;
        self.alt |= mods.alt;
        self.ctrl |= mods.ctrl;
        self
    }
}

/// A decoded key press plus the exact text that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    shift: bool,
    alt: bool,
    ctrl: bool,
}

impl Modifiers {
    /// xterm modifier parameter: 1 + (shift=1 | alt=2 | ctrl=4).
    fn from_param(param: Option<u32>) -> Self {
        match param {
            Some(value @ 2..=8) => {
                let bits = value - 1;
                Self {
                    shift: bits & 1 != 0,
                    alt: bits & 2 != 0,
                    ctrl: bits & 4 != 0,
                }
            }
            _ => Self::default(),
        }
    }
}

/// Decode a raw stdin buffer into key events, preserving order.
pub fn decode(buffer: &[u8]) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut pos = 0;

    while pos < buffer.len() {
        let rest = &buffer[pos..];
        let (event, consumed) = if rest[0] == ESC {
            decode_escape(rest)
        } else {
            decode_plain(rest)
        };
        if let Some(event) = event {
            log::debug!("Decoded key {:?} from {:?}", event.key, event.raw);
            events.push(event);
        }
        pos += consumed.max(1);
    }

    events
}

/// Decode one codepoint that doesn't start with ESC.
fn decode_plain(bytes: &[u8]) -> (Option<InputEvent>, usize) {
    match read_codepoint(bytes) {
        Some((ch, len)) => {
            let event = InputEvent {
                key: key_for_char(ch),
                raw: ch.to_string(),
            };
            (Some(event), len)
        }
        None => (None, 1),
    }
}

fn key_for_char(ch: char) -> Key {
    match ch {
        '\r' | '\n' => Key::named(KeyName::Enter),
        '\t' => Key::named(KeyName::Tab),
        '\x7f' | '\x08' => Key::named(KeyName::Backspace),
        '\0' => Key::char(' ').ctrl(),
        '\x01'..='\x1a' => Key::char((ch as u8 - 1 + b'a') as char).ctrl(),
        '\x1c'..='\x1f' => Key::char((ch as u8 + 0x40) as char).ctrl(),
        _ => Key::char(ch),
    }
}

/// Read one UTF-8 codepoint from the front of `bytes`.
///
/// Returns `None` for a malformed or truncated lead byte; the caller skips one byte.
fn read_codepoint(bytes: &[u8]) -> Option<(char, usize)> {
    let width = match bytes[0] {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    let slice = bytes.get(..width)?;
    let text = std::str::from_utf8(slice).ok()?;
    text.chars().next().map(|ch| (ch, width))
}

/// Decode a sequence starting with ESC.
fn decode_escape(bytes: &[u8]) -> (Option<InputEvent>, usize) {
    let lone_escape = || {
        let event = InputEvent {
            key: Key::named(KeyName::Escape),
            raw: "\x1b".to_string(),
        };
        (Some(event), 1)
    };

    match bytes.get(1) {
        None | Some(&ESC) => lone_escape(),
        Some(b'[') => match scan_csi(bytes) {
            Some(len) => (Some(csi_event(&bytes[..len])), len),
            // Incomplete: treat as Alt+[ and let the rest decode as text
            None => alt_event(bytes).unwrap_or_else(lone_escape),
        },
        Some(b'O') if bytes.get(2).is_some_and(|b| (0x40..=0x7e).contains(b)) => {
            (Some(ss3_event(&bytes[..3])), 3)
        }
        Some(_) => alt_event(bytes).unwrap_or_else(lone_escape),
    }
}

/// `ESC <key>` → the key with Alt held.
fn alt_event(bytes: &[u8]) -> Option<(Option<InputEvent>, usize)> {
    let (event, len) = decode_plain(&bytes[1..]);
    let event = event?;
    let alt = InputEvent {
        key: event.key.alt(),
        raw: format!("\x1b{}", event.raw),
    };
    Some((Some(alt), len + 1))
}

/// Length of a complete `ESC [ [0-9;]* [A-Za-z~]` sequence, if one is present.
fn scan_csi(bytes: &[u8]) -> Option<usize> {
    let mut index = 2;
    while let Some(byte) = bytes.get(index) {
        match byte {
            b'0'..=b'9' | b';' => index += 1,
            b'A'..=b'Z' | b'a'..=b'z' | b'~' => return Some(index + 1),
            _ => return None,
        }
    }
    None
}

fn csi_event(sequence: &[u8]) -> InputEvent {
    let raw = String::from_utf8_lossy(sequence).into_owned();
    let body = &raw[2..];
    let key = parse_csi(body).unwrap_or_else(|| {
        log::debug!("Unrecognized CSI sequence {:?}, reporting Escape", raw);
        Key::named(KeyName::Escape)
    });
    InputEvent { key, raw }
}

fn parse_csi(body: &str) -> Option<Key> {
    // Ctrl+Enter: kitty/fixterms form and xterm modifyOtherKeys form
    if body == "13;5u" || body == "27;5;13~" {
        return Some(Key::named(KeyName::Enter).ctrl());
    }

    let (params, last) = body.split_at(body.len() - 1);
    let final_char = last.chars().next()?;
    let params: Vec<Option<u32>> = if params.is_empty() {
        Vec::new()
    } else {
        params.split(';').map(|p| p.parse().ok()).collect()
    };
    let mods = if params.len() >= 2 {
        Modifiers::from_param(params[params.len() - 1])
    } else {
        Modifiers::default()
    };

    let name = match final_char {
        'A' => KeyName::Up,
        'B' => KeyName::Down,
        'C' => KeyName::Right,
        'D' => KeyName::Left,
        'H' => KeyName::Home,
        'F' => KeyName::End,
        'Z' => return Some(Key::named(KeyName::Tab).shift().with_modifiers(mods)),
        '~' => match params.first().copied().flatten() {
            Some(1 | 7) => KeyName::Home,
            Some(3) => KeyName::Delete,
            Some(4 | 8) => KeyName::End,
            Some(5) => KeyName::PageUp,
            Some(6) => KeyName::PageDown,
            _ => return None,
        },
        _ => return None,
    };
    Some(Key::named(name).with_modifiers(mods))
}

fn ss3_event(sequence: &[u8]) -> InputEvent {
    let raw = String::from_utf8_lossy(sequence).into_owned();
    let name = match sequence[2] {
        b'A' => KeyName::Up,
        b'B' => KeyName::Down,
        b'C' => KeyName::Right,
        b'D' => KeyName::Left,
        b'H' => KeyName::Home,
        b'F' => KeyName::End,
        _ => {
            log::debug!("Unrecognized SS3 sequence {:?}, reporting Escape", raw);
            KeyName::Escape
        }
    };
    InputEvent {
        key: Key::named(name),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(bytes: &[u8]) -> Vec<Key> {
        decode(bytes).into_iter().map(|e| e.key).collect()
    }

    fn single(bytes: &[u8]) -> Key {
        let events = decode(bytes);
        assert_eq!(events.len(), 1, "expected one event for {:?}", bytes);
        events[0].key
    }

    #[test]
    fn test_printable_ascii_one_event_per_byte() {
        let input: Vec<u8> = (0x20u8..0x7f).collect();
        let events = decode(&input);
        assert_eq!(events.len(), input.len());
        for (event, byte) in events.iter().zip(&input) {
            assert_eq!(event.key, Key::char(*byte as char));
            assert!(!event.key.ctrl && !event.key.alt && !event.key.shift);
        }
    }

    #[test]
    fn test_plain_chars_keep_order() {
        assert_eq!(keys(b"jk"), vec![Key::char('j'), Key::char('k')]);
    }

    #[test]
    fn test_multibyte_utf8() {
        let events = decode("é日🙂".as_bytes());
        let chars: Vec<Option<char>> = events.iter().map(|e| e.key.ch).collect();
        assert_eq!(chars, vec![Some('é'), Some('日'), Some('🙂')]);
        assert_eq!(events[2].raw, "🙂");
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(single(&[0x03]), Key::char('c').ctrl());
        assert_eq!(single(&[0x01]), Key::char('a').ctrl());
        assert_eq!(single(&[0x1a]), Key::char('z').ctrl());
        assert_eq!(single(&[0x17]), Key::char('w').ctrl());
        assert_eq!(single(&[0x00]), Key::char(' ').ctrl());
        assert_eq!(single(&[0x1f]), Key::char('_').ctrl());
    }

    #[test]
    fn test_named_control_keys() {
        assert_eq!(single(b"\r"), Key::named(KeyName::Enter));
        assert_eq!(single(b"\n"), Key::named(KeyName::Enter));
        assert_eq!(single(b"\t"), Key::named(KeyName::Tab));
        assert_eq!(single(&[0x7f]), Key::named(KeyName::Backspace));
        assert_eq!(single(&[0x08]), Key::named(KeyName::Backspace));
    }

    #[test]
    fn test_lone_escape() {
        let events = decode(&[0x1b]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::named(KeyName::Escape));
        assert_eq!(events[0].raw, "\x1b");
    }

    #[test]
    fn test_double_escape_is_two_escapes() {
        assert_eq!(
            keys(&[0x1b, 0x1b]),
            vec![Key::named(KeyName::Escape), Key::named(KeyName::Escape)]
        );
    }

    #[test]
    fn test_csi_and_ss3_arrows_match() {
        assert_eq!(single(&[0x1b, 0x5b, 0x41]), Key::named(KeyName::Up));
        assert_eq!(single(&[0x1b, 0x4f, 0x41]), Key::named(KeyName::Up));
        assert_eq!(single(b"\x1b[B"), Key::named(KeyName::Down));
        assert_eq!(single(b"\x1bOC"), Key::named(KeyName::Right));
        assert_eq!(single(b"\x1b[D"), Key::named(KeyName::Left));
    }

    #[test]
    fn test_home_end_forms() {
        for seq in [&b"\x1b[H"[..], b"\x1b[1~", b"\x1b[7~", b"\x1bOH"] {
            assert_eq!(single(seq), Key::named(KeyName::Home), "{:?}", seq);
        }
        for seq in [&b"\x1b[F"[..], b"\x1b[4~", b"\x1b[8~", b"\x1bOF"] {
            assert_eq!(single(seq), Key::named(KeyName::End), "{:?}", seq);
        }
    }

    #[test]
    fn test_tilde_keys() {
        assert_eq!(single(b"\x1b[3~"), Key::named(KeyName::Delete));
        assert_eq!(single(b"\x1b[5~"), Key::named(KeyName::PageUp));
        assert_eq!(single(b"\x1b[6~"), Key::named(KeyName::PageDown));
    }

    #[test]
    fn test_modifier_parameters() {
        assert_eq!(single(b"\x1b[1;2A"), Key::named(KeyName::Up).shift());
        assert_eq!(single(b"\x1b[1;3B"), Key::named(KeyName::Down).alt());
        assert_eq!(single(b"\x1b[1;4C"), Key::named(KeyName::Right).shift().alt());
        assert_eq!(single(b"\x1b[1;5D"), Key::named(KeyName::Left).ctrl());
        assert_eq!(single(b"\x1b[1;6H"), Key::named(KeyName::Home).shift().ctrl());
        assert_eq!(single(b"\x1b[3;7~"), Key::named(KeyName::Delete).alt().ctrl());
        assert_eq!(
            single(b"\x1b[5;8~"),
            Key::named(KeyName::PageUp).shift().alt().ctrl()
        );
    }

    #[test]
    fn test_ctrl_enter_forms() {
        let events = decode(&[0x1b, 0x5b, 0x31, 0x33, 0x3b, 0x35, 0x75]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::named(KeyName::Enter).ctrl());
        assert_eq!(events[0].raw, "\x1b[13;5u");

        assert_eq!(single(b"\x1b[27;5;13~"), Key::named(KeyName::Enter).ctrl());
    }

    #[test]
    fn test_shift_tab() {
        assert_eq!(single(b"\x1b[Z"), Key::named(KeyName::Tab).shift());
    }

    #[test]
    fn test_alt_prefix() {
        let events = decode(b"\x1bx");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::char('x').alt());
        assert_eq!(events[0].raw, "\x1bx");

        assert_eq!(single("\x1bé".as_bytes()), Key::char('é').alt());
        assert_eq!(single(b"\x1b\r"), Key::named(KeyName::Enter).alt());
    }

    #[test]
    fn test_concatenated_sequences_split() {
        assert_eq!(
            keys(b"\x1b[A\x1b[Bq"),
            vec![
                Key::named(KeyName::Up),
                Key::named(KeyName::Down),
                Key::char('q')
            ]
        );
        assert_eq!(
            keys(b"ab\x1b"),
            vec![Key::char('a'), Key::char('b'), Key::named(KeyName::Escape)]
        );
    }

    #[test]
    fn test_unknown_csi_degrades_to_escape() {
        let events = decode(b"\x1b[15~x");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, Key::named(KeyName::Escape));
        assert_eq!(events[0].raw, "\x1b[15~");
        assert_eq!(events[1].key, Key::char('x'));
    }

    #[test]
    fn test_incomplete_csi_is_alt_bracket() {
        assert_eq!(single(b"\x1b["), Key::char('[').alt());
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        assert_eq!(keys(&[b'a', 0xff, b'b']), vec![Key::char('a'), Key::char('b')]);
        // Truncated multi-byte sequence
        assert_eq!(keys(&[0xe6, 0x97]), vec![]);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(decode(&[]).is_empty());
    }
}
