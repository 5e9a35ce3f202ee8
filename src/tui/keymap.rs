//! Keybinding resolution.
//!
//! Maps a decoded key event plus the current mode to the actions it applies
//! locally and the commands it asks the event loop to run. Bindings are an
//! ordered list and the first match wins, so catch-all rules (like "any
//! printable character inserts itself") go last.

use crate::core::action::{Action, Command, LAST_INDEX};
use crate::core::config::DEFAULT_SCROLL_STEP;
use crate::core::state::{Focus, Mode};
use crate::tui::event::{InputEvent, KeyName};

/// What a key press turned into. Both lists empty means "unbound".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeybindResult {
    pub actions: Vec<Action>,
    pub commands: Vec<Command>,
}

impl KeybindResult {
    pub fn actions(actions: Vec<Action>) -> Self {
        Self {
            actions,
            commands: Vec::new(),
        }
    }

    pub fn commands(commands: Vec<Command>) -> Self {
        Self {
            actions: Vec::new(),
            commands,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.commands.is_empty()
    }
}

type Matcher = Box<dyn Fn(&InputEvent, Mode) -> bool + Send + Sync>;
type Producer = Box<dyn Fn(&InputEvent, Mode) -> KeybindResult + Send + Sync>;

pub struct Binding {
    matches: Matcher,
    result: Producer,
}

impl Binding {
    pub fn new(
        matches: impl Fn(&InputEvent, Mode) -> bool + Send + Sync + 'static,
        result: impl Fn(&InputEvent, Mode) -> KeybindResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            matches: Box::new(matches),
            result: Box::new(result),
        }
    }

    /// A binding active in `mode` that always yields the same actions.
    pub fn action(mode: Mode, pattern: impl Into<Patterns>, actions: Vec<Action>) -> Self {
        let patterns = pattern.into();
        Self::new(
            move |event, current| current == mode && patterns.matches(event),
            move |_, _| KeybindResult::actions(actions.clone()),
        )
    }

    /// A binding active in `mode` that always yields the same commands.
    pub fn command(mode: Mode, pattern: impl Into<Patterns>, commands: Vec<Command>) -> Self {
        let patterns = pattern.into();
        Self::new(
            move |event, current| current == mode && patterns.matches(event),
            move |_, _| KeybindResult::commands(commands.clone()),
        )
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").finish_non_exhaustive()
    }
}

/// Matches one key. Modifiers left as `None` are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPattern {
    name: KeyName,
    ch: Option<char>,
    ctrl: Option<bool>,
    alt: Option<bool>,
    shift: Option<bool>,
}

impl KeyPattern {
    pub fn key(name: KeyName) -> Self {
        Self {
            name,
            ch: None,
            ctrl: None,
            alt: None,
            shift: None,
        }
    }

    pub fn char(ch: char) -> Self {
        Self {
            ch: Some(ch),
            ..Self::key(KeyName::Char)
        }
    }

    pub fn ctrl(mut self, held: bool) -> Self {
        self.ctrl = Some(held);
        self
    }

    pub fn alt(mut self, held: bool) -> Self {
        self.alt = Some(held);
        self
    }

    pub fn shift(mut self, held: bool) -> Self {
        self.shift = Some(held);
        self
    }

    pub fn matches(&self, event: &InputEvent) -> bool {
        let key = &event.key;
        if key.name != self.name {
            return false;
        }
        if self.name == KeyName::Char && key.ch != self.ch {
            return false;
        }
        let modifier_ok = |want: Option<bool>, have: bool| want.is_none_or(|w| w == have);
        modifier_ok(self.ctrl, key.ctrl)
            && modifier_ok(self.alt, key.alt)
            && modifier_ok(self.shift, key.shift)
    }
}

/// One or more alternative key patterns for the same binding.
#[derive(Debug, Clone)]
pub struct Patterns(Vec<KeyPattern>);

impl Patterns {
    fn matches(&self, event: &InputEvent) -> bool {
        self.0.iter().any(|p| p.matches(event))
    }
}

impl From<KeyPattern> for Patterns {
    fn from(pattern: KeyPattern) -> Self {
        Patterns(vec![pattern])
    }
}

impl<const N: usize> From<[KeyPattern; N]> for Patterns {
    fn from(patterns: [KeyPattern; N]) -> Self {
        Patterns(patterns.to_vec())
    }
}

/// Resolve `event` against `bindings` in order. Unbound keys resolve to an empty result.
pub fn resolve(event: &InputEvent, mode: Mode, bindings: &[Binding]) -> KeybindResult {
    bindings
        .iter()
        .find(|binding| (binding.matches)(event, mode))
        .map(|binding| (binding.result)(event, mode))
        .unwrap_or_default()
}

pub fn default_bindings() -> Vec<Binding> {
    bindings_with_scroll_step(DEFAULT_SCROLL_STEP)
}

/// The default keymap, with Ctrl+D / Ctrl+U scrolling by `scroll_step`.
pub fn bindings_with_scroll_step(scroll_step: i64) -> Vec<Binding> {
    use KeyPattern as K;
    use Mode::{Insert, Normal};

    let enter_insert = vec![
        Action::SetMode { mode: Insert },
        Action::SetFocus {
            focus: Focus::Input,
        },
    ];

    vec![
        // Normal mode
        Binding::command(
            Normal,
            [K::char('q'), K::char('c').ctrl(true)],
            vec![Command::Quit],
        ),
        Binding::action(Normal, [K::char('i'), K::char('a')], enter_insert),
        Binding::action(
            Normal,
            [K::char('j'), K::key(KeyName::Down)],
            vec![Action::MoveSelection { delta: 1 }],
        ),
        Binding::action(
            Normal,
            [K::char('k'), K::key(KeyName::Up)],
            vec![Action::MoveSelection { delta: -1 }],
        ),
        Binding::action(
            Normal,
            K::char('G'),
            vec![Action::SelectChat { index: LAST_INDEX }],
        ),
        Binding::action(
            Normal,
            K::key(KeyName::Tab).shift(false),
            vec![Action::FocusNext],
        ),
        Binding::action(
            Normal,
            K::key(KeyName::Tab).shift(true),
            vec![Action::FocusPrev],
        ),
        Binding::action(
            Normal,
            K::char('h'),
            vec![Action::SetFocus {
                focus: Focus::ChatList,
            }],
        ),
        Binding::action(
            Normal,
            K::char('l'),
            vec![Action::SetFocus {
                focus: Focus::Messages,
            }],
        ),
        Binding::action(
            Normal,
            K::char('d').ctrl(true),
            vec![Action::ScrollMessages { delta: scroll_step }],
        ),
        Binding::action(
            Normal,
            K::char('u').ctrl(true),
            vec![Action::ScrollMessages {
                delta: -scroll_step,
            }],
        ),
        Binding::command(Normal, K::char('n'), vec![Command::CreateChat]),
        Binding::action(Normal, K::char('?'), vec![Action::ToggleHelp]),
        Binding::action(
            Normal,
            K::key(KeyName::Escape),
            vec![Action::SetHelp { visible: false }],
        ),
        // Insert mode
        Binding::action(
            Insert,
            K::key(KeyName::Escape),
            vec![Action::SetMode { mode: Normal }],
        ),
        Binding::command(
            Insert,
            K::key(KeyName::Enter).ctrl(false),
            vec![Command::SendMessage],
        ),
        Binding::action(
            Insert,
            K::key(KeyName::Enter).ctrl(true),
            vec![Action::InsertChar { ch: '\n' }],
        ),
        Binding::action(Insert, K::key(KeyName::Backspace), vec![Action::DeleteChar]),
        Binding::action(Insert, K::char('w').ctrl(true), vec![Action::DeleteWord]),
        Binding::action(Insert, K::char('u').ctrl(true), vec![Action::ClearInput]),
        // Must stay last: any other printable character inserts itself
        Binding::new(
            |event, mode| mode == Insert && is_printable(event),
            |event, _| match event.key.ch {
                Some(ch) => KeybindResult::actions(vec![Action::InsertChar { ch }]),
                None => KeybindResult::default(),
            },
        ),
    ]
}

fn is_printable(event: &InputEvent) -> bool {
    let key = &event.key;
    key.name == KeyName::Char && key.ch.is_some() && !key.ctrl && !key.alt
}
