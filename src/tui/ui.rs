use crate::core::state::{Focus, Mode, TuiState};
use crate::tui::ansi::{clear, cursor};
use crate::tui::component::{Component, Frame};
use crate::tui::components::{ChatList, HelpOverlay, InputBox, MessageList, StatusBar};
use crate::tui::layout::{Region, layout};

/// Produce one full repaint of `state` as an escape-coded string.
///
/// Every frame starts by hiding the cursor and clearing the screen; nothing
/// is diffed against the previous frame. The cursor is shown again, parked
/// in the input box, only in Insert mode.
pub fn render(state: &TuiState) -> String {
    let rows = state.screen_size.rows.max(1);
    let cols = state.screen_size.cols.max(1);
    let regions = layout(rows, cols);
    let mut frame = Frame::new();

    frame.push(cursor::HIDE);
    frame.push(cursor::HOME);
    frame.push(clear::SCREEN);

    StatusBar::new(state.mode, state.focus, state.streaming.active)
        .render(&mut frame, regions.status_bar);

    ChatList::new(
        &state.chats,
        state.selected_chat_index,
        state.focus == Focus::ChatList,
    )
    .render(&mut frame, regions.chat_list);

    MessageList {
        messages: &state.messages,
        scroll_offset: state.message_scroll_offset,
        streaming: state
            .streaming
            .active
            .then_some(state.streaming.content.as_str()),
        error: state.error.as_deref(),
        focused: state.focus == Focus::Messages,
    }
    .render(&mut frame, regions.messages);

    let mut input = InputBox::new(
        &state.input_buffer,
        state.cursor_position,
        state.mode,
        state.focus == Focus::Input,
    );
    input.render(&mut frame, regions.input);

    if state.show_help {
        let screen = Region {
            row: 1,
            col: 1,
            width: cols,
            height: rows,
        };
        HelpOverlay.render(&mut frame, screen);
    }

    if state.mode == Mode::Insert {
        let (row, col) = input.cursor();
        frame.push(&cursor::move_to(row, col));
        frame.push(cursor::SHOW);
    }

    frame.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{Role, ScreenSize, Streaming};
    use crate::test_support::{chats, message, strip_ansi};

    fn state(rows: u16, cols: u16) -> TuiState {
        TuiState {
            screen_size: ScreenSize { rows, cols },
            ..Default::default()
        }
    }

    #[test]
    fn test_frame_starts_with_hide_and_clear() {
        let out = render(&state(12, 60));
        assert!(out.starts_with("\x1b[?25l\x1b[H\x1b[2J"));
    }

    #[test]
    fn test_mode_indicator() {
        assert!(render(&state(12, 60)).contains("[NORMAL]"));
        let insert = TuiState {
            mode: Mode::Insert,
            ..state(12, 60)
        };
        assert!(render(&insert).contains("[INSERT]"));
    }

    #[test]
    fn test_focus_shown() {
        let s = TuiState {
            focus: Focus::Messages,
            ..state(12, 60)
        };
        assert!(render(&s).contains("Focus: messages"));
    }

    #[test]
    fn test_chat_selection() {
        let s = TuiState {
            chats: chats(&["Chat Alpha", "Chat Beta"]),
            selected_chat_index: 1,
            ..state(12, 60)
        };
        assert!(render(&s).contains("> Chat Beta"));
    }

    #[test]
    fn test_messages_and_streaming() {
        let s = TuiState {
            messages: vec![
                message(1, Role::User, "Hi"),
                message(2, Role::Assistant, "Hello"),
            ],
            streaming: Streaming {
                active: true,
                content: "Thinking".to_string(),
                chat_id: Some(1),
            },
            ..state(12, 60)
        };
        let out = render(&s);
        assert!(out.contains("You:"));
        assert!(out.contains("AI:"));
        assert!(out.contains("Thinking█"));
        assert!(out.contains("Streaming..."));
    }

    #[test]
    fn test_error_overlay() {
        let s = TuiState {
            error: Some("Something went wrong".to_string()),
            ..state(12, 60)
        };
        assert!(render(&s).contains("Something went wrong"));
    }

    #[test]
    fn test_input_prompt() {
        let s = TuiState {
            input_buffer: "Hello".to_string(),
            cursor_position: 5,
            ..state(12, 60)
        };
        assert!(strip_ansi(&render(&s)).contains("> Hello"));
    }

    #[test]
    fn test_help_overlay() {
        let s = TuiState {
            show_help: true,
            ..state(30, 80)
        };
        let out = strip_ansi(&render(&s));
        assert!(out.contains("Help"));
        assert!(out.contains("NORMAL MODE"));
        assert!(out.contains("Press ? or Esc to close"));

        let hidden = strip_ansi(&render(&state(30, 80)));
        assert!(!hidden.contains("Press ? or Esc to close"));
    }

    #[test]
    fn test_cursor_visibility_by_mode() {
        let normal = render(&state(12, 60));
        assert!(normal.contains(cursor::HIDE));
        assert!(!normal.contains(cursor::SHOW));

        let insert = TuiState {
            mode: Mode::Insert,
            input_buffer: "ab".to_string(),
            cursor_position: 1,
            ..state(12, 60)
        };
        // Input region starts at row 10; text row 11, col 2 + "> " + 1
        assert!(render(&insert).ends_with("\x1b[11;5H\x1b[?25h"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let s = TuiState {
            chats: chats(&["a", "b", "c"]),
            ..state(24, 80)
        };
        assert_eq!(render(&s), render(&s));
    }

    #[test]
    fn test_degenerate_sizes_do_not_panic() {
        for (rows, cols) in [(1, 1), (2, 3), (0, 0), (5, 200), (200, 5)] {
            let _ = render(&state(rows, cols));
        }
    }
}
