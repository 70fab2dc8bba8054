// Keyboard shortcuts for the recording lifecycle.
//
// Pure mapping from a key press plus current state to a command, with the
// same guards the on-screen controls apply. Nothing fires while focus is
// inside a text input.

/// Key presses the recorder responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Char(char),
}

/// State snapshot the guards are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext {
    /// Recording or paused
    pub recording: bool,
    pub paused: bool,
    /// A backend submission is in flight
    pub processing: bool,
    /// A finalized recording or upload exists
    pub has_audio: bool,
    /// Focus is inside a text input; all shortcuts are suppressed
    pub in_text_input: bool,
}

/// Commands a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Start,
    Pause,
    Resume,
    Stop,
    Submit,
}

/// Map a key press to a command, or `None` when the guard rejects it.
///
/// Space starts a recording, P toggles pause, S stops, Enter submits.
pub fn command_for_key(key: Key, ctx: &KeyContext) -> Option<KeyCommand> {
    if ctx.in_text_input {
        return None;
    }

    match key {
        Key::Space if !ctx.processing && !ctx.recording => Some(KeyCommand::Start),
        Key::Char(c) if c.eq_ignore_ascii_case(&'p') && ctx.recording && !ctx.processing => {
            if ctx.paused {
                Some(KeyCommand::Resume)
            } else {
                Some(KeyCommand::Pause)
            }
        }
        Key::Char(c) if c.eq_ignore_ascii_case(&'s') && ctx.recording && !ctx.processing => {
            Some(KeyCommand::Stop)
        }
        Key::Enter if ctx.has_audio && !ctx.processing && !ctx.recording => {
            Some(KeyCommand::Submit)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> KeyContext {
        KeyContext {
            recording: false,
            paused: false,
            processing: false,
            has_audio: false,
            in_text_input: false,
        }
    }

    #[test]
    fn test_space_starts_only_when_idle() {
        assert_eq!(command_for_key(Key::Space, &idle()), Some(KeyCommand::Start));

        let recording = KeyContext {
            recording: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Space, &recording), None);

        let processing = KeyContext {
            processing: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Space, &processing), None);
    }

    #[test]
    fn test_p_toggles_pause_while_recording() {
        let recording = KeyContext {
            recording: true,
            ..idle()
        };
        assert_eq!(
            command_for_key(Key::Char('p'), &recording),
            Some(KeyCommand::Pause)
        );
        assert_eq!(
            command_for_key(Key::Char('P'), &recording),
            Some(KeyCommand::Pause)
        );

        let paused = KeyContext {
            recording: true,
            paused: true,
            ..idle()
        };
        assert_eq!(
            command_for_key(Key::Char('p'), &paused),
            Some(KeyCommand::Resume)
        );

        assert_eq!(command_for_key(Key::Char('p'), &idle()), None);
    }

    #[test]
    fn test_s_stops_only_while_recording() {
        let recording = KeyContext {
            recording: true,
            ..idle()
        };
        assert_eq!(
            command_for_key(Key::Char('s'), &recording),
            Some(KeyCommand::Stop)
        );
        assert_eq!(command_for_key(Key::Char('s'), &idle()), None);
    }

    #[test]
    fn test_enter_submits_only_with_audio_at_rest() {
        let ready = KeyContext {
            has_audio: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Enter, &ready), Some(KeyCommand::Submit));

        let busy = KeyContext {
            has_audio: true,
            processing: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Enter, &busy), None);

        let still_recording = KeyContext {
            has_audio: true,
            recording: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Enter, &still_recording), None);
    }

    #[test]
    fn test_text_input_focus_suppresses_everything() {
        let typing = KeyContext {
            has_audio: true,
            in_text_input: true,
            ..idle()
        };
        assert_eq!(command_for_key(Key::Space, &typing), None);
        assert_eq!(command_for_key(Key::Enter, &typing), None);
        assert_eq!(command_for_key(Key::Char('s'), &typing), None);
    }
}
