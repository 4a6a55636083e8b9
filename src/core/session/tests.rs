use super::*;
use crate::ui::markdown::TerminalMarkdown;
use ratatui::text::Line;
use std::sync::Mutex;

/// Records every text it is asked to render.
#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<(String, RenderOptions)>>,
}

impl MarkdownRenderer for RecordingRenderer {
    fn render(&self, text: &str, options: RenderOptions) -> Vec<Line<'static>> {
        self.calls
            .lock()
            .expect("renderer lock")
            .push((text.to_string(), options));
        vec![Line::from(format!("rendered:{text}"))]
    }
}

fn session() -> ChatSession {
    ChatSession::new(
        "gpt-4o-mini-2024-07-18",
        "openai",
        Arc::new(TerminalMarkdown::default()),
    )
}

fn texts(session: &ChatSession) -> Vec<(Speaker, String)> {
    session
        .transcript()
        .iter()
        .map(|m| (m.speaker(), m.text().to_string()))
        .collect()
}

fn submit(session: &mut ChatSession, input: &str) -> Option<ChatCommand> {
    session.apply(ChatAction::Submit {
        input: input.to_string(),
    })
}

fn run_command(session: &mut ChatSession, command: &str) -> Option<ChatCommand> {
    session.apply(ChatAction::EnterCommandMode);
    for ch in command.chars() {
        session.apply(ChatAction::CommandChar(ch));
    }
    session.apply(ChatAction::ExecuteCommand)
}

#[test]
fn new_session_starts_in_insert_mode() {
    let session = session();
    assert_eq!(session.mode(), Mode::Insert);
    assert_eq!(session.focus(), Focus::Input);
    assert!(session.is_first_exchange());
    assert!(session.transcript().is_empty());
    assert!(!session.is_pending());
}

#[test]
fn successful_exchange_appends_user_then_assistant() {
    let mut session = session();

    let command = submit(&mut session, "  list files \n");
    assert_eq!(
        command,
        Some(ChatCommand::RequestCompletion {
            prompt: "list files".to_string()
        })
    );
    // The user turn is recorded before the request goes out.
    assert_eq!(texts(&session), vec![(Speaker::User, "list files".to_string())]);
    assert!(session.is_pending());
    assert!(!session.is_first_exchange());

    session.apply(ChatAction::CompletionSettled(Ok("ls -la".to_string())));
    assert_eq!(
        texts(&session),
        vec![
            (Speaker::User, "list files".to_string()),
            (Speaker::Assistant, "ls -la".to_string()),
        ]
    );
    assert!(!session.is_pending());
    assert_eq!(session.message_count(), 2);
}

#[test]
fn assistant_replies_are_rendered_as_markdown() {
    let renderer = Arc::new(RecordingRenderer::default());
    let mut session = ChatSession::new("sonar", "perplexity", renderer.clone());

    submit(&mut session, "hello");
    session.apply(ChatAction::CompletionSettled(Ok("**hi**".to_string())));

    let calls = renderer.calls.lock().expect("renderer lock");
    assert_eq!(
        *calls,
        vec![(
            "**hi**".to_string(),
            RenderOptions {
                code: true,
                show_links: true
            }
        )]
    );
    let reply = &session.transcript()[1];
    assert_eq!(reply.text(), "**hi**");
    assert_eq!(reply.rendered()[0].to_string(), "rendered:**hi**");
}

#[test]
fn empty_and_placeholder_input_is_rejected_silently() {
    let mut session = session();

    for input in ["", "   ", "\n", INPUT_PLACEHOLDER, "  Type your query here...  "] {
        assert_eq!(submit(&mut session, input), Some(ChatCommand::ClearInput));
    }
    assert!(session.transcript().is_empty());
    assert!(!session.is_pending());
    assert!(session.is_first_exchange());
    assert_eq!(session.status(), None);
}

#[test]
fn failed_completion_becomes_system_error_message() {
    let mut session = session();
    session.apply(ChatAction::Escape);
    session.apply(ChatAction::ToggleFocus);
    assert_eq!(session.mode(), Mode::Insert);

    submit(&mut session, "hello");
    let command = session.apply(ChatAction::CompletionSettled(Err(
        "API call failed for openai: connect ECONNREFUSED 127.0.0.1:443".to_string(),
    )));

    assert_eq!(command, None);
    let transcript = texts(&session);
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], (Speaker::User, "hello".to_string()));
    assert_eq!(transcript[1].0, Speaker::SystemError);
    assert!(transcript[1].1.starts_with("Error getting response from openai: "));
    assert!(transcript[1].1.contains("ECONNREFUSED"));
    assert_eq!(session.mode(), Mode::Insert);
    assert!(!session.is_pending());

    // The session keeps accepting submissions.
    assert!(matches!(
        submit(&mut session, "again"),
        Some(ChatCommand::RequestCompletion { .. })
    ));
}

#[test]
fn second_submit_is_locked_out_while_pending() {
    let mut session = session();
    submit(&mut session, "first");

    assert_eq!(submit(&mut session, "second"), None);
    assert_eq!(session.message_count(), 1);
    assert_eq!(session.status(), Some("Waiting for openai to respond"));

    session.apply(ChatAction::CompletionSettled(Ok("done".to_string())));
    assert!(matches!(
        submit(&mut session, "second"),
        Some(ChatCommand::RequestCompletion { .. })
    ));
}

#[test]
fn stray_completion_without_request_is_ignored() {
    let mut session = session();
    session.apply(ChatAction::CompletionSettled(Ok("unsolicited".to_string())));
    assert!(session.transcript().is_empty());
}

#[test]
fn escape_colon_wq_persists_non_empty_transcript() {
    let mut session = session();
    submit(&mut session, "one");
    session.apply(ChatAction::CompletionSettled(Ok("two".to_string())));
    submit(&mut session, "three");
    assert_eq!(session.message_count(), 3);

    session.apply(ChatAction::Escape);
    assert_eq!(session.mode(), Mode::Normal);
    session.apply(ChatAction::EnterCommandMode);
    assert_eq!(session.mode(), Mode::Command);
    session.apply(ChatAction::CommandChar('w'));
    session.apply(ChatAction::CommandChar('q'));
    assert_eq!(session.command_buffer(), "wq");

    assert_eq!(
        session.apply(ChatAction::ExecuteCommand),
        Some(ChatCommand::PersistAndExit)
    );
}

#[test]
fn wq_with_empty_transcript_does_not_exit() {
    let mut session = session();
    assert_eq!(run_command(&mut session, "wq"), None);
    assert_eq!(session.mode(), Mode::Insert);
    assert_eq!(session.status(), Some("Nothing to save yet"));
}

#[test]
fn q_discards_regardless_of_transcript() {
    let mut session = session();
    assert_eq!(
        run_command(&mut session, "q"),
        Some(ChatCommand::DiscardAndExit)
    );

    let mut session = self::session();
    submit(&mut session, "keep me?");
    assert_eq!(
        run_command(&mut session, "q"),
        Some(ChatCommand::DiscardAndExit)
    );
    assert_eq!(session.apply(ChatAction::Quit), Some(ChatCommand::DiscardAndExit));
}

#[test]
fn unknown_command_returns_to_previous_mode() {
    let mut session = session();
    session.apply(ChatAction::Escape);
    submit(&mut session, "ignored in normal mode");
    assert!(session.transcript().is_empty());

    let before = texts(&session);
    assert_eq!(run_command(&mut session, "bogus"), None);
    assert_eq!(session.mode(), Mode::Normal);
    assert_eq!(session.focus(), Focus::History);
    assert_eq!(texts(&session), before);
    assert_eq!(session.status(), Some("Unknown command: :bogus"));

    // The hint disappears with the next key.
    session.apply(ChatAction::Scroll(ScrollRequest::Up(1)));
    assert_eq!(session.status(), None);
}

#[test]
fn insert_command_returns_focus_to_input() {
    let mut session = session();
    session.apply(ChatAction::Escape);
    assert_eq!(session.focus(), Focus::History);

    assert_eq!(run_command(&mut session, "i"), None);
    assert_eq!(session.mode(), Mode::Insert);
    assert_eq!(session.focus(), Focus::Input);
}

#[test]
fn escape_leaves_command_mode_without_running_it() {
    let mut session = session();
    session.apply(ChatAction::EnterCommandMode);
    session.apply(ChatAction::CommandChar('q'));
    assert_eq!(session.apply(ChatAction::Escape), None);
    assert_eq!(session.mode(), Mode::Insert);
    assert_eq!(session.command_buffer(), "");
}

#[test]
fn backspace_on_empty_command_line_cancels() {
    let mut session = session();
    session.apply(ChatAction::Escape);
    session.apply(ChatAction::EnterCommandMode);
    session.apply(ChatAction::CommandChar('x'));
    session.apply(ChatAction::CommandBackspace);
    assert_eq!(session.mode(), Mode::Command);
    session.apply(ChatAction::CommandBackspace);
    assert_eq!(session.mode(), Mode::Normal);
}

#[test]
fn focus_toggle_switches_panes_outside_command_mode() {
    let mut session = session();
    session.apply(ChatAction::ToggleFocus);
    assert_eq!((session.mode(), session.focus()), (Mode::Normal, Focus::History));
    session.apply(ChatAction::ToggleFocus);
    assert_eq!((session.mode(), session.focus()), (Mode::Insert, Focus::Input));

    session.apply(ChatAction::EnterCommandMode);
    session.apply(ChatAction::ToggleFocus);
    assert_eq!((session.mode(), session.focus()), (Mode::Command, Focus::Input));
}

#[test]
fn entering_command_mode_twice_keeps_return_mode() {
    let mut session = session();
    session.apply(ChatAction::Escape);
    session.apply(ChatAction::EnterCommandMode);
    session.apply(ChatAction::EnterCommandMode);
    session.apply(ChatAction::Escape);
    assert_eq!(session.mode(), Mode::Normal);
}

#[test]
fn scroll_state_clamps_and_follows() {
    let mut scroll = ScrollState::default();
    assert_eq!(scroll.resolve(50, 10), 40);

    scroll.follow = false;
    scroll.offset = 5;
    assert_eq!(scroll.resolve(50, 10), 5);
    assert!(!scroll.follow);

    scroll.offset = 90;
    assert_eq!(scroll.resolve(50, 10), 40);
    assert!(scroll.follow);

    assert_eq!(ScrollState::default().resolve(3, 10), 0);
}

#[test]
fn scrolling_up_stops_following_new_messages() {
    let mut session = session();
    session.scroll.resolve(100, 20);
    session.apply(ChatAction::Scroll(ScrollRequest::Up(3)));
    assert_eq!(session.scroll, ScrollState { offset: 77, follow: false });

    session.apply(ChatAction::Scroll(ScrollRequest::Top));
    assert_eq!(session.scroll.offset, 0);

    submit(&mut session, "new message");
    assert!(session.scroll.follow);
}
