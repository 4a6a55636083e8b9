use ratatui::text::Line;

const USER_TAG: &str = "user";
const SYSTEM_TAG: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    User,
    Assistant,
    /// A failed completion, shown inline in place of the assistant reply.
    SystemError,
}

impl Speaker {
    /// Tag written in front of the message text. Assistant turns are tagged
    /// with the provider that produced them.
    pub fn tag<'a>(self, provider: &'a str) -> &'a str {
        match self {
            Speaker::User => USER_TAG,
            Speaker::Assistant => provider,
            Speaker::SystemError => SYSTEM_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            USER_TAG => Speaker::User,
            SYSTEM_TAG => Speaker::SystemError,
            _ => Speaker::Assistant,
        }
    }
}

/// One turn of the conversation. Messages are immutable once created; the
/// rendered form is computed up front and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    speaker: Speaker,
    text: String,
    rendered: Vec<Line<'static>>,
}

impl Message {
    pub fn new(speaker: Speaker, text: impl Into<String>, rendered: Vec<Line<'static>>) -> Self {
        Self {
            speaker,
            text: text.into(),
            rendered,
        }
    }

    /// A message displayed verbatim, one line per line of text.
    pub fn plain(speaker: Speaker, text: impl Into<String>) -> Self {
        let text = text.into();
        let rendered = text.lines().map(|l| Line::from(l.to_string())).collect();
        Self::new(speaker, text, rendered)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rendered(&self) -> &[Line<'static>] {
        &self.rendered
    }

    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_speaker() {
        assert_eq!(Speaker::User.tag("openai"), "user");
        assert_eq!(Speaker::Assistant.tag("openai"), "openai");
        assert_eq!(Speaker::SystemError.tag("openai"), "system");

        assert_eq!(Speaker::from_tag("user"), Speaker::User);
        assert_eq!(Speaker::from_tag("system"), Speaker::SystemError);
        assert_eq!(Speaker::from_tag("deepseek"), Speaker::Assistant);
    }

    #[test]
    fn plain_message_renders_each_line() {
        let message = Message::plain(Speaker::User, "first\nsecond");
        assert_eq!(message.text(), "first\nsecond");
        assert_eq!(message.rendered().len(), 2);
        assert!(message.is_user());
    }
}
