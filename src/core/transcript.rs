//! Plain-text chat transcripts
//!
//! A saved chat holds one `[speaker]: text` line per message. Backslashes
//! and newlines inside a message are escaped (`\\`, `\n`) so a message never
//! spans more than one line of the file.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::core::message::{Message, Speaker};

const FILENAME_PREFIX_CHARS: usize = 30;

#[derive(Debug)]
pub struct TranscriptError {
    path: PathBuf,
    source: io::Error,
}

impl TranscriptError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to save chat to {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for TranscriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn escape_line(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn unescape_line(line: &str) -> String {
    let mut text = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('\\') => text.push('\\'),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }
    text
}

/// `[tag]: text` for a single message.
pub fn transcript_line(message: &Message, provider: &str) -> String {
    format!(
        "[{}]: {}",
        message.speaker().tag(provider),
        escape_line(message.text())
    )
}

/// The full transcript, newline joined, without a trailing newline.
pub fn flatten(messages: &[Message], provider: &str) -> String {
    messages
        .iter()
        .map(|m| transcript_line(m, provider))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a `[tag]: text` line back into its tag and unescaped text.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find("]: ")?;
    let tag = &rest[..end];
    if tag.is_empty() {
        return None;
    }
    Some((tag.to_string(), unescape_line(&rest[end + 3..])))
}

/// Read a saved transcript back as `(speaker, tag, text)` triples.
pub fn load_transcript(path: &Path) -> io::Result<Vec<(Speaker, String, String)>> {
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .map(|line| {
            parse_line(line)
                .map(|(tag, text)| (Speaker::from_tag(&tag), tag, text))
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("not a transcript line: {line}"),
                    )
                })
        })
        .collect()
}

/// File name for a transcript whose first message is `first_text`:
/// the first 30 characters with every non-alphanumeric character replaced
/// by `_`, then `_MMDDYYYY_HHMMSS.txt`.
pub fn transcript_filename<Tz>(first_text: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let prefix: String = first_text
        .chars()
        .take(FILENAME_PREFIX_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.txt", prefix, now.format("%m%d%Y_%H%M%S"))
}

/// Write the transcript into `dir`. Returns `Ok(None)` without touching the
/// filesystem when there is nothing to save.
///
/// An existing file with the same name is never overwritten; a numeric
/// suffix is appended instead.
pub fn persist<Tz>(
    messages: &[Message],
    provider: &str,
    dir: &Path,
    now: &DateTime<Tz>,
) -> Result<Option<PathBuf>, TranscriptError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(first) = messages.first() else {
        return Ok(None);
    };

    fs::create_dir_all(dir).map_err(|source| TranscriptError {
        path: dir.to_path_buf(),
        source,
    })?;

    let filename = transcript_filename(first.text(), now);
    let contents = flatten(messages, provider);
    let mut attempt = 1;
    loop {
        let path = if attempt == 1 {
            dir.join(&filename)
        } else {
            let stem = filename.trim_end_matches(".txt");
            dir.join(format!("{stem}_{attempt}.txt"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())
                    .and_then(|_| file.sync_all())
                    .map_err(|source| TranscriptError {
                        path: path.clone(),
                        source,
                    })?;
                return Ok(Some(path));
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(TranscriptError { path, source }),
        }
    }
}
