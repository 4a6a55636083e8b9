use std::borrow::Cow;
use std::fmt;
use std::io;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;

pub const OUTPUT_PREFIX: &str = "│  ";
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug)]
pub enum CommandError {
    /// The shell itself could not be launched.
    Spawn(io::Error),
    /// The child started but relaying its output or waiting on it failed.
    Io(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn(err) => write!(f, "Could not start command: {err}"),
            CommandError::Io(err) => write!(f, "Lost track of command output: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn(err) | CommandError::Io(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub code: Option<i32>,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The most useful line of a failure: an `npm ERR!` line, the tail of
    /// stderr, or just the exit code.
    pub fn failure_summary(&self) -> String {
        if let Some(line) = self
            .stderr
            .lines()
            .find(|line| line.to_ascii_lowercase().contains("npm err!"))
        {
            return line.trim().to_string();
        }

        let lines: Vec<&str> = self.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        if !lines.is_empty() {
            let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
            return lines[start..].join("\n");
        }

        match self.code {
            Some(code) => format!("Command failed with exit code {code}"),
            None => "Command was terminated by a signal".to_string(),
        }
    }
}

/// `npx` prompts for installs, which a piped child cannot answer.
pub fn rewrite_npx(command: &str) -> Cow<'_, str> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(command.len() + 8);
    let mut last = 0;

    for (pos, _) in command.match_indices("npx") {
        let before = command[..pos].chars().next_back();
        let after = command[pos + 3..].chars().next();
        if before.map_or(true, |c| !is_word(c)) && after.map_or(true, |c| !is_word(c)) {
            out.push_str(&command[last..pos]);
            out.push_str("npm exec --");
            last = pos + 3;
        }
    }

    if last == 0 {
        Cow::Borrowed(command)
    } else {
        out.push_str(&command[last..]);
        Cow::Owned(out)
    }
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Run `command` through the platform shell, relaying each output line to
/// `stdout`/`stderr` with [`OUTPUT_PREFIX`].
pub async fn run_command<O, E>(
    command: &str,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<CommandOutcome, CommandError>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut child = shell_command(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(CommandError::Spawn)?;

    let child_out = child
        .stdout
        .take()
        .ok_or_else(|| CommandError::Io(io::Error::other("child stdout was not captured")))?;
    let child_err = child
        .stderr
        .take()
        .ok_or_else(|| CommandError::Io(io::Error::other("child stderr was not captured")))?;

    let (out_result, err_result) = tokio::join!(relay(child_out, stdout), relay(child_err, stderr));
    out_result.map_err(CommandError::Io)?;
    let captured = err_result.map_err(CommandError::Io)?;

    let status = child.wait().await.map_err(CommandError::Io)?;
    Ok(CommandOutcome {
        code: status.code(),
        stderr: captured,
    })
}

async fn relay<R, W>(reader: R, writer: &mut W) -> io::Result<String>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut captured = String::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        writer
            .write_all(format!("{OUTPUT_PREFIX}{line}\n").as_bytes())
            .await?;
        captured.push_str(&line);
        captured.push('\n');
    }
    writer.flush().await?;
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npx_is_rewritten_as_a_word_only() {
        assert_eq!(rewrite_npx("npx create-app x"), "npm exec -- create-app x");
        assert_eq!(
            rewrite_npx("cd web && npx tsc"),
            "cd web && npm exec -- tsc"
        );
        assert_eq!(rewrite_npx("ls npxfile"), "ls npxfile");
        assert_eq!(rewrite_npx("echo snpx"), "echo snpx");
        assert!(matches!(rewrite_npx("ls"), Cow::Borrowed("ls")));
    }

    #[test]
    fn failure_summary_prefers_npm_errors() {
        let outcome = CommandOutcome {
            code: Some(1),
            stderr: "warn\nnpm ERR! missing script: build\nmore\n".to_string(),
        };
        assert_eq!(outcome.failure_summary(), "npm ERR! missing script: build");

        let outcome = CommandOutcome {
            code: Some(2),
            stderr: String::new(),
        };
        assert_eq!(outcome.failure_summary(), "Command failed with exit code 2");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_is_prefixed_and_exit_code_reported() {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let outcome = run_command("echo hi; echo oops 1>&2; exit 3", &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "│  hi\n");
        assert_eq!(String::from_utf8(err).unwrap(), "│  oops\n");
        assert_eq!(outcome.code, Some(3));
        assert!(!outcome.success());
        assert_eq!(outcome.failure_summary(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_commands_succeed() {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let outcome = run_command("printf 'a\\nb\\n'", &mut out, &mut err)
            .await
            .unwrap();
        assert!(outcome.success());
        assert_eq!(String::from_utf8(out).unwrap(), "│  a\n│  b\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn invalid_utf8_output_is_relayed_lossily() {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let outcome = run_command("printf 'ok\\n\\377\\376\\nend\\n'; exit 0", &mut out, &mut err)
            .await
            .unwrap();
        assert!(outcome.success());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "│  ok\n│  \u{FFFD}\u{FFFD}\n│  end\n"
        );
    }

    #[test]
    fn command_errors_name_the_failing_stage() {
        let spawn = CommandError::Spawn(io::Error::new(io::ErrorKind::NotFound, "no sh"));
        assert_eq!(spawn.to_string(), "Could not start command: no sh");
        let relay = CommandError::Io(io::Error::other("pipe closed"));
        assert_eq!(relay.to_string(), "Lost track of command output: pipe closed");
    }

    #[tokio::test]
    async fn unterminated_last_line_is_relayed() {
        let mut out: Vec<u8> = Vec::new();
        let captured = relay(&b"first\r\nlast"[..], &mut out).await.unwrap();
        assert_eq!(captured, "first\nlast\n");
        assert_eq!(String::from_utf8(out).unwrap(), "│  first\n│  last\n");
    }
}
