use std::fmt;
use std::path::Path;

const EMPTY_TREE: &str = "[Empty or unable to read directory]";

pub fn system_prompt(os: &str, cwd: &Path, tree: &str) -> String {
    let tree = if tree.trim().is_empty() { EMPTY_TREE } else { tree };
    format!(
        "You are an AI assistant that translates natural language commands into executable shell commands for a {os} environment.
Current Working Directory: {cwd}
Directory Structure tree (excluding .gitignore contents):
{tree}

Use the provided directory structure to understand the context of the current working directory.
Your task is to generate a shell command based on the user's input.
You are not allowed to execute any commands or perform any actions outside of generating the command.
Do not include any comments or code blocks in your output.
Your response should be a single line shell command that can be executed in the current working directory.
Only output the raw command itself, without any explanation, comments, or markdown formatting. Ensure commands are contextually appropriate for the current directory and its contents.",
        cwd = cwd.display()
    )
}

/// Strip a surrounding code fence (with or without a language tag) from a
/// model reply.
pub fn clean_command(response: &str) -> String {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// A harmless command that reports a failed request when run.
pub fn error_suggestion(err: &dyn fmt::Display) -> String {
    let reason = err.to_string().replace('"', "'");
    format!("echo \"Error: Failed to get command from AI model. {reason}\"")
}
