//! Directory tree sent to the model as context for agent requests.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

pub const MAX_DEPTH: usize = 3;
pub const MAX_TREE_CHARS: usize = 5000;
const TRUNCATED_MARKER: &str = "\n... [Tree truncated due to size]";

/// Name patterns from a `.gitignore`, matched against single path
/// components. Supports exact names, `*suffix` and `prefix*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    glob: String,
    dir_only: bool,
}

impl IgnoreRules {
    pub fn parse(contents: &str) -> Self {
        let mut rules = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let dir_only = line.ends_with('/');
            let trimmed = line.trim_matches('/');
            let glob = trimmed.rsplit('/').next().unwrap_or(trimmed);
            if !glob.is_empty() {
                rules.patterns.push(Pattern {
                    glob: glob.to_string(),
                    dir_only,
                });
            }
        }
        rules.add(".git");
        rules
    }

    /// Rules from the nearest `.gitignore` at or above `start`.
    pub fn discover(start: &Path) -> Self {
        let Some(path) = find_gitignore(start) else {
            return Self::parse("");
        };
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Could not read .gitignore");
                Self::parse("")
            }
        }
    }

    fn add(&mut self, name: &str) {
        self.patterns.push(Pattern {
            glob: name.to_string(),
            dir_only: false,
        });
    }

    pub fn is_ignored(&self, name: &str, is_dir: bool) -> bool {
        self.patterns
            .iter()
            .filter(|p| is_dir || !p.dir_only)
            .any(|p| matches_glob(&p.glob, name))
    }
}

fn matches_glob(glob: &str, name: &str) -> bool {
    if glob == "*" {
        return true;
    }
    if let Some(suffix) = glob.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    if let Some(prefix) = glob.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    glob == name
}

fn find_gitignore(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".gitignore"))
        .find(|candidate| candidate.is_file())
}

/// Tree of `dir` using the nearest `.gitignore`.
pub fn generate_tree(dir: &Path) -> String {
    generate_tree_with(dir, &IgnoreRules::discover(dir))
}

pub fn generate_tree_with(dir: &Path, rules: &IgnoreRules) -> String {
    let mut tree = String::new();
    walk(dir, rules, "", 0, &mut tree);
    truncate_tree(tree)
}

fn walk(dir: &Path, rules: &IgnoreRules, indent: &str, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        out.push_str(indent);
        out.push_str("...\n");
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            let name = dir.file_name().unwrap_or_default().to_string_lossy();
            out.push_str(&format!("{indent}[Error reading directory: {name}]\n"));
            return;
        }
    };

    let mut children: Vec<(String, PathBuf, bool)> = entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            let is_dir = path.is_dir();
            (entry.file_name().to_string_lossy().into_owned(), path, is_dir)
        })
        .filter(|(name, _, is_dir)| !rules.is_ignored(name, *is_dir))
        .collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));

    let count = children.len();
    for (index, (name, path, is_dir)) in children.into_iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        out.push_str(&format!("{indent}{connector}{name}\n"));
        if is_dir {
            let child_indent = format!("{indent}{}", if last { "    " } else { "│   " });
            walk(&path, rules, &child_indent, depth + 1, out);
        }
    }
}

fn truncate_tree(tree: String) -> String {
    match tree.char_indices().nth(MAX_TREE_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATED_MARKER}", &tree[..cut]),
        None => tree,
    }
}
