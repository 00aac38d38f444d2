//! The interactive command loop.

use std::io::BufRead;

use gcph_core::ErrorPolicy;
use gcph_git::GitOps;
use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::{CustomUserError, InquireError, Text};

use crate::commands::{self, COMMANDS, Completion, Context, Flow, Node};
use crate::output;

/// Exit status after an interrupt.
pub const INTERRUPTED: i32 = 3;

/// Number of history lines offered on an empty prompt.
const RECENT_SUGGESTIONS: usize = 10;

enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Run commands until `exit`, end of input, an interrupt, or a raised error.
///
/// Returns the process exit status.
///
/// # Errors
/// Returns the failing command's error when the error policy is `raise`,
/// or an input error.
pub fn run_loop(ctx: &mut Context) -> anyhow::Result<i32> {
    loop {
        let line = match read_input(ctx)? {
            Input::Line(line) => line,
            Input::Eof => {
                output::essential("exit");
                return Ok(0);
            }
            Input::Interrupted => {
                output::essential("^C");
                return Ok(INTERRUPTED);
            }
        };

        ctx.history.push(&line);
        if handle_line(ctx, &line)? == Flow::Exit {
            return Ok(0);
        }
    }
}

/// Execute one command line, applying the session's error policy.
///
/// # Errors
/// Returns the command's error when the error policy is `raise`.
pub fn handle_line(ctx: &mut Context, line: &str) -> anyhow::Result<Flow> {
    match commands::execute_line(ctx, line) {
        Ok(flow) => Ok(flow),
        Err(e) if ctx.session.options.error_policy == ErrorPolicy::Raise => Err(e.into()),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            output::error(&e.to_string());
            Ok(Flow::Continue)
        }
    }
}

fn read_input(ctx: &Context) -> anyhow::Result<Input> {
    if ctx.interactive {
        return match Text::new("gcph>")
            .with_autocomplete(Completer::capture(ctx))
            .prompt()
        {
            Ok(line) => Ok(Input::Line(line)),
            Err(InquireError::OperationCanceled) => Ok(Input::Eof),
            Err(InquireError::OperationInterrupted) => Ok(Input::Interrupted),
            Err(e) => Err(e.into()),
        };
    }

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(Input::Eof);
    }
    Ok(Input::Line(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Tab completion over the command tree, built from a snapshot of the session.
#[derive(Debug, Clone, Default)]
pub struct Completer {
    refs: Vec<String>,
    branches: Vec<String>,
    indices: Vec<String>,
    recent: Vec<String>,
}

impl Completer {
    /// Snapshot everything completion needs from the context.
    #[must_use]
    pub fn capture(ctx: &Context) -> Self {
        Self {
            refs: ctx.repo.list_refs().unwrap_or_default(),
            branches: ctx
                .session
                .targets()
                .iter()
                .map(|t| t.name.to_string())
                .collect(),
            indices: ctx
                .session
                .visible()
                .iter()
                .map(|e| e.index.to_string())
                .collect(),
            recent: ctx.history.recent(RECENT_SUGGESTIONS),
        }
    }

    /// Full-line suggestions for `input`; only the text after the last `;`
    /// is completed.
    #[must_use]
    pub fn complete(&self, input: &str) -> Vec<String> {
        if input.trim().is_empty() {
            return self.recent.clone();
        }

        let segment = input.rsplit(';').next().unwrap_or(input);
        let trailing = segment.is_empty() || segment.ends_with(char::is_whitespace);
        let mut words: Vec<&str> = segment.split_whitespace().collect();
        let partial = if trailing { "" } else { words.pop().unwrap_or("") };
        let base = &input[..input.len() - partial.len()];

        self.options(&words)
            .into_iter()
            .filter(|option| option.starts_with(partial))
            .map(|option| format!("{base}{option} "))
            .collect()
    }

    fn options(&self, words: &[&str]) -> Vec<String> {
        let mut nodes = COMMANDS;
        for (depth, word) in words.iter().enumerate() {
            match nodes.iter().find(|(name, _)| name == word) {
                None => return Vec::new(),
                Some((_, Node::Leaf(_, completion))) => {
                    return self.tokens(*completion, &words[depth + 1..]);
                }
                Some((_, Node::Group(children))) => nodes = *children,
            }
        }
        nodes.iter().map(|(name, _)| (*name).to_string()).collect()
    }

    fn tokens(&self, completion: Completion, typed: &[&str]) -> Vec<String> {
        match completion {
            Completion::None => Vec::new(),
            Completion::Static(tokens) => tokens.iter().map(|t| (*t).to_string()).collect(),
            Completion::Refs => self.refs.clone(),
            Completion::Branches => self.branches.clone(),
            Completion::BranchThenIndices if typed.is_empty() => self.branches.clone(),
            Completion::BranchThenIndices => self.indices.clone(),
            Completion::Indices => std::iter::once("all".to_string())
                .chain(self.indices.iter().cloned())
                .collect(),
        }
    }
}

impl Autocomplete for Completer {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        Ok(self.complete(input))
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        if highlighted_suggestion.is_some() {
            return Ok(highlighted_suggestion);
        }
        let mut suggestions = self.complete(input);
        Ok(if suggestions.len() == 1 {
            suggestions.pop()
        } else {
            None
        })
    }
}
