//! Interactive command tree and dispatcher.
//!
//! A command line is split on `;` and each segment is resolved word by
//! word against [`COMMANDS`]: groups consume a word and descend, leaves
//! receive the remaining words as arguments.

pub mod completions;
mod edit;
mod listing;
mod meld;
mod options;
mod run;

use gcph_core::{Config, History, Session};
use gcph_git::Repository;

/// Everything a command handler can touch.
pub struct Context {
    /// The repository being triaged.
    pub repo: Repository,
    /// Session state edited by commands.
    pub session: Session,
    /// Command history for completion.
    pub history: History,
    /// Loaded configuration.
    pub config: Config,
    /// Whether prompts can use the terminal.
    pub interactive: bool,
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// End the session with status 0.
    Exit,
}

/// Errors raised at the command boundary.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// First word is not a command.
    #[error("`{0}` is not a valid command")]
    UnknownCommand(String),

    /// Word is not a subcommand of the group before it.
    #[error("`{word}` is not a valid subcommand for `{command}`")]
    UnknownSubcommand {
        /// The group.
        command: String,
        /// The unknown word.
        word: String,
    },

    /// Command needs more words.
    #[error("`{command}` requires {what}. Maybe try the tab completion?")]
    MissingArgument {
        /// The command typed so far.
        command: String,
        /// What is missing.
        what: &'static str,
    },

    /// Word that should be a candidate index is not a number.
    #[error("`{0}` is not a commit index")]
    InvalidIndex(String),

    /// Session or backend failure.
    #[error(transparent)]
    Session(#[from] gcph_core::Error),
}

/// Command handler: receives the context and the words after the command.
pub type Handler = fn(&mut Context, &[&str]) -> Result<Flow, DispatchError>;

/// Where completion suggestions for a leaf's arguments come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// No suggestions.
    None,
    /// A fixed token list.
    Static(&'static [&'static str]),
    /// All repository references.
    Refs,
    /// Declared target branches.
    Branches,
    /// A declared branch, then candidate indices.
    BranchThenIndices,
    /// `all` plus candidate indices.
    Indices,
}

/// A node of the command tree.
pub enum Node {
    /// Executable command.
    Leaf(Handler, Completion),
    /// Command that needs a subcommand.
    Group(&'static [(&'static str, Node)]),
}

const BOOLEAN: Completion = Completion::Static(&["false", "true"]);

/// The command tree.
pub static COMMANDS: &[(&str, Node)] = &[
    ("add", Node::Leaf(edit::add, Completion::BranchThenIndices)),
    (
        "blacklist_commits",
        Node::Leaf(edit::blacklist_commits, Completion::Indices),
    ),
    ("branch", Node::Leaf(edit::branch, Completion::None)),
    ("delete", Node::Leaf(edit::delete, Completion::Branches)),
    ("exit", Node::Leaf(exit, Completion::None)),
    ("help", Node::Leaf(help, Completion::None)),
    (
        "ignore_branch",
        Node::Leaf(options::ignore_branch, Completion::Refs),
    ),
    ("info", Node::Leaf(listing::info, Completion::Indices)),
    ("meld", Node::Leaf(meld::meld, Completion::Indices)),
    ("onto", Node::Leaf(options::onto, Completion::Refs)),
    ("print", Node::Leaf(listing::print, Completion::None)),
    ("run", Node::Leaf(run::run, Completion::None)),
    (
        "set",
        Node::Group(&[
            ("dryrun", Node::Leaf(options::set_dry_run, BOOLEAN)),
            (
                "error",
                Node::Leaf(options::set_error, Completion::Static(&["print", "raise"])),
            ),
            ("merge", Node::Leaf(options::set_merge, BOOLEAN)),
            (
                "show_blacklist",
                Node::Leaf(options::set_show_blacklist, BOOLEAN),
            ),
        ]),
    ),
    ("show", Node::Leaf(listing::show, Completion::Indices)),
    ("source", Node::Leaf(options::source, Completion::Refs)),
    (
        "update",
        Node::Leaf(listing::update, Completion::Static(&["quiet"])),
    ),
];

/// Resolve words to a leaf, returning its node and the remaining words.
///
/// # Errors
/// Returns `UnknownCommand`, `UnknownSubcommand` or `MissingArgument`.
pub fn resolve<'w>(
    words: &'w [&'w str],
) -> Result<(Handler, Completion, &'w [&'w str]), DispatchError> {
    let mut nodes = COMMANDS;
    let mut path: Vec<&str> = Vec::new();

    for (depth, word) in words.iter().enumerate() {
        let Some((_, node)) = nodes.iter().find(|(name, _)| name == word) else {
            return Err(if path.is_empty() {
                DispatchError::UnknownCommand((*word).to_string())
            } else {
                DispatchError::UnknownSubcommand {
                    command: path.join(" "),
                    word: (*word).to_string(),
                }
            });
        };
        path.push(*word);

        match node {
            Node::Leaf(handler, completion) => {
                return Ok((*handler, *completion, &words[depth + 1..]));
            }
            Node::Group(children) => nodes = *children,
        }
    }

    Err(DispatchError::MissingArgument {
        command: path.join(" "),
        what: "an argument",
    })
}

/// Execute one `;`-separated command line, stopping at the first error.
///
/// # Errors
/// Returns the first failing command's error.
pub fn execute_line(ctx: &mut Context, line: &str) -> Result<Flow, DispatchError> {
    for segment in line.split(';') {
        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        tracing::debug!(command = %words.join(" "), "dispatching");
        let (handler, _, args) = resolve(&words)?;
        if handler(ctx, args)? == Flow::Exit {
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// Parse candidate indices; `all` expands to every visible candidate.
///
/// # Errors
/// Returns `InvalidIndex` for a word that is not a number.
pub fn parse_indices(session: &Session, words: &[&str]) -> Result<Vec<usize>, DispatchError> {
    if words.contains(&"all") {
        return Ok(session.visible().iter().map(|e| e.index).collect());
    }
    words
        .iter()
        .map(|w| {
            w.parse::<usize>()
                .map_err(|_| DispatchError::InvalidIndex((*w).to_string()))
        })
        .collect()
}

/// Ensure at least one argument was given.
///
/// # Errors
/// Returns `MissingArgument` naming `command` if `args` is empty.
pub fn require<'a>(
    args: &'a [&'a str],
    command: &str,
    what: &'static str,
) -> Result<&'a [&'a str], DispatchError> {
    if args.is_empty() {
        return Err(DispatchError::MissingArgument {
            command: command.to_string(),
            what,
        });
    }
    Ok(args)
}

fn exit(_ctx: &mut Context, _args: &[&str]) -> Result<Flow, DispatchError> {
    Ok(Flow::Exit)
}

#[allow(clippy::unnecessary_wraps)]
fn help(_ctx: &mut Context, _args: &[&str]) -> Result<Flow, DispatchError> {
    crate::output::essential("Commands (separate several with `;`):");
    for (name, node) in COMMANDS {
        match node {
            Node::Leaf(..) => crate::output::essential(&format!("  {name}")),
            Node::Group(children) => {
                for (child, _) in *children {
                    crate::output::essential(&format!("  {name} {child}"));
                }
            }
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_leaf_with_args() {
        let words = ["add", "feat", "1", "2"];
        let (_, completion, args) = resolve(&words).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(completion, Completion::BranchThenIndices);
        assert_eq!(args, ["feat", "1", "2"]);
    }

    #[test]
    fn test_resolve_group() {
        let words = ["set", "dryrun", "true"];
        let (_, completion, args) = resolve(&words).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(completion, BOOLEAN);
        assert_eq!(args, ["true"]);
    }

    #[test]
    fn test_resolve_errors() {
        let err = resolve(&["frobnicate"]).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("`frobnicate` is not a valid command"));

        let err = resolve(&["set", "colour"]).err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("`colour` is not a valid subcommand for `set`")
        );

        let err = resolve(&["set"]).err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("`set` requires an argument. Maybe try the tab completion?")
        );
    }

    #[test]
    fn test_tree_is_sorted_and_unique() {
        let names: Vec<&str> = COMMANDS.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_require() {
        assert!(require(&[], "add", "a branch").is_err());
        assert_eq!(require(&["x"], "add", "a branch").ok(), Some(&["x"][..]));
    }
}
