//! Parser: token stream to [`Pipeline`].
//!
//! The grammar is a single flat scan over the lexed tokens. Stages are split
//! on `|`, redirection operators bind their following word to the current
//! stage, and `&` marks the whole pipeline as background. Empty segments
//! between pipes are dropped; a stage that is only redirections is kept.

use std::mem;
use std::path::PathBuf;

use crate::ast::{CommandStage, OutputRedirect, Pipeline};
use crate::error::ShellError;
use crate::lexer::{self, Token};

/// Parse one input line into a pipeline description.
pub fn parse(line: &str) -> Result<Pipeline, ShellError> {
    let tokens = lexer::tokenize(line)?;

    let mut stages = Vec::new();
    let mut cur = CommandStage::default();
    let mut background = false;

    let mut iter = tokens.into_iter();
    while let Some(tok) = iter.next() {
        match tok {
            Token::Pipe => {
                if !cur.is_empty() {
                    stages.push(mem::take(&mut cur));
                }
            }
            Token::RedirectIn => {
                cur.input = Some(PathBuf::from(expect_path(iter.next(), "<")?));
            }
            Token::RedirectOut => {
                cur.output = Some(OutputRedirect {
                    path: PathBuf::from(expect_path(iter.next(), ">")?),
                    append: false,
                });
            }
            Token::Append => {
                cur.output = Some(OutputRedirect {
                    path: PathBuf::from(expect_path(iter.next(), ">>")?),
                    append: true,
                });
            }
            Token::Background => background = true,
            Token::Word(w) => cur.argv.push(w),
        }
    }
    if !cur.is_empty() {
        stages.push(cur);
    }

    Ok(Pipeline { stages, background })
}

fn expect_path(tok: Option<Token>, op: &str) -> Result<String, ShellError> {
    match tok {
        Some(Token::Word(w)) => Ok(w),
        _ => Err(ShellError::Syntax(format!("expected a path after `{op}`"))),
    }
}
