//! Lexer for minish command lines.
//!
//! Converts one input line into a stream of tokens using the logos lexer
//! generator. The grammar is deliberately flat: words, quoted words, the
//! pipeline and redirection operators, and the background marker. There is
//! no expansion, escaping, or nesting.

use logos::Logos;

use crate::error::ShellError;

/// A single lexed token.
///
/// `>>` is listed before `>`; logos prefers the longest match, so `>>` never
/// lexes as two `>` tokens.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// `|`
    #[token("|")]
    Pipe,

    /// `<`
    #[token("<")]
    RedirectIn,

    /// `>>`
    #[token(">>")]
    Append,

    /// `>`
    #[token(">")]
    RedirectOut,

    /// `&`
    #[token("&")]
    Background,

    /// A bare word, or a single- or double-quoted word with quotes stripped.
    #[regex(r#"[^ \t\r\n|<>&'"]+"#, |lex| lex.slice().to_owned())]
    #[regex(r#""[^"]*""#, unquote)]
    #[regex(r"'[^']*'", unquote)]
    Word(String),
}

fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_owned()
}

/// Tokenize a full input line.
///
/// An unterminated quote (or any other unmatched input) is a syntax error
/// naming the offending slice.
pub fn tokenize(line: &str) -> Result<Vec<Token>, ShellError> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next() {
        match tok {
            Ok(t) => tokens.push(t),
            Err(()) => {
                return Err(ShellError::Syntax(format!(
                    "unexpected input at `{}`",
                    &line[lexer.span()]
                )));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn simple_command() {
        let toks = tokenize("ls -l /tmp").unwrap();
        assert_eq!(toks, vec![word("ls"), word("-l"), word("/tmp")]);
    }

    #[test]
    fn pipeline_and_background() {
        let toks = tokenize("cat f | wc -l &").unwrap();
        assert_eq!(
            toks,
            vec![
                word("cat"),
                word("f"),
                Token::Pipe,
                word("wc"),
                word("-l"),
                Token::Background,
            ]
        );
    }

    #[test]
    fn append_is_one_token() {
        let toks = tokenize("echo hi >> log").unwrap();
        assert_eq!(
            toks,
            vec![word("echo"), word("hi"), Token::Append, word("log")]
        );
    }

    #[test]
    fn redirects_without_spaces() {
        let toks = tokenize("sort<in>out").unwrap();
        assert_eq!(
            toks,
            vec![
                word("sort"),
                Token::RedirectIn,
                word("in"),
                Token::RedirectOut,
                word("out"),
            ]
        );
    }

    #[test]
    fn quoted_words_keep_spaces_and_operators() {
        let toks = tokenize(r#"echo "a | b" 'c & d'"#).unwrap();
        assert_eq!(toks, vec![word("echo"), word("a | b"), word("c & d")]);
    }

    #[test]
    fn empty_quotes_are_an_empty_word() {
        let toks = tokenize(r#"echo """#).unwrap();
        assert_eq!(toks, vec![word("echo"), word("")]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = tokenize("echo \"oops").unwrap_err();
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn blank_line_lexes_to_nothing() {
        assert!(tokenize("   \t ").unwrap().is_empty());
    }
}
