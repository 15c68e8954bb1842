//! `exit` — request shell termination.

use super::{Builtin, BuiltinContext};
use crate::result::ExecResult;

pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Exit the shell, optionally with a status code"
    }

    fn run(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> ExecResult {
        match parse_code(argv.get(1).map(String::as_str)) {
            Ok(code) => {
                *ctx.exit_request = Some(code);
                ExecResult::success("")
            }
            Err(msg) => ExecResult::failure(2, format!("minish: {msg}")),
        }
    }
}

/// Shared with the forked-child path.
pub(super) fn parse_code(arg: Option<&str>) -> Result<i32, String> {
    match arg {
        None => Ok(0),
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| format!("exit: {raw}: numeric argument required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_zero() {
        assert_eq!(parse_code(None), Ok(0));
    }

    #[test]
    fn parses_explicit_codes() {
        assert_eq!(parse_code(Some("3")), Ok(3));
        assert_eq!(parse_code(Some("-1")), Ok(-1));
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(parse_code(Some("abc")).is_err());
    }
}
