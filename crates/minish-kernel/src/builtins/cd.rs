//! `cd` — change the shell's working directory.

use std::env;

use super::{Builtin, BuiltinContext};
use crate::result::ExecResult;

pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change the working directory (defaults to $HOME)"
    }

    fn run(&self, argv: &[String], _ctx: &mut BuiltinContext<'_>) -> ExecResult {
        match chdir(argv.get(1).map(String::as_str)) {
            Ok(()) => ExecResult::success(""),
            Err(msg) => ExecResult::failure(1, format!("minish: {msg}")),
        }
    }
}

/// Shared with the forked-child path.
pub(super) fn chdir(target: Option<&str>) -> Result<(), String> {
    let dest = match target {
        Some(path) => path.to_string(),
        None => env::var("HOME").map_err(|_| "cd: HOME not set".to_string())?,
    };
    env::set_current_dir(&dest).map_err(|e| format!("cd: {dest}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_error() {
        let err = chdir(Some("/definitely/not/a/real/path")).unwrap_err();
        assert!(err.starts_with("cd: /definitely"));
    }

    #[test]
    fn chdir_to_root_succeeds() {
        let before = env::current_dir().unwrap();
        chdir(Some("/")).unwrap();
        assert_eq!(env::current_dir().unwrap(), std::path::PathBuf::from("/"));
        env::set_current_dir(before).unwrap();
    }
}
