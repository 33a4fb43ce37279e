//! Exec substitution: replacing the running program with a script once all
//! options have been scanned.
//!
//! [`exec_command`] is the only function in this crate with an irreversible
//! side effect. It returns only when the new image could not be started.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Locate the running program: `argv0` itself when it names a path,
/// otherwise the first executable match on `PATH`.
pub fn find_program_path(argv0: &str) -> Option<PathBuf> {
    if argv0.is_empty() {
        return None;
    }
    if argv0.contains('/') {
        return Some(PathBuf::from(argv0));
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(argv0))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &std::path::Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

/// Build the argument vector handed to an exec script:
///
/// `script [program] ; replay... [-- leftovers...]`
///
/// A bare script name is looked up in `exec_path`. Scripts naming a path
/// are refused unless `allow_absolute` is set.
pub fn build_exec_argv(
    script: &str,
    exec_path: Option<&str>,
    allow_absolute: bool,
    program: Option<&str>,
    replay: &[String],
    leftovers: &[String],
) -> Result<Vec<String>> {
    let has_slash = script.contains('/');
    if has_slash && !allow_absolute {
        return Err(Error::Exec(format!(
            "{}: script paths are not allowed",
            script
        )));
    }

    let mut argv = Vec::with_capacity(4 + replay.len() + leftovers.len());
    argv.push(match exec_path {
        Some(dir) if !has_slash => format!("{}/{}", dir.trim_end_matches('/'), script),
        _ => script.to_string(),
    });
    if let Some(p) = program {
        argv.push(p.to_string());
    }
    argv.push(";".to_string());
    argv.extend(replay.iter().cloned());
    if !leftovers.is_empty() {
        argv.push("--".to_string());
        argv.extend(leftovers.iter().cloned());
    }
    Ok(argv)
}

/// Drop to the real user id and replace the process image with `argv`.
#[cfg(feature = "exec")]
pub fn exec_command(argv: &[String]) -> Error {
    use nix::unistd::{execvp, getuid, setuid};
    use std::ffi::CString;

    let args = match argv
        .iter()
        .map(|a| CString::new(a.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        Ok(args) => args,
        Err(e) => return Error::Exec(e.to_string()),
    };
    let Some(prog) = args.first() else {
        return Error::Exec("empty argument vector".to_string());
    };

    if let Err(e) = setuid(getuid()) {
        return Error::Exec(format!("cannot drop privileges: {}", e));
    }

    match execvp(prog, &args) {
        Ok(never) => match never {},
        Err(e) => Error::Exec(format!("{}: {}", argv[0], e)),
    }
}

#[cfg(not(feature = "exec"))]
pub fn exec_command(argv: &[String]) -> Error {
    Error::Exec(format!(
        "{}: exec support is not enabled",
        argv.first().map(String::as_str).unwrap_or("")
    ))
}
