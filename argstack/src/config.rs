//! Alias and exec definitions from configuration files.
//!
//! Each relevant line has the form
//!
//! ```text
//! <appname> alias <option> <expansion...>
//! <appname> exec  <option> <script>
//! ```
//!
//! where `<option>` is `--name` or `-c`. Blank lines and lines starting
//! with `#` are ignored, as is anything that does not fit this shape.
//! A backslash right before a newline joins the two lines.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::alias::{Alias, ExecEntry};
use crate::context::Context;
use crate::error::Result;
use crate::tokenize::{is_space, parse_argv_string};

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/popt";

/// Per-user configuration file, relative to the home directory.
pub const USER_CONFIG: &str = ".popt";

impl Context<'_> {
    /// Register the aliases and execs `path` defines for this context's
    /// application name. A missing file is not an error.
    pub fn read_config_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let content = join_continuations(&String::from_utf8_lossy(&bytes));
        for line in content.lines() {
            let l = line.trim_matches(is_space);
            if l.is_empty() || l.starts_with('#') {
                continue;
            }
            self.config_line(l);
        }
        Ok(())
    }

    /// Read the system config, then the user's own one unless the program
    /// runs with an effective user id different from the real one.
    pub fn read_default_config(&mut self) -> Result<()> {
        if self.name.is_none() {
            return Ok(());
        }

        self.read_config_file(SYSTEM_CONFIG)?;

        use nix::unistd::{geteuid, getuid};
        if getuid() != geteuid() {
            return Ok(());
        }
        if let Some(home) = home::home_dir() {
            self.read_config_file(home.join(USER_CONFIG))?;
        }
        Ok(())
    }

    fn config_line(&mut self, line: &str) {
        let Some(app_name) = self.name.as_deref() else {
            return;
        };
        let Some(rest) = line.strip_prefix(app_name) else {
            return;
        };
        if !rest.starts_with(is_space) {
            return;
        }

        let Some((entry_type, rest)) = next_word(rest) else {
            return;
        };
        let Some((opt, rest)) = next_word(rest) else {
            return;
        };
        if rest.is_empty() {
            return;
        }

        let (long_name, short_name) = if let Some(long) = opt.strip_prefix("--") {
            if long.is_empty() {
                return;
            }
            (Some(long.to_string()), None)
        } else {
            let mut chars = opt.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some('-'), Some(c), None) => (None, Some(c)),
                _ => return,
            }
        };

        match entry_type {
            "alias" => {
                let Ok(expansion) = parse_argv_string(rest) else {
                    debug!(option = opt, "skipping alias with bad quoting");
                    return;
                };
                debug!(option = opt, tokens = expansion.len(), "config alias");
                self.aliases.add(Alias {
                    long_name,
                    short_name,
                    expansion,
                });
            }
            "exec" => {
                debug!(option = opt, script = rest, "config exec");
                self.execs.add(ExecEntry {
                    long_name,
                    short_name,
                    script: rest.to_string(),
                });
            }
            _ => {}
        }
    }
}

/// Split off the first whitespace-delimited word, returning it and the
/// remainder with leading whitespace removed.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start_matches(is_space);
    if s.is_empty() {
        return None;
    }
    let end = s.find(is_space).unwrap_or(s.len());
    Some((&s[..end], s[end..].trim_start_matches(is_space)))
}

/// Remove backslash-newline pairs. Any other backslash is kept, including
/// one at the very end of the input.
fn join_continuations(content: &str) -> String {
    let mut joined = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\n') => {
                    chars.next();
                    continue;
                }
                Some(&next) => {
                    joined.push(c);
                    joined.push(next);
                    chars.next();
                    continue;
                }
                None => {}
            }
        }
        joined.push(c);
    }
    joined
}
