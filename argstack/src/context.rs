//! The option scanner.
//!
//! A [`Context`] walks a stack of argument frames. The bottom frame is the
//! program's own argv; aliases and [`Context::stuff_args`] push more frames
//! on top, which are scanned to exhaustion before the frame below resumes.

use std::collections::{HashMap, HashSet};
use std::ops::BitOr;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::alias::{Alias, AliasTable, ExecEntry, ExecTable};
use crate::error::{Error, Result};
use crate::exec::{build_exec_argv, exec_command, find_program_path};
use crate::option::{canonical_name, FromStoredValue, Opt, OptionTable, StoredValue};

/// Deepest the frame stack may get, counting the program's own argv.
pub const MAX_DEPTH: usize = 10;

/// Returned by [`Context::next_code`] once all options are consumed.
pub const END_OF_OPTIONS: i32 = -1;

// ============================================================================
// ContextFlags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextFlags(u32);

impl ContextFlags {
    /// Scan `argv[0]` too instead of skipping it.
    pub const KEEP_FIRST: ContextFlags = ContextFlags(1);
    /// Exec options are accepted but never dispatched.
    pub const NO_EXEC: ContextFlags = ContextFlags(1 << 1);
    /// Options end at the first non-option argument.
    pub const POSIX_ME_HARDER: ContextFlags = ContextFlags(1 << 2);

    pub const fn empty() -> Self {
        ContextFlags(0)
    }

    pub const fn contains(self, other: ContextFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ContextFlags {
    type Output = ContextFlags;

    fn bitor(self, rhs: ContextFlags) -> ContextFlags {
        ContextFlags(self.0 | rhs.0)
    }
}

// ============================================================================
// ParseFrame
// ============================================================================

struct ParseFrame {
    args: Vec<String>,
    next: usize,
    next_char_arg: Option<String>, // rest of a short option cluster
    curr_alias: Option<usize>,     // alias that produced this frame
    stuffed: bool,
}

impl ParseFrame {
    fn new(args: Vec<String>, curr_alias: Option<usize>, stuffed: bool) -> Self {
        ParseFrame {
            args,
            next: 0,
            next_char_arg: None,
            curr_alias,
            stuffed,
        }
    }

    fn exhausted(&self) -> bool {
        self.next_char_arg.is_none() && self.next >= self.args.len()
    }
}

// ============================================================================
// ContextBuilder
// ============================================================================

pub struct ContextBuilder<'a> {
    name: Option<String>,
    options: &'a OptionTable,
    args: Option<Vec<String>>,
    flags: ContextFlags,
    exec_path: Option<(String, bool)>,
    config_files: Vec<PathBuf>,
    read_default_config: bool,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(options: &'a OptionTable) -> Self {
        ContextBuilder {
            name: None,
            options,
            args: None,
            flags: ContextFlags::empty(),
            exec_path: None,
            config_files: Vec::new(),
            read_default_config: false,
        }
    }

    /// Application name; config file lines are matched against it.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Argument vector including `argv[0]`. Defaults to the process
    /// arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn flags(mut self, flags: ContextFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn exec_path(mut self, path: &str, allow_absolute: bool) -> Self {
        self.exec_path = Some((path.to_string(), allow_absolute));
        self
    }

    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn default_config(mut self) -> Self {
        self.read_default_config = true;
        self
    }

    pub fn build(self) -> Result<Context<'a>> {
        let args = self.args.unwrap_or_else(|| std::env::args().collect());
        let mut ctx = Context::new(self.name.as_deref(), args, self.options, self.flags);
        if let Some((path, allow_absolute)) = self.exec_path {
            ctx.set_exec_path(&path, allow_absolute);
        }
        if self.read_default_config {
            ctx.read_default_config()?;
        }
        for path in &self.config_files {
            ctx.read_config_file(path)?;
        }
        Ok(ctx)
    }
}

// ============================================================================
// Context
// ============================================================================

pub struct Context<'a> {
    pub(crate) name: Option<String>,
    options: &'a OptionTable,
    flags: ContextFlags,
    stack: Vec<ParseFrame>,
    base_start: usize,
    rest_leftover: bool,
    leftovers: Vec<String>,
    next_leftover: usize,
    pub(crate) aliases: AliasTable,
    pub(crate) execs: ExecTable,
    final_argv: Vec<String>,
    do_exec: Option<usize>,
    exec_path: Option<String>,
    exec_absolute: bool,
    opt_arg: Option<String>,
    values: HashMap<String, StoredValue>,
    present: HashSet<String>,
}

impl<'a> Context<'a> {
    pub fn builder(options: &'a OptionTable) -> ContextBuilder<'a> {
        ContextBuilder::new(options)
    }

    /// New context over `argv` (including `argv[0]`). The option table is
    /// borrowed for the lifetime of the context.
    pub fn new<I, S>(
        name: Option<&str>,
        argv: I,
        options: &'a OptionTable,
        flags: ContextFlags,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = argv.into_iter().map(Into::into).collect();
        let base_start = if flags.contains(ContextFlags::KEEP_FIRST) {
            0
        } else {
            1
        };
        let mut base = ParseFrame::new(args, None, false);
        base.next = base_start;

        let mut values = HashMap::new();
        for opt in options.options() {
            if let Some(ref default) = opt.default_value {
                values.insert(opt.storage_key(), default.clone());
            }
        }

        Context {
            name: name.map(str::to_string),
            options,
            flags,
            stack: vec![base],
            base_start,
            rest_leftover: false,
            leftovers: Vec::new(),
            next_leftover: 0,
            aliases: AliasTable::new(),
            execs: ExecTable::new(),
            final_argv: Vec::new(),
            do_exec: None,
            exec_path: None,
            exec_absolute: false,
            opt_arg: None,
            values,
            present: HashSet::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_exec_path(&mut self, path: &str, allow_absolute: bool) {
        self.exec_path = Some(path.to_string());
        self.exec_absolute = allow_absolute;
    }

    pub fn add_alias(&mut self, alias: Alias) {
        self.aliases.add(alias);
    }

    pub fn add_exec(&mut self, exec: ExecEntry) {
        self.execs.add(exec);
    }

    pub fn aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    pub fn execs(&self) -> impl Iterator<Item = &ExecEntry> {
        self.execs.iter()
    }

    /// Scan until the next option with a non-zero result code.
    ///
    /// Returns `Ok(None)` once every frame is exhausted. If an exec option
    /// was seen, reaching the end dispatches it first; that call does not
    /// return unless the exec fails.
    pub fn next_opt(&mut self) -> Result<Option<i32>> {
        let table = self.options;

        loop {
            while self.stack.len() > 1 && self.top().exhausted() {
                self.pop_frame();
            }
            if self.top().exhausted() {
                if let Some(idx) = self.do_exec.take() {
                    self.dispatch_exec(idx);
                }
                return Ok(None);
            }

            let depth = self.stack.len() - 1;
            let mut long_arg: Option<String> = None;

            let opt: &'a Opt = if let Some(cluster) = self.stack[depth].next_char_arg.take() {
                let mut chars = cluster.chars();
                let Some(c) = chars.next() else { continue };
                let rest = chars.as_str();

                if self.handle_alias(None, Some(c), rest, None)? {
                    continue;
                }
                if self.handle_exec(None, Some(c), None) {
                    if !rest.is_empty() {
                        self.stack[depth].next_char_arg = Some(rest.to_string());
                    }
                    continue;
                }

                let opt = table
                    .find_short(c)
                    .ok_or_else(|| Error::BadOption(format!("-{}", c)))?;
                if !rest.is_empty() {
                    self.stack[depth].next_char_arg = Some(rest.to_string());
                }
                opt
            } else {
                let frame = &mut self.stack[depth];
                let arg = frame.args[frame.next].clone();
                frame.next += 1;

                if self.rest_leftover || !arg.starts_with('-') || arg == "-" {
                    if self.flags.contains(ContextFlags::POSIX_ME_HARDER) {
                        self.rest_leftover = true;
                    }
                    self.leftovers.push(arg);
                    continue;
                }
                if arg == "--" {
                    self.rest_leftover = true;
                    continue;
                }

                let Some(body) = arg.strip_prefix("--") else {
                    self.stack[depth].next_char_arg = Some(arg[1..].to_string());
                    continue;
                };
                let (name, value) = match body.split_once('=') {
                    Some((n, v)) => (n, Some(v)),
                    None => (body, None),
                };

                if self.handle_alias(Some(name), None, "", value)? {
                    continue;
                }
                if self.handle_exec(Some(name), None, value) {
                    continue;
                }

                let opt = table
                    .find_long(name)
                    .ok_or_else(|| Error::BadOption(arg.clone()))?;
                long_arg = value.map(str::to_string);
                opt
            };

            self.opt_arg = None;
            if opt.takes_arg() {
                let value = match long_arg {
                    Some(v) => v,
                    None => match self.stack[depth].next_char_arg.take() {
                        Some(rest) => rest,
                        None => self.next_value(opt)?,
                    },
                };
                let stored = opt.convert(&value)?;
                self.store(opt, stored);
                self.final_argv.push(opt.canonical());
                self.final_argv.push(value.clone());
                self.opt_arg = Some(value);
            } else {
                self.store(opt, StoredValue::Bool(true));
                self.final_argv.push(opt.canonical());
            }

            if opt.val() != 0 {
                return Ok(Some(opt.val()));
            }
        }
    }

    /// [`next_opt`](Self::next_opt) folded into a single integer: the
    /// result code, [`END_OF_OPTIONS`], or a negative error code.
    pub fn next_code(&mut self) -> i32 {
        match self.next_opt() {
            Ok(Some(code)) => code,
            Ok(None) => END_OF_OPTIONS,
            Err(e) => e.code(),
        }
    }

    /// Scan everything, ignoring result codes.
    pub fn parse(&mut self) -> Result<()> {
        while self.next_opt()?.is_some() {}
        Ok(())
    }

    /// Take the value of the most recently matched option.
    pub fn get_opt_arg(&mut self) -> Option<String> {
        self.opt_arg.take()
    }

    /// Next leftover argument, advancing past it.
    pub fn get_arg(&mut self) -> Option<&str> {
        let arg = self.leftovers.get(self.next_leftover)?;
        self.next_leftover += 1;
        Some(arg.as_str())
    }

    pub fn peek_arg(&self) -> Option<&str> {
        self.leftovers.get(self.next_leftover).map(String::as_str)
    }

    /// All leftovers not yet taken with [`get_arg`](Self::get_arg).
    pub fn get_args(&self) -> &[String] {
        &self.leftovers[self.next_leftover..]
    }

    /// Options and values in the order they were consumed, in canonical
    /// `--long`/`-c` form.
    pub fn final_argv(&self) -> &[String] {
        &self.final_argv
    }

    /// Scan `args` before resuming the current argument list.
    pub fn stuff_args<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.stack.len() >= MAX_DEPTH {
            return Err(Error::OptionsTooDeep);
        }
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        debug!(count = args.len(), depth = self.stack.len(), "stuffing arguments");
        self.stack.push(ParseFrame::new(args, None, true));
        Ok(())
    }

    /// Start over from the beginning of the program's arguments. Registered
    /// aliases, execs and stored values are kept.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
        let base = &mut self.stack[0];
        base.next = self.base_start;
        base.next_char_arg = None;
        base.curr_alias = None;

        self.leftovers.clear();
        self.next_leftover = 0;
        self.rest_leftover = false;
        self.do_exec = None;
        self.final_argv.clear();
        self.opt_arg = None;
    }

    /// The argument that was being scanned when an error came back. With
    /// `strip_aliases` it is taken from the program's own arguments rather
    /// than from an alias expansion.
    pub fn bad_option(&self, strip_aliases: bool) -> Option<&str> {
        let frame = if strip_aliases {
            &self.stack[0]
        } else {
            self.top()
        };
        frame
            .next
            .checked_sub(1)
            .and_then(|i| frame.args.get(i))
            .map(String::as_str)
    }

    /// Argument vector the pending exec option would run, if there is one.
    pub fn exec_argv(&self) -> Option<Result<Vec<String>>> {
        self.do_exec.map(|idx| self.exec_argv_for(idx))
    }

    fn exec_argv_for(&self, idx: usize) -> Result<Vec<String>> {
        let program = self.stack[0]
            .args
            .first()
            .and_then(|argv0| find_program_path(argv0))
            .map(|p| p.to_string_lossy().into_owned());
        build_exec_argv(
            &self.execs.get(idx).script,
            self.exec_path.as_deref(),
            self.exec_absolute,
            program.as_deref(),
            &self.final_argv,
            &self.leftovers,
        )
    }

    pub fn get<T: FromStoredValue>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(v) => T::from_stored_value(v),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.present.contains(name)
    }

    fn top(&self) -> &ParseFrame {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut ParseFrame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if frame.stuffed {
                debug!(depth = self.stack.len(), "stuffed arguments exhausted");
            }
        }
    }

    /// Next whole argument for a value-taking option, taken from the
    /// nearest frame with tokens left. Exhausted frames are popped; frames
    /// that only hold the rest of a short cluster stay, so the cluster
    /// resumes once the value is consumed.
    fn next_value(&mut self, opt: &Opt) -> Result<String> {
        while self.stack.len() > 1 && self.top().exhausted() {
            self.pop_frame();
        }
        let Some(frame) = self
            .stack
            .iter_mut()
            .rev()
            .find(|f| f.next < f.args.len())
        else {
            return Err(Error::MissingArgument(opt.canonical()));
        };
        let v = frame.args[frame.next].clone();
        frame.next += 1;
        Ok(v)
    }

    fn store(&mut self, opt: &Opt, value: StoredValue) {
        let key = opt.storage_key();
        self.values.insert(key.clone(), value);
        self.present.insert(key);
    }

    /// Push a frame for the alias called `long`/`short`, unless the current
    /// frame is that alias's own expansion. `rest` is what is left of a short
    /// option cluster; it resumes once the alias frame is done.
    fn handle_alias(
        &mut self,
        long: Option<&str>,
        short: Option<char>,
        rest: &str,
        long_arg: Option<&str>,
    ) -> Result<bool> {
        if let Some(curr) = self.top().curr_alias {
            if self.aliases.get(curr).same_name(long, short) {
                return Ok(false);
            }
        }
        let Some(idx) = self.aliases.find(long, short) else {
            return Ok(false);
        };
        if self.stack.len() >= MAX_DEPTH {
            return Err(Error::OptionsTooDeep);
        }

        if !rest.is_empty() {
            self.top_mut().next_char_arg = Some(rest.to_string());
        }
        let mut args = self.aliases.get(idx).expansion.clone();
        if let Some(v) = long_arg {
            args.push(v.to_string());
        }
        debug!(
            alias = %canonical_name(long, short),
            depth = self.stack.len(),
            "expanding alias"
        );
        self.stack.push(ParseFrame::new(args, Some(idx), false));
        Ok(true)
    }

    /// Record an exec option. The first one seen is the one dispatched;
    /// later ones are passed along to it as arguments.
    fn handle_exec(
        &mut self,
        long: Option<&str>,
        short: Option<char>,
        long_arg: Option<&str>,
    ) -> bool {
        let Some(idx) = self.execs.find(long, short) else {
            return false;
        };
        if self.flags.contains(ContextFlags::NO_EXEC) {
            return true;
        }

        if self.do_exec.is_none() {
            debug!(
                exec = %canonical_name(long, short),
                script = %self.execs.get(idx).script,
                "deferring exec"
            );
            self.do_exec = Some(idx);
        } else {
            self.final_argv.push(canonical_name(long, short));
        }
        if let Some(v) = long_arg {
            self.final_argv.push(v.to_string());
        }
        true
    }

    fn dispatch_exec(&self, idx: usize) {
        let argv = match self.exec_argv_for(idx) {
            Ok(argv) => argv,
            Err(e) => {
                warn!(script = %self.execs.get(idx).script, error = %e, "exec refused");
                return;
            }
        };
        let err = exec_command(&argv);
        warn!(script = %argv[0], error = %err, "exec failed");
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("depth", &self.stack.len())
            .field("leftovers", &self.leftovers)
            .field("final_argv", &self.final_argv)
            .finish_non_exhaustive()
    }
}
