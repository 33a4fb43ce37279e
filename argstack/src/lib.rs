//! getopt-style command-line parsing with aliases, exec substitution and
//! configuration-file defaults.
//!
//! - `Opt` and `OptionTable` describe the options a program accepts
//! - `Context` scans an argument vector against the table, one option at a
//!   time, expanding aliases and injected argument lists on the way
//! - config files add aliases (`app alias --name expansion...`) and exec
//!   options (`app exec --name script`)
//!
//! ```
//! use argstack::{ArgType, Context, ContextFlags, Opt, OptionTable};
//!
//! let table = OptionTable::new()
//!     .option(Opt::new("verbose").short('v').set_val(1))
//!     .option(Opt::new("count").short('c').arg_type(ArgType::Int).set_val(2));
//!
//! let argv = ["prog", "-vc", "3", "input.txt"];
//! let mut ctx = Context::new(Some("prog"), argv, &table, ContextFlags::empty());
//!
//! assert_eq!(ctx.next_opt().unwrap(), Some(1));
//! assert_eq!(ctx.next_opt().unwrap(), Some(2));
//! assert_eq!(ctx.get_opt_arg().as_deref(), Some("3"));
//! assert_eq!(ctx.next_opt().unwrap(), None);
//!
//! assert_eq!(ctx.get::<i32>("count").unwrap(), 3);
//! assert_eq!(ctx.get_args(), ["input.txt"]);
//! ```

mod alias;
mod config;
mod context;
mod error;
mod exec;
mod option;
mod tokenize;

pub use alias::{Alias, ExecEntry};
pub use config::{SYSTEM_CONFIG, USER_CONFIG};
pub use context::{Context, ContextBuilder, ContextFlags, END_OF_OPTIONS, MAX_DEPTH};
pub use error::{
    strerror, Error, Result, ERROR_BADNUMBER, ERROR_BADOPT, ERROR_BADQUOTE, ERROR_ERRNO,
    ERROR_NOARG, ERROR_OPTSTOODEEP, ERROR_OVERFLOW,
};
pub use exec::{build_exec_argv, exec_command, find_program_path};
pub use option::{
    parse_long, ArgType, FromStoredValue, IntoStoredValue, Opt, OptionTable, StoredValue,
};
pub use tokenize::parse_argv_string;
