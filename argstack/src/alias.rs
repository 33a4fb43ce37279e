//! Alias and exec registries.

/// An option that expands into other arguments when it is seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub long_name: Option<String>,
    pub short_name: Option<char>,
    pub expansion: Vec<String>,
}

impl Alias {
    pub fn long(name: &str, expansion: Vec<String>) -> Self {
        Alias {
            long_name: Some(name.to_string()),
            short_name: None,
            expansion,
        }
    }

    pub fn short(c: char, expansion: Vec<String>) -> Self {
        Alias {
            long_name: None,
            short_name: Some(c),
            expansion,
        }
    }

    /// Same option name as `other`; used to stop an alias expanding inside
    /// its own frame.
    pub(crate) fn same_name(&self, long: Option<&str>, short: Option<char>) -> bool {
        match (long, short) {
            (Some(l), _) => self.long_name.as_deref() == Some(l),
            (None, Some(c)) => self.short_name == Some(c),
            (None, None) => false,
        }
    }
}

/// An option that, once scanning ends, hands the whole command line over
/// to another program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecEntry {
    pub long_name: Option<String>,
    pub short_name: Option<char>,
    pub script: String,
}

impl ExecEntry {
    pub fn long(name: &str, script: &str) -> Self {
        ExecEntry {
            long_name: Some(name.to_string()),
            short_name: None,
            script: script.to_string(),
        }
    }

    pub fn short(c: char, script: &str) -> Self {
        ExecEntry {
            long_name: None,
            short_name: Some(c),
            script: script.to_string(),
        }
    }
}

/// Anything that can be looked up by `--long` or `-c`.
pub(crate) trait Named {
    fn long_name(&self) -> Option<&str>;
    fn short_name(&self) -> Option<char>;
}

impl Named for Alias {
    fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    fn short_name(&self) -> Option<char> {
        self.short_name
    }
}

impl Named for ExecEntry {
    fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    fn short_name(&self) -> Option<char> {
        self.short_name
    }
}

/// Append-only list of named entries. Later registrations shadow earlier
/// ones with the same name.
#[derive(Debug, Clone)]
pub(crate) struct Registry<T> {
    entries: Vec<T>,
}

pub(crate) type AliasTable = Registry<Alias>;
pub(crate) type ExecTable = Registry<ExecEntry>;

impl<T: Named> Registry<T> {
    pub(crate) fn new() -> Self {
        Registry {
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub(crate) fn get(&self, idx: usize) -> &T {
        &self.entries[idx]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Index of the newest entry called `--long` or `-c`, whichever is given.
    pub(crate) fn find(&self, long: Option<&str>, short: Option<char>) -> Option<usize> {
        self.entries.iter().rposition(|e| match (long, short) {
            (Some(l), _) => e.long_name() == Some(l),
            (None, Some(c)) => e.short_name() == Some(c),
            (None, None) => false,
        })
    }
}
