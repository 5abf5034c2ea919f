//! Command definitions
//!
//! Turns a plain command line into protocol arguments.

use bytes::Bytes;

/// A tokenized command line
///
/// Arguments are split on ASCII spaces only. Quotes and escapes are not
/// interpreted, so `eval "1+1"` sends the argument `"1+1"` with its quotes,
/// and an argument cannot itself contain a space. This mirrors the plain
/// text command interface of the client and is not binary safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Tokenize a command line
    pub fn parse(line: &str) -> Self {
        let args = line
            .split(' ')
            .filter(|arg| !arg.is_empty())
            .map(|arg| Bytes::copy_from_slice(arg.as_bytes()))
            .collect();
        Self { args }
    }

    /// Build a command from pre-split arguments
    pub fn from_args<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Command name (first argument), if any
    pub fn name(&self) -> Option<&[u8]> {
        self.args.first().map(|arg| arg.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }
}
