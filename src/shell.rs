//! Shell-safety quoting for values embedded in rendered command lines.
//!
//! The Dockerfile renderer emits `RUN`/`ENV`/`CMD` lines that the container
//! engine hands to a shell, so any configured value landing inside one of
//! those lines goes through [`quote`] first. Lifecycle commands pass their
//! arguments directly through `Command` argv and never need this.

/// Escape an arbitrary string for literal use in a shell command line.
///
/// Already-safe alphanumeric strings come back unchanged; anything else is
/// single-quoted. Every input is legal, including the empty string.
pub fn quote(value: &str) -> String {
    shell_words::quote(value).into_owned()
}
