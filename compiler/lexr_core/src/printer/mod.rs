//! Human-readable token rendering.
//!
//! The engine only renders tokens when it builds error messages; the
//! printer is a pluggable collaborator so callers can match the wording of
//! their own diagnostics.

use crate::{Channel, Token};

/// Renders a token for diagnostics.
pub trait TokenPrinter: Send + Sync + std::fmt::Debug {
    fn print(&self, token: &Token<'_>) -> String;
}

/// Default printer.
///
/// Produces `"value" (name)`, `"value" (unknown)`, `"value" (name of channel)`
/// or `end of input`. Horizontal whitespace runs collapse to a single space,
/// control characters are escaped, and long values are shortened to
/// `max_chars` characters followed by `…` and an overflow count.
#[derive(Clone, Debug)]
pub struct PrettyPrinter {
    /// Maximum number of characters shown before shortening.
    pub max_chars: usize,
    /// Quote placed around values.
    pub quote: char,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        PrettyPrinter {
            max_chars: 30,
            quote: '"',
        }
    }
}

impl PrettyPrinter {
    /// Render only the quoted value of a token.
    pub fn print_value(&self, token: &Token<'_>) -> String {
        let value = self.escape(&inline(&token.text()));
        let chars = value.chars().count();
        if chars > self.max_chars {
            let overflow = chars - self.max_chars;
            let suffix = format!(" ({overflow}+)");
            if chars > self.max_chars + suffix.chars().count() {
                let head: String = value.chars().take(self.max_chars).collect();
                return format!("{}{suffix}", self.wrap(&format!("{head}…")));
            }
        }
        self.wrap(&value)
    }

    fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if c == self.quote {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    fn wrap(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push(self.quote);
        for c in value.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\u{0B}' => out.push_str("\\v"),
                c => out.push(c),
            }
        }
        out.push(self.quote);
        out
    }
}

impl TokenPrinter for PrettyPrinter {
    fn print(&self, token: &Token<'_>) -> String {
        match token.channel() {
            Channel::EndOfInput => "end of input".to_owned(),
            Channel::Unknown => format!("{} (unknown)", self.print_value(token)),
            Channel::Custom(channel) => match token.name() {
                Some(name) => format!("{} ({name} of {channel})", self.print_value(token)),
                None => format!("{} (of {channel})", self.print_value(token)),
            },
            Channel::Default | Channel::Hidden => match token.name() {
                Some(name) => format!("{} ({name})", self.print_value(token)),
                None => self.print_value(token),
            },
        }
    }
}

/// Collapse runs of horizontal whitespace into one space.
fn inline(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for c in value.chars() {
        if is_horizontal_space(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn is_horizontal_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\u{A0}' | '\u{1680}' | '\u{180E}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

#[cfg(test)]
mod tests;
