//! Terminal colorization for command output
//!
//! Applies ANSI escape codes to status symbols using crossterm. Everything
//! else passes through untouched.

use crossterm::style::{Color, Stylize};

/// Color used for a status symbol, if it is one
fn symbol_color(c: char) -> Option<Color> {
    match c {
        '✓' => Some(Color::Green),
        '✗' => Some(Color::Red),
        '⚠' => Some(Color::Yellow),
        '·' => Some(Color::DarkGrey),
        _ => None,
    }
}

/// Colorize status symbols in `input`
///
/// - Pass `✓`: Green
/// - Fail `✗`: Red
/// - Warning `⚠`: Yellow
/// - Skipped `·`: Dark grey
pub fn colorize_output(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);

    for c in input.chars() {
        match symbol_color(c) {
            Some(color) => result.push_str(&format!("{}", c.to_string().with(color))),
            None => result.push(c),
        }
    }

    result
}
