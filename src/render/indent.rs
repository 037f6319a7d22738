//! Line indentation shared by the record formatters.

/// One nesting level.
pub const INDENT: &str = "    ";

/// Indent every non-empty line of `text` by one level.
///
/// Empty lines stay empty so that blank lines inside YAML block scalars do
/// not pick up trailing whitespace.
#[must_use]
pub fn indent_block(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
