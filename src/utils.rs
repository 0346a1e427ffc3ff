//! Utility functions.

/// Tab stop width used by the table output.
pub const TAB_SIZE: usize = 8;

/// The first tab stop strictly after `column`.
pub fn next_tab_stop(column: usize) -> usize {
    (column + TAB_SIZE) / TAB_SIZE * TAB_SIZE
}

/// Number of tabs to emit after `s` so that the next field starts past a
/// column of `width` characters. Always at least one.
///
/// Columns count characters, the same unit [`expand_tabs`] uses.
pub fn compute_tabs(s: &str, width: usize) -> usize {
    let mut column = s.chars().count();
    if column >= width {
        return 1;
    }
    let mut tabs = 0;
    while column <= width {
        column = next_tab_stop(column);
        tabs += 1;
    }
    tabs
}

/// Replaces every tab with the spaces needed to reach the next tab stop,
/// tracking the output column from the start of each line.
pub fn expand_tabs(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4 * TAB_SIZE);
    let mut column = 0;
    for c in input.chars() {
        match c {
            '\t' => {
                let stop = next_tab_stop(column);
                out.extend(std::iter::repeat(' ').take(stop - column));
                column = stop;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
