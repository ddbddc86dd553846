/// Calculates the 1-based line and column number for a given byte position in the source text.
/// This function is designed to be called only when an error occurs, as it iterates through
/// the source text to determine the position.
pub fn get_line_and_column(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Returns the full text of the line containing `position`, without its line terminator.
pub fn line_at(source: &str, position: usize) -> &str {
    let mut position = position.min(source.len());
    while !source.is_char_boundary(position) {
        position -= 1;
    }
    let start = source[..position].rfind('\n').map_or(0, |i| i + 1);
    let end = source[position..]
        .find('\n')
        .map_or(source.len(), |i| position + i);
    source[start..end].trim_end_matches('\r')
}

/// Renders the offending line followed by a caret aligned under `position`.
///
/// Short messages are placed after the caret; when the message fits in the
/// space left of the caret it is right-aligned against it instead, so the
/// pointer stays readable for errors near the end of long lines.
pub fn point_at(source: &str, position: usize, message: &str) -> String {
    let line = line_at(source, position);
    let (_, column) = get_line_and_column(source, position);
    let col = column - 1;
    let message_width = message.chars().count();

    let pointer = if message_width + 2 < col {
        format!("{}{} ^", " ".repeat(col - message_width - 1), message)
    } else {
        format!("{}^ {}", " ".repeat(col), message)
    };

    format!("\n{line}\n{pointer}")
}
