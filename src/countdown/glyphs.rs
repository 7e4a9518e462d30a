/// Five-row block glyph for one clock character.
fn glyph(c: char) -> [&'static str; 5] {
    match c {
        '0' => ["██████", "██  ██", "██  ██", "██  ██", "██████"],
        '1' => ["   ██ ", "  ███ ", "   ██ ", "   ██ ", "   ██ "],
        '2' => ["██████", "    ██", "██████", "██    ", "██████"],
        '3' => ["██████", "    ██", " █████", "    ██", "██████"],
        '4' => ["██  ██", "██  ██", "██████", "    ██", "    ██"],
        '5' => ["██████", "██    ", "██████", "    ██", "██████"],
        '6' => ["██████", "██    ", "██████", "██  ██", "██████"],
        '7' => ["██████", "    ██", "   ██ ", "  ██  ", "  ██  "],
        '8' => [" ████ ", "██  ██", " ████ ", "██  ██", " ████ "],
        '9' => ["██████", "██  ██", "██████", "    ██", " █████"],
        ':' => ["  ", "██", "  ", "██", "  "],
        _ => ["", "", "", "", ""],
    }
}

/// `MM:SS` for the given number of seconds, drawn as five rows of block glyphs.
///
/// Minutes past 99 simply widen the clock.
pub fn glyph_lines(seconds: i64) -> Vec<String> {
    let seconds = seconds.max(0);
    let clock = format!("{:02}:{:02}", seconds / 60, seconds % 60);
    let mut lines = vec![String::new(); 5];
    for c in clock.chars() {
        for (line, part) in lines.iter_mut().zip(glyph(c)) {
            line.push_str(part);
            line.push(' ');
        }
    }
    lines
}
