use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

// ── Single-line text input ────────────────────────────────────────────

/// One-line editable buffer with a byte-offset cursor.
///
/// Used for every prompt in the TUI: new task, edit task, rename tab or
/// separator, and the import path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    buf: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input pre-filled with `text`, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            buf: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Take the contents, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buf)
    }

    /// Apply an editing key. Returns `true` if the key was consumed.
    ///
    /// Alt moves or deletes by word; Super (or Home/End) jumps to the line
    /// edges; Ctrl+W and Ctrl+U mirror the readline bindings.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.cursor = self.cursor.min(self.buf.len());
        let word = modifiers.contains(KeyModifiers::ALT);
        let line = modifiers.contains(KeyModifiers::SUPER);
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Left if line => self.cursor = 0,
            KeyCode::Left if word => self.cursor = word_start_before(&self.buf, self.cursor),
            KeyCode::Left => self.cursor = self.prev_char(),
            KeyCode::Right if line => self.cursor = self.buf.len(),
            KeyCode::Right if word => self.cursor = word_start_after(&self.buf, self.cursor),
            KeyCode::Right => self.cursor = self.next_char(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buf.len(),

            KeyCode::Backspace if word => self.delete_back_to(word_start_before(&self.buf, self.cursor)),
            KeyCode::Backspace if line => self.delete_back_to(0),
            KeyCode::Char('w') if ctrl => self.delete_back_to(word_start_before(&self.buf, self.cursor)),
            KeyCode::Char('u') if ctrl => self.delete_back_to(0),
            KeyCode::Backspace => self.delete_back_to(self.prev_char()),
            KeyCode::Delete => {
                let end = self.next_char();
                self.buf.drain(self.cursor..end);
            }

            KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.buf.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => return false,
        }
        true
    }

    /// Contents with a block cursor glyph spliced in at the cursor.
    pub fn display(&self) -> String {
        let (before, after) = self.buf.split_at(self.cursor.min(self.buf.len()));
        format!("{before}\u{2588}{after}")
    }

    fn prev_char(&self) -> usize {
        self.buf[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_char(&self) -> usize {
        self.buf[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    fn delete_back_to(&mut self, pos: usize) {
        self.buf.drain(pos..self.cursor);
        self.cursor = pos;
    }
}

/// Start of the word at or before `pos`, skipping whitespace first.
fn word_start_before(s: &str, pos: usize) -> usize {
    let trimmed = s[..pos].trim_end();
    trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Start of the next word after `pos`.
fn word_start_after(s: &str, pos: usize) -> usize {
    let rest = &s[pos..];
    let Some(gap) = rest.find(char::is_whitespace) else {
        return s.len();
    };
    rest[gap..]
        .find(|c: char| !c.is_whitespace())
        .map_or(s.len(), |next| pos + gap + next)
}

// ── Rendering helpers ─────────────────────────────────────────────────

/// Centred `width`×`height` panel with a cleared background and border.
/// Returns the inner area.
pub fn render_modal(
    frame: &mut Frame,
    title: &str,
    border_style: Style,
    width: u16,
    height: u16,
) -> Rect {
    let area = frame.area();
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let panel = Rect::new(
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
        w,
        h,
    );

    frame.render_widget(Clear, panel);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(panel);
    frame.render_widget(block, panel);
    inner
}

/// Single line of `key description` pairs.
pub fn hint_line<'a>(hints: &[(&'a str, &'a str)], key_style: Style, desc_style: Style) -> Line<'a> {
    let spans: Vec<Span<'a>> = hints
        .iter()
        .flat_map(|&(key, desc)| {
            [
                Span::styled(key, key_style),
                Span::styled(format!(" {desc}  "), desc_style),
            ]
        })
        .collect();
    Line::from(spans)
}

pub fn render_hints(
    frame: &mut Frame,
    area: Rect,
    hints: &[(&str, &str)],
    key_style: Style,
    desc_style: Style,
) {
    frame.render_widget(Paragraph::new(hint_line(hints, key_style, desc_style)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextInput {
        TextInput::with_text(text)
    }

    fn press(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) -> bool {
        input.handle_key(code, modifiers)
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = TextInput::new();
        for c in "milk".chars() {
            assert!(press(&mut input, KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert_eq!(input.value(), "milk");
        press(&mut input, KeyCode::Home, KeyModifiers::NONE);
        press(&mut input, KeyCode::Char('>'), KeyModifiers::SHIFT);
        assert_eq!(input.value(), ">milk");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = typed("heello");
        input.cursor = 3;
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor, 2);

        press(&mut input, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.value(), "helo");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = typed("abc");
        input.cursor = 0;
        assert!(press(&mut input, KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.value(), "abc");
        input.cursor = 3;
        press(&mut input, KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn handles_multibyte_chars() {
        let mut input = typed("café");
        press(&mut input, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(input.cursor, 3);
        press(&mut input, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(input.cursor, 5);
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "caf");
    }

    #[test]
    fn word_jumps() {
        let mut input = typed("buy oat milk");
        press(&mut input, KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(input.cursor, 8);
        press(&mut input, KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(input.cursor, 4);
        press(&mut input, KeyCode::Right, KeyModifiers::ALT);
        assert_eq!(input.cursor, 8);
        press(&mut input, KeyCode::Right, KeyModifiers::ALT);
        assert_eq!(input.cursor, 12);
    }

    #[test]
    fn line_jumps() {
        let mut input = typed("hello world");
        press(&mut input, KeyCode::Left, KeyModifiers::SUPER);
        assert_eq!(input.cursor, 0);
        press(&mut input, KeyCode::Right, KeyModifiers::SUPER);
        assert_eq!(input.cursor, 11);
        press(&mut input, KeyCode::Home, KeyModifiers::NONE);
        press(&mut input, KeyCode::End, KeyModifiers::NONE);
        assert_eq!(input.cursor, 11);
    }

    #[test]
    fn word_deletion() {
        let mut input = typed("hello world  ");
        press(&mut input, KeyCode::Backspace, KeyModifiers::ALT);
        assert_eq!(input.value(), "hello ");

        let mut input = typed("hello world");
        press(&mut input, KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(input.value(), "hello ");
        assert_eq!(input.cursor, 6);
    }

    #[test]
    fn line_deletion() {
        let mut input = typed("hello world");
        input.cursor = 6;
        press(&mut input, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(input.value(), "world");
        assert_eq!(input.cursor, 0);

        let mut input = typed("hello");
        press(&mut input, KeyCode::Backspace, KeyModifiers::SUPER);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn control_chords_are_not_consumed() {
        let mut input = typed("hello");
        assert!(!press(&mut input, KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert!(!press(&mut input, KeyCode::Enter, KeyModifiers::NONE));
        assert!(!press(&mut input, KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(input.value(), "hello");
    }

    #[test]
    fn take_empties_the_input() {
        let mut input = typed("water plants");
        assert_eq!(input.take(), "water plants");
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn display_shows_cursor() {
        let mut input = typed("hello");
        assert_eq!(input.display(), "hello\u{2588}");
        input.cursor = 2;
        assert_eq!(input.display(), "he\u{2588}llo");
        input.clear();
        assert_eq!(input.display(), "\u{2588}");
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(word_start_before("", 0), 0);
        assert_eq!(word_start_before("   ", 3), 0);
        assert_eq!(word_start_before("one", 3), 0);
        assert_eq!(word_start_after("one two", 0), 4);
        assert_eq!(word_start_after("one two", 7), 7);
        assert_eq!(word_start_after("one   ", 0), 6);
    }
}
