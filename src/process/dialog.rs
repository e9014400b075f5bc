// ABOUTME: Scripted dialogs for driving interactive programs.
// ABOUTME: An ordered list of prompt matchers and responses consumed by a cursor.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Matches CSI sequences (colors, cursor movement) and OSC sequences (titles).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
        .expect("ANSI escape pattern is valid")
});

/// Remove terminal escape sequences so prompts can be matched as plain text.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if text.contains('\x1b') {
        ANSI_ESCAPE.replace_all(text, "")
    } else {
        Cow::Borrowed(text)
    }
}

/// How a dialog entry recognizes its prompt.
#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn contains(text: impl Into<String>) -> Self {
        Matcher::Contains(text.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Matcher::Pattern)
    }

    /// Byte offset just past the first match in `haystack`.
    fn match_end(&self, haystack: &str) -> Option<usize> {
        match self {
            Matcher::Contains(needle) => haystack.find(needle.as_str()).map(|i| i + needle.len()),
            Matcher::Pattern(re) => re.find(haystack).map(|m| m.end()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Matcher::Contains(needle) => needle.clone(),
            Matcher::Pattern(re) => format!("/{}/", re.as_str()),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::contains(value)
    }
}

/// Named keys understood by prompt libraries reading a raw stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Tab,
    Escape,
    Backspace,
}

impl Key {
    /// Bytes written to a piped stdin. Enter is a bare newline since there is no TTY.
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Key::Enter => b"\n",
            Key::ArrowUp => b"\x1b[A",
            Key::ArrowDown => b"\x1b[B",
            Key::ArrowRight => b"\x1b[C",
            Key::ArrowLeft => b"\x1b[D",
            Key::Space => b" ",
            Key::Tab => b"\t",
            Key::Escape => b"\x1b",
            Key::Backspace => b"\x7f",
        }
    }
}

/// One unit of scripted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Key(Key),
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        Token::Text(value.into())
    }

    pub fn submit() -> Self {
        Token::Key(Key::Enter)
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Token::Text(s) => s.as_bytes(),
            Token::Key(k) => k.bytes(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogEntry {
    pub matcher: Matcher,
    pub responses: Vec<Token>,
}

/// Ordered script of expected prompts and the input to type for each.
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    entries: Vec<DialogEntry>,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `matcher`, then type `responses` in order.
    pub fn expect(mut self, matcher: impl Into<Matcher>, responses: Vec<Token>) -> Self {
        self.entries.push(DialogEntry {
            matcher: matcher.into(),
            responses,
        });
        self
    }

    /// Expect `prompt`, then type `text` and press Enter.
    pub fn answer(self, prompt: impl Into<Matcher>, text: &str) -> Self {
        self.expect(prompt, vec![Token::text(text), Token::submit()])
    }

    pub fn entries(&self) -> &[DialogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A prompt matched by the cursor.
#[derive(Debug, Clone)]
pub struct DialogMatch {
    /// Index of the consumed entry.
    pub index: usize,
    /// Byte offset just past the matched text in the scanned input.
    pub end: usize,
    pub responses: Vec<Token>,
}

/// Cursor over a dialog. Only the next unconsumed entry is ever tested.
#[derive(Debug, Clone)]
pub struct DialogCursor {
    dialog: Dialog,
    next: usize,
}

impl DialogCursor {
    pub fn new(dialog: Dialog) -> Self {
        Self { dialog, next: 0 }
    }

    /// Test the next entry against `text`; advance on match.
    pub fn try_match(&mut self, text: &str) -> Option<DialogMatch> {
        let entry = self.dialog.entries.get(self.next)?;
        let end = entry.matcher.match_end(text)?;
        let index = self.next;
        self.next += 1;
        Some(DialogMatch {
            index,
            end,
            responses: entry.responses.clone(),
        })
    }

    /// Consume every entry matched in sequence within `text`.
    ///
    /// Each later entry is only tested against the text after the previous
    /// match, so one prompt never satisfies two entries.
    pub fn scan(&mut self, text: &str) -> Vec<DialogMatch> {
        let mut matches = Vec::new();
        let mut offset = 0;
        while let Some(mut m) = text.get(offset..).and_then(|rest| self.try_match(rest)) {
            offset += m.end;
            m.end = offset;
            matches.push(m);
        }
        matches
    }

    pub fn consumed(&self) -> usize {
        self.next
    }

    pub fn is_complete(&self) -> bool {
        self.next >= self.dialog.entries.len()
    }

    /// Entries never matched, in dialog order.
    pub fn pending(&self) -> &[DialogEntry] {
        self.dialog.entries.get(self.next..).unwrap_or_default()
    }
}
