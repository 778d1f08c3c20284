/// One submitted command and what it printed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) command: String,
    pub(crate) output: Vec<String>,
}

impl HistoryEntry {
    pub(crate) fn new(command: impl Into<String>, output: Vec<String>) -> Self {
        Self {
            command: command.into(),
            output,
        }
    }
}

/// Append-only scrollback; `clear` is the only way to drop entries.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scrollback {
    entries: Vec<HistoryEntry>,
}

impl Scrollback {
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Arrow-key recall over previously submitted commands.
///
/// The cursor counts back from the newest command: `Some(0)` is the most
/// recent one, `None` means the user is not browsing.
#[derive(Clone, Debug, Default)]
pub(crate) struct InputRecall {
    commands: Vec<String>,
    cursor: Option<usize>,
}

impl InputRecall {
    pub(crate) fn push(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
        self.cursor = None;
    }

    /// Steps back in time. Stays on the oldest command once reached.
    pub(crate) fn up(&mut self) -> Option<&str> {
        let last = self.commands.len().checked_sub(1)?;
        let next = match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(last),
        };
        self.cursor = Some(next);
        self.commands.get(last - next).map(String::as_str)
    }

    /// Steps forward. Leaving the newest command ends browsing and yields `None`,
    /// which the prompt treats as "clear the input".
    pub(crate) fn down(&mut self) -> Option<&str> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                let last = self.commands.len() - 1;
                self.commands.get(last - (i - 1)).map(String::as_str)
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.cursor = None;
    }

    /// `-1` when not browsing, otherwise steps back from the newest command.
    pub(crate) fn index(&self) -> isize {
        self.cursor.map(|i| i as isize).unwrap_or(-1)
    }

    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }
}
