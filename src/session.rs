use crate::ast::ConstructId;

/// Per-compilation counters.
///
/// A session is threaded through the parser and the emitter. Two
/// compilations that must not share label or text numbering must use two
/// sessions; compilations whose outputs will be concatenated should share
/// one, so that every generated name stays unique across all of them.
#[derive(Debug, Default)]
pub struct Session {
    constructs: u32,
    texts: u32,
    labels: u32,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// Allocates the identifier of a new loop or switch.
    pub fn next_construct(&mut self) -> ConstructId {
        let id = ConstructId(self.constructs);
        self.constructs += 1;
        id
    }

    /// Allocates the label of a new implicit text. The first one is `Text_0`.
    pub fn next_text_label(&mut self) -> Box<str> {
        let label = format!("Text_{}", self.texts);
        self.texts += 1;
        label.into_boxed_str()
    }

    /// Allocates the suffix of a new generated label. The first one is `1`.
    pub fn next_label_index(&mut self) -> u32 {
        self.labels += 1;
        self.labels
    }
}
