use crate::models::{Link, NodeId, NodeSeed};

/// Note metadata as supplied by the note store.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    pub id: NodeId,
    pub links_count: Option<u32>,
    pub access_count: u32,
    pub last_accessed: Option<i64>,
}

impl From<&NoteRecord> for NodeSeed {
    fn from(note: &NoteRecord) -> Self {
        NodeSeed {
            id: note.id.clone(),
            links_count: note.links_count,
            access_count: Some(note.access_count),
            last_accessed: note.last_accessed,
            ..Default::default()
        }
    }
}

/// Read-only supplier of notes and links, consulted once at load time.
pub trait EntitySource {
    fn notes(&self) -> Vec<NoteRecord>;
    fn links(&self) -> Vec<Link>;
}

/// An `EntitySource` backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub notes: Vec<NoteRecord>,
    pub links: Vec<Link>,
}

impl InMemorySource {
    pub fn new(notes: Vec<NoteRecord>, links: Vec<Link>) -> Self {
        InMemorySource { notes, links }
    }
}

impl EntitySource for InMemorySource {
    fn notes(&self) -> Vec<NoteRecord> {
        self.notes.clone()
    }

    fn links(&self) -> Vec<Link> {
        self.links.clone()
    }
}
