use crate::TagError;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    End,
    Byte,
    Int,
    String,
    List,
    Compound,
}

impl TagKind {
    pub fn id(self) -> u8 {
        match self {
            TagKind::End => 0,
            TagKind::Byte => 1,
            TagKind::Int => 3,
            TagKind::String => 8,
            TagKind::List => 9,
            TagKind::Compound => 10,
        }
    }

    pub fn from_id(id: u8) -> Option<TagKind> {
        match id {
            0 => Some(TagKind::End),
            1 => Some(TagKind::Byte),
            3 => Some(TagKind::Int),
            8 => Some(TagKind::String),
            9 => Some(TagKind::List),
            10 => Some(TagKind::Compound),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagKind::End => "End",
            TagKind::Byte => "Byte",
            TagKind::Int => "Int",
            TagKind::String => "String",
            TagKind::List => "List",
            TagKind::Compound => "Compound",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Int(i32),
    String(String),
    List(TagList),
    Compound(Compound),
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Int(_) => TagKind::Int,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TagList> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn into_compound(self) -> Option<Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}

impl From<i8> for Tag {
    fn from(value: i8) -> Self {
        Tag::Byte(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::Int(value)
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_owned())
    }
}

impl From<TagList> for Tag {
    fn from(value: TagList) -> Self {
        Tag::List(value)
    }
}

impl From<Compound> for Tag {
    fn from(value: Compound) -> Self {
        Tag::Compound(value)
    }
}

/// Homogeneous list. The element kind is fixed at construction and written once
/// in the list header, so an empty list still remembers what it would hold.
#[derive(Debug, Clone, PartialEq)]
pub struct TagList {
    kind: TagKind,
    items: Vec<Tag>,
}

impl TagList {
    pub fn new(kind: TagKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn from_items(kind: TagKind, items: Vec<Tag>) -> Result<Self, TagError> {
        let mut list = TagList::new(kind);
        list.items.reserve(items.len());
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    pub fn of_compounds(items: Vec<Compound>) -> Self {
        Self {
            kind: TagKind::Compound,
            items: items.into_iter().map(Tag::Compound).collect(),
        }
    }

    pub fn of_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: TagKind::String,
            items: items.into_iter().map(|s| Tag::String(s.into())).collect(),
        }
    }

    pub fn of_ints(items: &[i32]) -> Self {
        Self {
            kind: TagKind::Int,
            items: items.iter().copied().map(Tag::Int).collect(),
        }
    }

    pub fn push(&mut self, tag: Tag) -> Result<(), TagError> {
        if tag.kind() != self.kind {
            return Err(TagError::Encoding(format!(
                "cannot add {} to a list of {}",
                tag.kind(),
                self.kind
            )));
        }
        self.items.push(tag);
        Ok(())
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.items.iter().filter_map(Tag::as_compound)
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Named children with unique keys. Entries keep the order they were first
/// inserted in; equality ignores that order.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
    // Position of each key in `entries`.
    index: HashMap<String, usize>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        let name = name.into();
        let tag = tag.into();
        match self.index.get(&name) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, tag)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, tag));
                None
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        self.insert(name, tag);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let position = self.index.remove(name)?;
        let (_, tag) = self.entries.remove(position);
        for (key, _) in &self.entries[position..] {
            if let Some(slot) = self.index.get_mut(key) {
                *slot -= 1;
            }
        }
        Some(tag)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_byte(&self, name: &str) -> Option<i8> {
        self.get(name).and_then(Tag::as_i8)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Tag::as_i32)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Tag::as_str)
    }

    pub fn get_list(&self, name: &str) -> Option<&TagList> {
        self.get(name).and_then(Tag::as_list)
    }

    pub fn get_compound(&self, name: &str) -> Option<&Compound> {
        self.get(name).and_then(Tag::as_compound)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, tag)| other.get(key) == Some(tag))
    }
}
