//! Core identity and addressing types.
//!
//! A CRDT node is addressed by a [`Location`]: the opaque identity of the root
//! datatype plus a [`Path`] of `(kind, name)` segments leading to the child.

use std::fmt;

/// The five datatype kinds a handle can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Counter,
    Set,
    Register,
    Flag,
    Map,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Counter => "counter",
            Kind::Set => "set",
            Kind::Register => "register",
            Kind::Flag => "flag",
            Kind::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a root datatype. Opaque to the core; only the backend
/// interprets bucket, key and bucket type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootId {
    pub bucket: String,
    pub key: String,
    pub bucket_type: String,
}

impl RootId {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        bucket_type: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            bucket_type: bucket_type.into(),
        }
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bucket_type, self.bucket, self.key)
    }
}

/// One child within a map, relative to its parent.
///
/// Ordered by kind first, so `counters["x"]` and `sets["x"]` are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    pub kind: Kind,
    pub name: String,
}

impl Segment {
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.kind)
    }
}

/// Ordered sequence of segments from the root. Empty denotes the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Extended copy of this path addressing a child.
    pub fn child(&self, kind: Kind, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::new(kind, name));
        Path(segments)
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Root identity plus path: the full address of a logical CRDT node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub root: RootId,
    pub path: Path,
}

/// Opaque token returned by a root fetch; accompanies the next submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CausalContext(pub Vec<u8>);

impl CausalContext {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    /// Context the backend reports after applying the update, if any.
    /// Handles never reuse it; the next read re-fetches.
    pub context: Option<CausalContext>,
}
