//! Field paths for addressing within form data
//!
//! Provides [`FieldPath`] for hierarchical addressing of leaves inside records,
//! nested records and lists of records.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Named field of a record
    Key(String),
    /// Position inside a list
    Index(usize),
}

impl Segment {
    /// Key name, if this is a key segment
    #[inline]
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    /// List position, if this is an index segment
    #[inline]
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Key(_) => None,
            Segment::Index(index) => Some(*index),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Path to a leaf within form data
///
/// Used both to address values and to key validation errors.
///
/// # Examples
/// - `["name"]` → `name`
/// - `["times", 0, "start"]` → `times.0.start`
///
/// Key segments made only of digits cannot round-trip through the textual
/// form; they parse back as index segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Empty path (the record itself)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path made of a single key
    #[inline]
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![Segment::Key(key.into())])
    }

    /// Path made of a single index
    #[inline]
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self(vec![Segment::Index(index)])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get first segment (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Segment> {
        self.0.first()
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Split off the first segment
    #[inline]
    #[must_use]
    pub fn split_first(&self) -> Option<(&Segment, FieldPath)> {
        self.0
            .split_first()
            .map(|(head, rest)| (head, Self(rest.to_vec())))
    }

    /// Append a key segment, returning new path
    #[inline]
    #[must_use]
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(Segment::Key(key.into()));
        new
    }

    /// Append an index segment, returning new path
    #[inline]
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(Segment::Index(index));
        new
    }

    /// Concatenate two paths
    #[inline]
    #[must_use]
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut new = self.clone();
        new.0.extend(other.0.iter().cloned());
        new
    }

    /// Check if this path is a prefix of another
    ///
    /// # Examples
    /// - `times.0` is prefix of `times.0.start`
    /// - `times.0` is NOT prefix of `times.1.start`
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is an ancestor of another (strict prefix)
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Get relative path from ancestor
    ///
    /// # Errors
    /// Returns error if `self` is not a descendant of `ancestor`
    pub fn relative_to(&self, ancestor: &Self) -> Result<Self, PathError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(Self(self.0[ancestor.0.len()..].to_vec()))
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.0.iter()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else if seg.bytes().all(|b| b.is_ascii_digit()) {
                    seg.parse::<usize>()
                        .map(Segment::Index)
                        .map_err(|_| PathError::InvalidSegment(seg.to_string()))
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(Segment::Key(seg.to_string()))
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Errors related to field paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric, underscore or an index)")]
    InvalidSegment(String),

    /// Not a descendant path
    #[error("path '{path}' is not a descendant of '{ancestor}'")]
    NotDescendant { path: String, ancestor: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn path_new_and_segments() {
        let path = FieldPath::new(vec![Segment::from("times"), Segment::from(2)]);
        assert_eq!(path.segments(), &[Segment::Key("times".into()), Segment::Index(2)]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn path_root() {
        let path = FieldPath::root();
        assert!(path.is_empty());
        assert!(path.parent().is_none());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn path_children() {
        let path = FieldPath::key("times").child_index(1).child_key("end");
        assert_eq!(path.to_string(), "times.1.end");
        assert_eq!(path.first(), Some(&Segment::Key("times".into())));
        assert_eq!(path.last(), Some(&Segment::Key("end".into())));
        assert_eq!(path.parent().unwrap().to_string(), "times.1");
    }

    #[test]
    fn path_join() {
        let joined = p("produce.3").join(&p("fruitName"));
        assert_eq!(joined, p("produce.3.fruitName"));
        assert_eq!(FieldPath::root().join(&p("a")), p("a"));
    }

    #[test]
    fn path_split_first() {
        let path = p("times.0.start");
        let (head, rest) = path.split_first().unwrap();
        assert_eq!(head.as_key(), Some("times"));
        assert_eq!(rest, p("0.start"));
        assert_eq!(rest.first().and_then(Segment::as_index), Some(0));
    }

    #[test]
    fn path_prefixes() {
        let list = p("times");
        let leaf = p("times.0.start");
        assert!(list.is_prefix_of(&leaf));
        assert!(list.is_ancestor_of(&leaf));
        assert!(list.is_prefix_of(&list));
        assert!(!list.is_ancestor_of(&list));
        assert!(!p("times.1").is_prefix_of(&leaf));
    }

    #[test]
    fn path_relative_to() {
        let relative = p("times.4.dinner").relative_to(&p("times.4")).unwrap();
        assert_eq!(relative, p("dinner"));

        let result = p("name").relative_to(&p("times"));
        assert!(matches!(result, Err(PathError::NotDescendant { .. })));
    }

    #[test]
    fn path_from_str_indices() {
        let path = p("times.10.start");
        assert_eq!(path.segments()[1], Segment::Index(10));
    }

    #[test]
    fn path_from_str_errors() {
        assert!(matches!("a..b".parse::<FieldPath>(), Err(PathError::EmptySegment)));
        assert!(matches!(
            "a.b-c".parse::<FieldPath>(),
            Err(PathError::InvalidSegment(_))
        ));
        assert!(matches!(
            "a.99999999999999999999999".parse::<FieldPath>(),
            Err(PathError::InvalidSegment(_))
        ));
    }

    #[test]
    fn path_ordering_groups_by_prefix() {
        let mut paths = vec![p("times.1.start"), p("name"), p("times.0.start"), p("times.0.end")];
        paths.sort();
        assert_eq!(
            paths.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["name", "times.0.end", "times.0.start", "times.1.start"]
        );
    }

    #[test]
    fn path_serde_as_string() {
        let json = serde_json::to_string(&p("times.0.start")).unwrap();
        assert_eq!(json, "\"times.0.start\"");
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p("times.0.start"));
        assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = Segment> {
            prop_oneof![
                "[a-zA-Z_][a-zA-Z0-9_]{0,8}".prop_map(Segment::Key),
                (0usize..1000).prop_map(Segment::Index),
            ]
        }

        proptest! {
            #[test]
            fn display_then_parse_is_identity(segments in prop::collection::vec(segment(), 0..6)) {
                let path = FieldPath::new(segments);
                let parsed: FieldPath = path.to_string().parse().unwrap();
                prop_assert_eq!(parsed, path);
            }
        }
    }
}
