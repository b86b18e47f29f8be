//! Validated newtype wrappers for core history-DAG domain types.
//!
//! Bases, site positions and the reference sequence are validated at
//! construction time; once constructed the inner values are immutable, so
//! invalid data cannot enter the type system from untrusted input (including
//! JSON, whose `Deserialize` impls re-run validation).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing a validated newtype from invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewtypeError {
    /// The character is not one of `A`, `C`, `G`, `T`, `N`.
    InvalidBase {
        /// The character that was rejected.
        got: char,
    },
    /// A site position of zero was supplied; positions are 1-indexed.
    ZeroPosition,
}

impl fmt::Display for NewtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBase { got } => {
                write!(f, "invalid base: expected one of A, C, G, T, N, got {got:?}")
            }
            Self::ZeroPosition => {
                f.write_str("site positions are 1-indexed; 0 is not a valid position")
            }
        }
    }
}

impl std::error::Error for NewtypeError {}

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

/// A single nucleotide base.
///
/// `N` is the ambiguity code; it stands for "any nucleotide" and is treated
/// specially by the parsimony leaf-ambiguity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
    /// Ambiguity code: any nucleotide.
    N,
}

impl Base {
    /// Returns `true` for the ambiguity code `N`.
    pub fn is_ambiguous(self) -> bool {
        matches!(self, Self::N)
    }

    /// The base as its single-character representation.
    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::T => 'T',
            Self::N => 'N',
        }
    }
}

impl TryFrom<char> for Base {
    type Error = NewtypeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'A' => Ok(Self::A),
            'C' => Ok(Self::C),
            'G' => Ok(Self::G),
            'T' => Ok(Self::T),
            'N' => Ok(Self::N),
            other => Err(NewtypeError::InvalidBase { got: other }),
        }
    }
}

impl From<Base> for char {
    fn from(b: Base) -> Self {
        b.as_char()
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for Base {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for Base {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let c = char::deserialize(deserializer)?;
        Self::try_from(c).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// SitePosition
// ---------------------------------------------------------------------------

/// A 1-indexed position in the reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SitePosition(usize);

impl SitePosition {
    /// Creates a position, rejecting the invalid 0 value.
    pub fn new(value: usize) -> Result<Self, NewtypeError> {
        if value == 0 {
            return Err(NewtypeError::ZeroPosition);
        }
        Ok(Self(value))
    }

    /// The raw 1-indexed value.
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for SitePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for SitePosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = usize::deserialize(deserializer)?;
        Self::new(value).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ReferenceSequence
// ---------------------------------------------------------------------------

/// The shared reference sequence all compact genomes are diffed against.
///
/// Validated to contain only `A`, `C`, `G`, `T`, `N` characters. Positions
/// are 1-indexed, matching [`SitePosition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReferenceSequence(String);

impl ReferenceSequence {
    /// The base at a 1-indexed position, or `None` when out of range.
    pub fn base_at(&self, pos: SitePosition) -> Option<Base> {
        let byte = *self.0.as_bytes().get(pos.value() - 1)?;
        Base::try_from(byte as char).ok()
    }

    /// Sequence length in bases.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw sequence string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ReferenceSequence {
    type Error = NewtypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        for c in s.chars() {
            let _ = Base::try_from(c)?;
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReferenceSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s.as_str()).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Arena indices
// ---------------------------------------------------------------------------

/// Index of a node in a [`Dag`](crate::dag::Dag) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of an edge in a [`Dag`](crate::dag::Dag) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an edge in its parent node's clade list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CladeIdx(pub usize);

impl fmt::Display for CladeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SampleId
// ---------------------------------------------------------------------------

/// External sample identifier attached to a leaf node.
///
/// Cheaply clonable; equality and hashing are by string content, so sample
/// ids participate directly in node-label identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId(Arc<str>);

impl SampleId {
    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SampleId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SampleId {
    fn from(s: String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SampleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SampleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
