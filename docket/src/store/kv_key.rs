use crate::common::{num_cmp_float, Value};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// One element of a [KvKey] tuple.
///
/// Parts of different kinds order as `Bytes < String < Integer < Number < Bool`;
/// parts of the same kind use their natural order. Numbers are normalised on
/// construction (`-0.0` becomes `0.0`, every NaN the canonical NaN) so that
/// equal values always produce equal keys.
#[derive(Debug, Clone)]
pub enum KeyPart {
    Bytes(Vec<u8>),
    String(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl KeyPart {
    /// Creates a number part in canonical form.
    pub fn number(value: f64) -> KeyPart {
        if value.is_nan() {
            KeyPart::Number(f64::NAN)
        } else if value == 0.0 {
            KeyPart::Number(0.0)
        } else {
            KeyPart::Number(value)
        }
    }

    /// Converts an indexable value into a key part; `None` for other kinds.
    pub fn from_value(value: &Value) -> Option<KeyPart> {
        match value {
            Value::String(s) => Some(KeyPart::String(s.clone())),
            Value::Integer(i) => Some(KeyPart::Integer(*i)),
            Value::Number(n) => Some(KeyPart::number(*n)),
            Value::Bool(b) => Some(KeyPart::Bool(*b)),
            Value::Bytes(b) => Some(KeyPart::Bytes(b.clone())),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            KeyPart::Bytes(_) => 0,
            KeyPart::String(_) => 1,
            KeyPart::Integer(_) => 2,
            KeyPart::Number(_) => 3,
            KeyPart::Bool(_) => 4,
        }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Bytes(a), KeyPart::Bytes(b)) => a.cmp(b),
            (KeyPart::String(a), KeyPart::String(b)) => a.cmp(b),
            (KeyPart::Integer(a), KeyPart::Integer(b)) => a.cmp(b),
            (KeyPart::Number(a), KeyPart::Number(b)) => num_cmp_float(*a, *b),
            (KeyPart::Bool(a), KeyPart::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Display for KeyPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Bytes(b) => write!(f, "{:?}", b),
            KeyPart::String(s) => write!(f, "{:?}", s),
            KeyPart::Integer(i) => write!(f, "{}n", i),
            KeyPart::Number(n) => write!(f, "{}", n),
            KeyPart::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::String(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::String(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Integer(value)
    }
}

impl From<f64> for KeyPart {
    fn from(value: f64) -> Self {
        KeyPart::number(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

type PartVec = SmallVec<[KeyPart; 4]>;

/// A key of the ordered key-value substrate: a tuple of [KeyPart]s compared part
/// by part. A key sorts directly before every key it is a strict prefix of.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct KvKey {
    parts: PartVec,
}

impl KvKey {
    pub fn new() -> Self {
        KvKey {
            parts: PartVec::new(),
        }
    }

    /// Appends a part, returning the extended key.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn push(&mut self, part: impl Into<KeyPart>) {
        self.parts.push(part.into());
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether `prefix` is a strict prefix of this key.
    pub fn has_prefix(&self, prefix: &KvKey) -> bool {
        self.parts.len() > prefix.parts.len() && self.parts.starts_with(&prefix.parts)
    }
}

impl Display for KvKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, "]")
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for KvKey {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        KvKey {
            parts: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Builds a [KvKey] from a list of part expressions.
#[macro_export]
macro_rules! kv_key {
    ($($part:expr),* $(,)?) => {
        $crate::store::KvKey::new()$(.with($part))*
    };
}
