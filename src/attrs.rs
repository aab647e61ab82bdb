//! Attribute values and the shared attribute cell used by edges.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A single attribute value
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    /// Integer value
    Int(i64),
    /// Floating point value, compared bitwise
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    Str(String),
}

impl AttrValue {
    /// Integer content, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric content widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce a raw text field: integer, then float, then boolean, else string
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            return AttrValue::Int(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            return AttrValue::Float(v);
        }
        match raw {
            "true" | "True" => AttrValue::Bool(true),
            "false" | "False" => AttrValue::Bool(false),
            _ => AttrValue::Str(raw.to_string()),
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl Hash for AttrValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            AttrValue::Int(v) => v.hash(state),
            AttrValue::Float(v) => v.to_bits().hash(state),
            AttrValue::Bool(v) => v.hash(state),
            AttrValue::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

/// Attribute mapping, ordered by key so hashing is deterministic
pub type Attrs = BTreeMap<String, AttrValue>;

/// Build an [`Attrs`] map from key/value pairs.
///
/// ```
/// use intervalgraph::attrs::attrs;
/// let a = attrs([("weight", 3.into()), ("kind", "call".into())]);
/// assert_eq!(a.len(), 2);
/// ```
pub fn attrs<'a, I>(pairs: I) -> Attrs
where
    I: IntoIterator<Item = (&'a str, AttrValue)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// One attribute map referenced from several places.
///
/// Cloning the handle does not copy the map: every clone observes every
/// mutation. An edge's attributes live in exactly one cell that both
/// adjacency directions and the interval index point at.
#[derive(Clone, Default)]
pub struct SharedAttrs(Rc<RefCell<Attrs>>);

impl SharedAttrs {
    /// Wrap an attribute map in a new cell
    pub fn new(attrs: Attrs) -> Self {
        Self(Rc::new(RefCell::new(attrs)))
    }

    /// Merge `attrs` key by key, last write wins
    pub fn merge(&self, attrs: Attrs) {
        self.0.borrow_mut().extend(attrs);
    }

    /// Set a single attribute
    pub fn set(&self, key: &str, value: impl Into<AttrValue>) {
        self.0.borrow_mut().insert(key.to_string(), value.into());
    }

    /// Look up a single attribute
    pub fn get(&self, key: &str) -> Option<AttrValue> {
        self.0.borrow().get(key).cloned()
    }

    /// Borrow the underlying map
    pub fn borrow(&self) -> Ref<'_, Attrs> {
        self.0.borrow()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Attrs {
        self.0.borrow().clone()
    }

    /// Whether two handles point at the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedAttrs").field(&*self.0.borrow()).finish()
    }
}
