use smol_str::SmolStr;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Key of an entry in a [`ContextMap`].
///
/// A key is either a name, created from any string type,
/// or a typed key created using [`Key::typed`]. Names and typed keys
/// never compare equal, and two typed keys are only equal when
/// they are of the same type and hold equal values:
///
/// ```
/// use bodyctx_http::context::Key;
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// enum UserKey {
///     Id,
/// }
///
/// assert_eq!(Key::from("id"), Key::from(String::from("id")));
/// assert_ne!(Key::from("id"), Key::typed("id"));
/// assert_eq!(Key::typed(UserKey::Id), Key::typed(UserKey::Id));
/// ```
///
/// [`ContextMap`]: super::ContextMap
#[derive(Clone)]
pub struct Key(KeyKind);

#[derive(Clone)]
enum KeyKind {
    Name(SmolStr),
    Typed(Arc<dyn DynKey>),
}

trait DynKey: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> DynKey for T
where
    T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn dyn_fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Key {
    /// Create a named [`Key`].
    pub fn name(name: impl Into<SmolStr>) -> Self {
        Self(KeyKind::Name(name.into()))
    }

    /// Create a typed [`Key`], commonly a unit struct or enum variant
    /// private to the module which owns the entry.
    pub fn typed<T>(key: T) -> Self
    where
        T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Self(KeyKind::Typed(Arc::new(key)))
    }

    /// Get the name of this [`Key`], if it is a named one.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match &self.0 {
            KeyKind::Name(name) => Some(name.as_str()),
            KeyKind::Typed(_) => None,
        }
    }

    /// Get the value of this typed [`Key`], if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match &self.0 {
            KeyKind::Name(_) => None,
            KeyKind::Typed(key) => key.as_any().downcast_ref(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (KeyKind::Name(a), KeyKind::Name(b)) => a == b,
            (KeyKind::Typed(a), KeyKind::Typed(b)) => a.dyn_eq(b.as_ref()),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            KeyKind::Name(name) => {
                0u8.hash(state);
                name.hash(state);
            }
            KeyKind::Typed(key) => {
                1u8.hash(state);
                key.dyn_hash(state);
            }
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            KeyKind::Name(name) => fmt::Debug::fmt(name, f),
            KeyKind::Typed(key) => key.dyn_fmt(f),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::name(name)
    }
}

impl From<SmolStr> for Key {
    fn from(name: SmolStr) -> Self {
        Self::name(name)
    }
}

impl From<&Self> for Key {
    fn from(key: &Self) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::HashSet;

    #[derive(Debug, PartialEq, Eq, Hash)]
    enum First {
        A,
        B,
    }

    #[derive(Debug, PartialEq, Eq, Hash)]
    enum Second {
        A,
    }

    #[test]
    fn test_names_are_equal_regardless_of_string_type() {
        assert_eq!(Key::from("a"), Key::from(String::from("a")));
        assert_eq!(Key::from("a"), Key::from(SmolStr::new_static("a")));
        assert_ne!(Key::from("a"), Key::from("b"));
    }

    #[test]
    fn test_typed_keys_do_not_collide() {
        assert_eq!(Key::typed(First::A), Key::typed(First::A));
        assert_ne!(Key::typed(First::A), Key::typed(First::B));
        assert_ne!(Key::typed(First::A), Key::typed(Second::A));
        assert_ne!(Key::typed("a"), Key::from("a"));
        assert_ne!(Key::typed(0u8), Key::typed(0u16));
    }

    #[test]
    fn test_keys_hash_consistently() {
        let mut set = HashSet::default();
        assert!(set.insert(Key::from("a")));
        assert!(set.insert(Key::typed(First::A)));
        assert!(set.insert(Key::typed(Second::A)));
        assert!(set.insert(Key::typed("a")));
        assert!(!set.insert(Key::from(String::from("a"))));
        assert!(!set.insert(Key::typed(First::A)));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_key_accessors() {
        assert_eq!(Key::from("a").as_name(), Some("a"));
        assert_eq!(Key::typed(First::B).as_name(), None);
        assert_eq!(Key::typed(First::B).downcast_ref::<First>(), Some(&First::B));
        assert_eq!(Key::from("a").downcast_ref::<First>(), None);
    }

    #[test]
    fn test_key_debug() {
        assert_eq!(format!("{:?}", Key::from("a")), "\"a\"");
        assert_eq!(format!("{:?}", Key::typed(First::A)), "A");
    }
}
