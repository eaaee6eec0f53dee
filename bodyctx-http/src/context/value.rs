use crate::body::try_downcast;
use bodyctx_core::bytes::Bytes;
use smol_str::SmolStr;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Value of an entry in a [`ContextMap`].
///
/// A value is either [`Value::NULL`] or a shared, type-erased value.
/// Cloning a [`Value`] shares the stored value, it is never copied.
///
/// ```
/// use bodyctx_http::context::Value;
///
/// let value = Value::from(13i32);
/// assert_eq!(value.downcast_ref::<i32>(), Some(&13));
/// assert_eq!(value.as_str(), None);
///
/// assert!(Value::NULL.is_null());
/// assert!(Value::from(None::<i32>).is_null());
/// ```
///
/// [`ContextMap`]: super::ContextMap
#[derive(Clone, Default)]
pub struct Value(Option<Stored>);

#[derive(Clone)]
struct Stored {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// The null [`Value`], also used to report the absence of a value.
    pub const NULL: Self = Self(None);

    /// Create a new [`Value`] storing the given value.
    ///
    /// A [`Value`] given as input is returned as-is.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        try_downcast::<Self, _>(value).unwrap_or_else(|value| Self::from_arc(Arc::new(value)))
    }

    /// Create a new [`Value`] sharing an existing [`Arc`].
    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self(Some(Stored {
            value,
            type_name: type_name::<T>(),
        }))
    }

    /// Returns true if this is [`Value::NULL`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Returns true if the stored value is of type `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_ref().is_some_and(|stored| stored.value.is::<T>())
    }

    /// Get a shared reference to the stored value, if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.value.downcast_ref()
    }

    /// Get a shared pointer to the stored value, if it is of type `T`.
    #[must_use]
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.as_ref()?.value.clone().downcast().ok()
    }

    /// Get the stored value as a string slice,
    /// if it is a [`String`], `&'static str` or [`SmolStr`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        let value = self.0.as_ref()?.value.as_ref();
        if let Some(s) = value.downcast_ref::<String>() {
            Some(s.as_str())
        } else if let Some(s) = value.downcast_ref::<&'static str>() {
            Some(s)
        } else {
            value.downcast_ref::<SmolStr>().map(SmolStr::as_str)
        }
    }

    /// The type name of the stored value, `None` for [`Value::NULL`].
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.0.as_ref().map(|stored| stored.type_name)
    }

    /// Returns true if both values share the same stored value,
    /// or are both [`Value::NULL`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a.value, &b.value),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.0, self.as_str()) {
            (None, _) => f.write_str("null"),
            (Some(_), Some(s)) => fmt::Debug::fmt(s, f),
            (Some(stored), None) => write!(f, "<{}>", stored.type_name),
        }
    }
}

macro_rules! value_from_impl {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::from_arc(Arc::new(value))
                }
            }
        )+
    };
}

value_from_impl!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
    SmolStr,
    Bytes,
);

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<T> From<Arc<T>> for Value
where
    T: Any + Send + Sync,
{
    fn from(value: Arc<T>) -> Self {
        Self::from_arc(value)
    }
}
