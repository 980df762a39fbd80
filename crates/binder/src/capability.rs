//! Capability names, allow-lists and resolution.

use crate::{Error, Result, Variant};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// An identifier from the closed set of capabilities a binder variant knows.
///
/// Implemented for every small value type that can be compared, hashed and
/// printed; in practice a fieldless enum.
pub trait CapabilityName: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> CapabilityName for T where T: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static {}

/// A capability that binder variant `V` knows how to resolve.
///
/// Each capability is its own type, so adding one never touches a central
/// dispatch table. The variant is only checked against the capabilities it
/// implements this trait for; whether a particular call may use one is
/// decided separately by that call's [`AllowList`].
pub trait Capability<V: Variant>: 'static {
    /// Name checked against the allow-list before resolution.
    const NAME: V::Name;

    /// Handle to the concrete implementation, usually an `Arc<dyn Trait>`.
    ///
    /// Cloning must be cheap and must yield the same implementation.
    type Output: Clone + Send + Sync + 'static;

    /// Produce the implementation backing this capability for the current call.
    fn resolve(variant: &mut V) -> Result<Self::Output>;
}

/// The fixed, non-empty set of capability names one declaration may access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList<N> {
    names: Box<[N]>,
}

impl<N: CapabilityName> AllowList<N> {
    /// Build an allow-list from one or more names; duplicates collapse.
    pub fn new(names: impl IntoIterator<Item = N>) -> Result<Self> {
        let mut unique = Vec::new();
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        if unique.is_empty() {
            return Err(Error::EmptyAllowList);
        }
        Ok(Self {
            names: unique.into_boxed_slice(),
        })
    }

    /// Check whether `name` is granted.
    pub fn contains(&self, name: &N) -> bool {
        self.names.contains(name)
    }

    /// Iterate over the granted names in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = N> + '_ {
        self.names.iter().copied()
    }
}

impl<N: CapabilityName> Display for AllowList<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Name {
        Author,
        Article,
        Comment,
    }

    impl Display for Name {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Name::Author => "author",
                Name::Article => "article",
                Name::Comment => "comment",
            })
        }
    }

    #[test]
    fn test_contains_only_declared_names() {
        let allowed = AllowList::new([Name::Author, Name::Article]).unwrap();
        assert!(allowed.contains(&Name::Author));
        assert!(allowed.contains(&Name::Article));
        assert!(!allowed.contains(&Name::Comment));
    }

    #[test]
    fn test_duplicates_collapse() {
        let allowed = AllowList::new([Name::Article, Name::Article, Name::Author]).unwrap();
        assert_eq!(allowed.iter().collect::<Vec<_>>(), [Name::Article, Name::Author]);
    }

    #[test]
    fn test_empty_allow_list_is_rejected() {
        assert!(matches!(
            AllowList::<Name>::new([]),
            Err(Error::EmptyAllowList)
        ));
    }

    #[test]
    fn test_display() {
        let allowed = AllowList::new([Name::Article, Name::Author]).unwrap();
        assert_eq!(allowed.to_string(), "[article, author]");
    }
}
