//! Domain types for the catalog with strong typing.
//!
//! Identifier newtypes keep artist, work and media ids from being mixed up
//! when they cross the service boundary, and [`Page`] carries one slice of a
//! paginated listing together with its totals.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for an Artist.
    ArtistId
);

entity_id!(
    /// Unique identifier for a Work.
    WorkId
);

entity_id!(
    /// Unique identifier for a stored Media attachment.
    MediaId
);

/// A 1-based page number. Anything below 1 collapses to the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(u64);

impl PageNumber {
    #[must_use]
    pub const fn new(page: u64) -> Self {
        if page == 0 { Self(1) } else { Self(page) }
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Zero-based index as used by the database paginator.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.0 - 1
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self(1)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, current_page: PageNumber, per_page: u64) -> Self {
        Self {
            items,
            total,
            current_page: current_page.value(),
            per_page,
        }
    }

    /// Number of the last page; an empty listing still has page 1.
    #[must_use]
    pub const fn last_page(&self) -> u64 {
        if self.per_page == 0 || self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// 1-based position of the first item on this page, if any.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.current_page - 1) * self.per_page + 1)
        }
    }

    /// 1-based position of the last item on this page, if any.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.from().map(|from| from + self.items.len() as u64 - 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_id_conversions() {
        let id = ArtistId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(ArtistId::from(42), id);
    }

    #[test]
    fn work_id_serialization() {
        let id = WorkId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let deserialized: WorkId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn page_number_clamps_to_first_page() {
        assert_eq!(PageNumber::new(0).value(), 1);
        assert_eq!(PageNumber::new(0).index(), 0);
        assert_eq!(PageNumber::new(3).index(), 2);
    }

    #[test]
    fn page_totals_for_thirty_five_items() {
        let first = Page::new((1..=30).collect::<Vec<u64>>(), 35, PageNumber::new(1), 30);
        assert_eq!(first.last_page(), 2);
        assert_eq!(first.from(), Some(1));
        assert_eq!(first.to(), Some(30));

        let second = Page::new((31..=35).collect::<Vec<u64>>(), 35, PageNumber::new(2), 30);
        assert_eq!(second.last_page(), 2);
        assert_eq!(second.from(), Some(31));
        assert_eq!(second.to(), Some(35));
    }

    #[test]
    fn empty_page_has_single_last_page() {
        let page: Page<u64> = Page::new(vec![], 0, PageNumber::default(), 30);
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.from(), None);
        assert_eq!(page.to(), None);
    }
}
