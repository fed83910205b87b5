use crate::error::{CarouselError, Result};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Position of an album in the circular catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, Deref, From, Into,
)]
pub struct CatalogIndex(usize);

impl CatalogIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Steps `delta` places around a catalog of `len` albums, wrapping at both ends.
    pub fn offset(self, delta: i64, len: usize) -> Self {
        debug_assert!(len > 0, "offset on an empty catalog");
        let len = len as i64;
        Self((self.0 as i64 % len + delta % len).rem_euclid(len) as usize)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
)]
#[serde(transparent)]
pub struct AlbumId(u32);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct DisplayKey(String);

crate::impl_string_newtype!(DisplayKey);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: AlbumId,
    pub display_key: DisplayKey,
}

/// Ordered, non-empty album list. Stable for the lifetime of a carousel.
#[derive(Debug, Clone)]
pub struct Catalog {
    albums: Vec<Album>,
}

impl Catalog {
    pub fn new(albums: Vec<Album>) -> Result<Self> {
        if albums.is_empty() {
            return Err(CarouselError::InvalidCatalog);
        }
        Ok(Self { albums })
    }

    /// Builds a catalog from display keys, numbering albums from 1 in ring order.
    pub fn from_keys(keys: impl IntoIterator<Item = DisplayKey>) -> Result<Self> {
        let albums = keys
            .into_iter()
            .zip(1u32..)
            .map(|(display_key, id)| Album {
                id: AlbumId::from(id),
                display_key,
            })
            .collect();
        Self::new(albums)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn get(&self, index: CatalogIndex) -> &Album {
        &self.albums[index.get() % self.albums.len()]
    }

    pub fn position(&self, id: AlbumId) -> Option<CatalogIndex> {
        self.albums
            .iter()
            .position(|a| a.id == id)
            .map(CatalogIndex::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Album> {
        self.albums.iter()
    }
}
