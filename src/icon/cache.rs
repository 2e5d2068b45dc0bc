use super::{IconSource, RepresentationSet};
use crate::badge::BadgeValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderVariant {
    /// Main icon with the badge drawn into it.
    Composite,
    /// Main icon without a badge.
    Plain,
    /// Standalone badge icon.
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: Option<IconSource>,
    pub badge: BadgeValue,
    pub variant: RenderVariant,
}

impl CacheKey {
    pub fn composite(source: &IconSource, badge: BadgeValue) -> Self {
        Self {
            source: Some(source.clone()),
            badge,
            variant: RenderVariant::Composite,
        }
    }

    pub fn plain(source: &IconSource) -> Self {
        Self {
            source: Some(source.clone()),
            badge: BadgeValue::None,
            variant: RenderVariant::Plain,
        }
    }

    pub fn overlay(badge: BadgeValue) -> Self {
        Self {
            source: None,
            badge,
            variant: RenderVariant::Overlay,
        }
    }
}

/// Process-wide, append-only store of composed icons. Cloning shares the store.
#[derive(Clone, Default)]
pub struct RepresentationCache {
    entries: Arc<Mutex<HashMap<CacheKey, Arc<RepresentationSet>>>>,
}

impl RepresentationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<RepresentationSet>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores `set` unless another window got there first; returns the stored entry.
    pub fn insert(&self, key: CacheKey, set: RepresentationSet) -> Arc<RepresentationSet> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| Arc::new(set))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
