//! Breadcrumb trail of reported rover positions for the minimap.

use std::collections::VecDeque;

use glam::DVec3;

/// Maximum number of breadcrumbs kept.
pub const BREADCRUMB_LIMIT: usize = 240;

#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<DVec3>,
    limit: usize,
    enabled: bool,
}

impl Trail {
    pub fn new() -> Self {
        Self::with_limit(BREADCRUMB_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(limit),
            limit,
            enabled: true,
        }
    }

    /// Appends a breadcrumb, dropping the oldest past the limit. Ignored
    /// while disabled.
    pub fn push(&mut self, position: DVec3) {
        if !self.enabled || self.limit == 0 {
            return;
        }
        if self.points.len() == self.limit {
            self.points.pop_front();
        }
        self.points.push_back(position);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling stops new breadcrumbs; existing ones are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn points(&self) -> impl Iterator<Item = &DVec3> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}
