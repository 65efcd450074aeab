//! Time-indexed pose history for latency-compensated corrections.

use std::collections::VecDeque;

use crate::core::{Pose2D, Timestamped};

/// Poses recorded once per tick, oldest first, trimmed to a fixed window.
#[derive(Debug, Clone)]
pub struct PoseHistory {
    entries: VecDeque<Timestamped<Pose2D>>,
    window_us: u64,
}

impl PoseHistory {
    pub fn new(window_s: f64) -> Self {
        Self {
            entries: VecDeque::new(),
            window_us: (window_s.max(0.0) * 1_000_000.0) as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a pose. Entries must arrive in time order; an entry at the
    /// same timestamp as the newest replaces it.
    pub fn push(&mut self, pose: Pose2D, timestamp_us: u64) {
        if let Some(last) = self.entries.back_mut()
            && last.timestamp_us >= timestamp_us
        {
            last.data = pose;
            return;
        }
        self.entries.push_back(Timestamped::new(pose, timestamp_us));

        let cutoff_us = timestamp_us.saturating_sub(self.window_us);
        while self.entries.front().is_some_and(|e| e.timestamp_us < cutoff_us) {
            self.entries.pop_front();
        }
    }

    /// Pose at `timestamp_us`, interpolated between neighbours.
    ///
    /// Times after the newest entry return the newest pose. Times before
    /// the oldest entry return `None`.
    pub fn sample(&self, timestamp_us: u64) -> Option<Pose2D> {
        let first = self.entries.front()?;
        if timestamp_us < first.timestamp_us {
            return None;
        }
        let idx = self.entries.partition_point(|e| e.timestamp_us <= timestamp_us);
        if idx >= self.entries.len() {
            return self.entries.back().map(|e| e.data);
        }
        let after = &self.entries[idx];
        let before = &self.entries[idx - 1];
        Pose2D::interpolate(before, after, timestamp_us)
    }

    /// Apply `f` to every entry at or after `timestamp_us`.
    pub fn rewrite_from(&mut self, timestamp_us: u64, mut f: impl FnMut(&Pose2D) -> Pose2D) {
        for entry in self.entries.iter_mut().filter(|e| e.timestamp_us >= timestamp_us) {
            entry.data = f(&entry.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_interpolates() {
        let mut h = PoseHistory::new(1.5);
        h.push(Pose2D::new(0.0, 0.0, 0.0), 0);
        h.push(Pose2D::new(1.0, 0.0, 0.0), 20_000);
        let p = h.sample(5_000).unwrap();
        assert_relative_eq!(p.x, 0.25);
    }

    #[test]
    fn test_sample_bounds() {
        let mut h = PoseHistory::new(1.5);
        assert!(h.sample(0).is_none());
        h.push(Pose2D::new(1.0, 0.0, 0.0), 10_000);
        h.push(Pose2D::new(2.0, 0.0, 0.0), 20_000);
        assert!(h.sample(5_000).is_none());
        assert_relative_eq!(h.sample(10_000).unwrap().x, 1.0);
        assert_relative_eq!(h.sample(90_000).unwrap().x, 2.0);
    }

    #[test]
    fn test_window_trims_old_entries() {
        let mut h = PoseHistory::new(0.1);
        for i in 0..20u64 {
            h.push(Pose2D::new(i as f64, 0.0, 0.0), i * 20_000);
        }
        // Newest at 380 ms, cutoff at 280 ms
        assert_eq!(h.len(), 6);
        assert!(h.sample(200_000).is_none());
    }

    #[test]
    fn test_same_timestamp_replaces() {
        let mut h = PoseHistory::new(1.0);
        h.push(Pose2D::new(1.0, 0.0, 0.0), 1_000);
        h.push(Pose2D::new(3.0, 0.0, 0.0), 1_000);
        assert_eq!(h.len(), 1);
        assert_relative_eq!(h.sample(1_000).unwrap().x, 3.0);
    }

    #[test]
    fn test_rewrite_from() {
        let mut h = PoseHistory::new(1.0);
        h.push(Pose2D::new(0.0, 0.0, 0.0), 0);
        h.push(Pose2D::new(1.0, 0.0, 0.0), 20_000);
        h.push(Pose2D::new(2.0, 0.0, 0.0), 40_000);
        h.rewrite_from(20_000, |p| Pose2D::new(p.x, p.y + 1.0, p.theta));
        assert_relative_eq!(h.sample(0).unwrap().y, 0.0);
        assert_relative_eq!(h.sample(20_000).unwrap().y, 1.0);
        assert_relative_eq!(h.sample(40_000).unwrap().y, 1.0);
    }
}
