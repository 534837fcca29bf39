//! Paint chain
//!
//! Windows can be linked so that one is painted right after another,
//! regardless of stacking order. Links are stored as ids in both directions
//! and every walk validates that both ends agree, so a window vanishing
//! without an unlink only costs the broken link.

use crate::window::WindowId;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Links {
    draw_before: Option<WindowId>,
    draw_after: Option<WindowId>,
}

impl Links {
    fn is_empty(&self) -> bool {
        self.draw_before.is_none() && self.draw_after.is_none()
    }
}

/// Doubly linked paint order overrides keyed by window id
#[derive(Clone, Debug, Default)]
pub struct PaintChain {
    links: FxHashMap<WindowId, Links>,
}

impl PaintChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint `guest` immediately after `host`
    ///
    /// Existing links of either window on the touched side are replaced.
    pub fn link(&mut self, host: WindowId, guest: WindowId) {
        if host == guest {
            tracing::warn!("refusing to chain window {} to itself", host);
            return;
        }
        if let Some(old) = self.links.get(&host).and_then(|l| l.draw_after) {
            self.clear_before(old, host);
        }
        if let Some(old) = self.links.get(&guest).and_then(|l| l.draw_before) {
            self.clear_after(old, guest);
        }
        self.links.entry(host).or_default().draw_after = Some(guest);
        self.links.entry(guest).or_default().draw_before = Some(host);
    }

    /// Remove a window, joining its neighbors to each other
    pub fn unlink(&mut self, id: WindowId) {
        let Some(links) = self.links.remove(&id) else {
            return;
        };
        let before = links
            .draw_before
            .filter(|b| self.links.get(b).and_then(|l| l.draw_after) == Some(id));
        let after = links
            .draw_after
            .filter(|a| self.links.get(a).and_then(|l| l.draw_before) == Some(id));

        if let Some(b) = before {
            self.clear_after(b, id);
        }
        if let Some(a) = after {
            self.clear_before(a, id);
        }
        if let (Some(b), Some(a)) = (before, after) {
            self.links.entry(b).or_default().draw_after = Some(a);
            self.links.entry(a).or_default().draw_before = Some(b);
        }
    }

    /// Window painted right after `id`, if the link is consistent
    ///
    /// `is_live` reports whether a window still exists; links to dead or
    /// disagreeing windows are dropped.
    pub fn next(&mut self, id: WindowId, is_live: impl Fn(WindowId) -> bool) -> Option<WindowId> {
        let after = self.links.get(&id)?.draw_after?;
        let agrees = self.links.get(&after).and_then(|l| l.draw_before) == Some(id);
        if agrees && is_live(after) {
            return Some(after);
        }
        tracing::warn!("dropping inconsistent paint link {} -> {}", id, after);
        self.clear_after(id, after);
        if agrees {
            self.clear_before(after, id);
        }
        None
    }

    /// Window painted right before `id`, if the link is consistent
    pub fn prev(&mut self, id: WindowId, is_live: impl Fn(WindowId) -> bool) -> Option<WindowId> {
        let before = self.links.get(&id)?.draw_before?;
        let agrees = self.links.get(&before).and_then(|l| l.draw_after) == Some(id);
        if agrees && is_live(before) {
            return Some(before);
        }
        tracing::warn!("dropping inconsistent paint link {} <- {}", id, before);
        self.clear_before(id, before);
        if agrees {
            self.clear_after(before, id);
        }
        None
    }

    /// `head` followed by every window chained after it
    pub fn chain_from(&mut self, head: WindowId, is_live: impl Fn(WindowId) -> bool) -> Vec<WindowId> {
        let mut chain = vec![head];
        let mut current = head;
        while let Some(next) = self.next(current, &is_live) {
            if chain.contains(&next) || chain.len() > self.links.len() {
                tracing::warn!("paint chain cycle at {}, cutting", next);
                self.clear_after(current, next);
                self.clear_before(next, current);
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    pub fn is_linked(&self, id: WindowId) -> bool {
        self.links.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn clear_after(&mut self, id: WindowId, expected: WindowId) {
        if let Some(links) = self.links.get_mut(&id) {
            if links.draw_after == Some(expected) {
                links.draw_after = None;
            }
            if links.is_empty() {
                self.links.remove(&id);
            }
        }
    }

    fn clear_before(&mut self, id: WindowId, expected: WindowId) {
        if let Some(links) = self.links.get_mut(&id) {
            if links.draw_before == Some(expected) {
                links.draw_before = None;
            }
            if links.is_empty() {
                self.links.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: WindowId = WindowId(1);
    const B: WindowId = WindowId(2);
    const C: WindowId = WindowId(3);

    fn all_live(_: WindowId) -> bool {
        true
    }

    #[test]
    fn test_chain_walk() {
        let mut chain = PaintChain::new();
        chain.link(A, B);
        chain.link(B, C);
        assert_eq!(chain.chain_from(A, all_live), vec![A, B, C]);
        assert_eq!(chain.prev(C, all_live), Some(B));
    }

    #[test]
    fn test_unlink_splices_neighbors() {
        let mut chain = PaintChain::new();
        chain.link(A, B);
        chain.link(B, C);
        chain.unlink(B);
        assert!(!chain.is_linked(B));
        assert_eq!(chain.chain_from(A, all_live), vec![A, C]);
    }

    #[test]
    fn test_dead_target_dropped() {
        let mut chain = PaintChain::new();
        chain.link(A, B);
        assert_eq!(chain.next(A, |id| id != B), None);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_relink_replaces_old_guest() {
        let mut chain = PaintChain::new();
        chain.link(A, B);
        chain.link(A, C);
        assert_eq!(chain.next(A, all_live), Some(C));
        assert!(!chain.is_linked(B));
    }

    #[test]
    fn test_cycle_is_cut() {
        let mut chain = PaintChain::new();
        chain.link(A, B);
        chain.link(B, C);
        chain.link(C, A);
        let walk = chain.chain_from(A, all_live);
        assert_eq!(walk, vec![A, B, C]);
        assert_eq!(chain.next(C, all_live), None);
    }

    #[test]
    fn test_self_link_refused() {
        let mut chain = PaintChain::new();
        chain.link(A, A);
        assert!(chain.is_empty());
    }
}
