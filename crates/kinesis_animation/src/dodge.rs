//! Restack dodge planning
//!
//! When a window is raised past others, each passed window that overlaps it
//! moves out of the way along the shortest axis-aligned path and comes back.

use crate::window::WindowId;
use kinesis_core::{Rect, Vec2};

/// Axis-aligned direction a window dodges in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DodgeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl DodgeDirection {
    /// Candidate order; earlier entries win ties
    pub const ALL: [DodgeDirection; 4] = [
        DodgeDirection::Up,
        DodgeDirection::Down,
        DodgeDirection::Left,
        DodgeDirection::Right,
    ];

    /// Displacement that moves `dodger` fully clear of `subject`
    pub fn displacement(self, subject: &Rect, dodger: &Rect) -> Vec2 {
        match self {
            DodgeDirection::Up => Vec2::new(0.0, subject.y() - dodger.bottom()),
            DodgeDirection::Down => Vec2::new(0.0, subject.bottom() - dodger.y()),
            DodgeDirection::Left => Vec2::new(subject.x() - dodger.right(), 0.0),
            DodgeDirection::Right => Vec2::new(subject.right() - dodger.x(), 0.0),
        }
    }
}

/// One window's part in a dodge
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DodgeAssignment {
    pub window: WindowId,
    /// Overlap with the subject
    pub region: Rect,
    pub direction: DodgeDirection,
    pub displacement: Vec2,
    pub delay_ms: f32,
}

/// Direction with the smallest displacement, plus that displacement
///
/// `gap` adds clearance in the direction of travel.
pub fn choose_direction(subject: &Rect, dodger: &Rect, gap: f32) -> (DodgeDirection, Vec2) {
    let mut best = DodgeDirection::Up;
    let mut best_shift = best.displacement(subject, dodger);
    for direction in &DodgeDirection::ALL[1..] {
        let shift = direction.displacement(subject, dodger);
        if shift.length() < best_shift.length() {
            best = *direction;
            best_shift = shift;
        }
    }
    let len = best_shift.length();
    if gap > 0.0 && len > 0.0 {
        let k = (len + gap) / len;
        best_shift = Vec2::new(best_shift.x * k, best_shift.y * k);
    }
    (best, best_shift)
}

/// Assign a dodge to every passed window that overlaps `subject`
///
/// `passed` is in stacking order at restack time; the n-th overlapping window
/// starts `n * stagger_ms` after the first.
pub fn plan_dodge(
    subject: &Rect,
    passed: &[(WindowId, Rect)],
    stagger_ms: f32,
    gap: f32,
) -> Vec<DodgeAssignment> {
    let mut plan = Vec::new();
    for (id, rect) in passed {
        let Some(region) = subject.intersection(rect) else {
            continue;
        };
        if region.is_empty() {
            continue;
        }
        let (direction, displacement) = choose_direction(subject, rect, gap);
        plan.push(DodgeAssignment {
            window: *id,
            region,
            direction,
            displacement,
            delay_ms: plan.len() as f32 * stagger_ms.max(0.0),
        });
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_direction() {
        let subject = Rect::new(100.0, 100.0, 200.0, 200.0);
        // overlaps the subject's right edge by 20px
        let dodger = Rect::new(280.0, 150.0, 100.0, 100.0);
        let (direction, shift) = choose_direction(&subject, &dodger, 0.0);
        assert_eq!(direction, DodgeDirection::Right);
        assert!((shift.x - 20.0).abs() < 0.001);
        assert_eq!(shift.y, 0.0);
    }

    #[test]
    fn test_vertical_dodge() {
        let subject = Rect::new(0.0, 100.0, 400.0, 100.0);
        let dodger = Rect::new(50.0, 60.0, 300.0, 50.0);
        let (direction, shift) = choose_direction(&subject, &dodger, 0.0);
        assert_eq!(direction, DodgeDirection::Up);
        assert!((shift.y + 10.0).abs() < 0.001);
    }

    #[test]
    fn test_ties_prefer_up() {
        let subject = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (direction, _) = choose_direction(&subject, &subject, 0.0);
        assert_eq!(direction, DodgeDirection::Up);
    }

    #[test]
    fn test_gap_extends_travel() {
        let subject = Rect::new(100.0, 100.0, 200.0, 200.0);
        let dodger = Rect::new(280.0, 150.0, 100.0, 100.0);
        let (_, shift) = choose_direction(&subject, &dodger, 5.0);
        assert!((shift.x - 25.0).abs() < 0.001);
    }

    #[test]
    fn test_plan_skips_disjoint_and_staggers() {
        let subject = Rect::new(100.0, 100.0, 200.0, 200.0);
        let passed = [
            (WindowId(1), Rect::new(250.0, 120.0, 100.0, 50.0)),
            (WindowId(2), Rect::new(600.0, 600.0, 10.0, 10.0)),
            // touching edge only
            (WindowId(3), Rect::new(300.0, 100.0, 50.0, 50.0)),
            (WindowId(4), Rect::new(90.0, 280.0, 50.0, 50.0)),
        ];
        let plan = plan_dodge(&subject, &passed, 40.0, 0.0);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].window, WindowId(1));
        assert_eq!(plan[0].delay_ms, 0.0);
        assert_eq!(plan[0].region, Rect::new(250.0, 120.0, 50.0, 50.0));
        assert_eq!(plan[1].window, WindowId(4));
        assert_eq!(plan[1].delay_ms, 40.0);
    }
}
