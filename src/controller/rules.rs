//! # Per-Frame Decision Rules
//!
//! Ordered rule table deciding what a new snapshot means, given the previous
//! one. The first matching rule wins; when none match the pointer is
//! released.
//!
//! | # | Condition | Decision |
//! |---|-----------|----------|
//! | 1 | up / down / left / right rising edge | `Key` |
//! | 2 | plus / minus rising edge | `Volume(±2)` |
//! | 3 | A or B held | `LaserShow` |
//! | 4 | A or B falling edge | `LaserHide` |
//! | 5 | home rising edge | `BeginCalibration` |
//! | 6 | dot 1 tracked | `DotTracked` |
//! | - | otherwise | `Released` |
//!
//! LED feedback is not part of the table; it runs on every frame.

use super::events::{Direction, VOLUME_STEP};
use crate::wiimote::decoder::Snapshot;

/// What a frame asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Key(Direction),
    Volume(i8),
    LaserShow,
    LaserHide,
    BeginCalibration,
    /// Dot 1 is visible; `appeared` is set on its rising edge
    DotTracked { appeared: bool },
    Released,
}

/// One row of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub when: fn(&Snapshot, &Snapshot) -> bool,
    pub then: fn(&Snapshot, &Snapshot) -> Decision,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn rising(prev: bool, curr: bool) -> bool {
    !prev && curr
}

fn laser_held(s: &Snapshot) -> bool {
    s.buttons.a || s.buttons.b
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "up",
        when: |p, c| rising(p.buttons.up, c.buttons.up),
        then: |_, _| Decision::Key(Direction::Up),
    },
    Rule {
        name: "down",
        when: |p, c| rising(p.buttons.down, c.buttons.down),
        then: |_, _| Decision::Key(Direction::Down),
    },
    Rule {
        name: "left",
        when: |p, c| rising(p.buttons.left, c.buttons.left),
        then: |_, _| Decision::Key(Direction::Left),
    },
    Rule {
        name: "right",
        when: |p, c| rising(p.buttons.right, c.buttons.right),
        then: |_, _| Decision::Key(Direction::Right),
    },
    Rule {
        name: "plus",
        when: |p, c| rising(p.buttons.plus, c.buttons.plus),
        then: |_, _| Decision::Volume(VOLUME_STEP),
    },
    Rule {
        name: "minus",
        when: |p, c| rising(p.buttons.minus, c.buttons.minus),
        then: |_, _| Decision::Volume(-VOLUME_STEP),
    },
    Rule {
        name: "laser held",
        when: |_, c| laser_held(c),
        then: |_, _| Decision::LaserShow,
    },
    Rule {
        name: "laser released",
        when: |p, c| laser_held(p) && !laser_held(c),
        then: |_, _| Decision::LaserHide,
    },
    Rule {
        name: "home",
        when: |p, c| rising(p.buttons.home, c.buttons.home),
        then: |_, _| Decision::BeginCalibration,
    },
    Rule {
        name: "dot tracked",
        when: |_, c| c.dot1().tracked,
        then: |p, _| Decision::DotTracked {
            appeared: !p.dot1().tracked,
        },
    },
];

/// Evaluates [`RULES`] against a pair of consecutive snapshots.
///
/// # Examples
///
/// ```
/// use wiiboard::controller::rules::{evaluate, Decision};
/// use wiiboard::wiimote::decoder::Snapshot;
///
/// let idle = Snapshot::default();
/// assert_eq!(evaluate(&idle, &idle), Decision::Released);
/// ```
#[must_use]
pub fn evaluate(prev: &Snapshot, curr: &Snapshot) -> Decision {
    RULES
        .iter()
        .find(|rule| (rule.when)(prev, curr))
        .map_or(Decision::Released, |rule| (rule.then)(prev, curr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiimote::decoder::IrDot;

    fn with_dot(x: u16, y: u16) -> Snapshot {
        let mut s = Snapshot::default();
        s.ir[0] = IrDot::new(x, y);
        s
    }

    // ==================== Edge Trigger Tests ====================

    #[test]
    fn test_held_button_fires_once() {
        let idle = Snapshot::default();
        let mut held = Snapshot::default();
        held.buttons.up = true;

        assert_eq!(evaluate(&idle, &held), Decision::Key(Direction::Up));
        assert_eq!(evaluate(&held, &held), Decision::Released);
    }

    #[test]
    fn test_each_direction() {
        let idle = Snapshot::default();
        let cases: [(fn(&mut Snapshot), Direction); 4] = [
            (|s| s.buttons.up = true, Direction::Up),
            (|s| s.buttons.down = true, Direction::Down),
            (|s| s.buttons.left = true, Direction::Left),
            (|s| s.buttons.right = true, Direction::Right),
        ];

        for (press, direction) in cases {
            let mut curr = Snapshot::default();
            press(&mut curr);
            assert_eq!(evaluate(&idle, &curr), Decision::Key(direction));
        }
    }

    #[test]
    fn test_volume_edges() {
        let idle = Snapshot::default();
        let mut plus = Snapshot::default();
        plus.buttons.plus = true;
        let mut minus = Snapshot::default();
        minus.buttons.minus = true;

        assert_eq!(evaluate(&idle, &plus), Decision::Volume(2));
        assert_eq!(evaluate(&idle, &minus), Decision::Volume(-2));
        assert_eq!(evaluate(&plus, &plus), Decision::Released);
    }

    #[test]
    fn test_home_rising_edge_only() {
        let idle = Snapshot::default();
        let mut home = Snapshot::default();
        home.buttons.home = true;

        assert_eq!(evaluate(&idle, &home), Decision::BeginCalibration);
        assert_eq!(evaluate(&home, &home), Decision::Released);
    }

    // ==================== Laser Tests ====================

    #[test]
    fn test_laser_held_every_frame() {
        let mut held = Snapshot::default();
        held.buttons.b = true;

        assert_eq!(evaluate(&Snapshot::default(), &held), Decision::LaserShow);
        assert_eq!(evaluate(&held, &held), Decision::LaserShow);
    }

    #[test]
    fn test_laser_falling_edge() {
        let mut held = Snapshot::default();
        held.buttons.a = true;

        assert_eq!(evaluate(&held, &Snapshot::default()), Decision::LaserHide);
    }

    #[test]
    fn test_switching_a_to_b_keeps_laser() {
        let mut a = Snapshot::default();
        a.buttons.a = true;
        let mut b = Snapshot::default();
        b.buttons.b = true;

        assert_eq!(evaluate(&a, &b), Decision::LaserShow);
    }

    // ==================== Priority Tests ====================

    #[test]
    fn test_direction_beats_dot() {
        let prev = with_dot(100, 100);
        let mut curr = with_dot(100, 100);
        curr.buttons.down = true;

        assert_eq!(evaluate(&prev, &curr), Decision::Key(Direction::Down));
    }

    #[test]
    fn test_up_checked_before_right() {
        let mut curr = Snapshot::default();
        curr.buttons.up = true;
        curr.buttons.right = true;

        assert_eq!(evaluate(&Snapshot::default(), &curr), Decision::Key(Direction::Up));
    }

    #[test]
    fn test_laser_beats_home() {
        let mut curr = Snapshot::default();
        curr.buttons.a = true;
        curr.buttons.home = true;

        assert_eq!(evaluate(&Snapshot::default(), &curr), Decision::LaserShow);
    }

    #[test]
    fn test_home_beats_dot() {
        let mut curr = with_dot(10, 10);
        curr.buttons.home = true;

        assert_eq!(evaluate(&Snapshot::default(), &curr), Decision::BeginCalibration);
    }

    // ==================== Dot Tests ====================

    #[test]
    fn test_dot_appeared_edge() {
        let idle = Snapshot::default();
        let dot = with_dot(300, 400);

        assert_eq!(evaluate(&idle, &dot), Decision::DotTracked { appeared: true });
        assert_eq!(evaluate(&dot, &dot), Decision::DotTracked { appeared: false });
        assert_eq!(evaluate(&dot, &idle), Decision::Released);
    }

    #[test]
    fn test_sentinel_dot_is_released() {
        let sentinel = with_dot(1023, 500);
        assert_eq!(evaluate(&Snapshot::default(), &sentinel), Decision::Released);
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
