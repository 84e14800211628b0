//! Donut geometry: shares to arc endpoints.
//!
//! Angles are in degrees from three o'clock, increasing clockwise (SVG's y
//! axis points down, so the usual `cos`/`sin` parametrisation sweeps
//! clockwise on screen).

use crate::{ARC_WIDTH, CHART_SIZE};

/// Stroke centre line of the ring.
pub const RADIUS: f64 = (CHART_SIZE as f64 - ARC_WIDTH as f64) / 2.0;

pub const CENTER: f64 = CHART_SIZE as f64 / 2.0;

/// Sweeps this close to a full turn are drawn as a ring; an SVG arc whose
/// endpoints coincide draws nothing.
const FULL_TURN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
  Ring,
  Arc {
    from:  Point,
    to:    Point,
    /// Whether the sweep exceeds half a turn (SVG `large-arc-flag`).
    large: bool,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
  pub color: &'static str,
  pub shape: Shape,
}

fn point_at(degrees: f64) -> Point {
  let radians = degrees.to_radians();
  Point {
    x: CENTER + RADIUS * radians.cos(),
    y: CENTER + RADIUS * radians.sin(),
  }
}

/// Lay out consecutive segments, one per non-zero share.
pub fn layout(
  values: impl IntoIterator<Item = (f64, &'static str)>,
) -> Vec<Segment> {
  let mut consumed = 0.0;
  let mut segments = Vec::new();

  for (share, color) in values {
    let sweep = share * 360.0;
    if sweep <= 0.0 {
      continue;
    }

    let shape = if sweep >= 360.0 - FULL_TURN_EPSILON {
      Shape::Ring
    } else {
      Shape::Arc {
        from:  point_at(consumed),
        to:    point_at(consumed + sweep),
        large: sweep > 180.0,
      }
    };
    segments.push(Segment { color, shape });
    consumed += sweep;
  }

  segments
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
  }

  #[test]
  fn quarters_start_at_three_oclock_and_run_clockwise() {
    let segments = layout([(0.25, "a"), (0.25, "b"), (0.5, "c")]);
    assert_eq!(segments.len(), 3);

    let Shape::Arc { from, to, large } = &segments[0].shape else {
      panic!("expected an arc");
    };
    assert!(close(*from, Point { x: CENTER + RADIUS, y: CENTER }));
    // Clockwise on screen: a quarter turn lands at six o'clock.
    assert!(close(*to, Point { x: CENTER, y: CENTER + RADIUS }));
    assert!(!large);

    let Shape::Arc { from, large, .. } = &segments[2].shape else {
      panic!("expected an arc");
    };
    assert!(close(*from, Point { x: CENTER - RADIUS, y: CENTER }));
    assert!(!large);
  }

  #[test]
  fn zero_shares_are_skipped_and_a_whole_share_is_a_ring() {
    let segments = layout([(0.0, "a"), (1.0, "b"), (0.0, "c")]);
    assert_eq!(segments, vec![Segment { color: "b", shape: Shape::Ring }]);
  }

  #[test]
  fn more_than_half_sets_the_large_arc_flag() {
    let segments = layout([(0.7, "a"), (0.3, "b")]);
    assert!(matches!(segments[0].shape, Shape::Arc { large: true, .. }));
    assert!(matches!(segments[1].shape, Shape::Arc { large: false, .. }));
  }
}
