//! Status chart renderer for Observer.
//!
//! Draws [`Proportions`] as a donut chart in SVG. Pure synchronous; no HTTP
//! or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use observer_core::{aggregate::Proportions, status::Status};
//!
//! let shares: Proportions =
//!   [(Status::Online, 0.75), (Status::Idle, 0.25)].into_iter().collect();
//! let svg = observer_chart::render_status_chart(&shares).unwrap();
//! assert!(svg.starts_with("<?xml"));
//! ```

pub mod error;
mod pie;
mod svg;

pub use error::{Error, Result};
use observer_core::{aggregate::Proportions, status::Status};

/// Media type of the rendered document.
pub const CONTENT_TYPE: &str = "image/svg+xml";

/// Image width and height in pixels.
pub const CHART_SIZE: u32 = 1000;

/// Ring thickness: a fifth of the image height.
pub const ARC_WIDTH: u32 = CHART_SIZE / 5;

/// Fill colour for each status, matching the chat platform's own indicators.
pub fn status_color(status: Status) -> &'static str {
  match status {
    Status::Online => "#3BA55C",
    Status::Idle => "#FAA61A",
    Status::Dnd => "#ED4245",
    Status::Offline => "#4E545E",
  }
}

/// Render `shares` as a donut chart.
///
/// Arcs are laid out in the order online, idle, dnd, offline, starting at
/// three o'clock and sweeping clockwise; each covers `share * 360` degrees.
/// Statuses with no share draw nothing and the background is transparent.
pub fn render_status_chart(shares: &Proportions) -> Result<String> {
  let arcs = pie::layout(
    Status::ALL
      .into_iter()
      .map(|status| (shares.get(status), status_color(status))),
  );
  svg::document(&arcs)
}
