//! SVG generation with `quick-xml`'s writer API.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, Event},
};

use crate::{
  ARC_WIDTH, CHART_SIZE,
  error::{Error, Result},
  pie::{CENTER, RADIUS, Segment, Shape},
};

const NS_SVG: &str = "http://www.w3.org/2000/svg";

type SvgWriter = Writer<Cursor<Vec<u8>>>;

fn num(value: f64) -> String { format!("{value:.3}") }

fn write(w: &mut SvgWriter, event: Event<'_>) -> Result<()> {
  w.write_event(event).map_err(|e| Error::Xml(e.to_string()))
}

fn write_segment(w: &mut SvgWriter, segment: &Segment) -> Result<()> {
  let width = ARC_WIDTH.to_string();
  let common = [
    ("fill", "none"),
    ("stroke", segment.color),
    ("stroke-width", width.as_str()),
  ];

  let element = match &segment.shape {
    Shape::Ring => {
      let (c, r) = (num(CENTER), num(RADIUS));
      let mut el = BytesStart::new("circle");
      el.push_attribute(("cx", c.as_str()));
      el.push_attribute(("cy", c.as_str()));
      el.push_attribute(("r", r.as_str()));
      el.extend_attributes(common);
      el
    }
    Shape::Arc { from, to, large } => {
      let d = format!(
        "M {} {} A {r} {r} 0 {} 1 {} {}",
        num(from.x),
        num(from.y),
        u8::from(*large),
        num(to.x),
        num(to.y),
        r = num(RADIUS),
      );
      let mut el = BytesStart::new("path");
      el.push_attribute(("d", d.as_str()));
      el.extend_attributes(common);
      el
    }
  };

  write(w, Event::Empty(element))
}

/// A complete SVG document drawing `segments`.
pub fn document(segments: &[Segment]) -> Result<String> {
  let mut w = Writer::new(Cursor::new(Vec::new()));
  write(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let size = CHART_SIZE.to_string();
  let view_box = format!("0 0 {CHART_SIZE} {CHART_SIZE}");
  let mut root = BytesStart::new("svg");
  root.push_attribute(("xmlns", NS_SVG));
  root.push_attribute(("width", size.as_str()));
  root.push_attribute(("height", size.as_str()));
  root.push_attribute(("viewBox", view_box.as_str()));
  write(&mut w, Event::Start(root))?;

  for segment in segments {
    write_segment(&mut w, segment)?;
  }

  write(&mut w, Event::End(BytesEnd::new("svg")))?;
  String::from_utf8(w.into_inner().into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
  use observer_core::{aggregate::Proportions, status::Status};

  use crate::{CHART_SIZE, render_status_chart, status_color};

  #[test]
  fn empty_chart_is_a_bare_svg() {
    let svg = render_status_chart(&Proportions::default()).unwrap();
    assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(svg.contains(&format!("viewBox=\"0 0 {CHART_SIZE} {CHART_SIZE}\"")));
    assert!(!svg.contains("<path"));
    assert!(svg.ends_with("</svg>"));
  }

  #[test]
  fn one_arc_per_observed_status_in_chart_order() {
    let shares: Proportions = [
      (Status::Offline, 0.5),
      (Status::Online, 0.3),
      (Status::Dnd, 0.2),
    ]
    .into_iter()
    .collect();

    let svg = render_status_chart(&shares).unwrap();
    assert_eq!(svg.matches("<path").count(), 3);
    assert!(!svg.contains(status_color(Status::Idle)));

    let online = svg.find(status_color(Status::Online)).unwrap();
    let dnd = svg.find(status_color(Status::Dnd)).unwrap();
    let offline = svg.find(status_color(Status::Offline)).unwrap();
    assert!(online < dnd && dnd < offline);

    // The first arc starts at three o'clock on the stroke centre line.
    assert!(svg.contains("d=\"M 900.000 500.000 A 400.000 400.000 0 0 1"));
  }

  #[test]
  fn single_status_draws_a_ring() {
    let shares: Proportions = [(Status::Idle, 1.0)].into_iter().collect();
    let svg = render_status_chart(&shares).unwrap();
    assert!(svg.contains("<circle cx=\"500.000\" cy=\"500.000\" r=\"400.000\""));
    assert!(svg.contains("stroke-width=\"200\""));
  }
}
