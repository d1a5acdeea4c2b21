use std::collections::HashMap;

use crate::core::id::RoomId;
use crate::floorplan::geometry::{self, Bounds, Rect, Size, point};

pub const ROOM_ATTR: &str = "data-room-id";

/// Owned element tree of a floorplan SVG. roxmltree borrows from the
/// input string, so the parsed structure is copied into this tree once
/// and kept for re-serialization with per-room style overrides.
#[derive(Debug, Clone)]
pub struct SvgNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<SvgNode>,
}

impl SvgNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(existing) => existing.1 = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    pub fn room_id(&self) -> Option<RoomId> {
        let id = RoomId::new(self.attr(ROOM_ATTR)?);
        if id.is_empty() { None } else { Some(id) }
    }

    /// Box of this element's own geometry, in local user units like
    /// `getBBox()` reports it.
    fn shape_bounds(&self) -> Option<Rect> {
        let number = |name: &str, fallback: f64| -> f64 {
            self.attr(name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(fallback)
        };

        match self.name.as_str() {
            "rect" | "image" => {
                let (x, y) = (number("x", 0.0), number("y", 0.0));
                let (w, h) = (number("width", 0.0), number("height", 0.0));
                Some(Rect::new(point(x, y), Size::new(w, h)))
            }
            "circle" => {
                let (cx, cy, r) = (number("cx", 0.0), number("cy", 0.0), number("r", 0.0));
                Some(Rect::new(point(cx - r, cy - r), Size::new(2.0 * r, 2.0 * r)))
            }
            "ellipse" => {
                let (cx, cy) = (number("cx", 0.0), number("cy", 0.0));
                let (rx, ry) = (number("rx", 0.0), number("ry", 0.0));
                Some(Rect::new(point(cx - rx, cy - ry), Size::new(2.0 * rx, 2.0 * ry)))
            }
            "line" => {
                let mut bounds = Bounds::default();
                bounds.extend(number("x1", 0.0), number("y1", 0.0));
                bounds.extend(number("x2", 0.0), number("y2", 0.0));
                bounds.to_rect()
            }
            "polygon" | "polyline" => geometry::points_bounds(self.attr("points")?),
            "path" => geometry::path_bounds(self.attr("d")?),
            _ => None,
        }
    }

    /// Box of this element and everything below it.
    fn subtree_bounds(&self) -> Option<Rect> {
        let mut bounds = Bounds::default();

        if let Some(own) = self.shape_bounds() {
            bounds.extend_rect(&own);
        }
        for child in &self.children {
            if let Some(rect) = child.subtree_bounds() {
                bounds.extend_rect(&rect);
            }
        }

        bounds.to_rect()
    }
}

#[derive(Debug, Clone)]
pub struct SvgDocument {
    root: SvgNode,
}

impl SvgDocument {
    pub fn parse(svg: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(svg)?;
        let root = doc
            .descendants()
            .find(|n| n.has_tag_name("svg"))
            .map(build_node)
            .unwrap_or_else(|| SvgNode {
                name: "svg".to_owned(),
                attrs: vec![],
                text: None,
                children: vec![],
            });

        Ok(Self { root })
    }

    pub fn root(&self) -> &SvgNode {
        &self.root
    }

    pub fn view_box(&self) -> Option<Rect> {
        let raw = self.root.attr("viewBox")?;
        let parts: Vec<f64> = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();

        match parts.as_slice() {
            [min_x, min_y, width, height] => {
                Some(Rect::new(point(*min_x, *min_y), Size::new(*width, *height)))
            }
            _ => None,
        }
    }

    /// Prepares the document for interactive display the way the
    /// dashboard expects it: the root fills its container and reacts to
    /// pointer input, while paths without a room annotation and all
    /// text labels let events pass through to the room shapes below.
    pub fn normalize_for_display(&mut self) {
        self.root.set_attr("width", "100%");
        self.root.set_attr("height", "100%");
        self.root.set_attr("pointer-events", "all");
        self.root.set_attr("id", "floorplan");

        fn walk(node: &mut SvgNode) {
            for child in &mut node.children {
                match child.name.as_str() {
                    "path" if child.room_id().is_none() => {
                        child.set_attr("pointer-events", "none");
                    }
                    "text" => {
                        child.set_attr("pointer-events", "none");
                    }
                    _ => {}
                }
                walk(child);
            }
        }

        walk(&mut self.root);
    }

    /// Every annotated room with the box of its shape, if one can be
    /// derived from the markup.
    pub fn room_bounds(&self) -> HashMap<RoomId, Option<Rect>> {
        let mut rooms = HashMap::new();

        fn walk(node: &SvgNode, rooms: &mut HashMap<RoomId, Option<Rect>>) {
            if let Some(id) = node.room_id() {
                rooms.insert(id, node.subtree_bounds());
            }
            for child in &node.children {
                walk(child, rooms);
            }
        }

        walk(&self.root, &mut rooms);
        rooms
    }
}

fn build_node(n: roxmltree::Node) -> SvgNode {
    let attrs = n
        .attributes()
        .map(|a| (a.name().to_owned(), a.value().to_owned()))
        .collect();

    let text = n
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect::<String>();
    let text = if text.trim().is_empty() { None } else { Some(text) };

    let children = n
        .children()
        .filter(|c| c.is_element())
        .map(build_node)
        .collect();

    SvgNode {
        name: n.tag_name().name().to_owned(),
        attrs,
        text,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300">
        <g>
            <path data-room-id="101" d="M 10 10 L 110 10 L 110 60 L 10 60 Z" fill="#eee"/>
            <rect data-room-id="102" x="150" y="10" width="80" height="50"/>
            <path d="M 0 0 L 400 0" stroke="black"/>
            <text x="20" y="30">Room 101</text>
        </g>
    </svg>"##;

    #[test]
    fn parses_rooms_with_bounds() {
        let doc = SvgDocument::parse(PLAN).unwrap();
        let rooms = doc.room_bounds();

        assert_eq!(rooms.len(), 2);

        let rect = rooms[&RoomId::new("101")].unwrap();
        assert_eq!(rect.center(), point(60.0, 35.0));

        let rect = rooms[&RoomId::new("102")].unwrap();
        assert_eq!(rect.center(), point(190.0, 35.0));
    }

    #[test]
    fn plan_without_rooms_still_parses() {
        let doc = SvgDocument::parse(r#"<svg viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#).unwrap();

        assert!(doc.room_bounds().is_empty());
    }

    #[test]
    fn view_box_is_parsed() {
        let doc = SvgDocument::parse(PLAN).unwrap();
        let rect = doc.view_box().unwrap();

        assert_eq!(rect.size, Size::new(400.0, 300.0));
    }

    #[test]
    fn invalid_xml_is_an_error() {
        assert!(SvgDocument::parse("<svg><path</svg>").is_err());
    }

    #[test]
    fn normalization_disables_pointer_events_on_decoration() {
        let mut doc = SvgDocument::parse(PLAN).unwrap();
        doc.normalize_for_display();

        assert_eq!(doc.root().attr("pointer-events"), Some("all"));
        assert_eq!(doc.root().attr("width"), Some("100%"));

        let group = &doc.root().children[0];
        let room_path = &group.children[0];
        let bare_path = &group.children[2];
        let label = &group.children[3];

        assert_eq!(room_path.attr("pointer-events"), None);
        assert_eq!(bare_path.attr("pointer-events"), Some("none"));
        assert_eq!(label.attr("pointer-events"), Some("none"));
    }

    #[test]
    fn group_room_takes_the_union_of_its_shapes() {
        let doc = SvgDocument::parse(
            r##"<svg viewBox="0 0 100 100">
                <g data-room-id="sauna">
                    <rect x="0" y="0" width="20" height="20"/>
                    <circle cx="40" cy="10" r="10"/>
                </g>
            </svg>"##,
        )
        .unwrap();

        let rooms = doc.room_bounds();
        let rect = rooms[&RoomId::new("sauna")].unwrap();

        assert_eq!(rect.min_x(), 0.0);
        assert_eq!(rect.max_x(), 50.0);
        assert_eq!(rect.max_y(), 20.0);
    }

    #[test]
    fn blank_room_annotation_is_ignored() {
        let doc = SvgDocument::parse(r#"<svg><rect data-room-id="  " width="5" height="5"/></svg>"#).unwrap();

        assert!(doc.room_bounds().is_empty());
    }
}
