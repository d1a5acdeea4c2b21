use std::collections::HashMap;

use crate::core::color::{NO_DATA_FILL, Rgb};
use crate::core::id::RoomId;
use crate::floorplan::document::{SvgDocument, SvgNode};
use crate::view::Transform;

pub const FILL_OPACITY: f64 = 0.85;
pub const HIGHLIGHT_STROKE: Rgb = Rgb::new(255, 204, 0);
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 15.0;

const SVG_XMLNS: &str = "http://www.w3.org/2000/svg";
const FADE_IN: &str = r#"<animate attributeName="stroke-opacity" from="0" to="1" dur="250ms" fill="freeze" calcMode="spline" keyTimes="0;1" keySplines="0.42 0 0.58 1"/>"#;

/// What to paint onto the plan: per-room fills, the highlighted room and
/// the camera transform. Rooms without a fill entry render white.
#[derive(Debug, Clone, Default)]
pub struct RoomPaint {
    pub fills: HashMap<RoomId, Rgb>,
    pub highlight: Option<RoomId>,
    pub camera: Option<Transform>,
}

pub fn render(document: &SvgDocument, paint: &RoomPaint) -> String {
    let mut out = String::new();
    write_node(&mut out, document.root(), paint, true);
    out
}

fn write_node(out: &mut String, node: &SvgNode, paint: &RoomPaint, is_root: bool) {
    let room = node.room_id();
    let highlighted = room.is_some() && room.as_ref() == paint.highlight.as_ref();

    out.push('<');
    out.push_str(&node.name);

    if is_root && node.attr("xmlns").is_none() {
        out.push_str(&format!(r#" xmlns="{}""#, SVG_XMLNS));
    }

    let style_override = room.as_ref().map(|id| {
        let fill = paint.fills.get(id).copied().unwrap_or(NO_DATA_FILL);
        let mut style = match node.attr("style") {
            Some(existing) => format!("{};", existing.trim_end_matches(';')),
            None => String::new(),
        };
        style.push_str(&format!("fill:{};fill-opacity:{}", fill, FILL_OPACITY));
        if highlighted {
            style.push_str(&format!(
                ";stroke:{};stroke-width:{};stroke-opacity:1",
                HIGHLIGHT_STROKE, HIGHLIGHT_STROKE_WIDTH
            ));
        }
        style
    });

    for (name, value) in &node.attrs {
        if style_override.is_some() && name == "style" {
            continue;
        }
        out.push_str(&format!(r#" {}="{}""#, name, escape_xml(value)));
    }

    if let Some(style) = &style_override {
        out.push_str(&format!(r#" style="{}""#, escape_xml(style)));
    }

    if node.children.is_empty() && node.text.is_none() && !highlighted {
        out.push_str("/>");
        return;
    }

    out.push('>');

    if let Some(text) = &node.text {
        out.push_str(&escape_xml(text));
    }

    // the zoom transform lives on the plan's first group, as the pan and
    // zoom handlers expect
    let mut camera_pending = is_root && paint.camera.is_some();
    for child in &node.children {
        if camera_pending && child.name == "g" {
            camera_pending = false;
            write_group_with_camera(out, child, paint);
        } else {
            write_node(out, child, paint, false);
        }
    }

    if highlighted {
        out.push_str(FADE_IN);
    }

    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

fn write_group_with_camera(out: &mut String, node: &SvgNode, paint: &RoomPaint) {
    let mut transformed = node.clone();
    if let Some(camera) = &paint.camera {
        transformed.set_attr(
            "transform",
            format!(
                "translate({},{}) scale({})",
                camera.x, camera.y, camera.k
            ),
        );
    }
    write_node(out, &transformed, paint, false);
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color;
    use crate::core::reading::SensorType;

    const PLAN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300">
        <g>
            <path data-room-id="101" d="M 10 10 L 110 10 L 110 60 L 10 60 Z"/>
            <rect data-room-id="102" x="150" y="10" width="80" height="50" style="fill:gray"/>
            <path d="M 0 0 L 400 0" fill="black"/>
            <text x="20" y="30">Room 101 &amp; more</text>
        </g>
    </svg>"##;

    fn document() -> SvgDocument {
        SvgDocument::parse(PLAN).unwrap()
    }

    #[test]
    fn room_fills_come_from_the_paint_map() {
        let mut paint = RoomPaint::default();
        paint
            .fills
            .insert(RoomId::new("101"), color::color_for(SensorType::Temperature, 25.0));

        let svg = render(&document(), &paint);

        assert!(svg.contains("fill:#00ff00;fill-opacity:0.85"));
    }

    #[test]
    fn rooms_without_data_render_white() {
        let svg = render(&document(), &RoomPaint::default());

        // the gray inline style stays, the white fill wins by coming last
        assert!(svg.contains("fill:gray;fill:#ffffff;fill-opacity:0.85"));
    }

    #[test]
    fn highlight_adds_stroke_and_fade_in() {
        let paint = RoomPaint {
            highlight: Some(RoomId::new("101")),
            ..Default::default()
        };

        let svg = render(&document(), &paint);

        assert!(svg.contains("stroke:#ffcc00;stroke-width:15"));
        assert!(svg.contains(r#"<animate attributeName="stroke-opacity""#));
    }

    #[test]
    fn unhighlighted_rooms_carry_no_stroke() {
        let svg = render(&document(), &RoomPaint::default());

        assert!(!svg.contains("stroke:#ffcc00"));
        assert!(!svg.contains("<animate"));
    }

    #[test]
    fn camera_transform_lands_on_the_top_group() {
        let paint = RoomPaint {
            camera: Some(Transform::new(12.5, -40.0, 1.6)),
            ..Default::default()
        };

        let svg = render(&document(), &paint);

        assert!(svg.contains(r#"transform="translate(12.5,-40) scale(1.6)""#));
    }

    #[test]
    fn plain_shapes_and_text_are_untouched() {
        let svg = render(&document(), &RoomPaint::default());

        assert!(svg.contains(r#"fill="black""#));
        assert!(svg.contains("Room 101 &amp; more"));
    }

    #[test]
    fn missing_xmlns_is_added_back() {
        let doc = SvgDocument::parse(r#"<svg viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#).unwrap();

        let svg = render(&doc, &RoomPaint::default());

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
    }
}
