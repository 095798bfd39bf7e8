//! SVG rendering output
//!
//! Serialises a [`DisplayList`](super::DisplayList) with quick-xml.

mod document;
mod elements;

pub use document::to_svg;

/// Compact coordinate formatting: at most two decimals, no trailing zeros
pub(crate) fn fmt_num(value: f32) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Orientation;
    use crate::renderers::display_list::{DisplayList, DrawCommand, TextAnchor};

    fn list(commands: Vec<DrawCommand>) -> DisplayList {
        DisplayList {
            width: 300.0,
            height: 120.5,
            orientation: Orientation::Sinistra,
            header: None,
            staves: Vec::new(),
            commands,
        }
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn test_document_shell() {
        let svg = to_svg(&list(Vec::new())).unwrap();
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains(r#"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="120.5" viewBox="0 0 300 120.5" data-orientation="sinistra">"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_commands_become_elements() {
        let svg = to_svg(&list(vec![
            DrawCommand::Line {
                x1: 0.0,
                y1: 1.0,
                x2: 10.0,
                y2: 1.0,
                stroke_width: 1.0,
                class: "staff-line".to_string(),
            },
            DrawCommand::Ellipse {
                cx: 5.0,
                cy: 5.0,
                rx: 2.0,
                ry: 1.5,
                filled: false,
                class: "notehead".to_string(),
            },
            DrawCommand::Path {
                points: vec![(0.0, 0.0), (1.0, 2.0)],
                closed: false,
                stroke_width: 1.5,
                class: "flag".to_string(),
            },
            DrawCommand::Text {
                x: 1.0,
                y: 2.0,
                text: "Fish & Chips".to_string(),
                size: 12.0,
                anchor: TextAnchor::Middle,
                class: "title".to_string(),
            },
        ]))
        .unwrap();

        assert!(svg.contains(r#"<line class="staff-line" x1="0" y1="1" x2="10" y2="1" stroke="black" stroke-width="1"/>"#));
        assert!(svg.contains(r#"<ellipse class="notehead" cx="5" cy="5" rx="2" ry="1.5" fill="none" stroke="black"/>"#));
        assert!(svg.contains(r#"points="0,0 1,2""#));
        assert!(svg.contains("Fish &amp; Chips"));
        assert!(roxmltree::Document::parse(&svg).is_ok());
    }
}
