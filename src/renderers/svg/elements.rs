//! SVG element rendering
//!
//! One XML element per display list command.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::fmt_num;
use crate::renderers::display_list::DrawCommand;
use crate::renderers::RenderError;

pub(super) fn write_command<W: std::io::Write>(
    writer: &mut Writer<W>,
    command: &DrawCommand,
) -> Result<(), RenderError> {
    match command {
        DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            class,
        } => {
            let mut el = BytesStart::new("line");
            el.push_attribute(("class", class.as_str()));
            push_num(&mut el, "x1", *x1);
            push_num(&mut el, "y1", *y1);
            push_num(&mut el, "x2", *x2);
            push_num(&mut el, "y2", *y2);
            el.push_attribute(("stroke", "black"));
            push_num(&mut el, "stroke-width", *stroke_width);
            write(writer, Event::Empty(el))
        }
        DrawCommand::Rect {
            x,
            y,
            width,
            height,
            filled,
            class,
        } => {
            let mut el = BytesStart::new("rect");
            el.push_attribute(("class", class.as_str()));
            push_num(&mut el, "x", *x);
            push_num(&mut el, "y", *y);
            push_num(&mut el, "width", *width);
            push_num(&mut el, "height", *height);
            push_fill(&mut el, *filled);
            write(writer, Event::Empty(el))
        }
        DrawCommand::Ellipse {
            cx,
            cy,
            rx,
            ry,
            filled,
            class,
        } => {
            let mut el = BytesStart::new("ellipse");
            el.push_attribute(("class", class.as_str()));
            push_num(&mut el, "cx", *cx);
            push_num(&mut el, "cy", *cy);
            push_num(&mut el, "rx", *rx);
            push_num(&mut el, "ry", *ry);
            push_fill(&mut el, *filled);
            write(writer, Event::Empty(el))
        }
        DrawCommand::Path {
            points,
            closed,
            stroke_width,
            class,
        } => {
            let points = points
                .iter()
                .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            let mut el = BytesStart::new(if *closed { "polygon" } else { "polyline" });
            el.push_attribute(("class", class.as_str()));
            el.push_attribute(("points", points.as_str()));
            if *closed {
                el.push_attribute(("fill", "black"));
            } else {
                el.push_attribute(("fill", "none"));
                el.push_attribute(("stroke", "black"));
                push_num(&mut el, "stroke-width", *stroke_width);
            }
            write(writer, Event::Empty(el))
        }
        DrawCommand::Text {
            x,
            y,
            text,
            size,
            anchor,
            class,
        } => {
            let mut el = BytesStart::new("text");
            el.push_attribute(("class", class.as_str()));
            push_num(&mut el, "x", *x);
            push_num(&mut el, "y", *y);
            push_num(&mut el, "font-size", *size);
            el.push_attribute(("text-anchor", anchor.as_svg()));
            write(writer, Event::Start(el))?;
            write(writer, Event::Text(BytesText::new(text)))?;
            write(writer, Event::End(BytesEnd::new("text")))
        }
    }
}

fn push_num(el: &mut BytesStart, name: &str, value: f32) {
    el.push_attribute((name, fmt_num(value).as_str()));
}

fn push_fill(el: &mut BytesStart, filled: bool) {
    if filled {
        el.push_attribute(("fill", "black"));
    } else {
        el.push_attribute(("fill", "none"));
        el.push_attribute(("stroke", "black"));
    }
}

pub(super) fn write<W: std::io::Write>(writer: &mut Writer<W>, event: Event) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError::Svg(e.to_string()))
}
