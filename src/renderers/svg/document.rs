//! SVG document generation

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::elements::{write, write_command};
use super::fmt_num;
use crate::models::Orientation;
use crate::renderers::display_list::DisplayList;
use crate::renderers::RenderError;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialise a display list as a standalone SVG document
pub fn to_svg(list: &DisplayList) -> Result<String, RenderError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = fmt_num(list.width);
    let height = fmt_num(list.height);
    let view_box = format!("0 0 {} {}", width, height);
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NS));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    root.push_attribute((
        "data-orientation",
        match list.orientation {
            Orientation::Dextra => "dextra",
            Orientation::Sinistra => "sinistra",
        },
    ));
    write(&mut writer, Event::Start(root))?;

    let mut background = BytesStart::new("rect");
    background.push_attribute(("width", "100%"));
    background.push_attribute(("height", "100%"));
    background.push_attribute(("fill", "white"));
    write(&mut writer, Event::Empty(background))?;

    for command in &list.commands {
        write_command(&mut writer, command)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("svg")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| RenderError::Svg(e.to_string()))
}
