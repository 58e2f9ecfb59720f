//! Loading the externally produced XML syntax tree into an `Ast`, and
//! serializing subtrees back to XML for diagnostics.

use crate::ast::{Ast, NodeId};
use crate::error::{ErrorKind, Result, TranspileError};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Parse an XML document into an arena tree
pub fn parse_document(xml: &str) -> Result<Ast> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut ast = Ast::new();
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let id = open_element(&mut ast, e)?;
                attach(&mut ast, &stack, id)?;
                stack.push(id);
            }
            Event::Empty(ref e) => {
                let id = open_element(&mut ast, e)?;
                attach(&mut ast, &stack, id)?;
            }
            Event::Text(ref e) => {
                if let Some(&current) = stack.last() {
                    let text = e.unescape()?;
                    ast.set_text(current, &text);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if ast.root().is_none() {
        return Err(TranspileError::new(
            ErrorKind::EmptyDocument,
            "document has no root element",
        ));
    }

    Ok(ast)
}

fn open_element(ast: &mut Ast, e: &BytesStart<'_>) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let id = ast.new_node(tag);

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        ast.set_attr(id, &key, &value);
    }

    Ok(id)
}

fn attach(ast: &mut Ast, stack: &[NodeId], id: NodeId) -> Result<()> {
    match stack.last() {
        Some(&parent) => ast.append_child(parent, id),
        None if ast.root().is_none() => ast.set_root(id),
        None => {
            return Err(TranspileError::new(
                ErrorKind::XmlSyntax,
                format!("second root element <{}>", ast.tag(id)),
            )
            .with_note("a syntax tree has exactly one root node"))
        }
    }
    Ok(())
}

/// Serialize a subtree as compact XML.
///
/// Parent links are not part of the serialized form.
pub fn node_to_string(ast: &Ast, id: NodeId) -> String {
    let mut writer = Writer::new(Vec::new());
    match write_node(ast, id, &mut writer) {
        Ok(()) => String::from_utf8_lossy(&writer.into_inner()).into_owned(),
        Err(_) => format!("<{}/>", ast.tag(id)),
    }
}

fn write_node(ast: &Ast, id: NodeId, writer: &mut Writer<Vec<u8>>) -> quick_xml::Result<()> {
    let node = ast.node(id);
    let mut start = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !node.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&node.text)))?;
    }
    for &child in &node.children {
        write_node(ast, child, writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
