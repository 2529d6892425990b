//! SigmaStudio XML export parsing
//!
//! Records are produced in three passes over the document, each in document
//! order: the `Program` named "Program Data", every `Register` named "Param",
//! then every `ModuleParameter` of every `Module`. Elements are matched at any
//! depth.

use roxmltree::{Document, Node};

use super::error::{SourceError, SourceResult};
use super::record::Record;

/// Name of the `Program` element holding program memory
const PROGRAM_DATA: &str = "Program Data";

/// Name of the `Register` elements holding parameter memory
const PARAM_REGISTER: &str = "Param";

/// Extract all records from an XML document
pub fn parse_document(text: &str) -> SourceResult<Vec<Record>> {
    let document = Document::parse(text)?;
    let root = document.root_element();
    let mut records = Vec::new();

    for program in elements(root, "Program") {
        if child_text(program, "Program", "Name")? == PROGRAM_DATA {
            records.push(data_record(program, "Program")?);
        }
    }

    for register in elements(root, "Register") {
        if child_text(register, "Register", "Name")? == PARAM_REGISTER {
            records.push(data_record(register, "Register")?);
        }
    }

    for module in elements(root, "Module") {
        let cell = required_name(module, "Module", "CellName")?;
        for parameter in elements(module, "ModuleParameter") {
            records.push(control_record(parameter, cell)?);
        }
    }

    Ok(records)
}

/// Decode a comma-separated list of hexadecimal bytes
///
/// Entries may carry a `0x` prefix; empty entries (a trailing comma, blank
/// lines) are skipped.
pub fn parse_hex_list(text: &str, element: &'static str) -> SourceResult<Vec<u8>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let digits = entry
                .strip_prefix("0x")
                .or_else(|| entry.strip_prefix("0X"))
                .unwrap_or(entry);
            u8::from_str_radix(digits, 16).map_err(|_| SourceError::InvalidHexByte {
                element,
                value: entry.to_string(),
            })
        })
        .collect()
}

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    element: &'static str,
    name: &'static str,
) -> SourceResult<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.has_tag_name(name))
        .ok_or(SourceError::MissingElement {
            element,
            child: name,
        })
}

fn child_text<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    name: &'static str,
) -> SourceResult<&'a str> {
    Ok(child(node, element, name)?.text().unwrap_or(""))
}

fn required_name<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    name: &'static str,
) -> SourceResult<&'a str> {
    let text = child_text(node, element, name)?;
    if text.trim().is_empty() {
        return Err(SourceError::EmptyField {
            element,
            field: name,
        });
    }
    Ok(text)
}

fn integer(node: Node<'_, '_>, element: &'static str, field: &'static str) -> SourceResult<u64> {
    let text = child_text(node, element, field)?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| SourceError::InvalidInteger {
            element,
            field,
            value: text.to_string(),
        })
}

fn integer_u16(node: Node<'_, '_>, element: &'static str, field: &'static str) -> SourceResult<u16> {
    let value = integer(node, element, field)?;
    u16::try_from(value).map_err(|_| SourceError::OutOfRange {
        element,
        field,
        value,
        max: u64::from(u16::MAX),
    })
}

fn data_record(node: Node<'_, '_>, element: &'static str) -> SourceResult<Record> {
    let address = integer_u16(node, element, "Address")?;
    let declared = integer(node, element, "Size")?;
    let bytes = parse_hex_list(child_text(node, element, "Data")?, element)?;

    if declared != bytes.len() as u64 {
        return Err(SourceError::SizeMismatch {
            element,
            declared: usize::try_from(declared).unwrap_or(usize::MAX),
            actual: bytes.len(),
        });
    }

    Ok(Record::data(address, bytes))
}

fn control_record(node: Node<'_, '_>, module: &str) -> SourceResult<Record> {
    const ELEMENT: &str = "ModuleParameter";

    let parameter = required_name(node, ELEMENT, "Name")?;
    let address = integer_u16(node, ELEMENT, "Address")?;
    let length = integer_u16(node, ELEMENT, "Size")?;

    if !module.is_ascii() || !parameter.is_ascii() {
        return Err(SourceError::NonAsciiName {
            name: format!("{module} {parameter}"),
        });
    }

    Ok(Record::control(module, parameter, address, length))
}
