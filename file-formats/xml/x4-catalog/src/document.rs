//! The merged working document
//!
//! All fragments end up below one synthetic root element. Each direct child
//! of that root is a *section*, named after the root tag of the first
//! fragment that contributed it (`wares`, `jobs`, `ships`, ...). Sections
//! keep first-seen order and there is at most one section per tag.

use crate::error::Result;
use crate::selector;
use std::fmt;
use std::io::{self, Write};
use sxd_document::Package;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, Element};

/// Tag of the synthetic root element holding every section
pub const ROOT_TAG: &str = "catalog";

/// The single XML tree all fragments are merged into
pub struct WorkingDocument {
    package: Package,
}

impl WorkingDocument {
    /// Create an empty document holding only the synthetic root
    pub fn new() -> Self {
        let package = Package::new();
        {
            let doc = package.as_document();
            catalog_root(&doc);
        }
        Self { package }
    }

    pub(crate) fn document(&self) -> Document<'_> {
        self.package.as_document()
    }

    /// Get the top-level section with the given tag
    pub fn section(&self, tag: &str) -> Option<Element<'_>> {
        let doc = self.document();
        find_section(catalog_root(&doc), tag)
    }

    /// Tags of all sections in first-seen order
    pub fn section_names(&self) -> Vec<String> {
        let doc = self.document();
        element_children(catalog_root(&doc))
            .map(|section| section.name().local_part().to_string())
            .collect()
    }

    /// Number of element children of a section, `None` if it does not exist
    pub fn section_child_count(&self, tag: &str) -> Option<usize> {
        self.section(tag)
            .map(|section| element_children(section).count())
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        let doc = self.document();
        element_children(catalog_root(&doc)).count()
    }

    /// Check if no fragment has been merged yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge a plain fragment
    ///
    /// If a section with the fragment's root tag exists, the fragment root's
    /// children are appended to it. Otherwise a copy of the fragment root
    /// becomes a new section at the end. Whitespace-only text is dropped.
    pub fn merge_fragment(&mut self, fragment: Element<'_>) {
        let doc = self.document();
        let root = catalog_root(&doc);
        let tag = fragment.name().local_part();

        match find_section(root, tag) {
            Some(section) => {
                log::debug!("Appending to existing section <{tag}>");
                import_children(&doc, section, fragment);
            }
            None => {
                log::debug!("Adding section <{tag}>");
                root.append_child(import_element(&doc, fragment));
            }
        }
    }

    /// Evaluate a selector and return the string value of each match
    ///
    /// Selectors are anchored the same way diff selectors are, so
    /// `/wares/ware/@id` addresses the `wares` section directly.
    pub fn select(&self, selector: &str) -> Result<Vec<String>> {
        let doc = self.document();
        let nodes = selector::select(&doc, selector, "<query>")?;
        Ok(nodes.iter().map(|node| node.string_value()).collect())
    }

    /// Serialize the document
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        sxd_document::writer::format_document(&self.document(), writer)
    }

    /// Serialize the document into a string
    pub fn to_xml_string(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = self.write_to(&mut buffer) {
            log::error!("Failed to serialize working document: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for WorkingDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WorkingDocument {
    /// Deep-copy every section into a fresh document
    fn clone(&self) -> Self {
        let copy = Self::new();
        {
            let source = self.document();
            let target = copy.document();
            let root = catalog_root(&target);
            for section in element_children(catalog_root(&source)) {
                root.append_child(import_element(&target, section));
            }
        }
        copy
    }
}

impl fmt::Debug for WorkingDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingDocument")
            .field("sections", &self.section_names())
            .finish()
    }
}

/// Get the synthetic root element, creating it if the document has none
pub(crate) fn catalog_root<'d>(doc: &Document<'d>) -> Element<'d> {
    let root = doc.root();
    for child in root.children() {
        if let ChildOfRoot::Element(element) = child {
            return element;
        }
    }

    let element = doc.create_element(ROOT_TAG);
    root.append_child(element);
    element
}

fn find_section<'d>(root: Element<'d>, tag: &str) -> Option<Element<'d>> {
    element_children(root).find(|section| section.name().local_part() == tag)
}

/// Iterate over the element children of a node, skipping text and comments
pub(crate) fn element_children<'d>(element: Element<'d>) -> impl Iterator<Item = Element<'d>> {
    element.children().into_iter().filter_map(|child| match child {
        ChildOfElement::Element(e) => Some(e),
        _ => None,
    })
}

/// Concatenated text directly below an element, trimmed
pub(crate) fn text_content(element: Element<'_>) -> String {
    let text: String = element
        .children()
        .into_iter()
        .filter_map(|child| match child {
            ChildOfElement::Text(t) => Some(t.text()),
            _ => None,
        })
        .collect();
    text.trim().to_string()
}

/// Deep-copy an element from another document into `doc`
pub(crate) fn import_element<'d>(doc: &Document<'d>, source: Element<'_>) -> Element<'d> {
    let element = doc.create_element(source.name().local_part());
    for attribute in source.attributes() {
        element.set_attribute_value(attribute.name().local_part(), attribute.value());
    }
    import_children(doc, element, source);
    element
}

/// Deep-copy the children of `source` to the end of `target`
pub(crate) fn import_children<'d>(doc: &Document<'d>, target: Element<'d>, source: Element<'_>) {
    for node in import_nodes(doc, source) {
        target.append_child(node);
    }
}

/// Deep-copy the children of `source` into `doc` without attaching them
pub(crate) fn import_nodes<'d>(doc: &Document<'d>, source: Element<'_>) -> Vec<ChildOfElement<'d>> {
    source
        .children()
        .into_iter()
        .filter_map(|child| import_child(doc, child))
        .collect()
}

fn import_child<'d>(doc: &Document<'d>, child: ChildOfElement<'_>) -> Option<ChildOfElement<'d>> {
    match child {
        ChildOfElement::Element(e) => Some(ChildOfElement::Element(import_element(doc, e))),
        ChildOfElement::Text(t) if !t.text().trim().is_empty() => {
            Some(ChildOfElement::Text(doc.create_text(t.text())))
        }
        ChildOfElement::Comment(c) => Some(ChildOfElement::Comment(doc.create_comment(c.text()))),
        _ => None,
    }
}
