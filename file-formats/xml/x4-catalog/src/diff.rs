//! Diff patches
//!
//! A fragment whose root tag is `diff` patches the working document instead
//! of being merged into it. Every element child of the root is one
//! directive:
//!
//! ```xml
//! <diff>
//!   <add sel="/wares"><ware id="new"/></add>
//!   <add sel="/wares/ware[@id='x']" type="@tags">economy</add>
//!   <add sel="/wares/ware[@id='x']" pos="before"><ware id="w"/></add>
//!   <replace sel="/wares/ware[@id='x']/@price">20</replace>
//!   <remove sel="/wares/ware[@id='old']"/>
//! </diff>
//! ```
//!
//! A directive with `silent="true"` is skipped when its selector matches
//! nothing, every other directive fails with
//! [`Error::SelectorNotFound`].

use crate::document::{WorkingDocument, import_nodes, text_content};
use crate::error::{Error, Result};
use crate::selector;
use std::fmt;
use sxd_document::dom::{ChildOfElement, Document, Element, ParentOfChild};
use sxd_xpath::nodeset::Node;

/// Root tag identifying a diff fragment
pub const DIFF_TAG: &str = "diff";

/// Where `add` places its content relative to the selected node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// After the last child of the selected element
    #[default]
    Append,
    /// Before the first child of the selected element
    Prepend,
    /// As preceding siblings of the selected element
    Before,
    /// As following siblings of the selected element
    After,
}

impl Position {
    /// Parse the `pos` attribute, `None` for unknown values
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("append") => Some(Position::Append),
            Some("prepend") => Some(Position::Prepend),
            Some("before") => Some(Position::Before),
            Some("after") => Some(Position::After),
            Some(_) => None,
        }
    }
}

/// One directive of a diff fragment
///
/// Content is borrowed from the parsed diff fragment and copied into the
/// working document when the directive is applied.
pub enum DiffOperation<'s> {
    /// Insert the content nodes, or create an attribute
    Add {
        /// Target selector
        selector: String,
        /// Placement of the content nodes
        position: Position,
        /// Attribute to create instead of inserting nodes (`type="@name"`)
        attribute: Option<String>,
        /// The directive element, whose children are the content
        content: Element<'s>,
        /// Skip instead of failing when nothing matches
        silent: bool,
    },
    /// Swap the selected node for the content
    Replace {
        /// Target selector
        selector: String,
        /// The directive element, whose children are the content
        content: Element<'s>,
        /// Skip instead of failing when nothing matches
        silent: bool,
    },
    /// Delete the selected node
    Remove {
        /// Target selector
        selector: String,
        /// Skip instead of failing when nothing matches
        silent: bool,
    },
}

impl<'s> DiffOperation<'s> {
    /// Interpret one child element of a `diff` root
    pub fn parse(directive: Element<'s>, file: &str) -> Result<Self> {
        let tag = directive.name().local_part();
        if !matches!(tag, "add" | "replace" | "remove") {
            return Err(Error::UnsupportedDirective {
                file: file.to_string(),
                directive: format!("<{tag}>"),
            });
        }

        let selector = directive
            .attribute_value("sel")
            .ok_or_else(|| Error::MissingSelector {
                file: file.to_string(),
                directive: tag.to_string(),
            })?
            .to_string();
        let silent = matches!(directive.attribute_value("silent"), Some("true" | "1"));

        Ok(match tag {
            "add" => {
                let pos = directive.attribute_value("pos");
                let position = Position::parse(pos).ok_or_else(|| Error::UnsupportedDirective {
                    file: file.to_string(),
                    directive: format!("<add pos=\"{}\">", pos.unwrap_or_default()),
                })?;

                let attribute = match directive.attribute_value("type") {
                    None => None,
                    Some(kind) => match kind.strip_prefix('@') {
                        Some(name) if !name.is_empty() => Some(name.to_string()),
                        _ => {
                            return Err(Error::UnsupportedDirective {
                                file: file.to_string(),
                                directive: format!("<add type=\"{kind}\">"),
                            });
                        }
                    },
                };

                DiffOperation::Add {
                    selector,
                    position,
                    attribute,
                    content: directive,
                    silent,
                }
            }
            "replace" => DiffOperation::Replace {
                selector,
                content: directive,
                silent,
            },
            _ => DiffOperation::Remove { selector, silent },
        })
    }

    /// Directive tag
    pub fn kind(&self) -> &'static str {
        match self {
            DiffOperation::Add { .. } => "add",
            DiffOperation::Replace { .. } => "replace",
            DiffOperation::Remove { .. } => "remove",
        }
    }

    /// Target selector
    pub fn selector(&self) -> &str {
        match self {
            DiffOperation::Add { selector, .. }
            | DiffOperation::Replace { selector, .. }
            | DiffOperation::Remove { selector, .. } => selector,
        }
    }

    /// Check if a missing target is tolerated
    pub fn is_silent(&self) -> bool {
        match self {
            DiffOperation::Add { silent, .. }
            | DiffOperation::Replace { silent, .. }
            | DiffOperation::Remove { silent, .. } => *silent,
        }
    }

    /// Apply the directive to the working document
    pub fn apply(&self, document: &mut WorkingDocument, file: &str) -> Result<()> {
        let doc = document.document();
        let target = match selector::select_first(&doc, self.selector(), file) {
            Ok(target) => target,
            Err(Error::SelectorNotFound { .. }) if self.is_silent() => {
                log::debug!("{file}: silent {} skipped, nothing matches {}", self.kind(), self.selector());
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let patch = Patch {
            doc: &doc,
            file,
            selector: self.selector(),
        };
        match self {
            DiffOperation::Add {
                position,
                attribute: Some(name),
                content,
                ..
            } => {
                if *position != Position::Append {
                    log::debug!("{file}: pos ignored for attribute add on {}", self.selector());
                }
                patch.add_attribute(target, name, *content)
            }
            DiffOperation::Add {
                position,
                attribute: None,
                content,
                ..
            } => patch.add_nodes(target, *position, *content),
            DiffOperation::Replace { content, .. } => patch.replace(target, *content),
            DiffOperation::Remove { .. } => patch.remove(target),
        }
    }
}

impl fmt::Debug for DiffOperation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DiffOperation");
        s.field("kind", &self.kind())
            .field("selector", &self.selector());
        if let DiffOperation::Add {
            position,
            attribute,
            ..
        } = self
        {
            s.field("position", position).field("attribute", attribute);
        }
        s.field("silent", &self.is_silent()).finish()
    }
}

/// Mutations of one directive against the working document
struct Patch<'a, 'd> {
    doc: &'a Document<'d>,
    file: &'a str,
    selector: &'a str,
}

impl<'d> Patch<'_, 'd> {
    fn invalid(&self, message: &str) -> Error {
        Error::invalid_target(self.file, self.selector, message)
    }

    /// The selected node as an element that may be edited
    fn element(&self, target: Node<'d>) -> Result<Element<'d>> {
        match target {
            Node::Element(element) => Ok(element),
            _ => Err(self.invalid("target is not an element")),
        }
    }

    /// The element holding the selected element as a child
    ///
    /// Sections hang off the synthetic root, which itself cannot be a
    /// sibling or be replaced.
    fn parent(&self, element: Element<'d>) -> Result<Element<'d>> {
        match element.parent() {
            Some(ParentOfChild::Element(parent)) => Ok(parent),
            _ => Err(self.invalid("the document root cannot be modified")),
        }
    }

    fn add_attribute(&self, target: Node<'d>, name: &str, content: Element<'_>) -> Result<()> {
        let element = self.element(target)?;
        element.set_attribute_value(name, &text_content(content));
        Ok(())
    }

    fn add_nodes(&self, target: Node<'d>, position: Position, content: Element<'_>) -> Result<()> {
        let element = self.element(target)?;
        let nodes = import_nodes(self.doc, content);

        match position {
            Position::Append | Position::Prepend => {
                if matches!(element.parent(), Some(ParentOfChild::Root(_))) {
                    return Err(self.invalid("sections cannot be added through a diff"));
                }
                if position == Position::Append {
                    for node in nodes {
                        element.append_child(node);
                    }
                } else {
                    let existing = element.children();
                    rebuild(element, nodes.into_iter().chain(existing));
                }
            }
            Position::Before | Position::After => {
                let parent = self.parent(element)?;
                if matches!(parent.parent(), Some(ParentOfChild::Root(_))) {
                    return Err(self.invalid("sections cannot be added through a diff"));
                }
                let anchor = ChildOfElement::Element(element);
                let mut children = Vec::new();
                for child in parent.children() {
                    if child == anchor {
                        if position == Position::After {
                            children.push(child);
                        }
                        children.extend(nodes.iter().copied());
                        if position == Position::Before {
                            children.push(child);
                        }
                    } else {
                        children.push(child);
                    }
                }
                rebuild(parent, children);
            }
        }
        Ok(())
    }

    fn replace(&self, target: Node<'d>, content: Element<'_>) -> Result<()> {
        match target {
            Node::Element(element) => {
                let parent = self.parent(element)?;
                let nodes = import_nodes(self.doc, content);
                if matches!(parent.parent(), Some(ParentOfChild::Root(_))) {
                    let tag = element.name().local_part();
                    let same_tag = matches!(
                        nodes.as_slice(),
                        [ChildOfElement::Element(section)] if section.name().local_part() == tag
                    );
                    if !same_tag {
                        return Err(self.invalid(
                            "a section can only be replaced by one element with the same tag",
                        ));
                    }
                }
                splice(parent, ChildOfElement::Element(element), nodes);
                Ok(())
            }
            Node::Attribute(attribute) => {
                let owner = attribute
                    .parent()
                    .ok_or_else(|| self.invalid("attribute is detached"))?;
                owner.set_attribute_value(attribute.name(), &text_content(content));
                Ok(())
            }
            Node::Text(text) => {
                text.set_text(&text_content(content));
                Ok(())
            }
            _ => Err(self.invalid("only elements, attributes and text can be replaced")),
        }
    }

    fn remove(&self, target: Node<'d>) -> Result<()> {
        match target {
            Node::Element(element) => {
                let parent = self.parent(element)?;
                splice(parent, ChildOfElement::Element(element), Vec::new());
            }
            Node::Attribute(attribute) => {
                let owner = attribute
                    .parent()
                    .ok_or_else(|| self.invalid("attribute is detached"))?;
                owner.remove_attribute(attribute.name());
            }
            Node::Text(text) => {
                let parent = text
                    .parent()
                    .ok_or_else(|| self.invalid("text is detached"))?;
                splice(parent, ChildOfElement::Text(text), Vec::new());
            }
            Node::Comment(comment) => match comment.parent() {
                Some(ParentOfChild::Element(parent)) => {
                    splice(parent, ChildOfElement::Comment(comment), Vec::new());
                }
                _ => return Err(self.invalid("comment is outside the catalog")),
            },
            _ => return Err(self.invalid("node kind cannot be removed")),
        }
        Ok(())
    }
}

/// Swap `target` among the children of `parent` for `replacement`
fn splice<'d>(parent: Element<'d>, target: ChildOfElement<'d>, replacement: Vec<ChildOfElement<'d>>) {
    let mut children = Vec::new();
    for child in parent.children() {
        if child == target {
            children.extend(replacement.iter().copied());
        } else {
            children.push(child);
        }
    }
    rebuild(parent, children);
}

/// Replace the child list of `parent`, keeping detached nodes alive
fn rebuild<'d, I>(parent: Element<'d>, children: I)
where
    I: IntoIterator<Item = ChildOfElement<'d>>,
{
    parent.clear_children();
    for child in children {
        parent.append_child(child);
    }
}
