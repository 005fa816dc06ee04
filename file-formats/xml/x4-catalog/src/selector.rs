//! Diff selectors
//!
//! Selectors are XPath 1.0 expressions written against the merged sections,
//! as if each section were a document of its own. Every absolute location
//! path is rewritten to start below the synthetic root element, wherever it
//! appears: in each branch of a union, inside parentheses, function
//! arguments and predicates. Relative paths at the top level are evaluated
//! from the synthetic root, relative paths inside predicates keep their
//! usual context.

use crate::document::ROOT_TAG;
use crate::error::{Error, Result};
use sxd_document::dom::Document;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

/// Node tests that look like function calls
const NODE_TYPES: &[&str] = &["comment", "node", "processing-instruction", "text"];

/// Rewrite a selector so it is evaluated against the synthetic root
///
/// # Examples
///
/// ```
/// use x4_catalog::selector::anchor;
///
/// assert_eq!(anchor("/wares/ware"), "/catalog/wares/ware");
/// assert_eq!(anchor("//ware"), "/catalog//ware");
/// assert_eq!(anchor("wares"), "/catalog/wares");
/// assert_eq!(anchor("/"), "/catalog");
/// assert_eq!(
///     anchor("/wares/ware | /jobs/job"),
///     "/catalog/wares/ware | /catalog/jobs/job"
/// );
/// assert_eq!(anchor("(/wares/ware)[1]"), "(/catalog/wares/ware)[1]");
/// ```
pub fn anchor(selector: &str) -> String {
    let chars: Vec<char> = selector.trim().chars().collect();
    let mut anchored = String::with_capacity(chars.len() + 2 * ROOT_TAG.len());
    let mut quote = None;
    let mut predicates = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        if let Some(open) = quote {
            if c == open {
                quote = None;
            }
            anchored.push(c);
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '[' => predicates += 1,
            ']' => predicates = predicates.saturating_sub(1),
            '/' if starts_operand(&anchored, "|([,=<>") => {
                anchored.push('/');
                anchored.push_str(ROOT_TAG);
                if stands_alone(&chars[i + 1..]) {
                    continue;
                }
            }
            _ if predicates == 0
                && starts_operand(&anchored, "|(")
                && is_relative_path(&chars[i..]) =>
            {
                anchored.push('/');
                anchored.push_str(ROOT_TAG);
                anchored.push('/');
            }
            _ => {}
        }
        anchored.push(c);
    }

    if anchored.is_empty() {
        anchored = format!("/{ROOT_TAG}");
    }
    anchored
}

/// Check if the next character begins an operand
///
/// That is the case at the start and right after one of `openers`.
fn starts_operand(anchored: &str, openers: &str) -> bool {
    anchored
        .trim_end()
        .chars()
        .next_back()
        .is_none_or(|c| openers.contains(c))
}

/// Check if a `/` is the root on its own rather than the start of a path
fn stands_alone(rest: &[char]) -> bool {
    rest.iter()
        .find(|c| !c.is_whitespace())
        .is_none_or(|c| "|)],=<>!".contains(*c))
}

/// Check if `rest` starts with a relative location path
fn is_relative_path(rest: &[char]) -> bool {
    match rest {
        ['@' | '*', ..] => true,
        ['.', next, ..] => !next.is_ascii_digit(),
        ['.'] => true,
        [c, ..] if c.is_alphabetic() || *c == '_' => {
            let len = rest
                .iter()
                .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
                .count();
            let name: String = rest[..len].iter().collect();
            let calls = rest[len..]
                .iter()
                .find(|c| !c.is_whitespace())
                .is_some_and(|c| *c == '(');
            let test = name.rsplit("::").next().unwrap_or(&name);
            !calls || NODE_TYPES.contains(&test)
        }
        _ => false,
    }
}

/// Evaluate a selector, returning all matches in document order
pub fn select<'d>(doc: &Document<'d>, selector: &str, file: &str) -> Result<Vec<Node<'d>>> {
    let invalid = |message: String| Error::InvalidSelector {
        file: file.to_string(),
        selector: selector.to_string(),
        message,
    };

    let anchored = anchor(selector);
    let xpath = match Factory::new().build(&anchored) {
        Ok(Some(xpath)) => xpath,
        Ok(None) => return Err(invalid("empty expression".to_string())),
        Err(e) => return Err(invalid(format!("{e:?}"))),
    };

    let context = Context::new();
    match xpath.evaluate(&context, doc.root()) {
        Ok(Value::Nodeset(nodes)) => Ok(nodes.document_order()),
        Ok(_) => Err(invalid("expression does not select nodes".to_string())),
        Err(e) => Err(invalid(format!("{e:?}"))),
    }
}

/// Evaluate a selector and return its first match in document order
pub fn select_first<'d>(doc: &Document<'d>, selector: &str, file: &str) -> Result<Node<'d>> {
    let nodes = select(doc, selector, file)?;
    if nodes.len() > 1 {
        log::debug!(
            "{file}: {selector} matches {} nodes, using the first",
            nodes.len()
        );
    }

    nodes
        .into_iter()
        .next()
        .ok_or_else(|| Error::SelectorNotFound {
            file: file.to_string(),
            selector: selector.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WorkingDocument;
    use sxd_document::dom::ChildOfRoot;
    use sxd_document::parser;

    fn working(fragments: &[&str]) -> WorkingDocument {
        let mut document = WorkingDocument::new();
        for xml in fragments {
            let package = parser::parse(xml).unwrap();
            let fragment = package.as_document();
            let root = fragment
                .root()
                .children()
                .into_iter()
                .find_map(|c| match c {
                    ChildOfRoot::Element(e) => Some(e),
                    _ => None,
                })
                .unwrap();
            document.merge_fragment(root);
        }
        document
    }

    #[test]
    fn test_anchor_trims_whitespace() {
        assert_eq!(anchor("  /jobs/job "), "/catalog/jobs/job");
        assert_eq!(anchor(""), "/catalog");
    }

    #[test]
    fn test_anchor_every_path() {
        assert_eq!(
            anchor("wares/ware | jobs"),
            "/catalog/wares/ware | /catalog/jobs"
        );
        assert_eq!(
            anchor("(/wares/ware | /jobs/job)[last()]"),
            "(/catalog/wares/ware | /catalog/jobs/job)[last()]"
        );
        assert_eq!(
            anchor("/wares/ware[@id = /jobs/job/@ware]"),
            "/catalog/wares/ware[@id = /catalog/jobs/job/@ware]"
        );
        assert_eq!(
            anchor("/wares/ware[@id='a | (/b']"),
            "/catalog/wares/ware[@id='a | (/b']"
        );
        assert_eq!(anchor("count(/wares/ware)"), "count(/catalog/wares/ware)");
        assert_eq!(anchor("/wares/comment()"), "/catalog/wares/comment()");
        assert_eq!(anchor("text()"), "/catalog/text()");
        assert_eq!(anchor("@id | /"), "/catalog/@id | /catalog");
    }

    #[test]
    fn test_select_union_and_parentheses() {
        let document = working(&[
            "<wares><ware id=\"x\"/><ware id=\"y\"/></wares>",
            "<jobs><job id=\"j\"/></jobs>",
        ]);
        let doc = document.document();

        let ids: Vec<_> = select(&doc, "/jobs/job/@id | /wares/ware/@id", "test.xml")
            .unwrap()
            .iter()
            .map(|node| node.string_value())
            .collect();
        assert_eq!(ids, vec!["x", "y", "j"]);

        let node = select_first(&doc, "(/wares/ware)[2]/@id", "test.xml").unwrap();
        assert_eq!(node.string_value(), "y");
    }

    #[test]
    fn test_select_first_in_document_order() {
        let document = working(&[
            "<wares><ware id=\"x\"/><ware id=\"y\"/></wares>",
            "<jobs><job id=\"j\"/></jobs>",
        ]);
        let doc = document.document();

        let node = select_first(&doc, "/wares/ware", "test.xml").unwrap();
        match node {
            Node::Element(e) => assert_eq!(e.attribute_value("id"), Some("x")),
            other => panic!("unexpected node {other:?}"),
        }

        let node = select_first(&doc, "//job/@id", "test.xml").unwrap();
        assert_eq!(node.string_value(), "j");
    }

    #[test]
    fn test_select_not_found() {
        let document = working(&["<wares><ware id=\"x\"/></wares>"]);
        let doc = document.document();

        let err = select_first(&doc, "/wares/ware[@id='nope']", "patch.xml").unwrap_err();
        match err {
            Error::SelectorNotFound { file, selector } => {
                assert_eq!(file, "patch.xml");
                assert_eq!(selector, "/wares/ware[@id='nope']");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_select_invalid() {
        let document = working(&["<wares/>"]);
        let doc = document.document();

        let err = select(&doc, "/wares/ware[", "patch.xml").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));

        let err = select(&doc, "count(/wares)", "patch.xml").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }
}
