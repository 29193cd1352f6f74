//! Query depth guard
//!
//! `User.userSubscribedTo` and `User.subscribedToUser` return users, so a
//! client can nest the subscription graph without end. Each level multiplies
//! the keys handed to the loaders; the guard measures a document before
//! execution and rejects it outright when it nests deeper than allowed.
//!
//! Depth is counted the usual way: fields in an operation's root selection
//! set sit at depth 0 and every nested selection set adds one. Fragment
//! spreads and inline fragments add nothing; their fields are measured as if
//! written in place. Introspection fields (`__schema`, `__type`, ...) are
//! ignored.

use std::collections::HashSet;

use async_graphql::parser::parse_query;
use async_graphql::parser::types::{ExecutableDocument, Selection, SelectionSet};
use async_graphql::{ErrorExtensionValues, Name, Pos, ServerError};

/// Extension code attached to depth violations
pub const DEPTH_LIMIT_CODE: &str = "DEPTH_LIMIT_EXCEEDED";

/// Rejects documents nested deeper than `max_depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthGuard {
    max_depth: usize,
}

impl DepthGuard {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse `query` and check it. A document that does not parse is
    /// reported with the parser's own error.
    pub fn check_source(&self, query: &str) -> Result<(), Vec<ServerError>> {
        let document = parse_query(query).map_err(|err| vec![ServerError::from(err)])?;
        self.check(&document)
    }

    /// Check every operation in `document`, one error per offending operation
    pub fn check(&self, document: &ExecutableDocument) -> Result<(), Vec<ServerError>> {
        let errors: Vec<ServerError> = document
            .operations
            .iter()
            .filter_map(|(name, operation)| {
                let depth = operation_depth(document, &operation.node.selection_set.node);
                (depth > self.max_depth).then(|| self.violation(name, operation.pos))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn violation(&self, operation: Option<&Name>, pos: Pos) -> ServerError {
        let operation = operation.map(Name::as_str).unwrap_or("anonymous");
        let mut error = ServerError::new(
            format!(
                "'{}' exceeds maximum operation depth of {}",
                operation, self.max_depth
            ),
            Some(pos),
        );
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("code", DEPTH_LIMIT_CODE);
        error.extensions = Some(extensions);
        error
    }
}

/// Deepest field depth reached from an operation's root selection set
pub fn operation_depth(document: &ExecutableDocument, root: &SelectionSet) -> usize {
    let mut visiting = HashSet::new();
    selection_depth(document, root, 0, &mut visiting)
}

fn selection_depth<'a>(
    document: &'a ExecutableDocument,
    selection_set: &'a SelectionSet,
    depth: usize,
    visiting: &mut HashSet<&'a str>,
) -> usize {
    let mut deepest = 0;

    for selection in &selection_set.items {
        let reached = match &selection.node {
            Selection::Field(field) => {
                let field = &field.node;
                if field.name.node.starts_with("__") {
                    continue;
                }
                let children = &field.selection_set.node;
                if children.items.is_empty() {
                    depth
                } else {
                    selection_depth(document, children, depth + 1, visiting)
                }
            }
            Selection::InlineFragment(fragment) => {
                selection_depth(document, &fragment.node.selection_set.node, depth, visiting)
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                // Unknown fragments are left for validation to report
                let Some(fragment) = document.fragments.get(&spread.node.fragment_name.node)
                else {
                    continue;
                };
                // A spread already being expanded is a cycle
                if !visiting.insert(name) {
                    continue;
                }
                let reached =
                    selection_depth(document, &fragment.node.selection_set.node, depth, visiting);
                visiting.remove(name);
                reached
            }
        };
        deepest = deepest.max(reached);
    }

    deepest
}
