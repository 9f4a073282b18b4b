// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Expression Translator
//!
//! Renders the query AST as a boolean query string for text+geo search
//! services, and a sort spec as a sort expression.
//!
//! # Syntax
//!
//! ```text
//! field:value                                   - Term match
//! (field:two AND field:words)                   - Every word must occur
//! distance(location, geopoint(lat, lon)) < r    - Geo radius
//! (q1 AND q2)                                   - Conjunction
//! (q1 OR q2)                                    - Disjunction
//! ```

use super::query_builder::{
    DistanceQuery, Query, QueryNode, SortDirection, SortExpression, SortSpec, TermQuery,
};

/// Query expression translator
pub struct ExpressionTranslator;

impl ExpressionTranslator {
    /// Translate Query AST to a boolean expression string
    pub fn translate(query: &Query) -> String {
        Self::translate_node(&query.root)
    }

    /// Translate a sort spec to a sort expression string
    pub fn translate_sort(sort: &SortSpec) -> String {
        let expression = match &sort.expression {
            SortExpression::Distance { field, origin } => {
                Self::distance_expr(field, origin.latitude, origin.longitude)
            }
        };
        let direction = match sort.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("{} {} DEFAULT {}", expression, direction, sort.default_value)
    }

    fn translate_node(node: &QueryNode) -> String {
        match node {
            QueryNode::Term(term) => Self::translate_term(term),
            QueryNode::Distance(distance) => Self::translate_distance(distance),
            QueryNode::And(nodes) => Self::join(nodes, " AND "),
            QueryNode::Or(nodes) => Self::join(nodes, " OR "),
        }
    }

    fn join(nodes: &[QueryNode], operator: &str) -> String {
        let parts: Vec<String> = nodes.iter().map(Self::translate_node).collect();
        if parts.len() == 1 {
            parts[0].clone()
        } else {
            format!("({})", parts.join(operator))
        }
    }

    fn translate_term(term: &TermQuery) -> String {
        let words: Vec<String> = term
            .value
            .split_whitespace()
            .map(|word| format!("{}:{}", term.field, Self::escape_value(word)))
            .collect();
        match words.len() {
            0 => format!("{}:\"\"", term.field),
            1 => words[0].clone(),
            _ => format!("({})", words.join(" AND ")),
        }
    }

    fn translate_distance(distance: &DistanceQuery) -> String {
        format!(
            "{} < {}",
            Self::distance_expr(
                &distance.field,
                distance.origin.latitude,
                distance.origin.longitude,
            ),
            distance.radius
        )
    }

    fn distance_expr(field: &str, latitude: f64, longitude: f64) -> String {
        format!("distance({}, geopoint({:.6}, {:.6}))", field, latitude, longitude)
    }

    /// Escape characters with meaning in the expression grammar
    fn escape_value(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '"' | '\\' | ':' | '(' | ')' | '<' | '>' | '=' | '~' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
