//! Edges: relations between two nodes.
//!
//! Edges are immutable values. Changing the look or direction of an edge
//! produces a new [`Edge`] through [`Edge::with_style`] or
//! [`Edge::with_direction`]; the original value, and any copy of it already
//! recorded in a diagram, is left untouched.

use trellis_core::{
    attributes::Attributes,
    color::Color,
    style::{Direction, LineStyle},
};

use super::Node;

/// Visual attributes of an edge.
///
/// Every field is optional so that a style can act as a set of overrides.
///
/// # Examples
///
/// ```
/// use trellis::structure::EdgeStyle;
/// use trellis_core::{color::Color, style::LineStyle};
///
/// let base = EdgeStyle::new().with_label("events").with_line(LineStyle::Dashed);
/// let alert = base.merged(&EdgeStyle::new().with_color(Color::new("firebrick").unwrap()));
///
/// assert_eq!(alert.label(), Some("events"));
/// assert_eq!(alert.line(), Some(LineStyle::Dashed));
/// assert!(base.color().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeStyle {
    label: Option<String>,
    color: Option<Color>,
    line: Option<LineStyle>,
    attrs: Attributes,
}

impl EdgeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets an arbitrary Graphviz edge attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn line(&self) -> Option<LineStyle> {
        self.line
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Returns a new style with the fields set in `overrides` substituted.
    pub fn merged(&self, overrides: &EdgeStyle) -> EdgeStyle {
        EdgeStyle {
            label: overrides.label.clone().or_else(|| self.label.clone()),
            color: overrides.color.or(self.color),
            line: overrides.line.or(self.line),
            attrs: self.attrs.merged(&overrides.attrs),
        }
    }

    /// Converts the style to Graphviz attributes.
    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        if let Some(label) = &self.label {
            attrs.set("label", label.as_str());
        }
        if let Some(color) = self.color {
            attrs.set("color", color.to_hex());
        }
        if let Some(line) = self.line {
            attrs.set("style", line.to_dot_value());
        }
        attrs.overlay(&self.attrs);
        attrs
    }
}

/// A relation between two nodes of one diagram.
///
/// Endpoints are weak [`Node`] handles; the edge does not own them.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: Node,
    target: Node,
    direction: Direction,
    style: EdgeStyle,
}

impl Edge {
    /// Creates an edge value between two nodes.
    ///
    /// The edge is not part of any diagram until it is declared, either by
    /// [`connect`](crate::connect) or [`declare_edge`](crate::declare_edge).
    pub fn new(source: &Node, target: &Node, direction: Direction, style: EdgeStyle) -> Self {
        Self {
            source: *source,
            target: *target,
            direction,
            style,
        }
    }

    pub fn source(&self) -> Node {
        self.source
    }

    pub fn target(&self) -> Node {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    /// Returns a copy of this edge with `overrides` merged over its style.
    pub fn with_style(&self, overrides: &EdgeStyle) -> Edge {
        Edge {
            style: self.style.merged(overrides),
            ..self.clone()
        }
    }

    /// Returns a copy of this edge with a different direction.
    pub fn with_direction(&self, direction: Direction) -> Edge {
        Edge {
            direction,
            ..self.clone()
        }
    }

    /// Graphviz attributes of the edge: style first, then `dir`.
    pub fn attributes(&self) -> Attributes {
        self.style
            .to_attributes()
            .with("dir", self.direction.to_dot_value())
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::identifier::Id;

    use super::*;

    fn node(index: usize) -> Node {
        Node::from_parts(Id::new("diagram_0"), Id::sequenced("node", index))
    }

    #[test]
    fn test_with_style_leaves_original_untouched() {
        let original = Edge::new(
            &node(0),
            &node(1),
            Direction::Forward,
            EdgeStyle::new().with_label("reads"),
        );
        let red = Color::new("red").unwrap();

        let derived = original.with_style(&EdgeStyle::new().with_color(red));

        assert_eq!(original.style().color(), None);
        assert_eq!(derived.style().color(), Some(red));
        assert_eq!(derived.style().label(), Some("reads"));
        assert_eq!(derived.source(), original.source());
        assert_ne!(original, derived);
    }

    #[test]
    fn test_with_direction_returns_new_value() {
        let original = Edge::new(&node(0), &node(1), Direction::Forward, EdgeStyle::new());
        let both = original.with_direction(Direction::Both);

        assert_eq!(original.direction(), Direction::Forward);
        assert_eq!(both.direction(), Direction::Both);
    }

    #[test]
    fn test_attributes_put_dir_last() {
        let edge = Edge::new(
            &node(0),
            &node(1),
            Direction::Reverse,
            EdgeStyle::new()
                .with_attr("penwidth", "2")
                .with_line(LineStyle::Dotted)
                .with_label("sync"),
        );

        assert_eq!(
            edge.attributes().to_dot_list(),
            r#"[label="sync" style="dotted" penwidth="2" dir="back"]"#
        );
    }

    #[test]
    fn test_style_attrs_override_typed_fields() {
        let style = EdgeStyle::new()
            .with_color(Color::new("blue").unwrap())
            .with_attr("color", "red:blue");

        assert_eq!(style.to_attributes().get("color"), Some("red:blue"));
    }
}
