//! Configuration types for Trellis diagrams.
//!
//! This module provides configuration structures that control how a diagram
//! is described to Graphviz and where its artifacts are written. All types
//! implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining diagram defaults and engine settings.
//! - [`DiagramConfig`] - Per-diagram configuration surface (title, output, layout, attributes).
//! - [`DiagramOverrides`] - Partial diagram settings layered over a [`DiagramConfig`].
//! - [`EngineConfig`] - Which external layout program is invoked.
//!
//! # Example
//!
//! ```
//! # use trellis::config::DiagramConfig;
//! # use trellis_core::style::{LayoutDirection, OutputFormat};
//! let config = DiagramConfig::new("Event Processing")
//!     .with_direction(LayoutDirection::TopBottom)
//!     .with_formats([OutputFormat::Svg]);
//!
//! assert_eq!(config.filename(), "event_processing");
//! assert_eq!(config.output_path(OutputFormat::Svg).to_str(), Some("./event_processing.svg"));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use trellis_core::{
    attributes::Attributes,
    style::{CurveStyle, LayoutDirection, OutputFormat},
};

/// Graph-level attributes applied before any configured override.
const DEFAULT_GRAPH_ATTRS: [(&str, &str); 7] = [
    ("pad", "2.0"),
    ("splines", "ortho"),
    ("nodesep", "0.60"),
    ("ranksep", "0.75"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "15"),
    ("fontcolor", "#2D3436"),
];

/// Node defaults; icon nodes override `shape` and `height`.
const DEFAULT_NODE_ATTRS: [(&str, &str); 10] = [
    ("shape", "box"),
    ("style", "rounded"),
    ("fixedsize", "true"),
    ("width", "1.4"),
    ("height", "1.4"),
    ("labelloc", "b"),
    ("imagescale", "true"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "13"),
    ("fontcolor", "#2D3436"),
];

const DEFAULT_EDGE_ATTRS: [(&str, &str); 1] = [("color", "#7B8894")];

/// Filename used when a diagram has neither a title nor an explicit filename.
const FALLBACK_FILENAME: &str = "diagrams_image";

/// Top-level configuration combining diagram defaults and engine settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Defaults for every diagram.
    #[serde(default)]
    diagram: DiagramConfig,

    /// Render engine section.
    #[serde(default)]
    engine: EngineConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(diagram: DiagramConfig, engine: EngineConfig) -> Self {
        Self { diagram, engine }
    }

    /// Returns the diagram defaults.
    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    /// Returns the engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }
}

/// External layout engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Graphviz program invoked for raster and vector formats.
    program: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("dot"),
        }
    }
}

impl EngineConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the Graphviz program path.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Per-diagram configuration.
///
/// Fields that are not set fall back to the defaults Trellis uses for
/// architecture diagrams: left-to-right layout, orthogonal edges, PNG output
/// and rendering as soon as the diagram scope closes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Human-readable title, also the graph label.
    title: String,

    /// Output file stem; derived from the title when unset.
    filename: Option<String>,

    /// Directory the artifacts are written to.
    output_dir: PathBuf,

    /// Formats rendered on scope close, in order.
    formats: Vec<OutputFormat>,

    direction: LayoutDirection,

    curve_style: CurveStyle,

    /// Emit a `strict digraph`, merging parallel edges.
    strict: bool,

    /// Prefix node labels with their kind.
    autolabel: bool,

    /// Render immediately when the diagram scope closes.
    render: bool,

    /// Root directory used to resolve node kinds to icon images.
    icon_dir: Option<PathBuf>,

    graph_attr: Attributes,

    node_attr: Attributes,

    edge_attr: Attributes,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            filename: None,
            output_dir: PathBuf::from("."),
            formats: vec![OutputFormat::Png],
            direction: LayoutDirection::default(),
            curve_style: CurveStyle::default(),
            strict: false,
            autolabel: false,
            render: true,
            icon_dir: None,
            graph_attr: Attributes::new(),
            node_attr: Attributes::new(),
            edge_attr: Attributes::new(),
        }
    }
}

impl DiagramConfig {
    /// Creates a configuration with the given title and default settings.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Replaces the output formats.
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = OutputFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_curve_style(mut self, curve_style: CurveStyle) -> Self {
        self.curve_style = curve_style;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_autolabel(mut self, autolabel: bool) -> Self {
        self.autolabel = autolabel;
        self
    }

    /// Controls whether closing the diagram scope renders it.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn with_icon_dir(mut self, icon_dir: impl Into<PathBuf>) -> Self {
        self.icon_dir = Some(icon_dir.into());
        self
    }

    /// Sets a graph-level attribute override.
    pub fn with_graph_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.graph_attr.set(name, value);
        self
    }

    /// Sets a default node attribute override.
    pub fn with_node_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_attr.set(name, value);
        self
    }

    /// Sets a default edge attribute override.
    pub fn with_edge_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.edge_attr.set(name, value);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the output file stem.
    ///
    /// An explicit filename wins; otherwise the title is lower-cased with each
    /// run of whitespace replaced by `_`. Without a title the stem is
    /// `diagrams_image`.
    pub fn filename(&self) -> String {
        if let Some(filename) = &self.filename {
            return filename.clone();
        }

        let stem = self
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();
        if stem.is_empty() {
            FALLBACK_FILENAME.to_string()
        } else {
            stem
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the final artifact path for `format`.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.filename(), format.extension()))
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn autolabel(&self) -> bool {
        self.autolabel
    }

    pub fn render(&self) -> bool {
        self.render
    }

    pub fn icon_dir(&self) -> Option<&Path> {
        self.icon_dir.as_deref()
    }

    /// Returns the effective graph attributes.
    ///
    /// Built-in defaults come first, then the title, layout direction and
    /// curve style, then the configured overrides.
    pub fn graph_attributes(&self) -> Attributes {
        let mut attrs: Attributes = DEFAULT_GRAPH_ATTRS.into_iter().collect();
        attrs.set("label", self.title.as_str());
        attrs.set("rankdir", self.direction.to_dot_value());
        attrs.set("splines", self.curve_style.to_dot_value());
        attrs.overlay(&self.graph_attr);
        attrs
    }

    /// Returns the effective default node attributes.
    pub fn node_attributes(&self) -> Attributes {
        let attrs: Attributes = DEFAULT_NODE_ATTRS.into_iter().collect();
        attrs.merged(&self.node_attr)
    }

    /// Returns the effective default edge attributes.
    pub fn edge_attributes(&self) -> Attributes {
        let attrs: Attributes = DEFAULT_EDGE_ATTRS.into_iter().collect();
        attrs.merged(&self.edge_attr)
    }

    /// Layers `overrides` over this configuration.
    ///
    /// Settings present in `overrides` win; absent ones keep this
    /// configuration's value. Attribute maps are merged with `overrides`
    /// winning on conflicts.
    pub fn layered(&self, overrides: &DiagramOverrides) -> DiagramConfig {
        DiagramConfig {
            title: overrides.title.clone().unwrap_or_else(|| self.title.clone()),
            filename: overrides.filename.clone().or_else(|| self.filename.clone()),
            output_dir: overrides
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            formats: overrides
                .formats
                .clone()
                .unwrap_or_else(|| self.formats.clone()),
            direction: overrides.direction.unwrap_or(self.direction),
            curve_style: overrides.curve_style.unwrap_or(self.curve_style),
            strict: overrides.strict.unwrap_or(self.strict),
            autolabel: overrides.autolabel.unwrap_or(self.autolabel),
            render: overrides.render.unwrap_or(self.render),
            icon_dir: overrides.icon_dir.clone().or_else(|| self.icon_dir.clone()),
            graph_attr: self.graph_attr.merged(&overrides.graph_attr),
            node_attr: self.node_attr.merged(&overrides.node_attr),
            edge_attr: self.edge_attr.merged(&overrides.edge_attr),
        }
    }
}

/// Diagram settings that only override what they name.
///
/// Same keys as [`DiagramConfig`], but nothing defaults: a missing key leaves
/// the underlying value alone when applied with [`DiagramConfig::layered`].
/// Diagram manifests are read into this type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiagramOverrides {
    title: Option<String>,
    filename: Option<String>,
    output_dir: Option<PathBuf>,
    formats: Option<Vec<OutputFormat>>,
    direction: Option<LayoutDirection>,
    curve_style: Option<CurveStyle>,
    strict: Option<bool>,
    autolabel: Option<bool>,
    render: Option<bool>,
    icon_dir: Option<PathBuf>,
    graph_attr: Attributes,
    node_attr: Attributes,
    edge_attr: Attributes,
}

impl DiagramOverrides {
    /// The overriding title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiagramConfig::default();

        assert!(config.render());
        assert!(!config.strict());
        assert!(!config.autolabel());
        assert_eq!(config.formats(), &[OutputFormat::Png]);
        assert_eq!(config.direction(), LayoutDirection::LeftRight);
        assert_eq!(config.curve_style(), CurveStyle::Ortho);
    }

    #[test]
    fn test_filename_derived_from_title() {
        assert_eq!(
            DiagramConfig::new("Web  Service\tOverview").filename(),
            "web_service_overview"
        );
        assert_eq!(DiagramConfig::new("").filename(), "diagrams_image");
        assert_eq!(
            DiagramConfig::new("Anything").with_filename("custom").filename(),
            "custom"
        );
    }

    #[test]
    fn test_output_path_uses_dir_and_extension() {
        let config = DiagramConfig::new("Pipeline").with_output_dir("/tmp/out");
        assert_eq!(
            config.output_path(OutputFormat::Pdf),
            PathBuf::from("/tmp/out/pipeline.pdf")
        );
    }

    #[test]
    fn test_graph_attributes_layering() {
        let config = DiagramConfig::new("Pipeline")
            .with_direction(LayoutDirection::TopBottom)
            .with_curve_style(CurveStyle::Curved)
            .with_graph_attr("pad", "0.5")
            .with_graph_attr("bgcolor", "white");

        let attrs = config.graph_attributes();

        assert_eq!(attrs.get("pad"), Some("0.5"));
        assert_eq!(attrs.get("label"), Some("Pipeline"));
        assert_eq!(attrs.get("rankdir"), Some("TB"));
        assert_eq!(attrs.get("splines"), Some("curved"));
        assert_eq!(attrs.get("bgcolor"), Some("white"));
        // Overrides keep the default's position.
        assert_eq!(attrs.iter().next(), Some(("pad", "0.5")));
    }

    #[test]
    fn test_node_and_edge_defaults() {
        let config = DiagramConfig::default().with_edge_attr("color", "red");

        assert_eq!(config.node_attributes().get("shape"), Some("box"));
        assert_eq!(config.node_attributes().len(), 10);
        assert_eq!(config.edge_attributes().get("color"), Some("red"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: DiagramConfig = toml::from_str(
            r##"
            title = "Event Processing"
            formats = ["svg", "png"]
            direction = "TB"
            curve_style = "polyline"
            render = false

            [graph_attr]
            pad = 0.5
            fontsize = 20

            [edge_attr]
            color = "#FF0000"
            "##,
        )
        .expect("valid config");

        assert_eq!(config.title(), "Event Processing");
        assert_eq!(config.formats(), &[OutputFormat::Svg, OutputFormat::Png]);
        assert_eq!(config.direction(), LayoutDirection::TopBottom);
        assert_eq!(config.curve_style(), CurveStyle::Polyline);
        assert!(!config.render());
        assert_eq!(config.graph_attributes().get("pad"), Some("0.5"));
        assert_eq!(config.graph_attributes().get("fontsize"), Some("20"));
        assert_eq!(config.edge_attributes().get("color"), Some("#FF0000"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_direction() {
        let result: Result<DiagramConfig, _> = toml::from_str(r#"direction = "UP""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_app_config_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            [diagram]
            strict = true

            [engine]
            program = "/usr/local/bin/dot"
            "#,
        )
        .expect("valid config");

        assert!(config.diagram().strict());
        assert_eq!(config.engine().program(), Path::new("/usr/local/bin/dot"));
    }

    #[test]
    fn test_layered_prefers_overrides_and_merges_attrs() {
        let base = DiagramConfig::default()
            .with_icon_dir("/icons")
            .with_node_attr("fontsize", "10")
            .with_node_attr("fontcolor", "black");
        let overrides: DiagramOverrides = toml::from_str(
            r#"
            title = "Overview"
            render = false

            [node_attr]
            fontsize = 12
            "#,
        )
        .expect("valid overrides");

        let layered = base.layered(&overrides);

        assert_eq!(layered.title(), "Overview");
        assert!(!layered.render());
        assert_eq!(layered.icon_dir(), Some(Path::new("/icons")));
        assert_eq!(layered.node_attributes().get("fontsize"), Some("12"));
        assert_eq!(layered.node_attributes().get("fontcolor"), Some("black"));
    }

    #[test]
    fn test_layered_keeps_settings_the_overrides_omit() {
        let base = DiagramConfig::new("Defaults")
            .with_direction(LayoutDirection::TopBottom)
            .with_curve_style(CurveStyle::Polyline)
            .with_formats([OutputFormat::Svg])
            .with_output_dir("/srv/diagrams")
            .with_strict(true)
            .with_autolabel(true)
            .with_render(false);
        let overrides: DiagramOverrides = toml::from_str(r#"title = "X""#).expect("valid overrides");

        let layered = base.layered(&overrides);

        assert_eq!(layered.title(), "X");
        assert_eq!(layered.direction(), LayoutDirection::TopBottom);
        assert_eq!(layered.curve_style(), CurveStyle::Polyline);
        assert_eq!(layered.formats(), &[OutputFormat::Svg]);
        assert_eq!(layered.output_dir(), Path::new("/srv/diagrams"));
        assert!(layered.strict());
        assert!(layered.autolabel());
        assert!(!layered.render());
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let base = DiagramConfig::new("Same").with_filename("kept");

        let layered = base.layered(&DiagramOverrides::default());

        assert_eq!(layered.title(), "Same");
        assert_eq!(layered.filename(), "kept");
        assert_eq!(layered.formats(), &[OutputFormat::Png]);
    }
}
