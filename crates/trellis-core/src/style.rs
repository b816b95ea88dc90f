//! Style enums shared by diagrams, clusters and edges.
//!
//! # Overview
//!
//! - [`LayoutDirection`]: Graphviz `rankdir` (`TB`, `BT`, `LR`, `RL`)
//! - [`CurveStyle`]: Graphviz `splines` (`ortho`, `curved`, `spline`, `polyline`)
//! - [`LineStyle`]: Edge line pattern (`solid`, `dashed`, `dotted`, `bold`)
//! - [`Direction`]: Edge arrowhead placement, Graphviz `dir`
//! - [`OutputFormat`]: Output artifact format
//!
//! Every enum parses from the lowercase (or, for directions, uppercase) name
//! Graphviz uses, and deserializes from the same strings.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Error returned when a style name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} `{value}`, valid values: {expected}")]
pub struct StyleParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl StyleParseError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Direction in which ranks are laid out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum LayoutDirection {
    /// Top to bottom.
    #[serde(rename = "TB")]
    TopBottom,
    /// Bottom to top.
    #[serde(rename = "BT")]
    BottomTop,
    /// Left to right (default).
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Right to left.
    #[serde(rename = "RL")]
    RightLeft,
}

impl LayoutDirection {
    /// Returns the Graphviz `rankdir` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(Self::TopBottom),
            "BT" => Ok(Self::BottomTop),
            "LR" => Ok(Self::LeftRight),
            "RL" => Ok(Self::RightLeft),
            _ => Err(StyleParseError::new("direction", s, "TB, BT, LR, RL")),
        }
    }
}

/// How edges are routed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    /// Axis-aligned segments (default).
    #[default]
    Ortho,
    Curved,
    Spline,
    Polyline,
}

impl CurveStyle {
    /// Returns the Graphviz `splines` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Ortho => "ortho",
            Self::Curved => "curved",
            Self::Spline => "spline",
            Self::Polyline => "polyline",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ortho" => Ok(Self::Ortho),
            "curved" => Ok(Self::Curved),
            "spline" => Ok(Self::Spline),
            "polyline" => Ok(Self::Polyline),
            _ => Err(StyleParseError::new(
                "curve style",
                s,
                "ortho, curved, spline, polyline",
            )),
        }
    }
}

/// Line pattern of an edge.
///
/// Maps to the Graphviz edge `style` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    Dashed,
    Dotted,
    /// Thicker solid line
    Bold,
}

impl LineStyle {
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Bold => "bold",
        }
    }
}

impl FromStr for LineStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            _ => Err(StyleParseError::new(
                "line style",
                s,
                "solid, dashed, dotted, bold",
            )),
        }
    }
}

/// Which ends of an edge carry an arrowhead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Arrowhead at the target.
    #[default]
    Forward,
    /// Arrowhead at the source.
    Reverse,
    /// Arrowheads at both ends.
    Both,
    /// Plain line.
    None,
}

impl Direction {
    /// Builds a direction from the presence of forward and reverse arrowheads.
    pub fn from_arrows(forward: bool, reverse: bool) -> Self {
        match (forward, reverse) {
            (true, true) => Self::Both,
            (true, false) => Self::Forward,
            (false, true) => Self::Reverse,
            (false, false) => Self::None,
        }
    }

    /// Returns the Graphviz `dir` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "back",
            Self::Both => "both",
            Self::None => "none",
        }
    }
}

impl FromStr for Direction {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "reverse" | "back" => Ok(Self::Reverse),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            _ => Err(StyleParseError::new(
                "edge direction",
                s,
                "forward, reverse, both, none",
            )),
        }
    }
}

/// Format of a rendered artifact.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    /// The DOT description itself, written without invoking a layout engine.
    Dot,
}

impl OutputFormat {
    /// File extension, also the Graphviz `-T` argument.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" | "gv" => Ok(Self::Dot),
            _ => Err(StyleParseError::new(
                "output format",
                s,
                "png, jpg, svg, pdf, dot",
            )),
        }
    }
}
