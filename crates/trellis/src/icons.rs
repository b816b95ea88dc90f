//! Icon lookup for typed nodes.
//!
//! A node kind such as `aws.compute.EC2` maps to an image file by lowercasing
//! each dotted segment and joining them as a path: `aws/compute/ec2.png`
//! under the configured icon directory. Kinds without an image on disk render
//! as plain boxes.

use std::path::PathBuf;

/// Maps a node kind to an image file.
pub trait IconResolver {
    /// Returns the image for `kind`, or `None` to render a plain node.
    fn resolve(&self, kind: &str) -> Option<PathBuf>;
}

/// Resolver that never finds an icon.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconResolver for NoIcons {
    fn resolve(&self, _kind: &str) -> Option<PathBuf> {
        None
    }
}

/// Resolves icons from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryIcons {
    root: PathBuf,
}

impl DirectoryIcons {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The path an icon for `kind` would have, whether or not it exists.
    pub fn candidate(&self, kind: &str) -> Option<PathBuf> {
        let segments: Vec<String> = kind
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_lowercase)
            .collect();
        let (file, dirs) = segments.split_last()?;

        let mut path = self.root.clone();
        path.extend(dirs);
        path.push(format!("{file}.png"));
        Some(path)
    }
}

impl IconResolver for DirectoryIcons {
    fn resolve(&self, kind: &str) -> Option<PathBuf> {
        self.candidate(kind).filter(|path| path.is_file())
    }
}
