//! Attribute paths

use serde::{Serialize, Serializer};

/// One step of an [`AttributePath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Object attribute or nested block
    Attribute(String),
    /// List or set element
    Index(usize),
    /// Map key
    Key(String),
}

/// Location of a value inside a resource configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributePath {
    steps: Vec<PathStep>,
}

impl AttributePath {
    /// The empty path (the whole object)
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a top-level attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self::root().attr(name)
    }

    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Attribute(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(PathStep::Key(key.into()));
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Path without its last step
    pub fn parent(&self) -> Self {
        let mut steps = self.steps.clone();
        steps.pop();
        Self { steps }
    }

    /// Path of a sibling attribute in the same object
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        self.parent().attr(name)
    }

    /// Name of the last attribute step, if the path ends in one
    pub fn last_attribute(&self) -> Option<&str> {
        match self.steps.last() {
            Some(PathStep::Attribute(name)) => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Attribute(name) if i == 0 => write!(f, "{}", name)?,
                PathStep::Attribute(name) => write!(f, ".{}", name)?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
                PathStep::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

impl Serialize for AttributePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = AttributePath::new("phase")
            .index(1)
            .attr("release_retention_policy")
            .index(0)
            .attr("unit");
        assert_eq!(path.to_string(), "phase[1].release_retention_policy[0].unit");

        let path = AttributePath::new("tags").key("team");
        assert_eq!(path.to_string(), "tags[\"team\"]");
        assert_eq!(AttributePath::root().to_string(), "");
    }

    #[test]
    fn test_sibling() {
        let path = AttributePath::new("policy").index(0).attr("strategy");
        let sibling = path.sibling("unit");
        assert_eq!(sibling.to_string(), "policy[0].unit");
        assert_eq!(sibling.last_attribute(), Some("unit"));
        assert_eq!(path.parent().to_string(), "policy[0]");
    }
}
