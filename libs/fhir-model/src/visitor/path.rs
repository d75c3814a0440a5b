//! FHIRPath-style location tracking during a walk

use super::{Visitable, Visitor};

/// Keeps the dotted path of the node currently being visited.
///
/// Visitors embed one and call [`push`](Self::push) from `visit_start` and
/// [`pop`](Self::pop) from `visit_end`.
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    segments: Vec<String>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, index: Option<usize>) {
        match index {
            Some(i) => self.segments.push(format!("{}[{}]", name, i)),
            None => self.segments.push(name.to_string()),
        }
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// `Observation.component[1].code`
    pub fn current(&self) -> String {
        self.segments.join(".")
    }
}

/// Records the path of every node in visit order.
#[derive(Debug, Default)]
pub struct PathCollector {
    tracker: PathTracker,
    paths: Vec<String>,
}

impl PathCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl<'a> Visitor<'a> for PathCollector {
    fn visit_start(&mut self, name: &str, index: Option<usize>, _node: &'a dyn Visitable) {
        self.tracker.push(name, index);
        self.paths.push(self.tracker.current());
    }

    fn visit_attribute(&mut self, name: &str, _value: &'a str) {
        self.paths.push(format!("{}.{}", self.tracker.current(), name));
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _node: &'a dyn Visitable) {
        self.tracker.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_formats_indexes() {
        let mut tracker = PathTracker::new();
        tracker.push("Observation", None);
        tracker.push("component", Some(1));
        tracker.push("code", None);
        assert_eq!(tracker.current(), "Observation.component[1].code");
        tracker.pop();
        assert_eq!(tracker.depth(), 2);
        assert_eq!(tracker.current(), "Observation.component[1]");
    }
}
