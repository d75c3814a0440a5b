use super::{Visitable, Visitor};
use std::marker::PhantomData;

/// Gathers every node of type `T` reachable from the walk root, in visit order.
///
/// ```ignore
/// let mut codings = CollectingVisitor::<Coding>::new();
/// observation.accept(&mut codings);
/// for coding in codings.found() { /* ... */ }
/// ```
#[derive(Debug)]
pub struct CollectingVisitor<'a, T: 'static> {
    found: Vec<&'a T>,
    _marker: PhantomData<T>,
}

impl<'a, T: 'static> CollectingVisitor<'a, T> {
    pub fn new() -> Self {
        Self {
            found: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn found(&self) -> &[&'a T] {
        &self.found
    }

    pub fn into_found(self) -> Vec<&'a T> {
        self.found
    }
}

impl<T: 'static> Default for CollectingVisitor<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: 'static> Visitor<'a> for CollectingVisitor<'a, T> {
    fn visit_start(&mut self, _name: &str, _index: Option<usize>, node: &'a dyn Visitable) {
        if let Some(found) = node.as_any().downcast_ref::<T>() {
            self.found.push(found);
        }
    }
}
