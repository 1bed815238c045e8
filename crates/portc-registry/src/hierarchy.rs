//! Class hierarchy: linking, ordering and inherited-member lookup.
//!
//! Uses a `petgraph::DiGraph` with one node per class and an edge from each
//! base class to every class deriving from it. A topological sort of that
//! graph detects cycles and orders classes so that bases come first.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use portc_core::{ClassId, ConstId, FieldId, MethodId, ResolveError};

use crate::Program;

impl Program {
    /// Validate the base links set on every class and compute depths.
    ///
    /// Fails with `CyclicInheritance` naming a class on the cycle. Returns
    /// all classes ordered by (depth, declaration order).
    pub fn link_hierarchy(&mut self) -> Result<Vec<ClassId>, ResolveError> {
        let mut graph: DiGraph<ClassId, ()> = DiGraph::with_capacity(self.classes().len(), 0);
        let nodes: Vec<NodeIndex> = self.classes().iter().map(|c| graph.add_node(c.id)).collect();
        for class in self.classes() {
            if let Some(base) = class.base {
                graph.add_edge(nodes[base.index()], nodes[class.id.index()], ());
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let class = self.class(graph[cycle.node_id()]);
            ResolveError::CyclicInheritance {
                name: class.name.clone(),
                span: class.span,
            }
        })?;

        for node in order {
            let id = graph[node];
            let depth = match self.class(id).base {
                Some(base) => self.class(base).depth + 1,
                None => 0,
            };
            self.class_mut(id).depth = depth;
        }

        Ok(self.classes_by_depth())
    }

    /// Every class, bases before derived classes, ties in declaration order.
    pub fn classes_by_depth(&self) -> Vec<ClassId> {
        let mut ids: Vec<ClassId> = self.classes().iter().map(|c| c.id).collect();
        ids.sort_by_key(|id| (self.class(*id).depth, *id));
        ids
    }

    /// `id` followed by its base classes, nearest first.
    pub fn ancestors(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        // Bounded so an unlinked, cyclic chain cannot loop forever.
        std::iter::successors(Some(id), |c| self.class(*c).base).take(self.classes().len())
    }

    /// Number of inheritance steps from `derived` up to `base`, if any.
    pub fn inheritance_distance(&self, derived: ClassId, base: ClassId) -> Option<u32> {
        self.ancestors(derived)
            .position(|c| c == base)
            .map(|steps| steps as u32)
    }

    /// Whether `derived` is `base` or inherits from it.
    pub fn is_subclass_of(&self, derived: ClassId, base: ClassId) -> bool {
        self.inheritance_distance(derived, base).is_some()
    }

    /// The nearest class both `a` and `b` derive from.
    pub fn common_ancestor(&self, a: ClassId, b: ClassId) -> Option<ClassId> {
        self.ancestors(a).find(|c| self.is_subclass_of(b, *c))
    }

    /// A field declared on `class` or inherited by it.
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.ancestors(class).find_map(|c| {
            self.class(c)
                .fields
                .iter()
                .copied()
                .find(|f| self.field(*f).name == name)
        })
    }

    /// A constant declared on `class` or inherited by it.
    pub fn find_const(&self, class: ClassId, name: &str) -> Option<ConstId> {
        self.ancestors(class).find_map(|c| {
            self.class(c)
                .consts
                .iter()
                .copied()
                .find(|k| self.const_entry(*k).name == name)
        })
    }

    /// Every method called `name` visible from `class`, most derived first.
    ///
    /// Overrides are listed alongside the methods they replace; callers that
    /// rank overloads skip signatures they have already seen.
    pub fn find_methods(&self, class: ClassId, name: &str) -> Vec<MethodId> {
        self.ancestors(class)
            .flat_map(|c| self.class(c).methods.iter().copied())
            .filter(|m| self.method(*m).name == name)
            .collect()
    }

    /// Whether any class in the chain declares a method named `name`.
    pub fn has_method(&self, class: ClassId, name: &str) -> bool {
        self.ancestors(class)
            .any(|c| self.class(c).methods.iter().any(|m| self.method(*m).name == name))
    }
}

#[cfg(test)]
mod tests {
    use portc_core::{FieldEntry, ResolveErrorKind, Span, Type, Visibility};

    use super::*;

    fn program_with(classes: &[(&str, Option<usize>)]) -> Program {
        let mut program = Program::new();
        let ids: Vec<ClassId> = classes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| program.register_class(name, Span::new(i as u32 + 1, 1, 1)).unwrap())
            .collect();
        for (i, (_, base)) in classes.iter().enumerate() {
            program.class_mut(ids[i]).base = base.map(|b| ids[b]);
        }
        program
    }

    #[test]
    fn depths_and_order_put_bases_first() {
        // Derived classes are declared before their bases.
        let mut program = program_with(&[("C", Some(1)), ("B", Some(2)), ("A", None), ("D", Some(2))]);
        let order = program.link_hierarchy().unwrap();
        let names: Vec<&str> = order.iter().map(|id| program.class(*id).name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "D", "C"]);
        assert_eq!(program.class(ClassId(0)).depth, 2);
    }

    #[test]
    fn cycle_is_reported_not_followed() {
        let mut program = program_with(&[("A", Some(1)), ("B", Some(0))]);
        let err = program.link_hierarchy().unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::CyclicInheritance);
        assert_eq!(program.ancestors(ClassId(0)).count(), 2);
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        let mut program = program_with(&[("A", Some(0))]);
        assert_eq!(
            program.link_hierarchy().unwrap_err().kind(),
            ResolveErrorKind::CyclicInheritance
        );
    }

    #[test]
    fn distance_and_common_ancestor() {
        let mut program = program_with(&[("A", None), ("B", Some(0)), ("C", Some(1)), ("D", Some(0))]);
        program.link_hierarchy().unwrap();
        let (a, b, c, d) = (ClassId(0), ClassId(1), ClassId(2), ClassId(3));
        assert_eq!(program.inheritance_distance(c, a), Some(2));
        assert_eq!(program.inheritance_distance(a, c), None);
        assert!(program.is_subclass_of(b, b));
        assert_eq!(program.common_ancestor(c, d), Some(a));
        assert_eq!(program.common_ancestor(c, b), Some(b));
    }

    #[test]
    fn inherited_fields_are_found() {
        let mut program = program_with(&[("A", None), ("B", Some(0))]);
        program.link_hierarchy().unwrap();
        let field = program.add_field(FieldEntry {
            id: FieldId(0),
            name: "count".into(),
            owner: ClassId(0),
            visibility: Visibility::Protected,
            ty: Type::Int,
            span: Span::default(),
        });
        assert_eq!(program.find_field(ClassId(1), "count"), Some(field));
        assert_eq!(program.find_field(ClassId(1), "missing"), None);
    }
}
