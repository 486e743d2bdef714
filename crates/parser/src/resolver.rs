//! Model graph resolution
//!
//! Materializes one [`ApiModelDefinition`] per distinct class path reachable
//! from the endpoints. A single [`ModelRegistry`] owns the visited set for the
//! whole pass; a class path is marked visited before its members are walked,
//! so reference cycles terminate and every type is resolved once.

use crate::introspection::{IntrospectionProvider, MemberFacts, TypeFacts, TypeKind};
use crate::type_mapper::TypeMapper;
use indexmap::{IndexMap, IndexSet};
use restmeta_common::{
    simple_name, ApiField, ApiModelDefinition, FieldKind, ModelKind, Result, TypeConventions,
};
use tracing::{debug, info, warn};

/// Reflection bookkeeping members that are not real enum constants
pub fn is_synthetic_constant(name: &str) -> bool {
    name.starts_with('$') || name == "name" || name == "ordinal"
}

/// Own members of a type followed by each ancestor's own members
///
/// The walk stops at the universal root type. Ignored members are dropped.
/// Missing facts for the type itself are an error; missing facts for an
/// ancestor end the walk with a warning.
pub fn declared_members(
    provider: &dyn IntrospectionProvider,
    conventions: &TypeConventions,
    class_path: &str,
) -> Result<Vec<MemberFacts>> {
    let facts = provider.type_facts(class_path)?;
    Ok(collect_members(provider, conventions, &facts))
}

fn collect_members(
    provider: &dyn IntrospectionProvider,
    conventions: &TypeConventions,
    facts: &TypeFacts,
) -> Vec<MemberFacts> {
    let mut members: Vec<MemberFacts> = facts
        .members
        .iter()
        .filter(|m| !m.ignored)
        .cloned()
        .collect();

    let mut seen = IndexSet::new();
    seen.insert(facts.class_path.clone());
    let mut next = facts.superclass.clone();

    while let Some(ancestor) = next.take() {
        if ancestor == conventions.root_type || !seen.insert(ancestor.clone()) {
            break;
        }
        match provider.type_facts(&ancestor) {
            Ok(parent) => {
                members.extend(parent.members.into_iter().filter(|m| !m.ignored));
                next = parent.superclass;
            }
            Err(e) => {
                warn!(
                    class_path = %facts.class_path,
                    ancestor = %ancestor,
                    error = %e,
                    "ancestor facts unavailable, inherited members omitted"
                );
            }
        }
    }

    members
}

/// Run-scoped store of resolved models
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ApiModelDefinition>,
    visited: IndexSet<String>,
    failures: Vec<(String, String)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a class path visited; false if it already was
    pub fn visit(&mut self, class_path: &str) -> bool {
        self.visited.insert(class_path.to_string())
    }

    pub fn is_visited(&self, class_path: &str) -> bool {
        self.visited.contains(class_path)
    }

    pub fn insert(&mut self, class_path: String, model: ApiModelDefinition) {
        self.models.insert(class_path, model);
    }

    pub fn get(&self, class_path: &str) -> Option<&ApiModelDefinition> {
        self.models.get(class_path)
    }

    pub fn contains(&self, class_path: &str) -> bool {
        self.models.contains_key(class_path)
    }

    /// Models keyed by class path, in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ApiModelDefinition)> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Class paths that could not be resolved, with the reason
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }

    pub fn into_models(self) -> IndexMap<String, ApiModelDefinition> {
        self.models
    }
}

/// Resolves reachable types into model definitions
pub struct ModelGraphResolver<'a> {
    provider: &'a dyn IntrospectionProvider,
    mapper: TypeMapper<'a>,
    base_packages: &'a [String],
}

impl<'a> ModelGraphResolver<'a> {
    pub fn new(provider: &'a dyn IntrospectionProvider, conventions: &'a TypeConventions) -> Self {
        Self {
            provider,
            mapper: TypeMapper::new(conventions),
            base_packages: &[],
        }
    }

    /// Only materialize types under these packages
    pub fn with_base_packages(mut self, base_packages: &'a [String]) -> Self {
        self.base_packages = base_packages;
        self
    }

    /// Resolve every root and everything reachable from it
    pub fn resolve_all<I, S>(&self, roots: I) -> ModelRegistry
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = ModelRegistry::new();
        for root in roots {
            self.resolve_into(root.as_ref(), &mut registry);
        }
        info!(
            models = registry.len(),
            failures = registry.failures.len(),
            "resolved model graph"
        );
        registry
    }

    /// Resolve one class path into an existing registry
    pub fn resolve_into(&self, class_path: &str, registry: &mut ModelRegistry) {
        if !self.should_materialize(class_path) || !registry.visit(class_path) {
            return;
        }

        let mut pending = vec![class_path.to_string()];
        while let Some(current) = pending.pop() {
            let facts = match self.provider.type_facts(&current) {
                Ok(facts) => facts,
                Err(e) => {
                    warn!(class_path = %current, error = %e, "skipping unresolvable model");
                    registry.failures.push((current, e.to_string()));
                    continue;
                }
            };

            let model = self.materialize(&facts);
            for field in &model.fields {
                if field.kind.is_reference()
                    && self.should_materialize(&field.class_path)
                    && registry.visit(&field.class_path)
                {
                    pending.push(field.class_path.clone());
                }
            }

            debug!(class_path = %current, fields = model.fields.len(), "materialized model");
            registry.insert(current, model);
        }
    }

    fn should_materialize(&self, class_path: &str) -> bool {
        self.mapper.is_model(class_path)
            && (self.base_packages.is_empty()
                || self
                    .base_packages
                    .iter()
                    .any(|p| class_path.starts_with(&format!("{}.", p.trim_end_matches('.')))))
    }

    fn materialize(&self, facts: &TypeFacts) -> ApiModelDefinition {
        let name = simple_name(&facts.class_path).to_string();
        let description = facts.comment.trim().to_string();

        match facts.kind {
            TypeKind::Enum => ApiModelDefinition {
                name,
                kind: ModelKind::Enum,
                description,
                fields: facts
                    .constants
                    .iter()
                    .filter(|c| !is_synthetic_constant(&c.name))
                    .map(|c| ApiField {
                        name: c.name.clone(),
                        kind: FieldKind::Primitive("String".to_string()),
                        class_path: "java.lang.String".to_string(),
                        description: c.comment.trim().to_string(),
                        optional: true,
                        paging_type: None,
                    })
                    .collect(),
            },
            TypeKind::Object => {
                let members = collect_members(self.provider, self.mapper.conventions(), facts);
                ApiModelDefinition {
                    name,
                    kind: ModelKind::Object,
                    description,
                    fields: members
                        .iter()
                        .map(|m| {
                            let (kind, class_path, paging_type) =
                                match self.mapper.paging_of(&m.type_ref) {
                                    Some((paging_type, content)) => {
                                        (FieldKind::Object, content, Some(paging_type))
                                    }
                                    None => {
                                        let (kind, class_path) =
                                            self.mapper.field_kind(&m.type_ref, m.is_enum);
                                        (kind, class_path, None)
                                    }
                                };
                            ApiField {
                                name: m.name.clone(),
                                kind,
                                class_path,
                                description: m.comment.trim().to_string(),
                                optional: !m.required,
                                paging_type,
                            }
                        })
                        .collect(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::{MockIntrospectionProvider, TypeRef};
    use restmeta_common::{GeneratorError, PagingType};

    fn member(name: &str, type_text: &str) -> MemberFacts {
        MemberFacts {
            name: name.to_string(),
            type_ref: TypeRef::parse(type_text).unwrap(),
            is_enum: false,
            required: false,
            ignored: false,
            comment: String::new(),
        }
    }

    fn object(class_path: &str, members: Vec<MemberFacts>) -> TypeFacts {
        TypeFacts {
            class_path: class_path.to_string(),
            kind: TypeKind::Object,
            comment: String::new(),
            superclass: None,
            members,
            constants: vec![],
        }
    }

    #[test]
    fn test_synthetic_constants() {
        assert!(is_synthetic_constant("$VALUES"));
        assert!(is_synthetic_constant("ordinal"));
        assert!(!is_synthetic_constant("ACTIVE"));
    }

    #[test]
    fn test_cycle_resolves_each_type_once() {
        let mut provider = MockIntrospectionProvider::new();
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.A")
            .times(1)
            .returning(|_| Ok(object("com.example.A", vec![member("b", "com.example.B")])));
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.B")
            .times(1)
            .returning(|_| Ok(object("com.example.B", vec![member("a", "com.example.A")])));

        let conventions = TypeConventions::default();
        let resolver = ModelGraphResolver::new(&provider, &conventions);
        let registry = resolver.resolve_all(["com.example.A", "com.example.B", "com.example.A"]);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("com.example.A"));
        assert!(registry.contains("com.example.B"));
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut provider = MockIntrospectionProvider::new();
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.Broken")
            .returning(|cp| Err(GeneratorError::Resolution(format!("no facts for {}", cp))));
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.Fine")
            .returning(|_| Ok(object("com.example.Fine", vec![member("id", "java.lang.Long")])));

        let conventions = TypeConventions::default();
        let resolver = ModelGraphResolver::new(&provider, &conventions);
        let registry = resolver.resolve_all(["com.example.Broken", "com.example.Fine"]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].0, "com.example.Broken");
    }

    #[test]
    fn test_base_package_filter() {
        let mut provider = MockIntrospectionProvider::new();
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.Order")
            .returning(|_| {
                Ok(object(
                    "com.example.Order",
                    vec![member("money", "org.joda.money.Money")],
                ))
            });

        let conventions = TypeConventions::default();
        let packages = vec!["com.example".to_string()];
        let resolver = ModelGraphResolver::new(&provider, &conventions).with_base_packages(&packages);
        let registry = resolver.resolve_all(["com.example.Order"]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("com.example.Order").unwrap().fields[0].kind, FieldKind::Object);
        assert!(!registry.is_visited("org.joda.money.Money"));
    }

    #[test]
    fn test_page_field_keeps_its_content_type() {
        let mut provider = MockIntrospectionProvider::new();
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.Report")
            .returning(|_| {
                Ok(object(
                    "com.example.Report",
                    vec![
                        member("sort", "org.springframework.data.domain.Sort"),
                        member("rows", "org.springframework.data.domain.Page<com.example.Row>"),
                    ],
                ))
            });
        provider
            .expect_type_facts()
            .withf(|cp| cp == "com.example.Row")
            .times(1)
            .returning(|_| Ok(object("com.example.Row", vec![member("id", "java.lang.Long")])));

        let conventions = TypeConventions::default();
        let resolver = ModelGraphResolver::new(&provider, &conventions);
        let registry = resolver.resolve_all(["com.example.Report"]);

        let report = registry.get("com.example.Report").unwrap();
        assert_eq!(report.fields[0].class_path, "org.springframework.data.domain.Sort");
        assert_eq!(report.fields[0].paging_type, None);
        assert_eq!(report.fields[1].class_path, "com.example.Row");
        assert_eq!(report.fields[1].paging_type, Some(PagingType::Spring));
        assert!(registry.contains("com.example.Row"));
        assert!(!registry.is_visited("org.springframework.data.domain.Sort"));
    }
}
