//! Type classification for parameters and model fields
//!
//! Maps declared types onto the closed [`FieldKind`] set and decides which
//! qualified names deserve a model document of their own.

use crate::introspection::TypeRef;
use restmeta_common::{simple_name, FieldKind, PagingType, TypeConventions};

/// Maps declared types to field kinds and parameter labels
pub struct TypeMapper<'a> {
    conventions: &'a TypeConventions,
}

impl<'a> TypeMapper<'a> {
    pub fn new(conventions: &'a TypeConventions) -> Self {
        Self { conventions }
    }

    pub fn conventions(&self) -> &TypeConventions {
        self.conventions
    }

    /// Raw name of a type, substituting the bound or root type for variables
    pub fn erased_name(&self, type_ref: &TypeRef) -> String {
        type_ref
            .erasure()
            .unwrap_or(&self.conventions.root_type)
            .to_string()
    }

    /// Classify a declared member type
    ///
    /// Returns the kind together with the class path recorded on the field,
    /// which is the element type for arrays and sequences.
    ///
    /// # Examples
    /// ```
    /// use restmeta_common::{FieldKind, TypeConventions};
    /// use restmeta_parser::introspection::TypeRef;
    /// use restmeta_parser::TypeMapper;
    ///
    /// let conventions = TypeConventions::default();
    /// let mapper = TypeMapper::new(&conventions);
    /// let list = TypeRef::parse("java.util.List<com.example.OrderDto>").unwrap();
    ///
    /// assert_eq!(
    ///     mapper.field_kind(&list, false),
    ///     (FieldKind::Array, "com.example.OrderDto".to_string())
    /// );
    /// ```
    pub fn field_kind(&self, type_ref: &TypeRef, is_enum: bool) -> (FieldKind, String) {
        if let Some(element) = type_ref.array_element() {
            return (FieldKind::Array, element.path);
        }

        let path = self.erased_name(type_ref);
        if self.conventions.is_sequence(&path) {
            let element = type_ref
                .args
                .first()
                .map(|arg| self.erased_name(arg))
                .unwrap_or_else(|| self.conventions.root_type.clone());
            return (FieldKind::Array, element);
        }

        if is_enum {
            (FieldKind::Enum, path)
        } else if self.conventions.is_scalar(&path) {
            (FieldKind::Primitive(simple_name(&path).to_string()), path)
        } else {
            (FieldKind::Object, path)
        }
    }

    /// Page carrier of a declared type together with its content type
    pub fn paging_of(&self, type_ref: &TypeRef) -> Option<(PagingType, String)> {
        let paging_type = self.conventions.paging_type(&self.erased_name(type_ref))?;
        let content = type_ref
            .args
            .first()
            .map(|arg| self.erased_name(arg))
            .unwrap_or_else(|| self.conventions.root_type.clone());
        Some((paging_type, content))
    }

    /// Parameter type label: primitive simple name, `Array`, `Enum` or `Object`
    pub fn parameter_label(&self, type_ref: &TypeRef, is_enum: bool) -> String {
        let path = self.erased_name(type_ref);
        if type_ref.array_element().is_some() || self.conventions.is_sequence(&path) {
            "Array".to_string()
        } else if self.conventions.is_scalar(&path) {
            simple_name(&path).to_string()
        } else if is_enum {
            "Enum".to_string()
        } else {
            "Object".to_string()
        }
    }

    /// The model a declared type makes reachable, if any
    pub fn model_reference(&self, type_ref: &TypeRef, is_enum: bool) -> Option<String> {
        if let Some((_, content)) = self.paging_of(type_ref) {
            return self.is_model(&content).then_some(content);
        }
        let (kind, class_path) = self.field_kind(type_ref, is_enum);
        (kind.is_reference() && self.is_model(&class_path)).then_some(class_path)
    }

    /// Whether a qualified name is materialized as its own model document
    pub fn is_model(&self, class_path: &str) -> bool {
        !self.conventions.is_scalar(class_path)
            && !self.conventions.is_sequence(class_path)
            && !self.conventions.is_paging_carrier(class_path)
            && !self.conventions.is_void(class_path)
    }

    pub fn is_primitive(&self, class_path: &str) -> bool {
        self.conventions.is_scalar(class_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(text: &str, is_enum: bool) -> (FieldKind, String) {
        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);
        mapper.field_kind(&TypeRef::parse(text).unwrap(), is_enum)
    }

    #[test]
    fn test_field_kind_primitives() {
        assert_eq!(
            kind_of("java.lang.Long", false),
            (FieldKind::Primitive("Long".into()), "java.lang.Long".into())
        );
        assert_eq!(
            kind_of("int", false),
            (FieldKind::Primitive("int".into()), "int".into())
        );
    }

    #[test]
    fn test_field_kind_composites() {
        assert_eq!(
            kind_of("com.example.UserDto", false),
            (FieldKind::Object, "com.example.UserDto".into())
        );
        assert_eq!(
            kind_of("com.example.UserStatus", true),
            (FieldKind::Enum, "com.example.UserStatus".into())
        );
        assert_eq!(
            kind_of("com.example.UserDto[]", false),
            (FieldKind::Array, "com.example.UserDto".into())
        );
        assert_eq!(
            kind_of("java.util.List", false),
            (FieldKind::Array, "java.lang.Object".into())
        );
    }

    #[test]
    fn test_type_variable_member_uses_bound() {
        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);

        let bounded = TypeRef::variable("T", Some("com.example.BaseDto"));
        assert_eq!(
            mapper.field_kind(&bounded, false),
            (FieldKind::Object, "com.example.BaseDto".into())
        );

        let unbounded = TypeRef::variable("T", None);
        assert_eq!(
            mapper.field_kind(&unbounded, false).0,
            FieldKind::Primitive("Object".into())
        );
    }

    #[test]
    fn test_model_reference_skips_carriers() {
        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);

        let sort = TypeRef::named("org.springframework.data.domain.Sort");
        assert_eq!(mapper.model_reference(&sort, false), None);

        let strings = TypeRef::parse("java.util.List<java.lang.String>").unwrap();
        assert_eq!(mapper.model_reference(&strings, false), None);

        let users = TypeRef::parse("java.util.List<com.example.UserDto>").unwrap();
        assert_eq!(
            mapper.model_reference(&users, false),
            Some("com.example.UserDto".to_string())
        );
    }

    #[test]
    fn test_parameter_label() {
        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);
        assert_eq!(mapper.parameter_label(&TypeRef::named("java.lang.String"), false), "String");
        assert_eq!(mapper.parameter_label(&TypeRef::named("com.example.UserStatus"), true), "Enum");
        assert_eq!(mapper.parameter_label(&TypeRef::named("com.example.UserDto"), false), "Object");
        assert_eq!(
            mapper.parameter_label(&TypeRef::parse("java.util.Set<java.lang.Long>").unwrap(), false),
            "Array"
        );
    }

    #[test]
    fn test_set_and_collection_are_sequences() {
        assert_eq!(
            kind_of("java.util.Set<com.example.UserDto>", false),
            (FieldKind::Array, "com.example.UserDto".into())
        );
        assert_eq!(
            kind_of("java.util.Collection<java.lang.String>", false),
            (FieldKind::Array, "java.lang.String".into())
        );

        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);
        assert!(!mapper.is_primitive("java.util.Set"));
        assert!(!mapper.is_model("java.util.Set"));
    }

    #[test]
    fn test_paging_of_page_carriers() {
        let conventions = TypeConventions::default();
        let mapper = TypeMapper::new(&conventions);

        let rows = TypeRef::parse("org.springframework.data.domain.Page<com.example.Row>").unwrap();
        assert_eq!(
            mapper.paging_of(&rows),
            Some((PagingType::Spring, "com.example.Row".to_string()))
        );
        assert_eq!(
            mapper.model_reference(&rows, false),
            Some("com.example.Row".to_string())
        );

        let bare = TypeRef::named("one.axim.framework.core.data.XPage");
        assert_eq!(
            mapper.paging_of(&bare),
            Some((PagingType::Xpage, "java.lang.Object".to_string()))
        );
        assert_eq!(mapper.paging_of(&TypeRef::named("org.springframework.data.domain.Sort")), None);
    }
}
