//! Type naming conventions of the documented services
//!
//! The builder and resolver recognize sequence containers, paging carriers
//! and the universal root type by their qualified names. The defaults follow
//! the Spring and axim framework names; a service configuration may replace
//! any of them.

use crate::{PagingType, PrimitiveTable};
use serde::{Deserialize, Serialize};

/// Immutable table of recognized type names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeConventions {
    /// Single-argument sequence containers
    pub sequence_types: Vec<String>,
    /// Ecosystem-native page of results
    pub spring_page: String,
    /// Custom page of results
    pub xpage: String,
    /// Ecosystem-native pagination request object
    pub pageable: String,
    /// Ecosystem-native sort descriptor
    pub sort: String,
    /// Custom pagination request object
    pub xpage_nation: String,
    /// Custom sort order entry
    pub xorder: String,
    /// Universal root type whose members are never documented
    pub root_type: String,
    /// Return types that mean "no content"
    pub void_types: Vec<String>,
}

impl Default for TypeConventions {
    fn default() -> Self {
        Self {
            sequence_types: vec![
                "java.util.List".to_string(),
                "java.util.ArrayList".to_string(),
                "java.util.LinkedList".to_string(),
                "java.util.Collection".to_string(),
                "java.util.Set".to_string(),
            ],
            spring_page: "org.springframework.data.domain.Page".to_string(),
            xpage: "one.axim.framework.core.data.XPage".to_string(),
            pageable: "org.springframework.data.domain.Pageable".to_string(),
            sort: "org.springframework.data.domain.Sort".to_string(),
            xpage_nation: "one.axim.framework.core.data.XPageNation".to_string(),
            xorder: "one.axim.framework.core.data.XOrder".to_string(),
            root_type: "java.lang.Object".to_string(),
            void_types: vec!["void".to_string(), "java.lang.Void".to_string()],
        }
    }
}

impl TypeConventions {
    pub fn is_sequence(&self, class_path: &str) -> bool {
        class_path.ends_with("[]") || self.sequence_types.iter().any(|s| s == class_path)
    }

    /// Scalar by package, unless it is one of the sequence containers
    ///
    /// # Examples
    /// ```
    /// use restmeta_common::TypeConventions;
    ///
    /// let conventions = TypeConventions::default();
    /// assert!(conventions.is_scalar("java.util.UUID"));
    /// assert!(!conventions.is_scalar("java.util.Set"));
    /// ```
    pub fn is_scalar(&self, class_path: &str) -> bool {
        !self.is_sequence(class_path) && PrimitiveTable.is_primitive(class_path)
    }

    /// Paging type of a page carrier, `None` for anything else
    pub fn paging_type(&self, class_path: &str) -> Option<PagingType> {
        if class_path == self.spring_page {
            Some(PagingType::Spring)
        } else if class_path == self.xpage {
            Some(PagingType::Xpage)
        } else {
            None
        }
    }

    pub fn is_void(&self, class_path: &str) -> bool {
        self.void_types.iter().any(|v| v == class_path)
    }

    /// Library-owned paging and sort carriers that are never materialized
    pub fn is_paging_carrier(&self, class_path: &str) -> bool {
        [
            &self.spring_page,
            &self.xpage,
            &self.pageable,
            &self.sort,
            &self.xpage_nation,
            &self.xorder,
        ]
        .iter()
        .any(|c| c.as_str() == class_path)
    }
}
