//! Stable identifiers for regenerated documents

use uuid::Uuid;

/// Namespace for all restmeta ids
const RESTMETA_NAMESPACE: Uuid = Uuid::from_u128(0x6f1e_9c2a_43b8_4d5e_9a07_1c3d_5e7f_8a9b);

/// Name-based id that is identical for identical input on every run
///
/// # Examples
/// ```
/// use restmeta_common::stable_id;
///
/// let a = stable_id(&["/users/{id}", "Get user", "GET"]);
/// let b = stable_id(&["/users/{id}", "Get user", "GET"]);
/// assert_eq!(a, b);
/// ```
pub fn stable_id(parts: &[&str]) -> String {
    let key = parts.concat();
    Uuid::new_v5(&RESTMETA_NAMESPACE, key.as_bytes()).to_string()
}
