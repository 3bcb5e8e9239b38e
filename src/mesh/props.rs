//! Named per-vertex attribute storage.
//!
//! Algorithms and applications often need to hang extra data off mesh
//! vertices without changing the mesh type: selection flags, scalar fields,
//! per-vertex colors. [`VertexProps`] stores such attributes as typed,
//! name-keyed arrays that are kept at vertex-count length as the mesh grows.
//!
//! Attribute names follow the `"v:..."` convention, e.g. `"v:selected"` for
//! the selection flag consumed by [`crate::algo::fair`].
//!
//! # Example
//!
//! ```
//! use burnish::mesh::VertexProps;
//!
//! let mut props = VertexProps::new(4);
//! props.get_or_add::<bool>("v:selected", false)[2] = true;
//!
//! let selected = props.get::<bool>("v:selected").unwrap();
//! assert_eq!(selected, &[false, false, true, false]);
//!
//! assert!(props.remove("v:selected"));
//! assert!(props.get::<bool>("v:selected").is_none());
//! ```

use std::any::Any;
use std::collections::HashMap;

/// Type-erased storage for one attribute array.
///
/// Keeps the per-attribute default value so the array can be grown when
/// vertices are added after the attribute was created.
trait PropArray: Send + Sync {
    fn grow_to(&mut self, len: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedArray<T: Clone + Send + Sync + 'static> {
    values: Vec<T>,
    default: T,
}

impl<T: Clone + Send + Sync + 'static> PropArray for TypedArray<T> {
    fn grow_to(&mut self, len: usize) {
        self.values.resize(len, self.default.clone());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed, name-keyed per-vertex attribute store.
///
/// Each attribute is a dense array indexed by vertex handle. Accessing an
/// attribute under the wrong type returns `None` rather than panicking.
pub struct VertexProps {
    len: usize,
    arrays: HashMap<String, Box<dyn PropArray>>,
}

impl VertexProps {
    /// Create a store for `len` vertices with no attributes.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            arrays: HashMap::new(),
        }
    }

    /// Get an attribute by name, or `None` if it was never created or is
    /// stored under a different type.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Option<&[T]> {
        self.arrays
            .get(name)?
            .as_any()
            .downcast_ref::<TypedArray<T>>()
            .map(|a| a.values.as_slice())
    }

    /// Get a mutable attribute by name, or `None` if absent or wrongly typed.
    pub fn get_mut<T: Clone + Send + Sync + 'static>(&mut self, name: &str) -> Option<&mut [T]> {
        self.arrays
            .get_mut(name)?
            .as_any_mut()
            .downcast_mut::<TypedArray<T>>()
            .map(|a| a.values.as_mut_slice())
    }

    /// Get an attribute by name, creating it filled with `default` if absent.
    ///
    /// # Panics
    ///
    /// Panics if an attribute with the same name already exists under a
    /// different type.
    pub fn get_or_add<T: Clone + Send + Sync + 'static>(
        &mut self,
        name: &str,
        default: T,
    ) -> &mut [T] {
        let len = self.len;
        let array = self
            .arrays
            .entry(name.to_string())
            .or_insert_with(|| {
                Box::new(TypedArray {
                    values: vec![default.clone(); len],
                    default,
                })
            })
            .as_any_mut()
            .downcast_mut::<TypedArray<T>>()
            .unwrap_or_else(|| panic!("attribute {:?} exists with a different type", name));
        array.values.as_mut_slice()
    }

    /// Remove an attribute by name. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.arrays.remove(name).is_some()
    }

    /// Check whether an attribute with this name exists (under any type).
    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    /// Grow every attribute array to the new vertex count.
    ///
    /// Called by the mesh when vertices are added; new entries take the
    /// attribute's default value.
    pub(crate) fn grow_to(&mut self, len: usize) {
        debug_assert!(len >= self.len);
        self.len = len;
        for array in self.arrays.values_mut() {
            array.grow_to(len);
        }
    }
}

impl std::fmt::Debug for VertexProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.arrays.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("VertexProps")
            .field("len", &self.len)
            .field("attributes", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_remove() {
        let mut props = VertexProps::new(3);
        assert!(props.get::<f64>("v:weight").is_none());

        props.get_or_add::<f64>("v:weight", 1.0)[1] = 2.5;
        assert_eq!(props.get::<f64>("v:weight").unwrap(), &[1.0, 2.5, 1.0]);
        assert!(props.contains("v:weight"));

        assert!(props.remove("v:weight"));
        assert!(!props.remove("v:weight"));
        assert!(!props.contains("v:weight"));
    }

    #[test]
    fn test_wrong_type_is_none() {
        let mut props = VertexProps::new(2);
        props.get_or_add::<bool>("v:selected", false);

        assert!(props.get::<f64>("v:selected").is_none());
        assert!(props.get::<bool>("v:selected").is_some());
    }

    #[test]
    fn test_get_or_add_is_idempotent() {
        let mut props = VertexProps::new(2);
        props.get_or_add::<bool>("v:selected", false)[0] = true;

        // A second call must return the existing array, not reset it.
        let again = props.get_or_add::<bool>("v:selected", false);
        assert_eq!(again, &[true, false]);
    }

    #[test]
    fn test_grows_with_default() {
        let mut props = VertexProps::new(2);
        props.get_or_add::<u32>("v:tag", 7);

        props.grow_to(4);
        assert_eq!(props.get::<u32>("v:tag").unwrap(), &[7, 7, 7, 7]);
    }

    #[test]
    #[should_panic(expected = "different type")]
    fn test_type_conflict_panics() {
        let mut props = VertexProps::new(1);
        props.get_or_add::<bool>("v:selected", false);
        props.get_or_add::<f64>("v:selected", 0.0);
    }
}
