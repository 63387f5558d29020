//! Resolver configuration
//!
//! The defaults reproduce how the runtime itself reads metadata: pointer tables are honored,
//! rows marked deleted by edit-and-continue are hidden, and an unsorted `GenericParam` table
//! falls back to a linear scan.

/// Marker name of rows deleted by edit-and-continue
pub const DELETED_NAME: &str = "_Deleted";

/// Row count from which auxiliary indexes are sorted in parallel
pub const PARALLEL_SORT_THRESHOLD: u32 = 4096;

/// Configuration of a [`crate::metadata::resolver::RidListResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Name that, together with the `RTSpecialName` flag, marks a deleted row
    pub deleted_name: String,

    /// Retry a failed binary search over an unsorted `GenericParam` table with a linear scan
    pub generic_param_linear_fallback: bool,

    /// Auxiliary indexes of tables with at least this many rows are sorted with rayon
    pub parallel_sort_threshold: u32,

    /// Map member lists through `FieldPtr`, `MethodPtr`, `ParamPtr`, `EventPtr` and
    /// `PropertyPtr`. When disabled, member lists are physical ranges.
    pub honor_pointer_tables: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            deleted_name: DELETED_NAME.to_string(),
            generic_param_linear_fallback: true,
            parallel_sort_threshold: PARALLEL_SORT_THRESHOLD,
            honor_pointer_tables: true,
        }
    }
}

impl ResolverConfig {
    /// Read member lists in raw physical order.
    ///
    /// Pointer tables are ignored, so every member list is the contiguous physical range named
    /// by its owner. Deleted-row filtering still applies.
    #[must_use]
    pub fn raw_physical() -> Self {
        Self {
            honor_pointer_tables: false,
            ..Self::default()
        }
    }

    /// Never sort auxiliary indexes in parallel
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel_sort_threshold: u32::MAX,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let config = ResolverConfig::default();
        assert_eq!(config.deleted_name, "_Deleted");
        assert!(config.generic_param_linear_fallback);
        assert!(config.honor_pointer_tables);
        assert_eq!(config.parallel_sort_threshold, 4096);

        assert!(!ResolverConfig::raw_physical().honor_pointer_tables);
        assert_eq!(ResolverConfig::sequential().parallel_sort_threshold, u32::MAX);
        assert_eq!(
            ResolverConfig::sequential().deleted_name,
            ResolverConfig::default().deleted_name
        );
    }
}
