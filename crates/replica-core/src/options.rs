//! Per-call copy options

use rustc_hash::FxHashSet;

/// How a single copy call behaves
///
/// `includes = None` makes every field eligible; `excludes` always wins
/// over `includes`. Names that match no field are inert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CopyOptions {
    deep: bool,
    ignore_nulls: bool,
    includes: Option<FxHashSet<String>>,
    excludes: Option<FxHashSet<String>>,
}

impl CopyOptions {
    /// Shallow copy of every matching field
    pub const SHALLOW: CopyOptions = CopyOptions {
        deep: false,
        ignore_nulls: false,
        includes: None,
        excludes: None,
    };

    /// Deep copy of every matching field
    pub const DEEP: CopyOptions = CopyOptions {
        deep: true,
        ignore_nulls: false,
        includes: None,
        excludes: None,
    };

    /// Start building options
    pub fn builder() -> CopyOptionsBuilder {
        CopyOptionsBuilder::default()
    }

    /// Whether values are deep copied
    pub fn is_deep(&self) -> bool {
        self.deep
    }

    /// Whether absent source values are skipped
    pub fn ignores_nulls(&self) -> bool {
        self.ignore_nulls
    }

    /// Included field names, if restricted
    pub fn includes(&self) -> Option<&FxHashSet<String>> {
        self.includes.as_ref()
    }

    /// Excluded field names
    pub fn excludes(&self) -> Option<&FxHashSet<String>> {
        self.excludes.as_ref()
    }

    /// Whether a field passes the include/exclude filters
    pub fn should_copy(&self, name: &str) -> bool {
        if self.excludes.as_ref().is_some_and(|ex| ex.contains(name)) {
            return false;
        }
        self.includes.as_ref().map_or(true, |inc| inc.contains(name))
    }

    /// Shallow, unfiltered and null-copying
    pub fn is_simple(&self) -> bool {
        !self.deep && !self.ignore_nulls && self.includes.is_none() && self.excludes.is_none()
    }
}

/// Builder for [`CopyOptions`]
#[derive(Debug, Clone, Default)]
pub struct CopyOptionsBuilder {
    deep: bool,
    ignore_nulls: bool,
    includes: FxHashSet<String>,
    excludes: FxHashSet<String>,
}

impl CopyOptionsBuilder {
    /// Restrict the copy to these fields (accumulates)
    pub fn include_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Never copy these fields (accumulates)
    pub fn exclude_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Deep copy field values
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// Skip absent source values instead of writing them
    pub fn ignore_nulls(mut self, ignore_nulls: bool) -> Self {
        self.ignore_nulls = ignore_nulls;
        self
    }

    /// Finish; empty name sets become "no filter"
    pub fn build(self) -> CopyOptions {
        CopyOptions {
            deep: self.deep,
            ignore_nulls: self.ignore_nulls,
            includes: (!self.includes.is_empty()).then_some(self.includes),
            excludes: (!self.excludes.is_empty()).then_some(self.excludes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(CopyOptions::SHALLOW.is_simple());
        assert!(CopyOptions::DEEP.is_deep());
        assert!(!CopyOptions::DEEP.is_simple());
        assert_eq!(CopyOptions::default(), CopyOptions::SHALLOW);
    }

    #[test]
    fn test_empty_sets_collapse() {
        let opts = CopyOptions::builder().include_fields(Vec::<String>::new()).build();
        assert!(opts.includes().is_none());
        assert!(opts.is_simple());
    }

    #[test]
    fn test_exclude_wins() {
        let opts = CopyOptions::builder()
            .include_fields(["name", "age"])
            .exclude_fields(["name"])
            .build();
        assert!(!opts.should_copy("name"));
        assert!(opts.should_copy("age"));
        assert!(!opts.should_copy("email"));
    }

    #[test]
    fn test_calls_accumulate() {
        let opts = CopyOptions::builder()
            .exclude_fields(["a"])
            .exclude_fields(["b"])
            .ignore_nulls(true)
            .build();
        assert!(!opts.should_copy("a"));
        assert!(!opts.should_copy("b"));
        assert!(opts.should_copy("c"));
        assert!(opts.ignores_nulls());
        assert!(!opts.is_simple());
    }
}
