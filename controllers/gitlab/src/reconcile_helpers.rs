//! Helper functions for late initialization and drift detection
//!
//! Shared by every translator so that "unset" is handled the same way
//! everywhere: an unset spec field is filled from the remote entity once
//! (late initialization) and is ignored by drift detection.

use std::collections::BTreeSet;

/// Fill an unset scalar from the observed value.
///
/// Returns true if the field was assigned.
pub fn late_init<T>(field: &mut Option<T>, observed: Option<T>) -> bool {
    if field.is_some() {
        return false;
    }
    match observed {
        Some(value) => {
            *field = Some(value);
            true
        }
        None => false,
    }
}

/// Fill an unset or empty collection from a non-empty observed collection
pub fn late_init_list<T: Clone>(field: &mut Option<Vec<T>>, observed: &[T]) -> bool {
    let declared_empty = field.as_ref().is_none_or(Vec::is_empty);
    if declared_empty && !observed.is_empty() {
        *field = Some(observed.to_vec());
        return true;
    }
    false
}

/// Fill an unset string from a non-empty observed string
pub fn late_init_str(field: &mut Option<String>, observed: &str) -> bool {
    if observed.is_empty() {
        return false;
    }
    late_init(field, Some(observed.to_string()))
}

/// A declared field matches when it is unset or equal to the observed value
pub fn is_equal_or_unset<T: PartialEq>(declared: Option<&T>, observed: &T) -> bool {
    declared.is_none_or(|d| d == observed)
}

/// Like [`is_equal_or_unset`] for optional observed values
pub fn is_equal_or_unset_opt<T: PartialEq>(declared: Option<&T>, observed: Option<&T>) -> bool {
    match declared {
        None => true,
        Some(d) => observed == Some(d),
    }
}

/// String comparison where an empty observed string equals "not set"
pub fn is_str_equal_or_unset(declared: Option<&String>, observed: Option<&str>) -> bool {
    match declared {
        None => true,
        Some(d) => d.as_str() == observed.unwrap_or_default(),
    }
}

/// Unordered comparison of a declared collection against the observed one
pub fn is_set_equal_or_unset<T: Ord + Clone>(declared: Option<&Vec<T>>, observed: &[T]) -> bool {
    declared.is_none_or(|d| {
        d.iter().cloned().collect::<BTreeSet<_>>() == observed.iter().cloned().collect::<BTreeSet<_>>()
    })
}

/// Date comparison tolerant of `YYYY-MM-DD` vs RFC 3339 renderings
pub fn is_date_equal_or_unset(declared: Option<&String>, observed: Option<&str>) -> bool {
    match declared {
        None => true,
        Some(d) => match observed {
            None => false,
            Some(o) => date_part(d) == date_part(o),
        },
    }
}

fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

/// Minimal add/remove set between a declared and an observed keyed collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDiff<K, V> {
    /// Declared but not observed
    pub add: Vec<V>,
    /// Declared and observed with a different value
    pub change: Vec<V>,
    /// Observed but not declared
    pub remove: Vec<K>,
}

impl<K, V> CollectionDiff<K, V> {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.change.is_empty() && self.remove.is_empty()
    }
}

/// Diff a declared collection against an observed one by key
pub fn diff_by_key<K, D, O>(
    declared: &[D],
    observed: &[O],
    declared_key: impl Fn(&D) -> K,
    observed_key: impl Fn(&O) -> K,
    same: impl Fn(&D, &O) -> bool,
) -> CollectionDiff<K, D>
where
    K: PartialEq,
    D: Clone,
{
    let mut diff = CollectionDiff {
        add: Vec::new(),
        change: Vec::new(),
        remove: Vec::new(),
    };
    for d in declared {
        let key = declared_key(d);
        match observed.iter().find(|o| observed_key(o) == key) {
            None => diff.add.push(d.clone()),
            Some(o) if !same(d, o) => diff.change.push(d.clone()),
            Some(_) => {}
        }
    }
    for o in observed {
        let key = observed_key(o);
        if !declared.iter().any(|d| declared_key(d) == key) {
            diff.remove.push(key);
        }
    }
    diff
}
