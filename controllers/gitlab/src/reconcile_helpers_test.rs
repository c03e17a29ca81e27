//! Unit tests for reconcile_helpers

#[cfg(test)]
mod tests {
    use crate::reconcile_helpers::*;

    #[test]
    fn test_late_init_fills_only_unset() {
        let mut field: Option<String> = None;
        assert!(late_init(&mut field, Some("main".to_string())));
        assert_eq!(field.as_deref(), Some("main"));

        // A second pass on the same remote state is a no-op
        assert!(!late_init(&mut field, Some("main".to_string())));
        assert!(!late_init(&mut field, Some("develop".to_string())));
        assert_eq!(field.as_deref(), Some("main"));

        let mut unset: Option<bool> = None;
        assert!(!late_init(&mut unset, None));
    }

    #[test]
    fn test_late_init_str_ignores_empty_observed() {
        let mut field = None;
        assert!(!late_init_str(&mut field, ""));
        assert!(field.is_none());
        assert!(late_init_str(&mut field, "private"));
    }

    #[test]
    fn test_late_init_list_requires_empty_declared_and_non_empty_observed() {
        let observed = vec!["rust".to_string(), "k8s".to_string()];

        let mut unset: Option<Vec<String>> = None;
        assert!(late_init_list(&mut unset, &observed));
        assert_eq!(unset.as_ref().unwrap().len(), 2);

        let mut empty = Some(Vec::new());
        assert!(late_init_list(&mut empty, &observed));

        let mut declared = Some(vec!["go".to_string()]);
        assert!(!late_init_list(&mut declared, &observed));
        assert_eq!(declared.unwrap(), vec!["go".to_string()]);

        let mut nothing: Option<Vec<String>> = None;
        assert!(!late_init_list(&mut nothing, &[]));
        assert!(nothing.is_none());
    }

    #[test]
    fn test_equal_or_unset() {
        assert!(is_equal_or_unset(None, &30));
        assert!(is_equal_or_unset(Some(&30), &30));
        assert!(!is_equal_or_unset(Some(&10), &30));

        assert!(is_equal_or_unset_opt::<i64>(None, None));
        assert!(!is_equal_or_unset_opt(Some(&5), None));

        assert!(is_str_equal_or_unset(Some(&String::new()), None));
        assert!(!is_str_equal_or_unset(Some(&"foo".to_string()), Some("bar")));
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let declared = vec![3, 1, 2];
        assert!(is_set_equal_or_unset(Some(&declared), &[1, 2, 3]));
        assert!(!is_set_equal_or_unset(Some(&declared), &[1, 2]));
        assert!(is_set_equal_or_unset::<i64>(None, &[9]));
    }

    #[test]
    fn test_date_comparison() {
        assert!(is_date_equal_or_unset(
            Some(&"2030-01-01".to_string()),
            Some("2030-01-01T00:00:00Z")
        ));
        assert!(!is_date_equal_or_unset(Some(&"2030-01-01".to_string()), None));
        assert!(is_date_equal_or_unset(None, None));
    }

    #[test]
    fn test_diff_by_key() {
        let declared = vec![("A", 1), ("B", 2), ("C", 3)];
        let observed = vec![("B", 2), ("C", 4), ("D", 5)];

        let diff = diff_by_key(
            &declared,
            &observed,
            |d| d.0,
            |o| o.0,
            |d, o| d.1 == o.1,
        );
        assert_eq!(diff.add, vec![("A", 1)]);
        assert_eq!(diff.change, vec![("C", 3)]);
        assert_eq!(diff.remove, vec!["D"]);
        assert!(!diff.is_empty());

        let same = diff_by_key(&observed, &observed, |d| d.0, |o| o.0, |d, o| d == o);
        assert!(same.is_empty());
    }
}
