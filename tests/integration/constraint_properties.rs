use backdrop::constraint::{Bound, BreakpointSet, Constraint, Orientation, Viewport};
use proptest::prelude::*;

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Portrait), Just(Orientation::Landscape)]
}

fn bound() -> impl Strategy<Value = Bound> {
    prop_oneof![4 => any::<u32>().prop_map(Bound::Px), 1 => Just(Bound::Unbounded)]
}

fn ascending_lengths() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(1u32..5000, 0..8).prop_map(|s| s.into_iter().collect())
}

proptest! {
    #[test]
    fn same_orientation_updates_iff_bound_grows(o in orientation(), a in bound(), b in bound()) {
        let current = Constraint::new(o, a);
        let candidate = Constraint::new(o, b);
        prop_assert_eq!(current.requires_update(&candidate), b > a);
    }

    #[test]
    fn orientation_change_always_updates(a in bound(), b in bound()) {
        let portrait = Constraint::new(Orientation::Portrait, a);
        let landscape = Constraint::new(Orientation::Landscape, b);
        prop_assert!(portrait.requires_update(&landscape));
        prop_assert!(landscape.requires_update(&portrait));
    }

    #[test]
    fn query_string_names_dimension_and_bound(o in orientation(), n in any::<u32>()) {
        let c = Constraint::new(o, Bound::Px(n));
        prop_assert_eq!(c.to_query_string(), format!("{}={}", o.dimension(), n));
        prop_assert_eq!(Constraint::unbounded(o).to_query_string(), "");
    }

    #[test]
    fn display_parses_back(o in orientation(), b in bound()) {
        let c = Constraint::new(o, b);
        prop_assert_eq!(c.to_string().parse::<Constraint>().unwrap(), c);
    }

    #[test]
    fn every_viewport_matches_exactly_one_breakpoint(
        widths in ascending_lengths(),
        heights in ascending_lengths(),
        w in 0u32..10_000,
        h in 0u32..10_000,
    ) {
        let set = BreakpointSet::from_lengths(&widths, &heights).unwrap();
        let viewport = Viewport::new(w, h);
        let matching: Vec<_> = set.iter().filter(|b| b.matches(&viewport)).collect();

        let lengths = match viewport.orientation() {
            Orientation::Portrait => &heights,
            Orientation::Landscape => &widths,
        };
        if lengths.is_empty() {
            prop_assert!(matching.is_empty());
        } else {
            prop_assert_eq!(matching.len(), 1);
            prop_assert_eq!(matching[0].constraint.orientation, viewport.orientation());
        }
    }
}
