use crate::{
    error::AnalysisError,
    grouping::{check_matrix, Subset},
    name::ParamKind,
    store::BenchmarkStore,
    test_util::{raw, record, store, SORT_NAMES},
};
use proptest::prelude::*;

fn subset(name: &str, indices: &[usize]) -> Subset {
    Subset {
        name: name.to_owned(),
        indices: indices.to_vec(),
    }
}

#[test]
pub fn group_param_by_argument() {
    let store = store(&SORT_NAMES);

    assert_eq!(
        store.group_param(ParamKind::Argument, &store.all_indices(), 0, "X"),
        vec![
            subset("BM_Sort<int>/X/1", &[0, 1, 2]),
            subset("BM_Sort<float>/X/1", &[3, 4, 5]),
        ]
    );
}

#[test]
pub fn group_param_by_template() {
    let store = store(&SORT_NAMES);

    assert_eq!(
        store.group_param(ParamKind::Template, &store.all_indices(), 0, "X"),
        vec![
            subset("BM_Sort<X>/8/1", &[0, 3]),
            subset("BM_Sort<X>/16/1", &[1, 4]),
            subset("BM_Sort<X>/32/1", &[2, 5]),
        ]
    );
}

#[test]
pub fn group_param_empty_placeholder_drops_component() {
    let store = store(&SORT_NAMES);

    let by_argument = store.group_param(ParamKind::Argument, &[0, 3], 0, "");
    assert_eq!(by_argument[0].name, "BM_Sort<int>/1");

    let by_template = store.group_param(ParamKind::Template, &[0, 3], 0, "");
    assert_eq!(by_template, vec![subset("BM_Sort/8/1", &[0, 3])]);
}

#[test]
pub fn group_param_keeps_selection_order() {
    let store = store(&SORT_NAMES);

    assert_eq!(
        store.group_param(ParamKind::Argument, &[5, 1, 3, 0], 0, "X"),
        vec![
            subset("BM_Sort<float>/X/1", &[5, 3]),
            subset("BM_Sort<int>/X/1", &[1, 0]),
        ]
    );
}

#[test]
pub fn group_param_missing_component_is_empty() {
    let store = store(&["Foo/8", "Foo/8/16", "Foo/8/32"]);

    assert_eq!(
        store.group_param(ParamKind::Argument, &store.all_indices(), 1, "X"),
        vec![subset("Foo/8", &[0, 1, 2])]
    );
}

#[test]
pub fn group_param_empty_kind_splits_every_name() {
    let store = store(&["A<8>", "A/8", "A<8>/8"]);

    let subsets = store.group_param(ParamKind::Empty, &store.all_indices(), 0, "X");
    assert_eq!(
        subsets,
        vec![
            subset("A<8>", &[0]),
            subset("A/8", &[1]),
            subset("A<8>/8", &[2]),
        ]
    );
}

#[test]
pub fn invalid_indices_are_ignored() {
    let store = store(&SORT_NAMES);

    assert_eq!(
        store.segment_families(&[0, 42, 3]),
        vec![subset("BM_Sort", &[0, 3])]
    );
    assert!(store.group_param(ParamKind::Argument, &[], 0, "X").is_empty());
}

#[test]
pub fn segment_param_by_label() {
    let store = store(&SORT_NAMES);

    assert_eq!(
        store.segment_param(ParamKind::Template, &store.all_indices(), 0),
        vec![subset("int", &[0, 1, 2]), subset("float", &[3, 4, 5])]
    );
    assert_eq!(
        store.segment_param(ParamKind::Argument, &store.all_indices(), 1),
        vec![subset("1", &[0, 1, 2, 3, 4, 5])]
    );
    // out of range components share the empty label
    assert_eq!(
        store.segment_param(ParamKind::Argument, &[0, 1], 7),
        vec![subset("", &[0, 1])]
    );
}

#[test]
pub fn segment_2d_names_elide_both_axes() {
    let store = store(&[
        "BM_Copy<int>/8/1",
        "BM_Copy<int>/16/1",
        "BM_Copy<float>/8/1",
        "BM_Copy<float>/16/1",
        "BM_Copy<int>/8/2",
        "BM_Copy<float>/8/2",
    ]);

    assert_eq!(
        store.segment_2d_names(
            &store.all_indices(),
            ParamKind::Argument,
            0,
            ParamKind::Template,
            0
        ),
        vec![
            subset("BM_Copy<Z>/X/1", &[0, 1, 2, 3]),
            subset("BM_Copy<Z>/X/2", &[4, 5]),
        ]
    );
}

#[test]
pub fn families_and_containers() {
    let mut with_label = raw("BM_Hash/64", 10.0);
    with_label.container = Some("sha".to_owned());
    let mut other_label = raw("BM_Hash/128", 10.0);
    other_label.container = Some("md5".to_owned());

    let store = BenchmarkStore::from_records(vec![
        record(with_label),
        record(raw("BM_Sort/8", 10.0)),
        record(other_label),
        record(raw("BM_Hash/256", 10.0)),
    ]);

    assert_eq!(
        store.segment_families(&store.all_indices()),
        vec![subset("BM_Hash", &[0, 2, 3]), subset("BM_Sort", &[1])]
    );
    assert_eq!(
        store.segment_containers(&store.all_indices()),
        vec![
            subset("sha", &[0]),
            subset("", &[1, 3]),
            subset("md5", &[2]),
        ]
    );
}

#[test]
pub fn matrix_checks() {
    assert_eq!(check_matrix(&[]), Ok(()));
    assert_eq!(
        check_matrix(&[subset("a", &[0, 1]), subset("b", &[2, 3])]),
        Ok(())
    );
    assert_eq!(
        check_matrix(&[subset("a", &[0, 1]), subset("b", &[2, 3, 4])]),
        Err(AnalysisError::AsymmetricGrouping {
            name: "b".to_owned(),
            expected: 2,
            found: 3
        })
    );
    assert_eq!(
        check_matrix(&[subset("a", &[0]), subset("b", &[1])]),
        Err(AnalysisError::NotEnoughPoints {
            name: "a".to_owned(),
            found: 1
        })
    );
}

fn sort_names(shapes: &[(usize, usize, usize)]) -> Vec<String> {
    const TYPES: [&str; 3] = ["int", "float", "double"];

    shapes
        .iter()
        .map(|(ty, size, stride)| format!("BM_Sort<{}>/{}/{}", TYPES[*ty], 8 << size, stride))
        .collect()
}

proptest! {
    #[test]
    fn group_param_partitions_selection(
        shapes in prop::collection::btree_set((0usize..3, 0usize..4, 0usize..3), 1..24),
        kind in prop_oneof![Just(ParamKind::Argument), Just(ParamKind::Template)],
        index in 0usize..3,
    ) {
        let names = sort_names(&shapes.into_iter().collect::<Vec<_>>());
        let names = names.iter().map(String::as_str).collect::<Vec<_>>();
        let store = store(&names);
        let indices = store.all_indices();
        let subsets = store.group_param(kind, &indices, index, "X");

        let mut seen = subsets
            .iter()
            .flat_map(|subset| subset.indices.iter().copied())
            .collect::<Vec<_>>();
        seen.sort_unstable();
        prop_assert_eq!(&seen, &indices);

        for subset in subsets.iter() {
            prop_assert!(subset.indices.windows(2).all(|pair| pair[0] < pair[1]));

            let first = store.record(subset.indices[0]).unwrap();
            for &member in subset.indices.iter() {
                let member = store.record(member).unwrap();
                prop_assert_eq!(first.base_name(), member.base_name());

                for other in [ParamKind::Argument, ParamKind::Template] {
                    let width = first.decoded.components(other).len();
                    for position in 0..width {
                        if other == kind && position == index {
                            continue;
                        }
                        prop_assert_eq!(first.param(other, position), member.param(other, position));
                    }
                }
            }
        }
    }

    #[test]
    fn segment_param_labels_are_distinct(
        shapes in prop::collection::btree_set((0usize..3, 0usize..4, 0usize..3), 1..24),
    ) {
        let names = sort_names(&shapes.into_iter().collect::<Vec<_>>());
        let names = names.iter().map(String::as_str).collect::<Vec<_>>();
        let store = store(&names);
        let subsets = store.segment_param(ParamKind::Template, &store.all_indices(), 0);

        for (position, subset) in subsets.iter().enumerate() {
            prop_assert!(subsets[position + 1..].iter().all(|other| other.name != subset.name));
            for &member in subset.indices.iter() {
                prop_assert_eq!(store.param_name(ParamKind::Template, member, 0), subset.name.as_str());
            }
        }
    }
}

proptest! {
    #[test]
    fn families_and_containers_partition(
        entries in prop::collection::vec((0usize..4, 0usize..3, 0usize..16), 0..32),
    ) {
        const FAMILIES: [&str; 4] = ["BM_Sort", "BM_Hash", "BM_Copy", "BM_Find"];
        const CONTAINERS: [&str; 3] = ["", "vector", "list"];

        let store = BenchmarkStore::from_records(
            entries
                .iter()
                .map(|(family, container, argument)| {
                    let mut raw_record = raw(&format!("{}/{argument}", FAMILIES[*family]), 1.0);
                    raw_record.container = Some(CONTAINERS[*container].to_owned());
                    record(raw_record)
                })
                .collect(),
        );
        let indices = store.all_indices();

        for families in [store.segment_families(&indices), store.segment_containers(&indices)] {
            let mut seen = families
                .iter()
                .flat_map(|subset| subset.indices.iter().copied())
                .collect::<Vec<_>>();
            seen.sort_unstable();
            prop_assert_eq!(&seen, &indices);
        }

        for family in store.segment_families(&indices) {
            for &member in family.indices.iter() {
                prop_assert_eq!(store.record(member).unwrap().base_name(), family.name.as_str());
            }
        }
        for container in store.segment_containers(&indices) {
            for &member in container.indices.iter() {
                let tag = store.record(member).unwrap().container.clone().unwrap_or_default();
                prop_assert_eq!(tag, container.name.clone());
            }
        }
    }
}
