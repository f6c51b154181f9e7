use crate::{
    error::AnalysisError,
    name::{DecodedName, ParamKind},
    record::BenchmarkRecord,
    store::BenchmarkStore,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    collections::{hash_map::Entry, HashMap},
    hash::Hash,
};
use tracing::warn;

/// Named group of record indices produced by a grouping query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subset {
    pub name: String,
    pub indices: Vec<usize>,
}

/// A name component that is left out of a shape, with its display placeholder
#[derive(Debug, Clone, Copy)]
struct Elided<'a> {
    kind: ParamKind,
    index: usize,
    placeholder: &'a str,
}

impl Elided<'_> {
    fn matches(&self, kind: ParamKind, index: usize) -> bool {
        self.kind == kind && self.index == index
    }
}

/// Name of a record minus the elided components
///
/// Components are compared per kind, so a template and an argument with the
/// same text never make two shapes equal.
#[derive(Debug, PartialEq, Eq, Hash)]
struct ShapeKey<'a> {
    base_name: &'a str,
    templates: Vec<&'a str>,
    arguments: Vec<&'a str>,
}

impl<'a> ShapeKey<'a> {
    fn new(record: &'a BenchmarkRecord, elided: &[Elided<'_>]) -> Self {
        let keep = |kind: ParamKind| -> Vec<&'a str> {
            record
                .decoded
                .components(kind)
                .iter()
                .enumerate()
                .filter(|(index, _)| !elided.iter().any(|elided| elided.matches(kind, *index)))
                .map(|(_, component)| component.as_str())
                .collect_vec()
        };

        Self {
            base_name: record.base_name(),
            templates: keep(ParamKind::Template),
            arguments: keep(ParamKind::Argument),
        }
    }
}

/// full name of `record` with elided components replaced by their placeholder,
/// or dropped when the placeholder is empty
fn shape_name(record: &BenchmarkRecord, elided: &[Elided<'_>]) -> String {
    let substitute = |kind: ParamKind| -> Vec<String> {
        record
            .decoded
            .components(kind)
            .iter()
            .enumerate()
            .filter_map(
                |(index, component)| match elided.iter().find(|elided| elided.matches(kind, index)) {
                    Some(elided) if elided.placeholder.is_empty() => None,
                    Some(elided) => Some(elided.placeholder.to_owned()),
                    None => Some(component.clone()),
                },
            )
            .collect_vec()
    };

    DecodedName {
        base_name: record.base_name().to_owned(),
        templates: substitute(ParamKind::Template),
        arguments: substitute(ParamKind::Argument),
    }
    .to_string()
}

impl BenchmarkStore {
    /// Partition `indices` by everything but one name component
    ///
    /// Records in a subset share their full decoded name except the label at
    /// `index` on the `kind` axis; a record with fewer components counts as
    /// having an empty label there. Each subset is one chart line (or bar
    /// set) whose points run along that axis. Subsets are named after their
    /// first record with the component replaced by `placeholder` and come out
    /// in first-seen order.
    pub fn group_param(
        &self,
        kind: ParamKind,
        indices: &[usize],
        index: usize,
        placeholder: &str,
    ) -> Vec<Subset> {
        let elided = [Elided {
            kind,
            index,
            placeholder,
        }];

        self.group_by(
            indices,
            |record| ShapeKey::new(record, &elided),
            |record| shape_name(record, &elided),
        )
    }

    /// One subset per distinct label at `index` on the `kind` axis
    pub fn segment_param(&self, kind: ParamKind, indices: &[usize], index: usize) -> Vec<Subset> {
        self.group_by(
            indices,
            |record| record.param(kind, index),
            |record| record.param(kind, index).to_owned(),
        )
    }

    /// Partition `indices` by everything but the X and Z components
    ///
    /// Each subset becomes one series of a chart with a second (Z) axis. The
    /// subset name shows the X and Z positions as `X` and `Z`.
    pub fn segment_2d_names(
        &self,
        indices: &[usize],
        x_kind: ParamKind,
        x_index: usize,
        z_kind: ParamKind,
        z_index: usize,
    ) -> Vec<Subset> {
        let elided = [
            Elided {
                kind: x_kind,
                index: x_index,
                placeholder: "X",
            },
            Elided {
                kind: z_kind,
                index: z_index,
                placeholder: "Z",
            },
        ];

        self.group_by(
            indices,
            |record| ShapeKey::new(record, &elided),
            |record| shape_name(record, &elided),
        )
    }

    /// Top level grouping by base name, the roots of the selection tree
    pub fn segment_families(&self, indices: &[usize]) -> Vec<Subset> {
        self.group_by(
            indices,
            |record| record.base_name(),
            |record| record.base_name().to_owned(),
        )
    }

    /// Grouping by container tag, records without one share the "" subset
    pub fn segment_containers(&self, indices: &[usize]) -> Vec<Subset> {
        let container = |record: &BenchmarkRecord| -> String {
            record.container.clone().unwrap_or_default()
        };

        self.group_by(indices, container, container)
    }

    fn group_by<'s, K, F, N>(&'s self, indices: &[usize], key: F, name: N) -> Vec<Subset>
    where
        K: Eq + Hash,
        F: Fn(&'s BenchmarkRecord) -> K,
        N: Fn(&'s BenchmarkRecord) -> String,
    {
        let mut positions: HashMap<K, usize> = HashMap::new();
        let mut subsets: Vec<Subset> = Vec::new();

        for &index in indices {
            let Some(record) = self.record(index) else {
                warn!(index = index, "Ignored index outside of the results");
                continue;
            };

            match positions.entry(key(record)) {
                Entry::Occupied(position) => subsets[*position.get()].indices.push(index),
                Entry::Vacant(position) => {
                    position.insert(subsets.len());
                    subsets.push(Subset {
                        name: name(record),
                        indices: vec![index],
                    });
                }
            }
        }

        subsets
    }
}

/// Check that subsets can form the rows of a matrix
///
/// Every subset must have as many indices as the first one, and at least two.
/// An empty list is accepted.
pub fn check_matrix(subsets: &[Subset]) -> Result<(), AnalysisError> {
    let Some(reference) = subsets.first().map(|subset| subset.indices.len()) else {
        return Ok(());
    };

    for subset in subsets {
        if subset.indices.len() != reference {
            return Err(AnalysisError::AsymmetricGrouping {
                name: subset.name.clone(),
                expected: reference,
                found: subset.indices.len(),
            });
        }
        if subset.indices.len() < 2 {
            return Err(AnalysisError::NotEnoughPoints {
                name: subset.name.clone(),
                found: subset.indices.len(),
            });
        }
    }

    Ok(())
}
