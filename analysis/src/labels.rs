/// Decides which category labels a combined chart axis can show
///
/// Subsets drawn on one axis each bring their own label list. Lists that
/// agree on their common part are merged into the longest of them; any
/// disagreement collapses the result to a single "" so the renderer blanks
/// the axis instead of showing labels that only fit some of the series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReconciler {
    labels: Option<Vec<String>>,
    collided: bool,
}

impl LabelReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: Vec<String>) {
        if self.collided || candidate.is_empty() {
            return;
        }

        match self.labels.as_mut() {
            None => self.labels = Some(candidate),
            Some(labels) if common_part_equal(labels, &candidate) => {
                if labels.len() < candidate.len() {
                    *labels = candidate;
                }
            }
            Some(_) => {
                self.collided = true;
                self.labels = None;
            }
        }
    }

    /// false once two candidates disagreed
    pub fn is_consistent(&self) -> bool {
        !self.collided
    }

    pub fn finish(self) -> Vec<String> {
        if self.collided {
            vec![String::new()]
        } else {
            self.labels.unwrap_or_default()
        }
    }
}

/// Reconcile a sequence of label lists, see `LabelReconciler`
pub fn reconcile<I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut reconciler = LabelReconciler::new();
    candidates
        .into_iter()
        .for_each(|candidate| reconciler.push(candidate));

    reconciler.finish()
}

/// true if both lists are non-empty and equal up to the shorter length
pub fn common_part_equal(left: &[String], right: &[String]) -> bool {
    let common = left.len().min(right.len());

    common > 0 && left[..common] == right[..common]
}
