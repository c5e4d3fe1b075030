//! CART decision tree (Gini impurity)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{FitError, ModelError};

const LEAF_SUM_TOLERANCE: f64 = 1e-9;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split before falling back to the rest.
    pub max_features: usize,
}

/// Tree node, stored in a flat arena. Children always sit after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class fractions of the training rows that reached this leaf
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub n_classes: usize,
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `sample` (duplicates allowed).
    pub fn fit<R: AsRef<[f64]>>(
        features: &[R],
        target: &[usize],
        sample: Vec<usize>,
        n_classes: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self, FitError> {
        if sample.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        if features.len() != target.len() {
            return Err(FitError::LengthMismatch {
                features: features.len(),
                target: target.len(),
            });
        }
        if let Some(&index) = sample.iter().find(|&&i| i >= features.len()) {
            return Err(FitError::SampleOutOfRange {
                index,
                n_rows: features.len(),
            });
        }
        let n_features = features[sample[0]].as_ref().len();
        for &i in &sample {
            let actual = features[i].as_ref().len();
            if actual != n_features {
                return Err(FitError::RaggedRow { row: i, expected: n_features, actual });
            }
            if target[i] >= n_classes {
                return Err(FitError::UnknownLabel { label: target[i], n_classes });
            }
        }

        let mut builder = Builder {
            features,
            target,
            n_features,
            n_classes,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(sample, 0);

        Ok(Self {
            n_features,
            n_classes,
            nodes: builder.nodes,
        })
    }

    /// Leaf distribution reached by `row`
    pub fn leaf_distribution(&self, row: &[f64]) -> Result<&[f64], ModelError> {
        let mut at = 0;
        // A valid tree reaches a leaf in at most nodes.len() steps
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(at) {
                Some(Node::Leaf { distribution }) => return Ok(distribution),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row
                        .get(*feature)
                        .ok_or_else(|| ModelError::FeatureCount {
                            expected: self.n_features,
                            actual: row.len(),
                        })?;
                    at = if *value <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::Corrupt(format!("node {at} missing"))),
            }
        }
        Err(ModelError::Corrupt("tree traversal did not terminate".to_string()))
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match nodes.get(at) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Structural check for trees that came from outside (e.g. a file)
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= self.n_features {
                        return Err(format!("node {idx}: feature {feature} >= {}", self.n_features));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx}: non-finite threshold"));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {idx}: child {child} out of range"));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != self.n_classes {
                        return Err(format!(
                            "node {idx}: distribution has {} classes, expected {}",
                            distribution.len(),
                            self.n_classes
                        ));
                    }
                    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(format!("node {idx}: invalid probability"));
                    }
                    let sum: f64 = distribution.iter().sum();
                    if (sum - 1.0).abs() > LEAF_SUM_TOLERANCE {
                        return Err(format!("node {idx}: leaf probabilities sum to {sum}"));
                    }
                }
            }
        }
        Ok(())
    }
}

struct Builder<'a, R> {
    features: &'a [R],
    target: &'a [usize],
    n_features: usize,
    n_classes: usize,
    params: &'a TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl<R: AsRef<[f64]>> Builder<'_, R> {
    fn value(&self, row: usize, feature: usize) -> f64 {
        self.features[row].as_ref()[feature]
    }

    fn counts(&self, sample: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in sample {
            counts[self.target[i]] += 1;
        }
        counts
    }

    fn grow(&mut self, sample: Vec<usize>, depth: usize) -> usize {
        let at = self.nodes.len();
        let counts = self.counts(&sample);
        // Placeholder so children land after the parent
        self.nodes.push(leaf(&counts));

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || sample.len() < self.params.min_samples_split {
            return at;
        }

        let Some(best) = self.best_split(&sample, &counts) else {
            return at;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| self.value(i, best.feature) <= best.threshold);

        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[at] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        at
    }

    fn best_split(&mut self, sample: &[usize], counts: &[usize]) -> Option<Candidate> {
        let parent = gini(counts, sample.len());
        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        for (visited, &feature) in order.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(c) = self.best_split_on(sample, feature) {
                if c.impurity < parent - 1e-12
                    && best.as_ref().map_or(true, |b| c.impurity < b.impurity)
                {
                    best = Some(c);
                }
            }
        }
        best
    }

    fn best_split_on(&self, sample: &[usize], feature: usize) -> Option<Candidate> {
        let mut sorted: Vec<usize> = sample.to_vec();
        sorted.sort_by(|&a, &b| self.value(a, feature).total_cmp(&self.value(b, feature)));

        let n = sorted.len();
        if n < 2 {
            return None;
        }
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut left = vec![0usize; self.n_classes];
        let mut right = self.counts(&sorted);
        let mut best: Option<Candidate> = None;

        for pos in 0..n - 1 {
            let class = self.target[sorted[pos]];
            left[class] += 1;
            right[class] -= 1;

            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let lo = self.value(sorted[pos], feature);
            let hi = self.value(sorted[pos + 1], feature);
            if lo >= hi {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(Candidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

fn leaf(counts: &[usize]) -> Node {
    let total: usize = counts.iter().sum();
    let distribution = counts
        .iter()
        .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
        .collect();
    Node::Leaf { distribution }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let t = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / t;
            p * p
        })
        .sum::<f64>()
}
