use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grid::{is_foreground, RealGrid};

/// Neighborhood used when joining foreground cells into components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge neighbors only.
    Four,
    /// Edge and corner neighbors.
    #[default]
    Eight,
}

/// Disjoint-set forest over a contiguous index space.
///
/// Unions attach the larger root under the smaller one, so every set is
/// represented by its smallest index.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    /// Root of `x`, compressing the path on the way.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[big] = small;
        }
    }
}

/// Per-cell component labels.
///
/// Foreground cells carry the row-major index of their component's first
/// cell; background cells carry `rows * cols`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labeling {
    rows: usize,
    cols: usize,
    labels: Vec<usize>,
}

/// Label the foreground (non-zero) cells of `mask` into connected components.
pub fn label_components(mask: &RealGrid, connectivity: Connectivity) -> Labeling {
    let (h, w) = mask.shape();
    let background = h * w;
    let data = mask.view();
    let mut sets = UnionFind::new(background);

    for row in 0..h {
        for col in 0..w {
            if !is_foreground(data[[row, col]]) {
                continue;
            }
            let idx = row * w + col;
            let mut join = |r: usize, c: usize| {
                if is_foreground(data[[r, c]]) {
                    sets.union(idx, r * w + c);
                }
            };
            if col > 0 {
                join(row, col - 1);
            }
            if row > 0 {
                join(row - 1, col);
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        join(row - 1, col - 1);
                    }
                    if col + 1 < w {
                        join(row - 1, col + 1);
                    }
                }
            }
        }
    }

    let labels = data
        .iter()
        .enumerate()
        .map(|(idx, &v)| {
            if is_foreground(v) {
                sets.find(idx)
            } else {
                background
            }
        })
        .collect();

    Labeling {
        rows: h,
        cols: w,
        labels,
    }
}

impl Labeling {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The reserved background label, `rows * cols`.
    pub fn background(&self) -> usize {
        self.rows * self.cols
    }

    pub fn label(&self, row: usize, col: usize) -> usize {
        self.labels[row * self.cols + col]
    }

    /// Row-major labels.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn is_background(&self, row: usize, col: usize) -> bool {
        self.label(row, col) == self.background()
    }

    /// Cell count per component label, in label order.
    pub fn component_sizes(&self) -> BTreeMap<usize, usize> {
        let background = self.background();
        let mut sizes = BTreeMap::new();
        for &label in self.labels.iter().filter(|&&l| l != background) {
            *sizes.entry(label).or_insert(0) += 1;
        }
        sizes
    }

    pub fn component_count(&self) -> usize {
        self.component_sizes().len()
    }

    fn border_labels(&self) -> BTreeSet<usize> {
        let (h, w) = (self.rows, self.cols);
        let mut found = BTreeSet::new();
        if h == 0 || w == 0 {
            return found;
        }
        for col in 0..w {
            found.insert(self.label(0, col));
            found.insert(self.label(h - 1, col));
        }
        for row in 0..h {
            found.insert(self.label(row, 0));
            found.insert(self.label(row, w - 1));
        }
        found.remove(&self.background());
        found
    }

    /// Reset every component touching the first/last row or column to background.
    pub fn remove_border_components(&self) -> Labeling {
        let border = self.border_labels();
        let background = self.background();
        let labels = self
            .labels
            .iter()
            .map(|&l| if border.contains(&l) { background } else { l })
            .collect();
        Labeling {
            rows: self.rows,
            cols: self.cols,
            labels,
        }
    }

    fn mask_where<F>(&self, pred: F) -> RealGrid
    where
        F: Fn(usize) -> bool,
    {
        RealGrid::from_shape_fn(self.rows, self.cols, |row, col| {
            if pred(self.label(row, col)) {
                1.0
            } else {
                0.0
            }
        })
    }

    /// 0/1 mask of a single component.
    pub fn mask_of(&self, label: usize) -> RealGrid {
        self.mask_where(|l| l == label)
    }

    /// 0/1 mask of every labeled cell.
    pub fn foreground_mask(&self) -> RealGrid {
        let background = self.background();
        self.mask_where(|l| l != background)
    }

    /// Mask of the component with the most cells. Ties go to the first
    /// component in scan order; no components yields an all-zero mask.
    pub fn select_max_count(&self) -> RealGrid {
        let best = self
            .component_sizes()
            .into_iter()
            .fold(None, |best: Option<(usize, usize)>, (label, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((label, count)),
            });
        match best {
            Some((label, _)) => self.mask_of(label),
            None => self.empty_mask(),
        }
    }

    /// Mask of the component whose cells have the highest mean in `signal`.
    pub fn select_max_mean(&self, signal: &RealGrid) -> RealGrid {
        assert_eq!(
            (self.rows, self.cols),
            signal.shape(),
            "select_max_mean: labeling/signal shape mismatch"
        );
        let background = self.background();
        let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (&label, v) in self.labels.iter().zip(signal.iter()) {
            if label != background {
                let entry = sums.entry(label).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
        let best = sums
            .into_iter()
            .map(|(label, (sum, n))| (label, sum / n as f64))
            .fold(None, |best: Option<(usize, f64)>, (label, mean)| match best {
                Some((_, best_mean)) if best_mean >= mean => best,
                _ => Some((label, mean)),
            });
        match best {
            Some((label, _)) => self.mask_of(label),
            None => self.empty_mask(),
        }
    }

    /// Filled mask of this labeling's foreground; see [`interior_mask`].
    pub fn interior_mask(&self) -> RealGrid {
        interior_mask(&self.foreground_mask())
    }

    fn empty_mask(&self) -> RealGrid {
        RealGrid::zeros(self.rows, self.cols)
    }
}

/// Fill the holes of a mask that does not touch the grid border.
///
/// The complement of `mask` is labeled 4-connected; the component holding
/// cell `(0, 0)` (label 0) is the outside, and every other cell belongs to
/// the interior. With a single surviving component this is that component
/// with its holes (e.g. an obstruction shadow) filled in.
pub fn interior_mask(mask: &RealGrid) -> RealGrid {
    let (h, w) = mask.shape();
    if h == 0 || w == 0 {
        return RealGrid::zeros(h, w);
    }
    let outside = label_components(&mask.invert(), Connectivity::Four);
    if outside.is_background(0, 0) {
        warn!("interior reduction on a mask touching cell (0, 0); returning it unchanged");
        return mask.clone();
    }
    let exterior = outside.label(0, 0);
    outside.mask_where(|l| l != exterior)
}
