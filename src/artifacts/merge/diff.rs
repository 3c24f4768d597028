use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { value: T },
    Insert { value: T },
    Equal { value: T },
}

pub trait DiffAlgorithm<'d, T> {
    type Trace;
    type EditPath;
    type EditScript;

    fn compute_shortest_edit(&self) -> Self::Trace;
    fn backtrack(&self) -> Self::EditPath;
    fn diff(&self) -> Self::EditScript;
}

/// Myers' O(ND) diff turning `a` into `b`
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> DiffAlgorithm<'d, T> for MyersDiff<'d, T> {
    type Trace = Vec<Vec<isize>>;
    type EditPath = Vec<(isize, isize, isize, isize)>;
    type EditScript = Vec<Edit<T>>;

    fn compute_shortest_edit(&self) -> Self::Trace {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = (n + m) as usize;

        let mut v = vec![0; 2 * offset + 2];
        let mut trace = Vec::new();

        for d in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-d..=d).step_by(2) {
                let idx = (offset as isize + k) as usize;

                let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                    // moving down: an insertion from b
                    v[idx + 1]
                } else {
                    // moving right: a deletion from a
                    v[idx - 1] + 1
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    x += 1;
                    y += 1;
                }

                v[idx] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    fn backtrack(&self) -> Self::EditPath {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let offset = x + y;
        let mut edit_path = Vec::new();

        let trace = self.compute_shortest_edit();

        for (d, v) in trace.iter().enumerate().rev() {
            let d = d as isize;
            let k = x - y;

            let prev_k = if k == -d || (k != d && v[(offset + k - 1) as usize] < v[(offset + k + 1) as usize])
            {
                k + 1
            } else {
                k - 1
            };

            let prev_x = v[(offset + prev_k) as usize];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                edit_path.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if d > 0 {
                edit_path.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        edit_path
    }

    fn diff(&self) -> Self::EditScript {
        let mut diff = Vec::new();

        for (prev_x, prev_y, x, y) in self.backtrack() {
            if x == prev_x {
                diff.push(Edit::Insert {
                    value: self.b[prev_y as usize].clone(),
                });
            } else if y == prev_y {
                diff.push(Edit::Delete {
                    value: self.a[prev_x as usize].clone(),
                });
            } else {
                diff.push(Edit::Equal {
                    value: self.a[prev_x as usize].clone(),
                });
            }
        }

        diff.reverse();
        diff
    }
}
