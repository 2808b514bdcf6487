//! Compressed sparse column storage for count matrices.

use ndarray::{Array1, Array2};

use crate::error::{LabelError, LabelResult};

/// Count matrix stored column by column.
///
/// Column `j` owns `indices[indptr[j]..indptr[j + 1]]` (row ids, strictly
/// increasing) and the matching slice of `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) indptr: Vec<usize>,
    pub(crate) indices: Vec<usize>,
    pub(crate) data: Vec<u32>,
}

impl CscMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            indptr: vec![0; cols + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from raw CSC arrays, validating their structure.
    pub fn from_parts(
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<u32>,
    ) -> LabelResult<Self> {
        let (rows, cols) = shape;
        let invalid = |reason: String| LabelError::invalid_input("csc matrix", reason);

        if indptr.len() != cols + 1 {
            return Err(invalid(format!(
                "indptr has {} entries, expected {}",
                indptr.len(),
                cols + 1
            )));
        }
        if indices.len() != data.len() {
            return Err(invalid(format!(
                "{} row indices but {} values",
                indices.len(),
                data.len()
            )));
        }
        if indptr[0] != 0 || indptr[cols] != data.len() {
            return Err(invalid("indptr must start at 0 and end at nnz".into()));
        }
        if let Some(col) = indptr.windows(2).position(|pair| pair[0] > pair[1]) {
            return Err(invalid(format!("indptr decreases at column {col}")));
        }
        for col in 0..cols {
            let (start, end) = (indptr[col], indptr[col + 1]);
            if end > indices.len() {
                return Err(invalid(format!("column {col} ends past the stored entries")));
            }
            let column = &indices[start..end];
            if column.iter().any(|&row| row >= rows) {
                return Err(invalid(format!("row index out of bounds in column {col}")));
            }
            if column.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(invalid(format!(
                    "row indices in column {col} are not strictly increasing"
                )));
            }
        }

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        })
    }

    /// Build from `(row, col, count)` triplets; duplicates are summed and
    /// zero counts dropped.
    pub fn from_triplets(
        shape: (usize, usize),
        triplets: &[(usize, usize, u32)],
    ) -> LabelResult<Self> {
        let (rows, cols) = shape;
        let mut sorted: Vec<(usize, usize, u32)> = triplets.to_vec();
        if let Some(&(row, col, _)) = sorted.iter().find(|(r, c, _)| *r >= rows || *c >= cols) {
            return Err(LabelError::invalid_input(
                "csc matrix",
                format!("triplet ({row}, {col}) outside {rows}x{cols}"),
            ));
        }
        sorted.sort_by_key(|&(row, col, _)| (col, row));

        let mut indptr = vec![0; cols + 1];
        let mut indices = Vec::with_capacity(sorted.len());
        let mut data: Vec<u32> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, count) in sorted {
            if count == 0 {
                continue;
            }
            if last == Some((row, col)) {
                if let Some(value) = data.last_mut() {
                    *value = value.checked_add(count).ok_or_else(|| {
                        LabelError::invalid_input(
                            "csc matrix",
                            format!("count at ({row}, {col}) overflows u32"),
                        )
                    })?;
                }
                continue;
            }
            indices.push(row);
            data.push(count);
            indptr[col + 1] += 1;
            last = Some((row, col));
        }
        for col in 0..cols {
            indptr[col + 1] += indptr[col];
        }

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        })
    }

    pub fn from_dense(dense: &Array2<u32>) -> Self {
        let (rows, cols) = dense.dim();
        let mut indptr = Vec::with_capacity(cols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for column in dense.columns() {
            for (row, &count) in column.iter().enumerate() {
                if count != 0 {
                    indices.push(row);
                    data.push(count);
                }
            }
            indptr.push(indices.len());
        }

        Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn to_dense(&self) -> Array2<u32> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for col in 0..self.cols {
            let (rows, counts) = self.column(col);
            for (&row, &count) in rows.iter().zip(counts) {
                dense[[row, col]] += count;
            }
        }
        dense
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Row ids and counts stored in column `col`.
    ///
    /// # Panics
    /// Panics if `col` is out of bounds.
    pub fn column(&self, col: usize) -> (&[usize], &[u32]) {
        let (start, end) = (self.indptr[col], self.indptr[col + 1]);
        (&self.indices[start..end], &self.data[start..end])
    }

    /// Total count per row over every stored entry.
    pub fn row_sums(&self) -> Array1<u64> {
        let mut sums = Array1::zeros(self.rows);
        for (&row, &count) in self.indices.iter().zip(&self.data) {
            sums[row] += u64::from(count);
        }
        sums
    }

    /// New matrix made of the given columns, in the given order.
    pub fn select_columns(&self, order: &[usize]) -> LabelResult<Self> {
        if let Some(&col) = order.iter().find(|&&col| col >= self.cols) {
            return Err(LabelError::invalid_input(
                "column selection",
                format!("column {col} outside matrix with {} columns", self.cols),
            ));
        }

        let mut indptr = Vec::with_capacity(order.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for &col in order {
            let (rows, counts) = self.column(col);
            indices.extend_from_slice(rows);
            data.extend_from_slice(counts);
            indptr.push(indices.len());
        }

        Ok(Self {
            rows: self.rows,
            cols: order.len(),
            indptr,
            indices,
            data,
        })
    }

    /// Copy keeping only entries of rows where `keep` is true; the shape is
    /// unchanged.
    pub fn retain_rows(&self, keep: &Array1<bool>) -> LabelResult<Self> {
        if keep.len() != self.rows {
            return Err(LabelError::invalid_input(
                "row retention",
                format!("mask covers {} of {} rows", keep.len(), self.rows),
            ));
        }

        let mut indptr = Vec::with_capacity(self.cols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for col in 0..self.cols {
            let (rows, counts) = self.column(col);
            for (&row, &count) in rows.iter().zip(counts) {
                if keep[row] {
                    indices.push(row);
                    data.push(count);
                }
            }
            indptr.push(indices.len());
        }

        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
            data,
        })
    }
}
