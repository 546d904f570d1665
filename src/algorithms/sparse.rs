use anyhow::{bail, Result};

/// Sparse user-by-item interaction matrix in CSR layout.
///
/// Rows are retrieval-model user indices, columns are retrieval-model item
/// indices. Only read to tell the retrieval model which items a user has
/// already interacted with, so the interaction strengths are validated
/// against the layout and then dropped.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    cols: usize,
}

impl CsrMatrix {
    pub fn new(indptr: Vec<usize>, indices: Vec<usize>, data: Vec<f32>, cols: usize) -> Result<Self> {
        if indptr.is_empty() {
            bail!("CSR indptr must have at least one entry");
        }
        if indptr[0] != 0 || *indptr.last().unwrap_or(&0) != indices.len() {
            bail!(
                "CSR indptr must start at 0 and end at nnz ({})",
                indices.len()
            );
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            bail!("CSR indptr must be non-decreasing");
        }
        if indices.len() != data.len() {
            bail!(
                "CSR indices/data length mismatch: {} vs {}",
                indices.len(),
                data.len()
            );
        }
        if let Some(&bad) = indices.iter().find(|&&c| c >= cols) {
            bail!("CSR column index {} out of bounds ({} columns)", bad, cols);
        }
        Ok(Self {
            indptr,
            indices,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Column indices with a non-zero entry in `row`.
    pub fn row_indices(&self, row: usize) -> &[usize] {
        match (self.indptr.get(row), self.indptr.get(row + 1)) {
            (Some(&start), Some(&end)) => &self.indices[start..end],
            _ => &[],
        }
    }
}
