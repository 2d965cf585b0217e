//! Dense row-major matrix storage and its plain-text file format.
//!
//! # File Format
//!
//! One matrix row per line, values separated by spaces. The number of
//! columns is taken from the first line and only that many lines are read;
//! a file with fewer lines yields a rectangular matrix, which elimination
//! later rejects as non-square.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::Path;

use rand::Rng;

use crate::Error;

/// Lower bound of randomly generated entries.
pub const RANDOM_MIN: f64 = -50.0;
/// Upper bound of randomly generated entries.
pub const RANDOM_MAX: f64 = 50.0;

/// An `rows × cols` grid of `f64` values stored row by row.
///
/// Rows are the unit of ownership during parallel elimination, so the type
/// hands out whole rows as slices and supports borrowing a pivot row next
/// to a mutable target row.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Builds a matrix from row vectors, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, Error> {
        let cols = rows.first().map_or(0, |row| row.len());
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::Ragged {
                    line: i + 1,
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Generates an `n × n` matrix with entries uniform in
    /// `[RANDOM_MIN, RANDOM_MAX]`.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let data = (0..n * n)
            .map(|_| rng.gen_range(RANDOM_MIN..=RANDOM_MAX))
            .collect();
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Borrows pivot row `k` immutably alongside row `i` mutably.
    ///
    /// Requires `k < i`.
    pub fn pivot_and_target(&mut self, k: usize, i: usize) -> (&[f64], &mut [f64]) {
        assert!(k < i, "pivot row {k} must precede target row {i}");
        let cols = self.cols;
        let (head, tail) = self.data.split_at_mut(i * cols);
        (&head[k * cols..(k + 1) * cols], &mut tail[..cols])
    }

    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, Error> {
        if self.cols != other.rows {
            return Err(Error::DimensionMismatch(
                self.rows, self.cols, other.rows, other.cols,
            ));
        }

        let mut product = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                for (p, b) in product.row_mut(i).iter_mut().zip(other.row(k)) {
                    *p += a * b;
                }
            }
        }
        Ok(product)
    }

    /// Parses the plain-text format.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut lines = text.lines();
        let first = match lines.next() {
            Some(line) => line,
            None => return Ok(Self::zeros(0, 0)),
        };

        let n = first.split_whitespace().count();
        let mut rows = Vec::with_capacity(n);
        for (i, line) in std::iter::once(first).chain(lines).take(n).enumerate() {
            rows.push(parse_row(line, i + 1, n)?);
        }

        Self::from_rows(rows)
    }

    /// Renders the plain-text format. Values use the shortest representation
    /// that parses back to the same `f64`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for i in 0..self.rows {
            let line = self
                .row(i)
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tokio::fs::write(path, self.to_text()).await?;
        Ok(())
    }
}

fn parse_row(line: &str, line_no: usize, expected: usize) -> Result<Vec<f64>, Error> {
    let row = line
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| Error::Parse {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if row.len() != expected {
        return Err(Error::Ragged {
            line: line_no,
            expected,
            got: row.len(),
        });
    }
    Ok(row)
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let line = self
                .row(i)
                .iter()
                .map(|v| format!("{:>18.14}", v))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
