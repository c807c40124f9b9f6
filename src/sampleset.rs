/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Sample batches: rows of variable values, their energies and metadata.
//!
//! A [`SampleBatch`] is what a sampler hands back and what unembedding
//! produces. Besides the sample matrix and one energy per row it carries:
//!
//! - **columns**: named per-row vectors ([`Column`]), e.g. occurrence counts
//!   or `chain_break_fraction`. Every column has exactly one entry per row.
//! - **info**: free-form annotations ([`InfoValue`]) about the batch as a
//!   whole, e.g. timing or the embedding that produced it.
//!
//! The names `sample` and `energy` are reserved; they are stored natively.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::BatchError;
use crate::model::Vartype;
use crate::{Map, Variable};

const RESERVED: [&str; 2] = ["sample", "energy"];

// ─── Column ───────────────────────────────────────────────────────────────────

/// Typed per-row metadata vector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    /// Integer entries.
    Int(Vec<i64>),
    /// Floating-point entries.
    Float(Vec<f64>),
    /// Boolean entries.
    Bool(Vec<bool>),
}

impl Column {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Whether the column has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the entry type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
        }
    }

    /// Entries at `rows`, in that order. Indices must be in range.
    fn pick(&self, rows: &[usize]) -> Self {
        match self {
            Self::Int(v) => Self::Int(rows.iter().map(|&r| v[r]).collect()),
            Self::Float(v) => Self::Float(rows.iter().map(|&r| v[r]).collect()),
            Self::Bool(v) => Self::Bool(rows.iter().map(|&r| v[r]).collect()),
        }
    }

    /// Append `other`. Returns `false` (and leaves `self` untouched) when the
    /// entry types differ.
    fn append(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.extend_from_slice(b),
            (Self::Float(a), Self::Float(b)) => a.extend_from_slice(b),
            (Self::Bool(a), Self::Bool(b)) => a.extend_from_slice(b),
            _ => return false,
        }
        true
    }

    /// Integer entries, if this is an integer column.
    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Float entries, if this is a float column.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Boolean entries, if this is a boolean column.
    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }
}

// ─── InfoValue ────────────────────────────────────────────────────────────────

/// Free-form annotation value, shaped like JSON.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoValue {
    /// Boolean flag.
    Flag(bool),
    /// Integer.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// String.
    Text(String),
    /// Sequence of values.
    List(Vec<InfoValue>),
    /// String-keyed values in insertion order.
    Map(Map<String, InfoValue>),
}

impl InfoValue {
    /// The string, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The entries, if this is a map.
    pub fn as_map(&self) -> Option<&Map<String, InfoValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[InfoValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<bool> for InfoValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<i64> for InfoValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for InfoValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for InfoValue {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for InfoValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ─── SampleBatch ──────────────────────────────────────────────────────────────

/// Samples over a fixed variable order, with energies and metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawSampleBatch<V>"))]
pub struct SampleBatch<V: Variable> {
    variables: Vec<V>,
    samples: Vec<Vec<i8>>,
    energies: Vec<f64>,
    columns: Map<String, Column>,
    info: Map<String, InfoValue>,
    vartype: Vartype,
}

/// Wire form of a [`SampleBatch`], shape-checked on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSampleBatch<V> {
    variables: Vec<V>,
    samples: Vec<Vec<i8>>,
    energies: Vec<f64>,
    columns: Map<String, Column>,
    info: Map<String, InfoValue>,
    vartype: Vartype,
}

#[cfg(feature = "serde")]
impl<V: Variable> TryFrom<RawSampleBatch<V>> for SampleBatch<V> {
    type Error = BatchError;

    fn try_from(raw: RawSampleBatch<V>) -> Result<Self, Self::Error> {
        let mut batch = Self::from_samples(raw.variables, raw.samples, raw.vartype, raw.energies)?;
        for (name, column) in raw.columns {
            batch.insert_column(name, column)?;
        }
        batch.info = raw.info;
        Ok(batch)
    }
}

impl<V: Variable> SampleBatch<V> {
    /// Batch with no rows over `variables`.
    pub fn empty(variables: Vec<V>, vartype: Vartype) -> Self {
        Self {
            variables,
            samples: Vec::new(),
            energies: Vec::new(),
            columns: Map::default(),
            info: Map::default(),
            vartype,
        }
    }

    /// Batch from a sample matrix and one energy per row.
    ///
    /// Every row must hold one value per variable.
    pub fn from_samples(
        variables: Vec<V>,
        samples: Vec<Vec<i8>>,
        vartype: Vartype,
        energies: Vec<f64>,
    ) -> Result<Self, BatchError> {
        if let Some((row, r)) = samples.iter().enumerate().find(|(_, r)| r.len() != variables.len()) {
            return Err(BatchError::RowWidth {
                row,
                expected: variables.len(),
                found: r.len(),
            });
        }
        if energies.len() != samples.len() {
            return Err(BatchError::EnergyCount {
                expected: samples.len(),
                found: energies.len(),
            });
        }
        Ok(Self {
            variables,
            samples,
            energies,
            columns: Map::default(),
            info: Map::default(),
            vartype,
        })
    }

    // ── Builders ───────────────────────────────────────────────────────────

    /// Add (or replace) a per-row column.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, BatchError> {
        self.insert_column(name, column)?;
        Ok(self)
    }

    /// Add (or replace) a per-row column in place.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), BatchError> {
        let name = name.into();
        if RESERVED.contains(&name.as_str()) {
            return Err(BatchError::ReservedColumn(name));
        }
        if column.len() != self.len() {
            return Err(BatchError::ColumnLength {
                name,
                expected: self.len(),
                found: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Add (or replace) an info annotation.
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<InfoValue>) -> Self {
        self.insert_info(key, value);
        self
    }

    /// Add (or replace) an info annotation in place.
    pub fn insert_info(&mut self, key: impl Into<String>, value: impl Into<InfoValue>) {
        self.info.insert(key.into(), value.into());
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    /// Variables, in column order of the sample matrix.
    pub fn variables(&self) -> &[V] {
        &self.variables
    }

    /// Column index of `v` in the sample matrix.
    pub fn index_of(&self, v: &V) -> Option<usize> {
        self.variables.iter().position(|x| x == v)
    }

    /// The sample matrix.
    pub fn samples(&self) -> &[Vec<i8>] {
        &self.samples
    }

    /// One energy per row.
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// `(values, energy)` per row, in order.
    pub fn rows(&self) -> impl Iterator<Item = (&[i8], f64)> + '_ {
        self.samples.iter().map(Vec::as_slice).zip(self.energies.iter().copied())
    }

    /// Lowest-energy row. The earliest row wins a tie.
    pub fn first(&self) -> Option<(&[i8], f64)> {
        self.rows().fold(None, |best, (row, e)| match best {
            Some((_, b)) if b <= e => best,
            _ => Some((row, e)),
        })
    }

    /// Per-row column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Every per-row column, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.columns.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Info annotation by key.
    pub fn info_value(&self, key: &str) -> Option<&InfoValue> {
        self.info.get(key)
    }

    /// Every info annotation.
    pub fn info(&self) -> &Map<String, InfoValue> {
        &self.info
    }

    /// Domain of the sample values.
    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    // ── Reshaping ──────────────────────────────────────────────────────────

    /// New batch holding rows `rows` of this one, in that order.
    pub fn select(&self, rows: &[usize]) -> Result<Self, BatchError> {
        self.check_rows(rows)?;
        let samples = rows.iter().map(|&r| self.samples[r].clone()).collect();
        let energies = rows.iter().map(|&r| self.energies[r]).collect();
        self.remap(self.variables.clone(), samples, energies, rows)
    }

    /// Batch with no rows over `variables`, carrying this batch's column
    /// names and types (all empty), info and vartype.
    pub fn empty_like<W: Variable>(&self, variables: Vec<W>) -> SampleBatch<W> {
        SampleBatch {
            variables,
            samples: Vec::new(),
            energies: Vec::new(),
            columns: self.columns.iter().map(|(k, c)| (k.clone(), c.pick(&[]))).collect(),
            info: self.info.clone(),
            vartype: self.vartype,
        }
    }

    /// New batch over `variables` whose metadata is taken from this batch.
    ///
    /// `samples[i]` and `energies[i]` pair with row `rows[i]` of this batch:
    /// every column is re-aligned to `rows`. Info and vartype are copied.
    pub fn remap<W: Variable>(
        &self,
        variables: Vec<W>,
        samples: Vec<Vec<i8>>,
        energies: Vec<f64>,
        rows: &[usize],
    ) -> Result<SampleBatch<W>, BatchError> {
        self.check_rows(rows)?;
        if samples.len() != rows.len() {
            return Err(BatchError::Incompatible(format!(
                "{} samples for {} source rows",
                samples.len(),
                rows.len()
            )));
        }
        let mut out = SampleBatch::from_samples(variables, samples, self.vartype, energies)?;
        out.columns = self.columns.iter().map(|(k, c)| (k.clone(), c.pick(rows))).collect();
        out.info = self.info.clone();
        Ok(out)
    }

    /// Stack batches row-wise.
    ///
    /// All batches must share variables, vartype and column names and types.
    /// Info is taken from the first batch.
    pub fn concatenate<I>(batches: I) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut batches = batches.into_iter();
        let mut out = batches
            .next()
            .ok_or_else(|| BatchError::Incompatible("no batches given".into()))?;
        for batch in batches {
            if batch.variables != out.variables {
                return Err(BatchError::Incompatible("variables differ".into()));
            }
            if batch.vartype != out.vartype {
                return Err(BatchError::Incompatible(format!(
                    "vartype {} vs {}",
                    batch.vartype.name(),
                    out.vartype.name()
                )));
            }
            if batch.columns.len() != out.columns.len() {
                return Err(BatchError::Incompatible("column sets differ".into()));
            }
            for (name, column) in &batch.columns {
                let Some(existing) = out.columns.get_mut(name) else {
                    return Err(BatchError::Incompatible(format!("column {name} is missing")));
                };
                let expected = existing.kind();
                if !existing.append(column) {
                    return Err(BatchError::Incompatible(format!(
                        "column {name} holds {} entries, expected {expected}",
                        column.kind()
                    )));
                }
            }
            out.samples.extend(batch.samples);
            out.energies.extend(batch.energies);
        }
        Ok(out)
    }

    fn check_rows(&self, rows: &[usize]) -> Result<(), BatchError> {
        match rows.iter().find(|&&r| r >= self.len()) {
            Some(&index) => Err(BatchError::RowIndex { index, len: self.len() }),
            None => Ok(()),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> SampleBatch<&'static str> {
        SampleBatch::from_samples(
            vec!["a", "b"],
            vec![vec![1, -1], vec![-1, -1], vec![1, 1]],
            Vartype::Spin,
            vec![0.5, -2.0, 1.0],
        )
        .unwrap()
        .with_column("num_occurrences", Column::Int(vec![3, 1, 2]))
        .unwrap()
        .with_info("solver", "test")
    }

    #[test]
    fn test_shape_checks() {
        let err = SampleBatch::from_samples(vec![0u8, 1], vec![vec![1]], Vartype::Spin, vec![0.0]).unwrap_err();
        assert_eq!(err, BatchError::RowWidth { row: 0, expected: 2, found: 1 });

        let err = SampleBatch::from_samples(vec![0u8], vec![vec![1]], Vartype::Spin, vec![]).unwrap_err();
        assert_eq!(err, BatchError::EnergyCount { expected: 1, found: 0 });

        let err = batch().with_column("x", Column::Bool(vec![true])).unwrap_err();
        assert!(matches!(err, BatchError::ColumnLength { .. }));

        let err = batch().with_column("energy", Column::Float(vec![0.0; 3])).unwrap_err();
        assert_eq!(err, BatchError::ReservedColumn("energy".into()));
    }

    #[test]
    fn test_first_is_lowest_energy() {
        let b = batch();
        assert_eq!(b.first(), Some((&[-1i8, -1][..], -2.0)));
        assert_eq!(SampleBatch::<u8>::empty(vec![], Vartype::Binary).first(), None);
    }

    #[test]
    fn test_select_realigns_columns() {
        let picked = batch().select(&[2, 0]).unwrap();
        assert_eq!(picked.samples(), &[vec![1, 1], vec![1, -1]]);
        assert_eq!(picked.energies(), &[1.0, 0.5]);
        assert_eq!(picked.column("num_occurrences"), Some(&Column::Int(vec![2, 3])));
        assert_eq!(picked.info_value("solver").and_then(InfoValue::as_text), Some("test"));

        assert_eq!(batch().select(&[5]).unwrap_err(), BatchError::RowIndex { index: 5, len: 3 });

        let flagged = batch().with_column("is_feasible", Column::Bool(vec![true, false, true])).unwrap();
        let picked = flagged.select(&[1, 1]).unwrap();
        assert_eq!(picked.column("is_feasible").and_then(Column::as_bool), Some(&[false, false][..]));
        assert_eq!(picked.column("num_occurrences").and_then(Column::as_bool), None);
    }

    #[test]
    fn test_empty_like_keeps_column_types() {
        let empty = batch().empty_like(vec![7u32]);
        assert!(empty.is_empty());
        assert_eq!(empty.column("num_occurrences"), Some(&Column::Int(vec![])));
        assert_eq!(empty.variables(), &[7]);
    }

    #[test]
    fn test_concatenate() {
        let joined = SampleBatch::concatenate([batch(), batch().select(&[1]).unwrap()]).unwrap();
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.column("num_occurrences").and_then(Column::as_int), Some(&[3, 1, 2, 1][..]));
    }

    #[test]
    fn test_concatenate_rejects_mismatch() {
        let other = SampleBatch::from_samples(vec!["a", "b"], vec![vec![1, 1]], Vartype::Spin, vec![0.0])
            .unwrap()
            .with_column("num_occurrences", Column::Float(vec![1.0]))
            .unwrap();
        assert!(matches!(
            SampleBatch::concatenate([batch(), other]),
            Err(BatchError::Incompatible(_))
        ));
        assert!(SampleBatch::<u8>::concatenate([]).is_err());
    }

    #[test]
    fn test_index_of() {
        assert_eq!(batch().index_of(&"b"), Some(1));
        assert_eq!(batch().index_of(&"z"), None);
    }
}
