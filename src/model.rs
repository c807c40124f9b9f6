//! Quadratic models over two-valued variables.
//!
//! A [`QuadraticModel`] stores the energy function
//!
//! ```text
//! E(x) = offset + Σ_v a_v · x_v + Σ_(u,v) b_uv · x_u · x_v
//! ```
//!
//! where every `x_v` takes values from its [`Vartype`]: `{−1, +1}` for spins or
//! `{0, 1}` for binary variables. The two domains are related by the affine
//! substitution `s = 2x − 1`, and [`QuadraticModel::change_vartype`] rewrites
//! the coefficients so that corresponding assignments keep the same energy.
//!
//! # Invariants
//!
//! - Interactions are unordered: `(u, v)` and `(v, u)` name the same coefficient.
//! - Every endpoint of an interaction is also a variable (with zero linear
//!   bias if none was given).
//! - Variables and interactions iterate in insertion order.

use alloc::format;
use alloc::vec::Vec;

use crate::error::EmbeddingError;
use crate::{Map, Variable};

// ─── Vartype ──────────────────────────────────────────────────────────────────

/// The two-valued domain of a model's variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vartype {
    /// Variables take values in `{−1, +1}`.
    Spin,
    /// Variables take values in `{0, 1}`.
    Binary,
}

impl Vartype {
    /// The two admissible values, low first.
    pub fn values(self) -> [i8; 2] {
        match self {
            Vartype::Spin => [-1, 1],
            Vartype::Binary => [0, 1],
        }
    }

    /// Short lowercase name, `"spin"` or `"binary"`.
    pub fn name(self) -> &'static str {
        match self {
            Vartype::Spin => "spin",
            Vartype::Binary => "binary",
        }
    }
}

// ─── QuadraticModel ───────────────────────────────────────────────────────────

/// Linear, quadratic and constant coefficients over labelled variables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadraticModel<V: Variable> {
    linear: Map<V, f64>,
    #[cfg_attr(feature = "serde", serde(with = "pair_list"))]
    quadratic: Map<(V, V), f64>,
    offset: f64,
    vartype: Vartype,
}

impl<V: Variable> QuadraticModel<V> {
    /// Empty model with the given vartype.
    pub fn new(vartype: Vartype) -> Self {
        Self {
            linear: Map::default(),
            quadratic: Map::default(),
            offset: 0.0,
            vartype,
        }
    }

    /// Empty model sharing this model's vartype, over any label type.
    pub fn empty<W: Variable>(&self) -> QuadraticModel<W> {
        QuadraticModel::new(self.vartype)
    }

    /// Spin model from linear biases `h` and couplings `j`.
    pub fn from_ising<H, J>(h: H, j: J) -> Self
    where
        H: IntoIterator<Item = (V, f64)>,
        J: IntoIterator<Item = ((V, V), f64)>,
    {
        let mut model = Self::new(Vartype::Spin);
        for (v, bias) in h {
            model.add_variable(v, bias);
        }
        for ((u, v), bias) in j {
            model.add_interaction(u, v, bias);
        }
        model
    }

    /// Binary model from QUBO coefficients. Diagonal entries `(v, v)` are
    /// linear biases.
    pub fn from_qubo<Q>(q: Q) -> Self
    where
        Q: IntoIterator<Item = ((V, V), f64)>,
    {
        let mut model = Self::new(Vartype::Binary);
        for ((u, v), bias) in q {
            model.add_interaction(u, v, bias);
        }
        model
    }

    // ── Mutation ───────────────────────────────────────────────────────────

    /// Add `bias` to the linear coefficient of `v`, creating it if needed.
    pub fn add_variable(&mut self, v: V, bias: f64) {
        *self.linear.entry(v).or_insert(0.0) += bias;
    }

    /// Add `bias` to the coupling between `u` and `v`, creating both
    /// variables if needed.
    ///
    /// A self-pair is folded into the linear bias for binary models (`x² = x`)
    /// and into the offset for spin models (`s² = 1`).
    pub fn add_interaction(&mut self, u: V, v: V, bias: f64) {
        if u == v {
            match self.vartype {
                Vartype::Binary => self.add_variable(u, bias),
                Vartype::Spin => {
                    self.add_variable(u, 0.0);
                    self.offset += bias;
                }
            }
            return;
        }
        self.add_variable(u.clone(), 0.0);
        self.add_variable(v.clone(), 0.0);
        match self.pair_index(&u, &v) {
            Some(idx) => self.quadratic[idx] += bias,
            None => {
                self.quadratic.insert((u, v), bias);
            }
        }
    }

    /// Add `delta` to the constant offset.
    pub fn add_offset(&mut self, delta: f64) {
        self.offset += delta;
    }

    // ── Read accessors ─────────────────────────────────────────────────────

    /// The model's vartype.
    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// The constant offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Linear coefficient of `v`, if `v` is a variable.
    pub fn linear(&self, v: &V) -> Option<f64> {
        self.linear.get(v).copied()
    }

    /// Coupling between `u` and `v` in either order, if present.
    pub fn quadratic(&self, u: &V, v: &V) -> Option<f64> {
        self.pair_index(u, v).map(|idx| self.quadratic[idx])
    }

    /// Whether `v` is a variable of the model.
    pub fn contains(&self, v: &V) -> bool {
        self.linear.contains_key(v)
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &V> + '_ {
        self.linear.keys()
    }

    /// `(variable, bias)` pairs in insertion order.
    pub fn linear_terms(&self) -> impl Iterator<Item = (&V, f64)> + '_ {
        self.linear.iter().map(|(v, &b)| (v, b))
    }

    /// `(u, v, bias)` triples in insertion order.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (&V, &V, f64)> + '_ {
        self.quadratic.iter().map(|((u, v), &b)| (u, v, b))
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// Number of interactions.
    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    // ── Vartype conversion ─────────────────────────────────────────────────

    /// Copy of the model expressed in `vartype`.
    ///
    /// Energies are preserved under `s = 2x − 1`: an assignment and its image
    /// in the other domain evaluate to the same energy.
    pub fn change_vartype(&self, vartype: Vartype) -> Self {
        if vartype == self.vartype {
            return self.clone();
        }
        let mut out = Self::new(vartype);
        out.offset = self.offset;
        match vartype {
            // a·s = 2a·x − a ; J·s_u·s_v = 4J·x_u·x_v − 2J·x_u − 2J·x_v + J
            Vartype::Binary => {
                for (v, &a) in &self.linear {
                    out.add_variable(v.clone(), 2.0 * a);
                    out.offset -= a;
                }
                for ((u, v), &j) in &self.quadratic {
                    out.add_interaction(u.clone(), v.clone(), 4.0 * j);
                    out.add_variable(u.clone(), -2.0 * j);
                    out.add_variable(v.clone(), -2.0 * j);
                    out.offset += j;
                }
            }
            // a·x = a/2·s + a/2 ; b·x_u·x_v = b/4·(s_u·s_v + s_u + s_v + 1)
            Vartype::Spin => {
                for (v, &a) in &self.linear {
                    out.add_variable(v.clone(), 0.5 * a);
                    out.offset += 0.5 * a;
                }
                for ((u, v), &b) in &self.quadratic {
                    let q = 0.25 * b;
                    out.add_interaction(u.clone(), v.clone(), q);
                    out.add_variable(u.clone(), q);
                    out.add_variable(v.clone(), q);
                    out.offset += q;
                }
            }
        }
        out
    }

    /// Copy of the model in the spin domain.
    pub fn spin(&self) -> Self {
        self.change_vartype(Vartype::Spin)
    }

    /// Copy of the model in the binary domain.
    pub fn binary(&self) -> Self {
        self.change_vartype(Vartype::Binary)
    }

    // ── Energy ─────────────────────────────────────────────────────────────

    /// Energy of one assignment, given as values aligned with `variables`.
    ///
    /// `variables` must cover every model variable; extra columns are ignored.
    /// `values` must hold exactly one value per entry of `variables`.
    pub fn energy(&self, variables: &[V], values: &[i8]) -> Result<f64, EmbeddingError> {
        let columns = self.columns(variables)?;
        check_width(variables.len(), values.len(), None)?;
        Ok(self.energy_at(&columns, values))
    }

    /// Energies of many assignments sharing one variable order.
    pub fn energies(&self, variables: &[V], rows: &[Vec<i8>]) -> Result<Vec<f64>, EmbeddingError> {
        let columns = self.columns(variables)?;
        rows.iter()
            .enumerate()
            .map(|(r, row)| {
                check_width(variables.len(), row.len(), Some(r))?;
                Ok(self.energy_at(&columns, row))
            })
            .collect()
    }

    // ── Export ─────────────────────────────────────────────────────────────

    /// Linear biases, couplings and offset of the spin form of the model.
    pub fn to_ising(&self) -> (Map<V, f64>, Map<(V, V), f64>, f64) {
        let spin = self.spin();
        (spin.linear, spin.quadratic, spin.offset)
    }

    /// QUBO coefficients and offset of the binary form of the model.
    ///
    /// Couplings come first, followed by every linear bias on the diagonal.
    pub fn to_qubo(&self) -> (Map<(V, V), f64>, f64) {
        let binary = self.binary();
        let mut q = binary.quadratic;
        for (v, b) in binary.linear {
            q.insert((v.clone(), v), b);
        }
        (q, binary.offset)
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn pair_index(&self, u: &V, v: &V) -> Option<usize> {
        self.quadratic
            .get_index_of(&(u.clone(), v.clone()))
            .or_else(|| self.quadratic.get_index_of(&(v.clone(), u.clone())))
    }

    /// Column of each model variable (in model order) within `variables`.
    fn columns(&self, variables: &[V]) -> Result<Vec<usize>, EmbeddingError> {
        let position: Map<&V, usize> = variables.iter().enumerate().map(|(i, v)| (v, i)).collect();
        self.linear
            .keys()
            .map(|v| {
                position
                    .get(v)
                    .copied()
                    .ok_or_else(|| EmbeddingError::Mismatch(format!("no value for variable {v:?}")))
            })
            .collect()
    }

    fn energy_at(&self, columns: &[usize], values: &[i8]) -> f64 {
        let mut energy = self.offset;
        for (idx, &bias) in self.linear.values().enumerate() {
            energy += bias * f64::from(values[columns[idx]]);
        }
        for ((u, v), &bias) in &self.quadratic {
            // Both endpoints are variables, so both indices exist.
            let (Some(iu), Some(iv)) = (self.linear.get_index_of(u), self.linear.get_index_of(v)) else {
                continue;
            };
            energy += bias * f64::from(values[columns[iu]]) * f64::from(values[columns[iv]]);
        }
        energy
    }
}

fn check_width(expected: usize, found: usize, row: Option<usize>) -> Result<(), EmbeddingError> {
    if expected == found {
        return Ok(());
    }
    let what = match row {
        Some(r) => format!("row {r}"),
        None => "assignment".into(),
    };
    Err(EmbeddingError::Mismatch(format!(
        "{what} has {found} values for {expected} variables"
    )))
}

// ─── Serde ────────────────────────────────────────────────────────────────────

/// Interactions as a list of `[[u, v], bias]` entries, since formats such as
/// JSON only accept string map keys.
#[cfg(feature = "serde")]
mod pair_list {
    use alloc::vec::Vec;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::{Map, Variable};

    pub fn serialize<V, S>(map: &Map<(V, V), f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Variable + Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<Map<(V, V), f64>, D::Error>
    where
        V: Variable + Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let entries: Vec<((V, V), f64)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
