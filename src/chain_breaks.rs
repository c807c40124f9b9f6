//! Chain-break resolution policies.
//!
//! A chain is *broken* in a sample when its target nodes do not all carry the
//! same value. Unembedding has to turn every chain back into a single source
//! value; a [`ChainBreakMethod`] decides how, and may also drop rows.
//!
//! Policies see the target samples as a dense matrix (rows of values, one
//! column per target variable) and the chains as lists of column indices, so
//! they never deal with labels.
//!
//! | Policy | Broken chain | Rows kept |
//! |--------|--------------|-----------|
//! | [`MajorityVote`] | most common value, ties to the high value | all |
//! | [`Discard`] | row is dropped | unbroken only |

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::model::Vartype;

/// Output of a chain-break policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One row per retained sample, one value per chain.
    pub samples: Vec<Vec<i8>>,
    /// Index of each retained sample in the input, in output order.
    pub retained: Vec<usize>,
}

impl Resolution {
    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    /// Whether every row was dropped.
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Strategy for collapsing chains into source values.
///
/// Implementations must return rows in the same order as `retained`, and
/// `retained` must be strictly increasing indices into `samples`.
pub trait ChainBreakMethod {
    /// Failure type of the policy. Built-in policies never fail.
    type Error;

    /// Short identifier, recorded in unembedding annotations.
    fn name(&self) -> &str;

    /// Resolve every chain of every row of `samples`.
    ///
    /// `chains[k]` lists the columns of `samples` that make up chain `k`;
    /// the output rows have one value per chain in that order.
    fn resolve(
        &self,
        samples: &[Vec<i8>],
        vartype: Vartype,
        chains: &[Vec<usize>],
    ) -> Result<Resolution, Self::Error>;
}

impl<P: ChainBreakMethod + ?Sized> ChainBreakMethod for &P {
    type Error = P::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(
        &self,
        samples: &[Vec<i8>],
        vartype: Vartype,
        chains: &[Vec<usize>],
    ) -> Result<Resolution, Self::Error> {
        (**self).resolve(samples, vartype, chains)
    }
}

/// Per-row, per-chain broken flags.
///
/// `out[r][k]` is true when the nodes of chain `k` disagree in row `r`.
/// Chains with fewer than two nodes are never broken.
pub fn broken_chains(samples: &[Vec<i8>], chains: &[Vec<usize>]) -> Vec<Vec<bool>> {
    samples
        .iter()
        .map(|row| chains.iter().map(|chain| is_broken(row, chain)).collect())
        .collect()
}

fn is_broken(row: &[i8], chain: &[usize]) -> bool {
    match chain.split_first() {
        Some((&first, rest)) => rest.iter().any(|&i| row[i] != row[first]),
        None => false,
    }
}

// ─── MajorityVote ─────────────────────────────────────────────────────────────

/// Each chain takes its most common value. Ties go to the high value
/// (`+1` for spin, `1` for binary). Every row is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MajorityVote;

impl ChainBreakMethod for MajorityVote {
    type Error = Infallible;

    fn name(&self) -> &str {
        "majority_vote"
    }

    fn resolve(
        &self,
        samples: &[Vec<i8>],
        vartype: Vartype,
        chains: &[Vec<usize>],
    ) -> Result<Resolution, Infallible> {
        let [low, high] = vartype.values();
        let resolved = samples
            .iter()
            .map(|row| {
                chains
                    .iter()
                    .map(|chain| {
                        let votes = chain.iter().filter(|&&i| row[i] == high).count();
                        if 2 * votes >= chain.len() {
                            high
                        } else {
                            low
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(Resolution {
            samples: resolved,
            retained: (0..samples.len()).collect(),
        })
    }
}

// ─── Discard ──────────────────────────────────────────────────────────────────

/// Drop every row in which any chain is broken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Discard;

impl ChainBreakMethod for Discard {
    type Error = Infallible;

    fn name(&self) -> &str {
        "discard"
    }

    fn resolve(
        &self,
        samples: &[Vec<i8>],
        vartype: Vartype,
        chains: &[Vec<usize>],
    ) -> Result<Resolution, Infallible> {
        let [_, high] = vartype.values();
        let mut out = Resolution::default();
        for (r, row) in samples.iter().enumerate() {
            if chains.iter().any(|chain| is_broken(row, chain)) {
                continue;
            }
            out.samples
                .push(chains.iter().map(|chain| chain.first().map_or(high, |&i| row[i])).collect());
            out.retained.push(r);
        }
        Ok(out)
    }
}

// ─── ChainBreakStrategy ───────────────────────────────────────────────────────

/// Closed choice over the built-in policies.
///
/// Lets one run mix policies of different types, as
/// [`unembed_many`](crate::unembed_many) needs a single policy type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChainBreakStrategy {
    /// See [`MajorityVote`].
    #[default]
    MajorityVote,
    /// See [`Discard`].
    Discard,
}

impl ChainBreakMethod for ChainBreakStrategy {
    type Error = Infallible;

    fn name(&self) -> &str {
        match self {
            Self::MajorityVote => MajorityVote.name(),
            Self::Discard => Discard.name(),
        }
    }

    fn resolve(
        &self,
        samples: &[Vec<i8>],
        vartype: Vartype,
        chains: &[Vec<usize>],
    ) -> Result<Resolution, Infallible> {
        match self {
            Self::MajorityVote => MajorityVote.resolve(samples, vartype, chains),
            Self::Discard => Discard.resolve(samples, vartype, chains),
        }
    }
}

impl From<MajorityVote> for ChainBreakStrategy {
    fn from(_: MajorityVote) -> Self {
        Self::MajorityVote
    }
}

impl From<Discard> for ChainBreakStrategy {
    fn from(_: Discard) -> Self {
        Self::Discard
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
