//! Metric aggregation functions
//!
//! Supported named aggregators (case-insensitive names):
//! - `mean`, `sum`, `median`, `std`, `var` over numeric cells
//! - `min`, `max` using the scalar total order
//! - `count`, `first`, `last`
//!
//! Null cells are skipped by every named aggregator. Custom aggregators see
//! the raw cells, nulls included.

use crate::scalar::Scalar;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// User-supplied aggregation over the cells of one group and column.
pub type AggregateFn = Arc<dyn Fn(&[Scalar]) -> Scalar + Send + Sync>;

/// An aggregation function applied to each metric column of each group.
#[derive(Clone)]
pub enum Aggregator {
    /// Arithmetic mean
    Mean,
    /// Sum; stays integer when every cell is an integer
    Sum,
    /// Smallest value
    Min,
    /// Largest value
    Max,
    /// Number of non-null cells
    Count,
    /// Median
    Median,
    /// Sample standard deviation
    Std,
    /// Sample variance
    Var,
    /// First non-null cell
    First,
    /// Last non-null cell
    Last,
    /// Caller-supplied function, labelled by `name`
    Custom {
        /// Label used in the aggregated column name
        name: String,
        /// The aggregation
        func: AggregateFn,
    },
}

impl Aggregator {
    /// Create a custom aggregator.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bench_overview::{Aggregator, Scalar};
    ///
    /// let range = Aggregator::custom("range", |values| {
    ///     let nums: Vec<f64> = values.iter().filter_map(Scalar::as_f64).collect();
    ///     let max = nums.iter().copied().fold(f64::MIN, f64::max);
    ///     let min = nums.iter().copied().fold(f64::MAX, f64::min);
    ///     Scalar::Float(max - min)
    /// });
    /// assert_eq!(range.name(), "range");
    /// assert_eq!(range.apply(&[Scalar::Float(0.5), Scalar::Float(0.75)]), Scalar::Float(0.25));
    /// ```
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Scalar]) -> Scalar + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Label used in aggregated column names.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Median => "median",
            Self::Std => "std",
            Self::Var => "var",
            Self::First => "first",
            Self::Last => "last",
            Self::Custom { name, .. } => name,
        }
    }

    /// Aggregate the cells of one group's column.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn apply(&self, values: &[Scalar]) -> Scalar {
        let present: Vec<&Scalar> = values.iter().filter(|v| !v.is_null()).collect();
        match self {
            Self::Custom { func, .. } => func(values),
            Self::Count => Scalar::Integer(present.len() as i64),
            Self::First => present.first().map_or(Scalar::Null, |&v| v.clone()),
            Self::Last => present.last().map_or(Scalar::Null, |&v| v.clone()),
            Self::Min => present.iter().min().map_or(Scalar::Null, |&v| v.clone()),
            Self::Max => present.iter().max().map_or(Scalar::Null, |&v| v.clone()),
            Self::Sum => sum(&present),
            Self::Mean => numeric(&present)
                .and_then(|nums| mean(&nums))
                .map_or(Scalar::Null, Scalar::Float),
            Self::Median => numeric(&present)
                .and_then(median)
                .map_or(Scalar::Null, Scalar::Float),
            Self::Var => numeric(&present)
                .and_then(|nums| variance(&nums))
                .map_or(Scalar::Null, Scalar::Float),
            Self::Std => numeric(&present)
                .and_then(|nums| variance(&nums))
                .map_or(Scalar::Null, |var| Scalar::Float(var.sqrt())),
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
            named => f.write_str(named.name()),
        }
    }
}

impl FromStr for Aggregator {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "mean" | "avg" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            "median" => Ok(Self::Median),
            "std" => Ok(Self::Std),
            "var" => Ok(Self::Var),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            _ => Err(Error::Config(format!("Unknown aggregator '{name}'"))),
        }
    }
}

/// Numeric view of the cells, or `None` if any cell is not numeric.
fn numeric(values: &[&Scalar]) -> Option<Vec<f64>> {
    values.iter().map(|v| v.as_f64()).collect()
}

fn sum(values: &[&Scalar]) -> Scalar {
    let integers: Option<Vec<i64>> = values
        .iter()
        .map(|v| match v {
            Scalar::Integer(i) => Some(*i),
            Scalar::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        })
        .collect();
    if let Some(total) = integers.and_then(|ints| ints.into_iter().try_fold(0_i64, i64::checked_add)) {
        return Scalar::Integer(total);
    }
    numeric(values).map_or(Scalar::Null, |nums| Scalar::Float(nums.iter().sum()))
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[allow(clippy::cast_precision_loss)]
fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(squares / (values.len() - 1) as f64)
}
