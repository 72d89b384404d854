//! Trainer hyperparameter extraction

use super::literal::parse_string_list;
use super::{required_string, started_at, ResultSet, BENCHMARK_KEY, RUN_ID_KEY, STARTED_AT};
use crate::config::OverviewConfig;
use crate::scalar::{parse_scalar, PropertyMap, Scalar};
use crate::store::MetadataStore;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const HPARAMS: &str = "hparams";
const TRAINER_ID: &str = "component_id";

/// Parse a serialized hyperparameter list into a property map.
///
/// Each item is split on its first `=`; the value is coerced with
/// [`parse_scalar`].
///
/// # Errors
///
/// Returns [`Error::ParseError`] if the input is not a list of string
/// literals or an item has no `=`.
///
/// # Example
///
/// ```rust
/// use bench_overview::results::parse_hparams;
/// use bench_overview::Scalar;
///
/// let hparams = parse_hparams("['batch_size=256', 'optimizer=adam']")?;
/// assert_eq!(hparams["batch_size"], Scalar::Integer(256));
/// assert_eq!(hparams["optimizer"], Scalar::from("adam"));
/// # Ok::<(), bench_overview::Error>(())
/// ```
pub fn parse_hparams(serialized: &str) -> Result<PropertyMap> {
    let mut hparams = PropertyMap::new();
    for item in parse_string_list(serialized)? {
        let (name, value) = item.split_once('=').ok_or_else(|| {
            Error::ParseError(format!("hyperparameter {item:?} is not of the form name=value"))
        })?;
        hparams.insert(name.to_string(), parse_scalar(value));
    }
    Ok(hparams)
}

/// Load the hyperparameters of every trainer execution.
///
/// Entries are keyed by run id plus the trainer's component id with the
/// configured prefix stripped, e.g. `1600000000.mnist.run_1_of_2`. Property
/// names are the sorted hyperparameter names.
///
/// # Errors
///
/// Returns [`Error::MissingProperty`] if a trainer lacks `run_id`,
/// `hparams` or `component_id`, [`Error::ParseError`] if its
/// hyperparameters cannot be parsed, and any store error.
pub fn get_hparams<S: MetadataStore + ?Sized>(
    store: &S,
    config: &OverviewConfig,
) -> Result<ResultSet> {
    let executions = store.get_executions_by_type(config.trainer_type())?;
    debug!(
        trainer_type = config.trainer_type(),
        count = executions.len(),
        "Loaded trainer executions"
    );

    let mut properties = BTreeMap::new();
    let mut hparam_names = BTreeSet::new();
    for execution in &executions {
        let run_id = required_string(execution, RUN_ID_KEY)?;
        let mut hparams = parse_hparams(required_string(execution, HPARAMS)?)?;
        hparam_names.extend(hparams.keys().cloned());

        let component_id = required_string(execution, TRAINER_ID)?;
        let trainer_id = component_id
            .strip_prefix(config.trainer_id_prefix())
            .unwrap_or(component_id);
        // Drop the separator that followed the prefix
        let mut benchmark = trainer_id.chars();
        benchmark.next();

        hparams.insert(RUN_ID_KEY.to_string(), Scalar::from(run_id));
        hparams.insert(BENCHMARK_KEY.to_string(), Scalar::from(benchmark.as_str()));
        hparams.insert(STARTED_AT.to_string(), started_at(run_id));
        properties.insert(format!("{run_id}{trainer_id}"), hparams);
    }

    Ok(ResultSet {
        properties,
        property_names: hparam_names.into_iter().collect(),
    })
}
