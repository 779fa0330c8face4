//! Dynamb-level filtering.
use std::path::Path;

use log::trace;
use serde_json::Value;

use super::Filter;
use crate::dynamb::Dynamb;
use crate::error::Error;

/// Filters dynambs against declaratively configured acceptance criteria.
///
/// Each criterion set is independently optional: it constrains evaluation
/// only when its parameter was supplied as an array at construction. An
/// active criterion with an empty array rejects every record; an absent
/// criterion imposes no constraint at all. A record passes the filter iff
/// it passes every active criterion.
#[derive(Debug, Clone, Default)]
pub struct DynambFilter {
    accepted_device_signatures: Option<Vec<String>>,
    accepted_device_ids: Option<Vec<String>>,
    accepted_device_id_types: Option<Vec<String>>,
    accepted_properties: Option<Vec<String>>,
}

impl DynambFilter {
    /// Build a filter from a JSON parameters object.
    ///
    /// A criterion becomes active only if its key holds an array; a missing
    /// key, a non-array value, or a non-object parameters document leaves it
    /// inactive. Total: malformed parameters degrade to "no constraint",
    /// never to an error.
    pub fn new(parameters: &Value) -> Self {
        DynambFilter {
            accepted_device_signatures: criterion(parameters, "acceptedDeviceSignatures"),
            accepted_device_ids: criterion(parameters, "acceptedDeviceIds"),
            accepted_device_id_types: criterion(parameters, "acceptedDeviceIdTypes"),
            accepted_properties: criterion(parameters, "acceptedProperties"),
        }
    }

    /// Parse a JSON parameters document and build as per [DynambFilter::new].
    ///
    /// Only a syntactically invalid document errors; malformed criterion
    /// values inside valid JSON still degrade silently.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let parameters: Value = serde_json::from_str(json)?;
        Ok(Self::new(&parameters))
    }

    /// Read a JSON parameters file and build as per [DynambFilter::new].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// specify accepted `deviceId/deviceIdType` signatures
    pub fn with_accepted_device_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_device_signatures = Some(signatures.into_iter().map(Into::into).collect());
        self
    }

    /// specify accepted device identifiers
    pub fn with_accepted_device_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_device_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// specify accepted device identifier types, in canonical string form
    pub fn with_accepted_device_id_types<I, S>(mut self, id_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_device_id_types = Some(id_types.into_iter().map(Into::into).collect());
        self
    }

    /// specify accepted property names
    pub fn with_accepted_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Does the filter observe an acceptedDeviceSignatures parameter?
    pub fn has_accepted_device_signatures(&self) -> bool {
        self.accepted_device_signatures.is_some()
    }

    /// Does the filter observe an acceptedDeviceIds parameter?
    pub fn has_accepted_device_ids(&self) -> bool {
        self.accepted_device_ids.is_some()
    }

    /// Does the filter observe an acceptedDeviceIdTypes parameter?
    pub fn has_accepted_device_id_types(&self) -> bool {
        self.accepted_device_id_types.is_some()
    }

    /// Does the filter observe an acceptedProperties parameter?
    pub fn has_accepted_properties(&self) -> bool {
        self.accepted_properties.is_some()
    }

    /// Does the given dynamb pass every active criterion?
    ///
    /// Evaluation short-circuits at the first failing criterion; with no
    /// active criteria every record passes.
    pub fn is_passing(&self, dynamb: &Dynamb) -> bool {
        if let Some(accepted) = &self.accepted_device_signatures {
            if !test_device_signatures(accepted, dynamb) {
                trace!("dynamb {:?} rejected on device signature", dynamb.device_id);
                return false;
            }
        }
        if let Some(accepted) = &self.accepted_device_id_types {
            if !test_device_id_types(accepted, dynamb) {
                trace!("dynamb {:?} rejected on device id type", dynamb.device_id);
                return false;
            }
        }
        if let Some(accepted) = &self.accepted_device_ids {
            if !test_device_ids(accepted, dynamb) {
                trace!("dynamb {:?} rejected on device id", dynamb.device_id);
                return false;
            }
        }
        if let Some(accepted) = &self.accepted_properties {
            if !test_properties(accepted, dynamb) {
                trace!("dynamb {:?} rejected on properties", dynamb.device_id);
                return false;
            }
        }
        true
    }
}

impl Filter<&Dynamb> for DynambFilter {
    fn is_passing(&self, dynamb: &Dynamb) -> bool {
        DynambFilter::is_passing(self, dynamb)
    }
}

/// Extract one criterion set from the parameters object.
///
/// Present iff the key holds an array. Elements are reduced to canonical
/// string form; null, array and object elements can never equal a record
/// string and are dropped.
fn criterion(parameters: &Value, key: &str) -> Option<Vec<String>> {
    parameters
        .get(key)?
        .as_array()
        .map(|values| values.iter().filter_map(canonical_string).collect())
}

fn canonical_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Test the dynamb's composite signature against the accepted ones.
fn test_device_signatures(accepted: &[String], dynamb: &Dynamb) -> bool {
    match dynamb.signature() {
        Some(signature) => accepted.contains(&signature),
        None => false,
    }
}

/// Test the dynamb's deviceIdType, in canonical string form, against the
/// accepted ones.
fn test_device_id_types(accepted: &[String], dynamb: &Dynamb) -> bool {
    match &dynamb.device_id_type {
        Some(id_type) => accepted.contains(&id_type.to_string()),
        None => false,
    }
}

/// Test the dynamb's deviceId against the accepted ones.
fn test_device_ids(accepted: &[String], dynamb: &Dynamb) -> bool {
    match &dynamb.device_id {
        Some(id) => accepted.iter().any(|accepted_id| accepted_id == id),
        None => false,
    }
}

/// Test whether at least one of the dynamb's property names is accepted.
/// Only names are compared; property values are never inspected.
fn test_properties(accepted: &[String], dynamb: &Dynamb) -> bool {
    dynamb
        .property_names()
        .any(|name| accepted.iter().any(|accepted_name| accepted_name == name))
}
