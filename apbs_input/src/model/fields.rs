//! Typed access to structured mappings and the value checks shared by records

use super::error::{ModelError, ModelResult};
use serde_json::Value as JsonValue;

/// Object form every typed record loads from and dumps to
pub type Mapping = serde_json::Map<String, JsonValue>;

/// Read-only view over a mapping with typed getters
///
/// Required getters fail with `MissingKey` when the key is absent. A `null`
/// value is the unset placeholder and reads as `None` so the record is left
/// unchanged; `validate` reports the attribute later.
pub struct Fields<'a> {
    mapping: &'a Mapping,
}

impl<'a> Fields<'a> {
    pub fn new(mapping: &'a Mapping) -> Self {
        Self { mapping }
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.mapping.get(key), Some(value) if !value.is_null())
    }

    fn required(&self, key: &str) -> ModelResult<Option<&'a JsonValue>> {
        match self.mapping.get(key) {
            None => Err(ModelError::missing_key(key)),
            Some(JsonValue::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    fn optional(&self, key: &str) -> Option<&'a JsonValue> {
        self.mapping.get(key).filter(|value| !value.is_null())
    }

    pub fn string(&self, key: &str) -> ModelResult<Option<String>> {
        self.required(key)?
            .map(|value| to_string(key, value))
            .transpose()
    }

    pub fn opt_string(&self, key: &str) -> ModelResult<Option<String>> {
        self.optional(key)
            .map(|value| to_string(key, value))
            .transpose()
    }

    pub fn number(&self, key: &str) -> ModelResult<Option<f64>> {
        self.required(key)?
            .map(|value| to_number(key, value))
            .transpose()
    }

    pub fn opt_number(&self, key: &str) -> ModelResult<Option<f64>> {
        self.optional(key)
            .map(|value| to_number(key, value))
            .transpose()
    }

    pub fn integer(&self, key: &str) -> ModelResult<Option<i64>> {
        self.required(key)?
            .map(|value| to_integer(key, value))
            .transpose()
    }

    pub fn opt_integer(&self, key: &str) -> ModelResult<Option<i64>> {
        self.optional(key)
            .map(|value| to_integer(key, value))
            .transpose()
    }

    pub fn boolean(&self, key: &str) -> ModelResult<Option<bool>> {
        self.required(key)?
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| ModelError::type_mismatch(key, "a Boolean", value))
            })
            .transpose()
    }

    pub fn opt_boolean(&self, key: &str) -> ModelResult<Option<bool>> {
        self.optional(key)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| ModelError::type_mismatch(key, "a Boolean", value))
            })
            .transpose()
    }

    pub fn triple(&self, key: &str) -> ModelResult<Option<[f64; 3]>> {
        self.required(key)?
            .map(|value| to_triple(key, value, to_number))
            .transpose()
    }

    pub fn opt_triple(&self, key: &str) -> ModelResult<Option<[f64; 3]>> {
        self.optional(key)
            .map(|value| to_triple(key, value, to_number))
            .transpose()
    }

    pub fn int_triple(&self, key: &str) -> ModelResult<Option<[i64; 3]>> {
        self.required(key)?
            .map(|value| to_triple(key, value, to_integer))
            .transpose()
    }

    pub fn opt_int_triple(&self, key: &str) -> ModelResult<Option<[i64; 3]>> {
        self.optional(key)
            .map(|value| to_triple(key, value, to_integer))
            .transpose()
    }

    /// Nested record stored under `key`
    pub fn object<T>(
        &self,
        key: &str,
        load: impl FnOnce(&Mapping) -> ModelResult<T>,
    ) -> ModelResult<Option<T>> {
        match self.required(key)? {
            None => Ok(None),
            Some(value) => load(to_object(key, value)?).map(Some),
        }
    }

    pub fn opt_object<T>(
        &self,
        key: &str,
        load: impl FnOnce(&Mapping) -> ModelResult<T>,
    ) -> ModelResult<Option<T>> {
        match self.optional(key) {
            None => Ok(None),
            Some(value) => load(to_object(key, value)?).map(Some),
        }
    }

    /// List of nested records; an absent list is empty
    pub fn records<T>(
        &self,
        key: &str,
        load: impl Fn(&Mapping) -> ModelResult<T>,
    ) -> ModelResult<Vec<T>> {
        match self.optional(key) {
            None => Ok(Vec::new()),
            Some(value) => to_records(key, value, load),
        }
    }

    /// List of nested records that must be present; null reads as empty
    pub fn list<T>(
        &self,
        key: &str,
        load: impl Fn(&Mapping) -> ModelResult<T>,
    ) -> ModelResult<Vec<T>> {
        match self.required(key)? {
            None => Ok(Vec::new()),
            Some(value) => to_records(key, value, load),
        }
    }
}

fn to_records<T>(
    key: &str,
    value: &JsonValue,
    load: impl Fn(&Mapping) -> ModelResult<T>,
) -> ModelResult<Vec<T>> {
    let items = value
        .as_array()
        .ok_or_else(|| ModelError::type_mismatch(key, "a list", value))?;
    items
        .iter()
        .map(|item| load(to_object(key, item)?))
        .collect()
}

pub fn expect_object<'a>(key: &str, value: &'a JsonValue) -> ModelResult<&'a Mapping> {
    to_object(key, value)
}

fn to_object<'a>(key: &str, value: &'a JsonValue) -> ModelResult<&'a Mapping> {
    value
        .as_object()
        .ok_or_else(|| ModelError::type_mismatch(key, "a mapping", value))
}

fn to_string(key: &str, value: &JsonValue) -> ModelResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ModelError::type_mismatch(key, "a string", value))
}

fn to_number(key: &str, value: &JsonValue) -> ModelResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| ModelError::type_mismatch(key, "a number", value))
}

fn to_integer(key: &str, value: &JsonValue) -> ModelResult<i64> {
    if let Some(integer) = value.as_i64() {
        return Ok(integer);
    }
    match value.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => Ok(float as i64),
        _ => Err(ModelError::type_mismatch(key, "an integer", value)),
    }
}

fn to_triple<T: Copy + Default>(
    key: &str,
    value: &JsonValue,
    convert: fn(&str, &JsonValue) -> ModelResult<T>,
) -> ModelResult<[T; 3]> {
    let items = value
        .as_array()
        .filter(|items| items.len() == 3)
        .ok_or_else(|| ModelError::type_mismatch(key, "a list of 3 values", value))?;
    let mut triple = [T::default(); 3];
    for (slot, item) in triple.iter_mut().zip(items) {
        *slot = convert(key, item)?;
    }
    Ok(triple)
}

/// Builds a mapping, omitting unset attributes and empty lists
#[derive(Debug, Default)]
pub struct MappingBuilder {
    mapping: Mapping,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.mapping.insert(key.to_string(), value.into());
        self
    }

    pub fn opt<T: Into<JsonValue>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn opt_triple<T: Into<JsonValue> + Copy>(self, key: &str, value: Option<[T; 3]>) -> Self {
        match value {
            Some(triple) => self.set(key, triple_value(triple)),
            None => self,
        }
    }

    pub fn opt_object(self, key: &str, value: Option<Mapping>) -> Self {
        self.opt(key, value.map(JsonValue::Object))
    }

    pub fn records(self, key: &str, records: Vec<Mapping>) -> Self {
        if records.is_empty() {
            return self;
        }
        self.set(
            key,
            JsonValue::Array(records.into_iter().map(JsonValue::Object).collect()),
        )
    }

    /// Write a list of records even when it is empty
    pub fn list(self, key: &str, records: Vec<Mapping>) -> Self {
        self.set(
            key,
            JsonValue::Array(records.into_iter().map(JsonValue::Object).collect()),
        )
    }

    /// Copy every key of `other` into this mapping
    pub fn merge(mut self, other: Mapping) -> Self {
        self.mapping.extend(other);
        self
    }

    pub fn build(self) -> Mapping {
        self.mapping
    }
}

pub fn triple_value<T: Into<JsonValue> + Copy>(triple: [T; 3]) -> JsonValue {
    JsonValue::Array(triple.iter().map(|&item| item.into()).collect())
}

/// Domain checks shared by setters and validators
///
/// Each returns the accepted value or the sentence describing the violation.
pub mod checks {
    pub type CheckResult<T> = Result<T, String>;

    pub fn positive(name: &str, value: f64) -> CheckResult<f64> {
        if value > 0.0 {
            Ok(value)
        } else {
            Err(format!("Value {} for {} is not a positive number.", value, name))
        }
    }

    pub fn non_negative(name: &str, value: f64) -> CheckResult<f64> {
        if value >= 0.0 {
            Ok(value)
        } else {
            Err(format!(
                "Value {} for {} is not a non-negative number.",
                value, name
            ))
        }
    }

    pub fn at_least_one(name: &str, value: f64) -> CheckResult<f64> {
        if value >= 1.0 {
            Ok(value)
        } else {
            Err(format!("Value {} for {} is not >= 1.", value, name))
        }
    }

    /// Strictly between zero and one
    pub fn unit_open(name: &str, value: f64) -> CheckResult<f64> {
        if value > 0.0 && value < 1.0 {
            Ok(value)
        } else {
            Err(format!(
                "Value {} for {} is not a positive number less than 1.",
                value, name
            ))
        }
    }

    pub fn positive_integer(name: &str, value: i64) -> CheckResult<i64> {
        if value > 0 {
            Ok(value)
        } else {
            Err(format!("Value {} for {} is not a positive integer.", value, name))
        }
    }

    pub fn positive_triple(name: &str, value: [f64; 3]) -> CheckResult<[f64; 3]> {
        if value.iter().all(|&v| v > 0.0) {
            Ok(value)
        } else {
            Err(format!(
                "Vector {:?} for {} does not contain positive numbers.",
                value, name
            ))
        }
    }

    pub fn positive_int_triple(name: &str, value: [i64; 3]) -> CheckResult<[i64; 3]> {
        if value.iter().all(|&v| v > 0) {
            Ok(value)
        } else {
            Err(format!(
                "Vector {:?} for {} does not contain positive integers.",
                value, name
            ))
        }
    }

    pub fn non_empty(name: &str, value: &str) -> CheckResult<String> {
        if value.trim().is_empty() {
            Err(format!("{} is empty.", name))
        } else {
            Ok(value.to_string())
        }
    }

    /// Lowercased member of a closed vocabulary
    pub fn choice(name: &str, value: &str, allowed: &[&str]) -> CheckResult<String> {
        let normalized = value.to_lowercase();
        if allowed.contains(&normalized.as_str()) {
            Ok(normalized)
        } else {
            Err(format!("{} is not an allowed value for {}.", value, name))
        }
    }
}

/// Turn a failed check into the setter error
pub fn accept<T>(result: checks::CheckResult<T>) -> ModelResult<T> {
    result.map_err(ModelError::out_of_domain)
}

/// Aliases that occur more than once, in first-seen order
pub fn duplicate_aliases<'a>(aliases: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for alias in aliases {
        if !seen.insert(alias) && !duplicates.contains(&alias) {
            duplicates.push(alias);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn mapping(value: JsonValue) -> Mapping {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_and_placeholder() {
        let m = mapping(json!({"temperature": 298.15, "molecule": null}));
        let fields = Fields::new(&m);
        assert_eq!(fields.number("temperature").unwrap(), Some(298.15));
        assert_eq!(fields.string("molecule").unwrap(), None);
        assert_matches!(
            fields.string("pressure"),
            Err(ModelError::MissingKey { key }) if key == "pressure"
        );
        assert_eq!(fields.opt_string("pressure").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch() {
        let m = mapping(json!({"counts": [65, 65], "parallel": "yes", "rank": 1.5}));
        let fields = Fields::new(&m);
        assert_matches!(fields.int_triple("counts"), Err(ModelError::TypeMismatch { .. }));
        assert_matches!(fields.boolean("parallel"), Err(ModelError::TypeMismatch { .. }));
        assert_matches!(fields.integer("rank"), Err(ModelError::TypeMismatch { .. }));
    }

    #[test]
    fn test_numbers_accept_integers() {
        let m = mapping(json!({"lengths": [32, 48.5, 224], "counts": [65.0, 97, 449]}));
        let fields = Fields::new(&m);
        assert_eq!(fields.triple("lengths").unwrap(), Some([32.0, 48.5, 224.0]));
        assert_eq!(fields.int_triple("counts").unwrap(), Some([65, 97, 449]));
    }

    #[test]
    fn test_builder_omits_unset() {
        let m = MappingBuilder::new()
            .set("alias", "mol1")
            .opt::<f64>("radius", None)
            .opt_triple("position", Some([1.0, 2.0, 3.0]))
            .records("species", Vec::new())
            .build();
        assert_eq!(
            JsonValue::Object(m),
            json!({"alias": "mol1", "position": [1.0, 2.0, 3.0]})
        );
    }

    #[test]
    fn test_required_lists() {
        let m = mapping(json!({"sums": [{"alias": "total"}], "exps": null}));
        let fields = Fields::new(&m);
        let load = |record: &Mapping| -> ModelResult<usize> { Ok(record.len()) };
        assert_eq!(fields.list("sums", load).unwrap(), vec![1]);
        assert_eq!(fields.list("exps", load).unwrap(), Vec::<usize>::new());
        assert_matches!(
            fields.list("products", load),
            Err(ModelError::MissingKey { key }) if key == "products"
        );
        assert_eq!(fields.records("products", load).unwrap(), Vec::<usize>::new());

        let written = MappingBuilder::new().list("products", Vec::new()).build();
        assert_eq!(JsonValue::Object(written), json!({"products": []}));
    }

    #[test]
    fn test_checks() {
        assert!(checks::positive("temperature", 0.0).is_err());
        assert!(checks::non_negative("pressure", 0.0).is_ok());
        assert!(checks::unit_open("error tolerance", 1.0).is_err());
        assert_eq!(
            checks::choice("equation", "Linearized PBE", &["linearized pbe"]).unwrap(),
            "linearized pbe"
        );
        assert_eq!(duplicate_aliases(["a", "b", "a", "a"]), vec!["a"]);
    }
}
