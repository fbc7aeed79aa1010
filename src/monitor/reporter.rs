//! Statistics reporting capability.
//!
//! Any component with internal counters implements [`StatisticsReporter`].
//! The monitor calls it without knowing the concrete component type.

use std::collections::BTreeMap;

use serde::Serialize;

/// Tag set attached to a statistic. Ordered so output is stable.
pub type Tags = BTreeMap<String, String>;

/// A numeric statistic value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
}

impl Value {
    /// Lossy conversion for sinks that only understand floats.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Integer(v) => v as f64,
            Value::Float(v) => v,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// A named, tagged group of numeric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub name: String,
    pub tags: Tags,
    pub values: BTreeMap<String, Value>,
}

impl Statistic {
    /// Create a statistic with no tags or values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Tags::new(),
            values: BTreeMap::new(),
        }
    }

    /// Add one of the statistic's own tags.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Merge caller tags into this statistic. Caller tags win on collision.
    pub fn merge_tags(mut self, caller: &Tags) -> Self {
        for (k, v) in caller {
            self.tags.insert(k.clone(), v.clone());
        }
        self
    }
}

/// Gathers internal statistics from a component.
///
/// Implementations must not block and must not change the component's
/// externally visible state. A statistic that cannot be computed is left
/// out rather than failing the call.
pub trait StatisticsReporter: Send + Sync {
    /// Statistics for this reporter with `tags` merged into each one.
    fn statistics(&self, tags: &Tags) -> Vec<Statistic>;
}

/// Build a tag set from string pairs.
pub fn tags<I, K, V>(pairs: I) -> Tags
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_tags_win_on_collision() {
        let stat = Statistic::new("engine").with_tag("env", "prod");
        let merged = stat.merge_tags(&tags([("env", "staging"), ("region", "us")]));

        assert_eq!(merged.tags, tags([("env", "staging"), ("region", "us")]));
    }

    #[test]
    fn own_tags_kept_without_collision() {
        let stat = Statistic::new("httpd").with_tag("bind", ":8086");
        let merged = stat.merge_tags(&tags([("host", "node-1")]));

        assert_eq!(merged.tags.get("bind").map(String::as_str), Some(":8086"));
        assert_eq!(merged.tags.get("host").map(String::as_str), Some("node-1"));
    }

    #[test]
    fn values_serialize_as_plain_numbers() {
        let stat = Statistic::new("runtime")
            .with_value("tasks", 3_i64)
            .with_value("load", 0.5);
        let json = serde_json::to_value(&stat).unwrap();

        assert_eq!(json["values"]["tasks"], 3);
        assert_eq!(json["values"]["load"], 0.5);
    }
}
