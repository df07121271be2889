use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Player name to metric, kept in insertion order.
///
/// Serialized as a plain JSON object. Insertion order is what breaks ties on
/// the leaderboard, so it survives load/save and removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
  entries: Vec<(String, i64)>,
}

impl PlayerStats {
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, name: &str) -> Option<i64> {
    self
      .entries
      .iter()
      .find(|(existing, _)| existing == name)
      .map(|(_, value)| *value)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.get(name).is_some()
  }

  pub fn get_mut(&mut self, name: &str) -> Option<&mut i64> {
    self
      .entries
      .iter_mut()
      .find(|(existing, _)| existing == name)
      .map(|(_, value)| value)
  }

  /// Sets `name`, appending it when new. Returns the previous value.
  pub fn insert(&mut self, name: String, value: i64) -> Option<i64> {
    if let Some(slot) = self.get_mut(&name) {
      return Some(std::mem::replace(slot, value));
    }
    self.entries.push((name, value));
    None
  }

  pub fn remove(&mut self, name: &str) -> Option<i64> {
    let index = self.entries.iter().position(|(existing, _)| existing == name)?;
    Some(self.entries.remove(index).1)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
    self
      .entries
      .iter()
      .map(|(name, value)| (name.as_str(), *value))
  }

  /// Highest value first; equal values keep insertion order.
  pub fn ranked(&self) -> Vec<(&str, i64)> {
    let mut ranked = self.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
  }
}

impl<S: Into<String>> FromIterator<(S, i64)> for PlayerStats {
  fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
    let mut stats = PlayerStats::default();
    for (name, value) in iter {
      stats.insert(name.into(), value);
    }
    stats
  }
}

impl Serialize for PlayerStats {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (name, value) in &self.entries {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for PlayerStats {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct StatsVisitor;

    impl<'de> Visitor<'de> for StatsVisitor {
      type Value = PlayerStats;

      fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of player names to integers")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut stats = PlayerStats::default();
        while let Some((name, value)) = access.next_entry::<String, i64>()? {
          stats.insert(name, value);
        }
        Ok(stats)
      }
    }

    deserializer.deserialize_map(StatsVisitor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ranked_orders_by_value_descending() {
    let stats: PlayerStats = [("A", 10), ("B", 30), ("C", 20)].into_iter().collect();
    assert_eq!(stats.ranked(), vec![("B", 30), ("C", 20), ("A", 10)]);
  }

  #[test]
  fn ranked_ties_keep_insertion_order() {
    let stats: PlayerStats = [("Zed", 5), ("Amy", 7), ("Bob", 5), ("Cat", 5)]
      .into_iter()
      .collect();
    assert_eq!(
      stats.ranked(),
      vec![("Amy", 7), ("Zed", 5), ("Bob", 5), ("Cat", 5)]
    );
  }

  #[test]
  fn remove_keeps_relative_order_of_the_rest() {
    let mut stats: PlayerStats = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    assert_eq!(stats.remove("b"), Some(2));
    assert_eq!(stats.remove("b"), None);
    assert_eq!(stats.iter().collect::<Vec<_>>(), vec![("a", 1), ("c", 3)]);
  }

  #[test]
  fn json_object_order_survives_a_round_trip() {
    let raw = r#"{"zulu":1,"alpha":2,"mike":-3}"#;
    let stats: PlayerStats = serde_json::from_str(raw).expect("stats");
    assert_eq!(
      stats.iter().map(|(name, _)| name).collect::<Vec<_>>(),
      vec!["zulu", "alpha", "mike"]
    );
    assert_eq!(serde_json::to_string(&stats).expect("json"), raw);
  }

  #[test]
  fn non_integer_values_are_rejected() {
    assert!(serde_json::from_str::<PlayerStats>(r#"{"a":"ten"}"#).is_err());
    assert!(serde_json::from_str::<PlayerStats>(r#"[1,2]"#).is_err());
  }
}
