pub mod board;
pub mod error;
pub mod lifecycle;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use error::LeagueError;
pub use stats::PlayerStats;

pub const MAX_DELETE_LOGS: usize = 67;

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
  #[serde(default)]
  pub leagues: BTreeMap<String, League>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
  pub name: String,
  pub admin_password: String,
  #[serde(default)]
  pub orange: PlayerStats,
  #[serde(default)]
  pub purple: PlayerStats,
  #[serde(default)]
  pub delete_logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  pub player: String,
  pub category: Category,
  pub value: i64,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Orange,
  Purple,
}

impl Category {
  pub const ALL: [Category; 2] = [Category::Orange, Category::Purple];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Orange => "orange",
      Category::Purple => "purple",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Category::Orange => "Orange Cap",
      Category::Purple => "Purple Cap",
    }
  }

  /// Metric label, capitalised for table headers.
  pub fn metric_label(self) -> &'static str {
    match self {
      Category::Orange => "Runs",
      Category::Purple => "Wickets",
    }
  }

  pub fn metric(self) -> &'static str {
    match self {
      Category::Orange => "runs",
      Category::Purple => "wickets",
    }
  }

  pub fn path(self) -> &'static str {
    match self {
      Category::Orange => "/orange",
      Category::Purple => "/purple",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = LeagueError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "orange" => Ok(Category::Orange),
      "purple" => Ok(Category::Purple),
      _ => Err(LeagueError::UnknownCategory(value.to_string())),
    }
  }
}

impl League {
  pub fn new(name: String, admin_password: String) -> Self {
    Self {
      name,
      admin_password,
      orange: PlayerStats::default(),
      purple: PlayerStats::default(),
      delete_logs: Vec::new(),
    }
  }

  pub fn stats(&self, category: Category) -> &PlayerStats {
    match category {
      Category::Orange => &self.orange,
      Category::Purple => &self.purple,
    }
  }

  pub fn stats_mut(&mut self, category: Category) -> &mut PlayerStats {
    match category {
      Category::Orange => &mut self.orange,
      Category::Purple => &mut self.purple,
    }
  }

  pub fn push_delete_log(&mut self, entry: LogEntry) {
    self.delete_logs.push(entry);
    if self.delete_logs.len() > MAX_DELETE_LOGS {
      let overflow = self.delete_logs.len() - MAX_DELETE_LOGS;
      self.delete_logs.drain(..overflow);
    }
  }

  /// Delete log entries for one category, newest first.
  pub fn recent_deletions(&self, category: Category) -> Vec<&LogEntry> {
    self
      .delete_logs
      .iter()
      .rev()
      .filter(|entry| entry.category == category)
      .collect()
  }
}

impl Document {
  pub fn league(&self, league_id: &str) -> Result<&League, LeagueError> {
    self
      .leagues
      .get(league_id)
      .ok_or_else(|| LeagueError::LeagueNotFound(league_id.to_string()))
  }

  pub fn league_mut(&mut self, league_id: &str) -> Result<&mut League, LeagueError> {
    self
      .leagues
      .get_mut(league_id)
      .ok_or_else(|| LeagueError::LeagueNotFound(league_id.to_string()))
  }

  /// `(league_id, name)` pairs ordered by name, case-insensitively.
  pub fn directory(&self) -> Vec<(&str, &str)> {
    let mut entries = self
      .leagues
      .iter()
      .map(|(id, league)| (id.as_str(), league.name.as_str()))
      .collect::<Vec<_>>();
    entries.sort_by(|a, b| {
      a.1
        .to_lowercase()
        .cmp(&b.1.to_lowercase())
        .then_with(|| a.0.cmp(b.0))
    });
    entries
  }
}
