use super::{Category, Document, League, LeagueError, LogEntry};
use crate::session::Session;
use crate::shared::names::clean_player_name;
use chrono::{DateTime, Utc};

/// Resolves the league an admin action applies to.
pub fn require_admin<'a>(
  document: &'a mut Document,
  session: &Session,
) -> Result<(String, &'a mut League), LeagueError> {
  if !session.is_admin {
    return Err(LeagueError::AdminRequired);
  }
  let league_id = session
    .league_id
    .clone()
    .ok_or(LeagueError::NoLeagueSelected)?;
  let league = document.league_mut(&league_id)?;
  Ok((league_id, league))
}

/// The league a visitor is looking at, admin or not.
pub fn selected_league<'a>(
  document: &'a Document,
  session: &Session,
) -> Result<&'a League, LeagueError> {
  let league_id = session
    .league_id
    .as_deref()
    .ok_or(LeagueError::NoLeagueSelected)?;
  document.league(league_id)
}

pub fn parse_metric(raw: &str) -> Option<i64> {
  raw.trim().parse::<i64>().ok()
}

pub fn add_player(
  league: &mut League,
  category: Category,
  name: &str,
  value: &str,
) -> Result<(), LeagueError> {
  let name = clean_player_name(name);
  let value = match parse_metric(value) {
    Some(value) if !name.is_empty() => value,
    _ => {
      return Err(LeagueError::InvalidEntry {
        metric: category.metric(),
      })
    }
  };

  let stats = league.stats_mut(category);
  if stats.contains(&name) {
    return Err(LeagueError::PlayerExists {
      metric: category.metric(),
    });
  }
  stats.insert(name, value);
  Ok(())
}

/// Adds `delta` to an existing player. Backs both the edit and adjust routes.
pub fn adjust_player(
  league: &mut League,
  category: Category,
  name: &str,
  delta: &str,
) -> Result<i64, LeagueError> {
  let name = clean_player_name(name);
  let delta = match parse_metric(delta) {
    Some(delta) if !name.is_empty() => delta,
    _ => {
      return Err(LeagueError::InvalidEntry {
        metric: category.metric(),
      })
    }
  };

  let slot = league
    .stats_mut(category)
    .get_mut(&name)
    .ok_or(LeagueError::PlayerNotFound)?;
  let updated = slot
    .checked_add(delta)
    .ok_or(LeagueError::ValueOutOfRange {
      metric: category.metric(),
    })?;
  *slot = updated;
  Ok(updated)
}

pub fn delete_player(
  league: &mut League,
  category: Category,
  name: &str,
  now: DateTime<Utc>,
) -> Result<LogEntry, LeagueError> {
  let name = clean_player_name(name);
  if name.is_empty() {
    return Err(LeagueError::MissingPlayerName);
  }
  let value = league
    .stats_mut(category)
    .remove(&name)
    .ok_or(LeagueError::PlayerNotFound)?;

  let entry = LogEntry {
    player: name,
    category,
    value,
    timestamp: now,
  };
  league.push_delete_log(entry.clone());
  Ok(entry)
}
