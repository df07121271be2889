use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Authorization,
  NotFound,
  Storage,
}

/// Every way a league request can be refused. The `Display` text is what the
/// visitor sees in the flash message.
#[derive(Debug, Error)]
pub enum LeagueError {
  #[error("League name and admin password are required.")]
  MissingLeagueFields,

  #[error("League name must contain at least one letter or digit.")]
  InvalidLeagueName,

  #[error("A league with that name already exists.")]
  LeagueExists,

  #[error("Only one league can be created per hour. Try again later.")]
  RateLimited,

  #[error("Enter a valid player name and numeric {metric}.")]
  InvalidEntry { metric: &'static str },

  #[error("Enter the name of the player to delete.")]
  MissingPlayerName,

  #[error("Player already exists. Use edit to adjust {metric}.")]
  PlayerExists { metric: &'static str },

  #[error("That change would overflow the stored {metric}.")]
  ValueOutOfRange { metric: &'static str },

  #[error("Unknown category '{0}'.")]
  UnknownCategory(String),

  #[error("Incorrect master password.")]
  IncorrectMasterPassword,

  #[error("Incorrect Password")]
  IncorrectPassword,

  #[error("Admin access required for this action.")]
  AdminRequired,

  #[error("Choose a league first.")]
  NoLeagueSelected,

  #[error("League '{0}' not found.")]
  LeagueNotFound(String),

  #[error("Player not found. Add them first.")]
  PlayerNotFound,

  #[error(transparent)]
  Storage(#[from] StoreError),
}

impl LeagueError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      LeagueError::MissingLeagueFields
      | LeagueError::InvalidLeagueName
      | LeagueError::LeagueExists
      | LeagueError::RateLimited
      | LeagueError::InvalidEntry { .. }
      | LeagueError::MissingPlayerName
      | LeagueError::PlayerExists { .. }
      | LeagueError::ValueOutOfRange { .. }
      | LeagueError::UnknownCategory(_) => ErrorKind::Validation,
      LeagueError::IncorrectMasterPassword
      | LeagueError::IncorrectPassword
      | LeagueError::AdminRequired => ErrorKind::Authorization,
      LeagueError::NoLeagueSelected
      | LeagueError::LeagueNotFound(_)
      | LeagueError::PlayerNotFound => ErrorKind::NotFound,
      LeagueError::Storage(_) => ErrorKind::Storage,
    }
  }

  /// True when the session no longer points at a usable league, so the
  /// visitor has to go back to the league picker.
  pub fn needs_league(&self) -> bool {
    matches!(
      self,
      LeagueError::NoLeagueSelected | LeagueError::LeagueNotFound(_)
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_metric() {
    let error = LeagueError::InvalidEntry { metric: "wickets" };
    assert_eq!(error.to_string(), "Enter a valid player name and numeric wickets.");
    assert_eq!(error.kind(), ErrorKind::Validation);
  }

  #[test]
  fn kinds_split_auth_from_missing_league() {
    assert_eq!(LeagueError::AdminRequired.kind(), ErrorKind::Authorization);
    assert_eq!(LeagueError::IncorrectPassword.kind(), ErrorKind::Authorization);
    assert_eq!(
      LeagueError::LeagueNotFound("x".to_string()).kind(),
      ErrorKind::NotFound
    );
    assert!(LeagueError::NoLeagueSelected.needs_league());
    assert!(!LeagueError::PlayerNotFound.needs_league());
  }
}
