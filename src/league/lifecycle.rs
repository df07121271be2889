use super::{Document, League, LeagueError};
use crate::rate_limit::CreationLimiter;
use crate::session::Session;
use crate::shared::names::slugify;
use chrono::{DateTime, Utc};

/// The global override password. Empty means the master tier is disabled.
#[derive(Debug, Clone, Default)]
pub struct MasterPassword(String);

impl MasterPassword {
  pub fn new(password: Option<String>) -> Self {
    Self(password.unwrap_or_default())
  }

  pub fn matches(&self, candidate: &str) -> bool {
    !self.0.is_empty() && self.0 == candidate
  }

  pub fn is_enabled(&self) -> bool {
    !self.0.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Admin,
  Viewer,
}

impl Role {
  /// Anything other than `admin` is a read-only visitor.
  pub fn parse(value: &str) -> Self {
    if value.trim().eq_ignore_ascii_case("admin") {
      Role::Admin
    } else {
      Role::Viewer
    }
  }
}

#[derive(Debug, Clone)]
pub struct CreateLeague<'a> {
  pub name: &'a str,
  pub admin_password: &'a str,
  pub master_password: &'a str,
  pub client: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedLeague {
  pub league_id: String,
  pub used_master: bool,
}

pub fn create_league(
  document: &mut Document,
  session: &mut Session,
  limiter: &CreationLimiter,
  master: &MasterPassword,
  request: CreateLeague<'_>,
  now: DateTime<Utc>,
) -> Result<CreatedLeague, LeagueError> {
  let name = request.name.trim();
  let admin_password = request.admin_password;
  if name.is_empty() || admin_password.is_empty() {
    return Err(LeagueError::MissingLeagueFields);
  }

  let used_master = !request.master_password.is_empty();
  if used_master && !master.matches(request.master_password) {
    return Err(LeagueError::IncorrectMasterPassword);
  }
  if !used_master && !limiter.allows(request.client, now) {
    return Err(LeagueError::RateLimited);
  }

  let league_id = slugify(name);
  if league_id.is_empty() {
    return Err(LeagueError::InvalidLeagueName);
  }
  if document.leagues.contains_key(&league_id) {
    return Err(LeagueError::LeagueExists);
  }

  document.leagues.insert(
    league_id.clone(),
    League::new(name.to_string(), admin_password.to_string()),
  );
  session.select_league(league_id.clone(), true, used_master);

  Ok(CreatedLeague {
    league_id,
    used_master,
  })
}

/// Counts a persisted creation against `client`. Master creations are free.
pub fn record_creation(
  limiter: &CreationLimiter,
  created: &CreatedLeague,
  client: &str,
  now: DateTime<Utc>,
) {
  if !created.used_master {
    limiter.record(client, now);
  }
}

/// Selects `league_id` for the session. Returns the role actually granted.
pub fn login(
  document: &Document,
  session: &mut Session,
  master: &MasterPassword,
  league_id: &str,
  role: Role,
  password: &str,
) -> Result<Role, LeagueError> {
  let league_id = league_id.trim();
  let league = match document.league(league_id) {
    Ok(league) => league,
    Err(error) => {
      session.clear_league();
      return Err(error);
    }
  };

  match role {
    Role::Viewer => {
      session.select_league(league_id.to_string(), false, false);
      Ok(Role::Viewer)
    }
    Role::Admin if password == league.admin_password => {
      session.select_league(league_id.to_string(), true, false);
      Ok(Role::Admin)
    }
    Role::Admin if master.matches(password) => {
      session.select_league(league_id.to_string(), true, true);
      Ok(Role::Admin)
    }
    Role::Admin => {
      session.clear_league();
      Err(LeagueError::IncorrectPassword)
    }
  }
}

pub fn delete_league(
  document: &mut Document,
  session: &mut Session,
  master: &MasterPassword,
  league_id: &str,
  password: &str,
) -> Result<League, LeagueError> {
  let league_id = league_id.trim();
  let league = document.league(league_id)?;
  if password != league.admin_password && !master.matches(password) {
    return Err(LeagueError::IncorrectPassword);
  }

  let removed = document
    .leagues
    .remove(league_id)
    .ok_or_else(|| LeagueError::LeagueNotFound(league_id.to_string()))?;
  if session.points_at(league_id) {
    session.clear_league();
  }
  Ok(removed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  const CLIENT: &str = "203.0.113.7";

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap()
  }

  fn master() -> MasterPassword {
    MasterPassword::new(Some("override".to_string()))
  }

  fn limiter() -> CreationLimiter {
    CreationLimiter::new(Duration::hours(1))
  }

  fn request<'a>(name: &'a str, admin_password: &'a str) -> CreateLeague<'a> {
    CreateLeague {
      name,
      admin_password,
      master_password: "",
      client: CLIENT,
    }
  }

  fn create(
    document: &mut Document,
    limiter: &CreationLimiter,
    request: CreateLeague<'_>,
    now: DateTime<Utc>,
  ) -> Result<CreatedLeague, LeagueError> {
    let mut session = Session::default();
    let client = request.client;
    let created = create_league(document, &mut session, limiter, &master(), request, now)?;
    record_creation(limiter, &created, client, now);
    Ok(created)
  }

  #[test]
  fn create_inserts_empty_league_and_selects_it_as_admin() {
    let mut document = Document::default();
    let mut session = Session::default();
    let created = create_league(
      &mut document,
      &mut session,
      &limiter(),
      &master(),
      request("  Sunday Smashers ", "pw"),
      now(),
    )
    .expect("create");

    assert_eq!(created.league_id, "sunday-smashers");
    assert!(!created.used_master);
    let league = &document.leagues["sunday-smashers"];
    assert_eq!(league.name, "Sunday Smashers");
    assert_eq!(league.admin_password, "pw");
    assert!(league.orange.is_empty() && league.purple.is_empty());
    assert_eq!(session.league_id.as_deref(), Some("sunday-smashers"));
    assert!(session.is_admin);
    assert!(!session.is_master);
  }

  #[test]
  fn create_requires_name_and_password() {
    let mut document = Document::default();
    for (name, password) in [("", "pw"), ("   ", "pw"), ("League", "")] {
      let error = create(&mut document, &limiter(), request(name, password), now())
        .expect_err("missing field");
      assert!(matches!(error, LeagueError::MissingLeagueFields));
    }
    let error = create(&mut document, &limiter(), request("???", "pw"), now())
      .expect_err("empty slug");
    assert!(matches!(error, LeagueError::InvalidLeagueName));
    assert!(document.leagues.is_empty());
  }

  #[test]
  fn create_rejects_duplicate_slug() {
    let mut document = Document::default();
    let limiter = limiter();
    create(&mut document, &limiter, request("Office XI", "pw"), now()).expect("first");

    let mut again = request("office   xi!", "other");
    again.client = "198.51.100.1";
    let error = create(&mut document, &limiter, again, now()).expect_err("duplicate");
    assert!(matches!(error, LeagueError::LeagueExists));
    assert_eq!(document.leagues["office-xi"].admin_password, "pw");
  }

  #[test]
  fn create_is_limited_to_one_per_client_per_window() {
    let mut document = Document::default();
    let limiter = limiter();
    create(&mut document, &limiter, request("First", "pw"), now()).expect("first");

    let error = create(
      &mut document,
      &limiter,
      request("Second", "pw"),
      now() + Duration::minutes(59),
    )
    .expect_err("rate limited");
    assert!(matches!(error, LeagueError::RateLimited));
    assert!(!document.leagues.contains_key("second"));

    create(&mut document, &limiter, request("Second", "pw"), now() + Duration::hours(1))
      .expect("window elapsed");
    assert!(document.leagues.contains_key("second"));
  }

  #[test]
  fn create_alone_does_not_use_up_the_window() {
    let mut document = Document::default();
    let limiter = limiter();
    let mut session = Session::default();
    create_league(
      &mut document,
      &mut session,
      &limiter,
      &master(),
      request("Unsaved", "pw"),
      now(),
    )
    .expect("create");
    assert_eq!(limiter.tracked_clients(), 0);
    assert!(limiter.allows(CLIENT, now()));

    let created = CreatedLeague {
      league_id: "unsaved".to_string(),
      used_master: false,
    };
    record_creation(&limiter, &created, CLIENT, now());
    assert!(!limiter.allows(CLIENT, now() + Duration::minutes(1)));
  }

  #[test]
  fn master_password_bypasses_limit_and_is_not_recorded() {
    let mut document = Document::default();
    let limiter = limiter();
    let mut session = Session::default();
    let mut privileged = request("Master One", "pw");
    privileged.master_password = "override";

    let created = create_league(
      &mut document,
      &mut session,
      &limiter,
      &master(),
      privileged.clone(),
      now(),
    )
    .expect("master create");
    assert!(created.used_master);
    assert!(session.is_master);
    assert_eq!(limiter.tracked_clients(), 0);

    privileged.name = "Master Two";
    create(&mut document, &limiter, privileged, now()).expect("still allowed");
    assert_eq!(limiter.tracked_clients(), 0);
    create(&mut document, &limiter, request("Plain", "pw"), now()).expect("not throttled");
  }

  #[test]
  fn wrong_master_password_fails_even_when_not_throttled() {
    let mut document = Document::default();
    let mut bad = request("League", "pw");
    bad.master_password = "guess";
    let error = create(&mut document, &limiter(), bad, now()).expect_err("bad master");
    assert!(matches!(error, LeagueError::IncorrectMasterPassword));

    let disabled = MasterPassword::new(None);
    let mut session = Session::default();
    let mut empty_master = request("League", "pw");
    empty_master.master_password = "anything";
    let error = create_league(
      &mut document,
      &mut session,
      &limiter(),
      &disabled,
      empty_master,
      now(),
    )
    .expect_err("master disabled");
    assert!(matches!(error, LeagueError::IncorrectMasterPassword));
  }

  fn document_with(league_id: &str, password: &str) -> Document {
    let mut document = Document::default();
    document.leagues.insert(
      league_id.to_string(),
      League::new(league_id.to_string(), password.to_string()),
    );
    document
  }

  #[test]
  fn admin_login_with_league_password_grants_admin() {
    let document = document_with("office-xi", "pw");
    let mut session = Session::default();
    let role = login(&document, &mut session, &master(), "office-xi", Role::Admin, "pw")
      .expect("login");
    assert_eq!(role, Role::Admin);
    assert!(session.is_admin);
    assert!(!session.is_master);
    assert_eq!(session.league_id.as_deref(), Some("office-xi"));
  }

  #[test]
  fn admin_login_with_master_password_sets_master_flag() {
    let document = document_with("office-xi", "pw");
    let mut session = Session::default();
    login(&document, &mut session, &master(), "office-xi", Role::Admin, "override")
      .expect("login");
    assert!(session.is_admin);
    assert!(session.is_master);
  }

  #[test]
  fn wrong_admin_password_leaves_no_league_selected() {
    let document = document_with("office-xi", "pw");
    let mut session = Session::default();
    session.select_league("office-xi".to_string(), false, false);

    let error = login(&document, &mut session, &master(), "office-xi", Role::Admin, "nope")
      .expect_err("wrong password");
    assert!(matches!(error, LeagueError::IncorrectPassword));
    assert_eq!(session.league_id, None);
    assert!(!session.is_admin);

    let disabled = MasterPassword::new(None);
    let error = login(&document, &mut session, &disabled, "office-xi", Role::Admin, "")
      .expect_err("empty password never matches master");
    assert!(matches!(error, LeagueError::IncorrectPassword));
  }

  #[test]
  fn viewer_login_skips_password_but_needs_league() {
    let document = document_with("office-xi", "pw");
    let mut session = Session::default();
    session.select_league("other".to_string(), true, true);

    login(&document, &mut session, &master(), "office-xi", Role::Viewer, "")
      .expect("viewer");
    assert_eq!(session.league_id.as_deref(), Some("office-xi"));
    assert!(!session.is_admin);
    assert!(!session.is_master);

    let error = login(&document, &mut session, &master(), "missing", Role::Viewer, "")
      .expect_err("unknown league");
    assert!(matches!(error, LeagueError::LeagueNotFound(_)));
    assert_eq!(session.league_id, None);
  }

  #[test]
  fn role_parse_defaults_to_viewer() {
    assert_eq!(Role::parse("admin"), Role::Admin);
    assert_eq!(Role::parse(" Admin "), Role::Admin);
    assert_eq!(Role::parse("viewer"), Role::Viewer);
    assert_eq!(Role::parse(""), Role::Viewer);
  }

  #[test]
  fn delete_requires_league_or_master_password() {
    let mut document = document_with("office-xi", "pw");
    let mut session = Session::default();

    let error = delete_league(&mut document, &mut session, &master(), "office-xi", "nope")
      .expect_err("wrong password");
    assert!(matches!(error, LeagueError::IncorrectPassword));
    assert!(document.leagues.contains_key("office-xi"));

    let error = delete_league(&mut document, &mut session, &master(), "ghost", "pw")
      .expect_err("missing");
    assert!(matches!(error, LeagueError::LeagueNotFound(_)));

    delete_league(&mut document, &mut session, &master(), "office-xi", "override")
      .expect("master delete");
    assert!(document.leagues.is_empty());
  }

  #[test]
  fn delete_clears_only_sessions_pointing_at_the_league() {
    let mut document = document_with("office-xi", "pw");
    document
      .leagues
      .insert("other".to_string(), League::new("Other".to_string(), "pw2".to_string()));

    let mut watching = Session::default();
    watching.select_league("office-xi".to_string(), true, false);
    let mut elsewhere = Session::default();
    elsewhere.select_league("other".to_string(), true, false);
    let elsewhere_before = elsewhere.clone();

    delete_league(&mut document, &mut watching, &master(), "office-xi", "pw").expect("delete");
    assert_eq!(watching.league_id, None);
    assert!(!watching.is_admin);

    delete_league(&mut document, &mut elsewhere, &master(), "missing", "pw").ok();
    assert_eq!(elsewhere, elsewhere_before);
    assert!(document.leagues.contains_key("other"));
  }
}
