use crate::league::{Category, League};
use crate::session::{Flash, Session};
use std::fmt::Write;

pub struct HomeView<'a> {
    pub leagues: Vec<(&'a str, &'a str)>,
    pub session: &'a Session,
    pub current_league: Option<&'a str>,
    pub flashes: &'a [Flash],
}

pub struct BoardView<'a> {
    pub category: Category,
    pub league_id: &'a str,
    pub league: &'a League,
    pub session: &'a Session,
    pub flashes: &'a [Flash],
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn layout(title: &str, theme: &str, flashes: &[Flash], body: &str) -> String {
    let title = escape(title);
    let mut messages = String::new();
    for flash in flashes {
        let _ = write!(
            messages,
            r#"<p class="flash {}">{}</p>"#,
            flash.kind.as_str(),
            escape(&flash.message)
        );
    }
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 52rem; padding: 0 1rem; }}
body.orange h1 {{ color: #e8710a; }}
body.purple h1 {{ color: #6a1b9a; }}
table {{ border-collapse: collapse; width: 100%; margin: 1rem 0; }}
th, td {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }}
form {{ display: inline-block; margin: .5rem 1rem .5rem 0; vertical-align: top; }}
.flash {{ padding: .5rem; border-radius: 4px; }}
.flash.success {{ background: #e6f4ea; }}
.flash.error {{ background: #fce8e6; }}
.flash.info {{ background: #e8f0fe; }}
</style>
</head>
<body class="{theme}">
{messages}
{body}
</body>
</html>
"#
    )
}

pub fn home_page(view: &HomeView<'_>) -> String {
    let mut body = String::from("<h1>Cap Leagues</h1>\n");

    if let (Some(league_id), Some(name)) = (view.session.league_id.as_deref(), view.current_league) {
        let role = if view.session.is_master {
            "master admin"
        } else if view.session.is_admin {
            "admin"
        } else {
            "viewer"
        };
        let _ = write!(
            body,
            r#"<p>Signed in to <strong>{}</strong> ({}) as {role}. <a href="/orange">Orange Cap</a> · <a href="/purple">Purple Cap</a></p>
<form method="post" action="/logout"><button type="submit">Log out</button></form>
"#,
            escape(name),
            escape(league_id),
        );
    }

    body.push_str("<h2>Leagues</h2>\n");
    if view.leagues.is_empty() {
        body.push_str("<p>No leagues yet. Create the first one below.</p>\n");
    } else {
        body.push_str("<table><tr><th>League</th><th>ID</th></tr>\n");
        for (league_id, name) in &view.leagues {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td><code>{}</code></td></tr>",
                escape(name),
                escape(league_id)
            );
        }
        body.push_str("</table>\n");
    }

    let mut options = String::new();
    for (league_id, name) in &view.leagues {
        let _ = write!(
            options,
            r#"<option value="{}">{}</option>"#,
            escape(league_id),
            escape(name)
        );
    }

    let _ = write!(
        body,
        r#"<h2>Open a league</h2>
<form method="post" action="/league/login">
<select name="league_id">{options}</select>
<select name="role"><option value="viewer">Viewer</option><option value="admin">Admin</option></select>
<input type="password" name="password" placeholder="Admin password">
<button type="submit">Enter</button>
</form>
<h2>Create a league</h2>
<form method="post" action="/league/create">
<input name="league_name" placeholder="League name" required>
<input type="password" name="admin_password" placeholder="Admin password" required>
<input type="password" name="master_password" placeholder="Master password (optional)">
<button type="submit">Create</button>
</form>
<h2>Delete a league</h2>
<form method="post" action="/league/delete">
<select name="league_id">{options}</select>
<input type="password" name="password" placeholder="Admin or master password" required>
<button type="submit">Delete</button>
</form>
"#
    );

    layout("Cap Leagues", "home", view.flashes, &body)
}

pub fn board_page(view: &BoardView<'_>) -> String {
    let category = view.category;
    let path = category.path();
    let metric = category.metric_label();
    let title = format!("{} Leaderboard", category.title());

    let mut body = String::new();
    let _ = write!(
        body,
        r#"<h1>{}</h1>
<p>{} · <a href="/">Leagues</a> · <a href="/orange">Orange Cap</a> · <a href="/purple">Purple Cap</a></p>
"#,
        escape(&title),
        escape(&view.league.name),
    );

    let stats = view.league.stats(category);
    if stats.is_empty() {
        body.push_str("<p>No players yet.</p>\n");
    } else {
        let _ = writeln!(
            body,
            "<table><tr><th>#</th><th>Player</th><th>{metric}</th></tr>"
        );
        for (position, (name, value)) in stats.ranked().iter().enumerate() {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{value}</td></tr>",
                position + 1,
                escape(name)
            );
        }
        body.push_str("</table>\n");
    }

    if view.session.is_admin && view.session.points_at(view.league_id) {
        let lower = category.metric();
        let _ = write!(
            body,
            r#"<h2>Manage</h2>
<form method="post" action="{path}/add">
<input name="name" placeholder="Player name" required>
<input name="value" inputmode="numeric" placeholder="{metric}" required>
<button type="submit">Add player</button>
</form>
<form method="post" action="{path}/adjust">
<input name="name" placeholder="Player name" required>
<input name="delta" inputmode="numeric" placeholder="{lower} to add (negative to subtract)" required>
<button type="submit">Adjust</button>
</form>
<form method="post" action="{path}/delete">
<input name="name" placeholder="Player name" required>
<button type="submit">Delete player</button>
</form>
"#
        );
    }

    let deletions = view.league.recent_deletions(category);
    if !deletions.is_empty() {
        let _ = writeln!(
            body,
            "<h2>Recently deleted</h2>\n<table><tr><th>Player</th><th>{metric}</th><th>When (UTC)</th></tr>"
        );
        for entry in deletions {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&entry.player),
                entry.value,
                entry.timestamp.format("%Y-%m-%d %H:%M")
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str(
        r#"<form method="post" action="/logout"><button type="submit">Log out</button></form>
"#,
    );

    layout(&title, category.as_str(), view.flashes, &body)
}
