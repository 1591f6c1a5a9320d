//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire `.env`/environment configuration, logging and storage.
//! - Seed the demo roster and print a few query results line by line.

use log::error;
use roster_core::query::{MEMBER, TEAM};
use roster_core::{
    App, AppConfig, AppError, MemberRepository, MemberSearchCondition, RepoError,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    println!("roster_core ping={}", roster_core::ping());
    println!("roster_core version={}", roster_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("roster: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let mut app = App::open(&config)?;
    app.seed_demo_roster()?;

    let queries = app.query_factory();
    let per_team = queries
        .select((TEAM.name(), MEMBER.age().avg()))
        .from(&MEMBER)
        .join(MEMBER.team(), &TEAM)
        .group_by(&TEAM.name())
        .order_by(TEAM.name().asc())
        .fetch()
        .map_err(RepoError::from)?;
    for (team, avg_age) in per_team {
        println!("team={team} avg_age={}", avg_age.unwrap_or_default());
    }

    let condition = MemberSearchCondition::new()
        .with_team_name("teamB")
        .with_age_range(Some(35), None);
    for row in app.members()?.search(&condition)? {
        println!(
            "member_id={} username={} age={} team={}",
            row.member_id,
            row.username.as_deref().unwrap_or("-"),
            row.age,
            row.team_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
