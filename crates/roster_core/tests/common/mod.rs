#![allow(dead_code)]

use roster_core::db::open_db_in_memory;
use roster_core::{CrudRepository, Member, SqliteMemberRepository, SqliteTeamRepository, Team};
use rusqlite::Connection;

/// Ids of the four-member fixture.
pub struct Fixture {
    pub team_a: Team,
    pub team_b: Team,
    pub members: Vec<Member>,
}

/// In-memory database with teamA (member1/10, member2/20) and teamB
/// (member3/30, member4/40).
pub fn seeded() -> (Connection, Fixture) {
    let conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);
    (conn, fixture)
}

pub fn seed(conn: &Connection) -> Fixture {
    let teams = SqliteTeamRepository::try_new(conn).unwrap();
    let members = SqliteMemberRepository::try_new(conn).unwrap();

    let team_a = teams.save(&Team::new("teamA")).unwrap();
    let team_b = teams.save(&Team::new("teamB")).unwrap();

    let members = [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ]
    .into_iter()
    .map(|(username, age, team)| {
        members
            .save(&Member::with_team(username, age, team).unwrap())
            .unwrap()
    })
    .collect();

    Fixture {
        team_a,
        team_b,
        members,
    }
}

pub fn usernames(members: &[Member]) -> Vec<&str> {
    members
        .iter()
        .map(|member| member.username.as_deref().unwrap_or("<none>"))
        .collect()
}
