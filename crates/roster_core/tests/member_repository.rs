mod common;

use common::{seeded, usernames};
use roster_core::{
    CrudRepository, Member, MemberRepository, RepoError, SqliteMemberRepository,
    SqliteTeamRepository, TeamRef, TeamRepository,
};

#[test]
fn crud_round_trip() {
    let (conn, fixture) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Member::new("member5", 50)).unwrap();
    let id = saved.id.unwrap();

    assert_eq!(repo.find_by_id(id).unwrap(), Some(saved.clone()));
    assert!(repo.exists_by_id(id).unwrap());
    assert_eq!(repo.count().unwrap(), 5);

    let mut renamed = saved;
    renamed.username = Some("member5b".to_string());
    renamed.change_team(&fixture.team_a).unwrap();
    repo.save(&renamed).unwrap();

    let reread = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reread.username.as_deref(), Some("member5b"));
    assert_eq!(reread.team_id(), fixture.team_a.id);

    repo.delete_by_id(id).unwrap();
    assert_eq!(repo.find_by_id(id).unwrap(), None);
    assert!(!repo.exists_by_id(id).unwrap());
    assert!(matches!(
        repo.delete_by_id(id).unwrap_err(),
        RepoError::NotFound {
            entity: "member",
            ..
        }
    ));
}

#[test]
fn find_by_username_returns_every_match() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    repo.save(&Member::new("member1", 99)).unwrap();

    let found = repo.find_by_username("member1").unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].age, 10);
    assert_eq!(found[1].age, 99);

    assert!(repo.find_by_username("nobody").unwrap().is_empty());
}

#[test]
fn find_by_team_lists_roster() {
    let (conn, fixture) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let roster = repo.find_by_team(fixture.team_b.id.unwrap()).unwrap();
    assert_eq!(usernames(&roster), vec!["member3", "member4"]);
    assert!(roster
        .iter()
        .all(|member| matches!(member.team, Some(TeamRef::Unloaded(_)))));
}

#[test]
fn deleting_team_leaves_members_teamless() {
    let (conn, fixture) = seeded();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();

    teams.delete_by_id(fixture.team_a.id.unwrap()).unwrap();

    assert_eq!(teams.find_by_name("teamA").unwrap(), None);
    let member1 = members.find_by_username("member1").unwrap().remove(0);
    assert_eq!(member1.team, None);
    assert_eq!(members.count().unwrap(), 4);
}

#[test]
fn saving_member_of_deleted_team_fails() {
    let (conn, fixture) = seeded();
    let members = SqliteMemberRepository::try_new(&conn).unwrap();
    let teams = SqliteTeamRepository::try_new(&conn).unwrap();
    teams.delete_by_id(fixture.team_b.id.unwrap()).unwrap();

    let stale = Member::with_team("member9", 9, &fixture.team_b).unwrap();
    assert!(matches!(
        members.save(&stale).unwrap_err(),
        RepoError::Db(_)
    ));
}

#[test]
fn file_backed_repository_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    {
        let conn = roster_core::db::open_db(&path).unwrap();
        common::seed(&conn);
    }

    let conn = roster_core::db::open_db(&path).unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count().unwrap(), 4);
}
