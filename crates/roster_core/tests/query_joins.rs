mod common;

use common::{seeded, usernames};
use roster_core::query::{sub_select, QMember, QueryFactory, MEMBER, TEAM};
use roster_core::{CrudRepository, Member, SqliteMemberRepository, TeamRef};

fn add_members_named_after_teams(conn: &rusqlite::Connection) {
    let members = SqliteMemberRepository::try_new(conn).unwrap();
    for name in ["teamA", "teamB", "teamC"] {
        members.save(&Member::new(name, 0)).unwrap();
    }
}

#[test]
fn association_join_filters_by_team_name() {
    let (conn, _) = seeded();
    let members = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .join(MEMBER.team(), &TEAM)
        .where_(TEAM.name().eq("teamA"))
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();

    assert_eq!(usernames(&members), vec!["member1", "member2"]);
}

#[test]
fn theta_join_on_unrelated_columns() {
    let (conn, _) = seeded();
    add_members_named_after_teams(&conn);

    let members = QueryFactory::new(&conn)
        .select(MEMBER)
        .from(&MEMBER)
        .from(&TEAM)
        .where_(MEMBER.username().eq(TEAM.name()))
        .order_by(MEMBER.username().asc())
        .fetch()
        .unwrap();

    assert_eq!(usernames(&members), vec!["teamA", "teamB"]);
}

#[test]
fn left_join_with_on_filter_keeps_every_member() {
    let (conn, _) = seeded();
    let rows = QueryFactory::new(&conn)
        .select((MEMBER, TEAM.nullable()))
        .from(&MEMBER)
        .left_join(MEMBER.team(), &TEAM)
        .on(TEAM.name().eq("teamA"))
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();

    let teams: Vec<Option<&str>> = rows
        .iter()
        .map(|(_, team)| team.as_ref().map(|team| team.name.as_str()))
        .collect();
    assert_eq!(teams, vec![Some("teamA"), Some("teamA"), None, None]);
}

#[test]
fn inner_join_with_on_filter_equals_where_filter() {
    let (conn, _) = seeded();
    let queries = QueryFactory::new(&conn);

    let with_on = queries
        .select((MEMBER, TEAM))
        .from(&MEMBER)
        .join(MEMBER.team(), &TEAM)
        .on(TEAM.name().eq("teamA"))
        .fetch()
        .unwrap();
    let with_where = queries
        .select((MEMBER, TEAM))
        .from(&MEMBER)
        .join(MEMBER.team(), &TEAM)
        .where_(TEAM.name().eq("teamA"))
        .fetch()
        .unwrap();

    assert_eq!(with_on.len(), 2);
    assert_eq!(with_on, with_where);
}

#[test]
fn left_join_on_unrelated_entity() {
    let (conn, _) = seeded();
    add_members_named_after_teams(&conn);

    let rows = QueryFactory::new(&conn)
        .select((MEMBER, TEAM.nullable()))
        .from(&MEMBER)
        .left_join_entity(&TEAM)
        .on(MEMBER.username().eq(TEAM.name()))
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();

    assert_eq!(rows.len(), 7);
    let matched: Vec<&str> = rows
        .iter()
        .filter_map(|(_, team)| team.as_ref().map(|team| team.name.as_str()))
        .collect();
    assert_eq!(matched, vec!["teamA", "teamB"]);
}

#[test]
fn inner_join_on_unrelated_entity_drops_unmatched() {
    let (conn, _) = seeded();
    add_members_named_after_teams(&conn);

    let rows = QueryFactory::new(&conn)
        .select(MEMBER.username())
        .from(&MEMBER)
        .join_entity(&TEAM)
        .on(MEMBER.username().eq(TEAM.name()))
        .fetch()
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn plain_select_leaves_team_unloaded() {
    let (conn, fixture) = seeded();
    let member = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .where_(MEMBER.username().eq("member1"))
        .fetch_one()
        .unwrap()
        .unwrap();

    assert!(!member.is_team_loaded());
    assert_eq!(member.team, Some(TeamRef::Unloaded(fixture.team_a.id.unwrap())));
}

#[test]
fn fetch_join_loads_team() {
    let (conn, fixture) = seeded();
    let member = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .join_fetch(MEMBER.team(), &TEAM)
        .where_(MEMBER.username().eq("member1"))
        .fetch_one()
        .unwrap()
        .unwrap();

    assert!(member.is_team_loaded());
    assert_eq!(member.loaded_team(), Some(&fixture.team_a));
}

#[test]
fn left_fetch_join_keeps_members_without_team() {
    let (conn, _) = seeded();
    SqliteMemberRepository::try_new(&conn)
        .unwrap()
        .save(&Member::new("loner", 50))
        .unwrap();
    let queries = QueryFactory::new(&conn);

    let inner = queries
        .select_from(&MEMBER)
        .join_fetch(MEMBER.team(), &TEAM)
        .fetch()
        .unwrap();
    assert_eq!(inner.len(), 4);

    let outer = queries
        .select_from(&MEMBER)
        .left_join_fetch(MEMBER.team(), &TEAM)
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();
    assert_eq!(outer.len(), 5);
    assert!(outer[..4].iter().all(Member::is_team_loaded));
    assert_eq!(outer[4].team, None);
}

#[test]
fn left_join_reads_missing_team_name_as_none() {
    let (conn, _) = seeded();
    SqliteMemberRepository::try_new(&conn)
        .unwrap()
        .save(&Member::new("loner", 50))
        .unwrap();
    let queries = QueryFactory::new(&conn);

    let rows = queries
        .select((MEMBER, TEAM.nullable().name()))
        .from(&MEMBER)
        .left_join(MEMBER.team(), &TEAM)
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();
    let team_names: Vec<Option<String>> = rows.into_iter().map(|(_, name)| name).collect();
    assert_eq!(
        team_names,
        vec![
            Some("teamA".to_string()),
            Some("teamA".to_string()),
            Some("teamB".to_string()),
            Some("teamB".to_string()),
            None,
        ]
    );

    let team_ids = queries
        .select(TEAM.nullable().id())
        .from(&MEMBER)
        .left_join(MEMBER.team(), &TEAM)
        .where_(MEMBER.username().eq("loner"))
        .fetch()
        .unwrap();
    assert_eq!(team_ids, vec![None]);
}

#[test]
fn subquery_equals_max_age() {
    let (conn, _) = seeded();
    let member_sub = QMember::new("memberSub");

    let oldest = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .where_(MEMBER.age().eq(sub_select(member_sub.age().max()).from(&member_sub)))
        .fetch()
        .unwrap();

    assert_eq!(usernames(&oldest), vec!["member4"]);
}

#[test]
fn subquery_goe_average_age() {
    let (conn, _) = seeded();
    let member_sub = QMember::new("memberSub");

    let members = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .where_(MEMBER.age().goe(sub_select(member_sub.age().avg()).from(&member_sub)))
        .order_by(MEMBER.age().asc())
        .fetch()
        .unwrap();

    assert_eq!(usernames(&members), vec!["member3", "member4"]);
}

#[test]
fn subquery_in() {
    let (conn, _) = seeded();
    let member_sub = QMember::new("memberSub");

    let members = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .where_(
            MEMBER.age().in_(
                sub_select(member_sub.age())
                    .from(&member_sub)
                    .where_(member_sub.age().gt(10)),
            ),
        )
        .order_by(MEMBER.age().asc())
        .fetch()
        .unwrap();

    assert_eq!(usernames(&members), vec!["member2", "member3", "member4"]);
}

#[test]
fn subquery_in_select_list() {
    let (conn, _) = seeded();
    let member_sub = QMember::new("memberSub");

    let rows = QueryFactory::new(&conn)
        .select((
            MEMBER.username(),
            sub_select(member_sub.age().avg())
                .from(&member_sub)
                .into_expr(),
        ))
        .from(&MEMBER)
        .fetch()
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|(_, avg)| *avg == Some(25.0)));
}

#[test]
fn correlated_exists_subquery() {
    let (conn, _) = seeded();

    let teams = QueryFactory::new(&conn)
        .select_from(&TEAM)
        .where_(
            sub_select(MEMBER.id())
                .from(&MEMBER)
                .where_(MEMBER.team_id().eq(TEAM.id()))
                .where_(MEMBER.age().gt(30))
                .exists(),
        )
        .fetch()
        .unwrap();

    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "teamB");
}
