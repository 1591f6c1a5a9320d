mod common;

use common::{seeded, usernames};
use roster_core::query::{all_of, BooleanBuilder, QueryFactory, MEMBER};
use roster_core::search::condition::{age_eq, all_eq, username_eq};
use roster_core::{
    CrudRepository, Member, MemberRepository, MemberSearchCondition, PageRequest,
    SqliteMemberRepository,
};

#[test]
fn all_criteria_absent_matches_every_row() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let searched = repo.search_members(&MemberSearchCondition::new()).unwrap();
    let unfiltered = repo.find_all().unwrap();

    assert_eq!(searched.len(), 4);
    assert_eq!(searched, unfiltered);
}

#[test]
fn username_only_matches_exactly_one_row() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let condition = MemberSearchCondition::new().with_username("member1");
    let found = repo.search_members(&condition).unwrap();

    assert_eq!(usernames(&found), vec!["member1"]);
}

#[test]
fn single_criterion_equals_direct_condition() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let searched = repo
        .search_members(&MemberSearchCondition::new().with_age(20))
        .unwrap();
    let direct = QueryFactory::new(&conn)
        .select_from(&MEMBER)
        .where_(MEMBER.age().eq(20))
        .order_by(MEMBER.id().asc())
        .fetch()
        .unwrap();

    assert_eq!(searched, direct);
}

#[test]
fn composition_order_does_not_change_results() {
    let (conn, _) = seeded();
    let queries = QueryFactory::new(&conn);

    let forward = queries
        .select_from(&MEMBER)
        .where_all([
            username_eq(&MEMBER, Some("member2")),
            age_eq(&MEMBER, Some(20)),
        ])
        .fetch()
        .unwrap();
    let backward = queries
        .select_from(&MEMBER)
        .where_all([
            age_eq(&MEMBER, Some(20)),
            username_eq(&MEMBER, Some("member2")),
        ])
        .fetch()
        .unwrap();

    assert_eq!(usernames(&forward), vec!["member2"]);
    assert_eq!(forward, backward);
}

#[test]
fn conflicting_criteria_match_nothing() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let condition = MemberSearchCondition::new()
        .with_username("member1")
        .with_age(20);
    assert!(repo.search_members(&condition).unwrap().is_empty());
}

#[test]
fn builder_and_helper_styles_agree() {
    let (conn, _) = seeded();
    let queries = QueryFactory::new(&conn);
    let username = Some("member1");
    let age = Some(10);

    let mut builder = BooleanBuilder::new();
    builder
        .and_opt(username.map(|value| MEMBER.username().eq(value)))
        .and_opt(age.map(|value| MEMBER.age().eq(value)));
    let by_builder = queries
        .select_from(&MEMBER)
        .where_opt(builder.build())
        .fetch()
        .unwrap();

    let by_helpers = queries
        .select_from(&MEMBER)
        .where_opt(all_eq(&MEMBER, username, age))
        .fetch()
        .unwrap();

    assert_eq!(usernames(&by_builder), vec!["member1"]);
    assert_eq!(by_builder, by_helpers);
}

#[test]
fn empty_builder_and_absent_helpers_match_all() {
    let (conn, _) = seeded();
    let queries = QueryFactory::new(&conn);

    let by_builder = queries
        .select_from(&MEMBER)
        .where_opt(BooleanBuilder::new().build())
        .fetch_count()
        .unwrap();
    let by_helpers = queries
        .select_from(&MEMBER)
        .where_opt(all_of([username_eq(&MEMBER, None), age_eq(&MEMBER, None)]))
        .fetch_count()
        .unwrap();

    assert_eq!(by_builder, 4);
    assert_eq!(by_helpers, 4);
    assert!(!queries.select_from(&MEMBER).to_sql().contains("WHERE"));
}

#[test]
fn same_condition_builds_equal_predicates() {
    let condition = MemberSearchCondition::new()
        .with_username("member1")
        .with_team_name("teamA");
    assert_eq!(
        condition.to_predicate(&MEMBER),
        condition.to_predicate(&MEMBER)
    );
}

#[test]
fn team_name_and_age_range() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let in_team_b = repo
        .search_members(&MemberSearchCondition::new().with_team_name("teamB"))
        .unwrap();
    assert_eq!(usernames(&in_team_b), vec!["member3", "member4"]);

    let in_range = repo
        .search_members(&MemberSearchCondition::new().with_age_range(Some(15), Some(35)))
        .unwrap();
    assert_eq!(usernames(&in_range), vec!["member2", "member3"]);

    let combined = repo
        .search_members(
            &MemberSearchCondition::new()
                .with_team_name("teamB")
                .with_age_range(Some(35), None),
        )
        .unwrap();
    assert_eq!(usernames(&combined), vec!["member4"]);
}

#[test]
fn condition_from_json() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let condition: MemberSearchCondition =
        serde_json::from_str(r#"{"team_name":"teamA","age_goe":15}"#).unwrap();
    let found = repo.search(&condition).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username.as_deref(), Some("member2"));
    assert_eq!(found[0].team_name.as_deref(), Some("teamA"));
}

#[test]
fn search_rows_include_members_without_team() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    repo.save(&Member::new("loner", 50)).unwrap();

    let rows = repo.search(&MemberSearchCondition::new()).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[4].username.as_deref(), Some("loner"));
    assert_eq!(rows[4].team_id, None);
    assert_eq!(rows[4].team_name, None);
    assert_eq!(rows[0].team_name.as_deref(), Some("teamA"));
}

#[test]
fn search_page_reports_total() {
    let (conn, _) = seeded();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();

    let page = repo
        .search_page(&MemberSearchCondition::new(), PageRequest::new(1, 2))
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].username.as_deref(), Some("member2"));
    assert!(page.has_next());

    let filtered = repo
        .search_page(
            &MemberSearchCondition::new().with_team_name("teamA"),
            PageRequest::of(0, 10),
        )
        .unwrap();
    assert_eq!(filtered.total, 2);
    assert!(!filtered.has_next());
}
