//! Team roster use-cases.
//!
//! # Responsibility
//! - Create teams and register members into them.
//! - Move members between teams and list a team's roster.
//!
//! # Invariants
//! - A member is only ever attached to a team that exists in storage.
//! - The roster of a team is read from storage on every call; teams keep no
//!   member list of their own.

use crate::dto::MemberTeamDto;
use crate::model::member::{Member, MemberId, TeamRef};
use crate::model::team::{Team, TeamId};
use crate::query::select::QueryResults;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::member_repo::MemberRepository;
use crate::repo::team_repo::TeamRepository;
use crate::search::condition::MemberSearchCondition;
use crate::search::page::PageRequest;
use log::info;

/// Use-case service over member and team repositories.
pub struct RosterService<M: MemberRepository, T: TeamRepository> {
    members: M,
    teams: T,
}

impl<M: MemberRepository, T: TeamRepository> RosterService<M, T> {
    pub fn new(members: M, teams: T) -> Self {
        Self { members, teams }
    }

    /// Persists a new team and returns it with its id.
    pub fn create_team(&self, name: impl Into<String>) -> RepoResult<Team> {
        let team = self.teams.save(&Team::new(name))?;
        info!(
            "event=team_create module=service status=ok team_id={}",
            team.id.unwrap_or_default()
        );
        Ok(team)
    }

    /// Persists a new member, optionally attached to an existing team.
    ///
    /// # Errors
    /// - [`RepoError::NotFound`] when `team_id` names no stored team.
    pub fn register_member(
        &self,
        username: Option<&str>,
        age: i32,
        team_id: Option<TeamId>,
    ) -> RepoResult<Member> {
        let mut member = match username {
            Some(username) => Member::new(username, age),
            None => Member::unnamed(age),
        };
        if let Some(team_id) = team_id {
            let team = self.require_team(team_id)?;
            member.change_team(&team)?;
        }

        let member = self.members.save(&member)?;
        info!(
            "event=member_register module=service status=ok member_id={} has_team={}",
            member.id.unwrap_or_default(),
            member.team.is_some()
        );
        Ok(member)
    }

    /// Moves a stored member to another stored team.
    pub fn change_team(&self, member_id: MemberId, team_id: TeamId) -> RepoResult<Member> {
        let mut member = self.require_member(member_id)?;
        let team = self.require_team(team_id)?;
        member.change_team(&team)?;
        let member = self.members.save(&member)?;
        info!(
            "event=member_change_team module=service status=ok member_id={member_id} team_id={team_id}"
        );
        Ok(member)
    }

    /// Detaches a stored member from its team.
    pub fn leave_team(&self, member_id: MemberId) -> RepoResult<Member> {
        let mut member = self.require_member(member_id)?;
        member.leave_team();
        let member = self.members.save(&member)?;
        info!("event=member_leave_team module=service status=ok member_id={member_id}");
        Ok(member)
    }

    /// Members of `team_id` ordered by id, each with the team loaded.
    pub fn members_of_team(&self, team_id: TeamId) -> RepoResult<Vec<Member>> {
        let team = self.require_team(team_id)?;
        let mut members = self.members.find_by_team(team_id)?;
        for member in &mut members {
            member.team = Some(TeamRef::Loaded(team.clone()));
        }
        Ok(members)
    }

    pub fn search(&self, condition: &MemberSearchCondition) -> RepoResult<Vec<MemberTeamDto>> {
        self.members.search(condition)
    }

    pub fn search_page(
        &self,
        condition: &MemberSearchCondition,
        page: PageRequest,
    ) -> RepoResult<QueryResults<MemberTeamDto>> {
        self.members.search_page(condition, page)
    }

    fn require_member(&self, id: MemberId) -> RepoResult<Member> {
        self.members.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "member",
            id,
        })
    }

    fn require_team(&self, id: TeamId) -> RepoResult<Team> {
        self.teams
            .find_by_id(id)?
            .ok_or(RepoError::NotFound { entity: "team", id })
    }
}
