//! The team-building operations every registry starts with.

use super::spec::{EntityKind, OperationSpec, ParamSpec};
use super::trait_def::StoreQuery;

pub const CREATE_TEAM: &str = "createTeam";
pub const CREATE_PERSON: &str = "createPerson";
pub const ADD_TEAM_MANAGER: &str = "addTeamManager";
pub const ADD_TEAM_MEMBER: &str = "addTeamMember";

/// Store-backed handlers for the four team operations.
pub fn builtin_operations() -> Vec<StoreQuery> {
    vec![
        StoreQuery::new(
            OperationSpec::new(CREATE_TEAM, "Create a team node.")
                .param(ParamSpec::text("name"))
                .param(ParamSpec::text("text").optional())
                .creates(EntityKind::Team, "name"),
        ),
        StoreQuery::new(
            OperationSpec::new(CREATE_PERSON, "Create a person node.")
                .param(ParamSpec::text("name"))
                .param(ParamSpec::list("tags").optional())
                .param(ParamSpec::text("text").optional())
                .creates(EntityKind::Person, "name"),
        ),
        StoreQuery::new(role_edge(
            ADD_TEAM_MANAGER,
            "Link an existing person to an existing team as its manager.",
        )),
        StoreQuery::new(role_edge(
            ADD_TEAM_MEMBER,
            "Link an existing person to an existing team as a member.",
        )),
    ]
}

fn role_edge(name: &str, description: &str) -> OperationSpec {
    OperationSpec::new(name, description)
        .param(ParamSpec::text("person_name"))
        .param(ParamSpec::text("team_name"))
        .references(EntityKind::Person, "person_name")
        .references(EntityKind::Team, "team_name")
}
