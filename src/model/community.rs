//  COMMUNITY.rs
//    by Lut99
//
//  Description:
//!   Implements [`Community`], the top-level static model graph, together with its builder
//!   API and import machinery.
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::artifact::Artifact;
use super::policy::{Policy, PolicyEnvelopeConfig};
use super::role::Role;
use super::vocabulary::Event;


/***** ERRORS *****/
/// Errors raised while building a [`Community`]'s lookup indexes.
///
/// Raised by [`Community::build_indexes`], never by construction itself — a hydrator may build
/// up a `Community`'s lists incrementally and only call `build_indexes` once they are complete.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("duplicate role name '{name}' in community '{community}'")]
    DuplicateRole { community: String, name: String },
    #[error("duplicate artifact name '{name}' in community '{community}'")]
    DuplicateArtifact { community: String, name: String },
    #[error("duplicate event name '{name}' in community '{community}'")]
    DuplicateEvent { community: String, name: String },
    #[error("duplicate policy name '{name}' in community '{community}'")]
    DuplicatePolicy { community: String, name: String },
    #[error("import '{import_name}' role fulfillment references unknown local role '{role}'")]
    UnknownLocalRole { import_name: String, role: String },
}


/***** LIBRARY *****/
/// Associates a locally-imported token name with the name it carries in the imported community.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenAlias {
    pub name: String,
    pub imported_name: String,
}
impl TokenAlias {
    #[inline]
    pub fn new(name: impl Into<String>, imported_name: impl Into<String>) -> Self { Self { name: name.into(), imported_name: imported_name.into() } }
}

/// Associates a local role with the role it fulfills in an imported community.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoleFulfillment {
    pub role: String,
    pub imported_role: String,
}
impl RoleFulfillment {
    #[inline]
    pub fn new(role: impl Into<String>, imported_role: impl Into<String>) -> Self { Self { role: role.into(), imported_role: imported_role.into() } }
}

/// An import of another community's roles, tokens and policies into this one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Import {
    /// The name of the imported community.
    pub imported_community: String,
    /// The local name given to this import.
    pub name: String,
    /// Which local roles fulfill which imported roles.
    pub role_fulfillment: Vec<RoleFulfillment>,
    /// Local aliases for imported token names.
    pub token_aliases: Vec<TokenAlias>,
    /// Envelope overrides applied to imported policies.
    pub policy_envelope: Vec<PolicyEnvelopeConfig>,
}
impl Import {
    /// Constructor for an Import.
    #[inline]
    pub fn new(
        imported_community: impl Into<String>,
        name: impl Into<String>,
        role_fulfillment: Vec<RoleFulfillment>,
        token_aliases: Vec<TokenAlias>,
        policy_envelope: Vec<PolicyEnvelopeConfig>,
    ) -> Self {
        Self { imported_community: imported_community.into(), name: name.into(), role_fulfillment, token_aliases, policy_envelope }
    }
}

/// The top-level static model graph: a community's roles, artifacts, events and policies,
/// together with the lookup indexes needed to resolve an action or event by name at runtime
/// (Clause 6.2.2 of the standard this model derives from).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Community {
    /// The name of this community.
    pub name: String,
    /// An optional free-text description of the contract this community enforces.
    pub contract: Option<String>,
    /// A free-text statement of this community's objective.
    pub objective: String,
    /// The communities imported into this one.
    pub imports: Vec<Import>,
    /// The events this community declares.
    pub events: Vec<Event>,
    /// The artifact templates this community declares.
    pub artifacts: Vec<Artifact>,
    /// The roles this community declares.
    pub roles: Vec<Role>,
    /// The policies this community declares.
    pub policies: Vec<Policy>,

    #[cfg_attr(feature = "serde", serde(skip))]
    role_index: HashMap<String, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    artifact_index: HashMap<String, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    event_index: HashMap<String, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    policy_index: HashMap<String, usize>,
}
impl Community {
    /// Constructs a community with empty lookup indexes; call [`Community::build_indexes`]
    /// before using [`Community::get_role`] and friends.
    pub fn new(
        name: impl Into<String>,
        contract: Option<String>,
        objective: impl Into<String>,
        imports: Vec<Import>,
        events: Vec<Event>,
        artifacts: Vec<Artifact>,
        roles: Vec<Role>,
        policies: Vec<Policy>,
    ) -> Self {
        Self {
            name: name.into(),
            contract,
            objective: objective.into(),
            imports,
            events,
            artifacts,
            roles,
            policies,
            role_index: HashMap::new(),
            artifact_index: HashMap::new(),
            event_index: HashMap::new(),
            policy_index: HashMap::new(),
        }
    }

    /// Populates the lookup indexes for roles, artifacts, events and policies.
    ///
    /// Must be called after this community's lists are fully populated, and before any
    /// `get_*` lookup is used. Re-callable: existing indexes are cleared first.
    ///
    /// # Errors
    /// Returns [`ConstructionError`] on the first duplicate name encountered in any of the four
    /// namespaces (roles, artifacts, events, and policies are each indexed separately).
    pub fn build_indexes(&mut self) -> Result<(), ConstructionError> {
        self.role_index.clear();
        self.artifact_index.clear();
        self.event_index.clear();
        self.policy_index.clear();

        for (i, role) in self.roles.iter().enumerate() {
            if self.role_index.insert(role.name.clone(), i).is_some() {
                return Err(ConstructionError::DuplicateRole { community: self.name.clone(), name: role.name.clone() });
            }
        }
        for (i, art) in self.artifacts.iter().enumerate() {
            if self.artifact_index.insert(art.name.clone(), i).is_some() {
                return Err(ConstructionError::DuplicateArtifact { community: self.name.clone(), name: art.name.clone() });
            }
        }
        for (i, ev) in self.events.iter().enumerate() {
            if self.event_index.insert(ev.name.clone(), i).is_some() {
                return Err(ConstructionError::DuplicateEvent { community: self.name.clone(), name: ev.name.clone() });
            }
        }
        for (i, policy) in self.policies.iter().enumerate() {
            if self.policy_index.insert(policy.name.clone(), i).is_some() {
                return Err(ConstructionError::DuplicatePolicy { community: self.name.clone(), name: policy.name.clone() });
            }
        }

        for import in &self.imports {
            for fulfillment in &import.role_fulfillment {
                if !self.role_index.contains_key(&fulfillment.role) {
                    return Err(ConstructionError::UnknownLocalRole { import_name: import.name.clone(), role: fulfillment.role.clone() });
                }
            }
        }
        Ok(())
    }

    /// Looks up a role by name. Requires [`Community::build_indexes`] to have been called.
    #[inline]
    pub fn get_role(&self, name: &str) -> Option<&Role> { self.role_index.get(name).map(|&i| &self.roles[i]) }

    /// Looks up an artifact template by name. Requires [`Community::build_indexes`] to have been called.
    #[inline]
    pub fn get_artifact(&self, name: &str) -> Option<&Artifact> { self.artifact_index.get(name).map(|&i| &self.artifacts[i]) }

    /// Looks up an event by name. Requires [`Community::build_indexes`] to have been called.
    #[inline]
    pub fn get_event(&self, name: &str) -> Option<&Event> { self.event_index.get(name).map(|&i| &self.events[i]) }

    /// Looks up a policy by name. Requires [`Community::build_indexes`] to have been called.
    #[inline]
    pub fn get_policy(&self, name: &str) -> Option<&Policy> { self.policy_index.get(name).map(|&i| &self.policies[i]) }
}
impl Display for Community {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.name) }
}

/// Builder for [`Community`], the hydrator-facing half of the source-AST contract: a hydrator
/// walks its parsed AST and calls this builder incrementally, then calls
/// [`CommunityBuilder::build`] to get back a [`Community`] with its indexes populated.
#[derive(Default)]
pub struct CommunityBuilder {
    name: String,
    contract: Option<String>,
    objective: String,
    imports: Vec<Import>,
    events: Vec<Event>,
    artifacts: Vec<Artifact>,
    roles: Vec<Role>,
    policies: Vec<Policy>,
}
impl CommunityBuilder {
    /// Starts building a community with the given name.
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), ..Default::default() } }

    /// Sets the contract description.
    pub fn contract(mut self, contract: impl Into<String>) -> Self { self.contract = Some(contract.into()); self }

    /// Sets the objective statement.
    pub fn objective(mut self, objective: impl Into<String>) -> Self { self.objective = objective.into(); self }

    /// Adds an import.
    pub fn import(mut self, import: Import) -> Self { self.imports.push(import); self }

    /// Adds an event.
    pub fn event(mut self, event: Event) -> Self { self.events.push(event); self }

    /// Adds an artifact template.
    pub fn artifact(mut self, artifact: Artifact) -> Self { self.artifacts.push(artifact); self }

    /// Adds a role, usually built with [`RoleBuilder`].
    pub fn role(mut self, role: Role) -> Self { self.roles.push(role); self }

    /// Adds a policy.
    pub fn policy(mut self, policy: Policy) -> Self { self.policies.push(policy); self }

    /// Finalizes construction, populating the community's lookup indexes.
    ///
    /// # Errors
    /// Returns [`ConstructionError`] under the same conditions as [`Community::build_indexes`].
    pub fn build(self) -> Result<Community, ConstructionError> {
        let mut community = Community::new(self.name, self.contract, self.objective, self.imports, self.events, self.artifacts, self.roles, self.policies);
        community.build_indexes()?;
        Ok(community)
    }
}

/// Builder for [`Role`], mirroring [`CommunityBuilder`]'s incremental style.
#[derive(Default)]
pub struct RoleBuilder {
    name: String,
    description: Option<String>,
    actions: Vec<super::action::Action>,
    tokens: Vec<super::token::DeonticToken>,
}
impl RoleBuilder {
    /// Starts building a role with the given name.
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), ..Default::default() } }

    /// Sets the role's free-text description.
    pub fn description(mut self, description: impl Into<String>) -> Self { self.description = Some(description.into()); self }

    /// Adds an action.
    pub fn action(mut self, action: super::action::Action) -> Self { self.actions.push(action); self }

    /// Adds a deontic token template.
    pub fn token(mut self, token: super::token::DeonticToken) -> Self { self.tokens.push(token); self }

    /// Finalizes construction.
    pub fn build(self) -> Role { Role::new(self.name, self.description, self.actions, self.tokens) }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use super::super::artifact::Artifact;
    use super::super::policy::{Policy, PolicyEnvelope, PolicySettingBehaviour, PolicyValue};

    fn policy(name: &str) -> Policy {
        Policy::new(name, "Number", PolicySettingBehaviour::new("Librarian"), PolicyValue::Number(1.0), PolicyEnvelope::default())
    }

    #[test]
    fn build_indexes_detects_duplicate_roles() {
        let role = RoleBuilder::new("Borrower").build();
        let result = CommunityBuilder::new("Library").role(role.clone()).role(role).build();
        assert!(matches!(result, Err(ConstructionError::DuplicateRole { .. })));
    }

    #[test]
    fn build_indexes_detects_duplicate_policies() {
        let result = CommunityBuilder::new("Library").policy(policy("maxLoans")).policy(policy("maxLoans")).build();
        assert!(matches!(result, Err(ConstructionError::DuplicatePolicy { .. })));
    }

    #[test]
    fn builder_roundtrips_lookups() {
        let community = CommunityBuilder::new("Library")
            .role(RoleBuilder::new("Borrower").build())
            .artifact(Artifact::new("Book", vec!["Borrower".into()], vec![]))
            .policy(policy("maxLoans"))
            .build()
            .unwrap();
        assert!(community.get_role("Borrower").is_some());
        assert!(community.get_artifact("Book").is_some());
        assert!(community.get_policy("maxLoans").is_some());
        assert!(community.get_role("Librarian").is_none());
    }
}
