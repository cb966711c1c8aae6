//  ENGINE.rs
//    by Lut99
//
//  Description:
//!   Implements [`Engine`], the driver that executes the semantics of a [`Community`]: party
//!   and artifact creation, action dispatch (embargo screen, guard screen, built-in side
//!   effects, token minting/delegation, event emission, activation/discharge sweep).
//

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;

use crate::guard::{Context, FunctionContext};
use crate::model::action::{Action, DelegatedToken};
use crate::model::community::Community;
use crate::model::token::DeonticToken;
use crate::model::vocabulary::Event;
use crate::runtime::artifact::ArtifactInstance;
use crate::runtime::party::Party;
use crate::runtime::token::{DeonticTokenInstance, TokenState};
use crate::tracer::Tracer;
use crate::value::Value;


/***** ERRORS *****/
/// Errors raised by the driver-level operations ([`Engine::try_create_party`],
/// [`Engine::try_create_artifact_instance`], [`Engine::try_perform_action`]) when the request
/// names something that does not exist, or collides with something that already does.
///
/// The infallible `create_party`/`create_artifact_instance`/`perform_action` entry points log
/// these via `log::warn!` and swallow them rather than propagating a `Result`; the `try_*` family
/// surfaces them for callers (tests, a future hydrator-driven host) that want the error instead
/// of a log line.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("party '{name}' already exists")]
    DuplicateParty { name: String },
    #[error("one or more roles not found for party '{name}': {roles:?}")]
    UnknownRole { name: String, roles: Vec<String> },
    #[error("artifact instance '{instance_id}' already exists")]
    DuplicateArtifact { instance_id: String },
    #[error("artifact template '{template}' not found")]
    UnknownArtifactTemplate { template: String },
    #[error("party '{name}' not found")]
    UnknownParty { name: String },
    #[error("action '{action}' not found for party '{party}'")]
    UnknownAction { party: String, action: String },
}

/// A normative denial of an attempted action: an active embargo or a failing guard.
///
/// Not an [`std::error::Error`] impl: a denial is expected control flow, already recorded in
/// the [`Tracer`] by the time it is returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Denial {
    pub reason: String,
}

/// The result of attempting an action: either it was permitted and its effects applied, or it
/// was denied for a normative reason.
#[derive(Clone, Debug, PartialEq)]
pub enum PerformOutcome {
    Permitted,
    Denied(Denial),
}


/***** KWARGS *****/
/// The ordered argument list an action is performed with.
///
/// Kept as a `Vec` rather than a `HashMap` because [`Engine::resolve_token_owner`] scans
/// arguments in declaration order to find the first one satisfying a role, and declaration
/// order only survives in a `Vec`.
pub type Kwargs = Vec<(String, Value)>;

fn kwarg<'a>(kwargs: &'a Kwargs, name: &str) -> Option<&'a Value> { kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v) }

fn set_kwarg(kwargs: &mut Kwargs, name: impl Into<String>, value: Value) {
    let name = name.into();
    if let Some(slot) = kwargs.iter_mut().find(|(k, _)| *k == name) {
        slot.1 = value;
    } else {
        kwargs.push((name, value));
    }
}


/***** BUILTINS *****/
/// The mutable surface a [`BuiltinRegistry`] is given to carry out a built-in's domain-level
/// side effects (minting a `Loan`/`Fine` artifact, reading the current arguments).
pub struct BuiltinContext<'a> {
    pub artifacts: &'a mut HashMap<String, ArtifactInstance>,
    pub parties: &'a HashMap<String, Party>,
    pub performer: &'a str,
    pub kwargs: &'a mut Kwargs,
}
impl<'a> BuiltinContext<'a> {
    /// Mints a fresh artifact instance of the given template, returning its generated id.
    pub fn mint_artifact(&mut self, template_name: &str, properties: HashMap<String, Value>) -> String {
        let instance_id = format!("{}-{}", template_name.to_lowercase(), random_suffix());
        self.artifacts.insert(instance_id.clone(), ArtifactInstance::new(instance_id.clone(), template_name, properties));
        instance_id
    }

    /// Looks up an argument by name.
    #[inline]
    pub fn kwarg(&self, name: &str) -> Option<&Value> { kwarg(self.kwargs, name) }

    /// Sets (or overwrites) an argument.
    #[inline]
    pub fn set_kwarg(&mut self, name: impl Into<String>, value: Value) { set_kwarg(self.kwargs, name, value) }

    /// Builds a [`Value::Party`] snapshot of the performing party.
    pub fn performer_value(&self) -> Value { Value::Party(Arc::new(self.parties[self.performer].clone())) }
}

/// Applies the domain-specific side effects of the three built-in actions this engine version
/// hardcodes.
///
/// Kept behind a trait so a future host can swap in a different domain without touching
/// [`Engine::perform_action`].
pub trait BuiltinRegistry {
    /// Applies any side effects `action_name` names, mutating `ctx` in place.
    fn apply(&self, action_name: &str, ctx: &mut BuiltinContext);
}

/// The built-in registry implementing `borrowItem`/`returnItem`/`fineBorrower` handling,
/// including its `amount=500` constant and `isPaid=false` default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBuiltins;
impl BuiltinRegistry for DefaultBuiltins {
    fn apply(&self, action_name: &str, ctx: &mut BuiltinContext) {
        match action_name {
            "borrowItem" => {
                let item = ctx.kwarg("item").cloned().unwrap_or(Value::Unit);
                let borrower = ctx.performer_value();
                let mut props = HashMap::new();
                props.insert("item".to_string(), item);
                props.insert("borrower".to_string(), borrower);
                props.insert("isOverdue".to_string(), Value::Bool(false));
                let loan_id = ctx.mint_artifact("Loan", props);
                let loan = Value::Artifact(Arc::new(ctx.artifacts[&loan_id].clone()));
                ctx.set_kwarg("loan", loan);
            }
            "returnItem" => {
                if let Some(Value::Artifact(loan)) = ctx.kwarg("loan").cloned() {
                    ctx.artifacts.remove(&loan.instance_id);
                }
            }
            "fineBorrower" => {
                let loan = ctx.kwarg("loan").cloned();
                let borrower = loan.as_ref().and_then(|l| l.as_artifact()).and_then(|a| a.properties.get("borrower")).cloned().unwrap_or(Value::Unit);
                let mut props = HashMap::new();
                props.insert("borrower".to_string(), borrower);
                if let Some(loan) = loan {
                    props.insert("loan".to_string(), loan);
                }
                props.insert("amount".to_string(), Value::Number(500.0));
                props.insert("isPaid".to_string(), Value::Bool(false));
                let fine_id = ctx.mint_artifact("Fine", props);
                let fine = Value::Artifact(Arc::new(ctx.artifacts[&fine_id].clone()));
                ctx.set_kwarg("fine", fine);
            }
            _ => {}
        }
    }
}

fn random_suffix() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..6).map(|_| HEX[rng.gen_range(0..HEX.len())] as char).collect()
}


/***** DOMAIN FUNCTIONS *****/
struct EngineFunctionContext<'a> {
    engine: &'a Engine,
}
impl<'a> FunctionContext for EngineFunctionContext<'a> {
    fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        match name {
            "loanCount" => {
                let party = args.first()?.as_party()?;
                #[cfg(feature = "log")]
                log::trace!("  (Guard) loanCount for '{}' is {}", party.name, self.engine.loan_count(party));
                Some(Value::Number(self.engine.loan_count(party) as f64))
            }
            "hasUnpaidFines" => {
                let party = args.first()?.as_party()?;
                #[cfg(feature = "log")]
                log::trace!("  (Guard) hasUnpaidFines for '{}' is {}", party.name, self.engine.has_unpaid_fines(party));
                Some(Value::Bool(self.engine.has_unpaid_fines(party)))
            }
            _ => self.engine.domain_fns.get(name).map(|f| f(args)),
        }
    }
}


/***** ENGINE *****/
/// The driver that executes a [`Community`]'s semantics: party and artifact creation, and
/// action dispatch.
///
/// `!Sync` by convention: single-threaded and synchronous, no internal locking.
pub struct Engine {
    community: Community,
    parties: HashMap<String, Party>,
    artifacts: HashMap<String, ArtifactInstance>,
    tokens: Vec<DeonticTokenInstance>,
    policy_values: HashMap<String, Value>,
    domain_fns: HashMap<String, Box<dyn Fn(&[Value]) -> Value>>,
    builtins: Box<dyn BuiltinRegistry>,
    tracer: Tracer,
}
impl Engine {
    /// Constructs an engine over the given community, seeding `policy_values` from the
    /// community's declared policies and using [`DefaultBuiltins`] for built-in side effects.
    pub fn new(community: Community) -> Self {
        let policy_values = community.policies.iter().map(|p| (p.name.clone(), Value::from(p.initial_value))).collect();
        Self {
            community,
            parties: HashMap::new(),
            artifacts: HashMap::new(),
            tokens: Vec::new(),
            policy_values,
            domain_fns: HashMap::new(),
            builtins: Box::new(DefaultBuiltins),
            tracer: Tracer::new(),
        }
    }

    /// Replaces the built-in registry used for domain-level side effects.
    pub fn with_builtins(mut self, builtins: impl BuiltinRegistry + 'static) -> Self {
        self.builtins = Box::new(builtins);
        self
    }

    /// Overlays a [`crate::config::EngineConfig`]'s policy value overrides onto this engine's
    /// current `policy_values`, leaving any policy the config has no entry for untouched.
    #[cfg(feature = "config")]
    pub fn apply_config(&mut self, config: &crate::config::EngineConfig) {
        for (name, value) in &config.policy_values {
            self.policy_values.insert(name.clone(), Value::from(*value));
        }
    }

    /// Builder-style variant of [`Engine::apply_config`].
    #[cfg(feature = "config")]
    pub fn with_config(mut self, config: &crate::config::EngineConfig) -> Self {
        self.apply_config(config);
        self
    }

    /// Registers an additional domain function callable from guard expressions, beyond the
    /// pre-registered `loanCount`/`hasUnpaidFines`.
    pub fn register_domain_fn(&mut self, name: impl Into<String>, f: impl Fn(&[Value]) -> Value + 'static) { self.domain_fns.insert(name.into(), Box::new(f)); }

    /// Returns this engine's tracer.
    #[inline]
    pub fn tracer(&self) -> &Tracer { &self.tracer }

    /// Looks up a live artifact instance by id.
    #[inline]
    pub fn get_artifact(&self, instance_id: &str) -> Option<&ArtifactInstance> { self.artifacts.get(instance_id) }

    /// Iterates over all live artifact instances minted from the named template, in no
    /// particular order, for hosts that need to find e.g. "the `Loan` just minted by
    /// `borrowItem`" without tracking the generated instance id themselves.
    pub fn artifacts_of_template<'a>(&'a self, template_name: &'a str) -> impl Iterator<Item = &'a ArtifactInstance> + 'a {
        self.artifacts.values().filter(move |a| a.template_name == template_name)
    }

    /// Iterates over all live token instances minted from the named template, in no particular
    /// order, for hosts or tests that need to observe a token's current owner or lifecycle state.
    pub fn tokens_of_template<'a>(&'a self, template_name: &'a str) -> impl Iterator<Item = &'a DeonticTokenInstance> + 'a {
        self.tokens.iter().filter(move |t| t.template.name == template_name)
    }

    /// Sets a property on a live artifact instance, for world-state setup outside of
    /// [`Engine::perform_action`] (e.g. marking a loan overdue directly).
    pub fn set_artifact_property(&mut self, instance_id: &str, name: impl Into<String>, value: Value) -> bool {
        match self.artifacts.get_mut(instance_id) {
            Some(artifact) => {
                artifact.set(name, value);
                true
            }
            None => false,
        }
    }

    /// Looks up a live party by name.
    #[inline]
    pub fn get_party(&self, name: &str) -> Option<&Party> { self.parties.get(name) }

    /// Finds the first action named `action_name` reachable through any role `party` fulfills.
    fn find_action(&self, party: &Party, action_name: &str) -> Option<&Action> {
        party.fulfills_roles.iter().find_map(|role_name| self.community.get_role(role_name).and_then(|role| role.get_action(action_name)))
    }

    fn loan_count(&self, party: &Party) -> usize {
        self.artifacts
            .values()
            .filter(|art| art.template_name == "Loan" && art.properties.get("borrower").and_then(Value::as_party).map(|p| p.name == party.name).unwrap_or(false))
            .count()
    }

    fn has_unpaid_fines(&self, party: &Party) -> bool {
        self.artifacts.values().any(|art| {
            art.template_name == "Fine"
                && art.properties.get("borrower").and_then(Value::as_party).map(|p| p.name == party.name).unwrap_or(false)
                && !art.properties.get("isPaid").and_then(Value::as_bool).unwrap_or(true)
        })
    }

    /// Creates a party fulfilling the given roles, logging and swallowing errors.
    ///
    /// Use [`Engine::try_create_party`] to observe the error instead.
    pub fn create_party(&mut self, name: impl Into<String>, role_names: Vec<String>) {
        if let Err(_err) = self.try_create_party(name, role_names) {
            #[cfg(feature = "log")]
            log::warn!("{_err}");
        }
    }

    /// Creates a party fulfilling the given roles.
    ///
    /// # Errors
    /// Returns [`DriverError::DuplicateParty`] if a party with this name already exists, or
    /// [`DriverError::UnknownRole`] if any named role does not exist in this engine's community.
    pub fn try_create_party(&mut self, name: impl Into<String>, role_names: Vec<String>) -> Result<(), DriverError> {
        let name = name.into();
        if self.parties.contains_key(&name) {
            return Err(DriverError::DuplicateParty { name });
        }
        let missing: Vec<String> = role_names.iter().filter(|r| self.community.get_role(r).is_none()).cloned().collect();
        if !missing.is_empty() {
            return Err(DriverError::UnknownRole { name, roles: missing });
        }
        self.parties.insert(name.clone(), Party::new(name, role_names));
        Ok(())
    }

    /// Creates an artifact instance of the given template, logging and swallowing errors.
    ///
    /// Use [`Engine::try_create_artifact_instance`] to observe the error instead.
    pub fn create_artifact_instance(&mut self, artifact_type: &str, instance_id: impl Into<String>, properties: HashMap<String, Value>) {
        if let Err(_err) = self.try_create_artifact_instance(artifact_type, instance_id, properties) {
            #[cfg(feature = "log")]
            log::warn!("{_err}");
        }
    }

    /// Creates an artifact instance of the given template.
    ///
    /// # Errors
    /// Returns [`DriverError::DuplicateArtifact`] if an instance with this id already exists, or
    /// [`DriverError::UnknownArtifactTemplate`] if `artifact_type` names no declared template.
    pub fn try_create_artifact_instance(&mut self, artifact_type: &str, instance_id: impl Into<String>, properties: HashMap<String, Value>) -> Result<(), DriverError> {
        let instance_id = instance_id.into();
        if self.artifacts.contains_key(&instance_id) {
            return Err(DriverError::DuplicateArtifact { instance_id });
        }
        if self.community.get_artifact(artifact_type).is_none() {
            return Err(DriverError::UnknownArtifactTemplate { template: artifact_type.into() });
        }
        self.artifacts.insert(instance_id.clone(), ArtifactInstance::new(instance_id, artifact_type, properties));
        Ok(())
    }

    /// Attempts to perform an action as the named party, logging and swallowing driver errors.
    ///
    /// A normative denial is not logged as an error: it is already recorded in this engine's
    /// [`Tracer`]. Use [`Engine::try_perform_action`] to observe the [`PerformOutcome`].
    pub fn perform_action(&mut self, party_name: &str, action_name: &str, kwargs: Kwargs) {
        if let Err(_err) = self.try_perform_action(party_name, action_name, kwargs) {
            #[cfg(feature = "log")]
            log::warn!("{_err}");
        }
    }

    /// Attempts to perform an action as the named party.
    ///
    /// Implements the full dispatch algorithm: embargo screen, guard screen, built-in side
    /// effects, delegation, token minting, event emission, and the activation/discharge sweep
    /// that follows.
    ///
    /// # Errors
    /// Returns [`DriverError::UnknownParty`] or [`DriverError::UnknownAction`] if `party_name`
    /// or `action_name` do not resolve. Normative denials are not errors; they are reported as
    /// `Ok(PerformOutcome::Denied(_))`.
    pub fn try_perform_action(&mut self, party_name: &str, action_name: &str, mut kwargs: Kwargs) -> Result<PerformOutcome, DriverError> {
        let party = self.parties.get(party_name).cloned().ok_or_else(|| DriverError::UnknownParty { name: party_name.into() })?;
        let action = self.find_action(&party, action_name).cloned().ok_or_else(|| DriverError::UnknownAction { party: party_name.into(), action: action_name.into() })?;

        for token in &self.tokens {
            if token.owner == party_name && token.state == TokenState::Active && token.template.is_embargo() {
                let reason = format!("Active embargo '{}'", token.template.name);
                self.tracer.log_action_prohibited(party_name, action_name, &reason);
                return Ok(PerformOutcome::Denied(Denial { reason }));
            }
        }

        if let Some(guard) = &action.header().guard {
            let funcs = EngineFunctionContext { engine: self };
            let mut ctx = Context::new(&funcs);
            for (name, value) in &self.policy_values {
                ctx.bind_mut(name.clone(), value.clone());
            }
            ctx.bind_mut("self", Value::Party(Arc::new(party.clone())));
            for (name, value) in &kwargs {
                ctx.bind_mut(name.clone(), value.clone());
            }
            if !guard.evaluate(&ctx) {
                let reason = format!("Guard failed: {}", guard.raw);
                self.tracer.log_action_prohibited(party_name, action_name, &reason);
                return Ok(PerformOutcome::Denied(Denial { reason }));
            }
        }

        self.tracer.log_action(party_name, action_name, kwargs.iter().map(|(k, v)| (k.clone(), format!("{v}"))).collect());

        {
            let mut ctx = BuiltinContext { artifacts: &mut self.artifacts, parties: &self.parties, performer: party_name, kwargs: &mut kwargs };
            self.builtins.apply(action_name, &mut ctx);
        }

        if let Action::Delegation { token_type: _, token_name, agent, .. } = &action {
            let new_owner_name = kwargs.iter().find(|(k, _)| k == "agent").and_then(|(_, v)| v.as_party()).map(|p| p.name.clone());
            let agent_role = agent.as_deref();
            let recipient_ok = match (&new_owner_name, agent_role) {
                (Some(name), Some(role)) => self.parties.get(name).map(|p| p.has_role(role)).unwrap_or(false),
                _ => false,
            };
            if !recipient_ok {
                let reason = format!("Delegation failed: recipient does not fulfill required role '{}'", agent_role.unwrap_or("?"));
                self.tracer.log_action_prohibited(party_name, action_name, &reason);
                return Ok(PerformOutcome::Denied(Denial { reason }));
            }
            let loan_context = kwarg(&kwargs, "loan").cloned();
            let new_owner_name = new_owner_name.unwrap();
            let found = self
                .tokens
                .iter()
                .position(|t| t.owner == party_name && t.template.name == *token_name && t.state == TokenState::Active && t.context.get("loan") == loan_context.as_ref());
            let Some(idx) = found else {
                let reason = format!("Delegation failed: no active '{token_name}' token held by '{party_name}' matches the given arguments");
                self.tracer.log_action_prohibited(party_name, action_name, &reason);
                return Ok(PerformOutcome::Denied(Denial { reason }));
            };
            self.tokens[idx].owner = new_owner_name.clone();
            let template_name = self.tokens[idx].template.name.clone();
            let instance_id = self.tokens[idx].instance_id.clone();
            self.tracer.log_token_state_change(instance_id, template_name, new_owner_name, "DELEGATED", format!("delegated via {action_name}"));
        }

        for template in action.tokens() {
            let owner = self.resolve_token_owner(template, party_name, &kwargs);
            let instance_id = format!("token-{}", random_suffix());
            let context: HashMap<String, Value> = kwargs.iter().cloned().collect();
            let instance = DeonticTokenInstance::new(instance_id.clone(), template.clone(), owner.clone(), context);
            self.tracer.log_token_creation(instance_id, template.name.clone(), owner);
            self.tokens.push(instance);
        }

        if let Some(trigger) = action.header().trigger_event.clone() {
            self.fire_event(&trigger);
        }

        Ok(PerformOutcome::Permitted)
    }

    /// Determines the owner a newly-minted token should be assigned to, given the action's
    /// performer and arguments.
    ///
    /// If the template names no `affected_role`, the performer keeps the token. Otherwise the
    /// arguments are scanned **in declaration order** for the first [`Value::Party`] (or
    /// [`Value::Artifact`] property holding a party) that fulfills that role, falling back to
    /// the performer if none do.
    fn resolve_token_owner(&self, template: &DeonticToken, performer: &str, kwargs: &Kwargs) -> String {
        let Some(role_name) = &template.affected_role else {
            return performer.to_string();
        };
        for (_, value) in kwargs {
            if let Some(p) = value.as_party() {
                if p.has_role(role_name) {
                    return p.name.clone();
                }
            }
            if let Some(a) = value.as_artifact() {
                for prop in a.properties.values() {
                    if let Some(p) = prop.as_party() {
                        if p.has_role(role_name) {
                            return p.name.clone();
                        }
                    }
                }
            }
        }
        performer.to_string()
    }

    /// Fires an event, processing its consequences: activating inactive tokens whose
    /// `activation_trigger` matches, and discharging active tokens whose `finish_expression`
    /// now holds.
    fn fire_event(&mut self, event: &Event) {
        let occurred: std::collections::HashSet<Event> = std::iter::once(event.clone()).collect();
        for idx in 0..self.tokens.len() {
            let template_name = self.tokens[idx].template.name.clone();
            let state = self.tokens[idx].state;
            if state == TokenState::Inactive && self.tokens[idx].template.activation_trigger.as_ref() == Some(event) {
                self.tokens[idx].advance_to(TokenState::Active);
                let (instance_id, owner) = (self.tokens[idx].instance_id.clone(), self.tokens[idx].owner.clone());
                self.tracer.log_token_state_change(instance_id, template_name, owner, "ACTIVE", event.name.clone());
            } else if state == TokenState::Active {
                let discharges = match &self.tokens[idx].template.finish_expression {
                    Some(expr) => expr.evaluate(&occurred),
                    None => false,
                };
                if discharges {
                    self.tokens[idx].advance_to(TokenState::Discharged);
                    let (instance_id, owner) = (self.tokens[idx].instance_id.clone(), self.tokens[idx].owner.clone());
                    self.tracer.log_token_state_change(instance_id, template_name, owner, "DISCHARGED", event.name.clone());
                }
            }
        }
    }
}

/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::Artifact;
    use crate::model::community::CommunityBuilder;
    use crate::model::role::RoleBuilder;

    fn empty_community() -> Community {
        CommunityBuilder::new("Test")
            .role(RoleBuilder::new("Borrower").build())
            .artifact(Artifact::new("Book", vec!["Borrower".into()], vec![]))
            .build()
            .unwrap()
    }

    #[test]
    fn create_party_rejects_unknown_role() {
        let mut engine = Engine::new(empty_community());
        let err = engine.try_create_party("Alice", vec!["Ghost".into()]).unwrap_err();
        assert!(matches!(err, DriverError::UnknownRole { .. }));
    }

    #[test]
    fn create_party_rejects_duplicate_name() {
        let mut engine = Engine::new(empty_community());
        engine.try_create_party("Alice", vec!["Borrower".into()]).unwrap();
        let err = engine.try_create_party("Alice", vec!["Borrower".into()]).unwrap_err();
        assert!(matches!(err, DriverError::DuplicateParty { .. }));
    }

    #[test]
    fn create_artifact_instance_rejects_unknown_template() {
        let mut engine = Engine::new(empty_community());
        let err = engine.try_create_artifact_instance("Ghost", "g-1", HashMap::new()).unwrap_err();
        assert!(matches!(err, DriverError::UnknownArtifactTemplate { .. }));
    }

    #[test]
    fn perform_action_rejects_unknown_party() {
        let mut engine = Engine::new(empty_community());
        let err = engine.try_perform_action("Nobody", "borrowItem", vec![]).unwrap_err();
        assert!(matches!(err, DriverError::UnknownParty { .. }));
    }

    #[test]
    fn perform_action_rejects_unknown_action() {
        let mut engine = Engine::new(empty_community());
        engine.try_create_party("Alice", vec!["Borrower".into()]).unwrap();
        let err = engine.try_perform_action("Alice", "flyAway", vec![]).unwrap_err();
        assert!(matches!(err, DriverError::UnknownAction { .. }));
    }

    #[cfg(feature = "config")]
    #[test]
    fn apply_config_overlays_policy_values_without_touching_unmentioned_ones() {
        use crate::config::EngineConfig;
        use crate::model::policy::{Policy, PolicyEnvelope, PolicySettingBehaviour, PolicyValue};

        let community = CommunityBuilder::new("Test")
            .role(RoleBuilder::new("Borrower").build())
            .policy(Policy::new("maxLoans", "Number", PolicySettingBehaviour::new("Librarian"), PolicyValue::Number(3.0), PolicyEnvelope::default()))
            .policy(Policy::new("fineAmount", "Number", PolicySettingBehaviour::new("Librarian"), PolicyValue::Number(500.0), PolicyEnvelope::default()))
            .build()
            .unwrap();

        let mut engine = Engine::new(community);
        assert_eq!(engine.policy_values.get("maxLoans"), Some(&Value::Number(3.0)));

        let mut config = EngineConfig::new();
        config.policy_values.insert("maxLoans".to_string(), PolicyValue::Number(10.0));
        engine.apply_config(&config);

        assert_eq!(engine.policy_values.get("maxLoans"), Some(&Value::Number(10.0)));
        assert_eq!(engine.policy_values.get("fineAmount"), Some(&Value::Number(500.0)));
    }
}
