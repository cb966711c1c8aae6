//  LIBRARY_SCENARIO.rs
//    by Lut99
//
//  Description:
//!   End-to-end integration test driving a small library community through the full
//!   borrow/fine/delegate/return/pay scenario, checked entirely through [`Engine`]'s public API.
//

use std::collections::HashMap;
use std::sync::Arc;

use odp_engine::engine::{Engine, PerformOutcome};
use odp_engine::guard::Guard;
use odp_engine::model::{
    Action, ActionHeader, Artifact, CommunityBuilder, DelegatedToken, DeonticTokenBuilder, Event, EventExpression, Parameter, Policy, PolicyEnvelope, PolicySettingBehaviour, PolicyValue,
    Property, RoleBuilder, TokenType,
};
use odp_engine::value::Value;

fn build_community() -> odp_engine::Community {
    let item_borrowed = Event::new("ItemBorrowed", vec![]);
    let item_overdue_fined = Event::new("ItemOverdueFined", vec![]);
    let item_returned = Event::new("ItemReturned", vec![]);
    let fine_paid = Event::new("FinePaid", vec![]);

    let return_item_burden = DeonticTokenBuilder::new(TokenType::Burden, "returnItemBurden")
        .affected_role("Borrower")
        .activation_trigger(item_borrowed.clone())
        .finish_expression(EventExpression::leaf(item_returned.clone()))
        .build();
    let pay_fine_burden = DeonticTokenBuilder::new(TokenType::Burden, "payFineBurden")
        .affected_role("Borrower")
        .activation_trigger(item_overdue_fined.clone())
        .finish_expression(EventExpression::leaf(fine_paid.clone()))
        .build();

    let borrow_item = Action::SpeechAct {
        header: ActionHeader {
            name: "borrowItem".into(),
            parameters: vec![Parameter::new("item", "LibraryItem")],
            guard: Some(Guard::parse("loanCount(self) < maxLoans").unwrap()),
            trigger_event: Some(item_borrowed.clone()),
        },
        tokens: vec![return_item_burden],
    };

    let fine_borrower = Action::SpeechAct {
        header: ActionHeader {
            name: "fineBorrower".into(),
            parameters: vec![Parameter::new("loan", "Loan")],
            guard: Some(Guard::parse("loan.isOverdue == true").unwrap()),
            trigger_event: Some(item_overdue_fined.clone()),
        },
        tokens: vec![pay_fine_burden],
    };

    let pay_fine = Action::SpeechAct {
        header: ActionHeader {
            name: "payFine".into(),
            parameters: vec![Parameter::new("fine", "Fine")],
            guard: Some(Guard::parse("hasUnpaidFines(self)").unwrap()),
            trigger_event: Some(fine_paid.clone()),
        },
        tokens: vec![],
    };

    let return_item_delegation = Action::Delegation {
        header: ActionHeader { name: "return_item_delegation".into(), parameters: vec![Parameter::new("loan", "Loan"), Parameter::new("agent", "Party")], guard: None, trigger_event: None },
        tokens: vec![],
        token_type: DelegatedToken::Burden,
        token_name: "returnItemBurden".into(),
        agent: Some("ProxyBorrower".into()),
    };

    let return_item = Action::SpeechAct {
        header: ActionHeader { name: "returnItem".into(), parameters: vec![Parameter::new("loan", "Loan")], guard: None, trigger_event: Some(item_returned.clone()) },
        tokens: vec![],
    };

    let max_loans = Policy::new("maxLoans", "Number", PolicySettingBehaviour::new("Librarian"), PolicyValue::Number(3.0), PolicyEnvelope::default());

    CommunityBuilder::new("Library")
        .objective("Lend books while tracking overdue fines.")
        .event(item_borrowed)
        .event(item_overdue_fined)
        .event(item_returned)
        .event(fine_paid)
        .artifact(Artifact::new("LibraryItem", vec!["Borrower".into()], vec![Property::new("title", "String")]))
        .artifact(Artifact::new("Loan", vec!["Borrower".into()], vec![Property::new("item", "LibraryItem"), Property::new("borrower", "Party"), Property::new("isOverdue", "Bool")]))
        .artifact(Artifact::new("Fine", vec!["Borrower".into()], vec![Property::new("borrower", "Party"), Property::new("amount", "Number"), Property::new("isPaid", "Bool")]))
        .role(RoleBuilder::new("Undergraduate").build())
        .role(RoleBuilder::new("Borrower").action(borrow_item).action(return_item_delegation).action(pay_fine).build())
        .role(RoleBuilder::new("Librarian").action(fine_borrower).build())
        .role(RoleBuilder::new("ProxyBorrower").action(return_item).build())
        .policy(max_loans)
        .build()
        .unwrap()
}

#[test]
fn full_borrow_fine_delegate_return_scenario() {
    let mut engine = Engine::new(build_community());
    engine.try_create_party("Alice", vec!["Undergraduate".into(), "Borrower".into()]).unwrap();
    engine.try_create_party("Libby", vec!["Librarian".into()]).unwrap();
    engine.try_create_party("Bob", vec!["ProxyBorrower".into()]).unwrap();
    engine.try_create_artifact_instance("LibraryItem", "book-001", HashMap::from([("title".to_string(), Value::String("ODP in Practice".into()))])).unwrap();

    let book = engine.get_artifact("book-001").cloned().unwrap();
    let outcome = engine.try_perform_action("Alice", "borrowItem", vec![("item".to_string(), Value::Artifact(Arc::new(book)))]).unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);

    let loan_id = engine.artifacts_of_template("Loan").next().unwrap().instance_id.clone();

    // Guard closure: fining before the loan is overdue must be denied.
    let loan = engine.get_artifact(&loan_id).cloned().unwrap();
    let outcome = engine.try_perform_action("Libby", "fineBorrower", vec![("loan".to_string(), Value::Artifact(Arc::new(loan)))]).unwrap();
    assert!(matches!(outcome, PerformOutcome::Denied(_)));
    assert_eq!(engine.artifacts_of_template("Fine").count(), 0);

    // Mark overdue, retry: guard now holds.
    engine.set_artifact_property(&loan_id, "isOverdue", Value::Bool(true));
    let loan = engine.get_artifact(&loan_id).cloned().unwrap();
    let outcome = engine.try_perform_action("Libby", "fineBorrower", vec![("loan".to_string(), Value::Artifact(Arc::new(loan.clone())))]).unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);

    // The fine burden is active and owned by Alice as soon as fineBorrower fires.
    let pay_fine_burden = engine.tokens_of_template("payFineBurden").next().unwrap();
    assert_eq!(pay_fine_burden.owner, "Alice");
    assert_eq!(pay_fine_burden.state, odp_engine::runtime::token::TokenState::Active);

    // Delegation: the return burden moves from Alice to Bob.
    let bob = engine.get_party("Bob").cloned().unwrap();
    let outcome = engine
        .try_perform_action("Alice", "return_item_delegation", vec![("loan".to_string(), Value::Artifact(Arc::new(loan.clone()))), ("agent".to_string(), Value::Party(Arc::new(bob)))])
        .unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);
    assert_eq!(engine.tokens_of_template("returnItemBurden").next().unwrap().owner, "Bob", "delegation must actually move the token's owner");

    // Bob, now holding the delegated burden, returns the book on Alice's behalf.
    let outcome = engine.try_perform_action("Bob", "returnItem", vec![("loan".to_string(), Value::Artifact(Arc::new(loan)))]).unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);
    assert!(engine.get_artifact(&loan_id).is_none(), "returnItem's built-in removes the Loan artifact");
    assert_eq!(
        engine.tokens_of_template("returnItemBurden").next().unwrap().state,
        odp_engine::runtime::token::TokenState::Discharged,
        "ItemReturned must discharge the (delegated) return burden"
    );

    // Alice pays off her fine, discharging the other outstanding burden.
    let fine = engine.artifacts_of_template("Fine").next().cloned().unwrap();
    let outcome = engine.try_perform_action("Alice", "payFine", vec![("fine".to_string(), Value::Artifact(Arc::new(fine)))]).unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);
    assert_eq!(engine.tokens_of_template("payFineBurden").next().unwrap().state, odp_engine::runtime::token::TokenState::Discharged, "FinePaid must discharge the pay-fine burden");

    // Determinism: the tracer's sequence numbers are strictly increasing and the diagram renders.
    let history = engine.tracer().history();
    for pair in history.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
    }
    let diagram = engine.tracer().to_sequence_diagram();
    assert!(diagram.starts_with("sequenceDiagram"));
}

#[test]
fn unauthorized_delegate_is_denied() {
    let mut engine = Engine::new(build_community());
    engine.try_create_party("Alice", vec!["Undergraduate".into(), "Borrower".into()]).unwrap();
    engine.try_create_party("Eve", vec!["Undergraduate".into()]).unwrap();
    engine.try_create_artifact_instance("LibraryItem", "book-002", HashMap::new()).unwrap();

    let book = engine.get_artifact("book-002").cloned().unwrap();
    engine.try_perform_action("Alice", "borrowItem", vec![("item".to_string(), Value::Artifact(Arc::new(book)))]).unwrap();
    let loan = engine.artifacts_of_template("Loan").next().cloned().unwrap();

    // Eve does not fulfill the required agent role (ProxyBorrower), so delegation is denied.
    let eve = engine.get_party("Eve").cloned().unwrap();
    let outcome = engine
        .try_perform_action("Alice", "return_item_delegation", vec![("loan".to_string(), Value::Artifact(Arc::new(loan))), ("agent".to_string(), Value::Party(Arc::new(eve)))])
        .unwrap();
    assert!(matches!(outcome, PerformOutcome::Denied(_)));
}

#[test]
fn active_embargo_screens_out_every_action_before_the_guard_runs() {
    let suspended = Event::new("Suspended", vec![]);
    let embargo_token = DeonticTokenBuilder::new(TokenType::Embargo, "suspended").affected_role("Borrower").activation_trigger(suspended.clone()).build();

    let misbehave = Action::SpeechAct {
        header: ActionHeader { name: "misbehave".into(), parameters: vec![], guard: None, trigger_event: Some(suspended.clone()) },
        tokens: vec![embargo_token],
    };
    let borrow_item = Action::SpeechAct {
        header: ActionHeader { name: "borrowItem".into(), parameters: vec![Parameter::new("item", "LibraryItem")], guard: Some(Guard::parse("true").unwrap()), trigger_event: None },
        tokens: vec![],
    };

    let community = CommunityBuilder::new("Library")
        .objective("embargo test")
        .event(suspended)
        .artifact(Artifact::new("LibraryItem", vec!["Borrower".into()], vec![]))
        .role(RoleBuilder::new("Borrower").action(misbehave).action(borrow_item).build())
        .build()
        .unwrap();

    let mut engine = Engine::new(community);
    engine.try_create_party("Alice", vec!["Borrower".into()]).unwrap();

    let outcome = engine.try_perform_action("Alice", "misbehave", vec![]).unwrap();
    assert_eq!(outcome, PerformOutcome::Permitted);

    let outcome = engine.try_perform_action("Alice", "borrowItem", vec![("item".to_string(), Value::String("book".into()))]).unwrap();
    assert!(matches!(outcome, PerformOutcome::Denied(_)), "an active embargo must screen out later actions regardless of their own guard");
}
