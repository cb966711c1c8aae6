//  LIBRARY.rs
//    by Lut99
//
//  Description:
//!   Builds the small library community used throughout this crate's documentation and
//!   tests, runs the canonical borrow/fine/delegate/return/pay scenario against it, and prints
//!   the resulting trace as a Mermaid sequence diagram.
//!
//!   The model graph is built directly through the builder API rather than loaded from a DSL
//!   file; this crate does not implement a hydrator for that half of the pipeline.
//

use clap::Parser;
use error_trace::trace;
use humanlog::{DebugMode, HumanLogger};
use log::{error, info};

use odp_engine::engine::Engine;
use odp_engine::guard::Guard;
use odp_engine::model::{
    Action, ActionHeader, Artifact, CommunityBuilder, DeonticTokenBuilder, Event, Parameter, Policy, PolicyEnvelope, PolicySettingBehaviour, PolicyValue, Property, RoleBuilder, TokenType,
};
use odp_engine::value::Value;


/***** ARGUMENTS *****/
/// Defines arguments for this demo.
#[derive(Debug, Parser)]
struct Arguments {
    /// If given, enables INFO- and DEBUG-level logging.
    #[clap(long, global = true)]
    debug: bool,
    /// If given, enables INFO-, DEBUG- and TRACE-level logging. Implies '--debug'.
    #[clap(long, global = true)]
    trace: bool,
}


/***** MODEL *****/
fn build_library_community() -> odp_engine::Community {
    let item_borrowed = Event::new("ItemBorrowed", vec![]);
    let item_overdue_fined = Event::new("ItemOverdueFined", vec![]);
    let item_returned = Event::new("ItemReturned", vec![]);
    let fine_paid = Event::new("FinePaid", vec![]);

    let library_item = Artifact::new("LibraryItem", vec!["Borrower".into()], vec![Property::new("title", "String"), Property::new("itemType", "String")]);
    let loan = Artifact::new("Loan", vec!["Borrower".into()], vec![Property::new("item", "LibraryItem"), Property::new("borrower", "Party"), Property::new("isOverdue", "Bool")]);
    let fine = Artifact::new("Fine", vec!["Borrower".into()], vec![Property::new("borrower", "Party"), Property::new("loan", "Loan"), Property::new("amount", "Number"), Property::new("isPaid", "Bool")]);

    let return_item_burden = DeonticTokenBuilder::new(TokenType::Burden, "returnItemBurden")
        .affected_role("Borrower")
        .activation_trigger(item_borrowed.clone())
        .finish_expression(odp_engine::model::EventExpression::leaf(item_returned.clone()))
        .build();
    let pay_fine_burden = DeonticTokenBuilder::new(TokenType::Burden, "payFineBurden")
        .affected_role("Borrower")
        .activation_trigger(item_overdue_fined.clone())
        .finish_expression(odp_engine::model::EventExpression::leaf(fine_paid.clone()))
        .build();

    let borrow_item = Action::SpeechAct {
        header: ActionHeader {
            name: "borrowItem".into(),
            parameters: vec![Parameter::new("item", "LibraryItem")],
            guard: Some(Guard::parse("loanCount(self) < maxLoans").expect("valid guard")),
            trigger_event: Some(item_borrowed.clone()),
        },
        tokens: vec![return_item_burden],
    };

    let fine_borrower = Action::SpeechAct {
        header: ActionHeader {
            name: "fineBorrower".into(),
            parameters: vec![Parameter::new("loan", "Loan")],
            guard: Some(Guard::parse("loan.isOverdue == true").expect("valid guard")),
            trigger_event: Some(item_overdue_fined.clone()),
        },
        tokens: vec![pay_fine_burden],
    };

    let pay_fine = Action::SpeechAct {
        header: ActionHeader {
            name: "payFine".into(),
            parameters: vec![Parameter::new("fine", "Fine")],
            guard: Some(Guard::parse("hasUnpaidFines(self)").expect("valid guard")),
            trigger_event: Some(fine_paid.clone()),
        },
        tokens: vec![],
    };

    let return_item_delegation = Action::Delegation {
        header: ActionHeader { name: "return_item_delegation".into(), parameters: vec![Parameter::new("loan", "Loan"), Parameter::new("agent", "Party")], guard: None, trigger_event: None },
        tokens: vec![],
        token_type: odp_engine::model::DelegatedToken::Burden,
        token_name: "returnItemBurden".into(),
        agent: Some("ProxyBorrower".into()),
    };

    let return_item = Action::SpeechAct {
        header: ActionHeader {
            name: "returnItem".into(),
            parameters: vec![Parameter::new("loan", "Loan")],
            guard: None,
            trigger_event: Some(item_returned.clone()),
        },
        tokens: vec![],
    };

    let max_loans = Policy::new("maxLoans", "Number", PolicySettingBehaviour::new("Librarian"), PolicyValue::Number(3.0), PolicyEnvelope::default());

    CommunityBuilder::new("Library")
        .objective("Lend books to undergraduates while tracking overdue fines.")
        .event(item_borrowed)
        .event(item_overdue_fined)
        .event(item_returned)
        .event(fine_paid)
        .artifact(library_item)
        .artifact(loan)
        .artifact(fine)
        .role(RoleBuilder::new("Undergraduate").build())
        .role(RoleBuilder::new("Borrower").action(borrow_item).action(return_item_delegation).action(pay_fine).build())
        .role(RoleBuilder::new("Librarian").action(fine_borrower).build())
        .role(RoleBuilder::new("ProxyBorrower").action(return_item).build())
        .policy(max_loans)
        .build()
        .expect("library community has no duplicate names")
}


/***** SCENARIO *****/
fn run_scenario(engine: &mut Engine) {
    engine.create_party("Alice", vec!["Undergraduate".into(), "Borrower".into()]);
    engine.create_party("Libby", vec!["Librarian".into()]);
    engine.create_party("Bob", vec!["ProxyBorrower".into()]);
    engine.create_artifact_instance(
        "LibraryItem",
        "book-001",
        [("title".to_string(), Value::String("Building Enterprise Systems with ODP".into())), ("itemType".to_string(), Value::String("Book".into()))].into_iter().collect(),
    );

    info!("Alice borrows book-001");
    let book = engine.get_artifact("book-001").cloned().expect("book-001 exists");
    engine.perform_action("Alice", "borrowItem", vec![("item".to_string(), Value::Artifact(std::sync::Arc::new(book)))]);

    let loan_id = engine.artifacts_of_template("Loan").next().map(|a| a.instance_id.clone()).expect("borrowItem minted a Loan artifact");

    info!("Libby attempts to fine Alice before the loan is overdue (should fail)");
    let loan = engine.get_artifact(&loan_id).cloned().expect("loan exists");
    engine.perform_action("Libby", "fineBorrower", vec![("loan".to_string(), Value::Artifact(std::sync::Arc::new(loan)))]);

    info!("marking the loan overdue and re-attempting the fine");
    engine.set_artifact_property(&loan_id, "isOverdue", Value::Bool(true));
    let loan = engine.get_artifact(&loan_id).cloned().expect("loan exists");
    engine.perform_action("Libby", "fineBorrower", vec![("loan".to_string(), Value::Artifact(std::sync::Arc::new(loan.clone())))]);

    info!("Alice delegates the return burden to Bob");
    let bob = engine.get_party("Bob").cloned().expect("Bob exists");
    if let Err(err) = engine.try_perform_action(
        "Alice",
        "return_item_delegation",
        vec![("loan".to_string(), Value::Artifact(std::sync::Arc::new(loan.clone()))), ("agent".to_string(), Value::Party(std::sync::Arc::new(bob)))],
    ) {
        error!("{}", trace!(("failed to delegate the return burden to Bob"), err));
        return;
    }

    info!("Bob returns the item on Alice's behalf");
    engine.perform_action("Bob", "returnItem", vec![("loan".to_string(), Value::Artifact(std::sync::Arc::new(loan)))]);

    if let Some(fine) = engine.artifacts_of_template("Fine").next().cloned() {
        info!("Alice pays her outstanding fine");
        engine.perform_action("Alice", "payFine", vec![("fine".to_string(), Value::Artifact(std::sync::Arc::new(fine)))]);
    }
}


/***** ENTRYPOINT *****/
fn main() {
    let args = Arguments::parse();

    if let Err(err) = HumanLogger::terminal(DebugMode::from_flags(args.trace, args.debug)).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("{} - v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let community = build_library_community();
    let mut engine = Engine::new(community);

    run_scenario(&mut engine);

    println!();
    println!("https://mermaid.live");
    println!("{}", engine.tracer().to_sequence_diagram());
}
