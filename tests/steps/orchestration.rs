//! Orchestration step definitions.

use std::fmt;
use std::sync::Arc;

use crosscall::aggregate::{
    CollectSuccessful, DiagnosticLog, OutcomeTable, Passthrough, ResultAggregator,
};
use crosscall::config::{OrchestratorConfig, ServiceAccounts};
use crosscall::descriptor::{Gas, RemoteCallDescriptor};
use crosscall::engine::{Orchestrator, PlanHandle};
use crosscall::error::OrchestrationError;
use crosscall::flows::Flows;
use crosscall::plan::{join, sequence, single, then as with_callback, CallPlanNode};
use crosscall::services::{CounterService, GreetingService, GuestbookService, StaticService};
use crosscall::substrate::local::LocalSubstrate;
use cucumber::{given, then, when, World};
use serde_json::Value;

const CALLBACK: &str = "collect";

/// A string slot followed by a number slot.
struct StringAndNumber;

impl ResultAggregator for StringAndNumber {
    type Output = (String, i64);

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> (String, i64) {
        (
            outcomes.decode_or_default(0, log),
            outcomes.decode_or_default(1, log),
        )
    }
}

/// Test context for orchestration scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct OrchestrationWorld {
    config: OrchestratorConfig,
    substrate: Arc<LocalSubstrate>,
    budget: Option<Gas>,
    outcome: Option<Result<PlanHandle, OrchestrationError>>,
}

impl fmt::Debug for OrchestrationWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestrationWorld")
            .field("config", &self.config)
            .field("budget", &self.budget)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl OrchestrationWorld {
    fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            substrate: Arc::new(LocalSubstrate::new()),
            budget: None,
            outcome: None,
        }
    }

    fn call(&self, target: &str) -> RemoteCallDescriptor {
        RemoteCallDescriptor::no_args(target, "get", self.config.call_fee)
    }

    async fn submit<A: ResultAggregator>(&mut self, body: CallPlanNode, aggregator: A) {
        let orchestrator = Orchestrator::builder(self.config.clone(), self.substrate.clone())
            .callback(CALLBACK, aggregator)
            .build();
        let plan = with_callback(body, orchestrator.callback(CALLBACK)).unwrap();
        self.outcome = Some(self.run(&orchestrator, plan).await);
    }

    async fn run(
        &self,
        orchestrator: &Orchestrator,
        plan: CallPlanNode,
    ) -> Result<PlanHandle, OrchestrationError> {
        match self.budget {
            Some(budget) => orchestrator.submit_with_budget(plan, budget).await,
            None => orchestrator.submit(plan).await,
        }
    }

    fn flows(&self) -> (Orchestrator, Flows) {
        let orchestrator = Flows::register(Orchestrator::builder(
            self.config.clone(),
            self.substrate.clone(),
        ))
        .build();
        (
            orchestrator,
            Flows::new(ServiceAccounts::default(), &self.config),
        )
    }

    fn handle(&self) -> &PlanHandle {
        match self.outcome.as_ref().expect("nothing was submitted") {
            Ok(handle) => handle,
            Err(e) => panic!("submission failed: {e}"),
        }
    }

    fn error(&self) -> &OrchestrationError {
        match self.outcome.as_ref().expect("nothing was submitted") {
            Ok(handle) => panic!("submission succeeded: {:?}", handle.output()),
            Err(e) => e,
        }
    }
}

// --- Given steps ---

#[given(regex = r#"^a service "([^"]+)" that returns (.+)$"#)]
async fn given_service_returns(world: &mut OrchestrationWorld, target: String, value: String) {
    let value: Value = serde_json::from_str(&value).expect("return value must be JSON");
    world
        .substrate
        .register(target, Arc::new(StaticService::json(&value)))
        .await;
}

#[given(expr = "a service {string} that fails with {string}")]
async fn given_service_fails(world: &mut OrchestrationWorld, target: String, reason: String) {
    world
        .substrate
        .register(target, Arc::new(StaticService::failing(reason)))
        .await;
}

#[given(expr = "a budget of {int} TGas")]
async fn given_budget(world: &mut OrchestrationWorld, tgas: u64) {
    world.budget = Some(Gas::from_tgas(tgas));
}

#[given("the simulated services are registered")]
async fn given_simulated_services(world: &mut OrchestrationWorld) {
    let accounts = ServiceAccounts::default();
    world
        .substrate
        .register(accounts.hello, Arc::new(GreetingService::default()))
        .await;
    world
        .substrate
        .register(accounts.counter, Arc::new(CounterService::default()))
        .await;
    world
        .substrate
        .register(accounts.guestbook, Arc::new(GuestbookService::default()))
        .await;
}

// --- When steps ---

#[when(expr = "I submit a call to {string} collected as a string")]
async fn when_submit_single(world: &mut OrchestrationWorld, target: String) {
    let body = single(world.call(&target));
    world.submit(body, Passthrough::<String>::new()).await;
}

#[when(expr = "I submit a call to {string} without a callback")]
async fn when_submit_without_callback(world: &mut OrchestrationWorld, target: String) {
    let orchestrator = Orchestrator::builder(world.config.clone(), world.substrate.clone())
        .callback(CALLBACK, Passthrough::<String>::new())
        .build();
    let plan = single(world.call(&target));
    world.outcome = Some(world.run(&orchestrator, plan).await);
}

#[when(expr = "I join calls to {string} and {string} collected as a string and a number")]
async fn when_join_two(world: &mut OrchestrationWorld, a: String, b: String) {
    let body = join(single(world.call(&a)), single(world.call(&b))).unwrap();
    world.submit(body, StringAndNumber).await;
}

#[when(expr = "I join calls to {string}, {string} and {string} collected as strings")]
async fn when_join_three(world: &mut OrchestrationWorld, a: String, b: String, c: String) {
    let body = join(
        join(single(world.call(&a)), single(world.call(&b))).unwrap(),
        single(world.call(&c)),
    )
    .unwrap();
    world.submit(body, CollectSuccessful::<String>::new()).await;
}

#[when(expr = "I chain calls to {string} then {string} collected as a string")]
async fn when_chain_two(world: &mut OrchestrationWorld, a: String, b: String) {
    let body = sequence(single(world.call(&a)), world.call(&b)).unwrap();
    world.submit(body, Passthrough::<String>::new()).await;
}

#[when(expr = "I chain calls to {string}, {string} and {string} collected as a string")]
async fn when_chain_three(world: &mut OrchestrationWorld, a: String, b: String, c: String) {
    let body = sequence(
        sequence(single(world.call(&a)), world.call(&b)).unwrap(),
        world.call(&c),
    )
    .unwrap();
    world.submit(body, Passthrough::<String>::new()).await;
}

#[when("I run the batch actions flow")]
async fn when_run_batch_actions(world: &mut OrchestrationWorld) {
    let (orchestrator, flows) = world.flows();
    world.outcome = Some(flows.run_batch_actions(&orchestrator).await);
}

#[when("I run the multiple contracts flow")]
async fn when_run_multiple_contracts(world: &mut OrchestrationWorld) {
    let (orchestrator, flows) = world.flows();
    world.outcome = Some(flows.run_multiple_contracts(&orchestrator).await);
}

#[when("I run the similar contracts flow")]
async fn when_run_similar_contracts(world: &mut OrchestrationWorld) {
    let (orchestrator, flows) = world.flows();
    world.outcome = Some(flows.run_similar_contracts(&orchestrator).await);
}

// --- Then steps ---

#[then(regex = r"^the result is (.+)$")]
async fn then_result_is(world: &mut OrchestrationWorld, expected: String) {
    let expected: Value = serde_json::from_str(&expected).expect("expected result must be JSON");
    let actual: Value = world.handle().result().expect("result should decode");
    assert_eq!(actual, expected);
}

#[then("no failure diagnostics are recorded")]
async fn then_no_failures(world: &mut OrchestrationWorld) {
    assert_eq!(world.handle().diagnostics().failures().count(), 0);
}

#[then(regex = r"^(\d+) failure diagnostics? (?:is|are) recorded$")]
async fn then_failure_count(world: &mut OrchestrationWorld, count: usize) {
    assert_eq!(world.handle().diagnostics().failures().count(), count);
}

#[then(expr = "the diagnostics include {string}")]
async fn then_diagnostics_include(world: &mut OrchestrationWorld, message: String) {
    let messages = world.handle().diagnostics().messages();
    assert!(
        messages.contains(&message.as_str()),
        "missing {message:?} in {messages:?}"
    );
}

#[then(regex = r"^(\d+) calls? (?:was|were) issued$")]
async fn then_calls_issued(world: &mut OrchestrationWorld, count: usize) {
    assert_eq!(world.substrate.issued().await.len(), count);
}

#[then(expr = "only {string} was called")]
async fn then_only_called(world: &mut OrchestrationWorld, target: String) {
    let targets: Vec<String> = world
        .substrate
        .issued()
        .await
        .into_iter()
        .map(|c| c.target.to_string())
        .collect();
    assert_eq!(targets, vec![target]);
}

#[then("submission fails with a budget error")]
async fn then_budget_error(world: &mut OrchestrationWorld) {
    assert!(world.error().is_budget_exceeded());
}

#[then("submission fails with a malformed plan error")]
async fn then_malformed_error(world: &mut OrchestrationWorld) {
    assert!(world.error().is_malformed_plan());
}
