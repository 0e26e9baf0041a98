use super::*;
use std::sync::Arc;

use crate::aggregate::DiagnosticLevel;
use crate::services::{
    CounterService, GreetingService, GuestbookService, PostedMessage, StaticService,
};
use crate::substrate::local::{LocalSubstrate, RemoteService};
use crate::substrate::Substrate;

fn messages() -> Vec<PostedMessage> {
    vec![
        PostedMessage {
            premium: false,
            sender: "alice.test".to_string(),
            text: "first".to_string(),
        },
        PostedMessage {
            premium: true,
            sender: "bob.test".to_string(),
            text: "second".to_string(),
        },
        PostedMessage {
            premium: false,
            sender: "carol.test".to_string(),
            text: "third".to_string(),
        },
    ]
}

struct Fixture {
    substrate: Arc<LocalSubstrate>,
    orchestrator: Orchestrator,
    flows: Flows,
}

impl Fixture {
    fn new() -> Self {
        let config = OrchestratorConfig::default();
        let substrate = Arc::new(LocalSubstrate::new());
        let orchestrator = Flows::register(Orchestrator::builder(
            config.clone(),
            Arc::clone(&substrate) as Arc<dyn Substrate>,
        ))
        .build();
        Self {
            substrate,
            orchestrator,
            flows: Flows::new(ServiceAccounts::default(), &config),
        }
    }

    async fn with(self, id: &ServiceId, service: Arc<dyn RemoteService>) -> Self {
        self.substrate.register(id.clone(), service).await;
        self
    }

    async fn with_all_services(self) -> Self {
        let accounts = self.flows.accounts().clone();
        self.with(&accounts.hello, Arc::new(GreetingService::default()))
            .await
            .with(&accounts.counter, Arc::new(CounterService::new(7)))
            .await
            .with(&accounts.guestbook, Arc::new(GuestbookService::new(messages())))
            .await
    }
}

#[tokio::test]
async fn test_batch_actions_returns_last_result() {
    let fixture = Fixture::new().with_all_services().await;

    let handle = fixture
        .flows
        .run_batch_actions(&fixture.orchestrator)
        .await
        .unwrap();

    assert_eq!(handle.result::<String>().unwrap(), "bye");
    assert_eq!(handle.slot_count(), 1);
    assert_eq!(handle.diagnostics().messages(), vec!["The last result is bye"]);

    let issued = fixture.substrate.issued().await;
    let methods: Vec<_> = issued.iter().map(|c| c.method.as_str()).collect();
    assert_eq!(
        methods,
        vec!["set_greeting", "get_greeting", "set_greeting", "get_greeting"]
    );
    assert!(issued.iter().all(|c| c.batch == issued[0].batch && c.batch.is_some()));
}

#[tokio::test]
async fn test_batch_actions_failure_returns_empty() {
    let fixture = Fixture::new();

    let handle = fixture
        .flows
        .run_batch_actions(&fixture.orchestrator)
        .await
        .unwrap();

    assert_eq!(handle.result::<String>().unwrap(), "");
    let failures: Vec<_> = handle.diagnostics().failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0]
        .message
        .starts_with("The batch call failed and all calls got reverted"));
}

#[tokio::test]
async fn test_multiple_contracts_collects_each_type() {
    let fixture = Fixture::new().with_all_services().await;

    let handle = fixture
        .flows
        .run_multiple_contracts(&fixture.orchestrator)
        .await
        .unwrap();

    let (greeting, counter, page) = handle
        .result::<(String, i64, Vec<PostedMessage>)>()
        .unwrap();
    assert_eq!(greeting, "Hello");
    assert_eq!(counter, 7);
    assert_eq!(page, messages()[..2].to_vec());
    assert_eq!(handle.slot_count(), 3);

    let log = handle.diagnostics().messages();
    assert_eq!(log[0], "HelloNear says Hello");
    assert_eq!(log[1], "Counter is 7");
    assert!(log[2].starts_with("The messages are ["));
}

#[tokio::test]
async fn test_multiple_contracts_defaults_failed_call() {
    let fixture = Fixture::new().with_all_services().await;
    let counter = fixture.flows.accounts().counter.clone();
    let fixture = fixture
        .with(&counter, Arc::new(StaticService::failing("counter is down")))
        .await;

    let handle = fixture
        .flows
        .run_multiple_contracts(&fixture.orchestrator)
        .await
        .unwrap();

    let (greeting, counter, page) = handle
        .result::<(String, i64, Vec<PostedMessage>)>()
        .unwrap();
    assert_eq!(greeting, "Hello");
    assert_eq!(counter, 0);
    assert_eq!(page.len(), 2);

    let failures: Vec<_> = handle.diagnostics().failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].slot, Some(1));
    assert!(failures[0].message.starts_with("The call to Counter failed"));
}

#[tokio::test]
async fn test_similar_contracts_keeps_slot_order() {
    let fixture = Fixture::new().with_all_services().await;

    let handle = fixture
        .flows
        .run_similar_contracts(&fixture.orchestrator)
        .await
        .unwrap();

    assert_eq!(
        handle.result::<Vec<String>>().unwrap(),
        vec!["hi", "howdy", "bye"]
    );
    assert_eq!(handle.slot_count(), 3);
    assert_eq!(fixture.substrate.issued().await.len(), 6);
    assert!(handle
        .diagnostics()
        .entries()
        .iter()
        .all(|d| d.level == DiagnosticLevel::Info));
}

#[tokio::test]
async fn test_similar_contracts_all_failed() {
    let fixture = Fixture::new();

    let handle = fixture
        .flows
        .run_similar_contracts(&fixture.orchestrator)
        .await
        .unwrap();

    assert!(handle.result::<Vec<String>>().unwrap().is_empty());
    assert_eq!(
        handle.diagnostics().messages(),
        vec![
            "Promise number 0 failed.",
            "Promise number 1 failed.",
            "Promise number 2 failed.",
        ]
    );
}

#[tokio::test]
async fn test_similar_contracts_undecodable_result() {
    let fixture = Fixture::new();
    let hello = fixture.flows.accounts().hello.clone();
    let fixture = fixture
        .with(&hello, Arc::new(StaticService::raw(b"not json".to_vec())))
        .await;

    let handle = fixture
        .flows
        .run_similar_contracts(&fixture.orchestrator)
        .await
        .unwrap();

    assert!(handle.result::<Vec<String>>().unwrap().is_empty());
    assert_eq!(
        handle.diagnostics().messages()[0],
        "Error deserializing call 0 result."
    );
}

#[test]
fn test_plans_fit_default_budget() {
    let config = OrchestratorConfig::default();
    let flows = Flows::new(ServiceAccounts::default(), &config);

    for plan in [
        flows.batch_actions().unwrap(),
        flows.multiple_contracts().unwrap(),
        flows.similar_contracts().unwrap(),
    ] {
        assert!(plan.has_callback());
        assert!(plan.total_fee() <= config.attached_budget);
    }
}

#[test]
fn test_plan_shapes() {
    let flows = Flows::new(ServiceAccounts::default(), &OrchestratorConfig::default());

    assert_eq!(flows.batch_actions().unwrap().slot_count(), 1);
    assert_eq!(flows.multiple_contracts().unwrap().slot_count(), 3);
    assert_eq!(flows.similar_contracts().unwrap().slot_count(), 3);
    assert_eq!(flows.similar_contracts().unwrap().call_count(), 7);
}
