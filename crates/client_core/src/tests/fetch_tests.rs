use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::oneshot;

use super::*;

type Reply = Result<Vec<u32>, ApiError>;

/// Fetcher whose calls stay pending until the test resolves them.
#[derive(Clone, Default)]
struct Gate {
    calls: Arc<Mutex<Vec<Option<oneshot::Sender<Reply>>>>>,
}

impl Gate {
    fn fetcher(&self) -> Fetcher<Vec<u32>> {
        let calls = self.calls.clone();
        fetcher(move || {
            let (tx, rx) = oneshot::channel();
            calls.lock().unwrap().push(Some(tx));
            async move {
                rx.await
                    .unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".to_string())))
            }
        })
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn take(&self, call: usize) -> oneshot::Sender<Reply> {
        self.calls.lock().unwrap()[call]
            .take()
            .expect("call already resolved")
    }

    fn resolve(&self, call: usize, reply: Reply) {
        let _ = self.take(call).send(reply);
    }
}

fn rejected(message: &str) -> ApiError {
    ApiError::Rejected {
        status: 500,
        message: message.to_string(),
    }
}

async fn drain(binding: &mut FetchBinding<&'static str, Vec<u32>>) {
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        binding.poll();
    }
}

#[tokio::test]
async fn success_sets_data_and_clears_loading() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());

    assert!(binding.bind("all", gate.fetcher()));
    assert!(binding.loading());
    assert!(binding.error().is_none());

    gate.resolve(0, Ok(vec![1, 2, 3]));
    binding.settled().await;

    assert_eq!(binding.data(), Some(&vec![1, 2, 3]));
    assert!(!binding.loading());
    assert!(binding.error().is_none());
}

#[tokio::test]
async fn empty_result_is_data_not_error() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("all", gate.fetcher());

    gate.resolve(0, Ok(Vec::new()));
    binding.settled().await;

    assert_eq!(binding.data(), Some(&Vec::new()));
    assert_eq!(
        binding.state().list_view(|n| *n, "Error: ", "Nada"),
        ListView::Empty("Nada".to_string())
    );
}

#[tokio::test]
async fn failure_keeps_previous_data() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("all", gate.fetcher());
    gate.resolve(0, Ok(vec![4, 5]));
    binding.settled().await;

    binding.refetch();
    assert!(binding.loading());
    gate.resolve(1, Err(rejected("boom")));
    binding.settled().await;

    assert!(!binding.loading());
    assert_eq!(binding.error().map(ToString::to_string).as_deref(), Some("boom"));
    assert_eq!(binding.data(), Some(&vec![4, 5]));
    assert_eq!(
        binding.state().list_view(|n| *n, "Error al cargar: ", "Nada"),
        ListView::Failed("Error al cargar: boom".to_string())
    );
}

#[tokio::test]
async fn refetch_clears_a_previous_error() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("all", gate.fetcher());
    gate.resolve(0, Err(rejected("down")));
    binding.settled().await;
    assert!(binding.error().is_some());

    binding.refetch();
    assert!(binding.error().is_none());
    gate.resolve(1, Ok(vec![9]));
    binding.settled().await;
    assert_eq!(binding.data(), Some(&vec![9]));
}

#[tokio::test]
async fn equal_identity_does_not_refetch() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());

    assert!(binding.bind("a", gate.fetcher()));
    assert!(!binding.bind("a", gate.fetcher()));
    assert_eq!(gate.calls(), 1);

    assert!(binding.bind("b", gate.fetcher()));
    assert_eq!(gate.calls(), 2);
    assert_eq!(binding.key(), Some(&"b"));
}

#[tokio::test]
async fn refetch_runs_again_under_the_same_identity() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("a", gate.fetcher());
    binding.refetch();
    assert_eq!(gate.calls(), 2);
}

#[tokio::test]
async fn refetch_before_bind_is_a_no_op() {
    let mut binding: FetchBinding<&'static str, Vec<u32>> =
        FetchBinding::new("test", Handle::current());
    binding.refetch();
    assert!(!binding.loading());
    assert_eq!(binding.generation(), 0);
}

#[tokio::test]
async fn superseded_result_arriving_late_is_discarded() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("a", gate.fetcher());
    gate.resolve(0, Ok(vec![0]));
    binding.settled().await;

    binding.refetch();
    binding.refetch();
    assert_eq!(gate.calls(), 3);

    // Newest first, then the older one.
    gate.resolve(2, Ok(vec![2]));
    binding.settled().await;
    assert_eq!(binding.data(), Some(&vec![2]));

    gate.resolve(1, Ok(vec![1]));
    drain(&mut binding).await;
    assert_eq!(binding.data(), Some(&vec![2]));
    assert!(!binding.loading());
}

#[tokio::test]
async fn superseded_result_arriving_early_does_not_settle_loading() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("a", gate.fetcher());
    binding.bind("b", gate.fetcher());

    gate.resolve(0, Ok(vec![10]));
    drain(&mut binding).await;
    assert!(binding.loading());
    assert_eq!(binding.data(), None);

    gate.resolve(1, Err(rejected("late failure")));
    binding.settled().await;
    assert_eq!(binding.data(), None);
    assert_eq!(
        binding.error().and_then(ApiError::server_message),
        Some("late failure")
    );
}

#[tokio::test]
async fn teardown_aborts_in_flight_fetches() {
    let gate = Gate::default();
    let mut binding = FetchBinding::new("test", Handle::current());
    binding.bind("a", gate.fetcher());
    tokio::task::yield_now().await;

    let mut pending = gate.take(0);
    drop(binding);

    tokio::time::timeout(Duration::from_secs(1), pending.closed())
        .await
        .expect("fetch task should be aborted on drop");
}

#[test]
fn list_view_prefers_loading_then_error() {
    let state = RemoteCollectionState {
        data: Some(vec![1_u32]),
        loading: true,
        error: Some(rejected("x")),
    };
    assert_eq!(state.list_view(|n| *n, "", ""), ListView::Loading);

    let state = RemoteCollectionState {
        loading: false,
        ..state
    };
    assert_eq!(state.list_view(|n| *n, "E: ", ""), ListView::Failed("E: x".to_string()));

    let state = RemoteCollectionState {
        data: Some(vec![1_u32, 2]),
        loading: false,
        error: None,
    };
    assert_eq!(state.list_view(|n| n * 10, "", ""), ListView::Rows(vec![10, 20]));

    let state: RemoteCollectionState<Vec<u32>> = RemoteCollectionState::default();
    assert_eq!(
        state.list_view(|n| *n, "", "vacío"),
        ListView::Empty("vacío".to_string())
    );
}

#[tokio::test]
async fn mutations_report_each_outcome_once() {
    let mut mutations: Mutations<&'static str> = Mutations::new(Handle::current());
    assert!(mutations.next().await.is_none());

    mutations.spawn("ok", async { Ok(()) });
    mutations.spawn("fail", async { Err(rejected("no")) });
    assert_eq!(mutations.pending(), 2);

    let mut outcomes = vec![
        mutations.next().await.expect("first"),
        mutations.next().await.expect("second"),
    ];
    outcomes.sort_by_key(|(kind, _)| *kind);

    assert_eq!(outcomes[0], ("fail", Err(rejected("no"))));
    assert_eq!(outcomes[1], ("ok", Ok(())));
    assert_eq!(mutations.pending(), 0);
    assert!(mutations.next().await.is_none());
}

#[tokio::test]
async fn dropped_queue_lets_sent_mutations_finish() {
    let reached_server = Arc::new(Mutex::new(false));
    let mut mutations: Mutations<&'static str> = Mutations::new(Handle::current());

    let flag = reached_server.clone();
    mutations.spawn("delete", async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        *flag.lock().unwrap() = true;
        Ok(())
    });
    drop(mutations);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(*reached_server.lock().unwrap());
}

#[tokio::test]
async fn panicking_fetch_settles_with_an_error() {
    let mut binding: FetchBinding<&'static str, Vec<u32>> =
        FetchBinding::new("test", Handle::current());
    binding.bind(
        "all",
        fetcher(|| async {
            if true {
                panic!("decoder exploded");
            }
            Ok(vec![])
        }),
    );

    binding.settled().await;

    assert!(!binding.loading());
    assert_eq!(
        binding.error(),
        Some(&ApiError::Interrupted("decoder exploded".to_string()))
    );
}

#[tokio::test]
async fn panicking_mutation_is_still_reported() {
    let mut mutations: Mutations<&'static str> = Mutations::new(Handle::current());
    mutations.spawn("cancel", async {
        if true {
            panic!("boom");
        }
        Ok(())
    });

    let (kind, result) = mutations.next().await.expect("outcome");
    assert_eq!(kind, "cancel");
    assert_eq!(result, Err(ApiError::Interrupted("boom".to_string())));
    assert_eq!(mutations.pending(), 0);
}
