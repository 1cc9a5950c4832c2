use std::sync::Arc;

use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Aggregate, DomainEvent, TodoList, TodoListEvent, TodoText, UserId};
use event_store::{EventEnvelope, EventStore, InMemoryEventStore, Version};
use projections::{InMemoryTodoListStore, ProjectionProcessor, TodoListProjector};

/// Populate a store with N full lists (created + three items each).
async fn populate_store(store: &InMemoryEventStore, n: usize) {
    let user = UserId::new("bench-user").unwrap();
    for _ in 0..n {
        let agg_id = AggregateId::new();
        let mut events: Vec<EventEnvelope> =
            vec![TodoListEvent::todo_list_created(agg_id, user.clone(), Version::first())
                .to_envelope()
                .unwrap()];
        for (v, text) in [(2, "Buy milk"), (3, "Walk dog"), (4, "Pay rent")] {
            let added = TodoListEvent::todo_added(
                agg_id,
                user.clone(),
                TodoText::new(text).unwrap(),
                Version::new(v),
            );
            events.push(added.to_envelope().unwrap());
        }
        let mut tx = store.begin().await.unwrap();
        store.append(&mut tx, agg_id, &events).await.unwrap();
        store.commit(tx).await.unwrap();
    }
}

fn bench_catch_up(c: &mut Criterion, lists: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    rt.block_on(populate_store(&store, lists));

    c.bench_function(&format!("projections/catch_up_{lists}_lists"), |b| {
        b.iter(|| {
            rt.block_on(async {
                let projector = Arc::new(TodoListProjector::new(InMemoryTodoListStore::new()));
                let mut processor = ProjectionProcessor::new(store.clone(), TodoList::registry());
                processor.register(projector);
                processor.run_catch_up().await.unwrap();
            });
        });
    });
}

fn bench_catch_up_100_lists(c: &mut Criterion) {
    bench_catch_up(c, 100);
}

fn bench_catch_up_1000_lists(c: &mut Criterion) {
    bench_catch_up(c, 1000);
}

fn bench_duplicate_delivery(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let projector = TodoListProjector::new(InMemoryTodoListStore::new());
    let agg_id = AggregateId::new();
    let created =
        TodoListEvent::todo_list_created(agg_id, UserId::new("bench-user").unwrap(), Version::first());
    rt.block_on(projector.handle(&created)).unwrap();

    c.bench_function("projections/duplicate_delivery", |b| {
        b.iter(|| {
            rt.block_on(projector.handle(&created)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_catch_up_100_lists,
    bench_catch_up_1000_lists,
    bench_duplicate_delivery,
);
criterion_main!(benches);
