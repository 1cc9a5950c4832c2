use std::sync::Arc;

use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AddTodo, Aggregate, CreateTodoList, DomainEvent, TodoList, TodoListEvent, TodoListService,
    TodoText, UserId,
};
use event_bus::InMemoryEventBus;
use event_store::{EventEnvelope, EventStore, InMemoryEventStore, Version};

fn user() -> UserId {
    UserId::new("bench-user").unwrap()
}

fn service() -> TodoListService<InMemoryEventStore> {
    TodoListService::new(InMemoryEventStore::new(), Arc::new(InMemoryEventBus::new()))
}

fn bench_create_list(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_list", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = service();
                service
                    .create_list(CreateTodoList::new(user()))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_command_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_then_fill_list", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = service();
                let created = service
                    .create_list(CreateTodoList::new(user()))
                    .await
                    .unwrap();
                let id = created.aggregate.id().unwrap();

                for text in ["Buy milk", "Walk dog", "Pay rent"] {
                    service
                        .add_todo(AddTodo::new(id, user(), TodoText::new(text).unwrap()))
                        .await
                        .unwrap();
                }
            });
        });
    });
}

fn bench_hydrate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::new();
    let agg_id = AggregateId::new();

    // A list never holds more than three items, so the history is short.
    rt.block_on(async {
        let mut events: Vec<EventEnvelope> =
            vec![TodoListEvent::todo_list_created(agg_id, user(), Version::first())
                .to_envelope()
                .unwrap()];
        for v in 2..=4 {
            let text = TodoText::new(format!("Item {v}")).unwrap();
            let added = TodoListEvent::todo_added(agg_id, user(), text, Version::new(v));
            events.push(added.to_envelope().unwrap());
        }
        let mut tx = store.begin().await.unwrap();
        store.append(&mut tx, agg_id, &events).await.unwrap();
        store.commit(tx).await.unwrap();
    });

    c.bench_function("domain/hydrate_full_list", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut tx = store.begin().await.unwrap();
                let history = store.load(&mut tx, agg_id).await.unwrap();
                let mut list = TodoList::default();
                list.hydrate(&history).unwrap();
                assert_eq!(list.item_count(), 3);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_list,
    bench_full_command_cycle,
    bench_hydrate,
);
criterion_main!(benches);
