use crate::inventory::{Canned, Inventory, InventoryProxy, Warehouse};
use dynamock::context::flow;
use dynamock::{IsolatedMockContext, MockContext, MockState};
use dynamock_testkit::{assert_slot_restored, MockActivation, RouteAssertions};
use std::sync::Arc;

fn isolated() -> (Arc<IsolatedMockContext<dyn Inventory>>, Arc<Warehouse>) {
    (
        Arc::new(IsolatedMockContext::new()),
        Arc::new(Warehouse::new(&[("widget", 5)])),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flows_see_only_their_own_mock() {
    let (context, real) = isolated();

    let handles: Vec<_> = (0..32u32)
        .map(|i| {
            let context = Arc::clone(&context);
            let real = Arc::clone(&real);
            flow::spawn(async move {
                let inventory = InventoryProxy::new(context.clone(), real);
                let expected = if i % 2 == 0 {
                    context.set_mock(Arc::new(Canned::new(i)));
                    i
                } else {
                    5
                };
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                    assert_eq!(inventory.stock("widget"), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    assert!(context.current().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_members_keep_their_flow_across_await() {
    let (context, real) = isolated();

    let handles: Vec<_> = (1..=8u64)
        .map(|price| {
            let context = Arc::clone(&context);
            let real = Arc::clone(&real);
            flow::spawn(async move {
                let inventory = InventoryProxy::new(context.clone(), real);
                let _scope = MockActivation::new(
                    Arc::new(Canned::new(0).priced(price)) as Arc<dyn Inventory>
                )
                .method("price")
                .activate_scoped(&context)
                .unwrap();

                tokio::task::yield_now().await;
                let quoted = inventory.price("widget").await;
                tokio::task::yield_now().await;
                (quoted, inventory.stock("widget"))
            })
        })
        .collect();

    for (price, handle) in (1..=8u64).zip(handles) {
        assert_eq!(handle.await.unwrap(), (price, 5));
    }
}

#[tokio::test]
async fn test_child_flow_inherits_but_does_not_leak_back() {
    let (context, real) = isolated();
    let inventory = Arc::new(InventoryProxy::new(context.clone(), real));

    flow::scope(async {
        context.set_mock(Arc::new(Canned::new(1)));

        let child_context = Arc::clone(&context);
        let child_inventory = Arc::clone(&inventory);
        let seen_in_child = flow::spawn(async move {
            let inherited = child_inventory.stock("widget");
            child_context.set_mock(Arc::new(Canned::new(2)));
            (inherited, child_inventory.stock("widget"))
        })
        .await
        .unwrap();

        assert_eq!(seen_in_child, (1, 2));
        assert_eq!(inventory.stock("widget"), 1);
    })
    .await;

    assert_eq!(inventory.stock("widget"), 5);
}

#[test]
fn test_spawned_thread_inherits_flow_values() {
    let (context, real) = isolated();
    let inventory = Arc::new(InventoryProxy::new(context.clone(), real));

    flow::isolate(|| {
        context.set_mock(Arc::new(Canned::new(7)));
        let worker = {
            let inventory = Arc::clone(&inventory);
            let context = Arc::clone(&context);
            flow::spawn_thread(move || {
                let inherited = inventory.stock("widget");
                context.remove_mock();
                (inherited, inventory.stock("widget"))
            })
        };
        assert_eq!(worker.join().unwrap(), (7, 5));
        assert_eq!(inventory.stock("widget"), 7);
    });

    assert_eq!(context.state(), MockState::NoMockActive);
}

#[test]
fn test_nested_scopes_unwind_in_order() {
    let (context, real) = isolated();
    let inventory = InventoryProxy::new(context.clone(), real);
    let routes = RouteAssertions::new(&inventory.interceptor);

    assert_slot_restored(context.as_ref(), || {
        let _outer = context.set_scoped_mock(Arc::new(Canned::new(1)));
        routes.assert_state(MockState::MockActiveUnconfigured);
        {
            let _inner = MockActivation::new(Arc::new(Canned::new(2)) as Arc<dyn Inventory>)
                .method("stock")
                .activate_scoped(&context)
                .unwrap();
            routes.assert_state(MockState::MockActiveConfigured);
            assert_eq!(inventory.stock("widget"), 2);
        }
        assert_eq!(inventory.stock("widget"), 1);
    });

    routes.assert_no_mock();
    assert_eq!(inventory.stock("widget"), 5);
}

#[test]
fn test_scope_is_restored_when_the_body_panics() {
    let (context, real) = isolated();
    let inventory = InventoryProxy::new(context.clone(), real);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _scope = context.set_scoped_mock(Arc::new(Canned::new(3)));
        assert_eq!(inventory.stock("widget"), 3);
        panic!("test body failed");
    }));

    assert!(outcome.is_err());
    assert_eq!(inventory.stock("widget"), 5);
}

#[test]
fn test_rejected_scoped_activation_changes_nothing() {
    let (context, _real) = isolated();

    let result = MockActivation::new(Arc::new(Canned::new(3)) as Arc<dyn Inventory>)
        .method("restock")
        .activate_scoped(&context);

    let error = result.err().unwrap();
    assert!(error.to_string().contains("restock"));
    assert!(context.current().is_none());
}
