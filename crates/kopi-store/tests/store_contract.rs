// SPDX-License-Identifier: Apache-2.0

use kopi_model::{
    CoffeeDraft, CoffeeId, OrderStatus, Price, RegistrationDraft, Selection, UserId,
};
use kopi_store::{Store, StoreError};

fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

fn seed_user(store: &Store, name: &str) -> UserId {
    store
        .register(&RegistrationDraft {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "strong enough".to_string(),
        })
        .expect("register user")
        .id
}

fn seed_coffee(store: &Store, name: &str, price: &str) -> CoffeeId {
    store
        .create_coffee(&CoffeeDraft {
            name: name.to_string(),
            price: Price::parse(price).unwrap(),
            description: format!("{name} description"),
            image: format!("coffee_images/{name}.jpg"),
        })
        .expect("create coffee")
        .id
}

#[test]
fn placing_an_order_totals_items_and_skips_zero_quantities() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");
    let latte = seed_coffee(&store, "latte", "3.95");

    let view = store
        .place_order(
            user,
            &[
                Selection {
                    coffee_id: espresso,
                    quantity: 2,
                },
                Selection {
                    coffee_id: latte,
                    quantity: 0,
                },
            ],
        )
        .expect("place order");

    assert_eq!(view.lines.len(), 1, "zero-quantity selections are dropped");
    assert_eq!(view.lines[0].item.coffee_id, espresso);
    assert_eq!(view.lines[0].item.quantity, 2);
    assert_eq!(view.order.total, Price::parse("4.20").unwrap());
    assert_eq!(view.order.status, OrderStatus::Pending);
    view.validate().expect("total invariant");

    // the persisted row agrees with the returned aggregate
    let reread = store.get_order(view.order.id).expect("reread order");
    assert_eq!(reread.order.total, view.order.total);
    reread.validate().expect("total invariant after reread");
}

#[test]
fn an_all_zero_cart_is_rejected() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");

    let err = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 0,
            }],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.orders_for_user(user).unwrap().is_empty());
}

#[test]
fn placement_is_atomic_when_a_coffee_id_is_unknown() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");

    let err = store
        .place_order(
            user,
            &[
                Selection {
                    coffee_id: espresso,
                    quantity: 2,
                },
                Selection {
                    coffee_id: CoffeeId::from_raw(9999),
                    quantity: 1,
                },
            ],
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    // nothing from the failed submission persists
    assert!(store.orders_for_user(user).unwrap().is_empty());
    assert!(store.latest_order_for_user(user).unwrap().is_none());
}

#[test]
fn unit_price_snapshot_survives_catalog_repricing() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");

    let view = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 1,
            }],
        )
        .expect("place order");

    let repriced = CoffeeDraft {
        name: "espresso".to_string(),
        price: Price::parse("9.99").unwrap(),
        description: "espresso description".to_string(),
        image: "coffee_images/espresso.jpg".to_string(),
    };
    store.update_coffee(espresso, &repriced).expect("reprice");

    let reread = store.get_order(view.order.id).expect("reread");
    assert_eq!(
        reread.lines[0].item.unit_price,
        Price::parse("2.10").unwrap()
    );
    assert_eq!(reread.order.total, Price::parse("2.10").unwrap());

    // a new order sees the new price
    let fresh = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 1,
            }],
        )
        .expect("second order");
    assert_eq!(fresh.order.total, Price::parse("9.99").unwrap());
}

#[test]
fn record_item_recomputes_the_parent_total() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");
    let latte = seed_coffee(&store, "latte", "3.95");

    let view = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 1,
            }],
        )
        .expect("place order");

    store
        .record_item(view.order.id, latte, 2)
        .expect("record item");

    let reread = store.get_order(view.order.id).expect("reread");
    assert_eq!(reread.order.total, Price::parse("10.00").unwrap());
    reread.validate().expect("total invariant");

    let err = store.record_item(view.order.id, latte, 0).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn referenced_coffee_cannot_be_deleted_but_order_delete_cascades() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");

    let view = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 1,
            }],
        )
        .expect("place order");

    let err = store.delete_coffee(espresso).unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)));

    store.delete_order(view.order.id).expect("delete order");
    assert!(store.items_for_order(view.order.id).unwrap().is_empty());

    // with no items left the coffee can go
    store.delete_coffee(espresso).expect("delete coffee");
}

#[test]
fn status_transitions_follow_the_lifecycle_table() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let espresso = seed_coffee(&store, "espresso", "2.10");
    let view = store
        .place_order(
            user,
            &[Selection {
                coffee_id: espresso,
                quantity: 1,
            }],
        )
        .expect("place order");
    let id = view.order.id;

    // pending cannot jump straight to completed
    let err = store.set_status(id, OrderStatus::Completed).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let order = store.set_status(id, OrderStatus::Processing).expect("to processing");
    assert_eq!(order.status, OrderStatus::Processing);
    let order = store.set_status(id, OrderStatus::Completed).expect("to completed");
    assert_eq!(order.status, OrderStatus::Completed);

    // terminal states are frozen
    let err = store.set_status(id, OrderStatus::Cancelled).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn orders_for_user_lists_newest_first_with_lines() {
    let mut store = store();
    let user = seed_user(&store, "mia");
    let other = seed_user(&store, "sam");
    let espresso = seed_coffee(&store, "espresso", "2.10");

    let first = store
        .place_order(user, &[Selection { coffee_id: espresso, quantity: 1 }])
        .expect("first");
    let second = store
        .place_order(user, &[Selection { coffee_id: espresso, quantity: 3 }])
        .expect("second");
    store
        .place_order(other, &[Selection { coffee_id: espresso, quantity: 5 }])
        .expect("other user's order");

    let mine = store.orders_for_user(user).expect("list");
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].order.id, second.order.id);
    assert_eq!(mine[1].order.id, first.order.id);
    assert_eq!(mine[0].lines[0].coffee_name, "espresso");

    let latest = store
        .latest_order_for_user(user)
        .expect("latest")
        .expect("exists");
    assert_eq!(latest.order.id, second.order.id);
}
