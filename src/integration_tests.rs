#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::api::Method;
    use crate::app::App;
    use crate::clients::DEFAULT_CREW_CAPACITY;
    use crate::domain::{OrderStatus, Role};
    use crate::error::{ApiError, CartError};
    use crate::mock_framework::{
        cart_item_json, cart_json, crew_json, expect_request, mock_transport, order_json,
        RecordedRequest,
    };

    async fn answer_login(
        rx: &mut tokio::sync::mpsc::Receiver<RecordedRequest>,
        username: &str,
        role: &str,
    ) {
        expect_request(rx, Method::Post, "/auth/jwt/create/")
            .await
            .respond(200, json!({ "access": "a1", "refresh": "r1" }));
        expect_request(rx, Method::Get, "/auth/users/me/")
            .await
            .respond(200, json!({ "id": 9, "username": username, "email": "" }));
        expect_request(rx, Method::Get, "/api/user-role/")
            .await
            .respond(200, json!({ "role": role }));
        expect_request(rx, Method::Get, "/api/profile/")
            .await
            .respond(
                200,
                json!({ "username": username, "first_name": "", "last_name": "", "email": "" }),
            );
    }

    #[tokio::test]
    async fn customer_flow_login_fill_cart_place_order() {
        let (transport, mut rx) = mock_transport(16);
        let transport = Arc::new(transport);

        let login_task = tokio::spawn(async move {
            App::login_with_transport(transport, DEFAULT_CREW_CAPACITY, "alice", "hunter2").await
        });
        answer_login(&mut rx, "alice", "Customer").await;
        let app = login_task.await.unwrap().unwrap();
        assert_eq!(app.session.role, Role::Customer);

        // Add an item, reconcile, and check the recomputed total.
        let cart = app.cart.clone();
        let add_task = tokio::spawn(async move { cart.add_item(7, 2).await });
        expect_request(&mut rx, Method::Post, "/api/cart/items/")
            .await
            .respond(201, cart_item_json(1, 7, "Pad Thai", 11.5, 2));
        expect_request(&mut rx, Method::Get, "/api/cart/")
            .await
            .respond(200, cart_json(&[cart_item_json(1, 7, "Pad Thai", 11.5, 2)]));
        let snapshot = add_task.await.unwrap().unwrap();
        assert_eq!(snapshot.computed_total(), 23.0);

        // Checkout clears the cart only after the backend confirms.
        let cart = app.cart.clone();
        let order_task = tokio::spawn(async move { cart.place_order("1 Main St").await });
        let recorded = expect_request(&mut rx, Method::Post, "/api/orders/").await;
        assert_eq!(recorded.request.body.as_ref().unwrap()["delivery_address"], "1 Main St");
        recorded.respond(201, order_json(31, "pending", None, "2025-03-01T18:30:00Z", 23.0));
        let order = order_task.await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(app.cart.cart().await.is_empty());

        app.logout().await;
    }

    #[tokio::test]
    async fn manager_assigns_then_crew_delivers() {
        // Manager side: assign a pending order to a crew member with room.
        let (transport, mut rx) = mock_transport(16);
        let transport = Arc::new(transport);

        let login_task = tokio::spawn(async move {
            App::login_with_transport(transport, DEFAULT_CREW_CAPACITY, "manager", "pw").await
        });
        answer_login(&mut rx, "manager", "Restaurant Owner").await;
        let app = login_task.await.unwrap().unwrap();

        let orders = app.orders.clone();
        let refresh_task = tokio::spawn(async move { orders.refresh().await });
        expect_request(&mut rx, Method::Get, "/api/orders/")
            .await
            .respond(200, json!([order_json(7, "pending", None, "2025-03-01T18:30:00Z", 23.0)]));
        refresh_task.await.unwrap().unwrap();

        let orders = app.orders.clone();
        let assign_task = tokio::spawn(async move { orders.assign_delivery_crew(7, 2).await });
        expect_request(&mut rx, Method::Get, "/api/users/delivery-crew/")
            .await
            .respond(200, json!([crew_json(2, "dana", 1)]));
        expect_request(&mut rx, Method::Patch, "/api/orders/7/assign-delivery/")
            .await
            .respond(200, order_json(7, "out_for_delivery", Some("dana"), "2025-03-01T18:30:00Z", 23.0));
        let assigned = assign_task.await.unwrap().unwrap();
        assert_eq!(assigned.status, OrderStatus::OutForDelivery);

        // Crew side: the queue shows the order and delivering retires it.
        let (transport, mut rx) = mock_transport(16);
        let transport = Arc::new(transport);
        let login_task = tokio::spawn(async move {
            App::login_with_transport(transport, DEFAULT_CREW_CAPACITY, "dana", "pw").await
        });
        answer_login(&mut rx, "dana", "Delivery Crew").await;
        let app = login_task.await.unwrap().unwrap();

        let orders = app.orders.clone();
        let refresh_task = tokio::spawn(async move { orders.refresh().await });
        expect_request(&mut rx, Method::Get, "/api/orders/")
            .await
            .respond(
                200,
                json!([
                    order_json(7, "out_for_delivery", Some("dana"), "2025-03-01T18:30:00Z", 23.0),
                    order_json(5, "out_for_delivery", Some("dana"), "2025-03-01T09:00:00Z", 9.0),
                ]),
            );
        refresh_task.await.unwrap().unwrap();

        let queue = app.orders.crew_queue().await;
        let ids: Vec<u64> = queue.iter().map(|order| order.id).collect();
        assert_eq!(ids, vec![5, 7], "oldest order is delivered first");

        let orders = app.orders.clone();
        let deliver_task = tokio::spawn(async move { orders.mark_delivered(5).await });
        expect_request(&mut rx, Method::Patch, "/api/orders/5/mark-delivered/")
            .await
            .respond(200, order_json(5, "delivered", Some("dana"), "2025-03-01T09:00:00Z", 9.0));
        let delivered = deliver_task.await.unwrap().unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert_eq!(app.orders.crew_queue().await.len(), 1);
    }

    #[tokio::test]
    async fn transport_failures_surface_as_network_errors() {
        let (transport, mut rx) = mock_transport(8);
        let transport = Arc::new(transport);

        let login_task = tokio::spawn(async move {
            App::login_with_transport(transport, DEFAULT_CREW_CAPACITY, "alice", "pw").await
        });
        answer_login(&mut rx, "alice", "Customer").await;
        let app = login_task.await.unwrap().unwrap();

        let cart = app.cart.clone();
        let task = tokio::spawn(async move { cart.refresh().await });
        expect_request(&mut rx, Method::Get, "/api/cart/")
            .await
            .fail(ApiError::Network("connection refused".to_string()));

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, CartError::Api(ApiError::Network(_))));
        // The failure is scoped to the operation; the session survives.
        let cart = app.cart.clone();
        let task = tokio::spawn(async move { cart.refresh().await });
        expect_request(&mut rx, Method::Get, "/api/cart/")
            .await
            .respond(200, cart_json(&[]));
        assert!(task.await.unwrap().is_ok());
    }
}
