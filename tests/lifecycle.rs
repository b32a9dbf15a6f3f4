//! Engine-level tests for booking creation and status transitions.

mod common;

use common::{available_rooms, booking_count, day, request, seed_room, setup_pool, today};
use empyrean_booking::lifecycle::{create_booking, transition_status, BookingError};
use empyrean_booking::models::booking::BookingStatus;

#[actix_web::test]
async fn create_decrements_availability_and_prices_by_nights() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let (booking, room_type) = create_booking(&pool, &request(room), today())
        .await
        .expect("booking created");

    assert_eq!(booking.status, BookingStatus::Pending);
    // 3 nights at 1,500,000 per night.
    assert_eq!(booking.total_price, 4_500_000);
    assert_eq!(booking.nights(), 3);
    assert_eq!(room_type.available_rooms, 9);
    assert_eq!(available_rooms(&pool, room).await, 9);
    assert!(booking.cancelled_at.is_none());
}

#[actix_web::test]
async fn create_collects_every_validation_error() {
    let pool = setup_pool().await;
    seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let mut req = request(0);
    req.full_name = "  ".to_string();
    req.email = String::new();
    req.room_type_id = None;
    req.checkin = String::new();
    req.checkout = String::new();

    let err = create_booking(&pool, &req, today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Full name required.".to_string()));
    assert!(errors.contains(&"Email required.".to_string()));
    assert!(errors.contains(&"Check-in and Check-out required.".to_string()));
    assert!(errors.contains(&"Room type is required.".to_string()));
    assert_eq!(booking_count(&pool).await, 0);
}

#[actix_web::test]
async fn create_rejects_inverted_date_range() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let mut req = request(room);
    req.checkin = "2025-01-10".to_string();
    req.checkout = "2025-01-09".to_string();

    let err = create_booking(&pool, &req, day(2025, 1, 1)).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Check-in must be before check-out.".to_string()));
    assert_eq!(booking_count(&pool).await, 0);
    assert_eq!(available_rooms(&pool, room).await, 10);
}

#[actix_web::test]
async fn create_rejects_past_checkin_and_bad_dates() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let mut req = request(room);
    req.checkin = "2030-12-01".to_string();
    let err = create_booking(&pool, &req, today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Check-in date cannot be in the past.".to_string()));

    let mut req = request(room);
    req.checkin = "10/01/2031".to_string();
    let err = create_booking(&pool, &req, today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Invalid date format.".to_string()));
    assert_eq!(booking_count(&pool).await, 0);
}

#[actix_web::test]
async fn create_rejects_unknown_room_and_excess_guests() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let mut req = request(room + 100);
    let err = create_booking(&pool, &req, today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Invalid room type selected.".to_string()));

    req = request(room);
    req.guests = 5;
    let err = create_booking(&pool, &req, today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Maximum guests for this room is 2.".to_string()));
    assert_eq!(booking_count(&pool).await, 0);
}

#[actix_web::test]
async fn create_fails_when_no_rooms_left() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 0, 2).await;

    let err = create_booking(&pool, &request(room), today()).await.unwrap_err();
    let BookingError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(&"Sorry, no Luxury Suite rooms available.".to_string()));
    assert_eq!(booking_count(&pool).await, 0);
    assert_eq!(available_rooms(&pool, room).await, 0);
}

#[actix_web::test]
async fn concurrent_creations_against_last_room_admit_exactly_one() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Garden View Suite", 2_000_000, 8, 1, 3).await;

    let req_a = request(room);
    let req_b = request(room);
    let (first, second) = futures_util::join!(
        create_booking(&pool, &req_a, today()),
        create_booking(&pool, &req_b, today()),
    );

    let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one of the racers may win the last room");

    let loser = if first.is_err() { first.unwrap_err() } else { second.unwrap_err() };
    let BookingError::Validation(errors) = loser else {
        panic!("loser should fail validation, got {loser:?}");
    };
    assert!(errors.contains(&"Sorry, no Garden View Suite rooms available.".to_string()));
    assert_eq!(available_rooms(&pool, room).await, 0);
    assert_eq!(booking_count(&pool).await, 1);
}

#[actix_web::test]
async fn cancelling_returns_the_room_and_records_reason() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;
    let (booking, _) = create_booking(&pool, &request(room), today()).await.expect("created");
    assert_eq!(available_rooms(&pool, room).await, 9);

    let (cancelled, room_type) =
        transition_status(&pool, booking.id, BookingStatus::Cancelled, Some("guest request"))
            .await
            .expect("cancelled");

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("guest request"));
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(room_type.available_rooms, 10);
    assert_eq!(available_rooms(&pool, room).await, 10);
}

#[actix_web::test]
async fn cancel_then_reconfirm_restores_the_original_count() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;
    let (booking, _) = create_booking(&pool, &request(room), today()).await.expect("created");

    transition_status(&pool, booking.id, BookingStatus::Cancelled, None)
        .await
        .expect("cancelled");
    assert_eq!(available_rooms(&pool, room).await, 10);

    let (confirmed, _) = transition_status(&pool, booking.id, BookingStatus::Confirmed, None)
        .await
        .expect("re-confirmed");
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(available_rooms(&pool, room).await, 9);
}

#[actix_web::test]
async fn reactivating_with_no_rooms_left_is_rejected() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 1, 1, 2).await;
    let (booking, _) = create_booking(&pool, &request(room), today()).await.expect("created");

    transition_status(&pool, booking.id, BookingStatus::Cancelled, None)
        .await
        .expect("cancelled");

    // Someone else takes the freed room.
    let mut other = request(room);
    other.email = "obi@example.com".to_string();
    create_booking(&pool, &other, today()).await.expect("second guest books");
    assert_eq!(available_rooms(&pool, room).await, 0);

    let err = transition_status(&pool, booking.id, BookingStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NoRoomsAvailable));

    let status: String = sqlx::query_scalar("SELECT status FROM bookings WHERE id = ?")
        .bind(booking.id)
        .fetch_one(&pool)
        .await
        .expect("status");
    assert_eq!(status, "cancelled");
    assert_eq!(available_rooms(&pool, room).await, 0);
}

#[actix_web::test]
async fn pending_confirmed_moves_never_touch_inventory() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;
    let (booking, _) = create_booking(&pool, &request(room), today()).await.expect("created");

    let (confirmed, _) = transition_status(&pool, booking.id, BookingStatus::Confirmed, None)
        .await
        .expect("confirmed");
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(available_rooms(&pool, room).await, 9);

    let (back, _) = transition_status(&pool, booking.id, BookingStatus::Pending, None)
        .await
        .expect("back to pending");
    assert_eq!(back.status, BookingStatus::Pending);
    assert_eq!(available_rooms(&pool, room).await, 9);
}

#[actix_web::test]
async fn repeated_cancellation_does_not_double_increment() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;
    let (booking, _) = create_booking(&pool, &request(room), today()).await.expect("created");

    transition_status(&pool, booking.id, BookingStatus::Cancelled, None)
        .await
        .expect("cancelled");
    transition_status(&pool, booking.id, BookingStatus::Cancelled, None)
        .await
        .expect("cancelled again");

    assert_eq!(available_rooms(&pool, room).await, 10);
}

#[actix_web::test]
async fn transition_on_unknown_booking_is_not_found() {
    let pool = setup_pool().await;
    seed_room(&pool, "Luxury Suite", 1_500_000, 10, 10, 2).await;

    let err = transition_status(&pool, 999, BookingStatus::Confirmed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound));
}

#[actix_web::test]
async fn availability_stays_within_bounds_across_a_full_cycle() {
    let pool = setup_pool().await;
    let room = seed_room(&pool, "Luxury Suite", 1_500_000, 2, 2, 2).await;

    let (first, _) = create_booking(&pool, &request(room), today()).await.expect("first");
    let mut second_req = request(room);
    second_req.email = "obi@example.com".to_string();
    let (second, _) = create_booking(&pool, &second_req, today()).await.expect("second");

    for (id, status) in [
        (first.id, BookingStatus::Confirmed),
        (second.id, BookingStatus::Cancelled),
        (second.id, BookingStatus::Pending),
        (first.id, BookingStatus::Cancelled),
        (first.id, BookingStatus::Confirmed),
    ] {
        transition_status(&pool, id, status, None).await.expect("transition");
        let available = available_rooms(&pool, room).await;
        assert!((0..=2).contains(&available), "availability {available} out of bounds");
    }
    assert_eq!(available_rooms(&pool, room).await, 0);
}
