use pricing_dao::{PricingDao, PricingStore};
use test_utils::{
    TestPostgresContainer, day,
    fixtures::{
        create_booking, create_category, create_maintenance, current_price,
        set_room_status,
    },
};

async fn setup_test_db() -> anyhow::Result<(TestPostgresContainer, PricingDao)>
{
    let container = TestPostgresContainer::new().await?;
    let dao = PricingDao::new(container.sql_connect());

    Ok((container, dao))
}

#[tokio::test]
async fn test_list_categories_and_unit_count() {
    let (container, dao) = setup_test_db().await.unwrap();
    let (deluxe, _) = create_category(&container, "Deluxe", 180.0, 3)
        .await
        .unwrap();
    let (suite, _) = create_category(&container, "Suite", 320.0, 0)
        .await
        .unwrap();

    let categories = dao.list_categories().await.unwrap();

    assert_eq!(categories, vec![deluxe, suite]);
    assert_eq!(dao.unit_count(deluxe).await.unwrap(), 3);
    assert_eq!(dao.unit_count(suite).await.unwrap(), 0);
    assert_eq!(dao.unit_count(9_999).await.unwrap(), 0);
}

#[tokio::test]
async fn test_booked_unit_nights_clip_and_skip_cancelled() {
    let (container, dao) = setup_test_db().await.unwrap();
    let (category, rooms) = create_category(&container, "Standard", 100.0, 2)
        .await
        .unwrap();

    // 2 nights inside the range
    create_booking(
        &container,
        rooms[0],
        day("2025-05-30"),
        day("2025-06-03"),
        "Confirmed",
    )
    .await
    .unwrap();
    // 3 nights inside the range
    create_booking(
        &container,
        rooms[1],
        day("2025-06-02"),
        day("2025-06-09"),
        "Checked-In",
    )
    .await
    .unwrap();
    create_booking(
        &container,
        rooms[1],
        day("2025-06-01"),
        day("2025-06-02"),
        "Cancelled",
    )
    .await
    .unwrap();
    // Touches the range boundary only
    create_booking(
        &container,
        rooms[0],
        day("2025-06-05"),
        day("2025-06-07"),
        "Confirmed",
    )
    .await
    .unwrap();

    let nights = dao
        .booked_unit_nights(category, day("2025-06-01"), day("2025-06-05"))
        .await
        .unwrap();

    assert_eq!(nights, 5);
}

#[tokio::test]
async fn test_booked_unit_nights_empty_range() {
    let (container, dao) = setup_test_db().await.unwrap();
    let (category, _) = create_category(&container, "Standard", 100.0, 2)
        .await
        .unwrap();

    let nights = dao
        .booked_unit_nights(category, day("2025-06-01"), day("2025-06-02"))
        .await
        .unwrap();

    assert_eq!(nights, 0);
}

#[tokio::test]
async fn test_available_units_exclude_maintenance_and_status() {
    let (container, dao) = setup_test_db().await.unwrap();
    let (standard, rooms) = create_category(&container, "Standard", 100.0, 4)
        .await
        .unwrap();
    let (suite, _) = create_category(&container, "Suite", 300.0, 2)
        .await
        .unwrap();
    let today = day("2025-06-10");

    set_room_status(&container, rooms[0], "Occupied").await.unwrap();
    create_maintenance(&container, rooms[1], day("2025-06-09"), today)
        .await
        .unwrap();
    // Finished yesterday, the room is back
    create_maintenance(&container, rooms[2], day("2025-06-01"), day("2025-06-09"))
        .await
        .unwrap();

    assert_eq!(dao.available_units(Some(standard), today).await.unwrap(), 2);
    assert_eq!(dao.available_units(Some(suite), today).await.unwrap(), 2);
    assert_eq!(dao.available_units(None, today).await.unwrap(), 4);
}

#[tokio::test]
async fn test_apply_and_reset_current_price() {
    let (container, dao) = setup_test_db().await.unwrap();
    let (category, _) = create_category(&container, "Deluxe", 199.99, 1)
        .await
        .unwrap();

    let before = dao.category_prices(category).await.unwrap().unwrap();
    assert_eq!(before.base_price, 199.99);
    assert_eq!(before.current_price, None);

    assert!(dao.apply_current_price(category, 1.44).await.unwrap());
    assert_eq!(
        current_price(&container, category).await.unwrap(),
        Some(287.99)
    );

    assert!(dao.reset_current_price(category).await.unwrap());
    let after = dao.category_prices(category).await.unwrap().unwrap();
    assert_eq!(after.current_price, Some(199.99));
}

#[tokio::test]
async fn test_missing_category() {
    let (_container, dao) = setup_test_db().await.unwrap();

    assert!(dao.category_prices(42).await.unwrap().is_none());
    assert!(!dao.apply_current_price(42, 1.5).await.unwrap());
    assert!(!dao.reset_current_price(42).await.unwrap());
}
