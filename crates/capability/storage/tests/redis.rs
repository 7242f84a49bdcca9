//! 需要 `UDMI_TEST_REDIS_URL`，未设置时跳过。

use chrono::Utc;
use domain::{DeviceDraft, DeviceKey, SiteKey};
use udmi_storage::{DeviceStore, RedisDocumentStore, SiteStore};

#[tokio::test]
async fn redis_compare_and_set() {
    let Ok(url) = std::env::var("UDMI_TEST_REDIS_URL") else {
        return;
    };
    let store = RedisDocumentStore::connect(&url).await.expect("client");
    let name = format!(
        "AHU-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let key = DeviceKey::new(name, "reg-it").expect("key");
    let device = DeviceDraft {
        firmware: Some("v2".to_string()),
        ..DeviceDraft::for_key(&key)
    }
    .build()
    .expect("device");

    assert_eq!(
        store
            .upsert_device(&key, &device, None)
            .await
            .expect("create"),
        1
    );
    assert!(store
        .upsert_device(&key, &device, None)
        .await
        .expect_err("exists")
        .is_conflict());
    assert_eq!(
        store
            .upsert_device(&key, &device, Some(1))
            .await
            .expect("update"),
        2
    );
    let stored = store
        .get_device(&key)
        .await
        .expect("get")
        .expect("device");
    assert_eq!(stored.version, 2);
    assert_eq!(stored.record, device);
}

async fn connected_clients(admin: &mut redis::aio::MultiplexedConnection) -> i64 {
    let info: String = redis::cmd("INFO")
        .arg("clients")
        .query_async(admin)
        .await
        .expect("info");
    info.lines()
        .find_map(|line| line.strip_prefix("connected_clients:"))
        .and_then(|count| count.trim().parse().ok())
        .expect("connected_clients")
}

#[tokio::test]
async fn redis_store_reuses_one_connection() {
    let Ok(url) = std::env::var("UDMI_TEST_REDIS_URL") else {
        return;
    };
    let store = RedisDocumentStore::connect(&url).await.expect("client");
    let mut admin = redis::Client::open(url.as_str())
        .expect("admin client")
        .get_multiplexed_tokio_connection()
        .await
        .expect("admin connection");
    let before = connected_clients(&mut admin).await;

    let name = format!(
        "VAV-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let key = DeviceKey::new(name.clone(), "reg-it").expect("key");
    let device = DeviceDraft::for_key(&key).build().expect("device");
    let mut version = None;
    for _ in 0..10 {
        version = Some(
            store
                .upsert_device(&key, &device, version)
                .await
                .expect("upsert"),
        );
        store.get_device(&key).await.expect("get");
        store
            .get_site(&SiteKey::new(name.clone()).expect("site key"))
            .await
            .expect("get site");
    }

    assert_eq!(version, Some(10));
    assert_eq!(connected_clients(&mut admin).await, before);
}
