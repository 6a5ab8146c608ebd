//! Integration tests for the cluster and profile repositories.

use anyhow::Result;
use controller::storage::Dialect;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{seed_clusters, setup_storage};

#[tokio::test]
async fn cluster_create_lookup_delete_roundtrip() -> Result<()> {
    let storage = setup_storage().await?;
    let clusters = storage.clusters();

    let id = clusters.create("c1").await?;
    let found = clusters.get_by_name("c1").await?;
    assert_eq!(found.id, id);
    assert_eq!(clusters.get_by_id(id).await?.name, "c1");

    clusters.delete(id).await?;
    let err = clusters.get_by_id(id).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn clusters_are_listed_in_id_order() -> Result<()> {
    let storage = setup_storage().await?;
    seed_clusters(&storage, 5).await?;

    let listed = storage.clusters().list().await?;
    let ids: Vec<i32> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(listed[3].name, "cluster3");

    storage.clusters().delete(4).await?;
    let ids: Vec<i32> = storage
        .clusters()
        .list()
        .await?
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn lookup_by_id_zero_is_a_real_filter() -> Result<()> {
    use controller::repositories::ClusterLookup;

    let storage = setup_storage().await?;
    seed_clusters(&storage, 3).await?;
    let clusters = storage.clusters();

    let by_zero = clusters.find(&ClusterLookup::by_id(0)).await?;
    assert_eq!(by_zero.len(), 1);
    assert_eq!(by_zero[0].name, "cluster0");

    let by_name = clusters.find(&ClusterLookup::by_name("cluster2")).await?;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, 2);

    let unconstrained = clusters.find(&ClusterLookup::default()).await?;
    assert_eq!(unconstrained.len(), 3);

    let mismatched = clusters
        .find(&ClusterLookup {
            id: Some(1),
            name: Some("cluster2".to_string()),
        })
        .await?;
    assert!(mismatched.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_after_explicit_ids_continues_past_them() -> Result<()> {
    let storage = setup_storage().await?;
    seed_clusters(&storage, 5).await?;

    let id = storage.clusters().create("next").await?;
    assert_eq!(id, 5);
    Ok(())
}

#[tokio::test]
async fn missing_rows_are_not_found() -> Result<()> {
    let storage = setup_storage().await?;

    assert!(storage.clusters().get_by_name("nope").await.unwrap_err().is_not_found());
    assert!(storage.clusters().delete(42).await.unwrap_err().is_not_found());
    assert!(storage.clusters().delete_by_name("nope").await.unwrap_err().is_not_found());
    assert!(storage.profiles().get_by_id(42).await.unwrap_err().is_not_found());
    assert!(storage.profiles().delete(42).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn duplicate_cluster_name_is_a_storage_error() -> Result<()> {
    let storage = setup_storage().await?;
    storage.clusters().create("dup").await?;

    let err = storage.clusters().create("dup").await.unwrap_err();
    assert!(err.is_storage());
    Ok(())
}

#[tokio::test]
async fn blank_cluster_name_is_rejected() -> Result<()> {
    let storage = setup_storage().await?;
    let err = storage.clusters().create("   ").await.unwrap_err();
    assert!(err.is_validation());
    assert!(storage.clusters().list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn profile_text_is_stored_byte_for_byte() -> Result<()> {
    let storage = setup_storage().await?;
    let text = r#"{"watch":["a","b","c"],   "no_op":"X"}"#;

    let profiles = storage.profiles().create("tester", "cfg1", text).await?;
    assert_eq!(profiles.len(), 1);

    let stored = storage.profiles().get_by_id(profiles[0].id).await?;
    assert_eq!(stored.configuration, text);
    assert_eq!(stored.description, "cfg1");
    assert_eq!(stored.changed_by, "tester");
    Ok(())
}

#[tokio::test]
async fn profile_change_replaces_text_and_returns_list() -> Result<()> {
    let storage = setup_storage().await?;
    let profiles = storage.profiles();

    profiles.create("tester", "first", "{}").await?;
    let created = profiles.create("tester", "second", "{}").await?;
    assert_eq!(created.len(), 2);

    let second = created[1].id;
    let changed = profiles
        .change(second, "admin", "second v2", r#"{"no_op":"Y"}"#)
        .await?;
    assert_eq!(changed.len(), 2);

    let stored = profiles.get_by_id(second).await?;
    assert_eq!(stored.configuration, r#"{"no_op":"Y"}"#);
    assert_eq!(stored.changed_by, "admin");
    assert_eq!(stored.description, "second v2");

    let err = profiles.change(999, "admin", "", "{}").await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn listing_pairs_each_assignment_with_its_profile_text() -> Result<()> {
    let storage = setup_storage().await?;
    storage.clusters().create("c1").await?;
    storage.clusters().create("c2").await?;
    let configurations = storage.configurations();

    let c1 = configurations
        .create("c1", "tester", "", "", r#"{"owner":"c1"}"#)
        .await?;
    configurations
        .create("c2", "tester", "", "", r#"{"owner":"c2"}"#)
        .await?;
    // c2 also runs c1's profile, so two assignments share one profile row
    configurations
        .assign("c2", c1[0].configuration_id, "tester", "", false)
        .await?;

    let rows = configurations.list().await?;
    assert_eq!(rows.len(), 3);
    let texts: Vec<&str> = rows.iter().map(|row| row.configuration.as_str()).collect();
    assert_eq!(
        texts,
        [r#"{"owner":"c1"}"#, r#"{"owner":"c2"}"#, r#"{"owner":"c1"}"#]
    );
    assert_eq!(rows[0].configuration_id, rows[2].configuration_id);
    assert_ne!(rows[0].cluster, rows[2].cluster);
    Ok(())
}

#[tokio::test]
async fn deleting_a_cluster_cascades_to_its_configurations() -> Result<()> {
    let storage = setup_storage().await?;
    let cluster_id = storage.clusters().create("doomed").await?;
    storage.clusters().create("survivor").await?;

    storage
        .configurations()
        .create("doomed", "tester", "init", "d", r#"{"a":1}"#)
        .await?;
    storage
        .configurations()
        .create("survivor", "tester", "init", "s", r#"{"b":2}"#)
        .await?;

    storage.clusters().delete(cluster_id).await?;

    let remaining = storage.configurations().list().await?;
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|row| row.cluster != cluster_id));
    Ok(())
}

#[tokio::test]
async fn deleting_a_profile_cascades_to_assignments() -> Result<()> {
    let storage = setup_storage().await?;
    storage.clusters().create("c1").await?;

    let rows = storage
        .configurations()
        .create("c1", "tester", "init", "", "{}")
        .await?;
    storage.profiles().delete(rows[0].configuration_id).await?;

    assert!(storage.configurations().list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn operations_on_closed_storage_fail_with_storage_error() -> Result<()> {
    let mut storage = setup_storage().await?;
    storage.clusters().create("c1").await?;
    storage.close().await?;

    assert_eq!(storage.dialect(), Dialect::Sqlite);
    assert!(storage.clusters().list().await.unwrap_err().is_storage());
    assert!(storage.clusters().create("c2").await.unwrap_err().is_storage());
    assert!(
        storage
            .configurations()
            .enable("c1", "tester", "")
            .await
            .unwrap_err()
            .is_storage()
    );
    assert!(storage.triggers().list().await.unwrap_err().is_storage());
    Ok(())
}
