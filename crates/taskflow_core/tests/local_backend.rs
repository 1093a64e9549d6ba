use std::sync::Arc;
use taskflow_core::{
    AuthService, LocalAuthService, LocalTaskStore, SessionManager, SessionPhase, Task,
    TaskFieldUpdate, TaskId, TaskStore, TaskSynchronizer, UserId,
};

#[tokio::test]
async fn full_flow_over_local_backend() {
    let auth = Arc::new(LocalAuthService::new());
    let store = Arc::new(LocalTaskStore::open_in_memory().unwrap());

    let session = SessionManager::new(auth.clone());
    session.set_email("Ada@Example.com");
    session.set_password("secret1");
    assert!(session.sign_up(|| {}).await);
    assert_eq!(session.snapshot().phase, SessionPhase::Authenticated);
    let uid = auth.current_user_id().unwrap();

    let tasks = TaskSynchronizer::spawn(auth.clone(), store.clone());
    tasks
        .wait_for(|state| !state.is_loading)
        .await
        .expect("initial snapshot");
    assert_eq!(store.subscriber_count(&uid), 1);

    tasks.add_task(" first ", "");
    let state = tasks.wait_for(|state| state.tasks.len() == 1).await.unwrap();
    let created = state.tasks[0].clone();
    assert_eq!(created.title, "first");
    assert!(!created.id.is_unassigned());

    tasks.toggle_task_completion(&created);
    let state = tasks
        .wait_for(|state| state.tasks.iter().all(|task| task.is_completed))
        .await
        .unwrap();
    assert_eq!(state.tasks[0].id, created.id);

    tasks.delete_task(created.id.clone());
    let state = tasks
        .wait_for(|state| state.tasks.is_empty() && !state.is_loading)
        .await
        .unwrap();
    assert!(state.error_message.is_none());

    tasks.logout();
    tasks
        .wait_for(|state| !state.is_listening())
        .await
        .unwrap();
    assert!(!session.is_user_logged_in());
    assert_eq!(store.subscriber_count(&uid), 0);
}

#[tokio::test]
async fn toggling_a_deleted_task_reports_missing_document() {
    let auth = Arc::new(LocalAuthService::new());
    auth.sign_up("a@b.io", "secret1").await.unwrap();
    let store = Arc::new(LocalTaskStore::open_in_memory().unwrap());
    let tasks = TaskSynchronizer::spawn(auth.clone(), store.clone());
    tasks.wait_for(|state| !state.is_loading).await.unwrap();

    let ghost = Task {
        id: TaskId::new("ghost"),
        ..Task::draft("gone", "", 1)
    };
    tasks.toggle_task_completion(&ghost);
    let state = tasks
        .wait_for(|state| state.error_message.is_some())
        .await
        .unwrap();
    assert_eq!(
        state.error_message.as_deref(),
        Some("Error updating task status: No document to update: ghost")
    );
}

#[tokio::test]
async fn collections_are_isolated_per_user() {
    let store = LocalTaskStore::open_in_memory().unwrap();
    let ada = UserId::new("ada");
    let bob = UserId::new("bob");

    store.create(&ada, &Task::draft("ada's", "", 1)).await.unwrap();

    let mut bob_feed = store.subscribe(&bob);
    let first = bob_feed.next().await.unwrap().unwrap();
    assert!(first.is_empty());

    let mut ada_feed = store.subscribe(&ada);
    let first = ada_feed.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].title, "ada's");
}

#[tokio::test]
async fn every_write_pushes_a_full_snapshot() {
    let store = LocalTaskStore::open_in_memory().unwrap();
    let uid = UserId::new("u1");
    let mut feed = store.subscribe(&uid);
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    let id = store.create(&uid, &Task::draft("a", "", 10)).await.unwrap();
    assert_eq!(feed.next().await.unwrap().unwrap().len(), 1);

    store
        .update_field(&uid, &id, TaskFieldUpdate::IsCompleted(true))
        .await
        .unwrap();
    let snapshot = feed.next().await.unwrap().unwrap();
    assert!(snapshot[0].is_completed);

    let edited = Task {
        title: "renamed".to_string(),
        ..snapshot[0].clone()
    };
    store.overwrite(&uid, &edited).await.unwrap();
    assert_eq!(feed.next().await.unwrap().unwrap(), vec![edited]);

    store.delete(&uid, &id).await.unwrap();
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    feed.cancel();
    assert_eq!(store.subscriber_count(&uid), 0);
}

#[tokio::test]
async fn tasks_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let uid = UserId::new("u1");

    {
        let store = LocalTaskStore::open(&path).unwrap();
        store.create(&uid, &Task::draft("late", "", 20)).await.unwrap();
        store.create(&uid, &Task::draft("early", "", 10)).await.unwrap();
    }

    let store = LocalTaskStore::open(&path).unwrap();
    let mut feed = store.subscribe(&uid);
    let titles: Vec<String> = feed
        .next()
        .await
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["early", "late"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_writes_deliver_snapshots_in_commit_order() {
    for round in 0..50 {
        let store = Arc::new(LocalTaskStore::open_in_memory().unwrap());
        let uid = UserId::new("u1");
        let mut feed = store.subscribe(&uid);

        let writers: Vec<_> = (0..8i64)
            .map(|i| {
                let store = Arc::clone(&store);
                let uid = uid.clone();
                tokio::spawn(async move {
                    store
                        .create(&uid, &Task::draft(&format!("task {i}"), "", i))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let mut sizes = Vec::new();
        let mut last = Vec::new();
        for _ in 0..=8 {
            last = feed.next().await.unwrap().unwrap();
            sizes.push(last.len());
        }
        assert_eq!(sizes, (0..=8).collect::<Vec<usize>>(), "round {round}");

        let mut fresh = store.subscribe(&uid);
        let stored = fresh.next().await.unwrap().unwrap();
        assert_eq!(last, stored, "round {round}");
    }
}
