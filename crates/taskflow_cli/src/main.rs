//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskflow_core` linkage with a deterministic ping/version probe.
//! - Drive one scripted session (sign-up, add, toggle, list, logout) against
//!   the local backend so the whole flow can be checked without a UI.

use log::info;
use std::error::Error;
use std::sync::Arc;
use taskflow_core::{
    display_name, start_route, CoreConfig, LocalAuthService, LocalTaskStore, SessionManager,
    SyncState, TaskListView, TaskSynchronizer,
};

const DEMO_EMAIL: &str = "demo@taskflow.local";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("taskflow_core ping={}", taskflow_core::ping());
    println!("taskflow_core version={}", taskflow_core::core_version());

    let config = CoreConfig::from_env()?;
    if taskflow_core::init_logging_from_config(&config)? {
        info!("event=cli_start module=cli status=ok");
    }

    let auth = Arc::new(LocalAuthService::new());
    let store = Arc::new(LocalTaskStore::open(&config.db_path)?);
    let session = SessionManager::from_config(auth.clone(), &config);
    println!("route={}", start_route(session.is_user_logged_in()));

    session.set_email(DEMO_EMAIL);
    session.set_password(DEMO_PASSWORD);
    if !session.sign_up(|| {}).await {
        let message = session.snapshot().error_message.unwrap_or_default();
        return Err(format!("sign-up failed: {message}").into());
    }
    println!(
        "route={} user={}",
        start_route(session.is_user_logged_in()),
        display_name(session.current_user_email().as_deref())
    );

    let tasks = TaskSynchronizer::spawn(auth, store);
    let loaded = tasks
        .wait_for(|state| !state.is_loading)
        .await
        .ok_or("task synchronizer stopped before the first snapshot")?;
    let before = loaded.tasks.len();

    tasks.add_task("Try TaskFlow", "created by the smoke run");
    let added = tasks
        .wait_for(|state| state.tasks.len() > before || state.error_message.is_some())
        .await
        .ok_or("task synchronizer stopped while adding")?;
    fail_on_error(&added)?;

    if let Some(newest) = added.tasks.iter().max_by_key(|task| task.timestamp) {
        let target = !newest.is_completed;
        let id = newest.id.clone();
        tasks.toggle_task_completion(newest);
        let toggled = tasks
            .wait_for(|state| {
                state.error_message.is_some()
                    || state
                        .tasks
                        .iter()
                        .any(|task| task.id == id && task.is_completed == target)
            })
            .await
            .ok_or("task synchronizer stopped while toggling")?;
        fail_on_error(&toggled)?;
    }

    print_list(&tasks.state());

    tasks.logout();
    session.logout();
    println!("route={}", start_route(session.is_user_logged_in()));
    tasks.shutdown();
    Ok(())
}

fn fail_on_error(state: &SyncState) -> Result<(), Box<dyn Error>> {
    match &state.error_message {
        Some(message) => Err(message.clone().into()),
        None => Ok(()),
    }
}

fn print_list(state: &SyncState) {
    match TaskListView::from_state(state) {
        TaskListView::Loading => println!("tasks=loading"),
        TaskListView::Error(message) => println!("tasks=error message={message}"),
        TaskListView::Empty => println!("tasks=empty"),
        TaskListView::Tasks(tasks) => {
            for task in tasks {
                let mark = if task.is_completed { "x" } else { " " };
                println!("[{mark}] {} ({})", task.title, task.id);
            }
        }
    }
}
