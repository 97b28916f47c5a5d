use footdb_terminal::persist;
use footdb_terminal::state::AppState;

// History round trip through the on-disk cache, pointed at a throwaway path
// via FOOTDB_HISTORY_PATH. This file holds the single test that touches the
// process environment.

#[test]
fn history_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    // Safety: no other thread reads the environment in this test binary.
    unsafe {
        std::env::set_var("FOOTDB_HISTORY_PATH", &path);
    }

    let mut state = AppState::new();
    state.remember_query("SELECT * FROM results");
    state.remember_query("DELETE FROM shootouts WHERE winner = 'X'");
    persist::save_from_state(&state);
    assert!(path.exists());

    let mut restored = AppState::new();
    persist::load_into_state(&mut restored);
    assert_eq!(restored.sql_history, state.sql_history);
    assert!(restored.history_pos.is_none());
}
