use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tf_core::{BranchId, GameId, SettingValue};
use tf_service::{GameService, ServiceError, SettingsService, TimelineService};
use tf_storage::{CreateGameRequest, SqliteStore};

// 2025-01-01T00:00:00Z, the in-fiction epoch the scenarios start from.
const T0: i64 = 1_735_689_600;

fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!("tf-svc-{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

fn service_with_game() -> (TimelineService<SqliteStore>, GameId) {
    let mut store = SqliteStore::open_in_memory().expect("in-memory storage should open");
    let game_id = GameId::new();
    store
        .create_game(CreateGameRequest {
            id: game_id,
            name: "Slot One".to_string(),
        })
        .expect("game should be created");
    (TimelineService::new(store), game_id)
}

#[test]
fn play_fork_and_inspect_follow_branch_identity() {
    let (mut service, game_id) = service_with_game();

    let first = service
        .start_new_branch(game_id, T0)
        .expect("new branch should start");
    assert_eq!(first.game_id(), game_id);
    assert_eq!(first.parent_id(), None);
    assert_eq!(first.start_date_s(), T0);
    assert_eq!(first.current_date_s(), T0);

    let line = first.branch_id();
    let played = service.advance(line, 3_600).expect("advance should append");
    assert_eq!(played.branch_id(), line, "advance reuses the branch id");
    assert_ne!(played.id(), first.id());
    assert_eq!(played.parent_id(), Some(first.id()));
    assert_eq!(played.start_date_s(), T0);
    assert_eq!(played.current_date_s(), T0 + 3_600);

    let fork = service.fork(line).expect("fork should append");
    assert_ne!(fork.branch_id(), line, "fork mints a fresh branch id");
    assert_eq!(fork.parent_id(), Some(played.id()), "fork hangs off the source head");
    assert_eq!(fork.start_date_s(), T0);
    assert_eq!(fork.current_date_s(), T0, "the fork restarts the branch clock");

    // The source line is untouched by the fork.
    let head = service.head_of(line).expect("source head should resolve");
    assert_eq!(head, played);
    let fork_head = service
        .head_of(fork.branch_id())
        .expect("fork head should resolve");
    assert_eq!(fork_head, fork);

    let branches = service
        .all_branches_of(game_id)
        .expect("branches should list");
    assert_eq!(
        branches,
        vec![fork.clone(), played.clone()],
        "one head per branch, newest first"
    );
}

#[test]
fn rank_walks_a_branch_newest_first() {
    let (mut service, game_id) = service_with_game();

    let root = service
        .start_new_branch(game_id, T0)
        .expect("new branch should start");
    let line = root.branch_id();
    let morning = service.advance(line, 60).expect("advance should append");
    let noon = service.advance(line, 120).expect("advance should append");

    let at = |rank: usize| {
        service
            .head_of_rank(line, rank)
            .expect("in-range rank should resolve")
    };
    assert_eq!(at(0), noon);
    assert_eq!(at(1), morning);
    assert_eq!(at(2), root);

    let err = service
        .head_of_rank(line, 3)
        .expect_err("rank past the root must miss");
    assert_eq!(err.code(), "NOT_FOUND");
    assert!(matches!(err, ServiceError::NotFound("timeline")));
}

#[test]
fn advance_is_idempotent_for_equal_elapsed() {
    let (mut service, game_id) = service_with_game();

    let root = service
        .start_new_branch(game_id, T0)
        .expect("new branch should start");
    let line = root.branch_id();

    let first = service.advance(line, 3_600).expect("advance should append");
    let second = service
        .advance(line, 3_600)
        .expect("repeating the same elapsed should append");

    assert_ne!(second.id(), first.id());
    assert_eq!(second.parent_id(), Some(first.id()));
    assert_eq!(
        second.current_date_s(),
        first.current_date_s(),
        "equal elapsed lands an equal state, not a doubled one"
    );

    let head = service.head_of(line).expect("head should resolve");
    assert_eq!(head, second);
}

#[test]
fn unknown_branch_is_not_found_everywhere() {
    let (mut service, _game_id) = service_with_game();
    let ghost = BranchId::new();

    let err = service
        .head_of(ghost)
        .expect_err("head of unknown branch must fail");
    assert_eq!(err.code(), "NOT_FOUND");
    assert!(matches!(err, ServiceError::NotFound("timeline")));

    let err = service
        .fork(ghost)
        .expect_err("fork of unknown branch must fail");
    assert!(matches!(err, ServiceError::NotFound("timeline")));

    let err = service
        .advance(ghost, 10)
        .expect_err("advance of unknown branch must fail");
    assert!(matches!(err, ServiceError::NotFound("timeline")));

    let err = service
        .head_of_rank(ghost, 0)
        .expect_err("rank of unknown branch must fail");
    assert!(matches!(err, ServiceError::NotFound("timeline")));
}

#[test]
fn advance_rejects_out_of_range_elapsed() {
    let (mut service, game_id) = service_with_game();

    let near_end = service
        .start_new_branch(game_id, i64::MAX - 100)
        .expect("new branch should start");
    let err = service
        .advance(near_end.branch_id(), 3_600)
        .expect_err("elapsed past the date range must be refused");
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(matches!(err, ServiceError::Validation(_)));

    let root = service
        .start_new_branch(game_id, T0)
        .expect("new branch should start");
    let err = service
        .advance(root.branch_id(), u64::MAX)
        .expect_err("elapsed beyond i64 must be refused");
    assert!(matches!(err, ServiceError::Validation(_)));

    // Refused advances append nothing.
    let head = service
        .head_of(near_end.branch_id())
        .expect("head should resolve");
    assert_eq!(head, near_end);
}

#[test]
fn compare_and_advance_detects_a_moved_head() {
    let (mut service, game_id) = service_with_game();

    let root = service
        .start_new_branch(game_id, T0)
        .expect("new branch should start");
    let line = root.branch_id();

    let guarded = service
        .advance_if_head(line, 60, root.id())
        .expect("guarded advance should land on a quiet branch");
    assert_eq!(guarded.parent_id(), Some(root.id()));

    let err = service
        .advance_if_head(line, 120, root.id())
        .expect_err("stale head expectation must be refused");
    assert_eq!(err.code(), "HEAD_MOVED");
    match err {
        ServiceError::HeadMoved { expected, actual } => {
            assert_eq!(expected, root.id());
            assert_eq!(actual, Some(guarded.id()));
        }
        other => panic!("expected HeadMoved, got {other:?}"),
    }

    // The refused call appended nothing.
    let head = service.head_of(line).expect("head should resolve");
    assert_eq!(head, guarded);
}

#[test]
fn services_pass_one_store_handle_and_survive_reopen() {
    let dir = temp_storage_dir("handoff");
    let store = SqliteStore::open(&dir).expect("fresh storage should open");

    let mut games = GameService::new(store);
    let game = games.create("Slot A").expect("game should be created");

    let mut timelines = TimelineService::new(games.into_inner());
    let root = timelines
        .start_new_branch(game.id, T0)
        .expect("new branch should start");

    let mut settings = SettingsService::new(timelines.into_inner());
    settings
        .create("sim.speed", SettingValue::Float(2.0))
        .expect("setting should be created");
    drop(settings.into_inner());

    let store = SqliteStore::open(&dir).expect("storage should reopen");
    let games = GameService::new(store);
    assert_eq!(
        games.get(game.id).expect("game should survive reopen"),
        game
    );

    let settings = SettingsService::new(games.into_inner());
    assert_eq!(
        settings
            .get("sim.speed")
            .expect("setting should survive reopen"),
        SettingValue::Float(2.0)
    );

    let timelines = TimelineService::new(settings.into_inner());
    let head = timelines
        .head_of(root.branch_id())
        .expect("head should survive reopen");
    assert_eq!(head, root);
}
