//! Screen flow driven through raw input, the way the binary replays scripts.

use std::cell::RefCell;
use std::rc::Rc;

use ledgehop::components::objectkind::ObjectKind;
use ledgehop::events::gamestate::GameStateChangedEvent;
use ledgehop::events::input::{Key, RawInput};
use ledgehop::game::{Game, GameError};
use ledgehop::level::{LevelFile, ObjectDesc};
use ledgehop::resources::assetstore::AssetError;
use ledgehop::resources::gameconfig::GameConfig;
use ledgehop::resources::gamestate::GameStates;
use ledgehop::resources::rendertarget::RecordingTarget;

const DT: f32 = 1.0 / 60.0;

fn level_with(objects: Vec<ObjectDesc>, kill_y: f32) -> LevelFile {
    let mut all = vec![ObjectDesc::new(ObjectKind::Platform, [100.0, 100.0], [400.0, 20.0]).solid()];
    all.extend(objects);
    LevelFile {
        name: "flow".into(),
        player: ObjectDesc::new(ObjectKind::Player, [100.0, 80.0], [20.0, 20.0]),
        objects: all,
        kill_y,
    }
}

fn game_with(level: LevelFile, lives: u32) -> Game {
    let mut config = GameConfig::new();
    config.lives = lives;
    config.cutscene_seconds = 10.0;
    Game::new(config, level)
}

fn idle(game: &mut Game, ticks: usize) {
    for _ in 0..ticks {
        game.tick(DT, &[]).unwrap();
    }
}

fn down(game: &mut Game, key: Key) {
    game.tick(DT, &[RawInput::KeyDown(key)]).unwrap();
}

fn up(game: &mut Game, key: Key) {
    game.tick(DT, &[RawInput::KeyUp(key)]).unwrap();
}

fn count_kind(game: &Game, kind: ObjectKind) -> usize {
    let map = game.running_map().unwrap();
    map.objects().iter().filter(|e| map.kind(**e) == Some(kind)).count()
}

#[test]
fn menu_cutscene_running_pause_resume() {
    let mut game = game_with(level_with(Vec::new(), 1000.0), 3);
    let changes: Rc<RefCell<Vec<GameStateChangedEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let _connection = game
        .state_changed
        .connect(move |change: &GameStateChangedEvent| sink.borrow_mut().push(*change));

    game.start(GameStates::MainMenu).unwrap();
    assert_eq!(game.state(), GameStates::MainMenu);
    assert_eq!(game.main_menu().unwrap().selected().as_deref(), Some("play"));

    down(&mut game, Key::Space);
    assert_eq!(game.state(), GameStates::Cutscene);
    assert!(game.main_menu().is_none());
    up(&mut game, Key::Space);

    // Any key skips the title card.
    down(&mut game, Key::Enter);
    assert_eq!(game.state(), GameStates::Running);
    up(&mut game, Key::Enter);
    idle(&mut game, 10);
    assert!(game.running().unwrap().is_listening());
    assert!(game.running().unwrap().map().body(game.running().unwrap().player()).unwrap().is_grounded());

    down(&mut game, Key::Escape);
    assert_eq!(game.state(), GameStates::Paused);
    let paused_at = game.running().unwrap().player_position().unwrap();
    assert!(!game.running().unwrap().is_listening());

    // Movement keys do nothing while paused.
    down(&mut game, Key::D);
    idle(&mut game, 10);
    assert_eq!(game.running().unwrap().player_position(), Some(paused_at));
    up(&mut game, Key::D);

    up(&mut game, Key::Escape);
    down(&mut game, Key::Escape);
    assert_eq!(game.state(), GameStates::Running);
    assert!(game.running().unwrap().is_listening());
    let resumed_at = game.running().unwrap().player_position().unwrap();
    assert!(resumed_at.distance(paused_at) < 0.01);

    let seen: Vec<(GameStates, GameStates)> = changes.borrow().iter().map(|c| (c.from, c.to)).collect();
    assert_eq!(
        seen,
        vec![
            (GameStates::None, GameStates::MainMenu),
            (GameStates::MainMenu, GameStates::Cutscene),
            (GameStates::Cutscene, GameStates::Running),
            (GameStates::Running, GameStates::Paused),
            (GameStates::Paused, GameStates::Running),
        ]
    );
}

#[test]
fn holding_right_walks_the_player() {
    let mut game = game_with(level_with(Vec::new(), 1000.0), 3);
    game.start(GameStates::Running).unwrap();
    idle(&mut game, 5);
    let start = game.running().unwrap().player_position().unwrap();

    down(&mut game, Key::D);
    idle(&mut game, 30);
    up(&mut game, Key::D);
    idle(&mut game, 5);

    let end = game.running().unwrap().player_position().unwrap();
    assert!(end.x > start.x + 50.0, "moved from {start:?} to {end:?}");
    assert!((end.y - start.y).abs() < 0.01);
}

#[test]
fn jumping_leaves_the_ground_and_lands_again() {
    let mut game = game_with(level_with(Vec::new(), 1000.0), 3);
    game.start(GameStates::Running).unwrap();
    idle(&mut game, 10);
    let rest = game.running().unwrap().player_position().unwrap();

    down(&mut game, Key::Space);
    {
        let running = game.running().unwrap();
        let body = running.map().body(running.player()).unwrap();
        assert!(running.player_position().unwrap().y < rest.y - 1.0);
        assert!(body.velocity.y < 0.0);
        assert!(!body.is_grounded());
    }
    up(&mut game, Key::Space);

    idle(&mut game, 120);
    let landed = game.running().unwrap().player_position().unwrap();
    assert!(landed.distance(rest) < 0.01, "landed at {landed:?}, rested at {rest:?}");
    assert!(game.running().unwrap().map().body(game.running().unwrap().player()).unwrap().is_grounded());
}

#[test]
fn jump_needs_ground_under_the_player() {
    let level = LevelFile {
        name: "air".into(),
        player: ObjectDesc::new(ObjectKind::Player, [100.0, 80.0], [20.0, 20.0]),
        objects: Vec::new(),
        kill_y: 1000.0,
    };
    let mut game = game_with(level, 3);
    game.start(GameStates::Running).unwrap();
    idle(&mut game, 2);

    down(&mut game, Key::Space);
    let running = game.running().unwrap();
    assert!(running.map().body(running.player()).unwrap().velocity.y > 0.0);
}

#[test]
fn level_textures_are_loaded_and_drawn() {
    let mut level = level_with(Vec::new(), 1000.0);
    level.objects.push(ObjectDesc::new(ObjectKind::Decoration, [300.0, 60.0], [20.0, 20.0]));
    level.objects[1].texture = Some("bush".into());
    let mut game = game_with(level, 3);
    game.start(GameStates::Running).unwrap();

    for key in ["player", "platform", "bush"] {
        assert!(game.textures().get(key).is_ok(), "{key} is loaded");
    }
    assert!(matches!(game.textures().get("goal"), Err(AssetError::NotLoaded(_))));

    let mut target = RecordingTarget::new();
    game.draw(&mut target);
    assert_eq!(target.texture_keys(), vec!["player", "platform", "bush"]);
    assert!(target.untextured.is_empty());
}

#[test]
fn missing_texture_fails_the_level_start() {
    let mut level = level_with(Vec::new(), 1000.0);
    level.objects[0].texture = Some("no_such_texture".into());
    let mut game = game_with(level, 3);

    match game.start(GameStates::Running) {
        Err(GameError::Asset(AssetError::NotFound { id, .. })) => assert_eq!(id, "no_such_texture"),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(game.running().is_none());
}

#[test]
fn power_up_is_collected_once() {
    let power_up = ObjectDesc::new(ObjectKind::PowerUp, [100.0, 80.0], [10.0, 10.0]);
    let mut game = game_with(level_with(vec![power_up], 1000.0), 3);
    game.start(GameStates::Running).unwrap();
    assert_eq!(count_kind(&game, ObjectKind::PowerUp), 1);

    idle(&mut game, 1);
    assert_eq!(game.session().score, 1);
    assert_eq!(count_kind(&game, ObjectKind::PowerUp), 0);

    idle(&mut game, 10);
    assert_eq!(game.session().score, 1);
    assert_eq!(game.state(), GameStates::Running);
}

#[test]
fn death_zone_costs_lives_until_game_over() {
    let hazard = ObjectDesc::new(ObjectKind::DeathZone, [100.0, 80.0], [40.0, 40.0]);
    let mut game = game_with(level_with(vec![hazard], 1000.0), 2);
    game.start(GameStates::Running).unwrap();

    idle(&mut game, 1);
    assert_eq!(game.state(), GameStates::Running);
    assert_eq!(game.session().lives, 1);
    assert_eq!(game.session().deaths, 1);

    // Respawned on the same hazard.
    idle(&mut game, 1);
    assert_eq!(game.state(), GameStates::GameOver);
    assert_eq!(game.session().lives, 0);
    assert!(!game.game_over().unwrap().won());
    assert!(game.running().is_none());
}

#[test]
fn falling_below_the_kill_line_loses_a_life() {
    let level = LevelFile {
        name: "pit".into(),
        player: ObjectDesc::new(ObjectKind::Player, [100.0, 80.0], [20.0, 20.0]),
        objects: Vec::new(),
        kill_y: 200.0,
    };
    let mut game = game_with(level, 1);
    game.start(GameStates::Running).unwrap();

    for _ in 0..240 {
        if game.state() != GameStates::Running {
            break;
        }
        idle(&mut game, 1);
    }

    assert_eq!(game.state(), GameStates::GameOver);
    assert_eq!(game.session().deaths, 1);
}

#[test]
fn reaching_the_goal_wins_and_returns_to_menu() {
    let goal = ObjectDesc::new(ObjectKind::Goal, [100.0, 80.0], [10.0, 10.0]);
    let mut game = game_with(level_with(vec![goal], 1000.0), 3);
    game.start(GameStates::Running).unwrap();

    idle(&mut game, 1);
    assert_eq!(game.state(), GameStates::GameOver);
    assert!(game.session().won);
    assert!(game.game_over().unwrap().won());

    let mut target = RecordingTarget::new();
    game.draw(&mut target);
    assert!(target.texts.iter().any(|(text, _)| text == "Level complete!"));

    down(&mut game, Key::Space);
    assert_eq!(game.state(), GameStates::MainMenu);
    up(&mut game, Key::Space);

    down(&mut game, Key::Escape);
    assert_eq!(game.state(), GameStates::Quitting);
    assert!(!game.is_running());
}

#[test]
fn screens_release_their_input_subscriptions() {
    let mut game = game_with(level_with(Vec::new(), 1000.0), 3);
    assert_eq!(game.input_events().subscriber_count(), 0);

    game.start(GameStates::MainMenu).unwrap();
    assert!(game.input_events().subscriber_count() > 0);

    // Quit from the main menu.
    down(&mut game, Key::Escape);
    assert_eq!(game.state(), GameStates::Quitting);
    assert_eq!(game.input_events().subscriber_count(), 0);
}

#[test]
fn restarting_from_the_menu_resets_the_session() {
    let power_up = ObjectDesc::new(ObjectKind::PowerUp, [100.0, 80.0], [10.0, 10.0]);
    let mut game = game_with(level_with(vec![power_up], 1000.0), 3);
    game.start(GameStates::Running).unwrap();
    idle(&mut game, 1);
    assert_eq!(game.session().score, 1);

    down(&mut game, Key::Escape);
    up(&mut game, Key::Escape);
    // Paused menu: move to "Main menu" and activate it.
    down(&mut game, Key::S);
    up(&mut game, Key::S);
    down(&mut game, Key::Space);
    assert_eq!(game.state(), GameStates::MainMenu);
    assert!(game.running().is_none());
    up(&mut game, Key::Space);

    game.request_state(GameStates::Running);
    idle(&mut game, 1);
    assert_eq!(game.state(), GameStates::Running);
    assert_eq!(game.session().lives, 3);
    // The power-up is back and was picked up again on the first tick.
    assert_eq!(game.session().score, 1);
}
