//! Game loop driver.
//!
//! [`Game`] owns the input context, the current [`GameState`] and whichever
//! screens are alive. One call to [`Game::tick`] is one frame:
//!
//! 1. raw input is applied to [`InputState`] and fired on [`InputEvents`];
//! 2. transitions requested by input callbacks are applied;
//! 3. the current screen updates;
//! 4. transitions requested by the update are applied.
//!
//! A transition runs the exit hook of the old state, then the enter hook of
//! the new one, then fires [`Game::state_changed`].

use log::{debug, info, warn};
use thiserror::Error;

use crate::events::gamestate::GameStateChangedEvent;
use crate::events::input::{InputEvents, RawInput};
use crate::events::source::EventSource;
use crate::level::{LevelError, LevelFile};
use crate::map::Map;
use crate::resources::assetstore::{AssetError, AssetStore, FileLoader};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{GameState, GameStates, NextGameState};
use crate::resources::input::InputState;
use crate::resources::rendertarget::RenderTarget;
use crate::states::cutscene::CutsceneScreen;
use crate::states::editor::EditorScreen;
use crate::states::gameover::GameOverScreen;
use crate::states::mainmenu::MainMenuScreen;
use crate::states::paused::PausedScreen;
use crate::states::running::RunningScreen;
use crate::states::{ScreenContext, Session};
use crate::systems::collision::CollisionError;
use crate::systems::gamestate::apply_pending_state;
use crate::systems::input::update_input_state;

/// Upper bound on transitions applied back to back in one step.
const MAX_CHAINED_TRANSITIONS: usize = 8;

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Collision(#[from] CollisionError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Build a [`ScreenContext`] from disjoint fields of a [`Game`], so the
/// screens can be borrowed at the same time.
macro_rules! screen_context {
    ($game:ident) => {
        ScreenContext {
            events: &$game.events,
            config: &$game.config,
            next: &$game.next,
            session: &mut $game.session,
            level: &mut $game.level,
            textures: &mut $game.textures,
        }
    };
}

pub struct Game {
    config: GameConfig,
    events: InputEvents,
    input: InputState,
    state: GameState,
    next: NextGameState,
    session: Session,
    level: LevelFile,
    textures: AssetStore<Vec<u8>>,
    main_menu: Option<MainMenuScreen>,
    cutscene: Option<CutsceneScreen>,
    running: Option<RunningScreen>,
    paused: Option<PausedScreen>,
    game_over: Option<GameOverScreen>,
    editor: Option<EditorScreen>,
    ticks: u64,
    /// Fired after every completed transition.
    pub state_changed: EventSource<GameStateChangedEvent>,
}

impl Game {
    pub fn new(config: GameConfig, level: LevelFile) -> Self {
        let session = Session::new(config.lives);
        Self {
            config,
            events: InputEvents::new(),
            input: InputState::default(),
            state: GameState::new(),
            next: NextGameState::new(),
            session,
            level,
            textures: AssetStore::new(FileLoader::new("assets/textures")),
            main_menu: None,
            cutscene: None,
            running: None,
            paused: None,
            game_over: None,
            editor: None,
            ticks: 0,
            state_changed: EventSource::new(),
        }
    }

    /// Replace the texture store, e.g. to load from another directory.
    /// Textures are loaded when the running screen or the editor is entered,
    /// and a missing file fails that transition with [`GameError::Asset`].
    pub fn with_textures(mut self, textures: AssetStore<Vec<u8>>) -> Self {
        self.textures = textures;
        self
    }

    /// Enter `initial` immediately.
    pub fn start(&mut self, initial: GameStates) -> Result<(), GameError> {
        self.next.set(initial);
        self.apply_transitions()
    }

    /// Request a transition, applied during the next tick.
    pub fn request_state(&self, state: GameStates) {
        self.next.set(state);
    }

    /// Advance one frame of `dt` seconds with the given raw input.
    pub fn tick(&mut self, dt: f32, frame: &[RawInput]) -> Result<(), GameError> {
        update_input_state(&mut self.input, frame, &self.events);
        self.apply_transitions()?;
        self.update_current(dt)?;
        self.apply_transitions()?;
        self.ticks += 1;
        Ok(())
    }

    fn update_current(&mut self, dt: f32) -> Result<(), GameError> {
        let mut ctx = screen_context!(self);
        match self.state.get() {
            GameStates::Cutscene => {
                if let Some(cutscene) = self.cutscene.as_mut() {
                    cutscene.update(&mut ctx, dt);
                }
            }
            GameStates::Running => {
                if let Some(running) = self.running.as_mut() {
                    running.update(&mut ctx, dt)?;
                }
            }
            GameStates::Editor => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.update(&mut ctx)?;
                }
            }
            GameStates::None
            | GameStates::MainMenu
            | GameStates::Paused
            | GameStates::GameOver
            | GameStates::Quitting => {}
        }
        Ok(())
    }

    fn apply_transitions(&mut self) -> Result<(), GameError> {
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            let Some(change) = apply_pending_state(&mut self.state, &self.next) else {
                return Ok(());
            };
            self.on_state_exit(change.from, change.to);
            self.on_state_enter(change.to, change.from)?;
            self.state_changed.fire(&change);
        }
        warn!("Game: stopped after {} chained transitions", MAX_CHAINED_TRANSITIONS);
        Ok(())
    }

    fn on_state_exit(&mut self, state: GameStates, to: GameStates) {
        debug!("Exiting {:?}", state);
        match state {
            GameStates::MainMenu => self.main_menu = None,
            GameStates::Cutscene => self.cutscene = None,
            GameStates::Running => {
                if to == GameStates::Paused {
                    if let Some(running) = self.running.as_mut() {
                        running.suspend();
                    }
                } else {
                    self.running = None;
                }
            }
            GameStates::Paused => {
                self.paused = None;
                if to != GameStates::Running {
                    self.running = None;
                }
            }
            GameStates::GameOver => self.game_over = None,
            GameStates::Editor => self.editor = None,
            GameStates::None | GameStates::Quitting => {}
        }
    }

    fn on_state_enter(&mut self, state: GameStates, from: GameStates) -> Result<(), GameError> {
        debug!("Entering {:?}", state);
        let mut ctx = screen_context!(self);
        match state {
            GameStates::MainMenu => self.main_menu = Some(MainMenuScreen::enter(&mut ctx)),
            GameStates::Cutscene => self.cutscene = Some(CutsceneScreen::enter(&mut ctx)),
            GameStates::Running => {
                let resumed = match self.running.as_mut() {
                    Some(running) if from == GameStates::Paused => {
                        running.resume(&mut ctx);
                        true
                    }
                    _ => false,
                };
                if !resumed {
                    ctx.session.reset(ctx.config.lives);
                    self.running = Some(RunningScreen::enter(&mut ctx)?);
                }
            }
            GameStates::Paused => self.paused = Some(PausedScreen::enter(&mut ctx)),
            GameStates::GameOver => self.game_over = Some(GameOverScreen::enter(&mut ctx)),
            GameStates::Editor => self.editor = Some(EditorScreen::enter(&mut ctx)?),
            GameStates::Quitting => info!("Quitting after {} ticks", self.ticks),
            GameStates::None => {}
        }
        Ok(())
    }

    /// Draw the current screen.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        target.clear();
        match self.state.get() {
            GameStates::MainMenu => {
                if let Some(menu) = &self.main_menu {
                    menu.draw(target);
                }
            }
            GameStates::Cutscene => {
                if let Some(cutscene) = &self.cutscene {
                    cutscene.draw(target);
                }
            }
            GameStates::Running | GameStates::Paused => {
                if let Some(running) = &self.running {
                    running.draw(target, &self.textures, self.session.score, self.session.lives);
                }
                if let Some(paused) = &self.paused {
                    paused.draw(target);
                }
            }
            GameStates::GameOver => {
                if let Some(game_over) = &self.game_over {
                    game_over.draw(target);
                }
            }
            GameStates::Editor => {
                if let Some(editor) = &self.editor {
                    editor.draw(target, &self.textures);
                }
            }
            GameStates::None | GameStates::Quitting => {}
        }
    }

    pub fn state(&self) -> GameStates {
        self.state.get()
    }

    /// False once the game has reached [`GameStates::Quitting`].
    pub fn is_running(&self) -> bool {
        self.state.get() != GameStates::Quitting
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelFile {
        &self.level
    }

    pub fn input_events(&self) -> &InputEvents {
        &self.events
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn textures(&self) -> &AssetStore<Vec<u8>> {
        &self.textures
    }

    pub fn main_menu(&self) -> Option<&MainMenuScreen> {
        self.main_menu.as_ref()
    }

    pub fn running(&self) -> Option<&RunningScreen> {
        self.running.as_ref()
    }

    /// The map of the running screen, also while paused.
    pub fn running_map(&self) -> Option<&Map> {
        self.running.as_ref().map(RunningScreen::map)
    }

    pub fn game_over(&self) -> Option<&GameOverScreen> {
        self.game_over.as_ref()
    }

    pub fn editor(&self) -> Option<&EditorScreen> {
        self.editor.as_ref()
    }

    pub fn cutscene(&self) -> Option<&CutsceneScreen> {
        self.cutscene.as_ref()
    }
}
