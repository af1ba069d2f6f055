//! The platformer screen.
//!
//! Input callbacks only record the player's intent. Each tick the screen
//! applies that intent to the player's body, steps the map, resolves
//! collisions, and then reacts to the trigger contacts the player's onCollide
//! subscription recorded during resolution:
//!
//! - power-up: the object is removed and the score goes up;
//! - death zone, or falling below the level's kill line: a life is lost and
//!   the level restarts, or the game ends when no lives are left;
//! - goal: the game ends as won.

use std::cell::RefCell;
use std::rc::Rc;

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, info};

use crate::components::objectkind::ObjectKind;
use crate::events::collision::CollisionEvent;
use crate::events::connections::ConnectionSet;
use crate::events::input::{InputAction, InputEvents};
use crate::events::source::EventConnection;
use crate::game::GameError;
use crate::level::{LevelError, LevelFile, build_map};
use crate::map::Map;
use crate::resources::assetstore::AssetStore;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::rendertarget::RenderTarget;
use crate::states::{ScreenContext, preload_textures};

/// What the player asked for since the last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub left: bool,
    pub right: bool,
    /// Set on press, consumed by the next tick.
    pub jump: bool,
}

impl PlayerIntent {
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

pub struct RunningScreen {
    map: Map,
    player: Entity,
    kill_y: f32,
    intent: Rc<RefCell<PlayerIntent>>,
    contacts: Rc<RefCell<Vec<CollisionEvent>>>,
    collide_connection: EventConnection,
    input_connections: ConnectionSet,
}

impl RunningScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Result<Self, GameError> {
        preload_textures(ctx.level, &[], ctx.textures)?;
        let contacts = Rc::new(RefCell::new(Vec::new()));
        let (map, player, collide_connection) = Self::spawn_level(ctx.level, ctx.config, &contacts)?;
        let mut screen = Self {
            map,
            player,
            kill_y: ctx.level.kill_y,
            intent: Rc::new(RefCell::new(PlayerIntent::default())),
            contacts,
            collide_connection,
            input_connections: ConnectionSet::new(),
        };
        screen.connect_input(ctx.events, ctx.next);
        info!("Running '{}' with {} lives", ctx.level.name, ctx.session.lives);
        Ok(screen)
    }

    fn spawn_level(
        level: &LevelFile,
        config: &GameConfig,
        contacts: &Rc<RefCell<Vec<CollisionEvent>>>,
    ) -> Result<(Map, Entity, EventConnection), GameError> {
        let map = build_map(level, config)?;
        let player = map.primary().ok_or(LevelError::MissingPlayer)?;
        let sink = Rc::clone(contacts);
        let connection = match map.on_collide(player) {
            Some(source) => source.connect(move |event: &CollisionEvent| sink.borrow_mut().push(*event)),
            None => EventConnection::default(),
        };
        Ok((map, player, connection))
    }

    fn connect_input(&mut self, events: &InputEvents, next: &NextGameState) {
        let intent = Rc::clone(&self.intent);
        let next = next.clone();
        self.input_connections
            .push(events.key_pressed.connect(move |action: &InputAction| {
                let mut intent = intent.borrow_mut();
                match action.horizontal() {
                    Some(x) if x < 0.0 => intent.left = true,
                    Some(_) => intent.right = true,
                    None => match action {
                        InputAction::Action1 | InputAction::MainDirectionUp => intent.jump = true,
                        InputAction::Back => next.set(GameStates::Paused),
                        _ => {}
                    },
                }
            }));

        let intent = Rc::clone(&self.intent);
        self.input_connections
            .push(events.key_released.connect(move |action: &InputAction| {
                let mut intent = intent.borrow_mut();
                match action.horizontal() {
                    Some(x) if x < 0.0 => intent.left = false,
                    Some(_) => intent.right = false,
                    None => {}
                }
            }));
    }

    /// Stop listening to input but keep the level as it is.
    pub fn suspend(&mut self) {
        self.input_connections.disconnect_all();
        *self.intent.borrow_mut() = PlayerIntent::default();
        debug!("Running screen suspended");
    }

    pub fn resume(&mut self, ctx: &mut ScreenContext<'_>) {
        self.connect_input(ctx.events, ctx.next);
        debug!("Running screen resumed");
    }

    pub fn update(&mut self, ctx: &mut ScreenContext<'_>, dt: f32) -> Result<(), GameError> {
        self.apply_intent(ctx.config);
        self.map.update(dt);
        self.contacts.borrow_mut().clear();
        self.map.resolve()?;

        let contacts: Vec<CollisionEvent> = self.contacts.borrow_mut().drain(..).collect();
        let mut died = false;
        let mut won = false;
        for contact in contacts.iter().filter(|c| !c.solid) {
            match contact.other_kind {
                ObjectKind::PowerUp => {
                    if self.map.remove_object(contact.other) {
                        ctx.session.score += 1;
                        info!("Power-up collected, score {}", ctx.session.score);
                    }
                }
                ObjectKind::DeathZone => died = true,
                ObjectKind::Goal => won = true,
                _ => {}
            }
        }
        if self
            .map
            .position(self.player)
            .is_some_and(|position| position.y > self.kill_y)
        {
            died = true;
        }

        if won {
            ctx.session.won = true;
            ctx.next.set(GameStates::GameOver);
        } else if died {
            self.lose_life(ctx)?;
        }
        Ok(())
    }

    fn apply_intent(&mut self, config: &GameConfig) {
        let (direction, jump) = {
            let mut intent = self.intent.borrow_mut();
            let jump = std::mem::take(&mut intent.jump);
            (intent.horizontal(), jump)
        };
        if let Some(mut body) = self.map.body_mut(self.player) {
            body.velocity.x = direction * config.player_speed;
            // Landing zeroed the vertical velocity, so the impulse is the jump speed.
            if jump && body.is_grounded() {
                body.apply_force(Vec2::new(0.0, -config.jump_speed));
                debug!("Jump");
            }
        }
    }

    fn lose_life(&mut self, ctx: &mut ScreenContext<'_>) -> Result<(), GameError> {
        ctx.session.deaths += 1;
        ctx.session.lives = ctx.session.lives.saturating_sub(1);
        if ctx.session.lives == 0 {
            info!("Out of lives");
            ctx.session.won = false;
            ctx.next.set(GameStates::GameOver);
            return Ok(());
        }
        info!("Lost a life, {} left", ctx.session.lives);
        let (map, player, connection) = Self::spawn_level(ctx.level, ctx.config, &self.contacts)?;
        self.map = map;
        self.player = player;
        self.collide_connection = connection;
        Ok(())
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.map.position(self.player)
    }

    pub fn is_listening(&self) -> bool {
        !self.input_connections.is_empty() && self.collide_connection.is_connected()
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, textures: &AssetStore<Vec<u8>>, score: u32, lives: u32) {
        self.map.draw(target, textures);
        target.draw_text(&format!("Score: {score}  Lives: {lives}"), Vec2::new(16.0, 16.0), false);
    }
}
