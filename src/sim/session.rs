//! Game session
//!
//! One `GameSession` owns everything a run needs: the tier catalog, the live
//! bodies, the physics provider, the drop cycle, merge resolution, game-over
//! detection, score and the preference store. Hosts construct it explicitly
//! and drive it with two clocks:
//! - `update(input, dt)` once per frame (input, cooldown, game-over timer)
//! - `fixed_step(dt)` at the fixed physics rate (integration, merges)
//!
//! Nothing calls out to rendering, audio or UI; the session queues
//! `GameEvent`s and the host drains them.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{Body, BodyId, BodyMode};
use super::catalog::{TierCatalog, TierPool};
use super::container::Container;
use super::drop::DropController;
use super::events::{EventQueue, GameEvent};
use super::merge::{MergeOutcome, MergeResolver};
use super::monitor::GameOverMonitor;
use super::physics::{ContactPair, PhysicsProvider};
use super::state::RunState;
use super::tick::FrameInput;
use crate::consts::{HIGH_SCORE_KEY, LAST_NICKNAME_KEY};
use crate::leaderboard::LeaderboardClient;
use crate::persistence::KeyValueStore;
use crate::settings::normalize_nickname;
use crate::tuning::GameTuning;

pub struct GameSession<P: PhysicsProvider> {
    tuning: GameTuning,
    container: Container,
    physics: P,
    store: Box<dyn KeyValueStore>,
    seed: u64,
    rng: Pcg32,
    catalog: TierCatalog,
    /// Live bodies by id (iteration order = creation order)
    bodies: BTreeMap<BodyId, Body>,
    drop: DropController,
    resolver: MergeResolver,
    monitor: GameOverMonitor,
    run: RunState,
    events: EventQueue,
    next_id: u32,
}

impl<P: PhysicsProvider> GameSession<P> {
    /// Build a session and start the first run
    pub fn new(tuning: GameTuning, pool: TierPool, physics: P, store: Box<dyn KeyValueStore>, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let catalog = TierCatalog::new(pool, tuning.catalog.clone(), &mut rng);
        let run = RunState::load(store.as_ref());

        let mut session = Self {
            container: Container::from_tuning(&tuning),
            drop: DropController::new(&tuning),
            monitor: GameOverMonitor::new(tuning.game_over_line_y, tuning.game_over_delay),
            resolver: MergeResolver::new(),
            events: EventQueue::new(),
            bodies: BTreeMap::new(),
            next_id: 1,
            tuning,
            physics,
            store,
            seed,
            rng,
            catalog,
            run,
        };
        session.physics.set_time_scale(1.0);
        session.start_run();
        log::info!("Session started (seed {})", seed);
        session
    }

    // === Accessors ===

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn drop_controller(&self) -> &DropController {
        &self.drop
    }

    pub fn resolver(&self) -> &MergeResolver {
        &self.resolver
    }

    pub fn monitor(&self) -> &GameOverMonitor {
        &self.monitor
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn score(&self) -> u64 {
        self.run.score()
    }

    pub fn high_score(&self) -> u64 {
        self.run.high_score()
    }

    pub fn is_game_over(&self) -> bool {
        self.run.is_game_over()
    }

    pub fn is_paused(&self) -> bool {
        self.run.is_paused()
    }

    /// Accepting gameplay input
    pub fn is_live(&self) -> bool {
        !self.run.is_game_over() && !self.run.is_paused()
    }

    /// Tier shown in the next-preview
    pub fn next_tier(&self) -> usize {
        self.drop.next_tier()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// The body currently held for aiming
    pub fn aiming_body(&self) -> Option<&Body> {
        self.drop.aiming().and_then(|id| self.bodies.get(&id))
    }

    /// Nickname of the last submission (empty if none)
    pub fn last_nickname(&self) -> String {
        self.store.get_string(LAST_NICKNAME_KEY, "")
    }

    /// Take queued notifications in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        self.events.pending()
    }

    // === Clocks ===

    /// Per-frame update: commands, pointer, drop cooldown, game-over timer
    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        if input.restart {
            self.soft_restart();
        }
        if input.toggle_pause {
            self.set_paused(!self.run.is_paused());
        }
        if input.reroll {
            self.reroll_characters();
        }
        if input.debug_max_merge {
            self.trigger_max_merge_celebration();
        }

        if self.is_live() {
            if let Some(x) = input.pointer_x {
                self.pointer_move(x, input.pointer_over_ui);
            }
            if input.pointer_pressed {
                self.pointer_press(input.pointer_over_ui);
            }
            if input.pointer_released {
                self.pointer_release(input.pointer_over_ui);
            }
        }

        let dt = dt * self.physics.time_scale();
        if self.drop.tick(dt) {
            self.spawn_aiming();
        }
        if self.is_live() && self.monitor.tick(self.bodies.values(), dt) {
            self.trigger_game_over();
        }
    }

    /// One physics step: integrate, resolve contacts, flush merged bodies
    pub fn fixed_step(&mut self, dt: f32) {
        let contacts = self.physics.step(dt);
        self.sync_from_physics();
        self.handle_contacts(&contacts);
        self.flush_merged();
    }

    fn sync_from_physics(&mut self) {
        let max_velocity = self.tuning.max_velocity;
        for body in self.bodies.values_mut() {
            if body.mode != BodyMode::Dynamic {
                continue;
            }
            if let Some(pos) = self.physics.position(body.id) {
                body.pos = pos;
            }
            if let Some(vel) = self.physics.velocity(body.id) {
                body.vel = vel;
            }
            if let Some(vel) = body.clamp_velocity(max_velocity) {
                self.physics.set_velocity(body.id, vel);
            }
        }
    }

    /// Run every contact of a step through the merge resolver
    ///
    /// Returns how many merges happened. Consumed bodies stay in place
    /// (tombstoned) until the step flushes them.
    pub fn handle_contacts(&mut self, contacts: &[ContactPair]) -> usize {
        let mut merges = 0;
        for &contact in contacts {
            let outcome = self
                .resolver
                .on_collision(&mut self.bodies, contact, &self.catalog, &self.container);
            if let Some(outcome) = outcome {
                self.apply_merge(outcome);
                merges += 1;
            }
        }
        merges
    }

    fn apply_merge(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::TierUp {
                tier,
                position,
                radius,
                score,
                ..
            } => {
                self.spawn_settled(tier, position);
                self.events.push(GameEvent::Merged {
                    tier,
                    position,
                    radius,
                });
                self.add_score(score);
            }
            MergeOutcome::MaxMerge { position, bonus, .. } => {
                self.celebrate(position, bonus);
            }
        }
    }

    /// Remove tombstoned bodies from the world
    fn flush_merged(&mut self) {
        let dead: Vec<BodyId> = self
            .bodies
            .values()
            .filter(|b| b.has_merged)
            .map(|b| b.id)
            .collect();
        for id in dead {
            self.bodies.remove(&id);
            self.physics.remove_body(id);
        }
    }

    // === Bodies ===

    fn alloc_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Draw the tier after the one about to spawn
    fn prepare_next_drop(&mut self) {
        let tier = self.catalog.random_drop_tier(&mut self.rng);
        self.drop.set_next_tier(tier);
        self.events.push(GameEvent::NextTierChanged { tier });
    }

    /// Spawn the previewed tier at the lane and start aiming it
    fn spawn_aiming(&mut self) -> Option<BodyId> {
        if self.run.is_game_over() {
            return None;
        }
        let tier = self.drop.next_tier();
        let radius = self.catalog.radius(tier)?;
        let id = self.alloc_id();
        let body = Body::aiming(id, tier, radius, self.drop.rest_position());

        self.physics
            .add_body(id, body.pos, radius, body.mass(), BodyMode::Kinematic);
        self.bodies.insert(id, body);
        self.drop.begin_aiming(id);
        self.prepare_next_drop();
        log::debug!("Aiming {:?} at tier {}", id, tier);
        Some(id)
    }

    /// Place a released body at rest (merge product, or a scripted setup)
    pub fn spawn_settled(&mut self, tier: usize, pos: Vec2) -> Option<BodyId> {
        let radius = self.catalog.radius(tier)?;
        let id = self.alloc_id();
        let body = Body::settled(id, tier, radius, pos);

        self.physics
            .add_body(id, pos, radius, body.mass(), BodyMode::Dynamic);
        self.physics.set_velocity(id, Vec2::ZERO);
        self.bodies.insert(id, body);
        Some(id)
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
        self.physics.remove_body(id);
    }

    fn clear_bodies(&mut self) {
        self.bodies.clear();
        self.physics.clear();
    }

    // === Pointer ===

    /// Aim the held body at a world X
    pub fn pointer_move(&mut self, world_x: f32, over_ui: bool) {
        if !self.is_live() {
            return;
        }
        if let Some((id, pos)) = self.drop.on_pointer_move(world_x, over_ui) {
            self.physics.set_position(id, pos);
            if let Some(body) = self.bodies.get_mut(&id) {
                body.pos = pos;
            }
        }
    }

    pub fn pointer_press(&mut self, over_ui: bool) -> bool {
        self.is_live() && self.drop.on_pointer_press(over_ui)
    }

    /// Release the held body into the container
    pub fn pointer_release(&mut self, over_ui: bool) -> Option<BodyId> {
        if !self.is_live() {
            return None;
        }
        let id = self.drop.on_pointer_release(over_ui)?;
        let body = self.bodies.get_mut(&id)?;
        body.drop_now();
        let tier = body.tier();

        self.physics.set_mode(id, BodyMode::Dynamic);
        self.physics.set_velocity(id, Vec2::ZERO);
        self.run.mark_dropped();
        self.events.push(GameEvent::Dropped { tier });
        log::debug!("Dropped {:?} (tier {})", id, tier);
        Some(id)
    }

    // === Run operations ===

    /// Emit the start-of-run notifications and spawn the first body
    fn start_run(&mut self) {
        self.events.push(GameEvent::TiersSelected);
        self.events.push(GameEvent::HighScoreChanged {
            score: self.run.high_score(),
        });
        self.events.push(GameEvent::ScoreChanged {
            score: self.run.score(),
        });
        self.prepare_next_drop();
        self.spawn_aiming();
    }

    /// Add points, persisting the high score when it is passed
    pub fn add_score(&mut self, points: u64) {
        let update = self.run.add_score(points);
        self.events.push(GameEvent::ScoreChanged { score: update.score });
        if let Some(high) = update.new_high_score {
            self.store.set_int(HIGH_SCORE_KEY, high as i64);
            self.store.save();
            self.events.push(GameEvent::HighScoreChanged { score: high });
        }
    }

    fn celebrate(&mut self, position: Vec2, bonus: u64) {
        self.add_score(bonus);
        self.events.push(GameEvent::MaxMerge { position });
    }

    /// End the run: freeze input, stop time; false if already over
    pub fn trigger_game_over(&mut self) -> bool {
        if !self.run.mark_game_over() {
            return false;
        }
        self.physics.set_time_scale(0.0);
        self.drop.set_frozen(true);
        self.events.push(GameEvent::GameOver {
            score: self.run.score(),
        });
        log::info!("Game over: score {} (best {})", self.run.score(), self.run.high_score());
        true
    }

    /// Pause or resume; ignored once the run is over
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if !self.run.set_paused(paused) {
            return false;
        }
        self.physics.set_time_scale(if paused { 0.0 } else { 1.0 });
        self.drop.set_frozen(paused);
        log::debug!("Paused: {}", paused);
        true
    }

    /// Draw a new ladder; only before the first drop of a live run
    pub fn reroll_characters(&mut self) -> bool {
        if self.run.has_dropped_any() || self.run.is_game_over() {
            return false;
        }
        if let Some(id) = self.drop.aiming() {
            self.remove_body(id);
        }
        self.drop.cancel();
        self.catalog.select_random_subset(&mut self.rng);
        self.events.push(GameEvent::TiersSelected);
        self.prepare_next_drop();
        self.spawn_aiming();
        log::info!("Rerolled tiers");
        true
    }

    /// Start a new run in place; safe at any time
    pub fn soft_restart(&mut self) {
        self.clear_bodies();
        self.run.reset_run();
        self.resolver.reset();
        self.monitor.reset();
        self.drop.reset();
        self.physics.set_time_scale(1.0);
        self.catalog.select_random_subset(&mut self.rng);
        self.start_run();
        log::info!("Soft restart");
    }

    /// Rebuild everything from tuning and the persisted store
    ///
    /// The physics provider is reconfigured with the tuned bounds and
    /// gravity. Undrained events stay queued ahead of the new run's.
    pub fn hard_restart(&mut self) {
        self.clear_bodies();
        let pool = self.catalog.pool().clone();
        self.catalog = TierCatalog::new(pool, self.tuning.catalog.clone(), &mut self.rng);
        self.container = Container::from_tuning(&self.tuning);
        self.physics.reconfigure(self.container, self.tuning.gravity);
        self.drop = DropController::new(&self.tuning);
        self.monitor = GameOverMonitor::new(self.tuning.game_over_line_y, self.tuning.game_over_delay);
        self.resolver = MergeResolver::new();
        self.run = RunState::load(self.store.as_ref());
        self.next_id = 1;
        self.physics.set_time_scale(1.0);
        self.start_run();
        log::info!("Hard restart");
    }

    /// Swap in new tuning and rebuild
    pub fn replace_tuning(&mut self, tuning: GameTuning) {
        self.tuning = tuning.sanitized();
        self.hard_restart();
    }

    /// Debug: award the max-merge bonus and celebrate at the origin
    pub fn trigger_max_merge_celebration(&mut self) {
        if self.run.is_game_over() {
            return;
        }
        self.celebrate(Vec2::ZERO, self.catalog.max_merge_bonus());
    }

    /// Submit the finished run's score under a nickname
    ///
    /// Remembers the nickname (blank becomes anonymous). Returns false when
    /// the run is still going or the client refused the request.
    pub fn submit_final_score(
        &mut self,
        client: &mut LeaderboardClient,
        nickname: &str,
        on_done: impl FnOnce(bool) + 'static,
    ) -> bool {
        if !self.run.is_game_over() {
            return false;
        }
        let name = normalize_nickname(nickname);
        self.store.set_string(LAST_NICKNAME_KEY, &name);
        self.store.save();
        client.submit(&name, self.run.score(), on_done)
    }
}
