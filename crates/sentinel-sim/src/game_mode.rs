//! Wave-progression state machine.
//!
//! setup -> countdown -> active -> wave_complete -> (countdown | victory),
//! with defeat preempting whenever every friendly combatant is gone.
//! Stored on the engine, not as ECS entities.

use std::collections::BTreeSet;

use sentinel_core::enums::{GameState, TargetStatus, ThreatLevel};
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::events::SimEvent;
use sentinel_core::state::GameView;

use crate::config::{GameConfig, WaveConfig};

/// Running score tracked across all waves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub eliminations: u32,
    pub escaped: u32,
    pub wave_eliminations: u32,
    pub wave_escaped: u32,
}

#[derive(Debug, Clone)]
pub struct GameMode {
    config: GameConfig,
    state: GameState,
    wave_index: usize,
    state_timer: f64,
    tracked: BTreeSet<String>,
    score: Score,
    had_friendlies: bool,
}

impl GameMode {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: GameState::Setup,
            wave_index: 0,
            state_timer: 0.0,
            tracked: BTreeSet::new(),
            score: Score::default(),
            had_friendlies: false,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// 1-based number of the current wave; 0 before the war begins.
    pub fn wave_number(&self) -> usize {
        if self.state == GameState::Setup {
            0
        } else {
            self.wave_index + 1
        }
    }

    pub fn current_wave(&self) -> Option<&WaveConfig> {
        if self.state == GameState::Setup {
            None
        } else {
            self.config.waves.get(self.wave_index)
        }
    }

    pub fn tracked(&self) -> &BTreeSet<String> {
        &self.tracked
    }

    pub fn begin_war(&mut self, friendly_count: usize, events: &mut Vec<SimEvent>) -> SimResult<()> {
        if self.state != GameState::Setup {
            return Err(SimError::InvalidTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", GameState::Countdown),
            });
        }
        self.had_friendlies = friendly_count > 0;
        self.wave_index = 0;
        self.state_timer = 0.0;
        self.score = Score::default();
        if self.config.waves.is_empty() {
            self.finish(true, events);
        } else {
            self.state = GameState::Countdown;
            tracing::info!(waves = self.config.waves.len(), "war begins");
        }
        Ok(())
    }

    /// Advance timers. Returns the wave to spawn when a countdown ends; the
    /// caller spawns it and hands the ids to [`GameMode::start_wave`].
    pub fn update(
        &mut self,
        dt: f64,
        friendly_alive: usize,
        events: &mut Vec<SimEvent>,
    ) -> Option<WaveConfig> {
        if matches!(self.state, GameState::Active | GameState::WaveComplete)
            && self.had_friendlies
            && friendly_alive == 0
        {
            self.finish(false, events);
            return None;
        }

        match self.state {
            GameState::Countdown => {
                self.state_timer += dt;
                if self.state_timer >= self.config.countdown_secs {
                    self.state = GameState::Active;
                    self.state_timer = 0.0;
                    self.score.wave_eliminations = 0;
                    self.score.wave_escaped = 0;
                    return self.config.waves.get(self.wave_index).cloned();
                }
            }
            GameState::Active => {
                if self.tracked.is_empty() {
                    self.state = GameState::WaveComplete;
                    self.state_timer = 0.0;
                    tracing::info!(
                        wave = self.wave_number(),
                        eliminations = self.score.wave_eliminations,
                        escaped = self.score.wave_escaped,
                        "wave complete"
                    );
                    events.push(SimEvent::WaveComplete {
                        wave: self.wave_number(),
                        eliminations: self.score.wave_eliminations,
                        escaped: self.score.wave_escaped,
                    });
                }
            }
            GameState::WaveComplete => {
                self.state_timer += dt;
                if self.state_timer >= self.config.wave_pause_secs {
                    if self.wave_index + 1 < self.config.waves.len() {
                        self.wave_index += 1;
                        self.state = GameState::Countdown;
                        self.state_timer = 0.0;
                    } else {
                        self.finish(true, events);
                    }
                }
            }
            GameState::Setup | GameState::Victory | GameState::Defeat => {}
        }
        None
    }

    /// Record the ids spawned for the current wave.
    pub fn start_wave(&mut self, ids: Vec<String>, events: &mut Vec<SimEvent>) {
        let name = self
            .current_wave()
            .map(|w| w.name.clone())
            .unwrap_or_default();
        let hostile_count = ids.len() as u32;
        self.tracked = ids.into_iter().collect();
        tracing::info!(wave = self.wave_number(), %name, hostile_count, "wave start");
        events.push(SimEvent::WaveStart {
            wave: self.wave_number(),
            name,
            hostile_count,
        });
    }

    /// A target left the registry. Tracked hostiles count toward the score.
    pub fn record_removal(&mut self, id: &str, status: TargetStatus) {
        if !self.tracked.remove(id) {
            return;
        }
        match status {
            TargetStatus::Eliminated => {
                self.score.eliminations += 1;
                self.score.wave_eliminations += 1;
            }
            TargetStatus::Escaped => {
                self.score.escaped += 1;
                self.score.wave_escaped += 1;
            }
            _ => {}
        }
    }

    fn finish(&mut self, victory: bool, events: &mut Vec<SimEvent>) {
        self.state = if victory {
            GameState::Victory
        } else {
            GameState::Defeat
        };
        let waves_completed = if victory {
            self.config.waves.len()
        } else {
            self.wave_index
        };
        tracing::info!(victory, waves_completed, eliminations = self.score.eliminations, "game over");
        events.push(SimEvent::GameOver {
            victory,
            waves_completed,
            eliminations: self.score.eliminations,
        });
    }

    pub fn view(&self, hostiles_remaining: usize, threat_level: ThreatLevel) -> GameView {
        GameView {
            state: self.state,
            wave: self.wave_number(),
            total_waves: self.config.waves.len(),
            wave_name: self.current_wave().map(|w| w.name.clone()),
            eliminations: self.score.eliminations,
            escaped: self.score.escaped,
            hostiles_remaining,
            threat_level,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
