use std::f32::consts::TAU;

use rand::Rng;

use super::pool::Poolable;
use super::vector::Vector2;
use crate::clock::elapsed_secs;
use crate::surface::{Rgb, Surface};

/// Opacity every spark is drawn with.
pub const SPARK_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
struct Spark {
    origin: Vector2,
    direction: Vector2,
}

/// Radial burst of sparks flying out from a point over `time_range` seconds.
#[derive(Debug, Clone)]
pub struct ParticleBurst {
    radius: f32,
    spark_size: f32,
    time_range: f32,
    color: Rgb,
    active: bool,
    /// Expired on the last update; drawn once more at full radius.
    finished: bool,
    start_time: u64,
    progress: f32,
    sparks: Vec<Spark>,
}

impl ParticleBurst {
    pub fn new(radius: f32, spark_count: usize, spark_size: f32, time_range: f32, color: Rgb) -> Self {
        Self {
            radius,
            spark_size,
            time_range,
            color,
            active: false,
            finished: false,
            start_time: 0,
            progress: 0.0,
            sparks: vec![Spark::default(); spark_count],
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn spark_count(&self) -> usize {
        self.sparks.len()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Where the current burst started, if it is running.
    pub fn origin(&self) -> Option<Vector2> {
        self.active
            .then(|| self.sparks.first().map(|spark| spark.origin))
            .flatten()
    }

    /// Starts (or restarts) the burst at `at`, re-rolling every spark heading.
    pub fn activate<R: Rng + ?Sized>(&mut self, at: Vector2, now: u64, rng: &mut R) {
        for spark in &mut self.sparks {
            spark.origin = at;
            spark.direction = Vector2::from_angle(rng.random_range(0.0..TAU));
        }
        self.active = true;
        self.finished = false;
        self.start_time = now;
        self.progress = 0.0;
    }

    /// `min(elapsed / time_range, 1)`, never negative.
    pub fn progress_at(&self, now: u64) -> f32 {
        if self.time_range <= 0.0 {
            return 1.0;
        }
        (elapsed_secs(self.start_time, now) / self.time_range).clamp(0.0, 1.0)
    }

    pub fn update(&mut self, now: u64) {
        if !self.active {
            self.finished = false;
            return;
        }
        self.progress = self.progress_at(now);
        if self.progress >= 1.0 {
            self.active = false;
            self.finished = true;
        }
    }

    /// Spark centers at the current progress.
    pub fn spark_positions(&self) -> impl Iterator<Item = Vector2> + '_ {
        let distance = self.radius * self.progress;
        self.sparks
            .iter()
            .map(move |spark| spark.origin + spark.direction * distance)
    }

    /// Draws the sparks, including the frame on which the burst expired.
    pub fn draw(&self, surface: &mut dyn Surface) {
        if !self.active && !self.finished {
            return;
        }
        for position in self.spark_positions() {
            surface.fill_square(position.x, position.y, self.spark_size, self.color, SPARK_ALPHA);
        }
    }
}

impl Poolable for ParticleBurst {
    fn is_free(&self) -> bool {
        !self.active
    }
}
