//! Hero carousel: pointer-driven slide navigation plus an auto-advance timer.
//!
//! [`Carousel`] is the pure state machine and takes elapsed time as input.
//! [`CarouselController`] shares it with a driver task that feeds it real time.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex, Notify},
    task::JoinHandle,
    time::Instant,
};
use tracing::debug;

use crate::events::CatalogEvent;

/// Minimum horizontal travel, in pixels, for a drag to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 50.0;
pub const AUTO_ADVANCE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselState {
    Idle {
        active_index: usize,
    },
    Dragging {
        active_index: usize,
        start_x: f64,
        delta_x: f64,
    },
}

impl CarouselState {
    pub fn active_index(&self) -> usize {
        match *self {
            Self::Idle { active_index } | Self::Dragging { active_index, .. } => active_index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Carousel {
    state: CarouselState,
    len: usize,
    idle_elapsed: Duration,
    timer_epoch: u64,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            state: CarouselState::Idle { active_index: 0 },
            len,
            idle_elapsed: Duration::ZERO,
            timer_epoch: 0,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn active_index(&self) -> usize {
        self.state.active_index()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, CarouselState::Dragging { .. })
    }

    /// Bumped whenever the auto-advance countdown restarts or is suspended.
    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    pub fn pointer_down(&mut self, x: f64) {
        self.state = CarouselState::Dragging {
            active_index: self.active_index(),
            start_x: x,
            delta_x: 0.0,
        };
        self.restart_timer();
    }

    pub fn pointer_move(&mut self, x: f64) {
        if let CarouselState::Dragging {
            start_x, delta_x, ..
        } = &mut self.state
        {
            *delta_x = x - *start_x;
        }
    }

    /// Ends a drag. Dragging left advances, dragging right retreats.
    pub fn pointer_up(&mut self) {
        let CarouselState::Dragging {
            active_index,
            delta_x,
            ..
        } = self.state
        else {
            return;
        };
        let active_index = if delta_x < -SWIPE_THRESHOLD {
            self.step_forward(active_index)
        } else if delta_x > SWIPE_THRESHOLD {
            self.step_back(active_index)
        } else {
            active_index
        };
        self.state = CarouselState::Idle { active_index };
        self.restart_timer();
    }

    /// Jumps straight to `index`, abandoning any drag in progress.
    pub fn select(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        if self.is_dragging() {
            self.restart_timer();
        }
        self.state = CarouselState::Idle {
            active_index: index,
        };
    }

    pub fn next(&mut self) {
        let index = self.step_forward(self.active_index());
        self.select(index);
    }

    pub fn previous(&mut self) {
        let index = self.step_back(self.active_index());
        self.select(index);
    }

    /// Starts over on a new list of `len` slides.
    pub fn reseed(&mut self, len: usize) {
        self.len = len;
        self.state = CarouselState::Idle { active_index: 0 };
        self.restart_timer();
    }

    /// Feeds elapsed time to the auto-advance timer. Returns whether the
    /// active slide changed. Time spent dragging is ignored.
    pub fn elapse(&mut self, elapsed: Duration) -> bool {
        let CarouselState::Idle { active_index } = self.state else {
            return false;
        };
        self.idle_elapsed += elapsed;
        let mut next = active_index;
        while self.idle_elapsed >= AUTO_ADVANCE {
            self.idle_elapsed -= AUTO_ADVANCE;
            next = self.step_forward(next);
        }
        self.state = CarouselState::Idle { active_index: next };
        next != active_index
    }

    /// Time left before the next automatic advance, or `None` while the timer
    /// is suspended or there is nothing to advance to.
    pub fn time_until_advance(&self) -> Option<Duration> {
        if self.is_dragging() || self.len < 2 {
            return None;
        }
        Some(AUTO_ADVANCE.saturating_sub(self.idle_elapsed))
    }

    fn restart_timer(&mut self) {
        self.idle_elapsed = Duration::ZERO;
        self.timer_epoch += 1;
    }

    fn step_forward(&self, index: usize) -> usize {
        if self.len == 0 {
            0
        } else {
            (index + 1) % self.len
        }
    }

    fn step_back(&self, index: usize) -> usize {
        if self.len == 0 {
            0
        } else {
            (index + self.len - 1) % self.len
        }
    }
}

/// Shares one [`Carousel`] between intent handlers and the auto-advance driver.
pub struct CarouselController {
    inner: Mutex<Carousel>,
    wake: Notify,
    events: broadcast::Sender<CatalogEvent>,
}

impl CarouselController {
    pub fn new(len: usize, events: broadcast::Sender<CatalogEvent>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Carousel::new(len)),
            wake: Notify::new(),
            events,
        })
    }

    pub async fn active_index(&self) -> usize {
        self.inner.lock().await.active_index()
    }

    pub async fn state(&self) -> CarouselState {
        self.inner.lock().await.state()
    }

    pub async fn pointer_down(&self, x: f64) {
        self.apply(|carousel| carousel.pointer_down(x)).await;
    }

    pub async fn pointer_move(&self, x: f64) {
        self.apply(|carousel| carousel.pointer_move(x)).await;
    }

    pub async fn pointer_up(&self) {
        self.apply(Carousel::pointer_up).await;
    }

    pub async fn select(&self, index: usize) {
        self.apply(|carousel| carousel.select(index)).await;
    }

    pub async fn next(&self) {
        self.apply(Carousel::next).await;
    }

    pub async fn previous(&self) {
        self.apply(Carousel::previous).await;
    }

    /// Re-seeds on a hero rail of a different length; same-length updates keep the position.
    pub async fn reseed_if_resized(&self, len: usize) {
        let mut carousel = self.inner.lock().await;
        if carousel.len() == len {
            return;
        }
        debug!(from = carousel.len(), to = len, "carousel re-seeded");
        let before = carousel.active_index();
        carousel.reseed(len);
        self.after_change(&carousel, before);
    }

    /// Spawns the auto-advance driver. It runs until the handle is aborted.
    pub fn spawn_auto_advance(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run_auto_advance().await })
    }

    async fn run_auto_advance(&self) {
        loop {
            let (wait, epoch) = {
                let carousel = self.inner.lock().await;
                (carousel.time_until_advance(), carousel.timer_epoch())
            };
            let started = Instant::now();
            match wait {
                Some(wait) => {
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = self.wake.notified() => {}
                    }
                }
                None => {
                    self.wake.notified().await;
                    continue;
                }
            }

            let mut carousel = self.inner.lock().await;
            if carousel.timer_epoch() != epoch {
                continue;
            }
            if carousel.elapse(started.elapsed()) {
                debug!(active_index = carousel.active_index(), "carousel auto-advanced");
                let _ = self.events.send(CatalogEvent::Carousel {
                    active_index: carousel.active_index(),
                });
            }
        }
    }

    async fn apply(&self, change: impl FnOnce(&mut Carousel)) {
        let mut carousel = self.inner.lock().await;
        let before = carousel.active_index();
        change(&mut carousel);
        self.after_change(&carousel, before);
    }

    fn after_change(&self, carousel: &Carousel, before: usize) {
        if carousel.active_index() != before {
            let _ = self.events.send(CatalogEvent::Carousel {
                active_index: carousel.active_index(),
            });
        }
        self.wake.notify_one();
    }
}

#[cfg(test)]
#[path = "tests/carousel_tests.rs"]
mod tests;
