use bevy::prelude::*;
use std::collections::VecDeque;

use crate::shared::*;

/// At most this many toasts are visible at once; the oldest is dropped.
pub const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ToastEntry {
    pub message: String,
    pub remaining_secs: f32,
}

/// The toasts currently on screen, oldest first.
#[derive(Resource, Debug, Default)]
pub struct ToastLog {
    pub visible: VecDeque<ToastEntry>,
}

impl ToastLog {
    pub fn push(&mut self, message: impl Into<String>, duration_secs: f32) {
        if self.visible.len() >= MAX_VISIBLE_TOASTS {
            self.visible.pop_front();
        }
        self.visible.push_back(ToastEntry {
            message: message.into(),
            remaining_secs: duration_secs,
        });
    }

    pub fn tick(&mut self, delta_secs: f32) {
        for entry in self.visible.iter_mut() {
            entry.remaining_secs -= delta_secs;
        }
        self.visible.retain(|e| e.remaining_secs > 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_toast_events(mut events: EventReader<ToastEvent>, mut log: ResMut<ToastLog>) {
    for event in events.read() {
        info!("[Toast] {}", event.message);
        log.push(event.message.clone(), event.duration_secs);
    }
}

pub fn expire_toasts(time: Res<Time>, mut log: ResMut<ToastLog>) {
    log.tick(time.delta_secs());
}
