// MoodReel Library Root
// Copyright (c) 2026 Xing_The_Creator | MoodReel

pub mod clips;
pub mod controller;
pub mod favorability;
pub mod media;
pub mod sentiment;
pub mod server;
pub mod stage;
pub mod state;
