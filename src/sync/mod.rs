// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Work queue and the controller that drains it.

pub mod controller;
pub mod queue;

pub use controller::{Controller, ControllerState};
pub use queue::{ChangeEvent, ChangeKind, EventQueue, QueueHandle};
