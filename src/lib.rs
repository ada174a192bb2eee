//! NPC Arena - multi-threaded skirmish simulation
//!
//! Agents wander a bounded map; a proximity scan queues fights that a
//! separate worker resolves under a fixed Knight > Orc > Bear > Knight cycle.

pub mod combat;
pub mod core;
pub mod entity;
pub mod simulation;
pub mod spatial;
