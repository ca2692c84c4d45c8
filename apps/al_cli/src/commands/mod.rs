// apps/al_cli/src/commands/mod.rs

//! 命令实现

pub mod foil;
pub mod info;
pub mod wing;
