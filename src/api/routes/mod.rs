//! Route definitions grouped by gated surface

pub mod sys_routes;
pub mod v1_routes;
pub mod webhook_routes;
