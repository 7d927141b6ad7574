pub mod commands;
pub mod webhook_controller;
