// Exposto como biblioteca para os binários auxiliares (job agendado e
// bootstrap de administrador) reutilizarem os mesmos módulos do servidor.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
