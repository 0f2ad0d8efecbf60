//! HTTP服务器模块 - 接收 GitHub webhook 并暴露健康检查与指标

pub mod middleware;
pub mod models;
pub mod payload;
pub mod routes;
pub mod server;
pub mod signature;
pub mod state;

pub use models::*;
pub use server::*;
pub use state::*;
