pub mod devices;
pub mod health;
pub mod lifecycle;
pub mod live_net_view;
pub mod metrics;
