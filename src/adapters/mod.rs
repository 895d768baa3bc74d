//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                      |
//! |----------------|--------------|----------------------------------|
//! | `channel_sink` | EventSink    | bounded `embassy-sync` channel   |
//! | `config_store` | ConfigPort   | JSON file on disk                |
//! | `log_sink`     | EventSink    | `log` facade                     |
//! | `time`         | Clock        | `embassy-time` driver / manual   |
//!
//! Capability handlers are host-specific and live outside this crate.

pub mod channel_sink;
pub mod config_store;
pub mod log_sink;
pub mod time;
