//! # Access Log Middleware
//!
//! Combined Log Format access logging for tower/axum services.
//!
//! ```text
//! request ──► AccessLogService ──► inner service
//!                 │ RequestRecord        │ Response
//!                 ▼                      ▼
//!           reserve a queue slot (waits while the queue is full)
//!                 ▼
//!           LoggedBody counts bytes, sends record at end or drop of body
//!                 │ bounded mpsc queue (default 1000)
//!                 ▼
//!           LogWriter task ──► <dir>/YYYY-MM-DDhHH.log and/or stdout
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use traffic_log::middleware::AccessLogLayer;
//!
//! # async fn run() {
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .layer(AccessLogLayer::with_options("/var/log/app", true));
//! # }
//! ```
//!
//! The client address comes from axum's `ConnectInfo<SocketAddr>`, so serve
//! with `into_make_service_with_connect_info::<SocketAddr>()`.

pub mod body;
pub mod format;
pub mod layer;
pub mod record;
pub mod writer;

pub use body::LoggedBody;
pub use format::{clf_date, combined_log_line, log_file_name};
pub use layer::{access_log, AccessLogLayer, AccessLogService, WriterHandle};
pub use record::{client_ip, RequestRecord};
pub use writer::LogWriter;
