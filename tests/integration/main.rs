//! End-to-end tests against a running Parley server.

mod fanout_test;
mod health_test;
mod helpers;
mod ws_test;
