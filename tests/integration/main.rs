//! Cross-plugin tests for the session flow: title, run, game over, and retry.

mod session_flow;
