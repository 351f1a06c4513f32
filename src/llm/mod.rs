//! Remote model integration: backend contract, Gemini client, failover and prompts

pub mod backend;
pub mod failover;
pub mod gemini;
pub mod prompts;
