//! The decision loop at the heart of agentic.
//!
//! A run follows an **ask → act → observe** cycle:
//!
//! 1. **Load** recent turns of the session from the conversation store
//! 2. **Ask** the model for a decision: answer, or call a tool
//! 3. **Act** by running the chosen tool and adding its result to the history
//! 4. **Repeat** until an answer arrives or the step budget is spent
//! 5. **Persist** the instruction and the answer
//!
//! [`AgentRuntime`] builds the whole thing from configuration.

pub mod bootstrap;
pub mod loop_runner;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use bootstrap::{AgentRuntime, build_store, options_from_config};
pub use loop_runner::{AgentOptions, NO_ANSWER, ReactiveAgent, unknown_tool_message};
pub use prompt::StepPrompt;
