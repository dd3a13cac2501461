//! TourMuse Backend - Core Library
//!
//! A trip-planning service that fronts a local completion engine with nine
//! fixed capabilities: itinerary planning, budgeting, budget optimization,
//! replanning, place details, a city guide, eco suggestions, hotel
//! recommendations, and a chatbot. Each capability renders a persona-scoped
//! prompt, runs it through the engine exactly once, and stores the result
//! per user so the chatbot can answer from the trip state built up so far.

pub mod agent;
pub mod capability;
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod prompts;
pub mod server;
pub mod settings;
pub mod telemetry;

pub use capability::Capability;
pub use error::Error;
