//! Legal Assistant - governed access to a hosted language model for general
//! legal information.
//!
//! Every outbound call passes a client-side rate governor and a two-tier
//! model fallback; every answer is normalized into a fixed document schema
//! no matter how loosely the model followed the requested JSON shape.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
