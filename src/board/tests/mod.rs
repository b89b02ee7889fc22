//! Unit and behaviour tests for the board engine.

mod mutator_tests;
mod permission_tests;
mod projection_tests;
mod transition_tests;
