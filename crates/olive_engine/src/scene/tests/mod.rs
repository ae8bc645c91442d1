//! Scenario tests for scenes, scene managers and drawing

mod drawing;
mod managers;
