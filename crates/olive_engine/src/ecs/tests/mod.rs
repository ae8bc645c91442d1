//! Scenario tests across game objects, components and behaviors

mod behaviors;
