// src/tests/mod.rs

mod common;

mod current3;
mod tensors;
mod uneqlt;
